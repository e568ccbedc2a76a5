//! Delete handler state machine.
//!
//! Issue DeleteWorkgroup, then poll until a read of the workgroup fails
//! NotFound. Deletion success carries no resource model.

use tracing::{info, warn};

use crate::client::WorkgroupApi;
use crate::config::ProviderConfig;
use crate::context::{CallbackContext, Stage};
use crate::error::HandlerErrorCode;
use crate::model::{ResourceModel, TYPE_NAME};
use crate::progress::ProgressEvent;

use super::{ResourceHandlerRequest, step};

pub(crate) async fn handle(
    client: &dyn WorkgroupApi,
    config: &ProviderConfig,
    request: ResourceHandlerRequest,
    context: CallbackContext,
) -> ProgressEvent {
    let model = request.desired_resource_state;
    match context.stage {
        None => start_delete(client, config, model, context).await,
        Some(Stage::AwaitWorkgroupDeleted) => await_deleted(client, config, model, context).await,
        Some(stage) => ProgressEvent::failed(
            HandlerErrorCode::InternalFailure,
            format!("unexpected delete stage {stage:?}"),
        ),
    }
}

async fn start_delete(
    client: &dyn WorkgroupApi,
    config: &ProviderConfig,
    model: ResourceModel,
    mut context: CallbackContext,
) -> ProgressEvent {
    match client.delete_workgroup(&model.workgroup_name).await {
        Ok(_) => {
            info!(resource = TYPE_NAME, workgroup = %model.workgroup_name, "workgroup deletion started");
            context.advance(Stage::AwaitWorkgroupDeleted);
            ProgressEvent::in_progress(config.stabilization.delay_secs, context, model)
        }
        Err(err) if err.is_retriable_conflict() => {
            warn!(workgroup = %model.workgroup_name, "workgroup busy, retrying delete");
            step::poll_again(context, &config.stabilization, model)
        }
        Err(err) => {
            warn!(workgroup = %model.workgroup_name, error = %err, "delete failed");
            ProgressEvent::from_error(&err)
        }
    }
}

async fn await_deleted(
    client: &dyn WorkgroupApi,
    config: &ProviderConfig,
    model: ResourceModel,
    context: CallbackContext,
) -> ProgressEvent {
    match step::workgroup_deleted(client, &model.workgroup_name).await {
        Ok(true) => {
            info!(resource = TYPE_NAME, workgroup = %model.workgroup_name, "workgroup deleted");
            ProgressEvent::success_without_model()
        }
        Ok(false) => step::poll_again(context, &config.stabilization, model),
        Err(err) => ProgressEvent::from_error(&err),
    }
}
