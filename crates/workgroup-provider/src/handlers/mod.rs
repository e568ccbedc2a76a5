//! Lifecycle dispatch for the workgroup resource.
//!
//! The external scheduler invokes [`handle_request`] once per step with the
//! desired state and the callback context from the previous invocation (or
//! none, at the start of an operation). Exactly one [`ProgressEvent`] comes
//! back; on `InProgress` the scheduler is expected to re-invoke after the
//! requested delay, passing the carried context and model back in.

mod create;
mod delete;
mod read;
pub(crate) mod step;
mod update;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::client::WorkgroupApi;
use crate::config::ProviderConfig;
use crate::context::CallbackContext;
use crate::model::ResourceModel;
use crate::progress::ProgressEvent;

/// Which lifecycle operation the scheduler is driving.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
}

/// The request envelope handed to the provider by the scheduler.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ResourceHandlerRequest {
    pub desired_resource_state: ResourceModel,
    /// Last state known to the scheduler. Handlers compare against a fresh
    /// service read instead, so this is carried for the envelope contract
    /// only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_resource_state: Option<ResourceModel>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logical_resource_identifier: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub client_request_token: Option<String>,
}

impl ResourceHandlerRequest {
    pub fn new(desired_resource_state: ResourceModel) -> Self {
        Self {
            desired_resource_state,
            ..Default::default()
        }
    }
}

/// Entry point: route one scheduler invocation to its lifecycle handler.
///
/// A missing context means the operation is just starting; the fresh context
/// takes its NotFound retry budget from the config, mirroring how each
/// top-level invocation gets its own bounded retry state.
pub async fn handle_request(
    client: &dyn WorkgroupApi,
    config: &ProviderConfig,
    action: Action,
    request: ResourceHandlerRequest,
    context: Option<CallbackContext>,
) -> ProgressEvent {
    let context = context.unwrap_or_else(|| CallbackContext::new(config.not_found_retries));

    info!(
        action = ?action,
        workgroup = %request.desired_resource_state.workgroup_name,
        stage = ?context.stage,
        "handling resource request"
    );

    match action {
        Action::Create => create::handle(client, config, request, context).await,
        Action::Read => read::handle(client, request).await,
        Action::Update => update::handle(client, config, request, context).await,
        Action::Delete => delete::handle(client, config, request, context).await,
    }
}
