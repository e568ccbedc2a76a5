//! Shared step-executor pieces: stabilization probes and backoff
//! bookkeeping.
//!
//! A probe issues one read of the resource and reports whether the
//! stabilization predicate holds. [`poll_again`] charges one attempt against
//! the stage's backoff budget and either schedules the next probe or fails
//! the operation with `Timeout`.

use tracing::debug;

use crate::client::WorkgroupApi;
use crate::config::ConstantBackoff;
use crate::context::CallbackContext;
use crate::error::{ApiError, HandlerErrorCode};
use crate::model::{ResourceModel, WorkgroupStatus};
use crate::progress::ProgressEvent;

/// One stabilization probe: is the workgroup AVAILABLE?
pub(crate) async fn workgroup_available(
    client: &dyn WorkgroupApi,
    workgroup_name: &str,
) -> Result<bool, ApiError> {
    let detail = client.get_workgroup(workgroup_name).await?;
    debug!(workgroup = workgroup_name, status = ?detail.status, "workgroup probed");
    Ok(detail.status == Some(WorkgroupStatus::Available))
}

/// One stabilization probe: is the namespace AVAILABLE?
pub(crate) async fn namespace_available(
    client: &dyn WorkgroupApi,
    namespace_name: &str,
) -> Result<bool, ApiError> {
    let detail = client.get_namespace(namespace_name).await?;
    debug!(namespace = namespace_name, status = ?detail.status, "namespace probed");
    Ok(detail.is_available())
}

/// One deletion probe: the workgroup is gone once a read fails NotFound.
pub(crate) async fn workgroup_deleted(
    client: &dyn WorkgroupApi,
    workgroup_name: &str,
) -> Result<bool, ApiError> {
    match client.get_workgroup(workgroup_name).await {
        Ok(detail) => {
            debug!(workgroup = workgroup_name, status = ?detail.status, "workgroup still present");
            Ok(false)
        }
        Err(err) if err.is_not_found() => Ok(true),
        Err(err) => Err(err),
    }
}

/// Charge one attempt against the stage's budget and schedule the next
/// probe, or fail with `Timeout` once the budget is exhausted.
pub(crate) fn poll_again(
    mut context: CallbackContext,
    policy: &ConstantBackoff,
    model: ResourceModel,
) -> ProgressEvent {
    if policy.expired(context.stabilization_attempts) {
        return ProgressEvent::failed(
            HandlerErrorCode::Timeout,
            format!(
                "workgroup {} did not stabilize within {}s",
                model.workgroup_name, policy.timeout_secs
            ),
        );
    }
    context.stabilization_attempts += 1;
    ProgressEvent::in_progress(policy.delay_secs, context, model)
}
