//! Read handler: one service read, translated into an observed model.

use tracing::{info, warn};

use crate::client::WorkgroupApi;
use crate::model::{ResourceModel, TYPE_NAME};
use crate::progress::ProgressEvent;

use super::ResourceHandlerRequest;

pub(crate) async fn handle(
    client: &dyn WorkgroupApi,
    request: ResourceHandlerRequest,
) -> ProgressEvent {
    read_model(client, &request.desired_resource_state.workgroup_name).await
}

/// Read the workgroup and produce a terminal event. Create and update end
/// with this same read so the model handed back reflects service state.
pub(crate) async fn read_model(client: &dyn WorkgroupApi, workgroup_name: &str) -> ProgressEvent {
    match client.get_workgroup(workgroup_name).await {
        Ok(detail) => {
            info!(resource = TYPE_NAME, workgroup = workgroup_name, "workgroup read");
            ProgressEvent::success(ResourceModel::from_detail(detail))
        }
        Err(err) => {
            warn!(resource = TYPE_NAME, workgroup = workgroup_name, error = %err, "read failed");
            ProgressEvent::from_error(&err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockWorkgroupApi;
    use crate::error::{ApiError, HandlerErrorCode};
    use crate::model::{WorkgroupDetail, WorkgroupStatus};
    use pretty_assertions::assert_eq;

    fn request_for(name: &str) -> ResourceHandlerRequest {
        ResourceHandlerRequest::new(ResourceModel {
            workgroup_name: name.into(),
            ..Default::default()
        })
    }

    #[tokio::test]
    async fn read_returns_the_observed_model() {
        let mut api = MockWorkgroupApi::new();
        api.expect_get_workgroup()
            .withf(|name| name == "wg1")
            .returning(|_| {
                Ok(WorkgroupDetail {
                    workgroup_name: Some("wg1".into()),
                    namespace_name: Some("ns1".into()),
                    status: Some(WorkgroupStatus::Available),
                    base_capacity: Some(32),
                    ..Default::default()
                })
            });

        match handle(&api, request_for("wg1")).await {
            ProgressEvent::Success {
                resource_model: Some(model),
            } => {
                assert_eq!(model.workgroup_name, "wg1");
                assert_eq!(model.base_capacity, Some(32));
                assert!(model.workgroup.expect("detail").is_available());
            }
            other => panic!("expected Success, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_workgroup_fails_with_not_found() {
        let mut api = MockWorkgroupApi::new();
        api.expect_get_workgroup()
            .returning(|_| Err(ApiError::NotFound("workgroup wg1 not found".into())));

        match handle(&api, request_for("wg1")).await {
            ProgressEvent::Failed {
                error_code,
                message,
            } => {
                assert_eq!(error_code, HandlerErrorCode::NotFound);
                assert_eq!(message, "workgroup wg1 not found");
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }
}
