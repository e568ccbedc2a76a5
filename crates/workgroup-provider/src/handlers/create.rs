//! Create handler state machine.
//!
//! Issue CreateWorkgroup, wait for the workgroup to reach AVAILABLE, then
//! wait for its namespace to do the same, and finish with a fresh read so
//! the returned model reflects service state. A read racing NotFound right
//! after create consumes the context's bounded retry budget instead of
//! failing the operation.

use tracing::{debug, info, warn};

use crate::client::WorkgroupApi;
use crate::config::ProviderConfig;
use crate::context::{CallbackContext, Stage};
use crate::error::HandlerErrorCode;
use crate::model::{ResourceModel, TYPE_NAME};
use crate::progress::ProgressEvent;

use super::{ResourceHandlerRequest, read, step};

pub(crate) async fn handle(
    client: &dyn WorkgroupApi,
    config: &ProviderConfig,
    request: ResourceHandlerRequest,
    context: CallbackContext,
) -> ProgressEvent {
    let model = request.desired_resource_state;
    match context.stage {
        None => start_create(client, config, model, context).await,
        Some(Stage::AwaitWorkgroupAvailable) => {
            await_workgroup(client, config, model, context).await
        }
        Some(Stage::AwaitNamespaceAvailable) => {
            await_namespace(client, config, model, context).await
        }
        Some(stage) => ProgressEvent::failed(
            HandlerErrorCode::InternalFailure,
            format!("unexpected create stage {stage:?}"),
        ),
    }
}

async fn start_create(
    client: &dyn WorkgroupApi,
    config: &ProviderConfig,
    model: ResourceModel,
    mut context: CallbackContext,
) -> ProgressEvent {
    match client.create_workgroup(&model).await {
        Ok(detail) => {
            info!(resource = TYPE_NAME, workgroup = %model.workgroup_name, "workgroup created");
            context.advance(Stage::AwaitWorkgroupAvailable);
            let model = model.with_detail(detail);
            ProgressEvent::in_progress(config.stabilization.delay_secs, context, model)
        }
        Err(err) if err.is_retriable_conflict() => {
            warn!(workgroup = %model.workgroup_name, "existing workgroup busy, retrying create");
            step::poll_again(context, &config.stabilization, model)
        }
        Err(err) => {
            warn!(workgroup = %model.workgroup_name, error = %err, "create failed");
            ProgressEvent::from_error(&err)
        }
    }
}

async fn await_workgroup(
    client: &dyn WorkgroupApi,
    config: &ProviderConfig,
    model: ResourceModel,
    mut context: CallbackContext,
) -> ProgressEvent {
    match step::workgroup_available(client, &model.workgroup_name).await {
        Ok(true) => {
            context.advance(Stage::AwaitNamespaceAvailable);
            await_namespace(client, config, model, context).await
        }
        Ok(false) => step::poll_again(context, &config.stabilization, model),
        Err(err) if err.is_not_found() && context.consume_not_found_retry() => {
            debug!(
                workgroup = %model.workgroup_name,
                remaining = context.retries_on_not_found,
                "read raced workgroup creation, retrying"
            );
            step::poll_again(context, &config.stabilization, model)
        }
        Err(err) => ProgressEvent::from_error(&err),
    }
}

async fn await_namespace(
    client: &dyn WorkgroupApi,
    config: &ProviderConfig,
    model: ResourceModel,
    context: CallbackContext,
) -> ProgressEvent {
    let Some(namespace_name) = model.namespace_name.clone() else {
        return ProgressEvent::failed(
            HandlerErrorCode::InvalidRequest,
            "NamespaceName is required",
        );
    };

    match step::namespace_available(client, &namespace_name).await {
        Ok(true) => {
            info!(resource = TYPE_NAME, namespace = %namespace_name, "namespace stable");
            read::read_model(client, &model.workgroup_name).await
        }
        Ok(false) => step::poll_again(context, &config.stabilization, model),
        Err(err) => ProgressEvent::from_error(&err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockWorkgroupApi;
    use crate::error::ApiError;
    use crate::handlers::testing::drive;
    use crate::handlers::Action;
    use crate::model::{NamespaceDetail, NamespaceStatus, WorkgroupDetail, WorkgroupStatus};
    use mockall::Sequence;
    use pretty_assertions::assert_eq;

    fn desired_model() -> ResourceModel {
        ResourceModel {
            workgroup_name: "wg1".into(),
            namespace_name: Some("ns1".into()),
            base_capacity: Some(32),
            ..Default::default()
        }
    }

    fn workgroup(status: WorkgroupStatus) -> WorkgroupDetail {
        WorkgroupDetail {
            workgroup_name: Some("wg1".into()),
            namespace_name: Some("ns1".into()),
            status: Some(status),
            base_capacity: Some(32),
            ..Default::default()
        }
    }

    fn namespace(status: NamespaceStatus) -> NamespaceDetail {
        NamespaceDetail {
            namespace_name: Some("ns1".into()),
            status: Some(status),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn create_polls_workgroup_then_namespace_then_succeeds() {
        let mut api = MockWorkgroupApi::new();
        let mut seq = Sequence::new();

        api.expect_create_workgroup()
            .withf(|model| model.workgroup_name == "wg1" && model.base_capacity == Some(32))
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(workgroup(WorkgroupStatus::Creating)));
        // Two stabilization probes before the workgroup settles.
        api.expect_get_workgroup()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(workgroup(WorkgroupStatus::Creating)));
        api.expect_get_workgroup()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(workgroup(WorkgroupStatus::Available)));
        // Namespace settles on the second probe.
        api.expect_get_namespace()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(namespace(NamespaceStatus::Modifying)));
        api.expect_get_namespace()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(namespace(NamespaceStatus::Available)));
        // Final read feeding the Success model.
        api.expect_get_workgroup()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(workgroup(WorkgroupStatus::Available)));

        let event = drive(&api, &ProviderConfig::default(), Action::Create, desired_model()).await;
        match event {
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
    async fn name_collision_fails_with_already_exists() {
        let mut api = MockWorkgroupApi::new();
        api.expect_create_workgroup()
            .returning(|_| Err(ApiError::Conflict("Workgroup wg1 Already Exists".into())));

        let event = drive(&api, &ProviderConfig::default(), Action::Create, desired_model()).await;
        match event {
            ProgressEvent::Failed { error_code, .. } => {
                assert_eq!(error_code, HandlerErrorCode::AlreadyExists);
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn busy_workgroup_conflict_retries_instead_of_failing() {
        let mut api = MockWorkgroupApi::new();
        api.expect_create_workgroup().returning(|_| {
            Err(ApiError::Conflict(
                crate::error::BUSY_WORKGROUP_RETRY_MESSAGE.into(),
            ))
        });

        let event = handle(
            &api,
            &ProviderConfig::default(),
            ResourceHandlerRequest::new(desired_model()),
            CallbackContext::default(),
        )
        .await;

        match event {
            ProgressEvent::InProgress {
                callback_context, ..
            } => {
                // Still before the create stage; the next invocation retries it.
                assert_eq!(callback_context.stage, None);
                assert_eq!(callback_context.stabilization_attempts, 1);
            }
            other => panic!("expected InProgress, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn post_create_not_found_consumes_the_retry_budget() {
        let mut api = MockWorkgroupApi::new();
        let mut seq = Sequence::new();

        api.expect_create_workgroup()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(workgroup(WorkgroupStatus::Creating)));
        // First probe races eventual consistency.
        api.expect_get_workgroup()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(ApiError::NotFound("not visible yet".into())));
        api.expect_get_workgroup()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(workgroup(WorkgroupStatus::Available)));
        api.expect_get_namespace()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(namespace(NamespaceStatus::Available)));
        api.expect_get_workgroup()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(workgroup(WorkgroupStatus::Available)));

        let event = drive(&api, &ProviderConfig::default(), Action::Create, desired_model()).await;
        assert!(matches!(event, ProgressEvent::Success { .. }));
    }

    #[tokio::test]
    async fn exhausted_not_found_budget_fails() {
        let mut api = MockWorkgroupApi::new();
        api.expect_create_workgroup()
            .returning(|_| Ok(workgroup(WorkgroupStatus::Creating)));
        api.expect_get_workgroup()
            .returning(|_| Err(ApiError::NotFound("never visible".into())));

        let config = ProviderConfig {
            not_found_retries: 2,
            ..Default::default()
        };

        let event = drive(&api, &config, Action::Create, desired_model()).await;
        match event {
            ProgressEvent::Failed { error_code, .. } => {
                assert_eq!(error_code, HandlerErrorCode::NotFound);
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_namespace_name_is_an_invalid_request() {
        let mut api = MockWorkgroupApi::new();
        api.expect_create_workgroup()
            .returning(|_| Ok(workgroup(WorkgroupStatus::Creating)));
        api.expect_get_workgroup()
            .returning(|_| Ok(workgroup(WorkgroupStatus::Available)));

        let mut model = desired_model();
        model.namespace_name = None;

        let event = drive(&api, &ProviderConfig::default(), Action::Create, model).await;
        match event {
            ProgressEvent::Failed { error_code, .. } => {
                assert_eq!(error_code, HandlerErrorCode::InvalidRequest);
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }
}
