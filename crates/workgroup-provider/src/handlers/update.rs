//! Update handler state machine.
//!
//! Wait for the workgroup to be stable (pre-operation budget), compute the
//! delta between desired and observed state, reconcile tags, apply the
//! attribute update with only the changed fields, wait for stability again,
//! and finish with a fresh read. Changes already applied stay applied if a
//! later step fails; the service offers no rollback.
//!
//! The computed delta travels between invocations as the resource model
//! carried by the InProgress event.

use tracing::{debug, info, warn};

use crate::client::WorkgroupApi;
use crate::config::ProviderConfig;
use crate::context::{CallbackContext, Stage};
use crate::delta;
use crate::error::{ApiError, HandlerErrorCode};
use crate::model::{ResourceModel, TYPE_NAME};
use crate::progress::ProgressEvent;
use crate::tags;

use super::{ResourceHandlerRequest, read, step};

pub(crate) async fn handle(
    client: &dyn WorkgroupApi,
    config: &ProviderConfig,
    request: ResourceHandlerRequest,
    context: CallbackContext,
) -> ProgressEvent {
    let model = request.desired_resource_state;
    match context.stage {
        None | Some(Stage::StabilizeBeforeUpdate) => {
            stabilize_before_update(client, config, model, context).await
        }
        Some(Stage::ReconcileTags) => reconcile_tags(client, config, model, context).await,
        Some(Stage::StabilizeAfterTags) => {
            stabilize_towards(client, config, model, context, Stage::ApplyWorkgroupUpdate).await
        }
        Some(Stage::ApplyWorkgroupUpdate) => apply_update(client, config, model, context).await,
        Some(Stage::StabilizeAfterUpdate) => stabilize_final(client, config, model, context).await,
        Some(stage) => ProgressEvent::failed(
            HandlerErrorCode::InternalFailure,
            format!("unexpected update stage {stage:?}"),
        ),
    }
}

/// Pre-operation check: the workgroup must be AVAILABLE before we touch it.
/// Once it is, the delta against the observed state is computed and carried
/// forward; the tag step runs in the same invocation.
async fn stabilize_before_update(
    client: &dyn WorkgroupApi,
    config: &ProviderConfig,
    model: ResourceModel,
    mut context: CallbackContext,
) -> ProgressEvent {
    context.stage = Some(Stage::StabilizeBeforeUpdate);

    match client.get_workgroup(&model.workgroup_name).await {
        Ok(detail) if detail.is_available() => {
            let observed = ResourceModel::from_detail(detail);
            let update = delta::compute_update_delta(&model, &observed);
            debug!(
                resource = TYPE_NAME,
                workgroup = %model.workgroup_name,
                no_attribute_changes = delta::is_empty(&update),
                "workgroup stable, delta computed"
            );
            context.advance(Stage::ReconcileTags);
            reconcile_tags(client, config, update, context).await
        }
        Ok(_) => step::poll_again(context, &config.preoperation, model),
        Err(err) => {
            warn!(workgroup = %model.workgroup_name, error = %err, "pre-update read failed");
            ProgressEvent::from_error(&err)
        }
    }
}

async fn reconcile_tags(
    client: &dyn WorkgroupApi,
    config: &ProviderConfig,
    model: ResourceModel,
    mut context: CallbackContext,
) -> ProgressEvent {
    let Some(arn) = model.workgroup_arn().map(str::to_owned) else {
        return ProgressEvent::failed(
            HandlerErrorCode::InternalFailure,
            "workgroup ARN missing from observed state",
        );
    };

    let current = match client.list_tags(&arn).await {
        Ok(tags) => tags,
        Err(err) => return ProgressEvent::from_error(&err),
    };

    let desired = model.tags.clone().unwrap_or_default();
    let plan = tags::reconcile(&desired, &current);

    if plan.is_noop() {
        debug!(resource = TYPE_NAME, workgroup = %model.workgroup_name, "no tag changes");
    } else {
        if !plan.to_remove.is_empty() {
            if let Err(err) = client.untag_resource(&arn, &plan.to_remove).await {
                return tag_call_failed(err, context, config, model);
            }
        }
        if !plan.to_apply.is_empty() {
            if let Err(err) = client.tag_resource(&arn, &plan.to_apply).await {
                return tag_call_failed(err, context, config, model);
            }
        }
        info!(
            resource = TYPE_NAME,
            workgroup = %model.workgroup_name,
            applied = plan.to_apply.len(),
            removed = plan.to_remove.len(),
            "workgroup tags reconciled"
        );
    }

    context.advance(Stage::StabilizeAfterTags);
    ProgressEvent::in_progress(0, context, model)
}

fn tag_call_failed(
    err: ApiError,
    context: CallbackContext,
    config: &ProviderConfig,
    model: ResourceModel,
) -> ProgressEvent {
    if err.is_retriable_conflict() {
        warn!(workgroup = %model.workgroup_name, "workgroup busy during tag update, retrying");
        // Same stage; the whole tag step re-runs on the next invocation.
        step::poll_again(context, &config.stabilization, model)
    } else {
        ProgressEvent::from_error(&err)
    }
}

async fn stabilize_towards(
    client: &dyn WorkgroupApi,
    config: &ProviderConfig,
    model: ResourceModel,
    mut context: CallbackContext,
    next: Stage,
) -> ProgressEvent {
    match step::workgroup_available(client, &model.workgroup_name).await {
        Ok(true) => {
            context.advance(next);
            ProgressEvent::in_progress(0, context, model)
        }
        Ok(false) => step::poll_again(context, &config.stabilization, model),
        Err(err) => ProgressEvent::from_error(&err),
    }
}

async fn apply_update(
    client: &dyn WorkgroupApi,
    config: &ProviderConfig,
    model: ResourceModel,
    mut context: CallbackContext,
) -> ProgressEvent {
    if delta::is_empty(&model) {
        debug!(
            resource = TYPE_NAME,
            workgroup = %model.workgroup_name,
            "no attribute changes requested, skipping update call"
        );
        context.advance(Stage::StabilizeAfterUpdate);
        return ProgressEvent::in_progress(0, context, model);
    }

    match client.update_workgroup(&model).await {
        Ok(detail) => {
            info!(resource = TYPE_NAME, workgroup = %model.workgroup_name, "workgroup updated");
            context.advance(Stage::StabilizeAfterUpdate);
            let model = model.with_detail(detail);
            ProgressEvent::in_progress(config.stabilization.delay_secs, context, model)
        }
        Err(err) if err.is_retriable_conflict() => {
            warn!(workgroup = %model.workgroup_name, "workgroup busy during update, retrying");
            step::poll_again(context, &config.stabilization, model)
        }
        Err(err) => {
            warn!(workgroup = %model.workgroup_name, error = %err, "update failed");
            ProgressEvent::from_error(&err)
        }
    }
}

async fn stabilize_final(
    client: &dyn WorkgroupApi,
    config: &ProviderConfig,
    model: ResourceModel,
    context: CallbackContext,
) -> ProgressEvent {
    match step::workgroup_available(client, &model.workgroup_name).await {
        Ok(true) => read::read_model(client, &model.workgroup_name).await,
        Ok(false) => step::poll_again(context, &config.stabilization, model),
        Err(err) => ProgressEvent::from_error(&err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::MockWorkgroupApi;
    use crate::error::{ApiError, BUSY_WORKGROUP_RETRY_MESSAGE};
    use crate::handlers::testing::drive;
    use crate::handlers::Action;
    use crate::model::{Tag, WorkgroupDetail, WorkgroupStatus};
    use pretty_assertions::assert_eq;

    const ARN: &str = "arn:aws:redshift-serverless:us-east-1:123456789012:workgroup/wg1";

    fn observed_workgroup(status: WorkgroupStatus) -> WorkgroupDetail {
        WorkgroupDetail {
            workgroup_arn: Some(ARN.into()),
            workgroup_name: Some("wg1".into()),
            namespace_name: Some("ns1".into()),
            status: Some(status),
            base_capacity: Some(32),
            max_capacity: Some(128),
            enhanced_vpc_routing: Some(false),
            publicly_accessible: Some(true),
            subnet_ids: Some(vec!["subnet-a".into(), "subnet-b".into()]),
            security_group_ids: Some(vec!["sg-1".into()]),
            port: Some(8192),
            ..Default::default()
        }
    }

    fn desired_model() -> ResourceModel {
        ResourceModel::from_detail(observed_workgroup(WorkgroupStatus::Available))
    }

    #[tokio::test]
    async fn port_only_change_sends_port_only_update() {
        let mut api = MockWorkgroupApi::new();
        api.expect_get_workgroup()
            .returning(|_| Ok(observed_workgroup(WorkgroupStatus::Available)));
        api.expect_list_tags().returning(|_| Ok(vec![]));
        api.expect_update_workgroup()
            .withf(|model| {
                model.workgroup_name == "wg1"
                    && model.port == Some(8193)
                    && model.base_capacity.is_none()
                    && model.max_capacity.is_none()
                    && model.enhanced_vpc_routing.is_none()
                    && model.config_parameters.is_none()
                    && model.publicly_accessible.is_none()
                    && model.subnet_ids.is_none()
                    && model.security_group_ids.is_none()
            })
            .times(1)
            .returning(|_| {
                let mut detail = observed_workgroup(WorkgroupStatus::Modifying);
                detail.port = Some(8193);
                Ok(detail)
            });

        let mut desired = desired_model();
        desired.port = Some(8193);

        let event = drive(&api, &ProviderConfig::default(), Action::Update, desired).await;
        assert!(matches!(event, ProgressEvent::Success { .. }));
    }

    #[tokio::test]
    async fn unchanged_model_skips_the_update_call() {
        let mut api = MockWorkgroupApi::new();
        api.expect_get_workgroup()
            .returning(|_| Ok(observed_workgroup(WorkgroupStatus::Available)));
        api.expect_list_tags().returning(|_| Ok(vec![]));
        // No expect_update_workgroup: the call must not happen.

        let event = drive(&api, &ProviderConfig::default(), Action::Update, desired_model()).await;
        assert!(matches!(event, ProgressEvent::Success { .. }));
    }

    #[tokio::test]
    async fn tag_changes_are_applied_before_the_attribute_update() {
        let mut api = MockWorkgroupApi::new();
        api.expect_get_workgroup()
            .returning(|_| Ok(observed_workgroup(WorkgroupStatus::Available)));
        api.expect_list_tags()
            .withf(|arn| arn == ARN)
            .returning(|_| Ok(vec![Tag::new("env", "prod"), Tag::new("owner", "dwh")]));
        // The changed env value is untagged alongside the dropped owner key
        // before the new pair is applied.
        api.expect_untag_resource()
            .withf(|arn, keys| arn == ARN && keys == ["env".to_string(), "owner".to_string()])
            .times(1)
            .returning(|_, _| Ok(()));
        api.expect_tag_resource()
            .withf(|arn, tags| arn == ARN && tags == [Tag::new("env", "staging")])
            .times(1)
            .returning(|_, _| Ok(()));

        let mut desired = desired_model();
        desired.tags = Some(vec![Tag::new("env", "staging")]);

        let event = drive(&api, &ProviderConfig::default(), Action::Update, desired).await;
        assert!(matches!(event, ProgressEvent::Success { .. }));
    }

    #[tokio::test]
    async fn reordered_sets_produce_no_update_call() {
        let mut api = MockWorkgroupApi::new();
        api.expect_get_workgroup()
            .returning(|_| Ok(observed_workgroup(WorkgroupStatus::Available)));
        api.expect_list_tags().returning(|_| Ok(vec![]));

        let mut desired = desired_model();
        desired.subnet_ids = Some(vec!["subnet-b".into(), "subnet-a".into()]);

        let event = drive(&api, &ProviderConfig::default(), Action::Update, desired).await;
        assert!(matches!(event, ProgressEvent::Success { .. }));
    }

    #[tokio::test]
    async fn busy_workgroup_during_update_retries_in_place() {
        let mut api = MockWorkgroupApi::new();
        api.expect_update_workgroup()
            .returning(|_| Err(ApiError::Conflict(BUSY_WORKGROUP_RETRY_MESSAGE.into())));

        let mut context = CallbackContext::default();
        context.advance(Stage::ApplyWorkgroupUpdate);
        let mut model = desired_model();
        model.port = Some(8193);

        let event = handle(
            &api,
            &ProviderConfig::default(),
            ResourceHandlerRequest::new(model),
            context,
        )
        .await;

        match event {
            ProgressEvent::InProgress {
                callback_context, ..
            } => {
                assert_eq!(callback_context.stage, Some(Stage::ApplyWorkgroupUpdate));
                assert_eq!(callback_context.stabilization_attempts, 1);
            }
            other => panic!("expected InProgress, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unstable_workgroup_times_out_on_the_preoperation_budget() {
        let mut api = MockWorkgroupApi::new();
        api.expect_get_workgroup()
            .returning(|_| Ok(observed_workgroup(WorkgroupStatus::Modifying)));

        // 2 attempts at 5s fills a 10s budget.
        let config = ProviderConfig {
            preoperation: crate::config::ConstantBackoff::new(10, 5),
            ..Default::default()
        };

        let event = drive(&api, &config, Action::Update, desired_model()).await;
        match event {
            ProgressEvent::Failed { error_code, .. } => {
                assert_eq!(error_code, HandlerErrorCode::Timeout);
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn update_of_missing_workgroup_fails_not_found() {
        let mut api = MockWorkgroupApi::new();
        api.expect_get_workgroup()
            .returning(|_| Err(ApiError::NotFound("no such workgroup".into())));

        let event = drive(&api, &ProviderConfig::default(), Action::Update, desired_model()).await;
        match event {
            ProgressEvent::Failed { error_code, .. } => {
                assert_eq!(error_code, HandlerErrorCode::NotFound);
            }
            other => panic!("expected Failed, got {other:?}"),
        }
    }
}
