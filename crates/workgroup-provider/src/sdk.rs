//! `aws-sdk-redshiftserverless` implementation of [`WorkgroupApi`].
//!
//! All translation between the resource model and the SDK request/response
//! shapes lives here, as does the mapping from SDK errors to [`ApiError`].
//! Handler logic above this module never sees an SDK type.

use async_trait::async_trait;
use aws_sdk_redshiftserverless::Client;
use aws_sdk_redshiftserverless::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_redshiftserverless::types as sdk;
use aws_smithy_types::date_time::Format;
use tracing::debug;

use crate::client::WorkgroupApi;
use crate::error::ApiError;
use crate::model::{
    ConfigParameter, NamespaceDetail, NamespaceStatus, ResourceModel, Tag, WorkgroupDetail,
    WorkgroupStatus,
};

/// Production client backed by the AWS SDK.
#[derive(Debug, Clone)]
pub struct SdkWorkgroupClient {
    client: Client,
}

impl SdkWorkgroupClient {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Build a client from the ambient AWS environment (credentials chain,
    /// region, etc.).
    pub async fn from_env() -> Self {
        let config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
        Self::new(Client::new(&config))
    }
}

#[async_trait]
impl WorkgroupApi for SdkWorkgroupClient {
    async fn create_workgroup(&self, model: &ResourceModel) -> Result<WorkgroupDetail, ApiError> {
        let tags = model
            .tags
            .clone()
            .map(|tags| tags.into_iter().map(into_sdk_tag).collect::<Result<Vec<_>, _>>())
            .transpose()?;

        let response = self
            .client
            .create_workgroup()
            .workgroup_name(&model.workgroup_name)
            .set_namespace_name(model.namespace_name.clone())
            .set_base_capacity(model.base_capacity)
            .set_max_capacity(model.max_capacity)
            .set_enhanced_vpc_routing(model.enhanced_vpc_routing)
            .set_config_parameters(
                model
                    .config_parameters
                    .clone()
                    .map(|params| params.into_iter().map(into_sdk_config_parameter).collect()),
            )
            .set_publicly_accessible(model.publicly_accessible)
            .set_subnet_ids(model.subnet_ids.clone())
            .set_security_group_ids(model.security_group_ids.clone())
            .set_port(model.port)
            .set_tags(tags)
            .send()
            .await
            .map_err(into_api_error)?;

        debug!(workgroup = %model.workgroup_name, "CreateWorkgroup accepted");
        response
            .workgroup
            .map(into_workgroup_detail)
            .ok_or_else(|| missing_shape("CreateWorkgroup"))
    }

    async fn get_workgroup(&self, workgroup_name: &str) -> Result<WorkgroupDetail, ApiError> {
        let response = self
            .client
            .get_workgroup()
            .workgroup_name(workgroup_name)
            .send()
            .await
            .map_err(into_api_error)?;

        response
            .workgroup
            .map(into_workgroup_detail)
            .ok_or_else(|| missing_shape("GetWorkgroup"))
    }

    async fn update_workgroup(&self, model: &ResourceModel) -> Result<WorkgroupDetail, ApiError> {
        let response = self
            .client
            .update_workgroup()
            .workgroup_name(&model.workgroup_name)
            .set_base_capacity(model.base_capacity)
            .set_max_capacity(model.max_capacity)
            .set_enhanced_vpc_routing(model.enhanced_vpc_routing)
            .set_config_parameters(
                model
                    .config_parameters
                    .clone()
                    .map(|params| params.into_iter().map(into_sdk_config_parameter).collect()),
            )
            .set_publicly_accessible(model.publicly_accessible)
            .set_subnet_ids(model.subnet_ids.clone())
            .set_security_group_ids(model.security_group_ids.clone())
            .set_port(model.port)
            .send()
            .await
            .map_err(into_api_error)?;

        debug!(workgroup = %model.workgroup_name, "UpdateWorkgroup accepted");
        response
            .workgroup
            .map(into_workgroup_detail)
            .ok_or_else(|| missing_shape("UpdateWorkgroup"))
    }

    async fn delete_workgroup(&self, workgroup_name: &str) -> Result<WorkgroupDetail, ApiError> {
        let response = self
            .client
            .delete_workgroup()
            .workgroup_name(workgroup_name)
            .send()
            .await
            .map_err(into_api_error)?;

        debug!(workgroup = workgroup_name, "DeleteWorkgroup accepted");
        response
            .workgroup
            .map(into_workgroup_detail)
            .ok_or_else(|| missing_shape("DeleteWorkgroup"))
    }

    async fn get_namespace(&self, namespace_name: &str) -> Result<NamespaceDetail, ApiError> {
        let response = self
            .client
            .get_namespace()
            .namespace_name(namespace_name)
            .send()
            .await
            .map_err(into_api_error)?;

        response
            .namespace
            .map(into_namespace_detail)
            .ok_or_else(|| missing_shape("GetNamespace"))
    }

    async fn list_tags(&self, resource_arn: &str) -> Result<Vec<Tag>, ApiError> {
        let response = self
            .client
            .list_tags_for_resource()
            .resource_arn(resource_arn)
            .send()
            .await
            .map_err(into_api_error)?;

        Ok(response
            .tags
            .unwrap_or_default()
            .into_iter()
            .map(|tag| Tag {
                key: tag.key,
                value: tag.value,
            })
            .collect())
    }

    async fn tag_resource(&self, resource_arn: &str, tags: &[Tag]) -> Result<(), ApiError> {
        let tags = tags
            .iter()
            .cloned()
            .map(into_sdk_tag)
            .collect::<Result<Vec<_>, _>>()?;

        self.client
            .tag_resource()
            .resource_arn(resource_arn)
            .set_tags(Some(tags))
            .send()
            .await
            .map_err(into_api_error)?;
        Ok(())
    }

    async fn untag_resource(&self, resource_arn: &str, tag_keys: &[String]) -> Result<(), ApiError> {
        self.client
            .untag_resource()
            .resource_arn(resource_arn)
            .set_tag_keys(Some(tag_keys.to_vec()))
            .send()
            .await
            .map_err(into_api_error)?;
        Ok(())
    }
}

/// Map an SDK error to the provider taxonomy by its error-metadata code.
fn into_api_error<E>(err: SdkError<E>) -> ApiError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    let message = err
        .message()
        .map(str::to_owned)
        .unwrap_or_else(|| err.to_string());

    match err.code() {
        Some("ValidationException") => ApiError::Validation(message),
        Some("ConflictException") => ApiError::Conflict(message),
        Some("InsufficientCapacityException") => ApiError::InsufficientCapacity(message),
        Some("ResourceNotFoundException") => ApiError::NotFound(message),
        Some("InternalServerException") => ApiError::InternalServer(message),
        Some("TooManyTagsException") => ApiError::TooManyTags(message),
        Some("ThrottlingException") => ApiError::Throttling(message),
        _ => ApiError::Other(message),
    }
}

fn missing_shape(operation: &str) -> ApiError {
    ApiError::Other(format!("{operation} response carried no resource"))
}

fn into_sdk_tag(tag: Tag) -> Result<sdk::Tag, ApiError> {
    sdk::Tag::builder()
        .key(tag.key)
        .value(tag.value)
        .build()
        .map_err(|err| ApiError::Validation(err.to_string()))
}

fn into_sdk_config_parameter(param: ConfigParameter) -> sdk::ConfigParameter {
    sdk::ConfigParameter::builder()
        .set_parameter_key(param.parameter_key)
        .set_parameter_value(param.parameter_value)
        .build()
}

fn into_workgroup_detail(workgroup: sdk::Workgroup) -> WorkgroupDetail {
    WorkgroupDetail {
        workgroup_id: workgroup.workgroup_id,
        workgroup_arn: workgroup.workgroup_arn,
        workgroup_name: workgroup.workgroup_name,
        namespace_name: workgroup.namespace_name,
        status: workgroup.status.and_then(into_workgroup_status),
        base_capacity: workgroup.base_capacity,
        max_capacity: workgroup.max_capacity,
        enhanced_vpc_routing: workgroup.enhanced_vpc_routing,
        config_parameters: workgroup.config_parameters.map(|params| {
            params
                .into_iter()
                .map(|param| ConfigParameter {
                    parameter_key: param.parameter_key,
                    parameter_value: param.parameter_value,
                })
                .collect()
        }),
        publicly_accessible: workgroup.publicly_accessible,
        subnet_ids: workgroup.subnet_ids,
        security_group_ids: workgroup.security_group_ids,
        port: workgroup.port,
        creation_date: workgroup
            .creation_date
            .and_then(|date| date.fmt(Format::DateTime).ok()),
    }
}

fn into_namespace_detail(namespace: sdk::Namespace) -> NamespaceDetail {
    NamespaceDetail {
        namespace_id: namespace.namespace_id,
        namespace_arn: namespace.namespace_arn,
        namespace_name: namespace.namespace_name,
        status: namespace.status.and_then(into_namespace_status),
        creation_date: namespace
            .creation_date
            .and_then(|date| date.fmt(Format::DateTime).ok()),
    }
}

fn into_workgroup_status(status: sdk::WorkgroupStatus) -> Option<WorkgroupStatus> {
    match status {
        sdk::WorkgroupStatus::Creating => Some(WorkgroupStatus::Creating),
        sdk::WorkgroupStatus::Available => Some(WorkgroupStatus::Available),
        sdk::WorkgroupStatus::Modifying => Some(WorkgroupStatus::Modifying),
        sdk::WorkgroupStatus::Deleting => Some(WorkgroupStatus::Deleting),
        _ => None,
    }
}

fn into_namespace_status(status: sdk::NamespaceStatus) -> Option<NamespaceStatus> {
    match status {
        sdk::NamespaceStatus::Available => Some(NamespaceStatus::Available),
        sdk::NamespaceStatus::Modifying => Some(NamespaceStatus::Modifying),
        sdk::NamespaceStatus::Deleting => Some(NamespaceStatus::Deleting),
        _ => None,
    }
}
