//! The seam between handler logic and the Redshift Serverless API.
//!
//! Handlers depend on this trait only; [`crate::sdk::SdkWorkgroupClient`] is
//! the production implementation and tests substitute a mock.

use async_trait::async_trait;

use crate::error::ApiError;
use crate::model::{NamespaceDetail, ResourceModel, Tag, WorkgroupDetail};

/// The subset of the Redshift Serverless API the workgroup handlers call.
///
/// Mutating calls take the full resource model; the implementation is
/// responsible for translating only the populated fields into the service
/// request, so a delta model with `None` fields produces a partial update.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait WorkgroupApi: Send + Sync {
    async fn create_workgroup(&self, model: &ResourceModel) -> Result<WorkgroupDetail, ApiError>;

    async fn get_workgroup(&self, workgroup_name: &str) -> Result<WorkgroupDetail, ApiError>;

    async fn update_workgroup(&self, model: &ResourceModel) -> Result<WorkgroupDetail, ApiError>;

    async fn delete_workgroup(&self, workgroup_name: &str) -> Result<WorkgroupDetail, ApiError>;

    async fn get_namespace(&self, namespace_name: &str) -> Result<NamespaceDetail, ApiError>;

    async fn list_tags(&self, resource_arn: &str) -> Result<Vec<Tag>, ApiError>;

    async fn tag_resource(&self, resource_arn: &str, tags: &[Tag]) -> Result<(), ApiError>;

    async fn untag_resource(&self, resource_arn: &str, tag_keys: &[String]) -> Result<(), ApiError>;
}
