//! Resource model for the `AWS::RedshiftServerless::Workgroup` type.
//!
//! [`ResourceModel`] is the declarative state CloudFormation hands to the
//! provider (desired) or the provider hands back (observed). It serializes
//! with PascalCase member names to match the resource schema. The nested
//! [`WorkgroupDetail`] blob is read-only: it is only ever populated from a
//! service response, never from user input.

use serde::{Deserialize, Serialize};

/// CloudFormation resource type name, used in log lines.
pub const TYPE_NAME: &str = "AWS::RedshiftServerless::Workgroup";

/// Desired or observed state of a workgroup.
///
/// Every field except the workgroup name is optional; in a delta model
/// produced by [`crate::delta::compute_update_delta`], `None` means "no
/// change requested" for that field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct ResourceModel {
    pub workgroup_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_capacity: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_capacity: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enhanced_vpc_routing: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_parameters: Option<Vec<ConfigParameter>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publicly_accessible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subnet_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_group_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Tag>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workgroup: Option<WorkgroupDetail>,
}

impl ResourceModel {
    /// Build an observed model from a service read of the workgroup.
    ///
    /// Top-level mutable fields are echoed from the detail so that delta
    /// computation can compare desired against observed directly; tags are
    /// tracked separately through the tag APIs.
    pub fn from_detail(detail: WorkgroupDetail) -> Self {
        Self {
            workgroup_name: detail.workgroup_name.clone().unwrap_or_default(),
            namespace_name: detail.namespace_name.clone(),
            base_capacity: detail.base_capacity,
            max_capacity: detail.max_capacity,
            enhanced_vpc_routing: detail.enhanced_vpc_routing,
            config_parameters: detail.config_parameters.clone(),
            publicly_accessible: detail.publicly_accessible,
            subnet_ids: detail.subnet_ids.clone(),
            security_group_ids: detail.security_group_ids.clone(),
            port: detail.port,
            tags: None,
            workgroup: Some(detail),
        }
    }

    /// Attach (or replace) the read-only detail blob, keeping the declared
    /// fields as-is.
    pub fn with_detail(mut self, detail: WorkgroupDetail) -> Self {
        self.workgroup = Some(detail);
        self
    }

    /// ARN of the workgroup, when a service read has populated the detail.
    pub fn workgroup_arn(&self) -> Option<&str> {
        self.workgroup
            .as_ref()
            .and_then(|detail| detail.workgroup_arn.as_deref())
    }
}

/// A single workgroup configuration parameter (key/value pair).
///
/// Config parameters form an unordered set; ordering derives exist so the
/// delta calculator can compare two collections order-insensitively.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "PascalCase", default)]
pub struct ConfigParameter {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameter_key: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameter_value: Option<String>,
}

/// A resource tag.
#[derive(
    Debug, Clone, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "PascalCase")]
pub struct Tag {
    pub key: String,
    pub value: String,
}

impl Tag {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// Lifecycle status of a workgroup as reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WorkgroupStatus {
    Creating,
    Available,
    Modifying,
    Deleting,
}

/// Lifecycle status of a namespace as reported by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum NamespaceStatus {
    Available,
    Modifying,
    Deleting,
}

/// Read-only view of the service `Workgroup` shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct WorkgroupDetail {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workgroup_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workgroup_arn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub workgroup_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<WorkgroupStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub base_capacity: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_capacity: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enhanced_vpc_routing: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub config_parameters: Option<Vec<ConfigParameter>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publicly_accessible: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subnet_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub security_group_ids: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<String>,
}

impl WorkgroupDetail {
    /// True when the workgroup has reached its terminal healthy state.
    pub fn is_available(&self) -> bool {
        self.status == Some(WorkgroupStatus::Available)
    }
}

/// Read-only view of the service `Namespace` shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub struct NamespaceDetail {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace_arn: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub namespace_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<NamespaceStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub creation_date: Option<String>,
}

impl NamespaceDetail {
    pub fn is_available(&self) -> bool {
        self.status == Some(NamespaceStatus::Available)
    }
}
