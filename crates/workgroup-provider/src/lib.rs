//! CloudFormation resource handlers for AWS Redshift Serverless workgroups.
//!
//! This crate implements the Create/Read/Update/Delete lifecycle for the
//! `AWS::RedshiftServerless::Workgroup` resource type. Each lifecycle
//! operation is a small state machine driven by an external scheduler: the
//! handler performs at most one service call (plus one stabilization probe)
//! per invocation and returns a [`ProgressEvent`] telling the scheduler
//! whether to re-invoke later with the preserved [`CallbackContext`].
//!
//! Layering:
//!
//! - [`model`] - the declarative resource model (CloudFormation JSON shape)
//!   and provider-owned views of the service response shapes
//! - [`client`] - the [`WorkgroupApi`] trait, the seam between handler logic
//!   and the AWS service
//! - [`sdk`] - the `aws-sdk-redshiftserverless` implementation of that seam
//! - [`handlers`] - the dispatcher and per-operation state machines
//! - [`delta`], [`tags`] - idempotent change computation for updates
//! - [`error`] - the service error taxonomy and its classification into
//!   handler error codes
//!
//! Handler logic never talks to AWS directly, so it is fully testable
//! against a mocked [`WorkgroupApi`].

pub mod client;
pub mod config;
pub mod context;
pub mod delta;
pub mod error;
pub mod handlers;
pub mod model;
pub mod progress;
pub mod sdk;
pub mod tags;

pub use client::WorkgroupApi;
pub use config::{ConstantBackoff, ProviderConfig};
pub use context::{CallbackContext, Stage};
pub use error::{ApiError, HandlerErrorCode, classify};
pub use handlers::{Action, ResourceHandlerRequest, handle_request};
pub use model::{
    ConfigParameter, NamespaceDetail, NamespaceStatus, ResourceModel, Tag, WorkgroupDetail,
    WorkgroupStatus,
};
pub use progress::ProgressEvent;
pub use sdk::SdkWorkgroupClient;
