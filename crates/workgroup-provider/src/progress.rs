//! Progress events returned to the external scheduler.
//!
//! Every handler invocation produces exactly one [`ProgressEvent`]. A
//! `Failed` event terminates the operation; an `InProgress` event asks the
//! scheduler to re-invoke the handler after the requested delay, passing the
//! carried callback context and resource model back in.

use serde::{Deserialize, Serialize};

use crate::context::CallbackContext;
use crate::error::{ApiError, HandlerErrorCode, classify};
use crate::model::ResourceModel;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "Status")]
pub enum ProgressEvent {
    /// The operation has more work to do; re-invoke after the delay.
    #[serde(rename_all = "PascalCase")]
    InProgress {
        callback_delay_seconds: u64,
        callback_context: CallbackContext,
        resource_model: ResourceModel,
    },
    /// Terminal success. Delete operations carry no model.
    #[serde(rename_all = "PascalCase")]
    Success {
        resource_model: Option<ResourceModel>,
    },
    /// Terminal failure with the classified error kind and raw message.
    #[serde(rename_all = "PascalCase")]
    Failed {
        error_code: HandlerErrorCode,
        message: String,
    },
}

impl ProgressEvent {
    pub fn in_progress(
        delay_seconds: u64,
        context: CallbackContext,
        model: ResourceModel,
    ) -> Self {
        Self::InProgress {
            callback_delay_seconds: delay_seconds,
            callback_context: context,
            resource_model: model,
        }
    }

    pub fn success(model: ResourceModel) -> Self {
        Self::Success {
            resource_model: Some(model),
        }
    }

    pub fn success_without_model() -> Self {
        Self::Success {
            resource_model: None,
        }
    }

    pub fn failed(code: HandlerErrorCode, message: impl Into<String>) -> Self {
        Self::Failed {
            error_code: code,
            message: message.into(),
        }
    }

    /// Terminal failure carrying the classified kind of a service error.
    pub fn from_error(error: &ApiError) -> Self {
        Self::failed(classify(error), error.message())
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::InProgress { .. })
    }
}
