//! Service error taxonomy and its classification into handler error codes.
//!
//! [`ApiError`] is the provider-owned view of the exceptions the Redshift
//! Serverless API can raise. [`classify`] maps every variant to exactly one
//! [`HandlerErrorCode`]; the mapping is pure and total, so the same error
//! always classifies the same way.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Marker emitted by the service when another operation holds the workgroup.
/// A conflict carrying this message is retriable, not fatal.
pub const BUSY_WORKGROUP_RETRY_MESSAGE: &str =
    "There is an operation running on the existing workgroup";

static ALREADY_EXISTS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)already exists").expect("static pattern"));

/// Errors raised by the workgroup service API.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("conflict: {0}")]
    Conflict(String),

    #[error("insufficient capacity: {0}")]
    InsufficientCapacity(String),

    #[error("resource not found: {0}")]
    NotFound(String),

    #[error("internal service error: {0}")]
    InternalServer(String),

    #[error("too many tags: {0}")]
    TooManyTags(String),

    #[error("throttled: {0}")]
    Throttling(String),

    #[error("service error: {0}")]
    Other(String),
}

impl ApiError {
    /// The raw service message, without the variant prefix.
    pub fn message(&self) -> &str {
        match self {
            Self::Validation(m)
            | Self::Conflict(m)
            | Self::InsufficientCapacity(m)
            | Self::NotFound(m)
            | Self::InternalServer(m)
            | Self::TooManyTags(m)
            | Self::Throttling(m)
            | Self::Other(m) => m,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }

    /// True for the one conflict the step executor retries instead of
    /// failing: the service reporting that an operation is already running
    /// on the workgroup.
    pub fn is_retriable_conflict(&self) -> bool {
        matches!(self, Self::Conflict(message) if message.contains(BUSY_WORKGROUP_RETRY_MESSAGE))
    }
}

/// The fixed error taxonomy surfaced to the external scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum HandlerErrorCode {
    InvalidRequest,
    AlreadyExists,
    ResourceConflict,
    NotFound,
    InternalFailure,
    Timeout,
    GeneralServiceException,
}

/// Map a service error to its handler error code.
///
/// Conflicts and capacity errors whose message mentions "already exists"
/// (case-insensitive) indicate a name collision rather than a transient
/// conflict, and classify as [`HandlerErrorCode::AlreadyExists`].
pub fn classify(error: &ApiError) -> HandlerErrorCode {
    match error {
        ApiError::Validation(_) | ApiError::TooManyTags(_) => HandlerErrorCode::InvalidRequest,
        ApiError::Conflict(message) | ApiError::InsufficientCapacity(message) => {
            if ALREADY_EXISTS.is_match(message) {
                HandlerErrorCode::AlreadyExists
            } else {
                HandlerErrorCode::ResourceConflict
            }
        }
        ApiError::NotFound(_) => HandlerErrorCode::NotFound,
        ApiError::InternalServer(_) => HandlerErrorCode::InternalFailure,
        ApiError::Throttling(_) | ApiError::Other(_) => HandlerErrorCode::GeneralServiceException,
    }
}
