//! Typed failure taxonomy for API calls and client-side validation errors.

use std::collections::BTreeMap;
use std::time::Duration;

use serde_json::Value;
use thiserror::Error;
use trialkit_frame::FrameError;

/// Fallback delay applied when a `Retry-After` header is present but not
/// numeric.
const RETRY_AFTER_FALLBACK: Duration = Duration::from_secs(5);

/// Typed failure for one logical API call.
///
/// Every variant carries enough information to decide retryability without
/// re-inspecting the transport response: [`ApiError::retryable`] and
/// [`ApiError::retry_after`] are derived from the value alone.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApiError {
    /// Request payload rejected by the server (HTTP 400).
    #[error("{message}")]
    Validation {
        message: String,
        detail: Option<String>,
    },

    /// API key missing or invalid (HTTP 401).
    #[error("{message}")]
    Authentication {
        message: String,
        detail: Option<String>,
    },

    /// API key lacks the required role (HTTP 403).
    #[error("{message}")]
    Authorization {
        message: String,
        detail: Option<String>,
    },

    /// Requested resource does not exist (HTTP 404).
    #[error("{message}")]
    NotFound {
        message: String,
        detail: Option<String>,
    },

    /// Request was rate limited (HTTP 429); `retry_after` is the
    /// server-provided wait when the header was present.
    #[error("{message}")]
    RateLimit {
        message: String,
        detail: Option<String>,
        retry_after: Option<Duration>,
    },

    /// Server-side failure (HTTP 5xx), original status preserved.
    #[error("{message} (status {status})")]
    Server {
        message: String,
        detail: Option<String>,
        status: u16,
    },

    /// Transport-level failure that never produced an HTTP status.
    #[error("{message}")]
    Network { message: String, retryable: bool },

    /// Any other status the taxonomy does not name.
    #[error("{message} (status {status})")]
    Unknown {
        message: String,
        detail: Option<String>,
        status: u16,
    },
}

impl ApiError {
    /// Whether the request engine may transparently re-issue the request.
    pub fn retryable(&self) -> bool {
        match self {
            Self::RateLimit { .. } => true,
            Self::Server { status, .. } => matches!(status, 500 | 502 | 503 | 504),
            Self::Network { retryable, .. } => *retryable,
            _ => false,
        }
    }

    /// Server-provided backoff hint, present only on rate-limit failures.
    pub fn retry_after(&self) -> Option<Duration> {
        match self {
            Self::RateLimit { retry_after, .. } => *retry_after,
            _ => None,
        }
    }

    /// HTTP status the failure was classified from, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Validation { .. } => Some(400),
            Self::Authentication { .. } => Some(401),
            Self::Authorization { .. } => Some(403),
            Self::NotFound { .. } => Some(404),
            Self::RateLimit { .. } => Some(429),
            Self::Server { status, .. } | Self::Unknown { status, .. } => Some(*status),
            Self::Network { .. } => None,
        }
    }

    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Validation { detail, .. }
            | Self::Authentication { detail, .. }
            | Self::Authorization { detail, .. }
            | Self::NotFound { detail, .. }
            | Self::RateLimit { detail, .. }
            | Self::Server { detail, .. }
            | Self::Unknown { detail, .. } => detail.as_deref(),
            Self::Network { .. } => None,
        }
    }
}

/// Maps a failed response onto the taxonomy.
///
/// Pure and deterministic: the same status, body, and headers always yield
/// the same failure. `body` is the decoded JSON error body when the
/// response declared one; `raw_body` is the unparsed response text used as
/// the detail fallback.
pub fn classify(
    status: u16,
    body: Option<&Value>,
    raw_body: &str,
    headers: &BTreeMap<String, String>,
) -> ApiError {
    let message = body
        .and_then(|value| value.get("message"))
        .and_then(Value::as_str)
        .map(str::to_owned)
        .unwrap_or_else(|| format!("HTTP {status} error"));

    let detail = body
        .and_then(|value| value.get("detail"))
        .and_then(Value::as_str)
        .map(str::to_owned)
        .or_else(|| (!raw_body.is_empty()).then(|| raw_body.to_owned()));

    match status {
        400 => ApiError::Validation { message, detail },
        401 => ApiError::Authentication { message, detail },
        403 => ApiError::Authorization { message, detail },
        404 => ApiError::NotFound { message, detail },
        429 => ApiError::RateLimit {
            message,
            detail,
            retry_after: retry_after_hint(headers),
        },
        500..=599 => ApiError::Server {
            message,
            detail,
            status,
        },
        _ => ApiError::Unknown {
            message,
            detail,
            status,
        },
    }
}

/// Parses a numeric `Retry-After` header into a wait duration.
///
/// A present but non-numeric value falls back to 5 seconds; an absent
/// header yields no hint.
fn retry_after_hint(headers: &BTreeMap<String, String>) -> Option<Duration> {
    let raw = headers.get("retry-after")?;
    let seconds = raw
        .trim()
        .parse::<f64>()
        .map(|value| value.max(0.0))
        .unwrap_or(RETRY_AFTER_FALLBACK.as_secs_f64());
    Some(Duration::from_secs_f64(seconds))
}

/// Client-side request payload validation errors.
///
/// These mirror the rules the server enforces so malformed payloads fail
/// before any network call is made.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field} cannot be empty")]
    EmptyField { field: &'static str },

    #[error("{field} length {len} exceeds max {max}")]
    FieldTooLong {
        field: &'static str,
        len: usize,
        max: usize,
    },

    #[error("experiment_type_id must be greater than zero")]
    InvalidExperimentTypeId,

    #[error("at most {max} tags may be attached, got {len}")]
    TooManyTags { len: usize, max: usize },

    #[error("column name '{name}' is reserved")]
    ReservedColumnName { name: String },

    #[error("column definition for '{name}' must include a type")]
    MissingColumnType { name: String },

    #[error("unsupported column type '{value}' for column '{name}'")]
    UnsupportedColumnType { name: String, value: String },

    #[error("page limit must be between 1 and {max}, got {value}")]
    InvalidPageLimit { value: usize, max: usize },

    #[error("search requires at least one tag")]
    EmptyTagFilter,
}

/// Top-level error type for the resource layer.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error("failed to decode response payload: {0}")]
    Decode(#[from] serde_json::Error),
}
