//! Error Body for FIDUS API Responses
//!
//! Non-2xx responses carry a JSON body of the shape defined here. Clients
//! parse it to recover the error category and the human-readable message;
//! the HTTP status code on the response is the transport-level source of
//! truth and `ErrorCode::status_code` mirrors it.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// ERROR CODE ENUM
// ============================================================================

/// Error codes the backend uses to categorize failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ------------------------------------------------------------------
    // Validation errors (400)
    // ------------------------------------------------------------------
    /// Request validation failed
    ValidationFailed,
    /// Request contains invalid input data
    InvalidInput,
    /// Required field is missing from the request
    MissingField,

    // ------------------------------------------------------------------
    // Not found errors (404)
    // ------------------------------------------------------------------
    /// Requested client does not exist
    ClientNotFound,
    /// Requested asset does not exist
    AssetNotFound,
    /// Requested allocation does not exist
    AllocationNotFound,

    // ------------------------------------------------------------------
    // Conflict errors (409)
    // ------------------------------------------------------------------
    /// Another client already uses this email address
    EmailAlreadyInUse,
    /// Operation conflicts with current state
    StateConflict,

    // ------------------------------------------------------------------
    // Server errors (500, 503)
    // ------------------------------------------------------------------
    /// Internal server error
    InternalError,
    /// Backend is temporarily unavailable
    ServiceUnavailable,
}

impl ErrorCode {
    /// HTTP status code this error category is served with.
    pub fn status_code(&self) -> u16 {
        match self {
            ErrorCode::ValidationFailed
            | ErrorCode::InvalidInput
            | ErrorCode::MissingField => 400,
            ErrorCode::ClientNotFound
            | ErrorCode::AssetNotFound
            | ErrorCode::AllocationNotFound => 404,
            ErrorCode::EmailAlreadyInUse | ErrorCode::StateConflict => 409,
            ErrorCode::InternalError => 500,
            ErrorCode::ServiceUnavailable => 503,
        }
    }

    /// Default human-readable message for the category.
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::ValidationFailed => "Request validation failed",
            ErrorCode::InvalidInput => "Invalid input data",
            ErrorCode::MissingField => "Required field is missing",
            ErrorCode::ClientNotFound => "Client not found",
            ErrorCode::AssetNotFound => "Asset not found",
            ErrorCode::AllocationNotFound => "Allocation not found",
            ErrorCode::EmailAlreadyInUse => "Email is already in use",
            ErrorCode::StateConflict => "Operation conflicts with current state",
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::ServiceUnavailable => "Service temporarily unavailable",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

// ============================================================================
// API ERROR BODY
// ============================================================================

/// Structured error body returned by the backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiError {
    /// Error code categorizing the error
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details (field errors, hints)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Build an error from a code, using the category's default message.
    pub fn from_code(code: ErrorCode) -> Self {
        Self {
            code,
            message: code.default_message().to_string(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn status_code(&self) -> u16 {
        self.code.status_code()
    }

    /// Whether this is the duplicate-email conflict clients special-case
    /// onto the email field.
    pub fn is_email_conflict(&self) -> bool {
        self.code == ErrorCode::EmailAlreadyInUse
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

// ============================================================================
// TESTS
// ============================================================================
