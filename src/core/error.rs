//! Typed error handling for the CRM service
//!
//! Handlers return [`CrmError`], which knows its HTTP status and renders the
//! standard JSON envelope. Storage backends return [`StoreError`]; handlers
//! convert it with [`CrmError::from_store`], naming the operation that failed
//! so the client gets a generic message and the log gets the cause.
//!
//! # Error Categories
//!
//! - [`EntityError`]: a referenced record does not exist (404)
//! - [`ValidationError`]: malformed ids, bodies, or field values (400)
//! - [`CrmError::Storage`]: unexpected backend failure (500)
//!
//! # Example
//!
//! ```rust,ignore
//! let customer = store
//!     .get_customer(id)
//!     .await
//!     .map_err(|e| CrmError::from_store("fetch customer", e))?
//!     .ok_or(CrmError::not_found(EntityKind::Customer, id))?;
//! ```

use crate::core::model::EntityKind;
use crate::core::response::ApiResponse;
use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use std::fmt;

/// The main error type for request handling
#[derive(Debug)]
pub enum CrmError {
    /// A referenced record is absent
    Entity(EntityError),

    /// Input was rejected before any mutation
    Validation(ValidationError),

    /// The storage backend failed while performing `operation`
    Storage {
        operation: &'static str,
        source: StoreError,
    },
}

impl fmt::Display for CrmError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrmError::Entity(e) => write!(f, "{}", e),
            CrmError::Validation(e) => write!(f, "{}", e),
            CrmError::Storage { operation, .. } => write!(f, "Failed to {}", operation),
        }
    }
}

impl std::error::Error for CrmError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CrmError::Entity(e) => Some(e),
            CrmError::Validation(e) => Some(e),
            CrmError::Storage { source, .. } => Some(source),
        }
    }
}

impl CrmError {
    pub fn not_found(entity: EntityKind, id: i64) -> Self {
        CrmError::Entity(EntityError::NotFound { entity, id })
    }

    pub fn invalid_id(entity: EntityKind, value: impl Into<String>) -> Self {
        CrmError::Validation(ValidationError::InvalidId {
            entity,
            value: value.into(),
        })
    }

    /// Classify a backend error raised while performing `operation`
    ///
    /// Constraint violations the client can act on become validation or
    /// not-found errors; everything else is an internal storage failure.
    pub fn from_store(operation: &'static str, err: StoreError) -> Self {
        match err {
            StoreError::PhoneNumberTaken(phone) => {
                CrmError::Validation(ValidationError::FieldErrors(vec![FieldValidationError::new(
                    "phoneNumber",
                    format!("Phone number '{}' is already in use", phone),
                )]))
            }
            StoreError::CustomerMissing(id) => CrmError::not_found(EntityKind::Customer, id),
            source => CrmError::Storage { operation, source },
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            CrmError::Entity(e) => e.status_code(),
            CrmError::Validation(_) => StatusCode::BAD_REQUEST,
            CrmError::Storage { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            CrmError::Entity(e) => e.error_code(),
            CrmError::Validation(e) => e.error_code(),
            CrmError::Storage { .. } => "STORAGE_ERROR",
        }
    }

    /// Convert to the failure envelope
    pub fn to_response(&self) -> ApiResponse<()> {
        let errors = match self {
            CrmError::Validation(ValidationError::FieldErrors(errors)) => Some(errors.clone()),
            _ => None,
        };
        ApiResponse::failure(self.error_code(), self.to_string(), errors)
    }
}

impl IntoResponse for CrmError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        match &self {
            CrmError::Storage { operation, source } => {
                tracing::error!(error = %source, "storage failure during '{}'", operation);
            }
            other => {
                tracing::warn!(status = %status, error = %other, "request rejected");
            }
        }
        (status, Json(self.to_response())).into_response()
    }
}

// =============================================================================
// Entity Errors
// =============================================================================

#[derive(Debug)]
pub enum EntityError {
    NotFound { entity: EntityKind, id: i64 },
}

impl fmt::Display for EntityError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityError::NotFound { entity, .. } => write!(f, "{} not found", entity),
        }
    }
}

impl std::error::Error for EntityError {}

impl EntityError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            EntityError::NotFound { .. } => StatusCode::NOT_FOUND,
        }
    }

    pub fn error_code(&self) -> &'static str {
        match self {
            EntityError::NotFound {
                entity: EntityKind::Customer,
                ..
            } => "CUSTOMER_NOT_FOUND",
            EntityError::NotFound {
                entity: EntityKind::Address,
                ..
            } => "ADDRESS_NOT_FOUND",
        }
    }
}

impl From<EntityError> for CrmError {
    fn from(err: EntityError) -> Self {
        CrmError::Entity(err)
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

#[derive(Debug)]
pub enum ValidationError {
    /// One or more payload fields broke their rules
    FieldErrors(Vec<FieldValidationError>),

    /// A path id is not an integer
    InvalidId { entity: EntityKind, value: String },

    /// The body is not JSON, or not JSON of the expected shape
    InvalidJson { message: String },
}

/// A single field validation error
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldValidationError {
    pub field: String,
    pub message: String,
}

impl FieldValidationError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::FieldErrors(_) => write!(f, "Validation failed"),
            ValidationError::InvalidId { entity, .. } => {
                write!(f, "Invalid {} ID", entity.as_str())
            }
            ValidationError::InvalidJson { message } => {
                write!(f, "Invalid request body: {}", message)
            }
        }
    }
}

impl std::error::Error for ValidationError {}

impl ValidationError {
    pub fn error_code(&self) -> &'static str {
        match self {
            ValidationError::FieldErrors(_) => "VALIDATION_ERROR",
            ValidationError::InvalidId { .. } => "INVALID_ID",
            ValidationError::InvalidJson { .. } => "INVALID_JSON",
        }
    }
}

impl From<ValidationError> for CrmError {
    fn from(err: ValidationError) -> Self {
        CrmError::Validation(err)
    }
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors raised by [`CustomerStore`](crate::core::service::CustomerStore)
/// implementations
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("phone number '{0}' is already in use")]
    PhoneNumberTaken(String),

    #[error("customer {0} does not exist")]
    CustomerMissing(i64),

    #[error("failed to acquire {0} lock: poisoned")]
    LockPoisoned(&'static str),

    #[error("data integrity error: {0}")]
    Integrity(String),

    #[cfg(feature = "postgres")]
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}
