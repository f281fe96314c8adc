//! JSON envelope shared by every endpoint
//!
//! All responses have the shape
//! `{ success, data?, total?, message?, code?, errors? }`.

use crate::core::error::FieldValidationError;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,

    /// Number of matching records before pagination (list endpoints only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub total: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,

    /// Machine-readable error code (failures only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    /// Itemized field errors (validation failures only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<FieldValidationError>>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            total: None,
            message: None,
            code: None,
            errors: None,
        }
    }

    pub fn page(data: T, total: usize) -> Self {
        Self {
            total: Some(total),
            ..Self::ok(data)
        }
    }
}

impl ApiResponse<()> {
    /// Success without a payload, e.g. after a delete
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            success: true,
            data: None,
            total: None,
            message: Some(message.into()),
            code: None,
            errors: None,
        }
    }

    pub fn failure(
        code: &str,
        message: impl Into<String>,
        errors: Option<Vec<FieldValidationError>>,
    ) -> Self {
        Self {
            success: false,
            data: None,
            total: None,
            message: Some(message.into()),
            code: Some(code.to_string()),
            errors,
        }
    }
}
