//! Axum extractor for validated payloads
//!
//! `ValidatedJson<T>` parses the body, normalizes it, and checks the field
//! rules. Failures are returned as [`CrmError`] so they render as the standard
//! 400 envelope with itemized field errors.

use super::filters::Normalize;
use crate::core::error::{CrmError, FieldValidationError, ValidationError};
use axum::{
    Json,
    extract::{FromRequest, Request},
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

/// Axum extractor that validates and filters a JSON payload
///
/// # Usage
///
/// ```rust,ignore
/// pub async fn create_customer(
///     State(state): State<AppState>,
///     ValidatedJson(payload): ValidatedJson<NewCustomer>,
/// ) -> Result<impl IntoResponse, CrmError> {
///     // payload is already trimmed and validated
/// }
/// ```
#[derive(Debug, Clone)]
pub struct ValidatedJson<T>(pub T);

impl<S, T> FromRequest<S> for ValidatedJson<T>
where
    S: Send + Sync,
    T: DeserializeOwned + Validate + Normalize + Send,
{
    type Rejection = CrmError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(mut payload) = Json::<T>::from_request(req, state)
            .await
            .map_err(|rejection| ValidationError::InvalidJson {
                message: rejection.body_text(),
            })?;

        payload.normalize();
        payload
            .validate()
            .map_err(|errors| ValidationError::FieldErrors(field_errors(&errors)))?;

        Ok(ValidatedJson(payload))
    }
}

/// Flatten `validator` output into camelCase, field-sorted entries
pub fn field_errors(errors: &ValidationErrors) -> Vec<FieldValidationError> {
    let mut out: Vec<FieldValidationError> = errors
        .field_errors()
        .into_iter()
        .flat_map(|(field, errs)| {
            let field = camel_case(&field);
            errs.iter().map(move |e| {
                let message = e
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value ({})", e.code));
                FieldValidationError::new(field.clone(), message)
            })
        })
        .collect();
    out.sort_by(|a, b| a.field.cmp(&b.field));
    out
}

fn camel_case(snake: &str) -> String {
    let mut out = String::with_capacity(snake.len());
    let mut upper = false;
    for ch in snake.chars() {
        if ch == '_' {
            upper = true;
        } else if upper {
            out.extend(ch.to_uppercase());
            upper = false;
        } else {
            out.push(ch);
        }
    }
    out
}
