//! Validation and filtering of request payloads
//!
//! Payload types derive [`validator::Validate`] for their field rules and
//! implement [`filters::Normalize`] to clean fields up first. The
//! [`ValidatedJson`] extractor runs both before a handler sees the payload.

pub mod extractor;
pub mod filters;

pub use extractor::{ValidatedJson, field_errors};
pub use filters::Normalize;
