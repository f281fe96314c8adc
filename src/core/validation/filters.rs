//! Reusable field filters
//!
//! These filters transform payload fields before validation runs, so that
//! `"  "` is seen as empty and `" Delhi "` is stored as `"Delhi"`.

/// Payloads that clean up their own fields before validation
pub trait Normalize {
    fn normalize(&mut self);
}

/// Filter: trim surrounding whitespace in place
pub fn trim(value: &mut String) {
    let trimmed = value.trim();
    if trimmed.len() != value.len() {
        *value = trimmed.to_string();
    }
}

/// Filter: trim an optional field, keeping `None` as is
pub fn trim_opt(value: &mut Option<String>) {
    if let Some(s) = value.as_mut() {
        trim(s);
    }
}

/// Filter: trim a query value and drop it when blank or equal to `sentinel`
///
/// Used for list criteria, where the UI sends `"All Cities"` to mean "no
/// filter".
pub fn non_blank(value: Option<&str>, sentinel: Option<&str>) -> Option<String> {
    let trimmed = value?.trim();
    if trimmed.is_empty() || sentinel.is_some_and(|s| s == trimmed) {
        None
    } else {
        Some(trimmed.to_string())
    }
}
