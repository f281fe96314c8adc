//! Shared test harness for storage backend testing
//!
//! Provides payload builders and assertions used by the
//! `customer_store_tests!` and `rest_integration_tests!` macros.
//!
//! # Usage
//!
//! From any integration test file in `tests/`:
//! ```rust,ignore
//! #[macro_use]
//! mod storage_harness;
//! use storage_harness::*;
//!
//! customer_store_tests!(InMemoryCustomerStore::new());
//! rest_integration_tests!(InMemoryCustomerStore::new());
//! ```

#![allow(dead_code)]

#[macro_use]
pub mod customer_store_tests;


use crm::core::model::{NewAddress, NewCustomer};
use crm::core::query::CustomerPage;

// ---------------------------------------------------------------------------
// Payload builders
// ---------------------------------------------------------------------------

/// A customer with a phone number derived from `n`, unique per `n`
pub fn customer_payload(first_name: &str, last_name: &str, n: u32) -> NewCustomer {
    NewCustomer::new(first_name, last_name, phone(n))
}

/// `+91 90000 0000n`-style number, always 16 characters
pub fn phone(n: u32) -> String {
    format!("+91 90000 {:05}", n)
}

pub fn address_payload(customer_id: i64, city: &str, state: &str, pin_code: &str) -> NewAddress {
    NewAddress::new(
        customer_id,
        format!("{} Residency Road", pin_code),
        city,
        state,
        pin_code,
    )
}

// ---------------------------------------------------------------------------
// Assertions
// ---------------------------------------------------------------------------

pub fn first_names(page: &CustomerPage) -> Vec<&str> {
    page.customers
        .iter()
        .map(|c| c.customer.first_name.as_str())
        .collect()
}

/// Assert that a list contains exactly `n` items.
pub fn assert_count<T>(list: &[T], expected: usize) {
    assert_eq!(
        list.len(),
        expected,
        "Expected {} items, got {}",
        expected,
        list.len()
    );
}

/// Names of the `data` array of a list response body
pub fn json_first_names(body: &serde_json::Value) -> Vec<String> {
    body["data"]
        .as_array()
        .map(|customers| {
            customers
                .iter()
                .filter_map(|c| c["firstName"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}
