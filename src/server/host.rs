//! Shared application state handed to every handler

use crate::config::QueryConfig;
use crate::core::query::{CustomerQuery, ListCustomersParams};
use crate::core::service::CustomerStore;
use std::sync::Arc;

/// State shared across handlers
///
/// Cloned per request; the store itself lives behind an `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// Storage backend chosen at startup
    pub store: Arc<dyn CustomerStore>,

    /// Defaults for customer list requests
    pub query: QueryConfig,
}

impl AppState {
    pub fn new(store: Arc<dyn CustomerStore>, query: QueryConfig) -> Self {
        Self { store, query }
    }

    /// Turn raw list parameters into criteria using the configured defaults
    pub fn customer_query(&self, params: &ListCustomersParams) -> CustomerQuery {
        CustomerQuery::from_params(params, self.query.default_limit, self.query.location_match)
    }
}
