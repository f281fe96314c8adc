//! # crm-rs
//!
//! A small customer and address record-keeper exposed as a JSON REST API.
//!
//! ## Features
//!
//! - **Query Engine**: free-text search, city/state/PIN filters, stable sorting, pagination
//! - **Pluggable Storage**: in-memory or PostgreSQL behind one `CustomerStore` trait
//! - **Cascade Delete**: removing a customer removes its addresses atomically
//! - **Validated Payloads**: trimmed and checked before any write
//! - **Configuration**: YAML file overlaid with `CRM_*` environment variables
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use crm::prelude::*;
//!
//! let store = InMemoryCustomerStore::new();
//! seed_sample_data(&store).await?;
//!
//! ServerBuilder::new()
//!     .with_store(store)
//!     .serve("127.0.0.1:5000")
//!     .await?;
//! ```

pub mod config;
pub mod core;
pub mod server;
pub mod storage;

/// Re-exports of commonly used types and traits
pub mod prelude {
    // === Records ===
    pub use crate::core::model::{
        Address, AddressPatch, CityCount, Customer, CustomerPatch, CustomerWithAddresses,
        EntityKind, NewAddress, NewCustomer, StoreSummary,
    };

    // === Query Engine ===
    pub use crate::core::query::{
        CustomerPage, CustomerQuery, ListCustomersParams, LocationMatch, SortField, SortOrder,
    };

    // === Storage ===
    pub use crate::core::service::CustomerStore;
    #[cfg(feature = "postgres")]
    pub use crate::storage::PostgresCustomerStore;
    pub use crate::storage::{InMemoryCustomerStore, seed_sample_data};

    // === Errors & Responses ===
    pub use crate::core::error::{CrmError, FieldValidationError, StoreError};
    pub use crate::core::response::ApiResponse;

    // === Configuration ===
    pub use crate::config::{AppConfig, ConfigError, StorageBackend};

    // === Server ===
    pub use crate::server::{AppState, ServerBuilder};

    // === Re-exports from dependencies ===
    pub use async_trait::async_trait;
}
