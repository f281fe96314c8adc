//! Storage implementations for different backends

pub mod in_memory;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod seed;

pub use crate::core::error::StoreError;
pub use in_memory::InMemoryCustomerStore;
#[cfg(feature = "postgres")]
pub use postgres::PostgresCustomerStore;
pub use seed::seed_sample_data;
