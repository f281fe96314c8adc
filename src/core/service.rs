//! Storage contract for customers and their addresses

use crate::core::error::StoreError;
use crate::core::model::{
    Address, AddressPatch, Customer, CustomerPatch, NewAddress, NewCustomer, StoreSummary,
};
use crate::core::query::{CustomerPage, CustomerQuery};
use async_trait::async_trait;

/// Service trait implemented by every storage backend
///
/// The backend is chosen once at startup and shared behind an
/// `Arc<dyn CustomerStore>`. Ids are assigned by the store, increase
/// monotonically per entity type and are never reused.
#[async_trait]
pub trait CustomerStore: Send + Sync {
    async fn get_customer(&self, id: i64) -> Result<Option<Customer>, StoreError>;

    /// Run the customer query engine
    async fn list_customers(&self, query: &CustomerQuery) -> Result<CustomerPage, StoreError>;

    /// Fails with [`StoreError::PhoneNumberTaken`] if the phone number is in use
    async fn create_customer(&self, data: NewCustomer) -> Result<Customer, StoreError>;

    /// Merge the supplied fields; `None` if the customer does not exist
    async fn update_customer(
        &self,
        id: i64,
        patch: CustomerPatch,
    ) -> Result<Option<Customer>, StoreError>;

    /// Delete the customer and all of its addresses as one unit
    ///
    /// Returns whether the customer existed.
    async fn delete_customer(&self, id: i64) -> Result<bool, StoreError>;

    async fn get_address(&self, id: i64) -> Result<Option<Address>, StoreError>;

    /// Addresses of one customer in insertion order
    async fn get_customer_addresses(&self, customer_id: i64) -> Result<Vec<Address>, StoreError>;

    /// The caller is expected to have checked that `data.customer_id` exists
    async fn create_address(&self, data: NewAddress) -> Result<Address, StoreError>;

    async fn update_address(
        &self,
        id: i64,
        patch: AddressPatch,
    ) -> Result<Option<Address>, StoreError>;

    async fn delete_address(&self, id: i64) -> Result<bool, StoreError>;

    /// Totals and per-city address counts
    async fn summary(&self) -> Result<StoreSummary, StoreError>;
}
