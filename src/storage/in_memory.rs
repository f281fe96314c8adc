//! In-memory implementation of CustomerStore for development and tests

use crate::core::engine;
use crate::core::error::StoreError;
use crate::core::model::{
    Address, AddressPatch, CityCount, Customer, CustomerPatch, CustomerWithAddresses, NewAddress,
    NewCustomer, StoreSummary,
};
use crate::core::query::{CustomerPage, CustomerQuery};
use crate::core::service::CustomerStore;
use async_trait::async_trait;
use indexmap::IndexMap;
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// In-memory customer store
///
/// Both collections sit behind one `RwLock`, so a cascade delete is a single
/// critical section. `IndexMap` keeps insertion order, which is the tie order
/// for sorting and the order of `get_customer_addresses`.
#[derive(Clone, Default)]
pub struct InMemoryCustomerStore {
    state: Arc<RwLock<MemoryState>>,
}

#[derive(Default)]
struct MemoryState {
    customers: IndexMap<i64, Customer>,
    addresses: IndexMap<i64, Address>,
    last_customer_id: i64,
    last_address_id: i64,
}

impl MemoryState {
    fn phone_in_use(&self, phone_number: &str, except: Option<i64>) -> bool {
        self.customers
            .values()
            .any(|c| c.phone_number == phone_number && Some(c.id) != except)
    }

    fn next_customer_id(&mut self) -> i64 {
        self.last_customer_id += 1;
        self.last_customer_id
    }

    fn next_address_id(&mut self) -> i64 {
        self.last_address_id += 1;
        self.last_address_id
    }
}

impl InMemoryCustomerStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, MemoryState>, StoreError> {
        self.state
            .read()
            .map_err(|_| StoreError::LockPoisoned("customer store read"))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, MemoryState>, StoreError> {
        self.state
            .write()
            .map_err(|_| StoreError::LockPoisoned("customer store write"))
    }
}

#[async_trait]
impl CustomerStore for InMemoryCustomerStore {
    async fn get_customer(&self, id: i64) -> Result<Option<Customer>, StoreError> {
        Ok(self.read()?.customers.get(&id).cloned())
    }

    async fn list_customers(&self, query: &CustomerQuery) -> Result<CustomerPage, StoreError> {
        let state = self.read()?;

        let mut by_customer: HashMap<i64, Vec<Address>> = HashMap::new();
        for address in state.addresses.values() {
            by_customer
                .entry(address.customer_id)
                .or_default()
                .push(address.clone());
        }

        let records = state.customers.values().map(|customer| {
            let addresses = by_customer.remove(&customer.id).unwrap_or_default();
            CustomerWithAddresses::new(customer.clone(), addresses)
        });

        Ok(engine::list_customers(records, query))
    }

    async fn create_customer(&self, data: NewCustomer) -> Result<Customer, StoreError> {
        let mut state = self.write()?;

        if state.phone_in_use(&data.phone_number, None) {
            return Err(StoreError::PhoneNumberTaken(data.phone_number));
        }

        let customer = data.into_customer(state.next_customer_id());
        state.customers.insert(customer.id, customer.clone());

        Ok(customer)
    }

    async fn update_customer(
        &self,
        id: i64,
        patch: CustomerPatch,
    ) -> Result<Option<Customer>, StoreError> {
        let mut state = self.write()?;

        if !state.customers.contains_key(&id) {
            return Ok(None);
        }
        if let Some(phone_number) = &patch.phone_number {
            if state.phone_in_use(phone_number, Some(id)) {
                return Err(StoreError::PhoneNumberTaken(phone_number.clone()));
            }
        }

        let Some(customer) = state.customers.get_mut(&id) else {
            return Ok(None);
        };
        patch.apply_to(customer);

        Ok(Some(customer.clone()))
    }

    async fn delete_customer(&self, id: i64) -> Result<bool, StoreError> {
        let mut state = self.write()?;

        if state.customers.shift_remove(&id).is_none() {
            return Ok(false);
        }
        state.addresses.retain(|_, address| address.customer_id != id);

        Ok(true)
    }

    async fn get_address(&self, id: i64) -> Result<Option<Address>, StoreError> {
        Ok(self.read()?.addresses.get(&id).cloned())
    }

    async fn get_customer_addresses(&self, customer_id: i64) -> Result<Vec<Address>, StoreError> {
        Ok(self
            .read()?
            .addresses
            .values()
            .filter(|address| address.customer_id == customer_id)
            .cloned()
            .collect())
    }

    async fn create_address(&self, data: NewAddress) -> Result<Address, StoreError> {
        let mut state = self.write()?;

        let address = data.into_address(state.next_address_id());
        state.addresses.insert(address.id, address.clone());

        Ok(address)
    }

    async fn update_address(
        &self,
        id: i64,
        patch: AddressPatch,
    ) -> Result<Option<Address>, StoreError> {
        let mut state = self.write()?;

        let Some(address) = state.addresses.get_mut(&id) else {
            return Ok(None);
        };
        patch.apply_to(address);

        Ok(Some(address.clone()))
    }

    async fn delete_address(&self, id: i64) -> Result<bool, StoreError> {
        Ok(self.write()?.addresses.shift_remove(&id).is_some())
    }

    async fn summary(&self) -> Result<StoreSummary, StoreError> {
        let state = self.read()?;

        let mut cities: BTreeMap<&str, usize> = BTreeMap::new();
        for address in state.addresses.values() {
            *cities.entry(address.city.as_str()).or_default() += 1;
        }

        Ok(StoreSummary {
            total_customers: state.customers.len(),
            total_addresses: state.addresses.len(),
            cities: cities
                .into_iter()
                .map(|(city, addresses)| CityCount {
                    city: city.to_string(),
                    addresses,
                })
                .collect(),
        })
    }
}
