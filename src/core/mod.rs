//! Core module containing the record types, query engine and storage contract

pub mod engine;
pub mod error;
pub mod model;
pub mod query;
pub mod response;
pub mod service;
pub mod validation;

pub use error::{CrmError, EntityError, FieldValidationError, StoreError, ValidationError};
pub use model::{
    Address, AddressPatch, CityCount, Customer, CustomerPatch, CustomerWithAddresses, EntityKind,
    NewAddress, NewCustomer, StoreSummary,
};
pub use query::{
    CustomerPage, CustomerQuery, ListCustomersParams, LocationFilter, LocationMatch, SortField,
    SortOrder,
};
pub use response::ApiResponse;
pub use service::CustomerStore;
