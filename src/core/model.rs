//! Customer and address records
//!
//! Records are flat: a [`Customer`] owns zero or more [`Address`]es through
//! `Address::customer_id`. Create payloads ([`NewCustomer`], [`NewAddress`])
//! and partial-update payloads ([`CustomerPatch`], [`AddressPatch`]) carry the
//! field rules shared with the web form.

use crate::core::validation::filters::{Normalize, trim, trim_opt};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;
use validator::Validate;

/// Indian postal PIN code: exactly six digits
pub static PIN_CODE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\d{6}$").expect("PIN code pattern is valid"));

/// The two record kinds held by a store
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Customer,
    Address,
}

impl EntityKind {
    /// Lowercase name used in messages ("customer", "address")
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Customer => "customer",
            EntityKind::Address => "address",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntityKind::Customer => write!(f, "Customer"),
            EntityKind::Address => write!(f, "Address"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Customer {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub phone_number: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "postgres", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Address {
    pub id: i64,
    pub customer_id: i64,
    pub address_details: String,
    pub city: String,
    pub state: String,
    pub pin_code: String,
}

/// A customer together with (a view of) its addresses
///
/// Serializes flat: the customer fields plus an `addresses` array.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerWithAddresses {
    #[serde(flatten)]
    pub customer: Customer,
    pub addresses: Vec<Address>,
}

impl CustomerWithAddresses {
    pub fn new(customer: Customer, addresses: Vec<Address>) -> Self {
        Self {
            customer,
            addresses,
        }
    }
}

/// Payload for creating a customer
///
/// Missing fields deserialize to empty strings so that they are reported by
/// validation alongside every other field error.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct NewCustomer {
    #[validate(length(min = 1, max = 50, message = "First name is required (max 50 characters)"))]
    pub first_name: String,

    #[validate(length(min = 1, max = 50, message = "Last name is required (max 50 characters)"))]
    pub last_name: String,

    #[validate(length(min = 10, max = 20, message = "Phone number must be 10 to 20 characters"))]
    pub phone_number: String,
}

impl NewCustomer {
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        phone_number: impl Into<String>,
    ) -> Self {
        Self {
            first_name: first_name.into(),
            last_name: last_name.into(),
            phone_number: phone_number.into(),
        }
    }

    /// Materialize the record once the store has assigned an id
    pub fn into_customer(self, id: i64) -> Customer {
        Customer {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            phone_number: self.phone_number,
        }
    }
}

impl Normalize for NewCustomer {
    fn normalize(&mut self) {
        trim(&mut self.first_name);
        trim(&mut self.last_name);
        trim(&mut self.phone_number);
    }
}

/// Partial update of a customer; absent fields are left untouched
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 50, message = "First name must be 1 to 50 characters"))]
    pub first_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 50, message = "Last name must be 1 to 50 characters"))]
    pub last_name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 10, max = 20, message = "Phone number must be 10 to 20 characters"))]
    pub phone_number: Option<String>,
}

impl CustomerPatch {
    /// Merge the supplied fields into `customer`
    pub fn apply_to(self, customer: &mut Customer) {
        if let Some(first_name) = self.first_name {
            customer.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            customer.last_name = last_name;
        }
        if let Some(phone_number) = self.phone_number {
            customer.phone_number = phone_number;
        }
    }
}

impl Normalize for CustomerPatch {
    fn normalize(&mut self) {
        trim_opt(&mut self.first_name);
        trim_opt(&mut self.last_name);
        trim_opt(&mut self.phone_number);
    }
}

/// Payload for creating an address
///
/// On the nested REST route `customer_id` is taken from the URL, never from
/// the body.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct NewAddress {
    pub customer_id: i64,

    #[validate(length(
        min = 1,
        max = 200,
        message = "Address details are required (max 200 characters)"
    ))]
    pub address_details: String,

    #[validate(length(min = 1, max = 50, message = "City is required (max 50 characters)"))]
    pub city: String,

    #[validate(length(min = 1, max = 50, message = "State is required (max 50 characters)"))]
    pub state: String,

    #[validate(regex(path = *PIN_CODE_RE, message = "PIN code must be exactly 6 digits"))]
    pub pin_code: String,
}

impl NewAddress {
    pub fn new(
        customer_id: i64,
        address_details: impl Into<String>,
        city: impl Into<String>,
        state: impl Into<String>,
        pin_code: impl Into<String>,
    ) -> Self {
        Self {
            customer_id,
            address_details: address_details.into(),
            city: city.into(),
            state: state.into(),
            pin_code: pin_code.into(),
        }
    }

    pub fn into_address(self, id: i64) -> Address {
        Address {
            id,
            customer_id: self.customer_id,
            address_details: self.address_details,
            city: self.city,
            state: self.state,
            pin_code: self.pin_code,
        }
    }
}

impl Normalize for NewAddress {
    fn normalize(&mut self) {
        trim(&mut self.address_details);
        trim(&mut self.city);
        trim(&mut self.state);
        trim(&mut self.pin_code);
    }
}

/// Partial update of an address
///
/// `customer_id` moves the address to another customer; the caller checks
/// that the target exists.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct AddressPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub customer_id: Option<i64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 200, message = "Address details must be 1 to 200 characters"))]
    pub address_details: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 50, message = "City must be 1 to 50 characters"))]
    pub city: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(length(min = 1, max = 50, message = "State must be 1 to 50 characters"))]
    pub state: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[validate(regex(path = *PIN_CODE_RE, message = "PIN code must be exactly 6 digits"))]
    pub pin_code: Option<String>,
}

impl AddressPatch {
    pub fn apply_to(self, address: &mut Address) {
        if let Some(customer_id) = self.customer_id {
            address.customer_id = customer_id;
        }
        if let Some(address_details) = self.address_details {
            address.address_details = address_details;
        }
        if let Some(city) = self.city {
            address.city = city;
        }
        if let Some(state) = self.state {
            address.state = state;
        }
        if let Some(pin_code) = self.pin_code {
            address.pin_code = pin_code;
        }
    }
}

impl Normalize for AddressPatch {
    fn normalize(&mut self) {
        trim_opt(&mut self.address_details);
        trim_opt(&mut self.city);
        trim_opt(&mut self.state);
        trim_opt(&mut self.pin_code);
    }
}

/// Number of addresses registered in one city
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CityCount {
    pub city: String,
    pub addresses: usize,
}

/// Store-wide totals backing the reports view
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreSummary {
    pub total_customers: usize,
    pub total_addresses: usize,
    /// Sorted by city name
    pub cities: Vec<CityCount>,
}
