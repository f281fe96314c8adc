//! Customer query engine
//!
//! Pure evaluation of a [`CustomerQuery`] over customers that already carry
//! their full address lists. Backends that hold everything in memory call
//! [`list_customers`] directly; the relational backend pushes the same steps
//! into SQL.
//!
//! Steps, in order:
//! 1. keep customers matching `search` on their own fields or on any
//!    address's city, state or PIN code (no matches: empty page, total 0)
//! 2. narrow each address list with the location filter and drop customers
//!    left with no address (only when a location filter is active)
//! 3. stable sort by the requested field and direction
//! 4. count, then cut out the requested page

use crate::core::model::CustomerWithAddresses;
use crate::core::query::{CustomerPage, CustomerQuery, SortField, SortOrder};

pub fn list_customers<I>(records: I, query: &CustomerQuery) -> CustomerPage
where
    I: IntoIterator<Item = CustomerWithAddresses>,
{
    let mut matched: Vec<CustomerWithAddresses> = match query.search() {
        Some(term) => {
            let needle = term.to_lowercase();
            let hits: Vec<_> = records
                .into_iter()
                .filter(|record| matches_search(record, &needle))
                .collect();
            if hits.is_empty() {
                return CustomerPage::empty();
            }
            hits
        }
        None => records.into_iter().collect(),
    };

    let filter = query.location_filter();
    if filter.is_active() {
        matched = matched
            .into_iter()
            .filter_map(|mut record| {
                record.addresses.retain(|address| filter.matches(address));
                (!record.addresses.is_empty()).then_some(record)
            })
            .collect();
    }

    sort_customers(&mut matched, query.sort_by(), query.sort_order());

    let total = matched.len();
    let customers = matched
        .into_iter()
        .skip(query.offset())
        .take(query.limit())
        .collect();

    CustomerPage { customers, total }
}

/// Case-insensitive substring search; `needle` must already be lowercase
pub fn matches_search(record: &CustomerWithAddresses, needle: &str) -> bool {
    let hit = |value: &str| value.to_lowercase().contains(needle);
    let customer = &record.customer;

    hit(&customer.first_name)
        || hit(&customer.last_name)
        || hit(&customer.phone_number)
        || record
            .addresses
            .iter()
            .any(|a| hit(&a.city) || hit(&a.state) || hit(&a.pin_code))
}

/// Byte-wise lexicographic sort; ties keep their incoming order
pub fn sort_customers(records: &mut [CustomerWithAddresses], field: SortField, order: SortOrder) {
    records.sort_by(|a, b| order.apply(field.key(&a.customer).cmp(field.key(&b.customer))));
}
