//! Customer list criteria: search, location filters, sorting and pagination

use crate::core::model::{Address, Customer, CustomerWithAddresses};
use crate::core::validation::filters::non_blank;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// City value the UI sends when no city is selected
pub const ALL_CITIES: &str = "All Cities";
/// State value the UI sends when no state is selected
pub const ALL_STATES: &str = "All States";

/// Raw query-string parameters of `GET /api/customers`
///
/// Everything arrives as text; [`CustomerQuery::from_params`] does the
/// lenient parsing so that a bad `page` never fails the listing.
///
/// # Example
/// ```text
/// GET /api/customers?search=delhi&page=2&limit=5
/// GET /api/customers?city=Chennai&sortBy=lastName&sortOrder=desc
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ListCustomersParams {
    pub search: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub pin_code: Option<String>,
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
}

/// Customer field used for ordering
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortField {
    #[default]
    FirstName,
    LastName,
    PhoneNumber,
}

impl SortField {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "firstName" => Some(SortField::FirstName),
            "lastName" => Some(SortField::LastName),
            "phoneNumber" => Some(SortField::PhoneNumber),
            _ => None,
        }
    }

    pub fn key<'a>(&self, customer: &'a Customer) -> &'a str {
        match self {
            SortField::FirstName => &customer.first_name,
            SortField::LastName => &customer.last_name,
            SortField::PhoneNumber => &customer.phone_number,
        }
    }

    /// Column name in the relational schema
    pub fn column(&self) -> &'static str {
        match self {
            SortField::FirstName => "first_name",
            SortField::LastName => "last_name",
            SortField::PhoneNumber => "phone_number",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(value: &str) -> Option<Self> {
        match value.to_ascii_lowercase().as_str() {
            "asc" => Some(SortOrder::Asc),
            "desc" => Some(SortOrder::Desc),
            _ => None,
        }
    }

    pub fn apply(&self, ordering: Ordering) -> Ordering {
        match self {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    }

    pub fn sql(&self) -> &'static str {
        match self {
            SortOrder::Asc => "ASC",
            SortOrder::Desc => "DESC",
        }
    }
}

/// How `city` and `state` filters compare against address values
///
/// Both comparisons are case-insensitive. `Exact` suits dropdown-driven
/// filters, `Substring` suits free-text ones. PIN codes always use substring
/// matching.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationMatch {
    #[default]
    Exact,
    Substring,
}

impl FromStr for LocationMatch {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "exact" => Ok(LocationMatch::Exact),
            "substring" => Ok(LocationMatch::Substring),
            other => Err(format!("expected 'exact' or 'substring', got '{}'", other)),
        }
    }
}

impl fmt::Display for LocationMatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationMatch::Exact => write!(f, "exact"),
            LocationMatch::Substring => write!(f, "substring"),
        }
    }
}

/// Normalized list criteria
///
/// Filters are stored trimmed, and blank or sentinel values are dropped on
/// the way in, so `Some(_)` always means "filter on this".
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CustomerQuery {
    search: Option<String>,
    city: Option<String>,
    state: Option<String>,
    pin_code: Option<String>,
    page: usize,
    limit: usize,
    sort_by: SortField,
    sort_order: SortOrder,
    location_match: LocationMatch,
}

impl Default for CustomerQuery {
    fn default() -> Self {
        Self {
            search: None,
            city: None,
            state: None,
            pin_code: None,
            page: 1,
            limit: Self::DEFAULT_LIMIT,
            sort_by: SortField::default(),
            sort_order: SortOrder::default(),
            location_match: LocationMatch::default(),
        }
    }
}

impl CustomerQuery {
    pub const DEFAULT_LIMIT: usize = 10;

    pub fn new() -> Self {
        Self::default()
    }

    /// Build criteria from raw query parameters
    ///
    /// Unparseable or zero `page`/`limit` fall back to 1 and `default_limit`;
    /// unknown sort values fall back to `firstName` ascending.
    pub fn from_params(
        params: &ListCustomersParams,
        default_limit: usize,
        location_match: LocationMatch,
    ) -> Self {
        let page = parse_positive(params.page.as_deref()).unwrap_or(1);
        let limit = parse_positive(params.limit.as_deref()).unwrap_or(default_limit.max(1));
        let sort_by = params
            .sort_by
            .as_deref()
            .and_then(|s| SortField::parse(s.trim()))
            .unwrap_or_default();
        let sort_order = params
            .sort_order
            .as_deref()
            .and_then(|s| SortOrder::parse(s.trim()))
            .unwrap_or_default();

        Self {
            search: non_blank(params.search.as_deref(), None),
            city: non_blank(params.city.as_deref(), Some(ALL_CITIES)),
            state: non_blank(params.state.as_deref(), Some(ALL_STATES)),
            pin_code: non_blank(params.pin_code.as_deref(), None),
            page,
            limit,
            sort_by,
            sort_order,
            location_match,
        }
    }

    pub fn with_search(mut self, search: &str) -> Self {
        self.search = non_blank(Some(search), None);
        self
    }

    pub fn with_city(mut self, city: &str) -> Self {
        self.city = non_blank(Some(city), Some(ALL_CITIES));
        self
    }

    pub fn with_state(mut self, state: &str) -> Self {
        self.state = non_blank(Some(state), Some(ALL_STATES));
        self
    }

    pub fn with_pin_code(mut self, pin_code: &str) -> Self {
        self.pin_code = non_blank(Some(pin_code), None);
        self
    }

    /// Page numbers start at 1; 0 is treated as 1
    pub fn with_page(mut self, page: usize) -> Self {
        self.page = page.max(1);
        self
    }

    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = limit.max(1);
        self
    }

    pub fn sorted_by(mut self, field: SortField, order: SortOrder) -> Self {
        self.sort_by = field;
        self.sort_order = order;
        self
    }

    pub fn with_location_match(mut self, location_match: LocationMatch) -> Self {
        self.location_match = location_match;
        self
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn city(&self) -> Option<&str> {
        self.city.as_deref()
    }

    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    pub fn pin_code(&self) -> Option<&str> {
        self.pin_code.as_deref()
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    pub fn sort_by(&self) -> SortField {
        self.sort_by
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort_order
    }

    pub fn location_match(&self) -> LocationMatch {
        self.location_match
    }

    /// Index of the first record on the requested page
    pub fn offset(&self) -> usize {
        (self.page - 1).saturating_mul(self.limit)
    }

    pub fn location_filter(&self) -> LocationFilter {
        LocationFilter {
            city: self.city.as_ref().map(|c| c.to_lowercase()),
            state: self.state.as_ref().map(|s| s.to_lowercase()),
            pin_code: self.pin_code.clone(),
            policy: self.location_match,
        }
    }
}

fn parse_positive(value: Option<&str>) -> Option<usize> {
    value
        .and_then(|v| v.trim().parse::<usize>().ok())
        .filter(|v| *v >= 1)
}

/// Address-level city/state/pinCode predicate
///
/// City and state needles are kept lowercased.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationFilter {
    city: Option<String>,
    state: Option<String>,
    pin_code: Option<String>,
    policy: LocationMatch,
}

impl LocationFilter {
    pub fn is_active(&self) -> bool {
        self.city.is_some() || self.state.is_some() || self.pin_code.is_some()
    }

    pub fn city(&self) -> Option<&str> {
        self.city.as_deref()
    }

    pub fn state(&self) -> Option<&str> {
        self.state.as_deref()
    }

    pub fn pin_code(&self) -> Option<&str> {
        self.pin_code.as_deref()
    }

    pub fn policy(&self) -> LocationMatch {
        self.policy
    }

    /// Whether `address` survives every active filter
    pub fn matches(&self, address: &Address) -> bool {
        self.city
            .as_deref()
            .is_none_or(|city| self.text_matches(&address.city, city))
            && self
                .state
                .as_deref()
                .is_none_or(|state| self.text_matches(&address.state, state))
            && self
                .pin_code
                .as_deref()
                .is_none_or(|pin| address.pin_code.contains(pin))
    }

    fn text_matches(&self, value: &str, needle: &str) -> bool {
        let value = value.to_lowercase();
        match self.policy {
            LocationMatch::Exact => value == needle,
            LocationMatch::Substring => value.contains(needle),
        }
    }
}

/// One page of customers plus the number of matches across all pages
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CustomerPage {
    pub customers: Vec<CustomerWithAddresses>,
    pub total: usize,
}

impl CustomerPage {
    pub fn empty() -> Self {
        Self::default()
    }
}
