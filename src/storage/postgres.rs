//! PostgreSQL storage backend using sqlx.
//!
//! Provides `PostgresCustomerStore`, a `CustomerStore` backed by a
//! `sqlx::PgPool`. The list query runs in SQL: search and location filters
//! become `EXISTS` sub-queries, ordering uses the "C" collation so that it
//! matches the byte-wise ordering of the in-memory engine, and ties fall back
//! to insertion (id) order.
//!
//! Case folding uses SQL `lower()`, which follows the database's `LC_CTYPE`.
//! With a UTF-8 ctype (the default of the official `postgres` image) it agrees
//! with `str::to_lowercase` on accented Latin text. Under the "C" ctype only
//! ASCII letters are folded, so non-ASCII searches become case-sensitive.
//!
//! # Feature flag
//!
//! This module is gated behind the `postgres` feature flag:
//! ```toml
//! [dependencies]
//! crm-rs = { version = "0.1", features = ["postgres"] }
//! ```

use crate::core::error::StoreError;
use crate::core::model::{
    Address, AddressPatch, CityCount, Customer, CustomerPatch, CustomerWithAddresses, NewAddress,
    NewCustomer, StoreSummary,
};
use crate::core::query::{CustomerPage, CustomerQuery, LocationFilter, LocationMatch};
use crate::core::service::CustomerStore;
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, QueryBuilder};
use std::collections::HashMap;

/// Tables are created if missing; there is no migration history.
const SCHEMA: &[&str] = &[
    r#"CREATE TABLE IF NOT EXISTS customers (
        id BIGSERIAL PRIMARY KEY,
        first_name TEXT NOT NULL,
        last_name TEXT NOT NULL,
        phone_number TEXT NOT NULL UNIQUE
    )"#,
    r#"CREATE TABLE IF NOT EXISTS addresses (
        id BIGSERIAL PRIMARY KEY,
        customer_id BIGINT NOT NULL REFERENCES customers(id) ON DELETE CASCADE,
        address_details TEXT NOT NULL,
        city TEXT NOT NULL,
        state TEXT NOT NULL,
        pin_code TEXT NOT NULL
    )"#,
    "CREATE INDEX IF NOT EXISTS addresses_customer_id_idx ON addresses (customer_id)",
];

const CUSTOMER_COLUMNS: &str = "c.id, c.first_name, c.last_name, c.phone_number";
const ADDRESS_COLUMNS: &str =
    "a.id, a.customer_id, a.address_details, a.city, a.state, a.pin_code";

/// Customer store backed by PostgreSQL.
#[derive(Clone, Debug)]
pub struct PostgresCustomerStore {
    pool: PgPool,
}

impl PostgresCustomerStore {
    /// Create a store over an existing pool (the schema must already exist).
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Connect, then create the tables if they are missing.
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self, StoreError> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await?;
        let store = Self::new(pool);
        store.ensure_schema().await?;
        Ok(store)
    }

    pub async fn ensure_schema(&self) -> Result<(), StoreError> {
        for statement in SCHEMA {
            sqlx::query(statement).execute(&self.pool).await?;
        }
        tracing::debug!("customer schema ready");
        Ok(())
    }

    pub fn pool(&self) -> &PgPool {
        &self.pool
    }
}

/// Translate constraint violations into the errors callers can act on
fn classify(err: sqlx::Error, phone_number: Option<&str>, customer_id: Option<i64>) -> StoreError {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            if let Some(phone) = phone_number {
                return StoreError::PhoneNumberTaken(phone.to_string());
            }
        }
        if db.is_foreign_key_violation() {
            if let Some(id) = customer_id {
                return StoreError::CustomerMissing(id);
            }
        }
    }
    StoreError::Database(err)
}

fn to_usize(value: i64) -> Result<usize, StoreError> {
    usize::try_from(value).map_err(|_| StoreError::Integrity(format!("negative count {}", value)))
}

fn to_i64(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

/// Append the WHERE clause shared by the count and page queries
fn push_customer_filters(qb: &mut QueryBuilder<'_, Postgres>, query: &CustomerQuery) {
    qb.push(" WHERE TRUE");

    if let Some(term) = query.search() {
        let needle = term.to_lowercase();
        qb.push(" AND (");
        for (i, column) in ["c.first_name", "c.last_name", "c.phone_number"].iter().enumerate() {
            if i > 0 {
                qb.push(" OR ");
            }
            qb.push(format!("strpos(lower({}), ", column));
            qb.push_bind(needle.clone());
            qb.push(") > 0");
        }
        qb.push(" OR EXISTS (SELECT 1 FROM addresses s WHERE s.customer_id = c.id AND (");
        for (i, column) in ["s.city", "s.state", "s.pin_code"].iter().enumerate() {
            if i > 0 {
                qb.push(" OR ");
            }
            qb.push(format!("strpos(lower({}), ", column));
            qb.push_bind(needle.clone());
            qb.push(") > 0");
        }
        qb.push(")))");
    }

    let filter = query.location_filter();
    if filter.is_active() {
        qb.push(" AND EXISTS (SELECT 1 FROM addresses a WHERE a.customer_id = c.id");
        push_location_predicate(qb, &filter);
        qb.push(")");
    }
}

/// Append `AND ...` conditions on alias `a` for each active location filter
fn push_location_predicate(qb: &mut QueryBuilder<'_, Postgres>, filter: &LocationFilter) {
    for (column, needle) in [("a.city", filter.city()), ("a.state", filter.state())] {
        let Some(needle) = needle else { continue };
        match filter.policy() {
            LocationMatch::Exact => {
                qb.push(format!(" AND lower({}) = ", column));
                qb.push_bind(needle.to_string());
            }
            LocationMatch::Substring => {
                qb.push(format!(" AND strpos(lower({}), ", column));
                qb.push_bind(needle.to_string());
                qb.push(") > 0");
            }
        }
    }
    if let Some(pin) = filter.pin_code() {
        qb.push(" AND strpos(a.pin_code, ");
        qb.push_bind(pin.to_string());
        qb.push(") > 0");
    }
}

#[async_trait]
impl CustomerStore for PostgresCustomerStore {
    async fn get_customer(&self, id: i64) -> Result<Option<Customer>, StoreError> {
        let customer = sqlx::query_as::<_, Customer>(
            "SELECT id, first_name, last_name, phone_number FROM customers WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(customer)
    }

    async fn list_customers(&self, query: &CustomerQuery) -> Result<CustomerPage, StoreError> {
        let mut count = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM customers c");
        push_customer_filters(&mut count, query);
        let total: i64 = count.build_query_scalar().fetch_one(&self.pool).await?;
        let total = to_usize(total)?;

        if total == 0 || query.offset() >= total {
            return Ok(CustomerPage {
                customers: Vec::new(),
                total,
            });
        }

        let mut page =
            QueryBuilder::<Postgres>::new(format!("SELECT {} FROM customers c", CUSTOMER_COLUMNS));
        push_customer_filters(&mut page, query);
        page.push(format!(
            " ORDER BY c.{} COLLATE \"C\" {}, c.id ASC LIMIT ",
            query.sort_by().column(),
            query.sort_order().sql()
        ));
        page.push_bind(to_i64(query.limit()));
        page.push(" OFFSET ");
        page.push_bind(to_i64(query.offset()));
        let customers: Vec<Customer> = page.build_query_as().fetch_all(&self.pool).await?;

        let ids: Vec<i64> = customers.iter().map(|c| c.id).collect();
        let mut addresses = QueryBuilder::<Postgres>::new(format!(
            "SELECT {} FROM addresses a WHERE a.customer_id = ANY(",
            ADDRESS_COLUMNS
        ));
        addresses.push_bind(ids);
        addresses.push(")");
        push_location_predicate(&mut addresses, &query.location_filter());
        addresses.push(" ORDER BY a.id");
        let rows: Vec<Address> = addresses.build_query_as().fetch_all(&self.pool).await?;

        let mut by_customer: HashMap<i64, Vec<Address>> = HashMap::new();
        for address in rows {
            by_customer.entry(address.customer_id).or_default().push(address);
        }

        tracing::debug!(total, page = query.page(), "listed customers");

        Ok(CustomerPage {
            customers: customers
                .into_iter()
                .map(|customer| {
                    let addresses = by_customer.remove(&customer.id).unwrap_or_default();
                    CustomerWithAddresses::new(customer, addresses)
                })
                .collect(),
            total,
        })
    }

    async fn create_customer(&self, data: NewCustomer) -> Result<Customer, StoreError> {
        sqlx::query_as::<_, Customer>(
            "INSERT INTO customers (first_name, last_name, phone_number) VALUES ($1, $2, $3) \
             RETURNING id, first_name, last_name, phone_number",
        )
        .bind(&data.first_name)
        .bind(&data.last_name)
        .bind(&data.phone_number)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| classify(e, Some(&data.phone_number), None))
    }

    async fn update_customer(
        &self,
        id: i64,
        patch: CustomerPatch,
    ) -> Result<Option<Customer>, StoreError> {
        sqlx::query_as::<_, Customer>(
            "UPDATE customers SET \
               first_name = COALESCE($2, first_name), \
               last_name = COALESCE($3, last_name), \
               phone_number = COALESCE($4, phone_number) \
             WHERE id = $1 \
             RETURNING id, first_name, last_name, phone_number",
        )
        .bind(id)
        .bind(&patch.first_name)
        .bind(&patch.last_name)
        .bind(&patch.phone_number)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| classify(e, patch.phone_number.as_deref(), None))
    }

    async fn delete_customer(&self, id: i64) -> Result<bool, StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM addresses WHERE customer_id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?;
        let deleted = sqlx::query("DELETE FROM customers WHERE id = $1")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;
        Ok(deleted > 0)
    }

    async fn get_address(&self, id: i64) -> Result<Option<Address>, StoreError> {
        let address = sqlx::query_as::<_, Address>(&format!(
            "SELECT {} FROM addresses a WHERE a.id = $1",
            ADDRESS_COLUMNS
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(address)
    }

    async fn get_customer_addresses(&self, customer_id: i64) -> Result<Vec<Address>, StoreError> {
        let addresses = sqlx::query_as::<_, Address>(&format!(
            "SELECT {} FROM addresses a WHERE a.customer_id = $1 ORDER BY a.id",
            ADDRESS_COLUMNS
        ))
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(addresses)
    }

    async fn create_address(&self, data: NewAddress) -> Result<Address, StoreError> {
        sqlx::query_as::<_, Address>(
            "INSERT INTO addresses (customer_id, address_details, city, state, pin_code) \
             VALUES ($1, $2, $3, $4, $5) \
             RETURNING id, customer_id, address_details, city, state, pin_code",
        )
        .bind(data.customer_id)
        .bind(&data.address_details)
        .bind(&data.city)
        .bind(&data.state)
        .bind(&data.pin_code)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| classify(e, None, Some(data.customer_id)))
    }

    async fn update_address(
        &self,
        id: i64,
        patch: AddressPatch,
    ) -> Result<Option<Address>, StoreError> {
        sqlx::query_as::<_, Address>(
            "UPDATE addresses SET \
               customer_id = COALESCE($2, customer_id), \
               address_details = COALESCE($3, address_details), \
               city = COALESCE($4, city), \
               state = COALESCE($5, state), \
               pin_code = COALESCE($6, pin_code) \
             WHERE id = $1 \
             RETURNING id, customer_id, address_details, city, state, pin_code",
        )
        .bind(id)
        .bind(patch.customer_id)
        .bind(&patch.address_details)
        .bind(&patch.city)
        .bind(&patch.state)
        .bind(&patch.pin_code)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| classify(e, None, patch.customer_id))
    }

    async fn delete_address(&self, id: i64) -> Result<bool, StoreError> {
        let deleted = sqlx::query("DELETE FROM addresses WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?
            .rows_affected();
        Ok(deleted > 0)
    }

    async fn summary(&self) -> Result<StoreSummary, StoreError> {
        let (customers, addresses): (i64, i64) = sqlx::query_as(
            "SELECT (SELECT COUNT(*) FROM customers), (SELECT COUNT(*) FROM addresses)",
        )
        .fetch_one(&self.pool)
        .await?;

        let rows: Vec<(String, i64)> = sqlx::query_as(
            "SELECT city, COUNT(*) FROM addresses GROUP BY city ORDER BY city COLLATE \"C\"",
        )
        .fetch_all(&self.pool)
        .await?;

        let cities = rows
            .into_iter()
            .map(|(city, count)| {
                Ok(CityCount {
                    city,
                    addresses: to_usize(count)?,
                })
            })
            .collect::<Result<Vec<_>, StoreError>>()?;

        Ok(StoreSummary {
            total_customers: to_usize(customers)?,
            total_addresses: to_usize(addresses)?,
            cities,
        })
    }
}
