//! HTTP handlers for customers, addresses and reports
//!
//! Ids arrive as raw path segments and are parsed here so that a malformed
//! id produces the standard 400 envelope instead of axum's plain-text
//! rejection. Payloads are trimmed and validated by [`ValidatedJson`] before
//! any store call.

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use chrono::Utc;
use serde_json::{Value, json};

use crate::core::error::CrmError;
use crate::core::model::{
    Address, AddressPatch, Customer, CustomerPatch, CustomerWithAddresses, EntityKind, NewAddress,
    NewCustomer, StoreSummary,
};
use crate::core::query::ListCustomersParams;
use crate::core::response::ApiResponse;
use crate::core::validation::ValidatedJson;
use crate::server::host::AppState;

type ApiResult<T> = Result<Json<ApiResponse<T>>, CrmError>;
type Created<T> = Result<(StatusCode, Json<ApiResponse<T>>), CrmError>;

/// Parse a positive integer id from a path segment
pub fn parse_id(entity: EntityKind, raw: &str) -> Result<i64, CrmError> {
    raw.parse::<i64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| CrmError::invalid_id(entity, raw))
}

/// Fail with 404 unless the customer exists
async fn require_customer(state: &AppState, id: i64) -> Result<Customer, CrmError> {
    state
        .store
        .get_customer(id)
        .await
        .map_err(|e| CrmError::from_store("fetch customer", e))?
        .ok_or(CrmError::not_found(EntityKind::Customer, id))
}

/// GET /api/customers
pub async fn list_customers(
    State(state): State<AppState>,
    Query(params): Query<ListCustomersParams>,
) -> ApiResult<Vec<CustomerWithAddresses>> {
    let query = state.customer_query(&params);

    let page = state
        .store
        .list_customers(&query)
        .await
        .map_err(|e| CrmError::from_store("fetch customers", e))?;

    tracing::debug!(
        total = page.total,
        returned = page.customers.len(),
        page = query.page(),
        "customer list"
    );

    Ok(Json(ApiResponse::page(page.customers, page.total)))
}

/// GET /api/customers/{id}
pub async fn get_customer(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ApiResult<CustomerWithAddresses> {
    let id = parse_id(EntityKind::Customer, &raw_id)?;
    let customer = require_customer(&state, id).await?;

    let addresses = state
        .store
        .get_customer_addresses(id)
        .await
        .map_err(|e| CrmError::from_store("fetch customer", e))?;

    Ok(Json(ApiResponse::ok(CustomerWithAddresses::new(
        customer, addresses,
    ))))
}

/// POST /api/customers
pub async fn create_customer(
    State(state): State<AppState>,
    ValidatedJson(payload): ValidatedJson<NewCustomer>,
) -> Created<Customer> {
    let customer = state
        .store
        .create_customer(payload)
        .await
        .map_err(|e| CrmError::from_store("create customer", e))?;

    tracing::info!(id = customer.id, "customer created");

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(customer))))
}

/// PUT /api/customers/{id}
pub async fn update_customer(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    ValidatedJson(patch): ValidatedJson<CustomerPatch>,
) -> ApiResult<Customer> {
    let id = parse_id(EntityKind::Customer, &raw_id)?;

    let customer = state
        .store
        .update_customer(id, patch)
        .await
        .map_err(|e| CrmError::from_store("update customer", e))?
        .ok_or(CrmError::not_found(EntityKind::Customer, id))?;

    Ok(Json(ApiResponse::ok(customer)))
}

/// DELETE /api/customers/{id}
///
/// Removes the customer's addresses as well.
pub async fn delete_customer(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ApiResult<()> {
    let id = parse_id(EntityKind::Customer, &raw_id)?;

    let deleted = state
        .store
        .delete_customer(id)
        .await
        .map_err(|e| CrmError::from_store("delete customer", e))?;
    if !deleted {
        return Err(CrmError::not_found(EntityKind::Customer, id));
    }

    tracing::info!(id, "customer deleted");

    Ok(Json(ApiResponse::message("Customer deleted successfully")))
}

/// GET /api/customers/{id}/addresses
pub async fn get_customer_addresses(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ApiResult<Vec<Address>> {
    let id = parse_id(EntityKind::Customer, &raw_id)?;

    let addresses = state
        .store
        .get_customer_addresses(id)
        .await
        .map_err(|e| CrmError::from_store("fetch addresses", e))?;

    Ok(Json(ApiResponse::ok(addresses)))
}

/// POST /api/customers/{id}/addresses
///
/// The owning customer comes from the path; a `customerId` in the body is
/// ignored.
pub async fn create_address(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    ValidatedJson(mut payload): ValidatedJson<NewAddress>,
) -> Created<Address> {
    let customer_id = parse_id(EntityKind::Customer, &raw_id)?;
    require_customer(&state, customer_id).await?;

    payload.customer_id = customer_id;
    let address = state
        .store
        .create_address(payload)
        .await
        .map_err(|e| CrmError::from_store("create address", e))?;

    tracing::info!(id = address.id, customer_id, "address created");

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(address))))
}

/// GET /api/addresses/{id}
pub async fn get_address(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ApiResult<Address> {
    let id = parse_id(EntityKind::Address, &raw_id)?;

    let address = state
        .store
        .get_address(id)
        .await
        .map_err(|e| CrmError::from_store("fetch address", e))?
        .ok_or(CrmError::not_found(EntityKind::Address, id))?;

    Ok(Json(ApiResponse::ok(address)))
}

/// PUT /api/addresses/{id}
pub async fn update_address(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
    ValidatedJson(patch): ValidatedJson<AddressPatch>,
) -> ApiResult<Address> {
    let id = parse_id(EntityKind::Address, &raw_id)?;
    if let Some(customer_id) = patch.customer_id {
        require_customer(&state, customer_id).await?;
    }

    let address = state
        .store
        .update_address(id, patch)
        .await
        .map_err(|e| CrmError::from_store("update address", e))?
        .ok_or(CrmError::not_found(EntityKind::Address, id))?;

    Ok(Json(ApiResponse::ok(address)))
}

/// DELETE /api/addresses/{id}
pub async fn delete_address(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> ApiResult<()> {
    let id = parse_id(EntityKind::Address, &raw_id)?;

    let deleted = state
        .store
        .delete_address(id)
        .await
        .map_err(|e| CrmError::from_store("delete address", e))?;
    if !deleted {
        return Err(CrmError::not_found(EntityKind::Address, id));
    }

    Ok(Json(ApiResponse::message("Address deleted successfully")))
}

/// GET /api/reports/summary
pub async fn summary(State(state): State<AppState>) -> ApiResult<StoreSummary> {
    let summary = state
        .store
        .summary()
        .await
        .map_err(|e| CrmError::from_store("build report", e))?;

    Ok(Json(ApiResponse::ok(summary)))
}

/// GET /api/health
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "timestamp": Utc::now().to_rfc3339(),
    }))
}

/// Envelope for unknown routes
pub async fn route_not_found() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(ApiResponse::failure("ROUTE_NOT_FOUND", "Route not found", None)),
    )
}
