//! Route table for the `/api` surface

use crate::server::handlers::{
    create_address, create_customer, delete_address, delete_customer, get_address, get_customer,
    get_customer_addresses, health_check, list_customers, route_not_found, summary,
    update_address, update_customer,
};
use crate::server::host::AppState;
use axum::{Router, routing::get};

/// Build the API routes, to be nested under `/api`
///
/// - GET    /health
/// - GET    /customers
/// - POST   /customers
/// - GET    /customers/{id}
/// - PUT    /customers/{id}
/// - DELETE /customers/{id}
/// - GET    /customers/{id}/addresses
/// - POST   /customers/{id}/addresses
/// - GET    /addresses/{id}
/// - PUT    /addresses/{id}
/// - DELETE /addresses/{id}
/// - GET    /reports/summary
pub fn build_api_routes(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/customers", get(list_customers).post(create_customer))
        .route(
            "/customers/{id}",
            get(get_customer).put(update_customer).delete(delete_customer),
        )
        .route(
            "/customers/{id}/addresses",
            get(get_customer_addresses).post(create_address),
        )
        .route(
            "/addresses/{id}",
            get(get_address).put(update_address).delete(delete_address),
        )
        .route("/reports/summary", get(summary))
        .fallback(route_not_found)
        .with_state(state)
}
