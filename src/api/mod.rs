//! HTTP interface - axum router over the core operations.
//!
//! Everything except `/health` sits behind the token middleware. The router
//! carries request tracing, a per-request timeout and CORS for the configured
//! origins.

pub mod auth;
pub mod handlers;
pub mod response;
pub mod state;

pub use state::AppState;

use axum::{
    Router,
    http::{HeaderName, HeaderValue, Method, header},
    middleware,
    routing::{get, post},
};
use handlers::{addresses, health, payments, products, transactions, users, withdrawals};
use tower_http::{
    cors::{AllowOrigin, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing::warn;

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| {
            HeaderValue::from_str(origin)
                .inspect_err(|_| warn!(%origin, "ignoring malformed CORS origin"))
                .ok()
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("token"),
        ])
}

/// Builds the API router.
pub fn create_router(state: AppState) -> Router {
    let protected = Router::new()
        .route("/users", get(users::list).post(users::create))
        .route("/users/me", get(users::me))
        .route(
            "/users/:user_id",
            get(users::get).put(users::update).delete(users::delete),
        )
        .route("/products", get(products::list).post(products::create))
        .route(
            "/products/:product_id",
            get(products::get)
                .put(products::update)
                .delete(products::delete),
        )
        .route("/products/remove/:product_id", post(products::remove))
        .route("/addresses", get(addresses::list).post(addresses::create))
        .route(
            "/addresses/:address_id",
            get(addresses::get)
                .put(addresses::update)
                .delete(addresses::delete),
        )
        .route("/addresses/remove/:address_id", post(addresses::remove))
        .route("/payments", get(payments::list).post(payments::create))
        .route(
            "/payments/:payment_id",
            get(payments::get)
                .put(payments::update)
                .delete(payments::delete),
        )
        .route(
            "/withdrawals",
            get(withdrawals::list).post(withdrawals::create),
        )
        .route(
            "/withdrawals/:withdrawal_id",
            get(withdrawals::get)
                .put(withdrawals::update)
                .delete(withdrawals::delete),
        )
        .route(
            "/transactions",
            get(transactions::list).post(transactions::create),
        )
        .route(
            "/transactions/:transaction_id",
            get(transactions::get)
                .put(transactions::update)
                .delete(transactions::delete),
        )
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            auth::require_principal,
        ));

    let server = &state.settings.server;
    let cors = cors_layer(&server.allowed_origins);
    let timeout = TimeoutLayer::new(server.request_timeout());

    Router::new()
        .route("/health", get(health::health))
        .merge(protected)
        .layer(timeout)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
