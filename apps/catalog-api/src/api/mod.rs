use axum::Router;

pub mod categories;
pub mod health;
pub mod products;
pub mod transactions;

/// Creates the API routes without the `/api` prefix.
/// The `/api` prefix will be added by the `create_router` helper.
pub fn routes(state: &crate::state::AppState) -> Router {
    Router::new()
        .nest("/categories", categories::router(state))
        .nest("/products", products::router(state))
        // `/checkout`, `/transactions`, `/report` sit directly under `/api`
        .merge(transactions::router(state))
}

/// Creates a router with the /ready endpoint that pings the database.
pub fn ready_router(state: crate::state::AppState) -> Router {
    use axum::routing::get;

    Router::new()
        .route("/ready", get(health::ready_handler))
        .with_state(state)
}
