use axum::Router;
use domain_transactions::{PgTransactionRepository, TransactionService, handlers};

pub fn router(state: &crate::state::AppState) -> Router {
    let repository = PgTransactionRepository::new(state.db.clone());
    handlers::router(TransactionService::new(repository))
}
