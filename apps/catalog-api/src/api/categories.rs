use axum::Router;
use domain_categories::{CategoryService, PgCategoryRepository, handlers};

pub fn router(state: &crate::state::AppState) -> Router {
    let repository = PgCategoryRepository::new(state.db.clone());
    handlers::router(CategoryService::new(repository))
}
