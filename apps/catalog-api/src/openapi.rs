use utoipa::{Modify, OpenApi};

#[derive(OpenApi)]
#[openapi(
    components(
        schemas(axum_helpers::ErrorResponse)
    ),
    info(
        title = "Catalog API",
        version = "0.1.0",
        description = "Categories, products, checkout and sales reports"
    ),
    servers(
        (url = "/api", description = "API base path")
    ),
    nest(
        (path = "/categories", api = domain_categories::ApiDoc),
        (path = "/products", api = domain_products::ApiDoc)
    ),
    modifiers(&TransactionsDoc)
)]
pub struct ApiDoc;

/// Nests the transactions API at the root (`nest` rejects an empty path).
struct TransactionsDoc;

impl Modify for TransactionsDoc {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.merge(domain_transactions::ApiDoc::openapi());
    }
}
