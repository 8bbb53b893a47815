//! Products Domain
//!
//! The product catalog: products, their category links, and the stock
//! primitives that checkout runs inside its own database transaction.
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints (/api/products)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Validation, filter parsing
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐     ┌─────────────┐
//! │ Repository  │ ──► │    stock    │  ← batched lookup + conditional decrement
//! └──────┬──────┘     └─────────────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Product, ProductInput, ProductFilter
//! └─────────────┘
//! ```
//!
//! ```rust,no_run
//! use domain_categories::InMemoryCategoryRepository;
//! use domain_products::{handlers, InMemoryProductRepository, ProductService};
//!
//! let repository = InMemoryProductRepository::new(InMemoryCategoryRepository::new());
//! let router = handlers::router(ProductService::new(repository));
//! ```

pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod repository;
pub mod service;
pub mod stock;

pub use error::{ProductError, ProductResult};
pub use handlers::ApiDoc;
pub use models::{Product, ProductFilter, ProductInput, ProductSnapshot};
pub use postgres::PgProductRepository;
pub use repository::{InMemoryProductRepository, ProductRepository};
pub use service::ProductService;
