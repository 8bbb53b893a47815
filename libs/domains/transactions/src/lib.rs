//! Transactions Domain
//!
//! Checkout and sales reporting over the product catalog.
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← /api/checkout, /api/transactions, /api/report
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Request validation, report windows, sales metrics
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐     ┌─────────────┐
//! │ Repository  │ ──► │  checkout   │  ← pure pricing plan
//! └──────┬──────┘     └─────────────┘
//!        │ one DB transaction per checkout:
//!        │ lookup → header → details → guarded stock decrements
//! ┌──────▼──────┐
//! │   Models    │  ← Transaction, TransactionDetail, Report
//! └─────────────┘
//! ```
//!
//! ```rust,no_run
//! use domain_categories::InMemoryCategoryRepository;
//! use domain_products::InMemoryProductRepository;
//! use domain_transactions::{handlers, InMemoryTransactionRepository, TransactionService};
//!
//! let products = InMemoryProductRepository::new(InMemoryCategoryRepository::new());
//! let service = TransactionService::new(InMemoryTransactionRepository::new(products));
//! let router = handlers::router(service);
//! ```

pub mod checkout;
pub mod entity;
pub mod error;
pub mod handlers;
pub mod models;
pub mod postgres;
pub mod report;
pub mod repository;
pub mod service;

pub use error::{TransactionError, TransactionResult};
pub use handlers::ApiDoc;
pub use models::{
    BestSeller, CheckoutItem, CheckoutRequest, ListQuery, Report, ReportQuery, Transaction,
    TransactionDetail,
};
pub use postgres::PgTransactionRepository;
pub use report::ReportWindow;
pub use repository::{InMemoryTransactionRepository, TransactionRepository};
pub use service::TransactionService;
