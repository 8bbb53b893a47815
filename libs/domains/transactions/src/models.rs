use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};
use validator::Validate;

pub const DEFAULT_LIST_LIMIT: u64 = 20;
pub const MAX_LIST_LIMIT: u64 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate, ToSchema)]
pub struct CheckoutItem {
    pub product_id: i32,
    #[validate(range(min = 1))]
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CheckoutRequest {
    #[validate(length(min = 1), nested)]
    pub items: Vec<CheckoutItem>,
}

/// A committed checkout. Immutable once created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct Transaction {
    pub id: i32,
    /// Sum of the detail subtotals
    pub total_amount: i64,
    pub created_at: DateTime<Utc>,
    pub details: Vec<TransactionDetail>,
}

/// One line of a transaction. `product_name` and `subtotal` are frozen at checkout time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct TransactionDetail {
    pub id: i32,
    pub transaction_id: i32,
    pub product_id: i32,
    pub product_name: String,
    pub quantity: i32,
    pub subtotal: i64,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListQuery {
    /// Maximum number of transactions, newest first (default 20, max 100)
    pub limit: Option<u64>,
}

impl ListQuery {
    pub fn limit(&self) -> u64 {
        self.limit
            .unwrap_or(DEFAULT_LIST_LIMIT)
            .clamp(1, MAX_LIST_LIMIT)
    }
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ReportQuery {
    /// First day of the window, `YYYY-MM-DD` (default today)
    pub start_date: Option<String>,
    /// Last day of the window, inclusive, `YYYY-MM-DD` (default today)
    pub end_date: Option<String>,
}

/// Sales over a report window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(example = json!({
    "total_revenue": 5000,
    "total_transactions": 3,
    "best_selling_product": {"name": "Kopi Susu", "quantity_sold": 4}
}))]
pub struct Report {
    pub total_revenue: i64,
    /// Number of detail rows in the window
    pub total_transactions: i64,
    pub best_selling_product: Option<BestSeller>,
}

impl Report {
    /// The report for a window without transactions.
    pub fn empty() -> Self {
        Self {
            total_revenue: 0,
            total_transactions: 0,
            best_selling_product: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct BestSeller {
    pub name: String,
    pub quantity_sold: i64,
}
