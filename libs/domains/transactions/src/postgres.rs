use async_trait::async_trait;
use database::BaseRepository;
use domain_products::stock;
use sea_orm::ActiveValue::{NotSet, Set};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbBackend, EntityTrait, FromQueryResult,
    QueryFilter, QueryOrder, QuerySelect, Statement, TransactionTrait,
};
use std::collections::HashMap;
use std::future::Future;

use crate::{
    checkout,
    entity::{transaction, transaction_detail},
    error::{TransactionError, TransactionResult},
    models::{BestSeller, CheckoutItem, Report, Transaction},
    report::ReportWindow,
    repository::TransactionRepository,
};

const TOTALS_SQL: &str = r#"
SELECT
    COUNT(DISTINCT t.id) AS matched,
    COUNT(d.id) AS total_transactions,
    COALESCE(SUM(d.subtotal), 0)::BIGINT AS total_revenue
FROM transactions t
LEFT JOIN transaction_details d ON d.transaction_id = t.id
WHERE t.created_at >= $1 AND t.created_at < $2
"#;

const BEST_SELLER_SQL: &str = r#"
SELECT
    d.product_id,
    (ARRAY_AGG(d.product_name ORDER BY d.id DESC))[1] AS name,
    SUM(d.quantity)::BIGINT AS quantity_sold
FROM transaction_details d
JOIN transactions t ON t.id = d.transaction_id
WHERE t.created_at >= $1 AND t.created_at < $2
GROUP BY d.product_id
ORDER BY quantity_sold DESC, d.product_id ASC
LIMIT 1
"#;

#[derive(Debug, FromQueryResult)]
struct Totals {
    matched: i64,
    total_transactions: i64,
    total_revenue: i64,
}

#[derive(Debug, FromQueryResult)]
struct BestSellerRow {
    name: String,
    quantity_sold: i64,
}

#[derive(Clone)]
pub struct PgTransactionRepository {
    base: BaseRepository<transaction::Entity>,
}

impl PgTransactionRepository {
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            base: BaseRepository::new(db),
        }
    }

    fn window_statement(sql: &str, window: &ReportWindow) -> Statement {
        Statement::from_sql_and_values(
            DbBackend::Postgres,
            sql,
            [window.start_utc().into(), window.end_utc().into()],
        )
    }

    async fn details_for(
        &self,
        transaction_ids: Vec<i32>,
    ) -> TransactionResult<HashMap<i32, Vec<transaction_detail::Model>>> {
        let mut grouped: HashMap<i32, Vec<transaction_detail::Model>> = HashMap::new();
        if transaction_ids.is_empty() {
            return Ok(grouped);
        }

        let details = transaction_detail::Entity::find()
            .filter(transaction_detail::Column::TransactionId.is_in(transaction_ids))
            .order_by_asc(transaction_detail::Column::Id)
            .all(self.base.db())
            .await?;

        for detail in details {
            grouped.entry(detail.transaction_id).or_default().push(detail);
        }
        Ok(grouped)
    }
}

/// Awaits an explicit rollback. A failure is only logged: the caller keeps its
/// own error, and the server discards the transaction once the connection drops it.
async fn roll_back<F>(rollback: F)
where
    F: Future<Output = Result<(), sea_orm::DbErr>>,
{
    if let Err(err) = rollback.await {
        tracing::warn!(error = %err, "Checkout rollback failed");
    }
}

#[async_trait]
impl TransactionRepository for PgTransactionRepository {
    async fn checkout(&self, items: Vec<CheckoutItem>) -> TransactionResult<Transaction> {
        // Every early return below drops `txn`, which rolls it back.
        let txn = self.base.db().begin().await?;

        let catalog = stock::find_products_by_ids(&txn, &checkout::requested_ids(&items)).await?;
        let plan = checkout::plan(&items, &catalog)?;

        let header = transaction::ActiveModel {
            id: NotSet,
            total_amount: Set(plan.total_amount),
            created_at: NotSet,
        }
        .insert(&txn)
        .await?;

        let mut details = Vec::with_capacity(plan.lines.len());
        for line in &plan.lines {
            let detail = transaction_detail::ActiveModel {
                id: NotSet,
                transaction_id: Set(header.id),
                product_id: Set(line.product_id),
                product_name: Set(line.product_name.clone()),
                quantity: Set(line.quantity),
                subtotal: Set(line.subtotal),
            }
            .insert(&txn)
            .await?;
            details.push(detail);
        }

        // Ascending product id, so concurrent checkouts lock rows in the same order.
        for (&product_id, &requested) in &plan.demand {
            if !stock::decrement_stock(&txn, product_id, requested).await? {
                let available = stock::current_stock(&txn, product_id).await?.unwrap_or(0);
                tracing::info!(product_id, requested, available, "Checkout rolled back: insufficient stock");

                roll_back(txn.rollback()).await;
                return Err(TransactionError::InsufficientStock {
                    product_id,
                    requested,
                    available,
                });
            }
        }

        txn.commit().await?;

        tracing::info!(
            transaction_id = header.id,
            total_amount = header.total_amount,
            lines = details.len(),
            "Checkout committed"
        );
        Ok(Transaction::from_models(header, details))
    }

    async fn get_by_id(&self, id: i32) -> TransactionResult<Option<Transaction>> {
        let Some(header) = self.base.find_by_id(id).await? else {
            return Ok(None);
        };

        let mut details = self.details_for(vec![id]).await?;
        Ok(Some(Transaction::from_models(
            header,
            details.remove(&id).unwrap_or_default(),
        )))
    }

    async fn list_recent(&self, limit: u64) -> TransactionResult<Vec<Transaction>> {
        let headers = transaction::Entity::find()
            .order_by_desc(transaction::Column::CreatedAt)
            .order_by_desc(transaction::Column::Id)
            .limit(limit)
            .all(self.base.db())
            .await?;

        let mut details = self.details_for(headers.iter().map(|h| h.id).collect()).await?;

        Ok(headers
            .into_iter()
            .map(|h| {
                let lines = details.remove(&h.id).unwrap_or_default();
                Transaction::from_models(h, lines)
            })
            .collect())
    }

    async fn report(&self, window: ReportWindow) -> TransactionResult<Option<Report>> {
        let db = self.base.db();

        let totals = Totals::find_by_statement(Self::window_statement(TOTALS_SQL, &window))
            .one(db)
            .await?
            .ok_or_else(|| TransactionError::Persistence("Report totals returned no row".to_string()))?;

        if totals.matched == 0 {
            return Ok(None);
        }

        let best = BestSellerRow::find_by_statement(Self::window_statement(BEST_SELLER_SQL, &window))
            .one(db)
            .await?;

        Ok(Some(Report {
            total_revenue: totals.total_revenue,
            total_transactions: totals.total_transactions,
            best_selling_product: best.map(|row| BestSeller {
                name: row.name,
                quantity_sold: row.quantity_sold,
            }),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{NaiveDate, Utc};
    use domain_products::entity::product;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};

    fn product_model(id: i32, price: i64, stock: i32) -> product::Model {
        product::Model {
            id,
            name: format!("P{}", id),
            price,
            stock,
        }
    }

    fn window() -> ReportWindow {
        ReportWindow::today(NaiveDate::from_ymd_opt(2024, 5, 17).unwrap()).unwrap()
    }

    #[tokio::test]
    async fn test_unknown_product_stops_before_any_write() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![product_model(1, 1000, 5)]])
            .into_connection();

        let repo = PgTransactionRepository::new(db.clone());
        let result = repo
            .checkout(vec![
                CheckoutItem {
                    product_id: 1,
                    quantity: 1,
                },
                CheckoutItem {
                    product_id: 2,
                    quantity: 1,
                },
            ])
            .await;

        assert!(matches!(result, Err(TransactionError::UnknownProduct(2))));

        let log = format!("{:?}", db.into_transaction_log());
        assert!(!log.contains("INSERT"));
        assert!(!log.contains("UPDATE"));
    }

    #[tokio::test]
    async fn test_failed_decrement_reports_available_stock() {
        let now = Utc::now();
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![product_model(1, 1000, 5)]])
            .append_query_results([vec![transaction::Model {
                id: 1,
                total_amount: 3000,
                created_at: now,
            }]])
            .append_query_results([vec![transaction_detail::Model {
                id: 1,
                transaction_id: 1,
                product_id: 1,
                product_name: "P1".into(),
                quantity: 3,
                subtotal: 3000,
            }]])
            .append_exec_results([MockExecResult {
                last_insert_id: 0,
                rows_affected: 0,
            }])
            .append_query_results([vec![std::collections::BTreeMap::from([(
                "stock".to_string(),
                sea_orm::Value::from(1i32),
            )])]])
            .into_connection();

        let repo = PgTransactionRepository::new(db);
        let result = repo
            .checkout(vec![CheckoutItem {
                product_id: 1,
                quantity: 3,
            }])
            .await;

        assert!(matches!(
            result,
            Err(TransactionError::InsufficientStock {
                product_id: 1,
                requested: 3,
                available: 1
            })
        ));
    }

    #[tokio::test]
    async fn test_failed_rollback_is_swallowed() {
        roll_back(async { Err(sea_orm::DbErr::Custom("connection reset".into())) }).await;
        roll_back(async { Ok(()) }).await;
    }

    #[tokio::test]
    async fn test_empty_window_is_none() {
        let db = MockDatabase::new(DatabaseBackend::Postgres)
            .append_query_results([vec![std::collections::BTreeMap::from([
                ("matched".to_string(), sea_orm::Value::from(0i64)),
                ("total_transactions".to_string(), sea_orm::Value::from(0i64)),
                ("total_revenue".to_string(), sea_orm::Value::from(0i64)),
            ])]])
            .into_connection();

        let repo = PgTransactionRepository::new(db);
        assert!(repo.report(window()).await.unwrap().is_none());
    }
}
