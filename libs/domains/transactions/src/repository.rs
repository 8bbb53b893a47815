use async_trait::async_trait;
use chrono::Utc;
use domain_products::InMemoryProductRepository;
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::sync::Mutex;

use crate::checkout::{self, CheckoutPlan};
use crate::error::TransactionResult;
use crate::models::{CheckoutItem, Report, Transaction, TransactionDetail};
use crate::report::{self, ReportWindow};

/// Repository trait for the sales ledger
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait TransactionRepository: Send + Sync {
    /// Prices `items`, records the transaction and decrements stock as one unit.
    ///
    /// Either the full transaction is returned or nothing was written.
    async fn checkout(&self, items: Vec<CheckoutItem>) -> TransactionResult<Transaction>;

    async fn get_by_id(&self, id: i32) -> TransactionResult<Option<Transaction>>;

    /// Newest first
    async fn list_recent(&self, limit: u64) -> TransactionResult<Vec<Transaction>>;

    /// `None` when no transaction falls inside `window`
    async fn report(&self, window: ReportWindow) -> TransactionResult<Option<Report>>;
}

#[derive(Debug, Default)]
struct Ledger {
    next_id: i32,
    next_detail_id: i32,
    transactions: BTreeMap<i32, Transaction>,
}

impl Ledger {
    fn record(&mut self, plan: CheckoutPlan) -> Transaction {
        self.next_id += 1;
        let transaction_id = self.next_id;

        let details = plan
            .lines
            .into_iter()
            .map(|line| {
                self.next_detail_id += 1;
                TransactionDetail {
                    id: self.next_detail_id,
                    transaction_id,
                    product_id: line.product_id,
                    product_name: line.product_name,
                    quantity: line.quantity,
                    subtotal: line.subtotal,
                }
            })
            .collect();

        let transaction = Transaction {
            id: transaction_id,
            total_amount: plan.total_amount,
            created_at: Utc::now(),
            details,
        };
        self.transactions.insert(transaction_id, transaction.clone());
        transaction
    }
}

/// In-memory ledger over an in-memory catalog (for development/testing).
///
/// Checkouts are serialized by the ledger lock; the catalog applies the
/// whole stock demand or none of it.
#[derive(Debug, Clone)]
pub struct InMemoryTransactionRepository {
    products: InMemoryProductRepository,
    ledger: Arc<Mutex<Ledger>>,
}

impl InMemoryTransactionRepository {
    pub fn new(products: InMemoryProductRepository) -> Self {
        Self {
            products,
            ledger: Arc::new(Mutex::new(Ledger::default())),
        }
    }
}

#[async_trait]
impl TransactionRepository for InMemoryTransactionRepository {
    async fn checkout(&self, items: Vec<CheckoutItem>) -> TransactionResult<Transaction> {
        let mut ledger = self.ledger.lock().await;

        let catalog = self.products.snapshots(&checkout::requested_ids(&items)).await?;
        let plan = checkout::plan(&items, &catalog)?;

        self.products.decrement_many(&plan.demand).await?;
        let transaction = ledger.record(plan);

        tracing::info!(
            transaction_id = transaction.id,
            total_amount = transaction.total_amount,
            "Checkout committed"
        );
        Ok(transaction)
    }

    async fn get_by_id(&self, id: i32) -> TransactionResult<Option<Transaction>> {
        Ok(self.ledger.lock().await.transactions.get(&id).cloned())
    }

    async fn list_recent(&self, limit: u64) -> TransactionResult<Vec<Transaction>> {
        let ledger = self.ledger.lock().await;
        Ok(ledger
            .transactions
            .values()
            .rev()
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn report(&self, window: ReportWindow) -> TransactionResult<Option<Report>> {
        let ledger = self.ledger.lock().await;
        let matched: Vec<&Transaction> = ledger
            .transactions
            .values()
            .filter(|t| window.contains(t.created_at))
            .collect();

        if matched.is_empty() {
            return Ok(None);
        }

        Ok(Some(
            report::summarize(matched.iter().flat_map(|t| t.details.iter()))
                .unwrap_or_else(Report::empty),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransactionError;
    use chrono::Local;
    use domain_categories::InMemoryCategoryRepository;
    use domain_products::{ProductInput, ProductRepository};

    fn item(product_id: i32, quantity: i32) -> CheckoutItem {
        CheckoutItem {
            product_id,
            quantity,
        }
    }

    async fn seeded() -> (InMemoryTransactionRepository, InMemoryProductRepository) {
        let products = InMemoryProductRepository::new(InMemoryCategoryRepository::new());
        for (name, price, stock) in [("A", 1000, 5), ("B", 500, 10)] {
            products
                .create(ProductInput {
                    name: name.into(),
                    price,
                    stock,
                    categories: vec![],
                })
                .await
                .unwrap();
        }
        (InMemoryTransactionRepository::new(products.clone()), products)
    }

    async fn stock_of(products: &InMemoryProductRepository, id: i32) -> i32 {
        products.get_by_id(id).await.unwrap().unwrap().stock
    }

    #[tokio::test]
    async fn test_checkout_decrements_stock_and_records_details() {
        let (repo, products) = seeded().await;

        let transaction = repo.checkout(vec![item(1, 2), item(2, 3)]).await.unwrap();

        assert_eq!(transaction.total_amount, 3500);
        assert_eq!(transaction.details.len(), 2);
        assert!(transaction.details.iter().all(|d| d.transaction_id == transaction.id));
        assert_eq!(stock_of(&products, 1).await, 3);
        assert_eq!(stock_of(&products, 2).await, 7);
    }

    #[tokio::test]
    async fn test_unknown_product_leaves_everything_untouched() {
        let (repo, products) = seeded().await;

        let result = repo.checkout(vec![item(1, 2), item(3, 1)]).await;

        assert!(matches!(result, Err(TransactionError::UnknownProduct(3))));
        assert_eq!(stock_of(&products, 1).await, 5);
        assert!(repo.list_recent(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_oversell_is_rejected_atomically() {
        let (repo, products) = seeded().await;

        let result = repo.checkout(vec![item(2, 1), item(1, 4), item(1, 2)]).await;

        assert!(matches!(
            result,
            Err(TransactionError::InsufficientStock {
                product_id: 1,
                requested: 6,
                available: 5
            })
        ));
        assert_eq!(stock_of(&products, 2).await, 10);
        assert!(repo.get_by_id(1).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_details_keep_name_snapshot() {
        let (repo, products) = seeded().await;
        let transaction = repo.checkout(vec![item(1, 1)]).await.unwrap();

        products
            .update(
                1,
                ProductInput {
                    name: "A v2".into(),
                    price: 9999,
                    stock: 4,
                    categories: vec![],
                },
            )
            .await
            .unwrap();

        let stored = repo.get_by_id(transaction.id).await.unwrap().unwrap();
        assert_eq!(stored.details[0].product_name, "A");
        assert_eq!(stored.details[0].subtotal, 1000);
    }

    #[tokio::test]
    async fn test_list_recent_is_newest_first() {
        let (repo, _) = seeded().await;
        for _ in 0..3 {
            repo.checkout(vec![item(2, 1)]).await.unwrap();
        }

        let ids: Vec<i32> = repo.list_recent(2).await.unwrap().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![3, 2]);
    }

    #[tokio::test]
    async fn test_report_over_today() {
        let (repo, _) = seeded().await;
        let today = ReportWindow::today(Local::now().date_naive()).unwrap();

        assert!(repo.report(today).await.unwrap().is_none());

        repo.checkout(vec![item(1, 2), item(2, 3)]).await.unwrap();
        repo.checkout(vec![item(2, 3)]).await.unwrap();

        let report = repo.report(today).await.unwrap().unwrap();
        assert_eq!(report.total_revenue, 5000);
        assert_eq!(report.total_transactions, 3);
        let best = report.best_selling_product.unwrap();
        assert_eq!((best.name.as_str(), best.quantity_sold), ("B", 6));
    }
}
