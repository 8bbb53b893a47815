use chrono::{Local, NaiveDate};
use observability::{CheckoutMetrics, CheckoutOutcome, CheckoutTimer, ReportMetrics};
use std::sync::Arc;
use tracing::instrument;
use validator::Validate;

use crate::error::{TransactionError, TransactionResult};
use crate::models::{CheckoutRequest, ListQuery, Report, ReportQuery, Transaction};
use crate::report::ReportWindow;
use crate::repository::TransactionRepository;

#[derive(Clone)]
pub struct TransactionService<R: TransactionRepository> {
    repository: Arc<R>,
}

impl<R: TransactionRepository> TransactionService<R> {
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    #[instrument(skip(self, request), fields(items = request.items.len()))]
    pub async fn checkout(&self, request: CheckoutRequest) -> TransactionResult<Transaction> {
        let mut timer = CheckoutTimer::start();

        let result = match request.validate() {
            Ok(()) => self.repository.checkout(request.items).await,
            Err(e) => Err(TransactionError::Validation(e.to_string())),
        };

        match &result {
            Ok(transaction) => {
                let units: u64 = transaction
                    .details
                    .iter()
                    .map(|d| u64::try_from(d.quantity).unwrap_or(0))
                    .sum();
                CheckoutMetrics::record_committed(
                    units,
                    u64::try_from(transaction.total_amount).unwrap_or(0),
                );
            }
            Err(e) => {
                CheckoutMetrics::record_rejected(outcome_of(e));
                tracing::info!(error = %e, "Checkout rejected");
            }
        }

        timer.stop();
        result
    }

    #[instrument(skip(self))]
    pub async fn get_transaction(&self, id: i32) -> TransactionResult<Transaction> {
        self.repository
            .get_by_id(id)
            .await?
            .ok_or(TransactionError::NotFound(id))
    }

    #[instrument(skip(self))]
    pub async fn list_transactions(&self, query: ListQuery) -> TransactionResult<Vec<Transaction>> {
        self.repository.list_recent(query.limit()).await
    }

    /// Report over the requested window, relative to the local calendar day.
    pub async fn report(&self, query: ReportQuery) -> TransactionResult<Report> {
        self.report_on(query, Local::now().date_naive()).await
    }

    /// Report with `today` pinned, for callers that need a fixed clock.
    #[instrument(skip(self))]
    pub async fn report_on(&self, query: ReportQuery, today: NaiveDate) -> TransactionResult<Report> {
        let window =
            ReportWindow::resolve(query.start_date.as_deref(), query.end_date.as_deref(), today)?;
        self.generate("range", window).await
    }

    #[instrument(skip(self))]
    pub async fn today_report(&self) -> TransactionResult<Report> {
        let window = ReportWindow::today(Local::now().date_naive())?;
        self.generate("today", window).await
    }

    async fn generate(&self, kind: &'static str, window: ReportWindow) -> TransactionResult<Report> {
        let report = self.repository.report(window).await?;
        ReportMetrics::record_generated(kind, report.is_none());

        Ok(report.unwrap_or_else(Report::empty))
    }
}

fn outcome_of(err: &TransactionError) -> CheckoutOutcome {
    match err {
        TransactionError::UnknownProduct(_) => CheckoutOutcome::UnknownProduct,
        TransactionError::InsufficientStock { .. } => CheckoutOutcome::InsufficientStock,
        TransactionError::Validation(_) => CheckoutOutcome::Invalid,
        _ => CheckoutOutcome::Failed,
    }
}
