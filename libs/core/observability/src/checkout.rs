//! Sales metrics: checkouts and reports.

use metrics::{counter, histogram};
use std::time::Instant;

/// Label value for `checkouts_total{outcome}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckoutOutcome {
    Committed,
    UnknownProduct,
    InsufficientStock,
    Invalid,
    Failed,
}

impl CheckoutOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Committed => "committed",
            Self::UnknownProduct => "unknown_product",
            Self::InsufficientStock => "insufficient_stock",
            Self::Invalid => "invalid",
            Self::Failed => "failed",
        }
    }
}

pub struct CheckoutMetrics;

impl CheckoutMetrics {
    /// A checkout that reached commit.
    pub fn record_committed(units: u64, revenue: u64) {
        counter!("checkouts_total", "outcome" => CheckoutOutcome::Committed.as_str()).increment(1);
        counter!("checkout_items_total").increment(units);
        counter!("checkout_revenue_total").increment(revenue);

        tracing::debug!(units, revenue, "Checkout committed");
    }

    /// A checkout that was rolled back or never started.
    pub fn record_rejected(outcome: CheckoutOutcome) {
        counter!("checkouts_total", "outcome" => outcome.as_str()).increment(1);
    }
}

pub struct ReportMetrics;

impl ReportMetrics {
    /// `kind` is `"range"` or `"today"`.
    pub fn record_generated(kind: &'static str, empty: bool) {
        counter!(
            "reports_generated_total",
            "kind" => kind,
            "empty" => if empty { "true" } else { "false" }
        )
        .increment(1);
    }
}

/// Records `checkout_duration_seconds` on `stop()` or drop.
pub struct CheckoutTimer {
    start: Instant,
    stopped: bool,
}

impl CheckoutTimer {
    pub fn start() -> Self {
        Self {
            start: Instant::now(),
            stopped: false,
        }
    }

    /// Returns the elapsed milliseconds, or 0 if already stopped.
    pub fn stop(&mut self) -> u64 {
        if self.stopped {
            return 0;
        }
        self.stopped = true;

        let duration = self.start.elapsed();
        histogram!("checkout_duration_seconds").record(duration.as_secs_f64());

        duration.as_millis() as u64
    }
}

impl Drop for CheckoutTimer {
    fn drop(&mut self) {
        if !self.stopped {
            self.stop();
        }
    }
}
