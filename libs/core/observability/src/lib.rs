//! Prometheus metrics for the catalog services.
//!
//! - recorder installation and the `/metrics` handler
//! - [`middleware::metrics_middleware`] for per-route HTTP metrics
//! - [`CheckoutMetrics`] and [`ReportMetrics`] for the sales domain
//!
//! ```rust,ignore
//! use observability::{init_metrics, metrics_handler, metrics_middleware};
//!
//! init_metrics()?;
//!
//! let app = Router::new()
//!     .route("/metrics", get(metrics_handler))
//!     .layer(axum::middleware::from_fn(metrics_middleware));
//! ```

pub mod checkout;
pub mod middleware;

pub use checkout::{CheckoutMetrics, CheckoutOutcome, CheckoutTimer, ReportMetrics};
pub use middleware::metrics_middleware;

use metrics_exporter_prometheus::{BuildError, PrometheusBuilder, PrometheusHandle};
use once_cell::sync::OnceCell;
use tracing::info;

static METRICS_HANDLE: OnceCell<PrometheusHandle> = OnceCell::new();

/// Installs the global Prometheus recorder. Safe to call more than once.
pub fn init_metrics() -> Result<&'static PrometheusHandle, BuildError> {
    METRICS_HANDLE.get_or_try_init(|| {
        let handle = PrometheusBuilder::new().install_recorder()?;

        info!("Prometheus metrics recorder initialized");
        register_metric_descriptions();

        Ok(handle)
    })
}

pub fn get_metrics_handle() -> Option<&'static PrometheusHandle> {
    METRICS_HANDLE.get()
}

/// Axum handler for `/metrics`.
pub async fn metrics_handler() -> String {
    match get_metrics_handle() {
        Some(handle) => handle.render(),
        None => "# Metrics not initialized\n".to_string(),
    }
}

fn register_metric_descriptions() {
    use metrics::{describe_counter, describe_histogram};

    describe_counter!("http_requests_total", "Total number of HTTP requests");
    describe_histogram!(
        "http_request_duration_seconds",
        "HTTP request duration in seconds"
    );
    describe_counter!(
        "http_requests_errors_total",
        "Total number of HTTP requests answered with 4xx or 5xx"
    );

    describe_counter!("checkouts_total", "Checkout attempts by outcome");
    describe_counter!(
        "checkout_items_total",
        "Units sold through committed checkouts"
    );
    describe_counter!(
        "checkout_revenue_total",
        "Revenue of committed checkouts in minor currency units"
    );
    describe_histogram!(
        "checkout_duration_seconds",
        "Checkout transaction duration in seconds"
    );

    describe_counter!("reports_generated_total", "Sales reports generated by kind");
}
