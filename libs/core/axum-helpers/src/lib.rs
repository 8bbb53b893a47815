//! # Axum Helpers
//!
//! Shared HTTP plumbing for the catalog services.
//!
//! - **[`server`]**: router assembly with OpenAPI UIs, health endpoints, graceful shutdown
//! - **[`http`]**: CORS and security headers
//! - **[`errors`]**: the JSON error envelope and [`AppError`]
//! - **[`extractors`]**: [`IdPath`] and [`ValidatedJson`]
//! - **[`audit`]**: structured audit events
//!
//! ```ignore
//! let cors = axum_helpers::cors_layer(&environment, config.cors_allowed_origin.as_deref())?;
//! let app = create_router::<ApiDoc>(api_routes, cors).merge(health_router(app_info!()));
//! create_production_app(app, &config.server, Duration::from_secs(30), async {}).await?;
//! ```

pub mod audit;
pub mod errors;
pub mod extractors;
pub mod http;
pub mod response;
pub mod server;

pub use server::{
    HealthCheckFuture, HealthResponse, ShutdownCoordinator, create_production_app, create_router,
    health_router, run_health_checks, shutdown_signal,
};

pub use http::{cors_layer, create_cors_layer, create_permissive_cors_layer, security_headers};

pub use errors::responses::{
    BadRequestIdResponse, BadRequestValidationResponse, ConflictResponse,
    InternalServerErrorResponse, NotFoundResponse, ServiceUnavailableResponse,
};
pub use errors::{AppError, ErrorCode, ErrorResponse};

pub use extractors::{IdPath, ValidatedJson};

pub use response::MessageResponse;

pub use audit::{AuditEvent, AuditOutcome, extract_ip_from_headers, extract_user_agent};
