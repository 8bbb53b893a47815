use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::{get, post},
};
use axum_helpers::{
    AuditEvent, AuditOutcome, IdPath, ValidatedJson,
    errors::responses::{
        BadRequestIdResponse, BadRequestValidationResponse, ConflictResponse,
        InternalServerErrorResponse, NotFoundResponse,
    },
    extract_ip_from_headers, extract_user_agent,
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::TransactionResult;
use crate::models::{
    BestSeller, CheckoutItem, CheckoutRequest, ListQuery, Report, ReportQuery, Transaction,
    TransactionDetail,
};
use crate::repository::TransactionRepository;
use crate::service::TransactionService;

const TAG: &str = "transactions";

#[derive(OpenApi)]
#[openapi(
    paths(
        checkout,
        list_transactions,
        get_transaction,
        report,
        today_report,
    ),
    components(
        schemas(
            CheckoutRequest,
            CheckoutItem,
            Transaction,
            TransactionDetail,
            Report,
            BestSeller
        ),
        responses(
            NotFoundResponse,
            ConflictResponse,
            BadRequestValidationResponse,
            BadRequestIdResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = TAG, description = "Checkout, transaction history and sales reports")
    )
)]
pub struct ApiDoc;

/// Routes are absolute (`/checkout`, `/transactions`, `/report`), so merge rather than nest.
pub fn router<R: TransactionRepository + 'static>(service: TransactionService<R>) -> Router {
    Router::new()
        .route("/checkout", post(checkout))
        .route("/transactions", get(list_transactions))
        .route("/transactions/{id}", get(get_transaction))
        .route("/report", get(report))
        .route("/report/hari-ini", get(today_report))
        .with_state(Arc::new(service))
}

/// Check out a basket
///
/// Prices every item, records the transaction and decrements stock in one
/// database transaction. Nothing is written when any item fails.
///
/// Responds `201 Created` with the recorded transaction, matching the other
/// create endpoints of this API.
#[utoipa::path(
    post,
    path = "/checkout",
    tag = TAG,
    request_body = CheckoutRequest,
    responses(
        (status = 201, description = "Transaction recorded", body = Transaction),
        (status = 400, response = BadRequestValidationResponse),
        (status = 404, response = NotFoundResponse),
        (status = 409, response = ConflictResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn checkout<R: TransactionRepository>(
    State(service): State<Arc<TransactionService<R>>>,
    headers: HeaderMap,
    ValidatedJson(request): ValidatedJson<CheckoutRequest>,
) -> TransactionResult<impl IntoResponse> {
    let transaction = service.checkout(request).await?;

    AuditEvent::new(
        "transaction.checkout",
        Some(format!("transaction:{}", transaction.id)),
        AuditOutcome::Success,
    )
    .with_ip(extract_ip_from_headers(&headers))
    .with_user_agent(extract_user_agent(&headers))
    .with_details(serde_json::json!({
        "total_amount": transaction.total_amount,
        "lines": transaction.details.len(),
    }))
    .log();

    Ok((StatusCode::CREATED, Json(transaction)))
}

/// Recent transactions, newest first
#[utoipa::path(
    get,
    path = "/transactions",
    tag = TAG,
    params(ListQuery),
    responses(
        (status = 200, description = "Transactions with their details", body = Vec<Transaction>),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_transactions<R: TransactionRepository>(
    State(service): State<Arc<TransactionService<R>>>,
    Query(query): Query<ListQuery>,
) -> TransactionResult<Json<Vec<Transaction>>> {
    Ok(Json(service.list_transactions(query).await?))
}

/// Get a transaction by id
#[utoipa::path(
    get,
    path = "/transactions/{id}",
    tag = TAG,
    params(("id" = i32, Path, description = "Transaction ID")),
    responses(
        (status = 200, description = "Transaction found", body = Transaction),
        (status = 400, response = BadRequestIdResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_transaction<R: TransactionRepository>(
    State(service): State<Arc<TransactionService<R>>>,
    IdPath(id): IdPath,
) -> TransactionResult<Json<Transaction>> {
    Ok(Json(service.get_transaction(id).await?))
}

/// Sales report over a date range
///
/// Both dates are local calendar days and default to today; `end_date` is inclusive.
#[utoipa::path(
    get,
    path = "/report",
    tag = TAG,
    params(ReportQuery),
    responses(
        (status = 200, description = "Sales report", body = Report),
        (status = 400, response = BadRequestValidationResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn report<R: TransactionRepository>(
    State(service): State<Arc<TransactionService<R>>>,
    Query(query): Query<ReportQuery>,
) -> TransactionResult<Json<Report>> {
    Ok(Json(service.report(query).await?))
}

/// Today's sales report
#[utoipa::path(
    get,
    path = "/report/hari-ini",
    tag = TAG,
    responses(
        (status = 200, description = "Sales report for the current local day", body = Report),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn today_report<R: TransactionRepository>(
    State(service): State<Arc<TransactionService<R>>>,
) -> TransactionResult<Json<Report>> {
    Ok(Json(service.today_report().await?))
}
