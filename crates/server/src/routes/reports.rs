//! Report commands.

use axum::{Json, Router, extract::State, routing::post};
use tower_sessions::Session;
use tracing::instrument;

use caja_core::Permission;
use caja_core::dto::reports::{
    CategoryReportParams, CategoryReportResult, DashboardParams, DashboardResult,
    PaymentMethodReportParams, PaymentMethodReportResult, ProductReportParams,
    ProductReportResult, RefundsReportParams, RefundsReportResult, ReportArgs,
    SalesOverTimeParams, SalesOverTimeResult,
};

use crate::error::AppError;
use crate::middleware::require_permission;
use crate::services::ReportService;
use crate::state::AppState;

/// Build the report command router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/invoke/get_dashboard_report", post(get_dashboard_report))
        .route(
            "/invoke/get_sales_over_time_report",
            post(get_sales_over_time_report),
        )
        .route("/invoke/get_product_report", post(get_product_report))
        .route("/invoke/get_category_report", post(get_category_report))
        .route(
            "/invoke/get_payment_method_report",
            post(get_payment_method_report),
        )
        .route("/invoke/get_refunds_report", post(get_refunds_report))
}

/// # Errors
///
/// Returns `AppError::BadRequest` for a reversed date range.
#[instrument(skip_all, fields(from = %args.params.range.date_from, to = %args.params.range.date_to))]
pub async fn get_dashboard_report(
    State(state): State<AppState>,
    session: Session,
    Json(args): Json<ReportArgs<DashboardParams>>,
) -> Result<Json<DashboardResult>, AppError> {
    require_permission(&session, Permission::ReportsSales).await?;

    let report = ReportService::new(state.pool())
        .dashboard(&args.params.range)
        .await?;
    Ok(Json(report))
}

/// # Errors
///
/// Returns `AppError::BadRequest` for a reversed date range.
#[instrument(skip_all, fields(grouping = ?args.params.grouping))]
pub async fn get_sales_over_time_report(
    State(state): State<AppState>,
    session: Session,
    Json(args): Json<ReportArgs<SalesOverTimeParams>>,
) -> Result<Json<SalesOverTimeResult>, AppError> {
    require_permission(&session, Permission::ReportsSales).await?;

    let report = ReportService::new(state.pool())
        .sales_over_time(&args.params.range, args.params.grouping)
        .await?;
    Ok(Json(report))
}

/// # Errors
///
/// Returns `AppError::BadRequest` for a reversed date range.
pub async fn get_product_report(
    State(state): State<AppState>,
    session: Session,
    Json(args): Json<ReportArgs<ProductReportParams>>,
) -> Result<Json<ProductReportResult>, AppError> {
    require_permission(&session, Permission::ReportsInventory).await?;

    let params = args.params;
    let report = ReportService::new(state.pool())
        .products(&params.range, params.product_id, params.category_id)
        .await?;
    Ok(Json(report))
}

/// # Errors
///
/// Returns `AppError::BadRequest` for a reversed date range.
pub async fn get_category_report(
    State(state): State<AppState>,
    session: Session,
    Json(args): Json<ReportArgs<CategoryReportParams>>,
) -> Result<Json<CategoryReportResult>, AppError> {
    require_permission(&session, Permission::ReportsSales).await?;

    let report = ReportService::new(state.pool())
        .categories(&args.params.range)
        .await?;
    Ok(Json(report))
}

/// # Errors
///
/// Returns `AppError::BadRequest` for a reversed date range.
pub async fn get_payment_method_report(
    State(state): State<AppState>,
    session: Session,
    Json(args): Json<ReportArgs<PaymentMethodReportParams>>,
) -> Result<Json<PaymentMethodReportResult>, AppError> {
    require_permission(&session, Permission::ReportsFinancial).await?;

    let report = ReportService::new(state.pool())
        .payment_methods(&args.params.range)
        .await?;
    Ok(Json(report))
}

/// # Errors
///
/// Returns `AppError::BadRequest` for a reversed date range.
pub async fn get_refunds_report(
    State(state): State<AppState>,
    session: Session,
    Json(args): Json<ReportArgs<RefundsReportParams>>,
) -> Result<Json<RefundsReportResult>, AppError> {
    require_permission(&session, Permission::ReportsFinancial).await?;

    let report = ReportService::new(state.pool())
        .refunds(&args.params.range)
        .await?;
    Ok(Json(report))
}
