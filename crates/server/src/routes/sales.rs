//! Sale commands.

use axum::{Json, Router, extract::State, routing::post};
use tower_sessions::Session;

use caja_core::Permission;
use caja_core::dto::sales::{
    CreateSaleArgs, CreateSaleResponse, GetSalesArgs, PaymentMethod, SaleListResponse,
};

use crate::db::SaleRepository;
use crate::error::AppError;
use crate::middleware::require_permission;
use crate::services::SalesService;
use crate::state::AppState;

/// Build the sale command router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/invoke/get_sales", post(get_sales))
        .route("/invoke/get_payment_methods", post(get_payment_methods))
        .route("/invoke/create_sale", post(create_sale))
}

/// # Errors
///
/// Returns `AppError::Database` if the query fails.
pub async fn get_sales(
    State(state): State<AppState>,
    session: Session,
    Json(args): Json<GetSalesArgs>,
) -> Result<Json<SaleListResponse>, AppError> {
    require_permission(&session, Permission::SalesView).await?;

    let sales = SalesService::new(state.pool()).list(&args.filters).await?;
    Ok(Json(sales))
}

/// # Errors
///
/// Returns `AppError::Database` if the query fails.
pub async fn get_payment_methods(
    State(state): State<AppState>,
    session: Session,
) -> Result<Json<Vec<PaymentMethod>>, AppError> {
    require_permission(&session, Permission::SalesView).await?;

    let methods = SaleRepository::new(state.pool()).payment_methods().await?;
    Ok(Json(methods))
}

/// Record a sale in one transaction.
///
/// # Errors
///
/// Returns `AppError::BadRequest` for an invalid request and
/// `AppError::Conflict` when stock is short.
pub async fn create_sale(
    State(state): State<AppState>,
    session: Session,
    Json(args): Json<CreateSaleArgs>,
) -> Result<Json<CreateSaleResponse>, AppError> {
    let user = require_permission(&session, Permission::SalesCreate).await?;

    let sale = SalesService::new(state.pool())
        .create_sale(&args.request, &user.user_id)
        .await?;
    Ok(Json(sale))
}
