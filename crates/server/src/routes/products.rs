//! Product commands.

use axum::{Json, Router, extract::State, routing::post};
use tower_sessions::Session;
use tracing::instrument;

use caja_core::dto::products::{
    CreateProductArgs, GetProductsArgs, Product, ProductIdArgs, ProductListResponse,
    UpdateProductArgs,
};
use caja_core::{Permission, pagination};

use crate::db::ProductRepository;
use crate::error::AppError;
use crate::middleware::require_permission;
use crate::state::AppState;

/// Build the product command router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/invoke/get_products", post(get_products))
        .route("/invoke/get_product", post(get_product))
        .route("/invoke/create_product", post(create_product))
        .route("/invoke/update_product", post(update_product))
        .route("/invoke/delete_product", post(delete_product))
}

/// Page of products with the given status.
///
/// # Errors
///
/// Returns `AppError::BadRequest` for a zero page size.
#[instrument(skip_all)]
pub async fn get_products(
    State(state): State<AppState>,
    session: Session,
    Json(args): Json<GetProductsArgs>,
) -> Result<Json<ProductListResponse>, AppError> {
    require_permission(&session, Permission::ProductsView).await?;

    let filters = args.filters;
    if filters.limit == 0 {
        return Err(AppError::BadRequest("limit must be at least 1".to_string()));
    }

    let (products, total_items) = ProductRepository::new(state.pool())
        .list(
            filters.status,
            filters.limit,
            pagination::offset(filters.page, filters.limit),
        )
        .await?;

    Ok(Json(ProductListResponse {
        products,
        total_pages: pagination::total_pages(total_items, filters.limit),
        total_items,
    }))
}

/// One product by id.
///
/// # Errors
///
/// Returns `AppError::NotFound` if the product doesn't exist.
pub async fn get_product(
    State(state): State<AppState>,
    session: Session,
    Json(args): Json<ProductIdArgs>,
) -> Result<Json<Product>, AppError> {
    require_permission(&session, Permission::ProductsView).await?;

    let product = ProductRepository::new(state.pool())
        .get_by_id(args.id_product)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {}", args.id_product)))?;
    Ok(Json(product))
}

/// # Errors
///
/// Returns `AppError::Conflict` if the barcode is already used.
#[instrument(skip_all, fields(code = %args.product_data.code))]
pub async fn create_product(
    State(state): State<AppState>,
    session: Session,
    Json(args): Json<CreateProductArgs>,
) -> Result<Json<Product>, AppError> {
    let user = require_permission(&session, Permission::ProductsCreate).await?;

    let product = args.product_data;
    if product.name.trim().is_empty() || product.code.trim().is_empty() {
        return Err(AppError::BadRequest("name and code are required".to_string()));
    }
    if product.stock < 0 {
        return Err(AppError::BadRequest("stock cannot be negative".to_string()));
    }

    let created = ProductRepository::new(state.pool())
        .create(&product, &user.user_id)
        .await?;
    tracing::info!(product_id = %created.id, "Product created");
    Ok(Json(created))
}

/// # Errors
///
/// Returns `AppError::NotFound` if the product doesn't exist and
/// `AppError::Conflict` if the new barcode is already used.
#[instrument(skip_all, fields(product_id = %args.id_product))]
pub async fn update_product(
    State(state): State<AppState>,
    session: Session,
    Json(args): Json<UpdateProductArgs>,
) -> Result<Json<Product>, AppError> {
    let user = require_permission(&session, Permission::ProductsEdit).await?;

    if args.update_data.stock.is_some_and(|s| s < 0) {
        return Err(AppError::BadRequest("stock cannot be negative".to_string()));
    }

    let updated = ProductRepository::new(state.pool())
        .update(args.id_product, &args.update_data, &user.user_id)
        .await
        .map_err(|e| AppError::from_repository(e, &format!("product {}", args.id_product)))?;
    Ok(Json(updated))
}

/// Hard-delete a product and return it.
///
/// # Errors
///
/// Returns `AppError::NotFound` if the product doesn't exist and
/// `AppError::Conflict` if sales reference it.
#[instrument(skip_all, fields(product_id = %args.id_product))]
pub async fn delete_product(
    State(state): State<AppState>,
    session: Session,
    Json(args): Json<ProductIdArgs>,
) -> Result<Json<Product>, AppError> {
    require_permission(&session, Permission::ProductsDelete).await?;

    let deleted = ProductRepository::new(state.pool())
        .delete(args.id_product)
        .await
        .map_err(|e| AppError::from_repository(e, &format!("product {}", args.id_product)))?;
    tracing::info!(product_id = %deleted.id, "Product deleted");
    Ok(Json(deleted))
}
