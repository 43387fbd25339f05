//! Category commands.

use axum::{Json, Router, extract::State, routing::post};
use tower_sessions::Session;
use tracing::instrument;

use caja_core::Permission;
use caja_core::dto::categories::{
    Category, CategoryIdArgs, CategoryListResponse, CreateCategoryArgs, GetCategoriesArgs,
    UpdateCategoryArgs,
};

use crate::db::CategoryRepository;
use crate::error::AppError;
use crate::middleware::require_permission;
use crate::state::AppState;

const DUPLICATE_NAME: &str = "a category with this name already exists";

/// Build the category command router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/invoke/get_all_categories", post(get_all_categories))
        .route("/invoke/get_category_by_id", post(get_category_by_id))
        .route("/invoke/create_category", post(create_category))
        .route("/invoke/update_category", post(update_category))
        .route("/invoke/delete_category", post(delete_category))
        .route("/invoke/hard_delete_category", post(hard_delete_category))
}

/// # Errors
///
/// Returns `AppError::Database` if the query fails.
pub async fn get_all_categories(
    State(state): State<AppState>,
    session: Session,
    Json(args): Json<GetCategoriesArgs>,
) -> Result<Json<CategoryListResponse>, AppError> {
    require_permission(&session, Permission::CategoriesView).await?;

    let (categories, total) = CategoryRepository::new(state.pool())
        .list(&args.filters)
        .await?;
    Ok(Json(CategoryListResponse { categories, total }))
}

/// # Errors
///
/// Returns `AppError::NotFound` if the category doesn't exist.
pub async fn get_category_by_id(
    State(state): State<AppState>,
    session: Session,
    Json(args): Json<CategoryIdArgs>,
) -> Result<Json<Category>, AppError> {
    require_permission(&session, Permission::CategoriesView).await?;

    let category = CategoryRepository::new(state.pool())
        .get_by_id(args.id)
        .await?
        .ok_or_else(|| not_found(args))?;
    Ok(Json(category))
}

/// # Errors
///
/// Returns `AppError::Conflict` if the name is taken.
#[instrument(skip_all, fields(name = %args.category_data.name))]
pub async fn create_category(
    State(state): State<AppState>,
    session: Session,
    Json(args): Json<CreateCategoryArgs>,
) -> Result<Json<Category>, AppError> {
    let user = require_permission(&session, Permission::CategoriesCreate).await?;

    let name = required_name(&args.category_data.name)?;
    let categories = CategoryRepository::new(state.pool());
    if categories.name_taken(name, None).await? {
        return Err(AppError::Conflict(DUPLICATE_NAME.to_string()));
    }

    let category = categories.create(name, &user.user_id).await?;
    tracing::info!(category_id = %category.id, "Category created");
    Ok(Json(category))
}

/// # Errors
///
/// Returns `AppError::NotFound` if the category doesn't exist and
/// `AppError::Conflict` if another category has the new name.
#[instrument(skip_all, fields(category_id = %args.id))]
pub async fn update_category(
    State(state): State<AppState>,
    session: Session,
    Json(args): Json<UpdateCategoryArgs>,
) -> Result<Json<Category>, AppError> {
    let user = require_permission(&session, Permission::CategoriesEdit).await?;

    let categories = CategoryRepository::new(state.pool());
    let mut changes = args.update_data;
    if let Some(name) = changes.name.as_deref() {
        let name = required_name(name)?.to_owned();
        if categories.name_taken(&name, Some(args.id)).await? {
            return Err(AppError::Conflict(DUPLICATE_NAME.to_string()));
        }
        changes.name = Some(name);
    }

    let category = categories
        .update(args.id, &changes, &user.user_id)
        .await
        .map_err(|e| AppError::from_repository(e, &format!("category {}", args.id)))?;
    Ok(Json(category))
}

/// Soft delete: mark the category inactive.
///
/// # Errors
///
/// Returns `AppError::NotFound` if the category doesn't exist.
#[instrument(skip_all, fields(category_id = %args.id))]
pub async fn delete_category(
    State(state): State<AppState>,
    session: Session,
    Json(args): Json<CategoryIdArgs>,
) -> Result<Json<Category>, AppError> {
    let user = require_permission(&session, Permission::CategoriesDelete).await?;

    let category = CategoryRepository::new(state.pool())
        .deactivate(args.id, &user.user_id)
        .await
        .map_err(|e| AppError::from_repository(e, &format!("category {}", args.id)))?;
    tracing::info!(category_id = %category.id, "Category deactivated");
    Ok(Json(category))
}

/// Remove the row. Refused while products reference the category.
///
/// # Errors
///
/// Returns `AppError::NotFound` if the category doesn't exist and
/// `AppError::Conflict` if products still use it.
#[instrument(skip_all, fields(category_id = %args.id))]
pub async fn hard_delete_category(
    State(state): State<AppState>,
    session: Session,
    Json(args): Json<CategoryIdArgs>,
) -> Result<Json<Category>, AppError> {
    require_permission(&session, Permission::CategoriesDelete).await?;

    let categories = CategoryRepository::new(state.pool());
    let in_use = categories.product_count(args.id).await?;
    if in_use > 0 {
        return Err(AppError::Conflict(format!(
            "category still has {in_use} product(s)"
        )));
    }

    let category = categories
        .delete(args.id)
        .await
        .map_err(|e| AppError::from_repository(e, &format!("category {}", args.id)))?;
    tracing::info!(category_id = %category.id, "Category deleted");
    Ok(Json(category))
}

fn required_name(name: &str) -> Result<&str, AppError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(AppError::BadRequest("name is required".to_string()));
    }
    Ok(trimmed)
}

fn not_found(args: CategoryIdArgs) -> AppError {
    AppError::NotFound(format!("category {}", args.id))
}
