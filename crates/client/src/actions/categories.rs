//! Category actions.

use serde_json::json;

use caja_core::CategoryId;
use caja_core::dto::categories::{Category, CategoryListResponse, NewCategory, UpdateCategory};

use super::{Api, keys};
use crate::invoke::{InvokeError, Invoker};

/// `get_all_categories` for active categories, no search.
///
/// # Errors
///
/// Returns the backend's error message.
pub async fn list<I: Invoker + 'static>(api: &Api<I>) -> Result<CategoryListResponse, InvokeError> {
    let key = format!("{}active", keys::CATEGORIES);
    api.cached(
        key,
        "get_all_categories",
        json!({ "filters": { "status": true, "search": null } }),
    )
    .await
}

/// `get_all_categories` with an explicit status and name search.
///
/// Not cached: every search term would be its own key.
///
/// # Errors
///
/// Returns the backend's error message.
pub async fn search<I: Invoker + 'static>(
    api: &Api<I>,
    status: Option<bool>,
    search: Option<&str>,
) -> Result<CategoryListResponse, InvokeError> {
    api.call(
        "get_all_categories",
        json!({ "filters": { "status": status, "search": search } }),
    )
    .await
}

/// # Errors
///
/// Returns the backend's error message.
pub async fn get<I: Invoker + 'static>(
    api: &Api<I>,
    id: CategoryId,
) -> Result<Category, InvokeError> {
    let key = format!("{}id:{id}", keys::CATEGORIES);
    api.cached(key, "get_category_by_id", json!({ "id": id })).await
}

/// # Errors
///
/// Returns the backend's error message, e.g. a duplicate name.
pub async fn create<I: Invoker + 'static>(
    api: &Api<I>,
    category: &NewCategory,
) -> Result<Category, InvokeError> {
    api.mutate(
        "create_category",
        json!({ "categoryData": category }),
        keys::CATEGORIES,
    )
    .await
}

/// # Errors
///
/// Returns the backend's error message.
pub async fn update<I: Invoker + 'static>(
    api: &Api<I>,
    id: CategoryId,
    changes: &UpdateCategory,
) -> Result<Category, InvokeError> {
    api.mutate(
        "update_category",
        json!({ "id": id, "updateData": changes }),
        keys::CATEGORIES,
    )
    .await
}

/// Soft delete.
///
/// # Errors
///
/// Returns the backend's error message.
pub async fn delete<I: Invoker + 'static>(
    api: &Api<I>,
    id: CategoryId,
) -> Result<Category, InvokeError> {
    api.mutate("delete_category", json!({ "id": id }), keys::CATEGORIES)
        .await
}

/// Remove the row; refused while products use the category.
///
/// Product listings carry category names, so they are dropped too.
///
/// # Errors
///
/// Returns the backend's error message.
pub async fn hard_delete<I: Invoker + 'static>(
    api: &Api<I>,
    id: CategoryId,
) -> Result<Category, InvokeError> {
    let category = api
        .mutate("hard_delete_category", json!({ "id": id }), keys::CATEGORIES)
        .await?;
    api.cache().invalidate_prefix(keys::PRODUCTS).await;
    Ok(category)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use crate::invoke::mock::MockInvoker;

    use super::*;

    #[tokio::test]
    async fn test_list_sends_active_filter() {
        let invoker = Arc::new(MockInvoker::default());
        invoker.respond(
            "get_all_categories",
            json!({ "categories": [{ "id": 1, "name": "Abarrotes", "is_active": true }], "total": 1 }),
        );
        let api = Api::new(Arc::clone(&invoker));

        let result = list(&api).await.unwrap();
        assert_eq!(result.total, 1);
        assert_eq!(result.categories[0].name, "Abarrotes");

        let (_, args) = &invoker.calls()[0];
        assert_eq!(args, &json!({ "filters": { "status": true, "search": null } }));
    }

    #[tokio::test]
    async fn test_create_invalidates() {
        let invoker = Arc::new(MockInvoker::default());
        invoker.respond(
            "get_all_categories",
            json!({ "categories": [], "total": 0 }),
        );
        invoker.respond(
            "create_category",
            json!({ "id": 2, "name": "Bebidas", "is_active": true }),
        );
        let api = Api::new(Arc::clone(&invoker));

        list(&api).await.unwrap();
        let created = create(
            &api,
            &NewCategory {
                name: "Bebidas".to_owned(),
            },
        )
        .await
        .unwrap();
        assert_eq!(created.id, CategoryId::new(2));
        list(&api).await.unwrap();

        assert_eq!(invoker.call_count("get_all_categories"), 2);
        assert_eq!(invoker.calls()[1].1["categoryData"]["name"], "Bebidas");
    }
}
