//! Product actions.

use serde_json::json;

use caja_core::ProductId;
use caja_core::dto::products::{
    GetProductsArgs, NewProduct, Product, ProductFilter, ProductListResponse, UpdateProduct,
};

use super::{Api, keys};
use crate::invoke::{InvokeError, Invoker};

/// `get_products`. Defaults are page 1, 10 per page, active only.
///
/// # Errors
///
/// Returns the backend's error message.
pub async fn list<I: Invoker + 'static>(
    api: &Api<I>,
    page: Option<u64>,
    limit: Option<u64>,
    status: Option<bool>,
) -> Result<ProductListResponse, InvokeError> {
    let defaults = ProductFilter::default();
    let filters = ProductFilter {
        status: status.unwrap_or(defaults.status),
        page: page.unwrap_or(defaults.page),
        limit: limit.unwrap_or(defaults.limit),
    };
    let key = format!(
        "{}list:{}:{}:{}",
        keys::PRODUCTS,
        filters.status,
        filters.page,
        filters.limit
    );
    let args = serde_json::to_value(GetProductsArgs { filters })?;
    api.cached(key, "get_products", args).await
}

/// # Errors
///
/// Returns the backend's error message.
pub async fn get<I: Invoker + 'static>(api: &Api<I>, id: ProductId) -> Result<Product, InvokeError> {
    let key = format!("{}id:{id}", keys::PRODUCTS);
    api.cached(key, "get_product", json!({ "idProduct": id })).await
}

/// # Errors
///
/// Returns the backend's error message, e.g. a duplicate barcode.
pub async fn create<I: Invoker + 'static>(
    api: &Api<I>,
    product: &NewProduct,
) -> Result<Product, InvokeError> {
    api.mutate(
        "create_product",
        json!({ "productData": product }),
        keys::PRODUCTS,
    )
    .await
}

/// # Errors
///
/// Returns the backend's error message.
pub async fn update<I: Invoker + 'static>(
    api: &Api<I>,
    id: ProductId,
    changes: &UpdateProduct,
) -> Result<Product, InvokeError> {
    api.mutate(
        "update_product",
        json!({ "idProduct": id, "updateData": changes }),
        keys::PRODUCTS,
    )
    .await
}

/// # Errors
///
/// Returns the backend's error message.
pub async fn delete<I: Invoker + 'static>(
    api: &Api<I>,
    id: ProductId,
) -> Result<Product, InvokeError> {
    api.mutate("delete_product", json!({ "idProduct": id }), keys::PRODUCTS)
        .await
}
