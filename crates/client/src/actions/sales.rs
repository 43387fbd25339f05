//! Sale actions.

use serde_json::json;

use caja_core::dto::sales::{
    CreateSaleRequest, CreateSaleResponse, PaymentMethod, SaleFilter, SaleListResponse,
};

use super::{Api, keys};
use crate::invoke::{InvokeError, Invoker};

/// Record a sale. Stock changes, so cached product pages are dropped.
///
/// # Errors
///
/// Returns the backend's error message, e.g. insufficient stock.
pub async fn create<I: Invoker + 'static>(
    api: &Api<I>,
    request: &CreateSaleRequest,
) -> Result<CreateSaleResponse, InvokeError> {
    api.mutate("create_sale", json!({ "request": request }), keys::PRODUCTS)
        .await
}

/// `get_sales`. Sale history is never cached.
///
/// # Errors
///
/// Returns the backend's error message.
pub async fn list<I: Invoker + 'static>(
    api: &Api<I>,
    filters: &SaleFilter,
) -> Result<SaleListResponse, InvokeError> {
    api.call("get_sales", json!({ "filters": filters })).await
}

/// Active payment methods.
///
/// # Errors
///
/// Returns the backend's error message.
pub async fn payment_methods<I: Invoker + 'static>(
    api: &Api<I>,
) -> Result<Vec<PaymentMethod>, InvokeError> {
    let key = format!("{}active", keys::PAYMENT_METHODS);
    api.cached(key, "get_payment_methods", json!({})).await
}
