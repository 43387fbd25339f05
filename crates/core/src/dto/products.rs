//! Product catalogue DTOs.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{CategoryId, ProductId};

/// A product as returned by the backend.
///
/// `tax` is a percentage (`16` for 16%).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category_id: Option<CategoryId>,
    pub category_name: Option<String>,
    pub code: String,
    pub stock: i32,
    pub is_active: bool,
    pub price: Decimal,
    pub cost: Decimal,
    pub tax: Decimal,
}

/// Fields for a new product. `tax` is a percentage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewProduct {
    pub name: String,
    pub category_id: Option<CategoryId>,
    pub code: String,
    pub stock: i32,
    pub price: Decimal,
    pub cost: Decimal,
    pub tax: Decimal,
}

/// Partial update; `None` leaves a field unchanged. `tax` is a percentage.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateProduct {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stock: Option<i32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost: Option<Decimal>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tax: Option<Decimal>,
}

/// Listing filter: one page of active or inactive products.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductFilter {
    pub status: bool,
    pub page: u64,
    pub limit: u64,
}

impl Default for ProductFilter {
    fn default() -> Self {
        Self {
            status: true,
            page: 1,
            limit: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductListResponse {
    pub products: Vec<Product>,
    pub total_pages: u64,
    pub total_items: u64,
}

/// Arguments of `get_products`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetProductsArgs {
    pub filters: ProductFilter,
}

/// Arguments of `create_product`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductArgs {
    pub product_data: NewProduct,
}

/// Arguments of `update_product`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProductArgs {
    pub id_product: ProductId,
    pub update_data: UpdateProduct,
}

/// Arguments of `delete_product`.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductIdArgs {
    pub id_product: ProductId,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_update_omits_unset_fields() {
        let update = UpdateProduct {
            stock: Some(12),
            ..UpdateProduct::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({ "stock": 12 }));

        let parsed: UpdateProduct = serde_json::from_str(r#"{"price":"19.90"}"#).unwrap();
        assert_eq!(parsed.price, Some(Decimal::new(1990, 2)));
        assert_eq!(parsed.name, None);
    }

    #[test]
    fn test_update_args_keys() {
        let args = UpdateProductArgs {
            id_product: ProductId::new(3),
            update_data: UpdateProduct::default(),
        };
        let json = serde_json::to_value(&args).unwrap();
        assert_eq!(json["idProduct"], 3);
        assert!(json["updateData"].is_object());
    }
}
