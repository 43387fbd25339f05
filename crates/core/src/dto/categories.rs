//! Category DTOs.

use serde::{Deserialize, Serialize};

use crate::types::CategoryId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: CategoryId,
    pub name: String,
    pub is_active: bool,
}

/// Optional status and name-substring filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryFilter {
    #[serde(default)]
    pub status: Option<bool>,
    #[serde(default)]
    pub search: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryListResponse {
    pub categories: Vec<Category>,
    pub total: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewCategory {
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpdateCategory {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// Arguments of `get_all_categories`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GetCategoriesArgs {
    #[serde(default)]
    pub filters: CategoryFilter,
}

/// Arguments of the single-category operations.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct CategoryIdArgs {
    pub id: CategoryId,
}

/// Arguments of `create_category`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateCategoryArgs {
    pub category_data: NewCategory,
}

/// Arguments of `update_category`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCategoryArgs {
    pub id: CategoryId,
    pub update_data: UpdateCategory,
}
