//! Permission codes.
//!
//! A permission code is a dotted string token such as `sales.create`. Codes
//! travel as plain strings inside a [`Session`](crate::Session) so that a
//! backend may grant codes this build does not know about; [`Permission`]
//! names the codes the application itself checks and seeds.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Functional area a permission belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PermissionModule {
    Sales,
    Inventory,
    Reports,
    Admin,
}

impl PermissionModule {
    /// Stored value of the `permissions.module` column.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Sales => "sales",
            Self::Inventory => "inventory",
            Self::Reports => "reports",
            Self::Admin => "admin",
        }
    }
}

impl fmt::Display for PermissionModule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every permission the application checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Permission {
    SalesCreate,
    SalesView,
    SalesRefund,
    SalesCancel,
    ProductsView,
    ProductsCreate,
    ProductsEdit,
    ProductsDelete,
    CategoriesView,
    CategoriesCreate,
    CategoriesEdit,
    CategoriesDelete,
    ReportsSales,
    ReportsInventory,
    ReportsFinancial,
    UsersView,
    UsersCreate,
    UsersEdit,
    UsersDelete,
    ProfilesView,
    ProfilesManage,
}

/// Error returned when a string is not a known permission code.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown permission code: {0}")]
pub struct UnknownPermission(pub String);

impl Permission {
    /// All permissions in seed order.
    pub const ALL: [Self; 21] = [
        Self::SalesCreate,
        Self::SalesView,
        Self::SalesRefund,
        Self::SalesCancel,
        Self::ProductsView,
        Self::ProductsCreate,
        Self::ProductsEdit,
        Self::ProductsDelete,
        Self::CategoriesView,
        Self::CategoriesCreate,
        Self::CategoriesEdit,
        Self::CategoriesDelete,
        Self::ReportsSales,
        Self::ReportsInventory,
        Self::ReportsFinancial,
        Self::UsersView,
        Self::UsersCreate,
        Self::UsersEdit,
        Self::UsersDelete,
        Self::ProfilesView,
        Self::ProfilesManage,
    ];

    /// The wire code, e.g. `"sales.create"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SalesCreate => "sales.create",
            Self::SalesView => "sales.view",
            Self::SalesRefund => "sales.refund",
            Self::SalesCancel => "sales.cancel",
            Self::ProductsView => "products.view",
            Self::ProductsCreate => "products.create",
            Self::ProductsEdit => "products.edit",
            Self::ProductsDelete => "products.delete",
            Self::CategoriesView => "categories.view",
            Self::CategoriesCreate => "categories.create",
            Self::CategoriesEdit => "categories.edit",
            Self::CategoriesDelete => "categories.delete",
            Self::ReportsSales => "reports.sales",
            Self::ReportsInventory => "reports.inventory",
            Self::ReportsFinancial => "reports.financial",
            Self::UsersView => "users.view",
            Self::UsersCreate => "users.create",
            Self::UsersEdit => "users.edit",
            Self::UsersDelete => "users.delete",
            Self::ProfilesView => "profiles.view",
            Self::ProfilesManage => "profiles.manage",
        }
    }

    /// Functional area, used to group permissions in the profile editor.
    #[must_use]
    pub const fn module(self) -> PermissionModule {
        match self {
            Self::SalesCreate | Self::SalesView | Self::SalesRefund | Self::SalesCancel => {
                PermissionModule::Sales
            }
            Self::ProductsView
            | Self::ProductsCreate
            | Self::ProductsEdit
            | Self::ProductsDelete
            | Self::CategoriesView
            | Self::CategoriesCreate
            | Self::CategoriesEdit
            | Self::CategoriesDelete => PermissionModule::Inventory,
            Self::ReportsSales | Self::ReportsInventory | Self::ReportsFinancial => {
                PermissionModule::Reports
            }
            Self::UsersView
            | Self::UsersCreate
            | Self::UsersEdit
            | Self::UsersDelete
            | Self::ProfilesView
            | Self::ProfilesManage => PermissionModule::Admin,
        }
    }

    /// Short human-readable name.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::SalesCreate => "Create sales",
            Self::SalesView => "View sales",
            Self::SalesRefund => "Refund sales",
            Self::SalesCancel => "Cancel sales",
            Self::ProductsView => "View products",
            Self::ProductsCreate => "Create products",
            Self::ProductsEdit => "Edit products",
            Self::ProductsDelete => "Delete products",
            Self::CategoriesView => "View categories",
            Self::CategoriesCreate => "Create categories",
            Self::CategoriesEdit => "Edit categories",
            Self::CategoriesDelete => "Delete categories",
            Self::ReportsSales => "Sales reports",
            Self::ReportsInventory => "Inventory reports",
            Self::ReportsFinancial => "Financial reports",
            Self::UsersView => "View users",
            Self::UsersCreate => "Create users",
            Self::UsersEdit => "Edit users",
            Self::UsersDelete => "Delete users",
            Self::ProfilesView => "View profiles",
            Self::ProfilesManage => "Manage profiles",
        }
    }
}

impl fmt::Display for Permission {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Permission {
    type Err = UnknownPermission;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|p| p.as_str() == s)
            .ok_or_else(|| UnknownPermission(s.to_owned()))
    }
}

impl Serialize for Permission {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for Permission {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl AsRef<str> for Permission {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_codes_are_unique_and_parse_back() {
        let codes: HashSet<&str> = Permission::ALL.iter().map(|p| p.as_str()).collect();
        assert_eq!(codes.len(), Permission::ALL.len());

        for permission in Permission::ALL {
            assert_eq!(permission.as_str().parse::<Permission>().unwrap(), permission);
        }
    }

    #[test]
    fn test_unknown_code() {
        assert_eq!(
            "reports.view".parse::<Permission>(),
            Err(UnknownPermission("reports.view".to_owned()))
        );
    }

    #[test]
    fn test_module_grouping() {
        assert_eq!(Permission::SalesRefund.module(), PermissionModule::Sales);
        assert_eq!(Permission::CategoriesEdit.module(), PermissionModule::Inventory);
        assert_eq!(Permission::ReportsFinancial.module(), PermissionModule::Reports);
        assert_eq!(Permission::ProfilesManage.module(), PermissionModule::Admin);
    }

    #[test]
    fn test_serde_uses_wire_code() {
        let json = serde_json::to_string(&Permission::UsersEdit).unwrap();
        assert_eq!(json, "\"users.edit\"");
        let parsed: Permission = serde_json::from_str("\"sales.view\"").unwrap();
        assert_eq!(parsed, Permission::SalesView);
    }
}
