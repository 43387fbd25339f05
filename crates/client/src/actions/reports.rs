//! Report actions and the catalogue shown on the reports screen.
//!
//! Reports are computed over live data and are never cached.

use serde_json::json;

use caja_core::dto::reports::{
    CategoryReportParams, CategoryReportResult, DashboardParams, DashboardResult,
    PaymentMethodReportParams, PaymentMethodReportResult, ProductReportParams,
    ProductReportResult, RefundsReportParams, RefundsReportResult, SalesOverTimeParams,
    SalesOverTimeResult,
};
use caja_core::{Permission, PermissionGate};

use super::Api;
use crate::invoke::{InvokeError, Invoker};

/// One entry of the report catalogue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportDefinition {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    /// Permission the backend requires for this report.
    pub permission: Permission,
    pub command: &'static str,
}

const CATALOGUE: [ReportDefinition; 6] = [
    ReportDefinition {
        id: "dashboard",
        name: "Dashboard Ejecutivo",
        description: "Vista resumida del estado del negocio con ventas, reembolsos y ticket promedio",
        permission: Permission::ReportsSales,
        command: "get_dashboard_report",
    },
    ReportDefinition {
        id: "sales-over-time",
        name: "Ventas en el Tiempo",
        description: "Tendencias y estacionalidad de ventas agrupadas por día, semana o mes",
        permission: Permission::ReportsSales,
        command: "get_sales_over_time_report",
    },
    ReportDefinition {
        id: "products",
        name: "Reporte por Producto",
        description: "Detalle de productos vendidos, reembolsados y su participación en ingresos",
        permission: Permission::ReportsInventory,
        command: "get_product_report",
    },
    ReportDefinition {
        id: "categories",
        name: "Reporte por Categoría",
        description: "Análisis de desempeño por línea de producto con ventas y porcentajes",
        permission: Permission::ReportsSales,
        command: "get_category_report",
    },
    ReportDefinition {
        id: "payment-methods",
        name: "Métodos de Pago",
        description: "Conciliación financiera y distribución de pagos por método",
        permission: Permission::ReportsFinancial,
        command: "get_payment_method_report",
    },
    ReportDefinition {
        id: "refunds",
        name: "Reporte de Reembolsos",
        description: "Análisis de devoluciones, productos más reembolsados y tendencias",
        permission: Permission::ReportsFinancial,
        command: "get_refunds_report",
    },
];

/// Every report, in display order.
#[must_use]
pub const fn available() -> &'static [ReportDefinition] {
    &CATALOGUE
}

#[must_use]
pub fn by_id(id: &str) -> Option<&'static ReportDefinition> {
    CATALOGUE.iter().find(|r| r.id == id)
}

/// The reports `gate` may open.
pub fn available_for<G: PermissionGate>(gate: &G) -> impl Iterator<Item = &'static ReportDefinition> {
    CATALOGUE
        .iter()
        .filter(move |r| gate.has_permission(r.permission.as_str()))
}

/// # Errors
///
/// Returns the backend's error message, e.g. an inverted date range.
pub async fn dashboard<I: Invoker + 'static>(
    api: &Api<I>,
    params: &DashboardParams,
) -> Result<DashboardResult, InvokeError> {
    api.call("get_dashboard_report", json!({ "params": params }))
        .await
}

/// # Errors
///
/// Returns the backend's error message.
pub async fn sales_over_time<I: Invoker + 'static>(
    api: &Api<I>,
    params: &SalesOverTimeParams,
) -> Result<SalesOverTimeResult, InvokeError> {
    api.call("get_sales_over_time_report", json!({ "params": params }))
        .await
}

/// # Errors
///
/// Returns the backend's error message.
pub async fn product<I: Invoker + 'static>(
    api: &Api<I>,
    params: &ProductReportParams,
) -> Result<ProductReportResult, InvokeError> {
    api.call("get_product_report", json!({ "params": params }))
        .await
}

/// # Errors
///
/// Returns the backend's error message.
pub async fn category<I: Invoker + 'static>(
    api: &Api<I>,
    params: &CategoryReportParams,
) -> Result<CategoryReportResult, InvokeError> {
    api.call("get_category_report", json!({ "params": params }))
        .await
}

/// # Errors
///
/// Returns the backend's error message.
pub async fn payment_method<I: Invoker + 'static>(
    api: &Api<I>,
    params: &PaymentMethodReportParams,
) -> Result<PaymentMethodReportResult, InvokeError> {
    api.call("get_payment_method_report", json!({ "params": params }))
        .await
}

/// # Errors
///
/// Returns the backend's error message.
pub async fn refunds<I: Invoker + 'static>(
    api: &Api<I>,
    params: &RefundsReportParams,
) -> Result<RefundsReportResult, InvokeError> {
    api.call("get_refunds_report", json!({ "params": params }))
        .await
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use caja_core::dto::reports::{DateRange, TimeGrouping};
    use caja_core::{Email, ProfileId, Session, UserId};

    use crate::invoke::mock::MockInvoker;

    use super::*;

    fn range() -> DateRange {
        DateRange::new(
            NaiveDate::from_ymd_opt(2026, 1, 1).unwrap(),
            NaiveDate::from_ymd_opt(2026, 1, 31).unwrap(),
        )
    }

    fn session(permissions: &[&str]) -> Session {
        Session {
            user_id: UserId::new("u-1"),
            username: "gerente".to_owned(),
            profile_id: ProfileId::new(3),
            profile_name: "Manager".to_owned(),
            email: Email::parse("gerente@tienda.mx").unwrap(),
            permissions: permissions.iter().map(|&p| p.to_owned()).collect(),
        }
    }

    #[test]
    fn test_catalogue_lookup() {
        assert_eq!(available().len(), 6);
        assert_eq!(by_id("refunds").unwrap().command, "get_refunds_report");
        assert!(by_id("inventory").is_none());
    }

    #[test]
    fn test_available_for_filters_by_permission() {
        let sales_only = session(&["reports.sales"]);
        let ids: Vec<&str> = available_for(&sales_only).map(|r| r.id).collect();
        assert_eq!(ids, ["dashboard", "sales-over-time", "categories"]);

        let nobody: Option<Session> = None;
        assert_eq!(available_for(&nobody).count(), 0);
    }

    #[tokio::test]
    async fn test_sales_over_time_args() {
        let invoker = Arc::new(MockInvoker::default());
        invoker.respond(
            "get_sales_over_time_report",
            json!({
                "items": [{ "period": "2026-01", "net_sales": "150.00", "sales_count": 3, "average_ticket": "50.00" }],
                "total_net_sales": "150.00",
                "total_sales_count": 3,
                "total_average_ticket": "50.00"
            }),
        );
        let api = Api::new(Arc::clone(&invoker));

        let params = SalesOverTimeParams {
            range: range(),
            grouping: TimeGrouping::Month,
        };
        let result = sales_over_time(&api, &params).await.unwrap();
        assert_eq!(result.items[0].period, "2026-01");
        assert_eq!(result.total_average_ticket, Decimal::new(5000, 2));

        let (_, args) = &invoker.calls()[0];
        assert_eq!(
            args,
            &json!({ "params": { "date_from": "2026-01-01", "date_to": "2026-01-31", "grouping": "month" } })
        );
    }

    #[tokio::test]
    async fn test_reports_bypass_cache() {
        let invoker = Arc::new(MockInvoker::default());
        invoker.respond(
            "get_category_report",
            json!({ "items": [], "total_net_sales": "0", "total_quantity_sold": 0 }),
        );
        let api = Api::new(Arc::clone(&invoker));
        let params = CategoryReportParams { range: range() };

        category(&api, &params).await.unwrap();
        category(&api, &params).await.unwrap();
        assert_eq!(invoker.call_count("get_category_report"), 2);
    }
}
