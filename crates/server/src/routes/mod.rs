//! HTTP route handlers.
//!
//! # Route Structure
//!
//! Every command is `POST /invoke/{command}` with a JSON argument object.
//! Failures are a status code plus a plain-text message.
//!
//! ```text
//! GET  /health                              - Liveness
//! GET  /health/ready                        - Database reachable
//!
//! # Session
//! POST /invoke/login                        - {userData:{username,password}}
//! POST /invoke/logout
//! POST /invoke/get_session
//!
//! # Products
//! POST /invoke/get_products                 - {filters:{status,page,limit}}
//! POST /invoke/get_product                  - {idProduct}
//! POST /invoke/create_product               - {productData}
//! POST /invoke/update_product               - {idProduct,updateData}
//! POST /invoke/delete_product               - {idProduct}
//!
//! # Categories
//! POST /invoke/get_all_categories           - {filters:{status?,search?}}
//! POST /invoke/get_category_by_id           - {id}
//! POST /invoke/create_category              - {categoryData}
//! POST /invoke/update_category              - {id,updateData}
//! POST /invoke/delete_category              - {id} (soft)
//! POST /invoke/hard_delete_category         - {id}
//!
//! # Users
//! POST /invoke/get_users                    - {filters:{status?,page,limit}}
//! POST /invoke/get_user                     - {userId}
//! POST /invoke/create_user                  - {userData}
//! POST /invoke/update_user                  - {userId,updateData}
//! POST /invoke/toggle_user_status           - {userId}
//! POST /invoke/get_profiles
//!
//! # Sales
//! POST /invoke/get_sales                    - {filters}
//! POST /invoke/get_payment_methods
//! POST /invoke/create_sale                  - {request}
//!
//! # Reports
//! POST /invoke/get_dashboard_report         - {params}
//! POST /invoke/get_sales_over_time_report   - {params}
//! POST /invoke/get_product_report           - {params}
//! POST /invoke/get_category_report          - {params}
//! POST /invoke/get_payment_method_report    - {params}
//! POST /invoke/get_refunds_report           - {params}
//! ```

pub mod auth;
pub mod categories;
pub mod products;
pub mod reports;
pub mod sales;
pub mod users;

use axum::{Router, extract::State, http::StatusCode, routing::get};

use crate::state::AppState;

/// Build the complete router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .merge(auth::router())
        .merge(products::router())
        .merge(categories::router())
        .merge(users::router())
        .merge(sales::router())
        .merge(reports::router())
}

/// Liveness probe.
pub async fn health() -> &'static str {
    "ok"
}

/// Readiness probe: the database answers.
pub async fn readiness(State(state): State<AppState>) -> Result<&'static str, StatusCode> {
    sqlx::query("SELECT 1")
        .execute(state.pool())
        .await
        .map(|_| "ready")
        .map_err(|e| {
            tracing::warn!(error = %e, "Readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        })
}
