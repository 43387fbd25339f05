//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Password login and staff account management
//! - `reports` - Report assembly on top of the aggregate queries
//! - `sales` - Transactional sale recording

pub mod auth;
pub mod reports;
pub mod sales;

pub use auth::{AuthError, AuthService};
pub use reports::{ReportError, ReportService};
pub use sales::{SaleError, SalesService};
