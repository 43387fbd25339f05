//! HTTP middleware.
//!
//! - `auth` - Session and permission guards for invoke handlers
//! - `rate_limit` - Per-IP limit on `login`
//! - `session` - Signed `PostgreSQL`-backed sessions

pub mod auth;
pub mod rate_limit;
pub mod session;

pub use auth::{
    RequireSession, clear_current_session, current_session, require_permission,
    set_current_session,
};
pub use rate_limit::{ClientIpKeyExtractor, login_rate_limiter};
pub use session::{PgSessionLayer, create_session_layer, session_layer};
