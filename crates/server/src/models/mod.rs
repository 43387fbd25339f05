//! Types stored outside the database schema.

pub mod session;

pub use session::keys as session_keys;
