//! Session-stored authentication state.
//!
//! The signed-in [`caja_core::Session`] is stored whole under
//! [`keys::CURRENT_SESSION`]; its presence is what "logged in" means.

/// Session keys for authentication data.
pub mod keys {
    /// Key for storing the current signed-in session.
    pub const CURRENT_SESSION: &str = "current_session";
}
