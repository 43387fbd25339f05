//! Core value types for Caja.
//!
//! Type-safe wrappers for identifiers, email addresses, and money.

pub mod email;
pub mod id;
pub mod money;

pub use email::{Email, EmailError};
pub use id::*;
pub use money::{format_money, percent_to_rate, rate_to_percent, round_cents};
