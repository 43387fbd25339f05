//! Wire types for the invoke interface.
//!
//! Each remote operation takes a JSON object of named arguments and returns
//! a JSON result. The `*Args` structs are those argument objects; argument
//! names are camelCase (`idProduct`, `updateData`), while the payloads they
//! carry use snake_case fields.

pub mod auth;
pub mod categories;
pub mod products;
pub mod reports;
pub mod sales;
pub mod users;
