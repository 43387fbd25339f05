//! Caja Core - shared types for the point-of-sale workspace.
//!
//! Used by every Caja component:
//! - `server` - the backend answering `/invoke/{command}`
//! - `client` - session store, cart/checkout and remote actions
//! - `cli` - migrations, seed data and user management
//!
//! # Architecture
//!
//! The core crate holds types and pure logic only - no I/O, no database
//! access, no HTTP clients. Database bindings for the ID and email newtypes
//! are behind the `postgres` feature.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, email addresses, and money helpers
//! - [`permission`] - Permission codes and their functional grouping
//! - [`session`] - The signed-in session and the permission gate
//! - [`cart`] - Cart line items and totals
//! - [`pagination`] - Page arithmetic shared by list operations
//! - [`dto`] - Arguments and results of every remote operation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod cart;
pub mod dto;
pub mod pagination;
pub mod permission;
pub mod session;
pub mod types;

pub use cart::{Cart, CartItem, CartTotals, SalesProduct};
pub use permission::{Permission, PermissionModule, UnknownPermission};
pub use session::{PermissionGate, Session};
pub use types::*;
