//! Caja Client - the client side of the point-of-sale.
//!
//! Everything the UI layer needs except rendering:
//!
//! - [`invoke`] - the [`Invoker`] seam and its HTTP implementation
//! - [`auth`] - the session store with permission gates
//! - [`checkout`] - the payment step that turns a cart into a sale request
//! - [`cache`] - stale-while-revalidate cache for catalogue reads
//! - [`actions`] - one function per backend command
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use caja_client::{Api, AuthStore, HttpInvoker, actions};
//!
//! let invoker = Arc::new(HttpInvoker::new("http://127.0.0.1:3030")?);
//! let api = Api::new(Arc::clone(&invoker));
//! let auth = AuthStore::with_cache(invoker, api.cache().clone());
//! auth.login(LoginData { username, password }).await?;
//!
//! let page = actions::products::list(&api, None, None, None).await?;
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod actions;
pub mod auth;
pub mod cache;
pub mod checkout;
pub mod invoke;

pub use actions::Api;
pub use auth::AuthStore;
pub use cache::SwrCache;
pub use checkout::{Checkout, CheckoutError, PaymentKind};
pub use invoke::{HttpInvoker, InvokeError, Invoker};
