//! One function per backend command.
//!
//! Reads of catalogue data go through the [`SwrCache`]; mutations call the
//! backend and then invalidate the cache prefix they affect.

pub mod categories;
pub mod products;
pub mod reports;
pub mod sales;
pub mod users;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::cache::SwrCache;
use crate::invoke::{InvokeError, Invoker};

/// Cache key prefixes, one per cached resource.
pub(crate) mod keys {
    pub const PRODUCTS: &str = "products:";
    pub const CATEGORIES: &str = "categories:";
    pub const USERS: &str = "users:";
    pub const PROFILES: &str = "profiles:";
    pub const PAYMENT_METHODS: &str = "payment_methods:";
}

/// Backend handle shared by the action functions.
pub struct Api<I> {
    invoker: Arc<I>,
    cache: SwrCache<Value>,
}

impl<I> Api<I>
where
    I: Invoker + 'static,
{
    #[must_use]
    pub fn new(invoker: Arc<I>) -> Self {
        Self::with_cache(invoker, SwrCache::new())
    }

    #[must_use]
    pub const fn with_cache(invoker: Arc<I>, cache: SwrCache<Value>) -> Self {
        Self { invoker, cache }
    }

    #[must_use]
    pub fn invoker(&self) -> &Arc<I> {
        &self.invoker
    }

    #[must_use]
    pub const fn cache(&self) -> &SwrCache<Value> {
        &self.cache
    }

    /// Uncached call.
    pub(crate) async fn call<T: DeserializeOwned>(
        &self,
        command: &str,
        args: Value,
    ) -> Result<T, InvokeError> {
        self.invoker.invoke(command, args).await
    }

    /// Call through the cache under `key`.
    pub(crate) async fn cached<T: DeserializeOwned>(
        &self,
        key: String,
        command: &'static str,
        args: Value,
    ) -> Result<T, InvokeError> {
        let invoker = Arc::clone(&self.invoker);
        let value = self
            .cache
            .get_or_fetch(key, move || async move { invoker.invoke_raw(command, args).await })
            .await?;
        Ok(serde_json::from_value(value)?)
    }

    /// Call, then drop every cached entry under `prefix` on success.
    pub(crate) async fn mutate<T: DeserializeOwned>(
        &self,
        command: &str,
        args: Value,
        prefix: &str,
    ) -> Result<T, InvokeError> {
        let result = self.call(command, args).await?;
        self.cache.invalidate_prefix(prefix).await;
        Ok(result)
    }
}
