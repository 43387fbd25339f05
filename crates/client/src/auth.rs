//! Client-side session store.
//!
//! Holds the signed-in [`Session`] for one terminal. The session is swapped
//! atomically, so readers see either the previous session or the new one.
//! Loading and error state live behind a separate lock.
//!
//! A store built with [`AuthStore::with_cache`] clears the shared read cache
//! whenever the signed-in user changes.

use std::sync::Arc;

use arc_swap::ArcSwapOption;
use parking_lot::Mutex;
use serde_json::{Value, json};

use caja_core::PermissionGate;
use caja_core::Session;
use caja_core::dto::auth::{LoginArgs, LoginData};

use crate::cache::SwrCache;
use crate::invoke::{InvokeError, Invoker};

#[derive(Debug, Default)]
struct Status {
    is_loading: bool,
    error: Option<String>,
}

/// Authentication state for one terminal.
pub struct AuthStore<I> {
    invoker: Arc<I>,
    session: ArcSwapOption<Session>,
    status: Mutex<Status>,
    cache: Option<SwrCache<Value>>,
}

impl<I: Invoker> AuthStore<I> {
    #[must_use]
    pub fn new(invoker: Arc<I>) -> Self {
        Self {
            invoker,
            session: ArcSwapOption::empty(),
            status: Mutex::new(Status::default()),
            cache: None,
        }
    }

    /// Store that clears `cache` on sign-out and when another user signs in.
    ///
    /// Pass the cache of the [`Api`](crate::Api) the UI reads through.
    #[must_use]
    pub fn with_cache(invoker: Arc<I>, cache: SwrCache<Value>) -> Self {
        Self {
            cache: Some(cache),
            ..Self::new(invoker)
        }
    }

    /// The signed-in session, if any.
    #[must_use]
    pub fn session(&self) -> Option<Arc<Session>> {
        self.session.load_full()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.session.load().is_some()
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.status.lock().is_loading
    }

    /// Message of the last failed login or logout.
    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.status.lock().error.clone()
    }

    pub fn clear_error(&self) {
        self.status.lock().error = None;
    }

    /// Sign in.
    ///
    /// On failure the store is left signed out with the error recorded.
    ///
    /// # Errors
    ///
    /// Returns the backend's error, e.g. invalid credentials.
    pub async fn login(&self, credentials: LoginData) -> Result<Arc<Session>, InvokeError> {
        self.begin();
        let args = LoginArgs {
            user_data: credentials,
        };
        let result = match serde_json::to_value(&args) {
            Ok(args) => self.invoker.invoke::<Session>("login", args).await,
            Err(e) => Err(e.into()),
        };

        match result {
            Ok(session) => {
                let session = Arc::new(session);
                self.replace_session(Some(Arc::clone(&session)));
                self.finish(None);
                tracing::info!(username = %session.username, "Signed in");
                Ok(session)
            }
            Err(e) => {
                self.replace_session(None);
                self.finish(Some(e.to_string()));
                Err(e)
            }
        }
    }

    /// Sign out.
    ///
    /// On failure the session is kept and the error recorded.
    ///
    /// # Errors
    ///
    /// Returns the backend's error.
    pub async fn logout(&self) -> Result<(), InvokeError> {
        self.begin();
        match self.invoker.invoke::<()>("logout", json!({})).await {
            Ok(()) => {
                self.replace_session(None);
                self.finish(None);
                Ok(())
            }
            Err(e) => {
                self.finish(Some(e.to_string()));
                Err(e)
            }
        }
    }

    /// Restore the session from the backend cookie.
    ///
    /// Always leaves the store with no error: a failure just means nobody is
    /// signed in.
    pub async fn check_auth(&self) -> bool {
        self.begin();
        let session = self
            .invoker
            .invoke::<Session>("get_session", json!({}))
            .await
            .inspect_err(|e| tracing::debug!(error = %e, "No backend session"))
            .ok();

        let authenticated = session.is_some();
        self.replace_session(session.map(Arc::new));
        self.finish(None);
        authenticated
    }

    #[must_use]
    pub fn has_permission(&self, code: &str) -> bool {
        self.session.load().as_deref().has_permission(code)
    }

    #[must_use]
    pub fn has_any_permission(&self, codes: &[&str]) -> bool {
        self.session.load().as_deref().has_any_permission(codes)
    }

    #[must_use]
    pub fn has_all_permissions(&self, codes: &[&str]) -> bool {
        self.session.load().as_deref().has_all_permissions(codes)
    }

    /// Swap in `next`, clearing the cache if the user changed.
    fn replace_session(&self, next: Option<Arc<Session>>) {
        let previous = self.session.swap(next.clone());
        let same_user = match (previous.as_deref(), next.as_deref()) {
            (Some(a), Some(b)) => a.user_id == b.user_id,
            (None, None) => true,
            _ => false,
        };
        if let Some(cache) = self.cache.as_ref().filter(|_| !same_user) {
            cache.clear();
        }
    }

    fn begin(&self) {
        self.status.lock().is_loading = true;
    }

    fn finish(&self, error: Option<String>) {
        let mut status = self.status.lock();
        status.is_loading = false;
        status.error = error;
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::invoke::mock::MockInvoker;

    use super::*;

    fn session_json() -> Value {
        json!({
            "user_id": "7d0c6a1e-2f7c-4a0f-9a53-0d9f3c1b2a11",
            "username": "cajero1",
            "profile_id": 2,
            "profile_name": "Cashier",
            "email": "cajero1@tienda.mx",
            "permissions": ["sales.create", "sales.view"]
        })
    }

    fn credentials() -> LoginData {
        LoginData {
            username: "cajero1".to_owned(),
            password: "correct-horse".to_owned(),
        }
    }

    #[tokio::test]
    async fn test_login_success_stores_session() {
        let invoker = Arc::new(MockInvoker::default());
        invoker.respond("login", session_json());
        let store = AuthStore::new(Arc::clone(&invoker));

        let session = store.login(credentials()).await.unwrap();
        assert_eq!(session.username, "cajero1");
        assert!(store.is_authenticated());
        assert!(!store.is_loading());
        assert_eq!(store.error(), None);
        assert!(store.has_permission("sales.create"));
        assert!(!store.has_permission("users.view"));

        let (command, args) = &invoker.calls()[0];
        assert_eq!(command, "login");
        assert_eq!(args["userData"]["username"], "cajero1");
        assert_eq!(args["userData"]["password"], "correct-horse");
    }

    #[tokio::test]
    async fn test_login_failure_clears_session_and_records_error() {
        let invoker = Arc::new(MockInvoker::default());
        invoker.respond("login", session_json());
        let store = AuthStore::new(Arc::clone(&invoker));
        store.login(credentials()).await.unwrap();

        invoker.fail("login", "Invalid username or password");
        let err = store.login(credentials()).await.unwrap_err();
        assert_eq!(err.to_string(), "Invalid username or password");
        assert!(!store.is_authenticated());
        assert_eq!(store.error().as_deref(), Some("Invalid username or password"));

        store.clear_error();
        assert_eq!(store.error(), None);
    }

    #[tokio::test]
    async fn test_logout_failure_keeps_session() {
        let invoker = Arc::new(MockInvoker::default());
        invoker.respond("login", session_json());
        invoker.fail("logout", "Internal server error");
        let store = AuthStore::new(Arc::clone(&invoker));
        store.login(credentials()).await.unwrap();

        assert!(store.logout().await.is_err());
        assert!(store.is_authenticated());
        assert_eq!(store.error().as_deref(), Some("Internal server error"));

        invoker.respond("logout", Value::Null);
        store.logout().await.unwrap();
        assert!(!store.is_authenticated());
        assert_eq!(store.error(), None);
    }

    #[tokio::test]
    async fn test_check_auth_failure_records_no_error() {
        let invoker = Arc::new(MockInvoker::default());
        invoker.fail("get_session", "Not logged in");
        let store = AuthStore::new(Arc::clone(&invoker));

        assert!(!store.check_auth().await);
        assert!(!store.is_authenticated());
        assert_eq!(store.error(), None);
        assert!(!store.is_loading());

        invoker.respond("get_session", session_json());
        assert!(store.check_auth().await);
        assert_eq!(store.session().unwrap().profile_name, "Cashier");
    }

    #[tokio::test]
    async fn test_check_auth_clears_earlier_login_error() {
        let invoker = Arc::new(MockInvoker::default());
        invoker.fail("login", "Invalid username or password");
        invoker.fail("get_session", "Not logged in");
        let store = AuthStore::new(Arc::clone(&invoker));

        assert!(store.login(credentials()).await.is_err());
        assert_eq!(store.error().as_deref(), Some("Invalid username or password"));

        assert!(!store.check_auth().await);
        assert_eq!(store.error(), None);
        assert!(!store.is_loading());
    }

    #[tokio::test]
    async fn test_cache_cleared_only_when_user_changes() {
        let invoker = Arc::new(MockInvoker::default());
        invoker.respond("login", session_json());
        invoker.respond("get_session", session_json());
        let cache = SwrCache::<Value>::new();
        let store = AuthStore::with_cache(Arc::clone(&invoker), cache.clone());
        store.login(credentials()).await.unwrap();

        let warm = |key: &'static str| {
            let cache = cache.clone();
            async move {
                cache
                    .get_or_fetch(key.to_owned(), || async { Ok::<_, String>(json!([])) })
                    .await
                    .unwrap();
            }
        };

        warm("products:all").await;
        assert!(store.check_auth().await);
        assert!(cache.contains("products:all"));

        let mut other = session_json();
        other["user_id"] = json!("0b5e8f2a-9c1d-4e3f-8a7b-6c5d4e3f2a10");
        other["username"] = json!("admin");
        invoker.respond("login", other);
        store.login(credentials()).await.unwrap();
        assert!(!cache.contains("products:all"));

        warm("users:list").await;
        invoker.fail("get_session", "Not logged in");
        assert!(!store.check_auth().await);
        assert!(!cache.contains("users:list"));
    }

    #[tokio::test]
    async fn test_signed_out_gate_denies() {
        let store = AuthStore::new(Arc::new(MockInvoker::default()));
        assert!(!store.has_permission("sales.view"));
        assert!(!store.has_any_permission(&["sales.view"]));
        assert!(!store.has_all_permissions(&[]));
    }
}
