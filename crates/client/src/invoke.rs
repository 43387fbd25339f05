//! The invoke interface.
//!
//! Every backend operation is a named command taking a JSON argument object.
//! Failures come back as a plain-text message, which is what callers record
//! and show.

use std::future::Future;
use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use url::Url;

/// Errors from a remote call.
#[derive(Debug, Error)]
pub enum InvokeError {
    /// The backend rejected the command. Holds its message verbatim.
    #[error("{0}")]
    Command(String),

    /// HTTP transport failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The response did not match the expected shape.
    #[error("JSON parse error: {0}")]
    Decode(#[from] serde_json::Error),

    /// The configured base URL is unusable.
    #[error("invalid backend URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// A failure shared by several waiters on the same cache key.
    #[error("{0}")]
    Shared(Arc<InvokeError>),
}

impl From<Arc<Self>> for InvokeError {
    fn from(err: Arc<Self>) -> Self {
        Arc::try_unwrap(err).unwrap_or_else(Self::Shared)
    }
}

/// Something that can run a named backend command.
pub trait Invoker: Send + Sync {
    /// Run `command` with `args` and return the raw JSON result.
    fn invoke_raw(
        &self,
        command: &str,
        args: Value,
    ) -> impl Future<Output = Result<Value, InvokeError>> + Send;

    /// Run `command` and decode the result into `T`.
    fn invoke<T: DeserializeOwned>(
        &self,
        command: &str,
        args: Value,
    ) -> impl Future<Output = Result<T, InvokeError>> + Send {
        async move {
            let value = self.invoke_raw(command, args).await?;
            Ok(serde_json::from_value(value)?)
        }
    }
}

/// [`Invoker`] over HTTP: `POST {base}/invoke/{command}`.
///
/// The session cookie is kept in the client's cookie store, so one
/// `HttpInvoker` is one signed-in terminal.
#[derive(Debug, Clone)]
pub struct HttpInvoker {
    client: reqwest::Client,
    base: Url,
}

impl HttpInvoker {
    /// Create an invoker for the backend at `base_url`.
    ///
    /// # Errors
    ///
    /// Returns `InvokeError::InvalidUrl` if `base_url` doesn't parse and
    /// `InvokeError::Http` if the HTTP client can't be built.
    pub fn new(base_url: &str) -> Result<Self, InvokeError> {
        let mut base = Url::parse(base_url)?;
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        let client = reqwest::Client::builder().cookie_store(true).build()?;
        Ok(Self { client, base })
    }

    /// The URL a command is posted to.
    ///
    /// # Errors
    ///
    /// Returns `InvokeError::InvalidUrl` for a command that isn't a path segment.
    pub fn command_url(&self, command: &str) -> Result<Url, InvokeError> {
        Ok(self.base.join(&format!("invoke/{command}"))?)
    }
}

impl Invoker for HttpInvoker {
    async fn invoke_raw(&self, command: &str, args: Value) -> Result<Value, InvokeError> {
        let url = self.command_url(command)?;
        tracing::debug!(command, "Invoking backend command");

        let response = self.client.post(url).json(&args).send().await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            tracing::debug!(command, status = status.as_u16(), %message, "Command failed");
            return Err(InvokeError::Command(if message.is_empty() {
                status.to_string()
            } else {
                message
            }));
        }

        Ok(response.json::<Value>().await?)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub(crate) mod mock {
    //! Scripted [`Invoker`] for tests.

    use std::collections::HashMap;

    use parking_lot::Mutex;

    use super::*;

    /// Returns canned results per command and records every call.
    #[derive(Default)]
    pub struct MockInvoker {
        responses: Mutex<HashMap<String, Result<Value, String>>>,
        calls: Mutex<Vec<(String, Value)>>,
    }

    impl MockInvoker {
        pub fn respond(&self, command: &str, value: Value) {
            self.responses.lock().insert(command.to_owned(), Ok(value));
        }

        pub fn fail(&self, command: &str, message: &str) {
            self.responses
                .lock()
                .insert(command.to_owned(), Err(message.to_owned()));
        }

        pub fn calls(&self) -> Vec<(String, Value)> {
            self.calls.lock().clone()
        }

        pub fn call_count(&self, command: &str) -> usize {
            self.calls.lock().iter().filter(|(c, _)| c == command).count()
        }
    }

    impl Invoker for MockInvoker {
        async fn invoke_raw(&self, command: &str, args: Value) -> Result<Value, InvokeError> {
            self.calls.lock().push((command.to_owned(), args));
            match self.responses.lock().get(command) {
                Some(Ok(value)) => Ok(value.clone()),
                Some(Err(message)) => Err(InvokeError::Command(message.clone())),
                None => Err(InvokeError::Command(format!("unknown command: {command}"))),
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_command_url_keeps_base_path() {
        let invoker = HttpInvoker::new("http://127.0.0.1:3030/pos").unwrap();
        assert_eq!(
            invoker.command_url("get_products").unwrap().as_str(),
            "http://127.0.0.1:3030/pos/invoke/get_products"
        );

        let invoker = HttpInvoker::new("http://127.0.0.1:3030").unwrap();
        assert_eq!(
            invoker.command_url("login").unwrap().as_str(),
            "http://127.0.0.1:3030/invoke/login"
        );
    }

    #[test]
    fn test_bad_base_url() {
        assert!(matches!(
            HttpInvoker::new("not a url"),
            Err(InvokeError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_shared_error_unwraps_when_unique() {
        let err = InvokeError::from(Arc::new(InvokeError::Command("Not logged in".into())));
        assert!(matches!(err, InvokeError::Command(m) if m == "Not logged in"));

        let shared = Arc::new(InvokeError::Command("boom".into()));
        let _other = Arc::clone(&shared);
        let err = InvokeError::from(shared);
        assert_eq!(err.to_string(), "boom");
        assert!(matches!(err, InvokeError::Shared(_)));
    }
}
