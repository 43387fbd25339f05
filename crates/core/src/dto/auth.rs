//! Login arguments.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Credentials submitted from the login form.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginData {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for LoginData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginData")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Arguments of `login`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginArgs {
    pub user_data: LoginData,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_redacts_password() {
        let data = LoginData {
            username: "admin".to_owned(),
            password: "hunter2-but-longer".to_owned(),
        };
        let debug = format!("{data:?}");
        assert!(debug.contains("admin"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_args_use_camel_case_key() {
        let args = LoginArgs {
            user_data: LoginData {
                username: "admin".to_owned(),
                password: "x".to_owned(),
            },
        };
        let json = serde_json::to_value(&args).unwrap();
        assert_eq!(json["userData"]["username"], "admin");
    }
}
