//! Login, session and logout against a running server.
//!
//! These tests require:
//! - A migrated and seeded `PostgreSQL` database
//! - The server running (cargo run -p caja-server)

#![allow(clippy::unwrap_used)]

use caja_client::{AuthStore, Invoker};
use caja_core::dto::auth::LoginData;
use caja_core::{Permission, Session};
use caja_integration_tests::{admin, admin_credentials, base_url, invoker};
use serde_json::json;

#[tokio::test]
#[ignore = "Requires running server"]
async fn test_health() {
    let resp = reqwest::get(format!("{}/health", base_url()))
        .await
        .unwrap();
    assert!(resp.status().is_success());
    assert_eq!(resp.text().await.unwrap(), "ok");

    let ready = reqwest::get(format!("{}/health/ready", base_url()))
        .await
        .unwrap();
    assert!(ready.status().is_success());
}

#[tokio::test]
#[ignore = "Requires running server and database"]
async fn test_get_session_without_login() {
    let invoker = invoker();
    let err = invoker
        .invoke::<Session>("get_session", json!({}))
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Not logged in");

    let auth = AuthStore::new(invoker);
    assert!(!auth.check_auth().await);
    assert!(auth.error().is_none());
}

#[tokio::test]
#[ignore = "Requires running server and seeded database"]
async fn test_bad_password_is_generic() {
    let auth = AuthStore::new(invoker());
    let err = auth
        .login(LoginData {
            username: admin_credentials().username,
            password: "definitely-wrong".to_owned(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.to_string(), "Invalid username or password");
    assert!(!auth.is_authenticated());
    assert_eq!(auth.error().as_deref(), Some("Invalid username or password"));

    let unknown = auth
        .login(LoginData {
            username: "no-such-user".to_owned(),
            password: "definitely-wrong".to_owned(),
        })
        .await
        .unwrap_err();
    assert_eq!(unknown.to_string(), err.to_string());
}

#[tokio::test]
#[ignore = "Requires running server and seeded database"]
async fn test_login_session_logout() {
    let (auth, api) = admin().await;
    let session = auth.session().unwrap();
    assert!(session.grants(Permission::UsersCreate));
    assert!(auth.has_all_permissions(&["sales.create", "reports.financial"]));

    let remote: Session = api.invoker().invoke("get_session", json!({})).await.unwrap();
    assert_eq!(remote.user_id, session.user_id);

    let again = auth.login(admin_credentials()).await.unwrap_err();
    assert_eq!(again.to_string(), "Already logged in");

    auth.logout().await.unwrap();
    assert!(!auth.is_authenticated());
    assert!(!auth.check_auth().await);

    let err = auth.logout().await.unwrap_err();
    assert_eq!(err.to_string(), "Not logged in");
}

#[tokio::test]
#[ignore = "Requires running server and seeded database"]
async fn test_sessions_are_per_client() {
    let (first, _) = admin().await;
    let second = AuthStore::new(invoker());
    assert!(first.check_auth().await);
    assert!(!second.check_auth().await);
}
