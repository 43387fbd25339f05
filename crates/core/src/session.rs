//! Authenticated session and the permission gate.
//!
//! Every permission check is a set-membership test against the session's
//! permission codes. With no session the answer is always `false`, so UI
//! gates and route guards can be written against `Option<Session>` without
//! special-casing the signed-out state.

use serde::{Deserialize, Serialize};

use crate::permission::Permission;
use crate::types::{Email, ProfileId, UserId};

/// The signed-in user's identity and granted permission codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub user_id: UserId,
    pub username: String,
    pub profile_id: ProfileId,
    pub profile_name: String,
    pub email: Email,
    pub permissions: Vec<String>,
}

impl Session {
    /// Whether the session was granted a known [`Permission`].
    #[must_use]
    pub fn grants(&self, permission: Permission) -> bool {
        self.has_permission(permission.as_str())
    }
}

/// Permission checks shared by [`Session`] and `Option<Session>`.
pub trait PermissionGate {
    /// Granted codes, or `None` when nobody is signed in.
    fn permission_codes(&self) -> Option<&[String]>;

    /// `true` iff `code` is granted.
    fn has_permission(&self, code: &str) -> bool {
        self.permission_codes()
            .is_some_and(|granted| granted.iter().any(|c| c == code))
    }

    /// `true` iff at least one of `codes` is granted.
    fn has_any_permission(&self, codes: &[&str]) -> bool {
        self.permission_codes()
            .is_some_and(|granted| codes.iter().any(|code| granted.iter().any(|c| c == code)))
    }

    /// `true` iff every one of `codes` is granted.
    ///
    /// Without a session this is `false` even for an empty list.
    fn has_all_permissions(&self, codes: &[&str]) -> bool {
        self.permission_codes()
            .is_some_and(|granted| codes.iter().all(|code| granted.iter().any(|c| c == code)))
    }
}

impl PermissionGate for Session {
    fn permission_codes(&self) -> Option<&[String]> {
        Some(&self.permissions)
    }
}

impl PermissionGate for Option<Session> {
    fn permission_codes(&self) -> Option<&[String]> {
        self.as_ref().map(|s| s.permissions.as_slice())
    }
}

impl PermissionGate for Option<&Session> {
    fn permission_codes(&self) -> Option<&[String]> {
        self.map(|s| s.permissions.as_slice())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn cashier() -> Session {
        Session {
            user_id: UserId::new("7d0c6a1e-2f7c-4a0f-9a53-0d9f3c1b2a11"),
            username: "cajero1".to_owned(),
            profile_id: ProfileId::new(2),
            profile_name: "Cashier".to_owned(),
            email: Email::parse("cajero1@tienda.mx").unwrap(),
            permissions: vec![
                "sales.create".to_owned(),
                "sales.view".to_owned(),
                "products.view".to_owned(),
                "categories.view".to_owned(),
            ],
        }
    }

    #[test]
    fn test_membership() {
        let session = cashier();
        assert!(session.has_permission("sales.create"));
        assert!(!session.has_permission("users.view"));
        assert!(session.grants(Permission::ProductsView));
        assert!(!session.grants(Permission::ProductsDelete));
    }

    #[test]
    fn test_any_and_all() {
        let session = cashier();
        assert!(session.has_any_permission(&["users.view", "sales.view"]));
        assert!(!session.has_any_permission(&["users.view", "reports.sales"]));
        assert!(session.has_all_permissions(&["sales.create", "sales.view"]));
        assert!(!session.has_all_permissions(&["sales.create", "sales.refund"]));
        assert!(!session.has_any_permission(&[]));
        assert!(session.has_all_permissions(&[]));
    }

    #[test]
    fn test_no_session_denies_everything() {
        let none: Option<Session> = None;
        assert!(!none.has_permission("sales.create"));
        assert!(!none.has_any_permission(&["sales.create"]));
        assert!(!none.has_all_permissions(&["sales.create"]));
        assert!(!none.has_all_permissions(&[]));
    }

    #[test]
    fn test_empty_permission_set_denies() {
        let mut session = cashier();
        session.permissions.clear();
        assert!(!session.has_permission("sales.create"));
        assert!(!Some(&session).has_any_permission(&["sales.view"]));
    }

    #[test]
    fn test_wire_shape() {
        let json = serde_json::to_value(cashier()).unwrap();
        assert_eq!(json["profile_id"], 2);
        assert_eq!(json["email"], "cajero1@tienda.mx");
        assert_eq!(json["permissions"][0], "sales.create");
    }
}
