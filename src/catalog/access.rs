//! Credential lookup against the document's `users` map.
//!
//! Passwords are stored and compared in plain text. This answers "does the
//! pair match" for a front end; it is not an access-control layer.

use crate::catalog::CatalogDocument;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Role {
    Admin,
    Partner,
}

/// Identity for one request. Owned by the caller, never stored in the
/// document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Session {
    pub username: String,
    pub role: Role,
}

const ADMIN_USER: &str = "admin";

/// Returns a session when `username` exists and `password` matches exactly.
pub fn authenticate(doc: &CatalogDocument, username: &str, password: &str) -> Option<Session> {
    let stored = doc.users.get(username)?;
    if stored != password {
        return None;
    }
    let role = if username == ADMIN_USER {
        Role::Admin
    } else {
        Role::Partner
    };
    Some(Session {
        username: username.to_string(),
        role,
    })
}
