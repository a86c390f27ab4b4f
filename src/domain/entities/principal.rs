//! Verified caller identity and the ownership scope it grants.

use serde::Serialize;

/// Role of an authenticated principal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    User,
    /// Bypasses per-owner scoping on listing, counting and flag updates.
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "USER",
            Role::Admin => "ADMIN",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "USER" => Some(Role::User),
            "ADMIN" => Some(Role::Admin),
            _ => None,
        }
    }
}

/// An authenticated caller.
///
/// Only [`crate::application::services::AuthService::verify`] constructs
/// principals outside this crate, so a role can never come from request data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    user_id: String,
    role: Role,
}

impl Principal {
    pub(crate) fn new(user_id: impl Into<String>, role: Role) -> Self {
        Self {
            user_id: user_id.into(),
            role,
        }
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    /// Rows this principal may read or toggle.
    pub fn scope(&self) -> OwnerScope {
        match self.role {
            Role::Admin => OwnerScope::All,
            Role::User => OwnerScope::Owner(self.user_id.clone()),
        }
    }
}

/// Ownership restriction applied to a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OwnerScope {
    All,
    Owner(String),
}

impl OwnerScope {
    pub fn owner_id(&self) -> Option<&str> {
        match self {
            OwnerScope::All => None,
            OwnerScope::Owner(id) => Some(id),
        }
    }
}
