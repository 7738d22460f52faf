//! # Identity Models
//!
//! Users, their optional role record, role-groups, and the per-request
//! `Actor` that every access policy is evaluated against.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::trimmed_within;
use crate::errors::ValidationError;

/// A user's role. Absence of a role record means `Contributor`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Admin,
    Moderator,
    #[default]
    Contributor,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Admin, Role::Moderator, Role::Contributor];

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Moderator => "moderator",
            Role::Contributor => "contributor",
        }
    }

    /// Human-readable name used in listings.
    pub fn label(&self) -> &'static str {
        match self {
            Role::Admin => "Admin",
            Role::Moderator => "Moderator",
            Role::Contributor => "Contributor",
        }
    }

    /// Admins and moderators.
    pub fn is_staff(&self) -> bool {
        matches!(self, Role::Admin | Role::Moderator)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "moderator" => Ok(Role::Moderator),
            "contributor" => Ok(Role::Contributor),
            other => Err(ValidationError::new(
                "role",
                format!("\"{other}\" is not a valid choice"),
            )),
        }
    }
}

/// A registered account. The password hash never leaves the process.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: Option<String>,
    pub first_name: String,
    pub last_name: String,
    #[serde(skip_serializing, default)]
    pub password_hash: String,
    pub date_joined: DateTime<Utc>,
}

/// The one-to-one role record attached to a user. It may be missing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserRole {
    pub user_id: Uuid,
    pub role: Role,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl UserRole {
    pub fn new(user_id: Uuid, role: Role, now: DateTime<Utc>) -> Self {
        Self {
            user_id,
            role,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn is_moderator(&self) -> bool {
        self.role == Role::Moderator
    }

    pub fn is_contributor(&self) -> bool {
        self.role == Role::Contributor
    }
}

/// Resolves a user's effective role. Total: a missing record is `Contributor`.
pub fn role_of(record: Option<&UserRole>) -> Role {
    record.map(|r| r.role).unwrap_or_default()
}

/// A named collection of users, usable as a grant target on boards.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleGroup {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub members: BTreeSet<Uuid>,
    pub created_at: DateTime<Utc>,
}

impl RoleGroup {
    pub fn has_member(&self, user_id: Uuid) -> bool {
        self.members.contains(&user_id)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewRoleGroup {
    pub name: String,
    #[serde(default)]
    pub description: String,
}

impl NewRoleGroup {
    pub fn validate(&self) -> Result<String, ValidationError> {
        trimmed_within("name", &self.name, 1, Some(150))
    }
}

/// Registration input.
#[derive(Clone, Deserialize)]
pub struct NewUser {
    pub username: String,
    pub password: String,
    pub password_confirm: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("username", &self.username)
            .field("email", &self.email)
            .finish_non_exhaustive()
    }
}

impl NewUser {
    /// Structural checks only; password strength policy belongs to the identity provider.
    /// Returns the normalized username.
    pub fn validate(&self) -> Result<String, ValidationError> {
        let username = trimmed_within("username", &self.username, 3, Some(150))?;
        if username.chars().any(char::is_whitespace) {
            return Err(ValidationError::new("username", "must not contain whitespace"));
        }
        if self.password.is_empty() {
            return Err(ValidationError::new("password", "must not be empty"));
        }
        if self.password != self.password_confirm {
            return Err(ValidationError::new(
                "password_confirm",
                "password fields didn't match",
            ));
        }
        Ok(username)
    }
}

/// An authenticated identity with everything the policies need, resolved once per request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Principal {
    pub user_id: Uuid,
    pub username: String,
    pub role: Role,
    /// Role-groups the user is a member of.
    pub groups: BTreeSet<Uuid>,
}

impl Principal {
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn is_moderator(&self) -> bool {
        self.role == Role::Moderator
    }

    pub fn is_staff(&self) -> bool {
        self.role.is_staff()
    }
}

/// Whoever issued the current request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Actor {
    Anonymous,
    User(Principal),
}

impl Actor {
    pub fn principal(&self) -> Option<&Principal> {
        match self {
            Actor::Anonymous => None,
            Actor::User(p) => Some(p),
        }
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Actor::User(_))
    }

    pub fn user_id(&self) -> Option<Uuid> {
        self.principal().map(|p| p.user_id)
    }

    pub fn is_staff(&self) -> bool {
        self.principal().is_some_and(Principal::is_staff)
    }

    pub fn is_admin(&self) -> bool {
        self.principal().is_some_and(Principal::is_admin)
    }
}
