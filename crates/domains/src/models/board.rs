//! Boards: the top-level container for feedback, with their access grants.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::trimmed_within;
use crate::errors::ValidationError;

/// A feedback board owned by exactly one creator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub is_public: bool,
    /// Fixed at creation.
    pub created_by: Uuid,
    /// Explicit per-user grants.
    pub allowed_users: BTreeSet<Uuid>,
    /// Role-group grants.
    pub allowed_roles: BTreeSet<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Board {
    /// Builds a board from validated input. `created_by` is the acting user.
    pub fn create(
        input: NewBoard,
        created_by: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let name = validate_board_name(&input.name)?;
        Ok(Self {
            id: Uuid::now_v7(),
            name,
            description: input.description.trim().to_string(),
            is_public: input.is_public,
            created_by,
            allowed_users: input.allowed_users,
            allowed_roles: input.allowed_roles,
            created_at: now,
            updated_at: now,
        })
    }

    /// Applies a patch in place. Ownership is never part of a patch.
    pub fn apply(&mut self, patch: BoardPatch, now: DateTime<Utc>) -> Result<(), ValidationError> {
        if let Some(name) = patch.name {
            self.name = validate_board_name(&name)?;
        }
        if let Some(description) = patch.description {
            self.description = description.trim().to_string();
        }
        if let Some(is_public) = patch.is_public {
            self.is_public = is_public;
        }
        if let Some(users) = patch.allowed_users {
            self.allowed_users = users;
        }
        if let Some(roles) = patch.allowed_roles {
            self.allowed_roles = roles;
        }
        self.updated_at = now;
        Ok(())
    }
}

fn validate_board_name(name: &str) -> Result<String, ValidationError> {
    trimmed_within("name", name, 1, Some(255))
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NewBoard {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default)]
    pub allowed_users: BTreeSet<Uuid>,
    #[serde(default)]
    pub allowed_roles: BTreeSet<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct BoardPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub is_public: Option<bool>,
    pub allowed_users: Option<BTreeSet<Uuid>>,
    pub allowed_roles: Option<BTreeSet<Uuid>>,
}

impl BoardPatch {
    /// Grants named by this patch, for existence checks before applying.
    pub fn grants(&self) -> (Option<&BTreeSet<Uuid>>, Option<&BTreeSet<Uuid>>) {
        (self.allowed_users.as_ref(), self.allowed_roles.as_ref())
    }
}
