//! # Access Policies
//!
//! Every authorization rule of the feedback board lives here, as pure
//! functions over already-loaded entities and a resolved [`Actor`]. Nothing
//! in this module touches storage, so each rule can be exercised without
//! adapters.
//!
//! Mutating operations ask for a [`Decision`] and call [`Decision::enforce`]
//! before anything is written. Listings ask for a scope (e.g.
//! [`BoardScope`]) and filter with it.

pub mod admin;
pub mod board;
pub mod comment;
pub mod feedback;
pub mod tag;

use std::fmt;

use domains::{Actor, Board, Principal};

use crate::error::ServiceError;

pub use board::BoardScope;
pub use feedback::FeedbackScope;

/// The kind of entity a decision was made about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EntityKind {
    Board,
    Feedback,
    Comment,
    Tag,
    User,
    RoleGroup,
}

impl EntityKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Board => "board",
            EntityKind::Feedback => "feedback",
            EntityKind::Comment => "comment",
            EntityKind::Tag => "tag",
            EntityKind::User => "user",
            EntityKind::RoleGroup => "role group",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Actions a policy can be asked about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    View,
    Create,
    Update,
    Delete,
    ChangeStatus,
    Upvote,
    Manage,
}

impl Action {
    pub fn as_str(&self) -> &'static str {
        match self {
            Action::View => "view",
            Action::Create => "create",
            Action::Update => "update",
            Action::Delete => "delete",
            Action::ChangeStatus => "change the status of",
            Action::Upvote => "upvote",
            Action::Manage => "manage",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outcome of a policy check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    /// The actor is anonymous and the action needs an identity.
    RequireAuthentication,
    Deny,
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        self == Decision::Allow
    }

    /// `Allow` when `cond` holds, `Deny` otherwise.
    pub fn when(cond: bool) -> Self {
        if cond {
            Decision::Allow
        } else {
            Decision::Deny
        }
    }

    /// Requires an authenticated actor, then evaluates `rule` on its principal.
    pub fn authenticated(actor: &Actor, rule: impl FnOnce(&Principal) -> bool) -> Self {
        match actor.principal() {
            None => Decision::RequireAuthentication,
            Some(p) => Decision::when(rule(p)),
        }
    }

    /// Turns the decision into the error the transport reports.
    pub fn enforce(self, entity: EntityKind, action: Action) -> Result<(), ServiceError> {
        match self {
            Decision::Allow => Ok(()),
            Decision::RequireAuthentication => {
                tracing::debug!(%entity, %action, "anonymous actor rejected");
                Err(ServiceError::Unauthenticated)
            }
            Decision::Deny => {
                tracing::debug!(%entity, %action, "permission denied");
                Err(ServiceError::PermissionDenied { entity, action })
            }
        }
    }
}

/// Creator, explicit user grant, or membership in a granted role-group.
///
/// Role alone never satisfies this relation.
pub fn holds_board_grant(principal: &Principal, board: &Board) -> bool {
    principal.user_id == board.created_by
        || board.allowed_users.contains(&principal.user_id)
        || !board.allowed_roles.is_disjoint(&principal.groups)
}
