//! # Ports
//!
//! Any adapter must implement these traits to be used by the binary.
//! Listing methods return records in insertion order; the aggregate views
//! rely on that for stable tie-breaking.

use std::collections::BTreeSet;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::errors::{AuthError, RepoResult};
use crate::models::{
    Board, Comment, Feedback, FeedbackPatch, RoleGroup, Tag, UpvoteOutcome, User, UserRole,
};

/// A freshly stored user.
#[derive(Debug, Clone)]
pub struct InsertedUser {
    pub user: User,
    /// Set for exactly one insert per store: the one that took it while empty.
    pub first: bool,
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with `Conflict` when the username is taken (case-insensitive).
    async fn insert_user(&self, user: User) -> RepoResult<InsertedUser>;
    async fn get_user(&self, id: Uuid) -> RepoResult<Option<User>>;
    async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>>;
    async fn list_users(&self) -> RepoResult<Vec<User>>;
    async fn count_users(&self) -> RepoResult<usize>;
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait RoleRepository: Send + Sync {
    async fn get_role(&self, user_id: Uuid) -> RepoResult<Option<UserRole>>;
    /// Inserts or replaces the single role record for `record.user_id`.
    async fn put_role(&self, record: UserRole) -> RepoResult<UserRole>;
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait RoleGroupRepository: Send + Sync {
    /// Fails with `Conflict` when the name is taken.
    async fn insert_group(&self, group: RoleGroup) -> RepoResult<RoleGroup>;
    async fn get_group(&self, id: Uuid) -> RepoResult<Option<RoleGroup>>;
    async fn list_groups(&self) -> RepoResult<Vec<RoleGroup>>;
    async fn add_member(&self, group_id: Uuid, user_id: Uuid) -> RepoResult<RoleGroup>;
    async fn remove_member(&self, group_id: Uuid, user_id: Uuid) -> RepoResult<RoleGroup>;
    /// Ids of every group `user_id` belongs to.
    async fn groups_of(&self, user_id: Uuid) -> RepoResult<BTreeSet<Uuid>>;
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait BoardRepository: Send + Sync {
    async fn insert_board(&self, board: Board) -> RepoResult<Board>;
    async fn get_board(&self, id: Uuid) -> RepoResult<Option<Board>>;
    async fn list_boards(&self) -> RepoResult<Vec<Board>>;
    async fn update_board(&self, board: Board) -> RepoResult<Board>;
    /// Removes the board with all of its feedback and their comments.
    async fn delete_board(&self, id: Uuid) -> RepoResult<()>;
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait FeedbackRepository: Send + Sync {
    /// Fails with `NotFound` for a missing board and `Invalid` for an unknown tag.
    async fn insert_feedback(&self, feedback: Feedback) -> RepoResult<Feedback>;
    async fn get_feedback(&self, id: Uuid) -> RepoResult<Option<Feedback>>;
    async fn list_feedback(&self) -> RepoResult<Vec<Feedback>>;
    /// Applies `patch` to the stored record in one step, so fields it leaves
    /// out (votes in particular) keep their current values. Fails with
    /// `Invalid` when the patch names a tag that does not exist.
    async fn update_feedback(
        &self,
        id: Uuid,
        patch: FeedbackPatch,
        now: DateTime<Utc>,
    ) -> RepoResult<Feedback>;
    /// Removes the feedback with all of its comments.
    async fn delete_feedback(&self, id: Uuid) -> RepoResult<()>;
    /// Atomic set-membership toggle. Returns the outcome and the new vote count.
    async fn toggle_upvote(&self, feedback_id: Uuid, user_id: Uuid)
        -> RepoResult<(UpvoteOutcome, usize)>;
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Fails with `NotFound` when the feedback is gone and with `Invalid` when
    /// `parent_id` names no comment on the same feedback.
    async fn insert_comment(&self, comment: Comment) -> RepoResult<Comment>;
    async fn get_comment(&self, id: Uuid) -> RepoResult<Option<Comment>>;
    /// All comments, or only those on `feedback_id` when given.
    async fn list_comments(&self, feedback_id: Option<Uuid>) -> RepoResult<Vec<Comment>>;
    async fn update_comment(&self, comment: Comment) -> RepoResult<Comment>;
    /// Removes the comment and its whole reply subtree. Returns how many were removed.
    async fn delete_comment(&self, id: Uuid) -> RepoResult<usize>;
}

#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
#[async_trait]
pub trait TagRepository: Send + Sync {
    /// Fails with `Conflict` when the name is taken.
    async fn insert_tag(&self, tag: Tag) -> RepoResult<Tag>;
    async fn get_tag(&self, id: Uuid) -> RepoResult<Option<Tag>>;
    async fn list_tags(&self) -> RepoResult<Vec<Tag>>;
    async fn update_tag(&self, tag: Tag) -> RepoResult<Tag>;
    /// Removes the tag and detaches it from every feedback item.
    async fn delete_tag(&self, id: Uuid) -> RepoResult<()>;
}

/// Password hashing contract of the identity provider.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait PasswordHasher: Send + Sync {
    fn hash_password(&self, password: &str) -> Result<String, AuthError>;
    fn verify_password(&self, password: &str, hash: &str) -> bool;
}

/// A bearer token handed to a client after login.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IssuedToken {
    pub access_token: String,
    pub token_type: &'static str,
    pub expires_in: u64,
}

/// Token issuance and verification contract of the identity provider.
#[cfg_attr(any(test, feature = "testing"), mockall::automock)]
pub trait TokenCodec: Send + Sync {
    fn issue(&self, user_id: Uuid) -> Result<IssuedToken, AuthError>;
    /// Returns the user id the token was issued for.
    fn verify(&self, token: &str) -> Result<Uuid, AuthError>;
}

/// Every repository port, bundled for service construction.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub roles: Arc<dyn RoleRepository>,
    pub groups: Arc<dyn RoleGroupRepository>,
    pub boards: Arc<dyn BoardRepository>,
    pub feedback: Arc<dyn FeedbackRepository>,
    pub comments: Arc<dyn CommentRepository>,
    pub tags: Arc<dyn TagRepository>,
}
