//! feedback-board/crates/services/src/lib.rs
//!
//! Application services for the feedback board. Each service takes the
//! acting [`domains::Actor`], asks the matching policy in [`policy`] for a
//! decision and only then touches the repositories.

pub mod admin;
pub mod boards;
pub mod comments;
pub mod error;
pub mod feedback;
pub mod identity;
pub mod policy;
pub mod queries;
pub mod tags;

#[cfg(feature = "demo-seed")]
pub mod seed;

mod support;
#[cfg(test)]
mod test_support;

use std::sync::Arc;

use domains::{PasswordHasher, Repositories, TokenCodec};

pub use admin::AdminService;
pub use boards::BoardService;
pub use comments::CommentService;
pub use error::{Result, ServiceError};
pub use feedback::{FeedbackService, FeedbackView, UpvoteReceipt};
pub use identity::{IdentityOptions, IdentityService, UserProfile};
pub use queries::{Kanban, KanbanColumn, QueryService};
pub use tags::TagService;

/// Every application service, wired to one set of adapters.
#[derive(Clone)]
pub struct Services {
    pub identity: IdentityService,
    pub admin: AdminService,
    pub boards: BoardService,
    pub feedback: FeedbackService,
    pub comments: CommentService,
    pub tags: TagService,
    pub queries: QueryService,
    #[cfg_attr(not(feature = "demo-seed"), allow(dead_code))]
    repos: Repositories,
}

impl Services {
    pub fn new(
        repos: Repositories,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenCodec>,
        options: IdentityOptions,
    ) -> Self {
        Self {
            identity: IdentityService::new(repos.clone(), hasher, tokens, options),
            admin: AdminService::new(repos.clone()),
            boards: BoardService::new(repos.clone()),
            feedback: FeedbackService::new(repos.clone()),
            comments: CommentService::new(repos.clone()),
            tags: TagService::new(repos.clone()),
            queries: QueryService::new(repos.clone()),
            repos,
        }
    }
}
