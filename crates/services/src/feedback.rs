//! # Feedback Service
//!
//! Feedback CRUD, status changes and upvote toggling. Reads return
//! [`FeedbackView`], which carries the vote count and whether the current
//! actor has voted.

use chrono::Utc;
use domains::{
    Actor, Feedback, FeedbackFilter, FeedbackPatch, FeedbackStatus, NewFeedback, Repositories,
    UpvoteOutcome, ValidationError,
};
use serde::Serialize;
use tracing::instrument;
use uuid::Uuid;

use crate::error::Result;
use crate::policy::feedback::{self, FeedbackAction};
use crate::policy::{Action, EntityKind};
use crate::support::{load_feedback_with_board, require_principal, visible_feedback};

/// Feedback as presented to one actor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FeedbackView {
    #[serde(flatten)]
    pub feedback: Feedback,
    pub upvotes_count: usize,
    pub is_upvoted: bool,
}

impl FeedbackView {
    pub fn for_actor(feedback: Feedback, actor: &Actor) -> Self {
        let is_upvoted = actor
            .user_id()
            .is_some_and(|id| feedback.is_upvoted_by(id));
        Self {
            upvotes_count: feedback.upvote_count(),
            is_upvoted,
            feedback,
        }
    }
}

/// Result of an upvote toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct UpvoteReceipt {
    pub status: UpvoteOutcome,
    pub upvotes_count: usize,
}

#[derive(Clone)]
pub struct FeedbackService {
    repos: Repositories,
}

impl FeedbackService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    #[instrument(skip(self, actor, input), fields(board_id = %input.board_id))]
    pub async fn create(&self, actor: &Actor, input: NewFeedback) -> Result<FeedbackView> {
        let principal = require_principal(actor)?;
        let board = self
            .repos
            .boards
            .get_board(input.board_id)
            .await?
            .ok_or_else(|| ValidationError::new("board", "board does not exist"))?;
        feedback::decide_create(actor, &board).enforce(EntityKind::Feedback, Action::Create)?;

        let item = Feedback::create(input, principal.user_id, Utc::now())?;
        let item = self.repos.feedback.insert_feedback(item).await?;
        tracing::info!(feedback_id = %item.id, "feedback created");
        Ok(FeedbackView::for_actor(item, actor))
    }

    pub async fn get(&self, actor: &Actor, id: Uuid) -> Result<FeedbackView> {
        let (item, board) = load_feedback_with_board(&self.repos, id).await?;
        feedback::decide(actor, FeedbackAction::View, &item, &board)
            .enforce(EntityKind::Feedback, Action::View)?;
        Ok(FeedbackView::for_actor(item, actor))
    }

    /// Visible feedback narrowed by `filter`, in creation order.
    pub async fn list(&self, actor: &Actor, filter: FeedbackFilter) -> Result<Vec<FeedbackView>> {
        Ok(visible_feedback(&self.repos, actor)
            .await?
            .into_iter()
            .filter(|f| filter.matches(f))
            .map(|f| FeedbackView::for_actor(f, actor))
            .collect())
    }

    #[instrument(skip(self, actor, patch))]
    pub async fn update(&self, actor: &Actor, id: Uuid, patch: FeedbackPatch) -> Result<FeedbackView> {
        let (item, board) = load_feedback_with_board(&self.repos, id).await?;
        feedback::decide(actor, FeedbackAction::Update, &item, &board)
            .enforce(EntityKind::Feedback, Action::Update)?;

        let item = self
            .repos
            .feedback
            .update_feedback(id, patch, Utc::now())
            .await?;
        Ok(FeedbackView::for_actor(item, actor))
    }

    /// Deletes the feedback and all of its comments.
    #[instrument(skip(self, actor))]
    pub async fn delete(&self, actor: &Actor, id: Uuid) -> Result<()> {
        let (item, board) = load_feedback_with_board(&self.repos, id).await?;
        feedback::decide(actor, FeedbackAction::Delete, &item, &board)
            .enforce(EntityKind::Feedback, Action::Delete)?;
        self.repos.feedback.delete_feedback(id).await?;
        tracing::info!(feedback_id = %id, "feedback deleted");
        Ok(())
    }

    /// The status string is validated before permissions are checked, so an
    /// unknown status is a validation error for every authenticated actor.
    #[instrument(skip(self, actor))]
    pub async fn change_status(&self, actor: &Actor, id: Uuid, status: &str) -> Result<FeedbackView> {
        require_principal(actor)?;
        let status: FeedbackStatus = status.parse()?;
        let (item, board) = load_feedback_with_board(&self.repos, id).await?;
        feedback::decide(actor, FeedbackAction::ChangeStatus, &item, &board)
            .enforce(EntityKind::Feedback, Action::ChangeStatus)?;

        let previous = item.status;
        let patch = FeedbackPatch {
            status: Some(status),
            ..Default::default()
        };
        let item = self
            .repos
            .feedback
            .update_feedback(id, patch, Utc::now())
            .await?;
        tracing::info!(feedback_id = %id, from = %previous.as_str(), to = %status.as_str(), "status changed");
        Ok(FeedbackView::for_actor(item, actor))
    }

    /// Adds the actor's vote, or removes it when already present.
    #[instrument(skip(self, actor))]
    pub async fn toggle_upvote(&self, actor: &Actor, id: Uuid) -> Result<UpvoteReceipt> {
        let principal = require_principal(actor)?;
        let (item, board) = load_feedback_with_board(&self.repos, id).await?;
        feedback::decide(actor, FeedbackAction::Upvote, &item, &board)
            .enforce(EntityKind::Feedback, Action::Upvote)?;

        let (status, upvotes_count) = self
            .repos
            .feedback
            .toggle_upvote(id, principal.user_id)
            .await?;
        Ok(UpvoteReceipt {
            status,
            upvotes_count,
        })
    }
}
