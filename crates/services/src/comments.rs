//! # Comment Service
//!
//! Threaded comments on feedback items. Replies must stay on the same
//! feedback item as their parent; deleting a comment removes its replies.

use std::collections::HashMap;

use chrono::Utc;
use domains::{
    build_thread, Actor, Comment, CommentNode, CommentPatch, NewComment, Repositories,
    ValidationError,
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{Result, ServiceError};
use crate::policy::comment::{self, CommentAction};
use crate::policy::feedback::{self as feedback_policy, FeedbackAction};
use crate::policy::{Action, EntityKind, FeedbackScope};
use crate::support::{boards_by_id, load_feedback_with_board, require_principal};

#[derive(Clone)]
pub struct CommentService {
    repos: Repositories,
}

impl CommentService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    #[instrument(skip(self, actor, input), fields(feedback_id = %input.feedback_id))]
    pub async fn create(&self, actor: &Actor, input: NewComment) -> Result<Comment> {
        let principal = require_principal(actor)?;
        let (item, board) = match load_feedback_with_board(&self.repos, input.feedback_id).await {
            Ok(found) => found,
            Err(ServiceError::NotFound { .. }) => {
                return Err(ValidationError::new("feedback", "feedback does not exist").into())
            }
            Err(err) => return Err(err),
        };
        comment::decide_create(actor, &board).enforce(EntityKind::Comment, Action::Create)?;

        if let Some(parent_id) = input.parent_id {
            let parent = self.repos.comments.get_comment(parent_id).await?;
            if !parent.is_some_and(|p| p.feedback_id == item.id) {
                return Err(ValidationError::new(
                    "parent",
                    "parent comment must belong to the same feedback",
                )
                .into());
            }
        }

        let comment = Comment::create(input, principal.user_id, Utc::now())?;
        let comment = self.repos.comments.insert_comment(comment).await?;
        tracing::info!(comment_id = %comment.id, "comment created");
        Ok(comment)
    }

    pub async fn get(&self, actor: &Actor, id: Uuid) -> Result<Comment> {
        let (found, board) = self.load_with_board(id).await?;
        comment::decide(actor, CommentAction::View, &found, &board)
            .enforce(EntityKind::Comment, Action::View)?;
        Ok(found)
    }

    /// Visible comments, optionally narrowed to one feedback item.
    pub async fn list(&self, actor: &Actor, feedback_id: Option<Uuid>) -> Result<Vec<Comment>> {
        let comments = self.repos.comments.list_comments(feedback_id).await?;
        if actor.is_staff() {
            return Ok(comments);
        }

        let scope = FeedbackScope::for_actor(actor);
        let boards = boards_by_id(&self.repos).await?;
        let feedback_boards: HashMap<Uuid, Uuid> = self
            .repos
            .feedback
            .list_feedback()
            .await?
            .into_iter()
            .map(|f| (f.id, f.board_id))
            .collect();

        Ok(comments
            .into_iter()
            .filter(|c| {
                feedback_boards
                    .get(&c.feedback_id)
                    .and_then(|board_id| boards.get(board_id))
                    .is_some_and(|b| scope.admits(b))
            })
            .collect())
    }

    /// Reply tree of one feedback item.
    pub async fn thread(&self, actor: &Actor, feedback_id: Uuid) -> Result<Vec<CommentNode>> {
        let (item, board) = load_feedback_with_board(&self.repos, feedback_id).await?;
        feedback_policy::decide(actor, FeedbackAction::View, &item, &board)
            .enforce(EntityKind::Feedback, Action::View)?;
        let comments = self.repos.comments.list_comments(Some(feedback_id)).await?;
        Ok(build_thread(comments))
    }

    #[instrument(skip(self, actor, patch))]
    pub async fn update(&self, actor: &Actor, id: Uuid, patch: CommentPatch) -> Result<Comment> {
        let (mut found, board) = self.load_with_board(id).await?;
        comment::decide(actor, CommentAction::Update, &found, &board)
            .enforce(EntityKind::Comment, Action::Update)?;
        found.edit(patch, Utc::now())?;
        Ok(self.repos.comments.update_comment(found).await?)
    }

    /// Returns how many comments were removed, the target included.
    #[instrument(skip(self, actor))]
    pub async fn delete(&self, actor: &Actor, id: Uuid) -> Result<usize> {
        let (found, board) = self.load_with_board(id).await?;
        comment::decide(actor, CommentAction::Delete, &found, &board)
            .enforce(EntityKind::Comment, Action::Delete)?;
        let removed = self.repos.comments.delete_comment(id).await?;
        tracing::info!(comment_id = %id, removed, "comment deleted");
        Ok(removed)
    }

    async fn load_with_board(&self, id: Uuid) -> Result<(Comment, domains::Board)> {
        let found = self
            .repos
            .comments
            .get_comment(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("comment", id))?;
        let (_, board) = load_feedback_with_board(&self.repos, found.feedback_id).await?;
        Ok((found, board))
    }
}
