//! # Aggregate Queries
//!
//! Read-side views derived from visible feedback: per-board listings, the
//! upvote leaderboard and the kanban grouping. Every view starts from the
//! same visibility scope as the plain feedback listing.

use std::cmp::Reverse;

use domains::{Actor, Feedback, FeedbackStatus, Repositories, ValidationError};
use serde::Serialize;
use uuid::Uuid;

use crate::error::Result;
use crate::feedback::FeedbackView;
use crate::support::{load_board, visible_feedback};

/// One status column of the kanban view.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct KanbanColumn {
    pub status: FeedbackStatus,
    pub label: &'static str,
    pub feedback: Vec<FeedbackView>,
}

/// Always holds one column per status, in status order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Kanban {
    pub columns: Vec<KanbanColumn>,
}

#[derive(Clone)]
pub struct QueryService {
    repos: Repositories,
}

impl QueryService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    /// Visible feedback on one board, in creation order.
    ///
    /// A board the actor cannot see yields an empty list rather than an error.
    pub async fn by_board(&self, actor: &Actor, board_id: Option<Uuid>) -> Result<Vec<FeedbackView>> {
        let board_id = board_id.ok_or_else(|| ValidationError::new("board_id", "this field is required"))?;
        let items = self.on_board(actor, board_id).await?;
        Ok(items
            .into_iter()
            .map(|f| FeedbackView::for_actor(f, actor))
            .collect())
    }

    /// Visible feedback by upvote count, highest first; ties keep creation order.
    pub async fn most_upvoted(&self, actor: &Actor) -> Result<Vec<FeedbackView>> {
        let mut items = visible_feedback(&self.repos, actor).await?;
        items.sort_by_key(|f| Reverse(f.upvote_count()));
        Ok(items
            .into_iter()
            .map(|f| FeedbackView::for_actor(f, actor))
            .collect())
    }

    /// Groups visible feedback by status, newest first within each column.
    pub async fn kanban(&self, actor: &Actor, board_id: Option<Uuid>) -> Result<Kanban> {
        let items = match board_id {
            Some(id) => self.on_board(actor, id).await?,
            None => visible_feedback(&self.repos, actor).await?,
        };
        Ok(group_by_status(items, actor))
    }

    async fn on_board(&self, actor: &Actor, board_id: Uuid) -> Result<Vec<Feedback>> {
        load_board(&self.repos, board_id).await?;
        Ok(visible_feedback(&self.repos, actor)
            .await?
            .into_iter()
            .filter(|f| f.board_id == board_id)
            .collect())
    }
}

fn group_by_status(items: Vec<Feedback>, actor: &Actor) -> Kanban {
    let mut columns: Vec<KanbanColumn> = FeedbackStatus::ALL
        .into_iter()
        .map(|status| KanbanColumn {
            status,
            label: status.label(),
            feedback: Vec::new(),
        })
        .collect();
    for item in items {
        if let Some(column) = columns.iter_mut().find(|c| c.status == item.status) {
            column.feedback.push(FeedbackView::for_actor(item, actor));
        }
    }
    for column in &mut columns {
        column
            .feedback
            .sort_by(|a, b| b.feedback.created_at.cmp(&a.feedback.created_at));
    }
    Kanban { columns }
}
