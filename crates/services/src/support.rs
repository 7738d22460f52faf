//! Loading helpers shared by the application services.

use std::collections::HashMap;

use domains::{Actor, Board, Feedback, Principal, Repositories};
use uuid::Uuid;

use crate::error::{Result, ServiceError};
use crate::policy::FeedbackScope;

pub(crate) fn require_principal(actor: &Actor) -> Result<&Principal> {
    actor.principal().ok_or(ServiceError::Unauthenticated)
}

pub(crate) async fn load_board(repos: &Repositories, id: Uuid) -> Result<Board> {
    repos
        .boards
        .get_board(id)
        .await?
        .ok_or_else(|| ServiceError::not_found("board", id))
}

pub(crate) async fn load_feedback(repos: &Repositories, id: Uuid) -> Result<Feedback> {
    repos
        .feedback
        .get_feedback(id)
        .await?
        .ok_or_else(|| ServiceError::not_found("feedback", id))
}

/// The feedback item and the board it lives on.
pub(crate) async fn load_feedback_with_board(
    repos: &Repositories,
    id: Uuid,
) -> Result<(Feedback, Board)> {
    let feedback = load_feedback(repos, id).await?;
    let board = load_board(repos, feedback.board_id).await?;
    Ok((feedback, board))
}

pub(crate) async fn boards_by_id(repos: &Repositories) -> Result<HashMap<Uuid, Board>> {
    Ok(repos
        .boards
        .list_boards()
        .await?
        .into_iter()
        .map(|b| (b.id, b))
        .collect())
}

/// Every feedback item `actor` may see, in insertion order.
pub(crate) async fn visible_feedback(repos: &Repositories, actor: &Actor) -> Result<Vec<Feedback>> {
    let all = repos.feedback.list_feedback().await?;
    let boards = boards_by_id(repos).await?;
    Ok(FeedbackScope::for_actor(actor).apply(all, &boards))
}
