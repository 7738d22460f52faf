//! Comment access policy.
//!
//! Visibility is inherited from the feedback, and through it from the board.
//! Editing and deleting a comment is allowed to its author and to staff,
//! provided the actor can still view the feedback the comment is on.

use domains::{Actor, Board, Comment};

use super::{feedback, Decision};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommentAction {
    View,
    Update,
    Delete,
}

/// `board` is the board of the comment's feedback.
pub fn can_view(actor: &Actor, board: &Board) -> bool {
    feedback::can_view(actor, board)
}

pub fn can_edit(actor: &Actor, comment: &Comment, board: &Board) -> bool {
    can_view(actor, board)
        && actor
            .principal()
            .is_some_and(|p| p.is_staff() || p.user_id == comment.author_id)
}

pub fn decide_create(actor: &Actor, board: &Board) -> Decision {
    Decision::authenticated(actor, |_| can_view(actor, board))
}

pub fn decide(actor: &Actor, action: CommentAction, comment: &Comment, board: &Board) -> Decision {
    match action {
        CommentAction::View if can_view(actor, board) => Decision::Allow,
        CommentAction::View if !actor.is_authenticated() => Decision::RequireAuthentication,
        CommentAction::View => Decision::Deny,
        CommentAction::Update | CommentAction::Delete => {
            Decision::authenticated(actor, |_| can_edit(actor, comment, board))
        }
    }
}
