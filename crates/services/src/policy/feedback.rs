//! Feedback access policy.
//!
//! | action                 | rule                                              |
//! |------------------------|---------------------------------------------------|
//! | view / list            | staff, or the actor can view the owning board     |
//! | create                 | auth required; actor can view the target board    |
//! | update / delete        | auth required; creator or staff                   |
//! | change status          | auth required; creator or staff                   |
//! | upvote toggle          | auth required; actor can view the feedback        |
//!
//! Staff role alone grants edit rights here, unlike boards.

use std::collections::HashMap;

use domains::{Actor, Board, Feedback};
use uuid::Uuid;

use super::board::{self, BoardScope};
use super::Decision;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeedbackAction {
    View,
    Update,
    Delete,
    ChangeStatus,
    Upvote,
}

/// `board` must be the board `feedback` belongs to.
pub fn can_view(actor: &Actor, board: &Board) -> bool {
    actor.is_staff() || board::can_view(actor, board)
}

pub fn can_edit(actor: &Actor, feedback: &Feedback) -> bool {
    actor
        .principal()
        .is_some_and(|p| p.is_staff() || p.user_id == feedback.created_by)
}

pub fn can_delete(actor: &Actor, feedback: &Feedback) -> bool {
    can_edit(actor, feedback)
}

pub fn can_change_status(actor: &Actor, feedback: &Feedback) -> bool {
    can_edit(actor, feedback)
}

/// Creating feedback needs view eligibility on the target board.
pub fn decide_create(actor: &Actor, board: &Board) -> Decision {
    Decision::authenticated(actor, |_| board::can_view(actor, board))
}

pub fn decide(actor: &Actor, action: FeedbackAction, feedback: &Feedback, board: &Board) -> Decision {
    match action {
        FeedbackAction::View if can_view(actor, board) => Decision::Allow,
        FeedbackAction::View if !actor.is_authenticated() => Decision::RequireAuthentication,
        FeedbackAction::View => Decision::Deny,
        FeedbackAction::Update | FeedbackAction::Delete | FeedbackAction::ChangeStatus => {
            Decision::authenticated(actor, |_| can_edit(actor, feedback))
        }
        FeedbackAction::Upvote => Decision::authenticated(actor, |_| can_view(actor, board)),
    }
}

/// Listing predicate for feedback, derived from the board scope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedbackScope {
    boards: BoardScope,
}

impl FeedbackScope {
    pub fn for_actor(actor: &Actor) -> Self {
        Self {
            boards: BoardScope::for_actor(actor),
        }
    }

    pub fn board_scope(&self) -> &BoardScope {
        &self.boards
    }

    pub fn admits(&self, board: &Board) -> bool {
        self.boards.admits(board)
    }

    /// Keeps the feedback whose board is known and admitted, preserving order.
    pub fn apply(&self, feedback: Vec<Feedback>, boards: &HashMap<Uuid, Board>) -> Vec<Feedback> {
        feedback
            .into_iter()
            .filter(|f| match self.boards {
                BoardScope::Everything => true,
                _ => boards.get(&f.board_id).is_some_and(|b| self.admits(b)),
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::fixtures::*;
    use domains::Role;
    use proptest::prelude::*;

    #[test]
    fn staff_edit_any_feedback() {
        let board = board(Uuid::now_v7(), false);
        let fb = feedback(&board, Uuid::now_v7());
        for role in [Role::Admin, Role::Moderator] {
            let staff = actor(role);
            assert!(can_edit(&staff, &fb));
            assert!(can_delete(&staff, &fb));
            assert_eq!(
                decide(&staff, FeedbackAction::ChangeStatus, &fb, &board),
                Decision::Allow
            );
        }
    }

    #[test]
    fn creator_may_change_status_but_other_contributors_may_not() {
        let board = board(Uuid::now_v7(), true);
        let creator = principal(Role::Contributor);
        let fb = feedback(&board, creator.user_id);
        let creator = Actor::User(creator);
        let other = actor(Role::Contributor);

        assert!(can_change_status(&creator, &fb));
        assert_eq!(
            decide(&other, FeedbackAction::ChangeStatus, &fb, &board),
            Decision::Deny
        );
        assert_eq!(
            decide(&Actor::Anonymous, FeedbackAction::ChangeStatus, &fb, &board),
            Decision::RequireAuthentication
        );
    }

    #[test]
    fn create_requires_board_visibility() {
        let owner = principal(Role::Contributor);
        let private = board(owner.user_id, false);
        let public = board(owner.user_id, true);
        let outsider = actor(Role::Contributor);

        assert_eq!(decide_create(&Actor::User(owner), &private), Decision::Allow);
        assert_eq!(decide_create(&outsider, &private), Decision::Deny);
        assert_eq!(decide_create(&outsider, &public), Decision::Allow);
        assert_eq!(
            decide_create(&Actor::Anonymous, &public),
            Decision::RequireAuthentication
        );
    }

    #[test]
    fn upvote_needs_an_identity_and_visibility() {
        let board = board(Uuid::now_v7(), false);
        let fb = feedback(&board, Uuid::now_v7());
        assert_eq!(
            decide(&actor(Role::Contributor), FeedbackAction::Upvote, &fb, &board),
            Decision::Deny
        );
        assert_eq!(
            decide(&actor(Role::Moderator), FeedbackAction::Upvote, &fb, &board),
            Decision::Allow
        );
    }

    #[test]
    fn creator_may_upvote_own_feedback() {
        let creator = principal(Role::Contributor);
        let board = board(creator.user_id, false);
        let fb = feedback(&board, creator.user_id);
        assert_eq!(
            decide(&Actor::User(creator), FeedbackAction::Upvote, &fb, &board),
            Decision::Allow
        );
    }

    #[test]
    fn scope_drops_feedback_on_hidden_or_unknown_boards() {
        let public = board(Uuid::now_v7(), true);
        let private = board(Uuid::now_v7(), false);
        let on_public = feedback(&public, Uuid::now_v7());
        let on_private = feedback(&private, Uuid::now_v7());
        let boards: HashMap<Uuid, Board> = [public, private]
            .into_iter()
            .map(|b| (b.id, b))
            .collect();

        let visible = FeedbackScope::for_actor(&actor(Role::Contributor))
            .apply(vec![on_public.clone(), on_private.clone()], &boards);
        assert_eq!(visible, vec![on_public.clone()]);

        let all = FeedbackScope::for_actor(&actor(Role::Admin))
            .apply(vec![on_public, on_private], &HashMap::new());
        assert_eq!(all.len(), 2);
    }

    proptest! {
        #[test]
        fn edit_rights_follow_creator_or_staff(
            role in prop_oneof![Just(Role::Admin), Just(Role::Moderator), Just(Role::Contributor)],
            is_creator in any::<bool>(),
            board_granted in any::<bool>(),
        ) {
            let user = principal(role);
            let owner = if board_granted { user.user_id } else { Uuid::now_v7() };
            let board = board(owner, false);
            let author = if is_creator { user.user_id } else { Uuid::now_v7() };
            let fb = feedback(&board, author);
            prop_assert_eq!(can_edit(&Actor::User(user), &fb), is_creator || role.is_staff());
        }
    }
}
