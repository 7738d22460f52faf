//! Board access policy.
//!
//! | action        | anonymous          | contributor      | admin / moderator |
//! |---------------|--------------------|------------------|-------------------|
//! | view / list   | public only        | public or grant  | always            |
//! | create        | auth required      | yes              | yes               |
//! | update/delete | auth required      | grant            | grant             |
//!
//! "grant" is [`holds_board_grant`]: creator, explicit user grant, or a
//! granted role-group. Staff role alone does not let anyone edit a board,
//! unlike feedback where it does.

use std::collections::BTreeSet;

use domains::{Actor, Board};
use uuid::Uuid;

use super::{holds_board_grant, Decision};

/// Board actions that target an existing board.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoardAction {
    View,
    Update,
    Delete,
}

pub fn can_view(actor: &Actor, board: &Board) -> bool {
    if board.is_public {
        return true;
    }
    match actor.principal() {
        None => false,
        Some(p) => p.is_staff() || holds_board_grant(p, board),
    }
}

pub fn can_edit(actor: &Actor, board: &Board) -> bool {
    actor
        .principal()
        .is_some_and(|p| holds_board_grant(p, board))
}

pub fn can_delete(actor: &Actor, board: &Board) -> bool {
    can_edit(actor, board)
}

pub fn decide_create(actor: &Actor) -> Decision {
    Decision::authenticated(actor, |_| true)
}

pub fn decide(actor: &Actor, action: BoardAction, board: &Board) -> Decision {
    match action {
        BoardAction::View if can_view(actor, board) => Decision::Allow,
        BoardAction::View if !actor.is_authenticated() => Decision::RequireAuthentication,
        BoardAction::View => Decision::Deny,
        BoardAction::Update | BoardAction::Delete => {
            Decision::authenticated(actor, |p| holds_board_grant(p, board))
        }
    }
}

/// Listing predicate for boards, resolved once per request.
///
/// Can be evaluated in memory with [`BoardScope::admits`] or translated by a
/// storage adapter into a pushed-down query; both must agree with
/// [`can_view`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BoardScope {
    /// Admins and moderators.
    Everything,
    /// Public boards plus boards the user holds a grant on.
    Granted {
        user_id: Uuid,
        groups: BTreeSet<Uuid>,
    },
    /// Anonymous actors.
    PublicOnly,
}

impl BoardScope {
    pub fn for_actor(actor: &Actor) -> Self {
        match actor.principal() {
            None => BoardScope::PublicOnly,
            Some(p) if p.is_staff() => BoardScope::Everything,
            Some(p) => BoardScope::Granted {
                user_id: p.user_id,
                groups: p.groups.clone(),
            },
        }
    }

    pub fn admits(&self, board: &Board) -> bool {
        match self {
            BoardScope::Everything => true,
            BoardScope::PublicOnly => board.is_public,
            BoardScope::Granted { user_id, groups } => {
                board.is_public
                    || board.created_by == *user_id
                    || board.allowed_users.contains(user_id)
                    || !board.allowed_roles.is_disjoint(groups)
            }
        }
    }

    /// Filters `boards` down to the visible ones, keeping order.
    pub fn apply(&self, boards: Vec<Board>) -> Vec<Board> {
        boards.into_iter().filter(|b| self.admits(b)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::fixtures::*;
    use domains::Role;
    use proptest::prelude::*;

    #[test]
    fn private_board_is_hidden_from_non_granted_users() {
        let a = principal(Role::Contributor);
        let p = board(a.user_id, false);
        let b = actor(Role::Contributor);
        let c = actor(Role::Admin);

        assert!(can_view(&Actor::User(a), &p));
        assert!(!can_view(&b, &p));
        assert!(can_view(&c, &p));
        assert!(!can_view(&Actor::Anonymous, &p));
        assert_eq!(decide(&b, BoardAction::View, &p), Decision::Deny);
        assert_eq!(
            decide(&Actor::Anonymous, BoardAction::View, &p),
            Decision::RequireAuthentication
        );
    }

    #[test]
    fn staff_cannot_edit_boards_without_a_grant() {
        let board = board(Uuid::now_v7(), true);
        for role in [Role::Admin, Role::Moderator] {
            let staff = actor(role);
            assert!(!can_edit(&staff, &board));
            assert!(!can_delete(&staff, &board));
            assert_eq!(decide(&staff, BoardAction::Delete, &board), Decision::Deny);
        }
    }

    #[test]
    fn staff_with_a_grant_can_edit() {
        let mut board = board(Uuid::now_v7(), false);
        let admin = principal(Role::Admin);
        board.allowed_users.insert(admin.user_id);
        assert!(can_edit(&Actor::User(admin), &board));
    }

    #[test]
    fn group_grant_allows_view_and_edit() {
        let group = Uuid::now_v7();
        let mut board = board(Uuid::now_v7(), false);
        board.allowed_roles.insert(group);
        let mut member = principal(Role::Contributor);
        member.groups.insert(group);
        let member = Actor::User(member);
        assert!(can_view(&member, &board));
        assert_eq!(decide(&member, BoardAction::Update, &board), Decision::Allow);
    }

    #[test]
    fn anyone_authenticated_may_create() {
        assert_eq!(decide_create(&actor(Role::Contributor)), Decision::Allow);
        assert_eq!(
            decide_create(&Actor::Anonymous),
            Decision::RequireAuthentication
        );
    }

    #[test]
    fn scope_matches_actor_kind() {
        assert_eq!(BoardScope::for_actor(&Actor::Anonymous), BoardScope::PublicOnly);
        assert_eq!(
            BoardScope::for_actor(&actor(Role::Moderator)),
            BoardScope::Everything
        );
        assert!(matches!(
            BoardScope::for_actor(&actor(Role::Contributor)),
            BoardScope::Granted { .. }
        ));
    }

    #[test]
    fn listing_is_the_deduplicated_union_of_grants() {
        let group = Uuid::now_v7();
        let mut user = principal(Role::Contributor);
        user.groups.insert(group);
        let stranger = Uuid::now_v7();

        let public = board(stranger, true);
        let own = board(user.user_id, false);
        let mut explicit = board(stranger, false);
        explicit.allowed_users.insert(user.user_id);
        let mut via_group = board(stranger, false);
        via_group.allowed_roles.insert(group);
        // Reachable three ways; must appear once.
        let mut everything = board(user.user_id, true);
        everything.allowed_users.insert(user.user_id);
        let hidden = board(stranger, false);

        let all = vec![
            public.clone(),
            own.clone(),
            explicit.clone(),
            via_group.clone(),
            everything.clone(),
            hidden,
        ];
        let visible = BoardScope::for_actor(&Actor::User(user)).apply(all);
        let ids: Vec<Uuid> = visible.iter().map(|b| b.id).collect();
        assert_eq!(
            ids,
            vec![public.id, own.id, explicit.id, via_group.id, everything.id]
        );
    }

    fn arb_role() -> impl Strategy<Value = Role> {
        prop_oneof![
            Just(Role::Admin),
            Just(Role::Moderator),
            Just(Role::Contributor)
        ]
    }

    proptest! {
        #[test]
        fn public_boards_are_visible_to_everyone(role in arb_role(), anonymous in any::<bool>()) {
            let board = board(Uuid::now_v7(), true);
            let actor = if anonymous { Actor::Anonymous } else { actor(role) };
            prop_assert!(can_view(&actor, &board));
            prop_assert!(BoardScope::for_actor(&actor).admits(&board));
        }

        #[test]
        fn private_visibility_matches_the_rule(
            role in arb_role(),
            is_creator in any::<bool>(),
            explicitly_allowed in any::<bool>(),
            group_allowed in any::<bool>(),
        ) {
            let mut user = principal(role);
            let group = Uuid::now_v7();
            user.groups.insert(group);
            let owner = if is_creator { user.user_id } else { Uuid::now_v7() };
            let mut board = board(owner, false);
            if explicitly_allowed {
                board.allowed_users.insert(user.user_id);
            }
            if group_allowed {
                board.allowed_roles.insert(group);
            }
            let expected = is_creator || explicitly_allowed || group_allowed || role.is_staff();
            let actor = Actor::User(user);
            prop_assert_eq!(can_view(&actor, &board), expected);
            prop_assert_eq!(BoardScope::for_actor(&actor).admits(&board), expected);
        }

        #[test]
        fn edit_rights_ignore_role(
            role in arb_role(),
            is_creator in any::<bool>(),
            explicitly_allowed in any::<bool>(),
            is_public in any::<bool>(),
        ) {
            let user = principal(role);
            let owner = if is_creator { user.user_id } else { Uuid::now_v7() };
            let mut board = board(owner, is_public);
            if explicitly_allowed {
                board.allowed_users.insert(user.user_id);
            }
            prop_assert_eq!(can_edit(&Actor::User(user), &board), is_creator || explicitly_allowed);
        }
    }
}
