//! # Board Service
//!
//! Board CRUD. Grants named on create or update must reference existing
//! users and role-groups.

use std::collections::BTreeSet;

use chrono::Utc;
use domains::{Actor, Board, BoardPatch, NewBoard, Repositories, ValidationError};
use tracing::instrument;
use uuid::Uuid;

use crate::error::Result;
use crate::policy::board::{self, BoardAction, BoardScope};
use crate::policy::{Action, EntityKind};
use crate::support::{load_board, require_principal};

#[derive(Clone)]
pub struct BoardService {
    repos: Repositories,
}

impl BoardService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    #[instrument(skip(self, actor, input), fields(name = %input.name))]
    pub async fn create(&self, actor: &Actor, input: NewBoard) -> Result<Board> {
        board::decide_create(actor).enforce(EntityKind::Board, Action::Create)?;
        let principal = require_principal(actor)?;
        self.ensure_grants_exist(Some(&input.allowed_users), Some(&input.allowed_roles))
            .await?;

        let board = Board::create(input, principal.user_id, Utc::now())?;
        let board = self.repos.boards.insert_board(board).await?;
        tracing::info!(board_id = %board.id, is_public = board.is_public, "board created");
        Ok(board)
    }

    pub async fn get(&self, actor: &Actor, id: Uuid) -> Result<Board> {
        let board = load_board(&self.repos, id).await?;
        board::decide(actor, BoardAction::View, &board).enforce(EntityKind::Board, Action::View)?;
        Ok(board)
    }

    /// Boards visible to `actor`, in creation order.
    pub async fn list(&self, actor: &Actor) -> Result<Vec<Board>> {
        let boards = self.repos.boards.list_boards().await?;
        Ok(BoardScope::for_actor(actor).apply(boards))
    }

    #[instrument(skip(self, actor, patch))]
    pub async fn update(&self, actor: &Actor, id: Uuid, patch: BoardPatch) -> Result<Board> {
        let mut board = load_board(&self.repos, id).await?;
        board::decide(actor, BoardAction::Update, &board)
            .enforce(EntityKind::Board, Action::Update)?;
        let (users, roles) = patch.grants();
        self.ensure_grants_exist(users, roles).await?;

        board.apply(patch, Utc::now())?;
        Ok(self.repos.boards.update_board(board).await?)
    }

    /// Deletes the board together with its feedback and their comments.
    #[instrument(skip(self, actor))]
    pub async fn delete(&self, actor: &Actor, id: Uuid) -> Result<()> {
        let board = load_board(&self.repos, id).await?;
        board::decide(actor, BoardAction::Delete, &board)
            .enforce(EntityKind::Board, Action::Delete)?;
        self.repos.boards.delete_board(id).await?;
        tracing::info!(board_id = %id, "board deleted");
        Ok(())
    }

    async fn ensure_grants_exist(
        &self,
        users: Option<&BTreeSet<Uuid>>,
        groups: Option<&BTreeSet<Uuid>>,
    ) -> Result<()> {
        for id in users.into_iter().flatten() {
            if self.repos.users.get_user(*id).await?.is_none() {
                return Err(ValidationError::new("allowed_users", format!("unknown user {id}")).into());
            }
        }
        for id in groups.into_iter().flatten() {
            if self.repos.groups.get_group(*id).await?.is_none() {
                return Err(
                    ValidationError::new("allowed_roles", format!("unknown role-group {id}")).into(),
                );
            }
        }
        Ok(())
    }
}
