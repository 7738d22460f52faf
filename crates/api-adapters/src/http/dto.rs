//! Wire shapes that differ from the domain inputs.

use std::collections::BTreeSet;

use domains::{FeedbackFilter, FeedbackPatch, FeedbackStatus, ValidationError};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
}

/// Status arrives as a raw string so an unknown value reports on field `status`.
#[derive(Debug, Default, Deserialize)]
pub struct FeedbackPatchBody {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub tags: Option<BTreeSet<Uuid>>,
}

impl TryFrom<FeedbackPatchBody> for FeedbackPatch {
    type Error = ValidationError;

    fn try_from(body: FeedbackPatchBody) -> Result<Self, Self::Error> {
        Ok(FeedbackPatch {
            title: body.title,
            description: body.description,
            status: body.status.as_deref().map(str::parse).transpose()?,
            tags: body.tags,
        })
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct FeedbackQuery {
    pub board: Option<Uuid>,
    pub status: Option<String>,
    pub tag: Option<Uuid>,
}

impl TryFrom<FeedbackQuery> for FeedbackFilter {
    type Error = ValidationError;

    fn try_from(query: FeedbackQuery) -> Result<Self, Self::Error> {
        Ok(FeedbackFilter {
            board_id: query.board,
            status: query
                .status
                .as_deref()
                .map(str::parse::<FeedbackStatus>)
                .transpose()?,
            tag: query.tag,
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct BoardQuery {
    pub board_id: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct StatusChange {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct CommentQuery {
    pub feedback: Option<Uuid>,
}

#[derive(Debug, Deserialize)]
pub struct RoleAssignment {
    pub role: String,
}

#[derive(Debug, Deserialize)]
pub struct MemberRequest {
    pub user_id: Uuid,
}
