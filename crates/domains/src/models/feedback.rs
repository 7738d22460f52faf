//! Feedback items, their status lifecycle, and upvotes.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::trimmed_within;
use crate::errors::ValidationError;

pub const TITLE_MIN_CHARS: usize = 3;
pub const TITLE_MAX_CHARS: usize = 255;
pub const DESCRIPTION_MIN_CHARS: usize = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeedbackStatus {
    #[default]
    Open,
    InProgress,
    Completed,
}

impl FeedbackStatus {
    /// Kanban column order.
    pub const ALL: [FeedbackStatus; 3] = [
        FeedbackStatus::Open,
        FeedbackStatus::InProgress,
        FeedbackStatus::Completed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FeedbackStatus::Open => "open",
            FeedbackStatus::InProgress => "in_progress",
            FeedbackStatus::Completed => "completed",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FeedbackStatus::Open => "Open",
            FeedbackStatus::InProgress => "In Progress",
            FeedbackStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for FeedbackStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FeedbackStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FeedbackStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s.trim())
            .ok_or_else(|| {
                ValidationError::new("status", format!("\"{}\" is not a valid choice", s.trim()))
            })
    }
}

/// Result of an upvote toggle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UpvoteOutcome {
    Upvoted,
    Unvoted,
}

/// A feedback item on exactly one board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub id: Uuid,
    /// Fixed at creation.
    pub board_id: Uuid,
    pub title: String,
    pub description: String,
    pub status: FeedbackStatus,
    pub tags: BTreeSet<Uuid>,
    /// One entry per upvoting user.
    pub upvotes: BTreeSet<Uuid>,
    /// Fixed at creation.
    pub created_by: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Feedback {
    pub fn create(
        input: NewFeedback,
        created_by: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let (title, description) = input.validate()?;
        Ok(Self {
            id: Uuid::now_v7(),
            board_id: input.board_id,
            title,
            description,
            status: FeedbackStatus::Open,
            tags: input.tags,
            upvotes: BTreeSet::new(),
            created_by,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn upvote_count(&self) -> usize {
        self.upvotes.len()
    }

    pub fn is_upvoted_by(&self, user_id: Uuid) -> bool {
        self.upvotes.contains(&user_id)
    }

    /// Set-membership toggle: removes an existing vote, otherwise adds one.
    pub fn toggle_upvote(&mut self, user_id: Uuid) -> UpvoteOutcome {
        if self.upvotes.remove(&user_id) {
            UpvoteOutcome::Unvoted
        } else {
            self.upvotes.insert(user_id);
            UpvoteOutcome::Upvoted
        }
    }

    pub fn apply(&mut self, patch: FeedbackPatch, now: DateTime<Utc>) -> Result<(), ValidationError> {
        if let Some(title) = patch.title {
            self.title = validate_title(&title)?;
        }
        if let Some(description) = patch.description {
            self.description = validate_description(&description)?;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(tags) = patch.tags {
            self.tags = tags;
        }
        self.updated_at = now;
        Ok(())
    }
}

fn validate_title(title: &str) -> Result<String, ValidationError> {
    trimmed_within("title", title, TITLE_MIN_CHARS, Some(TITLE_MAX_CHARS))
}

fn validate_description(description: &str) -> Result<String, ValidationError> {
    trimmed_within("description", description, DESCRIPTION_MIN_CHARS, None)
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewFeedback {
    pub board_id: Uuid,
    pub title: String,
    pub description: String,
    #[serde(default)]
    pub tags: BTreeSet<Uuid>,
}

impl NewFeedback {
    /// Returns the normalized `(title, description)`.
    pub fn validate(&self) -> Result<(String, String), ValidationError> {
        Ok((validate_title(&self.title)?, validate_description(&self.description)?))
    }
}

#[derive(Debug, Clone, Default)]
pub struct FeedbackPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<FeedbackStatus>,
    pub tags: Option<BTreeSet<Uuid>>,
}

/// Optional narrowing for feedback listings.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FeedbackFilter {
    pub board_id: Option<Uuid>,
    pub status: Option<FeedbackStatus>,
    pub tag: Option<Uuid>,
}

impl FeedbackFilter {
    pub fn matches(&self, feedback: &Feedback) -> bool {
        self.board_id.map_or(true, |id| feedback.board_id == id)
            && self.status.map_or(true, |s| feedback.status == s)
            && self.tag.map_or(true, |t| feedback.tags.contains(&t))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(title: &str, description: &str) -> NewFeedback {
        NewFeedback {
            board_id: Uuid::now_v7(),
            title: title.into(),
            description: description.into(),
            tags: BTreeSet::new(),
        }
    }

    #[test]
    fn short_title_is_a_validation_error() {
        let err = input("ok", "long enough description").validate().unwrap_err();
        assert_eq!(err.field, "title");
        assert!(input("Add dark mode", "Please add a dark theme").validate().is_ok());
    }

    #[test]
    fn description_needs_ten_trimmed_chars() {
        let err = input("Add dark mode", "   too short   ").validate().unwrap_err();
        assert_eq!(err.field, "description");
    }

    #[test]
    fn new_feedback_starts_open_without_votes() {
        let fb = Feedback::create(
            input("Add dark mode", "Please add a dark theme"),
            Uuid::now_v7(),
            Utc::now(),
        )
        .unwrap();
        assert_eq!(fb.status, FeedbackStatus::Open);
        assert_eq!(fb.upvote_count(), 0);
    }

    #[test]
    fn toggle_upvote_is_an_involution() {
        let mut fb = Feedback::create(
            input("Add dark mode", "Please add a dark theme"),
            Uuid::now_v7(),
            Utc::now(),
        )
        .unwrap();
        let voter = Uuid::now_v7();
        assert_eq!(fb.toggle_upvote(voter), UpvoteOutcome::Upvoted);
        assert!(fb.is_upvoted_by(voter));
        assert_eq!(fb.toggle_upvote(voter), UpvoteOutcome::Unvoted);
        assert_eq!(fb.upvote_count(), 0);
    }

    #[test]
    fn status_parsing_rejects_unknown_values() {
        assert_eq!("in_progress".parse::<FeedbackStatus>().unwrap(), FeedbackStatus::InProgress);
        let err = "archived".parse::<FeedbackStatus>().unwrap_err();
        assert_eq!(err.field, "status");
    }

    #[test]
    fn status_serializes_snake_case() {
        let json = serde_json::to_string(&FeedbackStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
        assert_eq!(FeedbackStatus::InProgress.label(), "In Progress");
    }

    #[test]
    fn filter_combines_all_criteria() {
        let mut fb = Feedback::create(
            input("Add dark mode", "Please add a dark theme"),
            Uuid::now_v7(),
            Utc::now(),
        )
        .unwrap();
        let tag = Uuid::now_v7();
        fb.tags.insert(tag);
        let filter = FeedbackFilter {
            board_id: Some(fb.board_id),
            status: Some(FeedbackStatus::Open),
            tag: Some(tag),
        };
        assert!(filter.matches(&fb));
        let other = FeedbackFilter {
            status: Some(FeedbackStatus::Completed),
            ..filter
        };
        assert!(!other.matches(&fb));
    }
}
