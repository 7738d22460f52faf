//! Flat, globally shared labels. Names are unique.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::trimmed_within;
use crate::errors::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub id: Uuid,
    pub name: String,
}

impl Tag {
    pub fn create(input: NewTag) -> Result<Self, ValidationError> {
        Ok(Self {
            id: Uuid::now_v7(),
            name: validate_tag_name(&input.name)?,
        })
    }

    pub fn rename(&mut self, name: &str) -> Result<(), ValidationError> {
        self.name = validate_tag_name(name)?;
        Ok(())
    }
}

fn validate_tag_name(name: &str) -> Result<String, ValidationError> {
    trimmed_within("name", name, 1, Some(50))
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewTag {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TagPatch {
    pub name: String,
}
