//! Threaded comments on feedback items.
//!
//! Replies point at their parent by id; there is no ownership link from
//! parent to child. Tree walks below use explicit stacks so arbitrarily deep
//! reply chains cannot exhaust the call stack.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::trimmed_within;
use crate::errors::ValidationError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    pub id: Uuid,
    /// Fixed at creation.
    pub feedback_id: Uuid,
    /// Fixed at creation.
    pub author_id: Uuid,
    /// `None` for top-level comments.
    pub parent_id: Option<Uuid>,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Comment {
    pub fn create(
        input: NewComment,
        author_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let content = input.validate()?;
        Ok(Self {
            id: Uuid::now_v7(),
            feedback_id: input.feedback_id,
            author_id,
            parent_id: input.parent_id,
            content,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn edit(&mut self, patch: CommentPatch, now: DateTime<Utc>) -> Result<(), ValidationError> {
        self.content = validate_content(&patch.content)?;
        self.updated_at = now;
        Ok(())
    }
}

fn validate_content(content: &str) -> Result<String, ValidationError> {
    trimmed_within("content", content, 1, None)
}

#[derive(Debug, Clone, Deserialize)]
pub struct NewComment {
    pub feedback_id: Uuid,
    #[serde(default)]
    pub parent_id: Option<Uuid>,
    pub content: String,
}

impl NewComment {
    pub fn validate(&self) -> Result<String, ValidationError> {
        validate_content(&self.content)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct CommentPatch {
    pub content: String,
}

/// A comment with its replies, as rendered on a feedback detail page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CommentNode {
    #[serde(flatten)]
    pub comment: Comment,
    pub replies: Vec<CommentNode>,
}

/// Returns `root` followed by every transitive reply to it.
///
/// `edges` is every `(comment_id, parent_id)` pair that may belong to the tree.
pub fn collect_subtree<I>(root: Uuid, edges: I) -> Vec<Uuid>
where
    I: IntoIterator<Item = (Uuid, Option<Uuid>)>,
{
    let mut children: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    for (id, parent) in edges {
        if let Some(parent) = parent {
            children.entry(parent).or_default().push(id);
        }
    }

    let mut seen = HashSet::new();
    let mut out = Vec::new();
    let mut stack = vec![root];
    while let Some(id) = stack.pop() {
        if !seen.insert(id) {
            continue;
        }
        out.push(id);
        if let Some(kids) = children.get(&id) {
            stack.extend(kids.iter().copied());
        }
    }
    out
}

/// Assembles a flat list of comments into reply trees.
///
/// Sibling order follows the input order. Comments whose parent is not in
/// the input are treated as roots.
pub fn build_thread(comments: Vec<Comment>) -> Vec<CommentNode> {
    let ids: HashSet<Uuid> = comments.iter().map(|c| c.id).collect();
    let mut children: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
    let mut roots = Vec::new();
    for c in &comments {
        match c.parent_id.filter(|p| ids.contains(p) && *p != c.id) {
            Some(parent) => children.entry(parent).or_default().push(c.id),
            None => roots.push(c.id),
        }
    }

    // Pre-order walk; reversing it yields every child before its parent.
    let mut order = Vec::with_capacity(comments.len());
    let mut visited = HashSet::new();
    let mut stack: Vec<Uuid> = roots.iter().rev().copied().collect();
    while let Some(id) = stack.pop() {
        if !visited.insert(id) {
            continue;
        }
        order.push(id);
        if let Some(kids) = children.get(&id) {
            stack.extend(kids.iter().rev().copied());
        }
    }

    let mut pending: HashMap<Uuid, Comment> = comments.into_iter().map(|c| (c.id, c)).collect();
    let mut built: HashMap<Uuid, CommentNode> = HashMap::new();
    for id in order.into_iter().rev() {
        let Some(comment) = pending.remove(&id) else {
            continue;
        };
        let replies = children
            .get(&id)
            .map(|kids| kids.iter().filter_map(|k| built.remove(k)).collect())
            .unwrap_or_default();
        built.insert(id, CommentNode { comment, replies });
    }

    roots.into_iter().filter_map(|id| built.remove(&id)).collect()
}
