//! In-memory implementation of every repository port.
//!
//! # Purpose
//! Backs local development, the demo binary and the test suites without any
//! external service. All state is lost on restart.
//!
//! # Consistency
//! - Records live in `DashMap`s keyed by id; single-record updates (including
//!   the upvote toggle) happen under the map's entry lock and are atomic.
//! - Unique names (usernames, tags, role-groups) are claimed through a
//!   separate index map with the entry API, so concurrent inserts of the same
//!   name cannot both succeed.
//! - Feedback patches are applied to the live row under its entry lock, so
//!   a concurrent upvote toggle is never overwritten by an older copy.
//! - Writes that reference another record (feedback on a board or tags,
//!   comments on feedback or a parent comment) and the deletes that remove
//!   those records all hold `cascade`. A reference is checked and stored in
//!   the same critical section as the delete that would invalidate it.
//! - `first_user` flips once, inside the username claim, which makes the
//!   first-user answer of `insert_user` exact under concurrent registration.
//!
//! # Ordering
//! Every insert takes the next value of a store-wide sequence. Listings sort
//! by it, which gives the insertion order the aggregate views rely on.

mod content;
mod identity;

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use domains::{Board, Comment, Feedback, Repositories, RoleGroup, Tag, User, UserRole};
use tokio::sync::Mutex;
use uuid::Uuid;

/// A record plus its insertion sequence number.
#[derive(Debug, Clone)]
struct Stored<T> {
    seq: u64,
    value: T,
}

#[derive(Default)]
pub struct InMemoryStore {
    seq: AtomicU64,
    cascade: Mutex<()>,

    first_user: AtomicBool,
    users: DashMap<Uuid, Stored<User>>,
    /// Lowercased username to user id.
    usernames: DashMap<String, Uuid>,
    roles: DashMap<Uuid, UserRole>,
    groups: DashMap<Uuid, Stored<RoleGroup>>,
    group_names: DashMap<String, Uuid>,

    boards: DashMap<Uuid, Stored<Board>>,
    feedback: DashMap<Uuid, Stored<Feedback>>,
    comments: DashMap<Uuid, Stored<Comment>>,
    tags: DashMap<Uuid, Stored<Tag>>,
    tag_names: DashMap<String, Uuid>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hands out the store as every repository port at once.
    pub fn repositories(self: Arc<Self>) -> Repositories {
        Repositories {
            users: self.clone(),
            roles: self.clone(),
            groups: self.clone(),
            boards: self.clone(),
            feedback: self.clone(),
            comments: self.clone(),
            tags: self,
        }
    }

    fn stamp<T>(&self, value: T) -> Stored<T> {
        Stored {
            seq: self.seq.fetch_add(1, Ordering::Relaxed),
            value,
        }
    }
}

/// Clones every value out of `map` in insertion order.
fn ordered<T: Clone>(map: &DashMap<Uuid, Stored<T>>) -> Vec<T> {
    let mut rows: Vec<(u64, T)> = map
        .iter()
        .map(|entry| (entry.seq, entry.value.clone()))
        .collect();
    rows.sort_by_key(|(seq, _)| *seq);
    rows.into_iter().map(|(_, value)| value).collect()
}

/// Unique-name index key.
fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}
