//! Boards, feedback, comments and tags, with their cascades.

use std::collections::BTreeSet;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use domains::{
    collect_subtree, Board, BoardRepository, Comment, CommentRepository, Feedback,
    FeedbackPatch, FeedbackRepository, RepoError, RepoResult, Tag, TagRepository, UpvoteOutcome,
    ValidationError,
};
use uuid::Uuid;

use super::{name_key, ordered, InMemoryStore, Stored};

/// Replaces an existing record in place, keeping its insertion slot.
fn replace<T: Clone>(
    map: &DashMap<Uuid, Stored<T>>,
    entity: &'static str,
    id: Uuid,
    value: T,
) -> RepoResult<T> {
    let mut row = map
        .get_mut(&id)
        .ok_or_else(|| RepoError::not_found(entity, id))?;
    row.value = value.clone();
    Ok(value)
}

impl InMemoryStore {
    /// Callers hold `cascade`, which `delete_tag` also takes.
    fn ensure_tags_exist(&self, tags: &BTreeSet<Uuid>) -> RepoResult<()> {
        match tags.iter().find(|id| !self.tags.contains_key(*id)) {
            Some(id) => Err(ValidationError::new("tags", format!("unknown tag {id}")).into()),
            None => Ok(()),
        }
    }

    /// Removes every comment on the given feedback items. Returns how many.
    fn drop_comments_of(&self, feedback_ids: &[Uuid]) -> usize {
        let before = self.comments.len();
        self.comments
            .retain(|_, row| !feedback_ids.contains(&row.value.feedback_id));
        before - self.comments.len()
    }
}

#[async_trait]
impl BoardRepository for InMemoryStore {
    async fn insert_board(&self, board: Board) -> RepoResult<Board> {
        self.boards.insert(board.id, self.stamp(board.clone()));
        Ok(board)
    }

    async fn get_board(&self, id: Uuid) -> RepoResult<Option<Board>> {
        Ok(self.boards.get(&id).map(|row| row.value.clone()))
    }

    async fn list_boards(&self) -> RepoResult<Vec<Board>> {
        Ok(ordered(&self.boards))
    }

    async fn update_board(&self, board: Board) -> RepoResult<Board> {
        replace(&self.boards, "board", board.id, board)
    }

    async fn delete_board(&self, id: Uuid) -> RepoResult<()> {
        let _guard = self.cascade.lock().await;
        self.boards
            .remove(&id)
            .ok_or_else(|| RepoError::not_found("board", id))?;

        let feedback_ids: Vec<Uuid> = self
            .feedback
            .iter()
            .filter(|row| row.value.board_id == id)
            .map(|row| *row.key())
            .collect();
        for fid in &feedback_ids {
            self.feedback.remove(fid);
        }
        let comments = self.drop_comments_of(&feedback_ids);
        tracing::debug!(board_id = %id, feedback = feedback_ids.len(), comments, "board cascade removed");
        Ok(())
    }
}

#[async_trait]
impl FeedbackRepository for InMemoryStore {
    async fn insert_feedback(&self, feedback: Feedback) -> RepoResult<Feedback> {
        let _guard = self.cascade.lock().await;
        if !self.boards.contains_key(&feedback.board_id) {
            return Err(RepoError::not_found("board", feedback.board_id));
        }
        self.ensure_tags_exist(&feedback.tags)?;
        self.feedback.insert(feedback.id, self.stamp(feedback.clone()));
        Ok(feedback)
    }

    async fn get_feedback(&self, id: Uuid) -> RepoResult<Option<Feedback>> {
        Ok(self.feedback.get(&id).map(|row| row.value.clone()))
    }

    async fn list_feedback(&self) -> RepoResult<Vec<Feedback>> {
        Ok(ordered(&self.feedback))
    }

    async fn update_feedback(
        &self,
        id: Uuid,
        patch: FeedbackPatch,
        now: DateTime<Utc>,
    ) -> RepoResult<Feedback> {
        let _guard = self.cascade.lock().await;
        if let Some(tags) = &patch.tags {
            self.ensure_tags_exist(tags)?;
        }
        let mut row = self
            .feedback
            .get_mut(&id)
            .ok_or_else(|| RepoError::not_found("feedback", id))?;
        // Patch a copy so a rejected field leaves the row untouched.
        let mut next = row.value.clone();
        next.apply(patch, now)?;
        row.value = next.clone();
        Ok(next)
    }

    async fn delete_feedback(&self, id: Uuid) -> RepoResult<()> {
        let _guard = self.cascade.lock().await;
        self.feedback
            .remove(&id)
            .ok_or_else(|| RepoError::not_found("feedback", id))?;
        self.drop_comments_of(&[id]);
        Ok(())
    }

    async fn toggle_upvote(
        &self,
        feedback_id: Uuid,
        user_id: Uuid,
    ) -> RepoResult<(UpvoteOutcome, usize)> {
        let mut row = self
            .feedback
            .get_mut(&feedback_id)
            .ok_or_else(|| RepoError::not_found("feedback", feedback_id))?;
        let outcome = row.value.toggle_upvote(user_id);
        Ok((outcome, row.value.upvote_count()))
    }
}

#[async_trait]
impl CommentRepository for InMemoryStore {
    async fn insert_comment(&self, comment: Comment) -> RepoResult<Comment> {
        let _guard = self.cascade.lock().await;
        if !self.feedback.contains_key(&comment.feedback_id) {
            return Err(RepoError::not_found("feedback", comment.feedback_id));
        }
        if let Some(parent_id) = comment.parent_id {
            let same_thread = self
                .comments
                .get(&parent_id)
                .is_some_and(|parent| parent.value.feedback_id == comment.feedback_id);
            if !same_thread {
                return Err(ValidationError::new(
                    "parent",
                    "parent comment must belong to the same feedback",
                )
                .into());
            }
        }
        self.comments.insert(comment.id, self.stamp(comment.clone()));
        Ok(comment)
    }

    async fn get_comment(&self, id: Uuid) -> RepoResult<Option<Comment>> {
        Ok(self.comments.get(&id).map(|row| row.value.clone()))
    }

    async fn list_comments(&self, feedback_id: Option<Uuid>) -> RepoResult<Vec<Comment>> {
        let all = ordered(&self.comments);
        Ok(match feedback_id {
            Some(fid) => all.into_iter().filter(|c| c.feedback_id == fid).collect(),
            None => all,
        })
    }

    async fn update_comment(&self, comment: Comment) -> RepoResult<Comment> {
        replace(&self.comments, "comment", comment.id, comment)
    }

    async fn delete_comment(&self, id: Uuid) -> RepoResult<usize> {
        let _guard = self.cascade.lock().await;
        let feedback_id = self
            .comments
            .get(&id)
            .map(|row| row.value.feedback_id)
            .ok_or_else(|| RepoError::not_found("comment", id))?;
        let edges: Vec<(Uuid, Option<Uuid>)> = self
            .comments
            .iter()
            .filter(|row| row.value.feedback_id == feedback_id)
            .map(|row| (row.value.id, row.value.parent_id))
            .collect();

        let doomed = collect_subtree(id, edges);
        for cid in &doomed {
            self.comments.remove(cid);
        }
        Ok(doomed.len())
    }
}

#[async_trait]
impl TagRepository for InMemoryStore {
    async fn insert_tag(&self, tag: Tag) -> RepoResult<Tag> {
        match self.tag_names.entry(name_key(&tag.name)) {
            Entry::Occupied(_) => Err(RepoError::Conflict(format!(
                "tag \"{}\" already exists",
                tag.name
            ))),
            Entry::Vacant(slot) => {
                slot.insert(tag.id);
                self.tags.insert(tag.id, self.stamp(tag.clone()));
                Ok(tag)
            }
        }
    }

    async fn get_tag(&self, id: Uuid) -> RepoResult<Option<Tag>> {
        Ok(self.tags.get(&id).map(|row| row.value.clone()))
    }

    async fn list_tags(&self) -> RepoResult<Vec<Tag>> {
        Ok(ordered(&self.tags))
    }

    async fn update_tag(&self, tag: Tag) -> RepoResult<Tag> {
        let previous = self
            .tags
            .get(&tag.id)
            .map(|row| name_key(&row.value.name))
            .ok_or_else(|| RepoError::not_found("tag", tag.id))?;
        let wanted = name_key(&tag.name);
        if wanted != previous {
            match self.tag_names.entry(wanted) {
                Entry::Occupied(_) => {
                    return Err(RepoError::Conflict(format!(
                        "tag \"{}\" already exists",
                        tag.name
                    )))
                }
                Entry::Vacant(slot) => {
                    slot.insert(tag.id);
                }
            }
            self.tag_names.remove(&previous);
        }
        replace(&self.tags, "tag", tag.id, tag)
    }

    async fn delete_tag(&self, id: Uuid) -> RepoResult<()> {
        let _guard = self.cascade.lock().await;
        let (_, row) = self
            .tags
            .remove(&id)
            .ok_or_else(|| RepoError::not_found("tag", id))?;
        self.tag_names.remove(&name_key(&row.value.name));
        for mut item in self.feedback.iter_mut() {
            item.value.tags.remove(&id);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use domains::{FeedbackStatus, NewBoard, NewComment, NewFeedback, NewTag};
    use std::sync::Arc;

    fn tag_patch(tag_id: Uuid) -> FeedbackPatch {
        FeedbackPatch {
            tags: Some(BTreeSet::from([tag_id])),
            ..Default::default()
        }
    }

    fn status_patch(status: FeedbackStatus) -> FeedbackPatch {
        FeedbackPatch {
            status: Some(status),
            ..Default::default()
        }
    }

    async fn seeded_tag(store: &InMemoryStore, name: &str) -> Tag {
        store
            .insert_tag(Tag::create(NewTag { name: name.into() }).unwrap())
            .await
            .unwrap()
    }

    async fn seeded_board(store: &InMemoryStore) -> Board {
        let board = Board::create(
            NewBoard {
                name: "Roadmap".into(),
                is_public: true,
                ..Default::default()
            },
            Uuid::now_v7(),
            Utc::now(),
        )
        .unwrap();
        store.insert_board(board).await.unwrap()
    }

    async fn seeded_feedback(store: &InMemoryStore, board: &Board) -> Feedback {
        let item = Feedback::create(
            NewFeedback {
                board_id: board.id,
                title: "Dark mode".into(),
                description: "Please add a dark theme".into(),
                tags: BTreeSet::new(),
            },
            Uuid::now_v7(),
            Utc::now(),
        )
        .unwrap();
        store.insert_feedback(item).await.unwrap()
    }

    async fn reply(store: &InMemoryStore, feedback: &Feedback, parent: Option<Uuid>) -> Comment {
        let c = Comment::create(
            NewComment {
                feedback_id: feedback.id,
                parent_id: parent,
                content: "me too".into(),
            },
            Uuid::now_v7(),
            Utc::now(),
        )
        .unwrap();
        store.insert_comment(c).await.unwrap()
    }

    #[tokio::test]
    async fn deleting_a_board_cascades_to_feedback_and_comments() {
        let store = InMemoryStore::new();
        let board = seeded_board(&store).await;
        let other = seeded_board(&store).await;
        let doomed = seeded_feedback(&store, &board).await;
        let kept = seeded_feedback(&store, &other).await;
        reply(&store, &doomed, None).await;
        let survivor = reply(&store, &kept, None).await;

        store.delete_board(board.id).await.unwrap();

        assert!(store.get_feedback(doomed.id).await.unwrap().is_none());
        assert_eq!(store.list_comments(None).await.unwrap(), vec![survivor]);
        assert_eq!(store.list_feedback().await.unwrap(), vec![kept]);
    }

    #[tokio::test]
    async fn deleting_a_comment_removes_its_whole_subtree() {
        let store = InMemoryStore::new();
        let board = seeded_board(&store).await;
        let item = seeded_feedback(&store, &board).await;
        let root = reply(&store, &item, None).await;
        let child = reply(&store, &item, Some(root.id)).await;
        reply(&store, &item, Some(child.id)).await;
        let sibling = reply(&store, &item, None).await;

        assert_eq!(store.delete_comment(root.id).await.unwrap(), 3);
        assert_eq!(store.list_comments(Some(item.id)).await.unwrap(), vec![sibling]);
    }

    #[tokio::test]
    async fn deep_reply_chains_delete_without_recursion() {
        let store = InMemoryStore::new();
        let board = seeded_board(&store).await;
        let item = seeded_feedback(&store, &board).await;
        let root = reply(&store, &item, None).await;
        let mut parent = root.id;
        for _ in 0..2_000 {
            parent = reply(&store, &item, Some(parent)).await.id;
        }
        assert_eq!(store.delete_comment(root.id).await.unwrap(), 2_001);
    }

    #[tokio::test]
    async fn concurrent_toggles_by_distinct_users_all_count() {
        let store = Arc::new(InMemoryStore::new());
        let board = seeded_board(&store).await;
        let id = seeded_feedback(&store, &board).await.id;

        let handles: Vec<_> = (0..32)
            .map(|_| {
                let store = store.clone();
                tokio::spawn(async move { store.toggle_upvote(id, Uuid::now_v7()).await })
            })
            .collect();
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        let stored = store.get_feedback(id).await.unwrap().unwrap();
        assert_eq!(stored.upvote_count(), 32);
    }

    #[tokio::test]
    async fn toggle_twice_is_a_no_op() {
        let store = InMemoryStore::new();
        let board = seeded_board(&store).await;
        let item = seeded_feedback(&store, &board).await;
        let voter = Uuid::now_v7();

        assert_eq!(
            store.toggle_upvote(item.id, voter).await.unwrap(),
            (UpvoteOutcome::Upvoted, 1)
        );
        assert_eq!(
            store.toggle_upvote(item.id, voter).await.unwrap(),
            (UpvoteOutcome::Unvoted, 0)
        );
    }

    #[tokio::test]
    async fn patching_a_stale_copy_keeps_votes_cast_in_between() {
        let store = InMemoryStore::new();
        let board = seeded_board(&store).await;
        let tag = seeded_tag(&store, "UX").await;
        let stale = seeded_feedback(&store, &board).await;
        store
            .update_feedback(stale.id, tag_patch(tag.id), Utc::now())
            .await
            .unwrap();
        store.toggle_upvote(stale.id, Uuid::now_v7()).await.unwrap();

        let patched = store
            .update_feedback(stale.id, status_patch(FeedbackStatus::Completed), Utc::now())
            .await
            .unwrap();
        assert_eq!(patched.status, FeedbackStatus::Completed);
        assert_eq!(patched.upvote_count(), 1);
        assert_eq!(patched.tags, BTreeSet::from([tag.id]));
        assert_eq!(store.get_feedback(stale.id).await.unwrap().unwrap(), patched);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn votes_survive_concurrent_status_changes() {
        let store = Arc::new(InMemoryStore::new());
        let board = seeded_board(&store).await;
        let id = seeded_feedback(&store, &board).await.id;

        let mut handles = Vec::new();
        for n in 0..32 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                if n % 2 == 0 {
                    store.toggle_upvote(id, Uuid::now_v7()).await.map(|_| ())
                } else {
                    store
                        .update_feedback(id, status_patch(FeedbackStatus::InProgress), Utc::now())
                        .await
                        .map(|_| ())
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }
        let stored = store.get_feedback(id).await.unwrap().unwrap();
        assert_eq!(stored.upvote_count(), 16);
        assert_eq!(stored.status, FeedbackStatus::InProgress);
    }

    #[tokio::test]
    async fn rejected_patch_leaves_the_record_untouched() {
        let store = InMemoryStore::new();
        let board = seeded_board(&store).await;
        let item = seeded_feedback(&store, &board).await;
        let patch = FeedbackPatch {
            title: Some("Brand new title".into()),
            description: Some("short".into()),
            ..Default::default()
        };

        assert!(matches!(
            store.update_feedback(item.id, patch, Utc::now()).await.unwrap_err(),
            RepoError::Invalid(_)
        ));
        assert_eq!(store.get_feedback(item.id).await.unwrap().unwrap(), item);
    }

    #[tokio::test]
    async fn tagging_with_a_deleted_tag_is_rejected() {
        let store = InMemoryStore::new();
        let board = seeded_board(&store).await;
        let tag = seeded_tag(&store, "Bug").await;
        let item = seeded_feedback(&store, &board).await;
        store.delete_tag(tag.id).await.unwrap();

        match store
            .update_feedback(item.id, tag_patch(tag.id), Utc::now())
            .await
            .unwrap_err()
        {
            RepoError::Invalid(v) => assert_eq!(v.field, "tags"),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(store.get_feedback(item.id).await.unwrap().unwrap().tags.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_tag_deletes_leave_no_dangling_ids() {
        let store = Arc::new(InMemoryStore::new());
        let board = seeded_board(&store).await;
        let id = seeded_feedback(&store, &board).await.id;

        for n in 0..16 {
            let tag_id = seeded_tag(&store, &format!("tag{n}")).await.id;
            let tagger = {
                let store = store.clone();
                tokio::spawn(async move {
                    store.update_feedback(id, tag_patch(tag_id), Utc::now()).await
                })
            };
            let deleter = {
                let store = store.clone();
                tokio::spawn(async move { store.delete_tag(tag_id).await })
            };
            deleter.await.unwrap().unwrap();
            // Either order is fine; only a stored dangling id is not.
            let _ = tagger.await.unwrap();
            let stored = store.get_feedback(id).await.unwrap().unwrap();
            assert!(!stored.tags.contains(&tag_id));
        }
    }

    #[tokio::test]
    async fn replies_need_a_live_parent_on_the_same_feedback() {
        let store = InMemoryStore::new();
        let board = seeded_board(&store).await;
        let item = seeded_feedback(&store, &board).await;
        let other = seeded_feedback(&store, &board).await;
        let parent = reply(&store, &item, None).await;
        let elsewhere = reply(&store, &other, None).await;
        store.delete_comment(parent.id).await.unwrap();

        for parent_id in [parent.id, elsewhere.id] {
            let orphan = Comment::create(
                NewComment {
                    feedback_id: item.id,
                    parent_id: Some(parent_id),
                    content: "me too".into(),
                },
                Uuid::now_v7(),
                Utc::now(),
            )
            .unwrap();
            match store.insert_comment(orphan).await.unwrap_err() {
                RepoError::Invalid(v) => assert_eq!(v.field, "parent"),
                other => panic!("unexpected error: {other:?}"),
            }
        }
        assert!(store.list_comments(Some(item.id)).await.unwrap().is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn replies_racing_a_subtree_delete_never_orphan() {
        let store = Arc::new(InMemoryStore::new());
        let board = seeded_board(&store).await;
        let item = seeded_feedback(&store, &board).await;

        for _ in 0..16 {
            let root_id = reply(&store, &item, None).await.id;
            let replier = {
                let store = store.clone();
                let feedback_id = item.id;
                tokio::spawn(async move {
                    let c = Comment::create(
                        NewComment {
                            feedback_id,
                            parent_id: Some(root_id),
                            content: "me too".into(),
                        },
                        Uuid::now_v7(),
                        Utc::now(),
                    )
                    .unwrap();
                    store.insert_comment(c).await
                })
            };
            let deleter = {
                let store = store.clone();
                tokio::spawn(async move { store.delete_comment(root_id).await })
            };
            deleter.await.unwrap().unwrap();
            let _ = replier.await.unwrap();
        }

        let left = store.list_comments(Some(item.id)).await.unwrap();
        assert!(left
            .iter()
            .all(|c| c.parent_id.map_or(true, |p| left.iter().any(|other| other.id == p))));
    }

    #[tokio::test]
    async fn deleting_a_tag_detaches_it_from_feedback() {
        let store = InMemoryStore::new();
        let board = seeded_board(&store).await;
        let tag = seeded_tag(&store, "Bug").await;
        let item = seeded_feedback(&store, &board).await;
        store
            .update_feedback(item.id, tag_patch(tag.id), Utc::now())
            .await
            .unwrap();

        store.delete_tag(tag.id).await.unwrap();
        let stored = store.get_feedback(item.id).await.unwrap().unwrap();
        assert!(stored.tags.is_empty());
        // The name is free again.
        store
            .insert_tag(Tag::create(NewTag { name: "bug".into() }).unwrap())
            .await
            .unwrap();
    }

    #[test]
    fn renaming_onto_an_existing_tag_conflicts() {
        tokio_test::block_on(async {
            let store = InMemoryStore::new();
            store
                .insert_tag(Tag::create(NewTag { name: "UI".into() }).unwrap())
                .await
                .unwrap();
            let mut perf = store
                .insert_tag(Tag::create(NewTag { name: "Perf".into() }).unwrap())
                .await
                .unwrap();
            perf.rename("ui").unwrap();
            assert!(matches!(
                store.update_tag(perf).await.unwrap_err(),
                RepoError::Conflict(_)
            ));
        });
    }

    #[tokio::test]
    async fn feedback_cannot_attach_to_a_missing_board() {
        let store = InMemoryStore::new();
        let ghost = Board::create(
            NewBoard {
                name: "Ghost".into(),
                ..Default::default()
            },
            Uuid::now_v7(),
            Utc::now(),
        )
        .unwrap();
        let item = Feedback::create(
            NewFeedback {
                board_id: ghost.id,
                title: "Dark mode".into(),
                description: "Please add a dark theme".into(),
                tags: BTreeSet::new(),
            },
            Uuid::now_v7(),
            Utc::now(),
        )
        .unwrap();
        assert!(matches!(
            store.insert_feedback(item).await.unwrap_err(),
            RepoError::NotFound { entity: "board", .. }
        ));
    }
}
