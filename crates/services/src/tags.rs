//! # Tag Service
//!
//! Tags are readable by anyone and managed by staff.

use domains::{Actor, NewTag, Repositories, Tag, TagPatch};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{Result, ServiceError};
use crate::policy::{tag, Action, EntityKind};

#[derive(Clone)]
pub struct TagService {
    repos: Repositories,
}

impl TagService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    pub async fn list(&self, _actor: &Actor) -> Result<Vec<Tag>> {
        Ok(self.repos.tags.list_tags().await?)
    }

    pub async fn get(&self, _actor: &Actor, id: Uuid) -> Result<Tag> {
        self.repos
            .tags
            .get_tag(id)
            .await?
            .ok_or_else(|| ServiceError::not_found("tag", id))
    }

    #[instrument(skip(self, actor, input), fields(name = %input.name))]
    pub async fn create(&self, actor: &Actor, input: NewTag) -> Result<Tag> {
        tag::decide_manage(actor).enforce(EntityKind::Tag, Action::Create)?;
        let created = Tag::create(input)?;
        Ok(self.repos.tags.insert_tag(created).await?)
    }

    #[instrument(skip(self, actor, patch))]
    pub async fn update(&self, actor: &Actor, id: Uuid, patch: TagPatch) -> Result<Tag> {
        tag::decide_manage(actor).enforce(EntityKind::Tag, Action::Update)?;
        let mut found = self.get(actor, id).await?;
        found.rename(&patch.name)?;
        Ok(self.repos.tags.update_tag(found).await?)
    }

    /// Deleting a tag detaches it from every feedback item.
    #[instrument(skip(self, actor))]
    pub async fn delete(&self, actor: &Actor, id: Uuid) -> Result<()> {
        tag::decide_manage(actor).enforce(EntityKind::Tag, Action::Delete)?;
        self.get(actor, id).await?;
        self.repos.tags.delete_tag(id).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{principal, MockPorts};
    use domains::{RepoError, Role};

    #[tokio::test]
    async fn contributors_cannot_create_tags() {
        let mut ports = MockPorts::default();
        ports.tags.expect_insert_tag().never();
        let svc = TagService::new(ports.into_repositories());
        let err = svc
            .create(
                &Actor::User(principal(Role::Contributor)),
                NewTag { name: "ui".into() },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::PermissionDenied { .. }));
    }

    #[tokio::test]
    async fn duplicate_names_surface_as_conflicts() {
        let mut ports = MockPorts::default();
        ports
            .tags
            .expect_insert_tag()
            .returning(|t| Err(RepoError::Conflict(format!("tag \"{}\" already exists", t.name))));
        let svc = TagService::new(ports.into_repositories());
        let err = svc
            .create(
                &Actor::User(principal(Role::Moderator)),
                NewTag { name: "ui".into() },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
    }

    #[tokio::test]
    async fn overlong_names_fail_validation() {
        let svc = TagService::new(MockPorts::default().into_repositories());
        let err = svc
            .create(
                &Actor::User(principal(Role::Admin)),
                NewTag {
                    name: "x".repeat(51),
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }
}
