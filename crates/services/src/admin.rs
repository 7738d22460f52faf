//! # Admin Service
//!
//! User-role and role-group administration. Every mutation is admin-only;
//! listing role-groups is open to any authenticated user so board owners
//! can pick grant targets.

use std::collections::BTreeSet;

use chrono::Utc;
use domains::{
    role_of, Actor, NewRoleGroup, Repositories, Role, RoleGroup, UserRole, ValidationError,
};
use tracing::instrument;
use uuid::Uuid;

use crate::error::{Result, ServiceError};
use crate::identity::UserProfile;
use crate::policy::{admin, Action, EntityKind};
use crate::support::require_principal;

#[derive(Clone)]
pub struct AdminService {
    repos: Repositories,
}

impl AdminService {
    pub fn new(repos: Repositories) -> Self {
        Self { repos }
    }

    pub async fn list_users(&self, actor: &Actor) -> Result<Vec<UserProfile>> {
        admin::decide_manage(actor).enforce(EntityKind::User, Action::View)?;
        let users = self.repos.users.list_users().await?;
        let mut out = Vec::with_capacity(users.len());
        for user in users {
            let record = self.repos.roles.get_role(user.id).await?;
            out.push(UserProfile {
                role: role_of(record.as_ref()),
                user,
            });
        }
        Ok(out)
    }

    #[instrument(skip(self, actor))]
    pub async fn set_role(&self, actor: &Actor, user_id: Uuid, role: &str) -> Result<UserProfile> {
        admin::decide_manage(actor).enforce(EntityKind::User, Action::Manage)?;
        let role: Role = role.parse()?;
        let user = self
            .repos
            .users
            .get_user(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("user", user_id))?;

        let now = Utc::now();
        let record = match self.repos.roles.get_role(user_id).await? {
            Some(mut existing) => {
                existing.role = role;
                existing.updated_at = now;
                existing
            }
            None => UserRole::new(user_id, role, now),
        };
        let record = self.repos.roles.put_role(record).await?;
        tracing::info!(%user_id, role = %record.role, "role assigned");
        Ok(UserProfile {
            user,
            role: record.role,
        })
    }

    pub async fn list_groups(&self, actor: &Actor) -> Result<Vec<RoleGroup>> {
        require_principal(actor)?;
        Ok(self.repos.groups.list_groups().await?)
    }

    #[instrument(skip(self, actor, input), fields(name = %input.name))]
    pub async fn create_group(&self, actor: &Actor, input: NewRoleGroup) -> Result<RoleGroup> {
        admin::decide_manage(actor).enforce(EntityKind::RoleGroup, Action::Create)?;
        let name = input.validate()?;
        let group = RoleGroup {
            id: Uuid::now_v7(),
            name,
            description: input.description.trim().to_string(),
            members: BTreeSet::new(),
            created_at: Utc::now(),
        };
        Ok(self.repos.groups.insert_group(group).await?)
    }

    #[instrument(skip(self, actor))]
    pub async fn add_member(&self, actor: &Actor, group_id: Uuid, user_id: Uuid) -> Result<RoleGroup> {
        admin::decide_manage(actor).enforce(EntityKind::RoleGroup, Action::Update)?;
        if self.repos.users.get_user(user_id).await?.is_none() {
            return Err(ValidationError::new("user_id", format!("unknown user {user_id}")).into());
        }
        Ok(self.repos.groups.add_member(group_id, user_id).await?)
    }

    #[instrument(skip(self, actor))]
    pub async fn remove_member(
        &self,
        actor: &Actor,
        group_id: Uuid,
        user_id: Uuid,
    ) -> Result<RoleGroup> {
        admin::decide_manage(actor).enforce(EntityKind::RoleGroup, Action::Update)?;
        Ok(self.repos.groups.remove_member(group_id, user_id).await?)
    }
}
