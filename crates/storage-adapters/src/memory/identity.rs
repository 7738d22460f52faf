//! Users, role records and role-groups.

use std::collections::BTreeSet;
use std::sync::atomic::Ordering;

use async_trait::async_trait;
use dashmap::mapref::entry::Entry;
use domains::{
    InsertedUser, RepoError, RepoResult, RoleGroup, RoleGroupRepository, RoleRepository, User, UserRepository,
    UserRole,
};
use uuid::Uuid;

use super::{name_key, ordered, InMemoryStore};

#[async_trait]
impl UserRepository for InMemoryStore {
    async fn insert_user(&self, user: User) -> RepoResult<InsertedUser> {
        match self.usernames.entry(name_key(&user.username)) {
            Entry::Occupied(_) => Err(RepoError::Conflict(format!(
                "username \"{}\" is already taken",
                user.username
            ))),
            Entry::Vacant(slot) => {
                slot.insert(user.id);
                let first = !self.first_user.swap(true, Ordering::SeqCst);
                self.users.insert(user.id, self.stamp(user.clone()));
                Ok(InsertedUser { user, first })
            }
        }
    }

    async fn get_user(&self, id: Uuid) -> RepoResult<Option<User>> {
        Ok(self.users.get(&id).map(|row| row.value.clone()))
    }

    async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>> {
        let Some(id) = self.usernames.get(&name_key(username)).map(|id| *id) else {
            return Ok(None);
        };
        self.get_user(id).await
    }

    async fn list_users(&self) -> RepoResult<Vec<User>> {
        Ok(ordered(&self.users))
    }

    async fn count_users(&self) -> RepoResult<usize> {
        Ok(self.users.len())
    }
}

#[async_trait]
impl RoleRepository for InMemoryStore {
    async fn get_role(&self, user_id: Uuid) -> RepoResult<Option<UserRole>> {
        Ok(self.roles.get(&user_id).map(|r| r.clone()))
    }

    async fn put_role(&self, record: UserRole) -> RepoResult<UserRole> {
        if !self.users.contains_key(&record.user_id) {
            return Err(RepoError::not_found("user", record.user_id));
        }
        self.roles.insert(record.user_id, record.clone());
        Ok(record)
    }
}

#[async_trait]
impl RoleGroupRepository for InMemoryStore {
    async fn insert_group(&self, group: RoleGroup) -> RepoResult<RoleGroup> {
        match self.group_names.entry(name_key(&group.name)) {
            Entry::Occupied(_) => Err(RepoError::Conflict(format!(
                "role-group \"{}\" already exists",
                group.name
            ))),
            Entry::Vacant(slot) => {
                slot.insert(group.id);
                self.groups.insert(group.id, self.stamp(group.clone()));
                Ok(group)
            }
        }
    }

    async fn get_group(&self, id: Uuid) -> RepoResult<Option<RoleGroup>> {
        Ok(self.groups.get(&id).map(|row| row.value.clone()))
    }

    async fn list_groups(&self) -> RepoResult<Vec<RoleGroup>> {
        Ok(ordered(&self.groups))
    }

    async fn add_member(&self, group_id: Uuid, user_id: Uuid) -> RepoResult<RoleGroup> {
        if !self.users.contains_key(&user_id) {
            return Err(RepoError::not_found("user", user_id));
        }
        let mut row = self
            .groups
            .get_mut(&group_id)
            .ok_or_else(|| RepoError::not_found("role-group", group_id))?;
        row.value.members.insert(user_id);
        Ok(row.value.clone())
    }

    async fn remove_member(&self, group_id: Uuid, user_id: Uuid) -> RepoResult<RoleGroup> {
        let mut row = self
            .groups
            .get_mut(&group_id)
            .ok_or_else(|| RepoError::not_found("role-group", group_id))?;
        row.value.members.remove(&user_id);
        Ok(row.value.clone())
    }

    async fn groups_of(&self, user_id: Uuid) -> RepoResult<BTreeSet<Uuid>> {
        Ok(self
            .groups
            .iter()
            .filter(|row| row.value.has_member(user_id))
            .map(|row| *row.key())
            .collect())
    }
}
