//! # Identity Service
//!
//! Registration, login and per-request actor resolution. Password hashing
//! and token handling are delegated to the identity-provider ports; hashing
//! and verification run on tokio's blocking pool.

use std::sync::Arc;

use chrono::Utc;
use domains::{
    role_of, Actor, InsertedUser, IssuedToken, NewUser, PasswordHasher, Principal, Repositories,
    Role, TokenCodec, User, UserRole,
};
use serde::Serialize;
use tracing::instrument;
use uuid::Uuid;

use crate::error::{Result, ServiceError};

#[derive(Debug, Clone, Copy)]
pub struct IdentityOptions {
    /// Promote the very first registered user to admin.
    pub first_user_is_admin: bool,
}

impl Default for IdentityOptions {
    fn default() -> Self {
        Self {
            first_user_is_admin: true,
        }
    }
}

/// A user together with their resolved role.
#[derive(Debug, Clone, Serialize)]
pub struct UserProfile {
    #[serde(flatten)]
    pub user: User,
    pub role: Role,
}

#[derive(Clone)]
pub struct IdentityService {
    repos: Repositories,
    hasher: Arc<dyn PasswordHasher>,
    tokens: Arc<dyn TokenCodec>,
    options: IdentityOptions,
}

impl IdentityService {
    pub fn new(
        repos: Repositories,
        hasher: Arc<dyn PasswordHasher>,
        tokens: Arc<dyn TokenCodec>,
        options: IdentityOptions,
    ) -> Self {
        Self {
            repos,
            hasher,
            tokens,
            options,
        }
    }

    /// Creates the account, then attaches its role record best-effort.
    #[instrument(skip(self, input), fields(username = %input.username))]
    pub async fn register(&self, input: NewUser) -> Result<UserProfile> {
        let username = input.validate()?;
        if self.repos.users.find_by_username(&username).await?.is_some() {
            return Err(ServiceError::Conflict(format!(
                "username \"{username}\" is already taken"
            )));
        }

        let password_hash = self.hash_password(input.password).await?;
        let user = User {
            id: Uuid::now_v7(),
            username,
            email: input
                .email
                .map(|e| e.trim().to_string())
                .filter(|e| !e.is_empty()),
            first_name: input.first_name.trim().to_string(),
            last_name: input.last_name.trim().to_string(),
            password_hash,
            date_joined: Utc::now(),
        };
        let InsertedUser { user, first } = self.repos.users.insert_user(user).await?;

        let wanted = if first && self.options.first_user_is_admin {
            Role::Admin
        } else {
            Role::Contributor
        };
        let role = self.attach_role_best_effort(&user, wanted).await;
        tracing::info!(user_id = %user.id, %role, "user registered");
        Ok(UserProfile { user, role })
    }

    /// Argon2 is CPU-bound; it runs on the blocking pool.
    async fn hash_password(&self, password: String) -> Result<String> {
        let hasher = self.hasher.clone();
        let hashed = tokio::task::spawn_blocking(move || hasher.hash_password(&password))
            .await
            .map_err(|err| ServiceError::Internal(format!("password hashing task failed: {err}")))??;
        Ok(hashed)
    }

    async fn verify_password(&self, password: &str, hash: &str) -> Result<bool> {
        let hasher = self.hasher.clone();
        let (password, hash) = (password.to_owned(), hash.to_owned());
        tokio::task::spawn_blocking(move || hasher.verify_password(&password, &hash))
            .await
            .map_err(|err| ServiceError::Internal(format!("password check task failed: {err}")))
    }

    /// A failed role attach must not fail registration; the user falls back
    /// to the implicit contributor role.
    async fn attach_role_best_effort(&self, user: &User, role: Role) -> Role {
        match self
            .repos
            .roles
            .put_role(UserRole::new(user.id, role, Utc::now()))
            .await
        {
            Ok(record) => record.role,
            Err(err) => {
                tracing::warn!(
                    user_id = %user.id,
                    username = %user.username,
                    error = %err,
                    "could not attach role record; continuing with default role"
                );
                role_of(None)
            }
        }
    }

    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<IssuedToken> {
        let user = self
            .repos
            .users
            .find_by_username(username.trim())
            .await?
            .ok_or(ServiceError::InvalidCredentials)?;
        if !self.verify_password(password, &user.password_hash).await? {
            tracing::debug!(user_id = %user.id, "password mismatch");
            return Err(ServiceError::InvalidCredentials);
        }
        Ok(self.tokens.issue(user.id)?)
    }

    /// Maps an optional bearer token to the request's actor.
    pub async fn authenticate(&self, bearer: Option<&str>) -> Result<Actor> {
        let Some(token) = bearer else {
            return Ok(Actor::Anonymous);
        };
        let user_id = self.tokens.verify(token).map_err(|err| {
            tracing::debug!(error = %err, "rejected bearer token");
            ServiceError::Unauthenticated
        })?;
        self.resolve_actor(user_id).await
    }

    /// Loads user, role record and group memberships into a `Principal`.
    pub async fn resolve_actor(&self, user_id: Uuid) -> Result<Actor> {
        let user = self
            .repos
            .users
            .get_user(user_id)
            .await?
            .ok_or(ServiceError::Unauthenticated)?;
        let record = self.repos.roles.get_role(user_id).await?;
        let groups = self.repos.groups.groups_of(user_id).await?;
        Ok(Actor::User(Principal {
            user_id,
            username: user.username,
            role: role_of(record.as_ref()),
            groups,
        }))
    }

    /// The current user's own profile.
    pub async fn me(&self, actor: &Actor) -> Result<UserProfile> {
        let principal = actor.principal().ok_or(ServiceError::Unauthenticated)?;
        let user = self
            .repos
            .users
            .get_user(principal.user_id)
            .await?
            .ok_or(ServiceError::Unauthenticated)?;
        Ok(UserProfile {
            user,
            role: principal.role,
        })
    }
}
