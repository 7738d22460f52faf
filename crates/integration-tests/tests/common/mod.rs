//! Shared wiring: real adapters over a fresh in-memory store.

#![allow(dead_code)]

use std::sync::Arc;

use auth_adapters::{Argon2PasswordHasher, JwtTokenCodec};
use domains::{Actor, NewBoard, NewUser};
use secrecy::SecretString;
use services::{IdentityOptions, Services};
use storage_adapters::InMemoryStore;
use uuid::Uuid;

pub const PASSWORD: &str = "correct horse";

pub fn services() -> Services {
    let repos = Arc::new(InMemoryStore::new()).repositories();
    let secret = SecretString::from("integration-secret".to_string());
    Services::new(
        repos,
        Arc::new(Argon2PasswordHasher::new()),
        Arc::new(JwtTokenCodec::new(&secret, 3600)),
        IdentityOptions::default(),
    )
}

pub fn new_user(username: &str) -> NewUser {
    NewUser {
        username: username.into(),
        password: PASSWORD.into(),
        password_confirm: PASSWORD.into(),
        email: None,
        first_name: String::new(),
        last_name: String::new(),
    }
}

/// Registers `username` and resolves it the way a request would.
pub async fn register(services: &Services, username: &str) -> Actor {
    let profile = services
        .identity
        .register(new_user(username))
        .await
        .unwrap();
    services.identity.resolve_actor(profile.user.id).await.unwrap()
}

/// Group memberships are captured at resolution time.
pub async fn refresh(services: &Services, actor: &Actor) -> Actor {
    services
        .identity
        .resolve_actor(actor.user_id().unwrap())
        .await
        .unwrap()
}

pub fn board(name: &str, is_public: bool) -> NewBoard {
    NewBoard {
        name: name.into(),
        is_public,
        ..Default::default()
    }
}

pub fn id(actor: &Actor) -> Uuid {
    actor.user_id().unwrap()
}
