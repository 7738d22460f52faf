//! # Demo Data
//!
//! Populates an empty store with the demo users, role-groups, boards, tags
//! and feedback used for manual testing. Boards and feedback are created
//! through the services with the seeded users as actors, so every record
//! passes the same policy checks as a real request.

use std::collections::BTreeSet;

use chrono::Utc;
use domains::{
    Actor, NewBoard, NewFeedback, NewTag, NewUser, Role, RoleGroup, UserRole,
};
use uuid::Uuid;

use crate::error::{Result, ServiceError};
use crate::Services;

pub const DEMO_PASSWORD: &str = "testpass123";

/// What a seeding run created.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SeedSummary {
    pub users: usize,
    pub groups: usize,
    pub boards: usize,
    pub tags: usize,
    pub feedback: usize,
}

struct DemoUser {
    username: &'static str,
    email: &'static str,
    first_name: &'static str,
    role: Role,
    groups: &'static [&'static str],
}

const USERS: [DemoUser; 4] = [
    DemoUser {
        username: "admin_user",
        email: "admin@example.com",
        first_name: "Admin",
        role: Role::Admin,
        groups: &["Moderators", "Contributors", "Viewers"],
    },
    DemoUser {
        username: "moderator_user",
        email: "moderator@example.com",
        first_name: "Moderator",
        role: Role::Moderator,
        groups: &["Moderators", "Contributors"],
    },
    DemoUser {
        username: "regular_user",
        email: "user@example.com",
        first_name: "Regular",
        role: Role::Contributor,
        groups: &["Contributors"],
    },
    DemoUser {
        username: "test_user",
        email: "test@example.com",
        first_name: "Test",
        role: Role::Contributor,
        groups: &["Viewers"],
    },
];

const GROUPS: [(&str, &str); 3] = [
    ("Moderators", "Can moderate feedback and manage boards"),
    ("Contributors", "Can create feedback and view assigned boards"),
    ("Viewers", "Can only view public boards"),
];

const TAGS: [&str; 5] = ["Bug", "Feature", "Enhancement", "UI/UX", "Performance"];

impl Services {
    /// Seeds demo data into an empty store. Does nothing when any user exists.
    pub async fn seed_demo_data(&self) -> Result<SeedSummary> {
        let mut summary = SeedSummary::default();
        if self.repos.users.count_users().await? > 0 {
            tracing::info!("store already populated; skipping demo seed");
            return Ok(summary);
        }

        let now = Utc::now();
        let mut groups: Vec<RoleGroup> = Vec::new();
        for (name, description) in GROUPS {
            let group = RoleGroup {
                id: Uuid::now_v7(),
                name: name.into(),
                description: description.into(),
                members: BTreeSet::new(),
                created_at: now,
            };
            groups.push(self.repos.groups.insert_group(group).await?);
            summary.groups += 1;
        }

        let mut actors = Vec::with_capacity(USERS.len());
        for demo in &USERS {
            let profile = self
                .identity
                .register(NewUser {
                    username: demo.username.into(),
                    password: DEMO_PASSWORD.into(),
                    password_confirm: DEMO_PASSWORD.into(),
                    email: Some(demo.email.into()),
                    first_name: demo.first_name.into(),
                    last_name: "User".into(),
                })
                .await?;
            let user_id = profile.user.id;
            self.repos
                .roles
                .put_role(UserRole::new(user_id, demo.role, now))
                .await?;
            for group in groups.iter().filter(|g| demo.groups.contains(&g.name.as_str())) {
                self.repos.groups.add_member(group.id, user_id).await?;
            }
            actors.push(self.identity.resolve_actor(user_id).await?);
            summary.users += 1;
        }
        let [admin, _moderator, regular, _test] = <[Actor; 4]>::try_from(actors)
            .map_err(|_| ServiceError::Internal("demo users incomplete".into()))?;

        let mut tag_ids = Vec::with_capacity(TAGS.len());
        for name in TAGS {
            let tag = self.tags.create(&admin, NewTag { name: name.into() }).await?;
            tag_ids.push(tag.id);
            summary.tags += 1;
        }
        let tagged = |names: &[&str]| -> BTreeSet<Uuid> {
            TAGS.iter()
                .zip(&tag_ids)
                .filter(|(name, _)| names.contains(*name))
                .map(|(_, id)| *id)
                .collect()
        };

        let contributors = groups
            .iter()
            .find(|g| g.name == "Contributors")
            .map(|g| g.id)
            .into_iter()
            .collect();
        let product = self
            .boards
            .create(
                &admin,
                NewBoard {
                    name: "Product Feedback".into(),
                    description: "General product feedback and suggestions".into(),
                    is_public: true,
                    ..Default::default()
                },
            )
            .await?;
        let internal = self
            .boards
            .create(
                &admin,
                NewBoard {
                    name: "Internal Team".into(),
                    description: "Private board for internal team discussions.".into(),
                    is_public: false,
                    allowed_roles: contributors,
                    ..Default::default()
                },
            )
            .await?;
        let personal = self
            .boards
            .create(
                &regular,
                NewBoard {
                    name: "Regular User Notes".into(),
                    description: "Private board owned by regular_user.".into(),
                    ..Default::default()
                },
            )
            .await?;
        summary.boards += 3;

        let items = [
            (
                &regular,
                product.id,
                "Add dark mode support",
                "Users have been requesting dark mode for better user experience, especially for late-night usage.",
                "open",
                vec!["Feature", "UI/UX"],
            ),
            (
                &admin,
                internal.id,
                "Fix login page loading issue",
                "The login page sometimes takes too long to load, especially on slower connections.",
                "in_progress",
                vec!["Bug", "Performance"],
            ),
            (
                &regular,
                product.id,
                "Improve search functionality",
                "The current search could be more intuitive and faster. Consider adding filters and autocomplete.",
                "open",
                vec!["Enhancement", "UI/UX"],
            ),
            (
                &admin,
                product.id,
                "Add export feature",
                "Users need to export their data in various formats (PDF, CSV, Excel).",
                "completed",
                vec!["Feature"],
            ),
            (
                &regular,
                personal.id,
                "Mobile app crashes on startup",
                "The mobile app crashes immediately after launch on Android devices.",
                "open",
                vec!["Bug"],
            ),
        ];
        let mut created = Vec::with_capacity(items.len());
        for (actor, board_id, title, description, status, tag_names) in items {
            let view = self
                .feedback
                .create(
                    actor,
                    NewFeedback {
                        board_id,
                        title: title.into(),
                        description: description.into(),
                        tags: tagged(&tag_names),
                    },
                )
                .await?;
            if status != "open" {
                self.feedback
                    .change_status(actor, view.feedback.id, status)
                    .await?;
            }
            created.push(view.feedback.id);
            summary.feedback += 1;
        }

        if let [dark_mode, login, ..] = created.as_slice() {
            self.feedback.toggle_upvote(&admin, *dark_mode).await?;
            self.feedback.toggle_upvote(&regular, *login).await?;
            self.feedback.toggle_upvote(&admin, *login).await?;
        }

        tracing::info!(
            users = summary.users,
            groups = summary.groups,
            boards = summary.boards,
            feedback = summary.feedback,
            "demo data seeded"
        );
        Ok(summary)
    }
}
