use std::sync::Arc;

use domains::{
    MockBoardRepository, MockCommentRepository, MockFeedbackRepository, MockRoleGroupRepository,
    MockRoleRepository, MockTagRepository, MockUserRepository, Repositories,
};

pub(crate) use crate::policy::fixtures::{board, feedback, principal};

/// One mock per port; unset ports panic on any call.
#[derive(Default)]
pub(crate) struct MockPorts {
    pub users: MockUserRepository,
    pub roles: MockRoleRepository,
    pub groups: MockRoleGroupRepository,
    pub boards: MockBoardRepository,
    pub feedback: MockFeedbackRepository,
    pub comments: MockCommentRepository,
    pub tags: MockTagRepository,
}

impl MockPorts {
    pub fn into_repositories(self) -> Repositories {
        Repositories {
            users: Arc::new(self.users),
            roles: Arc::new(self.roles),
            groups: Arc::new(self.groups),
            boards: Arc::new(self.boards),
            feedback: Arc::new(self.feedback),
            comments: Arc::new(self.comments),
            tags: Arc::new(self.tags),
        }
    }
}

pub(crate) fn repos_with_boards(boards: MockBoardRepository) -> Repositories {
    MockPorts {
        boards,
        ..Default::default()
    }
    .into_repositories()
}
