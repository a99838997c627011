mod service_tests;
mod view_tests;

use crate::core::models::{Group, GroupMember, GroupStatus, MemberStatus, User};
use crate::core::services::PaytoolService;
use crate::core::session::SessionContext;
use crate::infrastructure::graphql::in_memory::InMemoryTransport;

/// Service wired to a scripted transport, logged in as user "1"/"alice".
/// The transport clone is returned for scripting and assertions.
pub fn create_test_service() -> (PaytoolService<InMemoryTransport>, InMemoryTransport) {
    let transport = InMemoryTransport::new();
    let session = SessionContext::new("1", "alice").with_token("test-token");
    let service = PaytoolService::with_session(transport.clone(), session);
    (service, transport)
}

pub fn test_user(id: &str, name: &str) -> User {
    User {
        id: id.to_string(),
        name: name.to_string(),
        username: name.to_lowercase(),
    }
}

pub fn test_member(id: &str, user_id: &str, status: MemberStatus) -> GroupMember {
    GroupMember {
        id: id.to_string(),
        amount: 50.0,
        status,
        user: test_user(user_id, &format!("User {}", user_id)),
    }
}

pub fn test_group(id: &str, members: Vec<GroupMember>) -> Group {
    Group {
        id: id.to_string(),
        description: "Team dinner".to_string(),
        total_amount: 100.0,
        total_people: 2,
        status: GroupStatus::Pending,
        leader: test_user("1", "User 1"),
        members,
    }
}
