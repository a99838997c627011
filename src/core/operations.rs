use crate::core::models::{GroupStatus, MemberStatus, User};
use crate::infrastructure::graphql::GraphqlRequest;
use serde::Deserialize;
use serde_json::json;

// Documents are written out in full per operation; the member and leader
// field lists mirror the server schema's Group shape.

const LOGIN: &str = "mutation Login($username: String!, $password: String!) {
  login(username: $username, password: $password) {
    token
    user { id name username }
  }
}";

const CREATE_GROUP: &str =
    "mutation CreateGroup($description: String!, $totalAmount: Float!, $leaderId: ID!) {
  createGroup(description: $description, totalAmount: $totalAmount, leaderId: $leaderId) {
    id
  }
}";

const JOIN_GROUP: &str = "mutation JoinGroup($groupId: ID!, $amount: Float!) {
  joinGroup(groupId: $groupId, amount: $amount) {
    id
    status
  }
}";

const GROUP: &str = "query Group($id: ID!) {
  group(id: $id) {
    id
    description
    totalAmount
    totalPeople
    status
    leader { id name username }
    members { id amount status user { id name username } }
  }
}";

const USER_GROUPS: &str = "query UserGroups($userId: ID!) {
  userGroups(userId: $userId) {
    id
    description
    totalAmount
    totalPeople
    status
    leader { id name username }
    members { id amount status user { id name username } }
  }
}";

const UPDATE_MEMBER_STATUS: &str =
    "mutation UpdateMemberStatus($groupId: ID!, $userId: ID!, $status: MemberStatus!) {
  updateMemberStatus(groupId: $groupId, userId: $userId, status: $status) {
    id
    status
  }
}";

const UPDATE_GROUP_STATUS: &str =
    "mutation UpdateGroupStatus($groupId: ID!, $status: GroupStatus!) {
  updateGroupStatus(groupId: $groupId, status: $status) {
    id
    status
  }
}";

const GENERATE_PAYMENT_CARD: &str = "mutation GeneratePaymentCard($groupId: ID!) {
  generatePaymentCard(groupId: $groupId) {
    id
    cardNumber
    amount
    status
    createdAt
  }
}";

const GROUP_STATUS_CHANGED: &str = "subscription GroupStatusChanged($groupId: ID!) {
  groupStatusChanged(groupId: $groupId) {
    id
    description
    totalAmount
    totalPeople
    status
    leader { id name username }
    members { id amount status user { id name username } }
  }
}";

const MEMBER_STATUS_CHANGED: &str = "subscription MemberStatusChanged($groupId: ID!) {
  memberStatusChanged(groupId: $groupId) {
    id
    amount
    status
    user { id name username }
  }
}";

pub fn login(username: &str, password: &str) -> GraphqlRequest {
    GraphqlRequest {
        operation: "Login",
        query: LOGIN,
        variables: json!({ "username": username, "password": password }),
    }
}

pub fn create_group(description: &str, total_amount: f64, leader_id: &str) -> GraphqlRequest {
    GraphqlRequest {
        operation: "CreateGroup",
        query: CREATE_GROUP,
        variables: json!({
            "description": description,
            "totalAmount": total_amount,
            "leaderId": leader_id,
        }),
    }
}

pub fn join_group(group_id: &str, amount: f64) -> GraphqlRequest {
    GraphqlRequest {
        operation: "JoinGroup",
        query: JOIN_GROUP,
        variables: json!({ "groupId": group_id, "amount": amount }),
    }
}

pub fn group(id: &str) -> GraphqlRequest {
    GraphqlRequest {
        operation: "Group",
        query: GROUP,
        variables: json!({ "id": id }),
    }
}

pub fn user_groups(user_id: &str) -> GraphqlRequest {
    GraphqlRequest {
        operation: "UserGroups",
        query: USER_GROUPS,
        variables: json!({ "userId": user_id }),
    }
}

pub fn update_member_status(group_id: &str, user_id: &str, status: &MemberStatus) -> GraphqlRequest {
    GraphqlRequest {
        operation: "UpdateMemberStatus",
        query: UPDATE_MEMBER_STATUS,
        variables: json!({ "groupId": group_id, "userId": user_id, "status": status }),
    }
}

pub fn update_group_status(group_id: &str, status: &GroupStatus) -> GraphqlRequest {
    GraphqlRequest {
        operation: "UpdateGroupStatus",
        query: UPDATE_GROUP_STATUS,
        variables: json!({ "groupId": group_id, "status": status }),
    }
}

pub fn generate_payment_card(group_id: &str) -> GraphqlRequest {
    GraphqlRequest {
        operation: "GeneratePaymentCard",
        query: GENERATE_PAYMENT_CARD,
        variables: json!({ "groupId": group_id }),
    }
}

pub fn group_status_changed(group_id: &str) -> GraphqlRequest {
    GraphqlRequest {
        operation: "GroupStatusChanged",
        query: GROUP_STATUS_CHANGED,
        variables: json!({ "groupId": group_id }),
    }
}

pub fn member_status_changed(group_id: &str) -> GraphqlRequest {
    GraphqlRequest {
        operation: "MemberStatusChanged",
        query: MEMBER_STATUS_CHANGED,
        variables: json!({ "groupId": group_id }),
    }
}

// Operation-specific payload shapes.

#[derive(Clone, Debug, Deserialize)]
pub struct AuthPayload {
    pub token: String,
    pub user: User,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CreatedGroup {
    pub id: String,
}

#[derive(Clone, Debug, Deserialize)]
pub struct MembershipPayload {
    pub id: String,
    pub status: MemberStatus,
}

#[derive(Clone, Debug, Deserialize)]
pub struct GroupStatusPayload {
    pub id: String,
    pub status: GroupStatus,
}
