use crate::core::errors::PaytoolError;
use crate::core::models::{GroupStatus, MemberStatus};
use crate::core::view::GroupView;
use crate::tests::{create_test_service, test_group, test_member};
use serde_json::json;

#[tokio::test]
async fn test_two_members_agreeing_promotes_group_once() {
    let _ = env_logger::try_init();
    let (service, transport) = create_test_service();

    let mut view = GroupView::new();
    view.load(test_group(
        "42",
        vec![
            test_member("m1", "1", MemberStatus::Pending),
            test_member("m2", "2", MemberStatus::Pending),
        ],
    ));

    // Member 1 (the session user) agrees: mutation goes out, invariant
    // still false, no promotion.
    transport
        .push_data(json!({ "updateMemberStatus": { "id": "m1", "status": "AGREED" } }))
        .await;
    service
        .set_member_status(&mut view, MemberStatus::Agreed)
        .await
        .unwrap();
    assert_eq!(transport.operations().await, vec!["UpdateMemberStatus"]);
    assert_eq!(view.group().unwrap().status, GroupStatus::Pending);

    // Member 2's agreement arrives as a push: invariant true, promotion
    // fires exactly once and the group goes ACTIVE.
    transport
        .push_data(json!({ "updateGroupStatus": { "id": "42", "status": "ACTIVE" } }))
        .await;
    service
        .apply_member_event(&mut view, test_member("m2", "2", MemberStatus::Agreed))
        .await
        .unwrap();
    assert_eq!(
        transport.operations().await,
        vec!["UpdateMemberStatus", "UpdateGroupStatus"]
    );
    assert_eq!(view.group().unwrap().status, GroupStatus::Active);

    // Further pushes while ACTIVE recompute but never re-promote.
    service
        .apply_member_event(&mut view, test_member("m1", "1", MemberStatus::Agreed))
        .await
        .unwrap();
    assert_eq!(
        transport.operations().await,
        vec!["UpdateMemberStatus", "UpdateGroupStatus"]
    );
}

#[tokio::test]
async fn test_api_error_reverts_optimistic_update() {
    let _ = env_logger::try_init();
    let (service, transport) = create_test_service();

    let mut view = GroupView::new();
    view.load(test_group(
        "42",
        vec![
            test_member("m1", "1", MemberStatus::Pending),
            test_member("m2", "2", MemberStatus::Agreed),
        ],
    ));
    let before = view.members().to_vec();

    transport.push_error("Not authorized").await;
    let err = service
        .set_member_status(&mut view, MemberStatus::Agreed)
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Not authorized");
    assert_eq!(view.members(), before.as_slice());
}

#[tokio::test]
async fn test_failed_promotion_is_not_retried_within_transition() {
    let _ = env_logger::try_init();
    let (service, transport) = create_test_service();

    let mut view = GroupView::new();
    view.load(test_group(
        "42",
        vec![test_member("m1", "1", MemberStatus::Pending)],
    ));

    transport.push_error("Group is locked").await;
    let err = service
        .apply_member_event(&mut view, test_member("m1", "1", MemberStatus::Agreed))
        .await
        .unwrap_err();
    assert!(matches!(err, PaytoolError::Api(_)));
    assert_eq!(view.group().unwrap().status, GroupStatus::Pending);

    // Same fully-agreed state: the failed promotion is not fired again.
    service
        .apply_member_event(&mut view, test_member("m1", "1", MemberStatus::Agreed))
        .await
        .unwrap();
    assert_eq!(transport.operations().await, vec!["UpdateGroupStatus"]);
}

#[tokio::test]
async fn test_fetch_group_maps_null_data_to_not_found() {
    let _ = env_logger::try_init();
    let (service, transport) = create_test_service();

    transport.push_data(json!({ "group": null })).await;
    let err = service.fetch_group("404").await.unwrap_err();

    assert!(matches!(err, PaytoolError::GroupNotFound(id) if id == "404"));
}

#[tokio::test]
async fn test_create_group_returns_new_id_with_leader_from_session() {
    let _ = env_logger::try_init();
    let (service, transport) = create_test_service();

    transport
        .push_data(json!({ "createGroup": { "id": "42" } }))
        .await;
    let id = service.create_group("Team dinner", 100.0).await.unwrap();
    assert_eq!(id, "42");

    let requests = transport.requests().await;
    assert_eq!(requests[0].0, "CreateGroup");
    assert_eq!(requests[0].1["leaderId"], "1");
}

#[tokio::test]
async fn test_join_group_sends_share_amount() {
    let _ = env_logger::try_init();
    let (service, transport) = create_test_service();

    transport
        .push_data(json!({ "joinGroup": { "id": "m7", "status": "PENDING" } }))
        .await;
    let membership = service.join_group("42", 25.0).await.unwrap();

    assert_eq!(membership.id, "m7");
    assert_eq!(membership.status, MemberStatus::Pending);
    let requests = transport.requests().await;
    assert_eq!(requests[0].1["amount"], 25.0);
}

#[tokio::test]
async fn test_login_sets_session_and_logout_clears_it() {
    let _ = env_logger::try_init();
    let transport = crate::infrastructure::graphql::in_memory::InMemoryTransport::new();
    let mut service = crate::core::services::PaytoolService::new(transport.clone());

    let err = service.user_groups().await.unwrap_err();
    assert!(matches!(err, PaytoolError::NotLoggedIn));

    transport
        .push_data(json!({
            "login": {
                "token": "jwt-abc",
                "user": { "id": "9", "name": "Bob", "username": "bob" }
            }
        }))
        .await;
    let session = service.login("bob", "hunter2").await.unwrap();
    assert_eq!(session.user_id, "9");
    assert_eq!(session.auth_token.as_deref(), Some("jwt-abc"));

    service.logout();
    let err = service.user_groups().await.unwrap_err();
    assert!(matches!(err, PaytoolError::NotLoggedIn));
}

#[tokio::test]
async fn test_resolve_invite_detects_existing_membership() {
    let _ = env_logger::try_init();
    let (service, transport) = create_test_service();

    let group = test_group("42", vec![test_member("m1", "1", MemberStatus::Agreed)]);
    transport
        .push_data(json!({ "group": serde_json::to_value(&group).unwrap() }))
        .await;

    match service
        .resolve_invite("https://host/invite/42")
        .await
        .unwrap()
    {
        crate::core::services::InviteTarget::AlreadyMember(g) => assert_eq!(g.id, "42"),
        other => panic!("expected AlreadyMember, got {:?}", other),
    }

    // Same link for a user who is not in the member list yet.
    let group = test_group("42", vec![test_member("m2", "2", MemberStatus::Pending)]);
    transport
        .push_data(json!({ "group": serde_json::to_value(&group).unwrap() }))
        .await;

    match service
        .resolve_invite("https://host/dashboard/join?groupId=42")
        .await
        .unwrap()
    {
        crate::core::services::InviteTarget::Joinable(g) => assert_eq!(g.id, "42"),
        other => panic!("expected Joinable, got {:?}", other),
    }
}

#[tokio::test]
async fn test_generate_payment_card_decodes_card() {
    let _ = env_logger::try_init();
    let (service, transport) = create_test_service();

    transport
        .push_data(json!({
            "generatePaymentCard": {
                "id": "c1",
                "cardNumber": "4000123412341234",
                "amount": 100.0,
                "status": "ACTIVE",
                "createdAt": "2025-06-01T12:30:00Z"
            }
        }))
        .await;

    let card = service.generate_payment_card("42").await.unwrap();
    assert_eq!(card.card_number, "4000123412341234");
    assert_eq!(card.status, "ACTIVE");
    assert_eq!(card.amount, 100.0);
}

#[tokio::test]
async fn test_unknown_group_status_is_kept_as_opaque_string() {
    let _ = env_logger::try_init();
    let (service, transport) = create_test_service();

    let mut group = serde_json::to_value(test_group("42", vec![])).unwrap();
    group["status"] = json!("ARCHIVED");
    transport.push_data(json!({ "group": group })).await;

    let fetched = service.fetch_group("42").await.unwrap();
    assert_eq!(fetched.status, GroupStatus::Other("ARCHIVED".to_string()));
    assert_eq!(fetched.status.to_string(), "ARCHIVED");
}
