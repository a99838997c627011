use crate::core::models::{GroupStatus, MemberStatus};
use crate::core::view::{GroupView, reconcile};
use crate::tests::{test_group, test_member};
use std::collections::HashSet;

#[test]
fn test_fully_agreed_requires_nonempty_unanimous_list() {
    let _ = env_logger::try_init();

    let empty = test_group("g1", vec![]);
    assert!(!empty.is_fully_agreed());

    let unanimous = test_group(
        "g1",
        vec![
            test_member("m1", "1", MemberStatus::Agreed),
            test_member("m2", "2", MemberStatus::Agreed),
        ],
    );
    assert!(unanimous.is_fully_agreed());

    let split = test_group(
        "g1",
        vec![
            test_member("m1", "1", MemberStatus::Agreed),
            test_member("m2", "2", MemberStatus::Pending),
        ],
    );
    assert!(!split.is_fully_agreed());
}

#[test]
fn test_revert_restores_pre_edit_member_list() {
    let _ = env_logger::try_init();
    let mut view = GroupView::new();
    view.load(test_group(
        "g1",
        vec![
            test_member("m1", "1", MemberStatus::Pending),
            test_member("m2", "2", MemberStatus::Agreed),
        ],
    ));
    let before = view.members().to_vec();

    assert!(view.stage_member_status("m1", MemberStatus::Agreed));
    assert_eq!(view.member_status("m1"), Some(&MemberStatus::Agreed));

    view.revert();
    assert_eq!(view.members(), before.as_slice());
}

#[test]
fn test_push_overwrites_optimistic_value() {
    let _ = env_logger::try_init();
    let mut view = GroupView::new();
    view.load(test_group(
        "g1",
        vec![test_member("m1", "1", MemberStatus::Pending)],
    ));

    view.stage_member_status("m1", MemberStatus::Agreed);
    view.apply_member_push(test_member("m1", "1", MemberStatus::Disagreed));

    assert_eq!(view.member_status("m1"), Some(&MemberStatus::Disagreed));
}

#[test]
fn test_revert_is_skipped_once_push_confirmed_the_edit() {
    let _ = env_logger::try_init();
    let mut view = GroupView::new();
    view.load(test_group(
        "g1",
        vec![test_member("m1", "1", MemberStatus::Pending)],
    ));

    view.stage_member_status("m1", MemberStatus::Agreed);
    // Confirmation lands before the mutation result does.
    view.apply_member_push(test_member("m1", "1", MemberStatus::Agreed));
    view.revert();

    assert_eq!(view.member_status("m1"), Some(&MemberStatus::Agreed));
}

#[test]
fn test_member_push_appends_newly_joined_member() {
    let _ = env_logger::try_init();
    let mut view = GroupView::new();
    view.load(test_group(
        "g1",
        vec![test_member("m1", "1", MemberStatus::Agreed)],
    ));

    view.apply_member_push(test_member("m2", "2", MemberStatus::Pending));

    assert_eq!(view.members().len(), 2);
    assert_eq!(view.member_status("m2"), Some(&MemberStatus::Pending));
}

#[test]
fn test_detached_view_ignores_pushes() {
    let _ = env_logger::try_init();
    let mut view = GroupView::new();
    view.load(test_group(
        "g1",
        vec![test_member("m1", "1", MemberStatus::Pending)],
    ));

    view.detach();
    view.apply_member_push(test_member("m1", "1", MemberStatus::Agreed));
    let mut pushed = test_group("g1", vec![test_member("m1", "1", MemberStatus::Agreed)]);
    pushed.status = GroupStatus::Active;
    view.apply_group_push(pushed);

    assert_eq!(view.member_status("m1"), Some(&MemberStatus::Pending));
    assert_eq!(view.group().unwrap().status, GroupStatus::Pending);
}

#[test]
fn test_group_push_for_other_group_is_ignored() {
    let _ = env_logger::try_init();
    let mut view = GroupView::new();
    view.load(test_group(
        "g1",
        vec![test_member("m1", "1", MemberStatus::Pending)],
    ));

    view.apply_group_push(test_group(
        "g2",
        vec![test_member("m1", "1", MemberStatus::Agreed)],
    ));

    assert_eq!(view.member_status("m1"), Some(&MemberStatus::Pending));
}

#[test]
fn test_should_promote_only_on_pending_fully_agreed_transition() {
    let _ = env_logger::try_init();
    let mut view = GroupView::new();
    view.load(test_group(
        "g1",
        vec![
            test_member("m1", "1", MemberStatus::Pending),
            test_member("m2", "2", MemberStatus::Pending),
        ],
    ));
    assert!(!view.should_promote());

    view.apply_member_push(test_member("m1", "1", MemberStatus::Agreed));
    assert!(!view.should_promote());

    view.apply_member_push(test_member("m2", "2", MemberStatus::Agreed));
    assert!(view.should_promote());

    view.mark_promotion_sent();
    assert!(!view.should_promote());

    // Still fully agreed: repeated recomputation must not rearm the flag.
    view.apply_member_push(test_member("m1", "1", MemberStatus::Agreed));
    assert!(!view.should_promote());

    // Leaving and re-entering the fully-agreed state rearms it.
    view.apply_member_push(test_member("m1", "1", MemberStatus::Disagreed));
    view.apply_member_push(test_member("m1", "1", MemberStatus::Agreed));
    assert!(view.should_promote());
}

#[test]
fn test_promotion_not_rearmed_once_active() {
    let _ = env_logger::try_init();
    let mut view = GroupView::new();
    view.load(test_group(
        "g1",
        vec![test_member("m1", "1", MemberStatus::Agreed)],
    ));
    assert!(view.should_promote());

    view.mark_promotion_sent();
    view.mark_active();

    view.apply_member_push(test_member("m1", "1", MemberStatus::Agreed));
    assert!(!view.should_promote());
}

#[test]
fn test_reconcile_prefers_optimistic_status_for_pending_ids_only() {
    let _ = env_logger::try_init();
    let confirmed = vec![
        test_member("m1", "1", MemberStatus::Pending),
        test_member("m2", "2", MemberStatus::Agreed),
        test_member("m3", "3", MemberStatus::Pending),
    ];
    let optimistic = vec![
        test_member("m1", "1", MemberStatus::Agreed),
        test_member("m2", "2", MemberStatus::Disagreed),
    ];
    let pending: HashSet<String> = ["m1".to_string()].into_iter().collect();

    let merged = reconcile(&confirmed, &optimistic, &pending);

    assert_eq!(merged.len(), 3);
    assert_eq!(merged[0].status, MemberStatus::Agreed); // pending edit kept
    assert_eq!(merged[1].status, MemberStatus::Agreed); // confirmed wins
    assert_eq!(merged[2].status, MemberStatus::Pending); // membership from confirmed
}

#[test]
fn test_group_push_keeps_unconfirmed_edit_via_merge() {
    let _ = env_logger::try_init();
    let mut view = GroupView::new();
    view.load(test_group(
        "g1",
        vec![
            test_member("m1", "1", MemberStatus::Pending),
            test_member("m2", "2", MemberStatus::Pending),
        ],
    ));

    // Edit accepted by the server but its confirmation push not seen yet.
    view.stage_member_status("m1", MemberStatus::Agreed);
    view.commit();

    // Stale snapshot still carries the pre-edit status for m1.
    view.apply_group_push(test_group(
        "g1",
        vec![
            test_member("m1", "1", MemberStatus::Pending),
            test_member("m2", "2", MemberStatus::Agreed),
        ],
    ));

    assert_eq!(view.member_status("m1"), Some(&MemberStatus::Agreed));
    assert_eq!(view.member_status("m2"), Some(&MemberStatus::Agreed));
}
