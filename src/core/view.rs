use crate::core::models::{Group, GroupMember, GroupStatus, MemberStatus};
use log::{debug, warn};
use std::collections::HashSet;

/// Three-way merge of member lists. Membership comes from `confirmed` (the
/// server snapshot); a member whose id is in `pending` keeps the status it
/// has in `optimistic`, so a stale snapshot cannot clobber an edit that is
/// still awaiting its confirmation push.
pub fn reconcile(
    confirmed: &[GroupMember],
    optimistic: &[GroupMember],
    pending: &HashSet<String>,
) -> Vec<GroupMember> {
    confirmed
        .iter()
        .map(|member| {
            if pending.contains(&member.id) {
                if let Some(local) = optimistic.iter().find(|o| o.id == member.id) {
                    let mut merged = member.clone();
                    merged.status = local.status.clone();
                    return merged;
                }
            }
            member.clone()
        })
        .collect()
}

/// In-memory state of the currently selected group, reconciled from the
/// initial fetch, optimistic local edits, mutation outcomes and
/// subscription pushes. Single-threaded; threaded `&mut` through the UI
/// event loop.
pub struct GroupView {
    group: Option<Group>,
    /// Staged edit: the edited member id and the pre-edit member list, kept
    /// until the mutation resolves so a failure can restore it.
    snapshot: Option<(String, Vec<GroupMember>)>,
    /// Optimistic edits that have not been confirmed by a push yet.
    unconfirmed: HashSet<String>,
    promotion_sent: bool,
    attached: bool,
}

impl GroupView {
    pub fn new() -> Self {
        GroupView {
            group: None,
            snapshot: None,
            unconfirmed: HashSet::new(),
            promotion_sent: false,
            attached: true,
        }
    }

    /// Replace the view with a freshly fetched group. Selecting a group
    /// always re-fetches; nothing is cached across navigation.
    pub fn load(&mut self, group: Group) {
        debug!("Loading group {} into view", group.id);
        self.group = Some(group);
        self.snapshot = None;
        self.unconfirmed.clear();
        self.promotion_sent = false;
        self.attached = true;
    }

    pub fn group(&self) -> Option<&Group> {
        self.group.as_ref()
    }

    pub fn members(&self) -> &[GroupMember] {
        self.group.as_ref().map(|g| g.members.as_slice()).unwrap_or(&[])
    }

    pub fn member_status(&self, member_id: &str) -> Option<&MemberStatus> {
        self.group
            .as_ref()
            .and_then(|g| g.member(member_id))
            .map(|m| &m.status)
    }

    pub fn is_attached(&self) -> bool {
        self.attached
    }

    pub fn is_fully_agreed(&self) -> bool {
        self.group.as_ref().is_some_and(|g| g.is_fully_agreed())
    }

    /// Stop accepting updates; called when the view is navigated away from.
    /// Late pushes and in-flight mutation results are discarded afterwards.
    pub fn detach(&mut self) {
        debug!("Detaching group view");
        self.attached = false;
    }

    /// Optimistically apply a status change to one member, keeping the
    /// pre-edit list for a possible revert. Returns false when the member
    /// is not in the current list.
    pub fn stage_member_status(&mut self, member_id: &str, status: MemberStatus) -> bool {
        let Some(group) = self.group.as_mut() else {
            return false;
        };
        if !group.members.iter().any(|m| m.id == member_id) {
            warn!("Stage for unknown member {}", member_id);
            return false;
        }

        if self.snapshot.is_some() {
            warn!("Staging member {} over an unresolved edit", member_id);
        } else {
            self.snapshot = Some((member_id.to_string(), group.members.clone()));
        }

        debug!("Member {} optimistically set to {}", member_id, status);
        if let Some(member) = group.members.iter_mut().find(|m| m.id == member_id) {
            member.status = status;
        }
        self.unconfirmed.insert(member_id.to_string());
        self.after_members_changed();
        true
    }

    /// Mutation accepted by the server. The snapshot is dropped; the edit
    /// stays provisional until its confirmation push arrives.
    pub fn commit(&mut self) {
        self.snapshot = None;
    }

    /// Mutation failed: restore the pre-edit member list, unless a
    /// confirmation push already superseded the staged edit.
    pub fn revert(&mut self) {
        let Some((member_id, pre_edit)) = self.snapshot.take() else {
            return;
        };
        if !self.unconfirmed.remove(&member_id) {
            debug!("Revert for {} skipped, push already confirmed it", member_id);
            return;
        }
        if let Some(group) = self.group.as_mut() {
            debug!("Reverting member list after failed update of {}", member_id);
            group.members = pre_edit;
        }
        self.after_members_changed();
    }

    /// Authoritative per-member push: overwrite by id, last write wins by
    /// arrival order. A member the view has not seen yet (someone joining)
    /// is appended as pushed.
    pub fn apply_member_push(&mut self, member: GroupMember) {
        if !self.attached {
            debug!("Dropping member push for detached view");
            return;
        }
        let Some(group) = self.group.as_mut() else {
            return;
        };

        self.unconfirmed.remove(&member.id);
        match group.members.iter_mut().find(|m| m.id == member.id) {
            Some(existing) => *existing = member,
            None => {
                debug!("Member push introduces {} to group {}", member.id, group.id);
                group.members.push(member);
            }
        }
        self.after_members_changed();
    }

    /// Authoritative group snapshot push. Membership and group fields come
    /// from the server; statuses of still-unconfirmed local edits survive
    /// via the three-way merge.
    pub fn apply_group_push(&mut self, pushed: Group) {
        if !self.attached {
            debug!("Dropping group push for detached view");
            return;
        }
        let Some(group) = self.group.as_mut() else {
            return;
        };
        if group.id != pushed.id {
            warn!("Group push for {} ignored, viewing {}", pushed.id, group.id);
            return;
        }

        let merged = reconcile(&pushed.members, &group.members, &self.unconfirmed);
        *group = Group {
            members: merged,
            ..pushed
        };
        self.after_members_changed();
    }

    /// The promotion mutation fires at most once per transition into the
    /// fully-agreed state; the flag rearms only if the list leaves that
    /// state while the group is still pending.
    pub fn should_promote(&self) -> bool {
        self.attached
            && !self.promotion_sent
            && self
                .group
                .as_ref()
                .is_some_and(|g| g.status == GroupStatus::Pending && g.is_fully_agreed())
    }

    pub fn mark_promotion_sent(&mut self) {
        self.promotion_sent = true;
    }

    pub fn mark_active(&mut self) {
        if let Some(group) = self.group.as_mut() {
            group.status = GroupStatus::Active;
        }
    }

    fn after_members_changed(&mut self) {
        if !self.is_fully_agreed() {
            self.promotion_sent = false;
        }
    }
}

impl Default for GroupView {
    fn default() -> Self {
        Self::new()
    }
}
