use crate::core::models::{Group, GroupMember};
use crate::core::operations;
use crate::infrastructure::graphql::decode_field;
use crate::infrastructure::subscription::{
    EventKind, StreamEvent, StreamKey, Subscription, SubscriptionChannel,
};
use log::warn;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// A push update for the group being viewed.
#[derive(Clone, Debug)]
pub enum GroupEvent {
    /// Full authoritative group snapshot.
    Group(Group),
    /// Single member update.
    Member(GroupMember),
    /// The channel reported an error for this group's streams; live updates
    /// may be missing until a new channel is connected. Request/response
    /// calls are unaffected.
    Degraded(String),
}

/// The pair of per-group streams (`groupStatusChanged` and
/// `memberStatusChanged`) a group view listens to, already deserialized.
/// Dropping the feed disposes both subscriptions.
pub struct GroupFeed {
    group: Subscription,
    member: Subscription,
    group_done: bool,
    member_done: bool,
}

impl GroupFeed {
    pub fn open(channel: &SubscriptionChannel, group_id: &str) -> Self {
        let group = channel.subscribe(
            StreamKey::new(EventKind::GroupStatus, group_id),
            &operations::group_status_changed(group_id),
        );
        let member = channel.subscribe(
            StreamKey::new(EventKind::MemberStatus, group_id),
            &operations::member_status_changed(group_id),
        );
        GroupFeed {
            group,
            member,
            group_done: false,
            member_done: false,
        }
    }

    /// Next push for this group; `None` once both streams have ended.
    pub async fn next(&mut self) -> Option<GroupEvent> {
        loop {
            tokio::select! {
                event = self.group.next_event(), if !self.group_done => {
                    match event {
                        None | Some(StreamEvent::Complete) => self.group_done = true,
                        Some(StreamEvent::Error(message)) => return Some(GroupEvent::Degraded(message)),
                        Some(StreamEvent::Next(data)) => {
                            if let Some(group) = decode_push::<Group>(data, EventKind::GroupStatus) {
                                return Some(GroupEvent::Group(group));
                            }
                        }
                    }
                }
                event = self.member.next_event(), if !self.member_done => {
                    match event {
                        None | Some(StreamEvent::Complete) => self.member_done = true,
                        Some(StreamEvent::Error(message)) => return Some(GroupEvent::Degraded(message)),
                        Some(StreamEvent::Next(data)) => {
                            if let Some(member) = decode_push::<GroupMember>(data, EventKind::MemberStatus) {
                                return Some(GroupEvent::Member(member));
                            }
                        }
                    }
                }
                else => return None,
            }
        }
    }

    pub fn dispose(self) {
        self.group.dispose();
        self.member.dispose();
    }
}

fn decode_push<T: DeserializeOwned>(data: Value, event: EventKind) -> Option<T> {
    match decode_field::<T>(data, event.field()) {
        Ok(value) => Some(value),
        Err(e) => {
            warn!("Ignoring malformed {} push: {}", event.field(), e);
            None
        }
    }
}
