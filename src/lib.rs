pub mod config;
pub mod constants;
pub mod core;
pub mod infrastructure;

pub use crate::core::errors::PaytoolError;
pub use crate::core::feed::{GroupEvent, GroupFeed};
pub use crate::core::invite::{invite_link, parse_invite_link};
pub use crate::core::models::{Group, GroupMember, GroupStatus, MemberStatus, PaymentCard, User};
pub use crate::core::services::{InviteTarget, PaytoolService};
pub use crate::core::session::SessionContext;
pub use crate::core::view::{GroupView, reconcile};
pub use crate::infrastructure::graphql::http::HttpTransport;
pub use crate::infrastructure::graphql::in_memory::InMemoryTransport;
pub use crate::infrastructure::subscription::{ChannelOptions, SubscriptionChannel};

#[cfg(test)]
mod tests;
