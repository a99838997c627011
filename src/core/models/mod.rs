pub mod card;
pub mod group;
pub mod user;

pub use card::PaymentCard;
pub use group::{Group, GroupMember, GroupStatus, MemberStatus};
pub use user::User;
