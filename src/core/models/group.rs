use super::user::User;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum MemberStatus {
    Pending,
    Agreed,
    Disagreed,
}

impl std::fmt::Display for MemberStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            MemberStatus::Pending => "PENDING",
            MemberStatus::Agreed => "AGREED",
            MemberStatus::Disagreed => "DISAGREED",
        };
        write!(f, "{}", s)
    }
}

/// Group lifecycle status. The set of values is owned by the server; the
/// client only switches on the ones it knows and keeps anything else as an
/// opaque display string.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GroupStatus {
    Pending,
    Active,
    Completed,
    Other(String),
}

impl GroupStatus {
    pub fn as_str(&self) -> &str {
        match self {
            GroupStatus::Pending => "PENDING",
            GroupStatus::Active => "ACTIVE",
            GroupStatus::Completed => "COMPLETED",
            GroupStatus::Other(s) => s,
        }
    }
}

impl std::fmt::Display for GroupStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl Serialize for GroupStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for GroupStatus {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        if s.is_empty() {
            return Err(D::Error::custom("empty group status"));
        }
        Ok(match s.as_str() {
            "PENDING" => GroupStatus::Pending,
            "ACTIVE" => GroupStatus::Active,
            "COMPLETED" => GroupStatus::Completed,
            _ => GroupStatus::Other(s),
        })
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct GroupMember {
    pub id: String,
    pub amount: f64,
    pub status: MemberStatus,
    pub user: User,
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Group {
    pub id: String,
    #[serde(default)]
    pub description: String,
    pub total_amount: f64,
    #[serde(default)]
    pub total_people: u32,
    pub status: GroupStatus,
    pub leader: User,
    #[serde(default)]
    pub members: Vec<GroupMember>,
}

impl Group {
    /// Display label, falling back to `Group #{id}` for empty descriptions.
    pub fn display_name(&self) -> String {
        if self.description.is_empty() {
            format!("Group #{}", self.id)
        } else {
            self.description.clone()
        }
    }

    /// The consensus rule: a non-empty member list where everyone agreed.
    pub fn is_fully_agreed(&self) -> bool {
        !self.members.is_empty()
            && self
                .members
                .iter()
                .all(|m| m.status == MemberStatus::Agreed)
    }

    /// Expected per-person share, derived from the planned head count.
    /// `total_people` is display-only and not validated against the actual
    /// membership, so this is an estimate.
    pub fn average_share(&self) -> f64 {
        if self.total_people == 0 {
            self.total_amount
        } else {
            self.total_amount / self.total_people as f64
        }
    }

    pub fn member(&self, member_id: &str) -> Option<&GroupMember> {
        self.members.iter().find(|m| m.id == member_id)
    }

    pub fn member_for_user(&self, user_id: &str) -> Option<&GroupMember> {
        self.members.iter().find(|m| m.user.id == user_id)
    }

    pub fn is_member(&self, user_id: &str) -> bool {
        self.member_for_user(user_id).is_some()
    }

    pub fn is_leader(&self, user_id: &str) -> bool {
        self.leader.id == user_id
    }
}
