use thiserror::Error;

#[derive(Error, Debug)]
pub enum PaytoolError {
    /// The request could not complete at the transport level.
    #[error("Request failed: {0}")]
    Transport(String),

    /// The server answered with a GraphQL `errors` list; carries the first
    /// error's message verbatim so it can be shown to the user as-is.
    #[error("{0}")]
    Api(String),

    /// Group lookup returned null data.
    #[error("Group {0} not found")]
    GroupNotFound(String),

    /// The operation needs a logged-in session and none is set.
    #[error("Not logged in")]
    NotLoggedIn,

    /// The session user has no membership row in the viewed group.
    #[error("User {0} is not a member of group {1}")]
    NotGroupMember(String, String),

    /// The link does not carry a group id in any recognized form.
    #[error("Invalid invite link")]
    InvalidInviteLink,

    /// The server never acknowledged the subscription connection.
    #[error("Subscription connection ack timed out")]
    AckTimeout,

    /// The subscription reconnect budget is spent; the channel stays down
    /// until a new one is constructed.
    #[error("Subscription channel closed after {0} reconnect attempts")]
    ChannelExhausted(u32),

    /// A response envelope was missing the expected payload field.
    #[error("Response missing data for `{0}`")]
    MissingData(&'static str),

    #[error("Malformed response: {0}")]
    Serde(String),
}
