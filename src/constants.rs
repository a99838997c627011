pub const DEFAULT_GRAPHQL_HTTP_URL: &str = "http://localhost:8080/graphql";
pub const DEFAULT_GRAPHQL_WS_URL: &str = "ws://localhost:8080/graphql";

/// Subprotocol name required by the graphql-transport-ws handshake.
pub const GRAPHQL_WS_PROTOCOL: &str = "graphql-transport-ws";

pub const DEFAULT_WS_MAX_RETRIES: u32 = 3;
pub const DEFAULT_WS_RETRY_DELAY_MS: u64 = 1000;
pub const DEFAULT_WS_ACK_TIMEOUT_MS: u64 = 5000;

/// Path segment used when building shareable invite links.
pub const INVITE_PATH: &str = "invite";
/// Query parameter carrying a group id in dashboard-style join links.
pub const INVITE_QUERY_PARAM: &str = "groupId";
