use crate::infrastructure::graphql::{GraphqlError, GraphqlRequest, GraphqlResponse};
use serde::{Deserialize, Serialize};
use serde_json::Value;

// Wire frames of the graphql-transport-ws subprotocol. The `type` tags are
// fixed by the protocol; unknown server frames deserialize into
// `Unsupported` and are skipped.

#[derive(Clone, Debug, Serialize)]
pub struct ConnectionParams {
    #[serde(rename = "authToken", skip_serializing_if = "Option::is_none")]
    pub auth_token: Option<String>,
}

#[derive(Clone, Debug, Serialize)]
pub struct SubscribePayload {
    pub query: String,
    pub variables: Value,
    #[serde(rename = "operationName", skip_serializing_if = "Option::is_none")]
    pub operation_name: Option<String>,
}

impl From<&GraphqlRequest> for SubscribePayload {
    fn from(request: &GraphqlRequest) -> Self {
        SubscribePayload {
            query: request.query.to_string(),
            variables: request.variables.clone(),
            operation_name: Some(request.operation.to_string()),
        }
    }
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    ConnectionInit {
        #[serde(skip_serializing_if = "Option::is_none")]
        payload: Option<ConnectionParams>,
    },
    Subscribe {
        id: String,
        payload: SubscribePayload,
    },
    Complete {
        id: String,
    },
    Pong,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    ConnectionAck,
    Next {
        id: String,
        payload: GraphqlResponse,
    },
    Error {
        id: String,
        payload: Vec<GraphqlError>,
    },
    Complete {
        id: String,
    },
    Ping,
    #[serde(other)]
    Unsupported,
}
