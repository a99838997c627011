use crate::core::errors::PaytoolError;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub mod http;
pub mod in_memory;

/// One GraphQL operation: a full document plus its variables. Documents are
/// `'static` string constants owned by `core::operations`.
#[derive(Clone, Debug, Serialize)]
pub struct GraphqlRequest {
    #[serde(rename = "operationName")]
    pub operation: &'static str,
    pub query: &'static str,
    pub variables: Value,
}

#[derive(Clone, Debug, Deserialize)]
pub struct GraphqlError {
    pub message: String,
}

/// The `{data, errors}` envelope every response arrives in, for both
/// request/response calls and subscription `next` payloads.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct GraphqlResponse {
    pub data: Option<Value>,
    pub errors: Option<Vec<GraphqlError>>,
}

impl GraphqlResponse {
    pub fn from_data(data: Value) -> Self {
        GraphqlResponse {
            data: Some(data),
            errors: None,
        }
    }

    pub fn from_error(message: impl Into<String>) -> Self {
        GraphqlResponse {
            data: None,
            errors: Some(vec![GraphqlError {
                message: message.into(),
            }]),
        }
    }

    /// A populated `errors` list is a failure regardless of transport
    /// success or any partial `data`; the first message is the one surfaced
    /// to the user.
    pub fn into_data(self) -> Result<Value, PaytoolError> {
        if let Some(errors) = self.errors {
            if let Some(first) = errors.into_iter().next() {
                return Err(PaytoolError::Api(first.message));
            }
        }
        Ok(self.data.unwrap_or(Value::Null))
    }
}

/// Pulls one named field out of a `data` payload and deserializes it.
/// Null or absent fields are reported against the field name.
pub fn decode_field<T: DeserializeOwned>(
    data: Value,
    field: &'static str,
) -> Result<T, PaytoolError> {
    let value = data
        .get(field)
        .filter(|v| !v.is_null())
        .cloned()
        .ok_or(PaytoolError::MissingData(field))?;
    serde_json::from_value(value).map_err(|e| PaytoolError::Serde(e.to_string()))
}

/// Variant of `decode_field` for lookups where null data is a domain
/// outcome (absent group) rather than a malformed envelope.
pub fn decode_optional_field<T: DeserializeOwned>(
    data: Value,
    field: &'static str,
) -> Result<Option<T>, PaytoolError> {
    match data.get(field) {
        None => Ok(None),
        Some(Value::Null) => Ok(None),
        Some(value) => serde_json::from_value(value.clone())
            .map(Some)
            .map_err(|e| PaytoolError::Serde(e.to_string())),
    }
}

#[async_trait]
pub trait GraphqlTransport: Send + Sync {
    /// One-shot execution of a single operation. No retries; callers decide
    /// what a failure means for their state.
    async fn execute(&self, request: &GraphqlRequest) -> Result<GraphqlResponse, PaytoolError>;
}
