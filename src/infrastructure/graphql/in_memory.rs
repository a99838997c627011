use crate::core::errors::PaytoolError;
use crate::infrastructure::graphql::{GraphqlRequest, GraphqlResponse, GraphqlTransport};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::VecDeque;
use std::sync::Arc;
use tokio::sync::Mutex;

/// Scripted transport double: responses are consumed in FIFO order and
/// every executed request is recorded for assertions.
#[derive(Clone, Default)]
pub struct InMemoryTransport {
    responses: Arc<Mutex<VecDeque<GraphqlResponse>>>,
    requests: Arc<Mutex<Vec<(String, Value)>>>,
}

impl InMemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn push_data(&self, data: Value) {
        self.responses
            .lock()
            .await
            .push_back(GraphqlResponse::from_data(data));
    }

    pub async fn push_error(&self, message: &str) {
        self.responses
            .lock()
            .await
            .push_back(GraphqlResponse::from_error(message));
    }

    /// Recorded `(operation name, variables)` pairs, in execution order.
    pub async fn requests(&self) -> Vec<(String, Value)> {
        self.requests.lock().await.clone()
    }

    pub async fn operations(&self) -> Vec<String> {
        self.requests
            .lock()
            .await
            .iter()
            .map(|(op, _)| op.clone())
            .collect()
    }
}

#[async_trait]
impl GraphqlTransport for InMemoryTransport {
    async fn execute(&self, request: &GraphqlRequest) -> Result<GraphqlResponse, PaytoolError> {
        self.requests
            .lock()
            .await
            .push((request.operation.to_string(), request.variables.clone()));

        self.responses
            .lock()
            .await
            .pop_front()
            .ok_or_else(|| PaytoolError::Transport("no scripted response".to_string()))
    }
}
