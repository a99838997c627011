use crate::core::errors::PaytoolError;
use crate::infrastructure::graphql::{GraphqlRequest, GraphqlResponse, GraphqlTransport};
use async_trait::async_trait;
use log::debug;

/// Request/response GraphQL transport over HTTP POST.
#[derive(Clone)]
pub struct HttpTransport {
    endpoint: String,
    auth_token: Option<String>,
    client: reqwest::Client,
}

impl HttpTransport {
    pub fn new(endpoint: impl Into<String>) -> Self {
        HttpTransport {
            endpoint: endpoint.into(),
            auth_token: None,
            client: reqwest::Client::new(),
        }
    }

    /// Attach a bearer token to every request.
    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }
}

#[async_trait]
impl GraphqlTransport for HttpTransport {
    async fn execute(&self, request: &GraphqlRequest) -> Result<GraphqlResponse, PaytoolError> {
        debug!("Executing {} against {}", request.operation, self.endpoint);

        let mut builder = self.client.post(&self.endpoint).json(request);
        if let Some(token) = &self.auth_token {
            builder = builder.bearer_auth(token);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| PaytoolError::Transport(e.to_string()))?;

        response
            .json::<GraphqlResponse>()
            .await
            .map_err(|e| PaytoolError::Transport(e.to_string()))
    }
}
