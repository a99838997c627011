use serde::{Deserialize, Serialize};

/// Identity of the logged-in user, passed explicitly to everything that
/// needs it. Created by `PaytoolService::login`, cleared by `logout`;
/// callers that persist it across restarts re-inject it with
/// `restore_session`.
#[derive(Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionContext {
    pub user_id: String,
    pub username: String,
    pub auth_token: Option<String>,
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("user_id", &self.user_id)
            .field("username", &self.username)
            .field("auth_token", &self.auth_token.as_deref().map(|_| "<redacted>"))
            .finish()
    }
}

impl SessionContext {
    pub fn new(user_id: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
            auth_token: None,
        }
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }
}
