//! User administration endpoints (admin role).

use serde::Serialize;

use keylimar_core::types::UserAccount;

use crate::error::ApiResult;
use crate::http::ApiClient;

#[derive(Debug, Clone, Serialize)]
pub struct CreateUserRequest {
    pub username: String,
    pub password: String,
    /// Job position string as the backend stores it ("cajero", ...).
    pub job_position: String,
}

pub struct UsersApi<'a> {
    api: &'a ApiClient,
}

impl<'a> UsersApi<'a> {
    pub(crate) fn new(api: &'a ApiClient) -> Self {
        UsersApi { api }
    }

    pub async fn list(&self) -> ApiResult<Vec<UserAccount>> {
        self.api.get("users/").await
    }

    pub async fn create(&self, request: &CreateUserRequest) -> ApiResult<UserAccount> {
        self.api.post("users/", request).await
    }

    /// Soft-deactivates an account; the backend keeps its sale history.
    pub async fn deactivate(&self, user_id: &str) -> ApiResult<UserAccount> {
        self.api
            .post_empty(&format!("users/{}/deactivate/", user_id))
            .await
    }
}
