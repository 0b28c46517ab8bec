//! Client registration and lookup endpoints.

use serde::Serialize;

use keylimar_core::types::Client;

use crate::error::ApiResult;
use crate::http::ApiClient;

#[derive(Debug, Clone, Serialize)]
pub struct RegisterClientRequest {
    pub cedula: String,
    pub full_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

pub struct ClientsApi<'a> {
    api: &'a ApiClient,
}

impl<'a> ClientsApi<'a> {
    pub(crate) fn new(api: &'a ApiClient) -> Self {
        ClientsApi { api }
    }

    /// Registers a new store client.
    pub async fn register(&self, request: &RegisterClientRequest) -> ApiResult<Client> {
        self.api.post("clients/register/", request).await
    }

    /// Looks a client up by cedula; `None` when unregistered.
    pub async fn search_by_cedula(&self, cedula: &str) -> ApiResult<Option<Client>> {
        let query: String = url::form_urlencoded::Serializer::new(String::new())
            .append_pair("cedula", cedula)
            .finish();
        self.api
            .get_optional(&format!("clients/search-by-cedula/?{}", query))
            .await
    }
}
