//! Payment method and payment mode endpoints.

use serde::{Deserialize, Serialize};

use keylimar_core::types::{PaymentMethod, PaymentMode};

use crate::error::ApiResult;
use crate::http::ApiClient;

#[derive(Debug, Serialize, Deserialize)]
struct PaymentModeBody {
    mode: PaymentMode,
}

pub struct PaymentsApi<'a> {
    api: &'a ApiClient,
}

impl<'a> PaymentsApi<'a> {
    pub(crate) fn new(api: &'a ApiClient) -> Self {
        PaymentsApi { api }
    }

    pub async fn methods(&self) -> ApiResult<Vec<PaymentMethod>> {
        self.api.get("payments/methods/").await
    }

    /// The store-wide payment mode (fetched once per session by the
    /// workflow and cached there).
    pub async fn mode(&self) -> ApiResult<PaymentMode> {
        let body: PaymentModeBody = self.api.get("payments/mode/").await?;
        Ok(body.mode)
    }

    /// Admin: switch the store between centralized and decentralized
    /// payment confirmation.
    pub async fn set_mode(&self, mode: PaymentMode) -> ApiResult<PaymentMode> {
        let body: PaymentModeBody = self
            .api
            .put("payments/mode/", &PaymentModeBody { mode })
            .await?;
        Ok(body.mode)
    }
}
