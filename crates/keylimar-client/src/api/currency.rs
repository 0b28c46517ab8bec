//! Currency and exchange-rate endpoints.

use serde::Serialize;

use keylimar_core::types::CurrencyRate;

use crate::error::ApiResult;
use crate::http::ApiClient;

#[derive(Debug, Serialize)]
struct UpdateRateBody {
    rate: f64,
}

pub struct CurrencyApi<'a> {
    api: &'a ApiClient,
}

impl<'a> CurrencyApi<'a> {
    pub(crate) fn new(api: &'a ApiClient) -> Self {
        CurrencyApi { api }
    }

    pub async fn currencies(&self) -> ApiResult<Vec<CurrencyRate>> {
        self.api.get("currencies/").await
    }

    /// Admin: sets the day's exchange rate for a currency.
    pub async fn update_rate(&self, currency_id: &str, rate: f64) -> ApiResult<CurrencyRate> {
        self.api
            .put(&format!("currencies/{}/rate/", currency_id), &UpdateRateBody { rate })
            .await
    }
}
