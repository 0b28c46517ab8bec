//! Sale lifecycle endpoints: create, list, detail, payment, review,
//! delivery.
//!
//! Each mutation returns the updated sale object; the client renders the
//! backend's truth rather than patching local state optimistically.

use serde::Serialize;

use keylimar_core::money::Money;
use keylimar_core::types::{Sale, SaleLine, SaleStatus};

use crate::error::ApiResult;
use crate::http::ApiClient;

#[derive(Debug, Clone, Serialize)]
pub struct CreateSaleRequest {
    pub client_id: String,
    pub lines: Vec<SaleLine>,
    /// Caller-chosen: `Paid` for direct checkout, `Pending` when the
    /// payment mode routes through admin approval.
    pub status: SaleStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct RegisterPaymentRequest {
    pub payment_method_id: String,
    pub amount: Money,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApproveSaleRequest {
    /// Amount handed over by the customer; change is computed from it.
    pub tendered: Money,
}

pub struct SalesApi<'a> {
    api: &'a ApiClient,
}

impl<'a> SalesApi<'a> {
    pub(crate) fn new(api: &'a ApiClient) -> Self {
        SalesApi { api }
    }

    pub async fn create(&self, request: &CreateSaleRequest) -> ApiResult<Sale> {
        self.api.post("sales/", request).await
    }

    /// Lists sales, optionally filtered by status (e.g., pending orders
    /// for the admin approval screen).
    pub async fn list(&self, status: Option<SaleStatus>) -> ApiResult<Vec<Sale>> {
        match status {
            Some(s) => self.api.get(&format!("sales/?status={}", s)).await,
            None => self.api.get("sales/").await,
        }
    }

    pub async fn detail(&self, sale_id: &str) -> ApiResult<Sale> {
        self.api.get(&format!("sales/{}/", sale_id)).await
    }

    pub async fn register_payment(
        &self,
        sale_id: &str,
        request: &RegisterPaymentRequest,
    ) -> ApiResult<Sale> {
        self.api
            .post(&format!("sales/{}/payments/", sale_id), request)
            .await
    }

    pub async fn approve(&self, sale_id: &str, request: &ApproveSaleRequest) -> ApiResult<Sale> {
        self.api
            .post(&format!("sales/{}/approve/", sale_id), request)
            .await
    }

    pub async fn reject(&self, sale_id: &str) -> ApiResult<Sale> {
        self.api
            .post_empty(&format!("sales/{}/reject/", sale_id))
            .await
    }

    pub async fn deliver(&self, sale_id: &str) -> ApiResult<Sale> {
        self.api
            .post_empty(&format!("sales/{}/deliver/", sale_id))
            .await
    }
}
