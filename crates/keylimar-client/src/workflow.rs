//! # Sale Workflow
//!
//! Drives a sale through its lifecycle against the backend, enforcing the
//! [`keylimar_core`] rules *before* any request is issued.
//!
//! ## Workflow Steps
//! ```text
//! identify client ──► build cart ──► checkout ──► payment ──► approval ──► delivery
//!     (cedula)        (in memory)   (create)    (register)   (admin)      (cashier)
//! ```
//!
//! Guard order is fixed: role first, then state, then amounts. When a
//! guard fails, the error reaches the caller with zero network traffic;
//! when the backend refuses anyway, its answer wins. No mutation is
//! retried automatically, and no local state is updated optimistically:
//! every operation returns the backend's sale object as the new truth.

use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};

use keylimar_core::cart::Cart;
use keylimar_core::lifecycle::{
    can_confirm_payment, check_can_deliver, check_can_review, check_deliverable,
    check_transition, validate_payment,
};
use keylimar_core::money::{change_due, Money};
use keylimar_core::types::{
    Client, PaymentMethod, PaymentMode, Role, Sale, SaleLine, SaleStatus,
};
use keylimar_core::validation::{validate_cedula, validate_client_name};
use keylimar_core::CoreError;

use crate::api::{ApproveSaleRequest, CreateSaleRequest, RegisterClientRequest, RegisterPaymentRequest};
use crate::error::ApiResult;
use crate::http::ApiClient;

/// Orchestrates the sale lifecycle for the current session's role.
pub struct SaleWorkflow {
    api: Arc<ApiClient>,
    /// Store-wide payment mode, fetched once per session.
    payment_mode: RwLock<Option<PaymentMode>>,
}

impl SaleWorkflow {
    pub fn new(api: Arc<ApiClient>) -> Self {
        SaleWorkflow {
            api,
            payment_mode: RwLock::new(None),
        }
    }

    /// Role of the logged-in user, from the access-token claims.
    pub async fn role(&self) -> ApiResult<Role> {
        self.api.session().claims().await?.role()
    }

    /// The store's payment mode, cached after the first fetch.
    pub async fn payment_mode(&self) -> ApiResult<PaymentMode> {
        if let Some(mode) = *self.payment_mode.read().await {
            return Ok(mode);
        }
        let mode = self.api.payments().mode().await?;
        *self.payment_mode.write().await = Some(mode);
        debug!(%mode, "payment mode fetched");
        Ok(mode)
    }

    /// Drops the cached mode (admin screens call this after `set_mode`).
    pub async fn refresh_payment_mode(&self) -> ApiResult<PaymentMode> {
        *self.payment_mode.write().await = None;
        self.payment_mode().await
    }

    // =========================================================================
    // Client Identification
    // =========================================================================

    /// Looks up a client by cedula. `Ok(None)` means unregistered, which
    /// the UI turns into a registration prompt.
    pub async fn identify_client(&self, cedula: &str) -> ApiResult<Option<Client>> {
        validate_cedula(cedula).map_err(CoreError::Validation)?;
        self.api.clients().search_by_cedula(cedula).await
    }

    /// Registers a new client after local format validation.
    pub async fn register_client(
        &self,
        cedula: &str,
        full_name: &str,
        phone: Option<String>,
        address: Option<String>,
    ) -> ApiResult<Client> {
        validate_cedula(cedula).map_err(CoreError::Validation)?;
        validate_client_name(full_name).map_err(CoreError::Validation)?;

        self.api
            .clients()
            .register(&RegisterClientRequest {
                cedula: cedula.to_string(),
                full_name: full_name.to_string(),
                phone,
                address,
            })
            .await
    }

    // =========================================================================
    // Checkout
    // =========================================================================

    /// Creates a sale from the cart, choosing the initial status from the
    /// payment-mode policy: `Paid` when this role confirms payment at the
    /// register, `Pending` when the sale routes through admin approval.
    pub async fn checkout(&self, cart: &Cart, client: &Client) -> ApiResult<Sale> {
        let lines = cart.to_sale_lines()?;
        let role = self.role().await?;
        let mode = self.payment_mode().await?;

        let status = if can_confirm_payment(role, mode) {
            SaleStatus::Paid
        } else {
            SaleStatus::Pending
        };

        let sale = self.create_sale(&client.id, lines, status).await?;
        info!(sale_id = %sale.id, %status, total = %sale.total, "sale created");
        Ok(sale)
    }

    /// Low-level sale creation with a caller-chosen status.
    pub async fn create_sale(
        &self,
        client_id: &str,
        lines: Vec<SaleLine>,
        status: SaleStatus,
    ) -> ApiResult<Sale> {
        if lines.is_empty() {
            return Err(CoreError::EmptyCart.into());
        }
        self.api
            .sales()
            .create(&CreateSaleRequest {
                client_id: client_id.to_string(),
                lines,
                status,
            })
            .await
    }

    // =========================================================================
    // Payment
    // =========================================================================

    /// Registers a payment against a sale.
    ///
    /// For cash the amount must cover the total; the check runs here so an
    /// underpayment never reaches the wire.
    pub async fn register_payment(
        &self,
        sale: &Sale,
        method: &PaymentMethod,
        amount: Money,
    ) -> ApiResult<Sale> {
        validate_payment(method, amount, sale.total)?;

        let updated = self
            .api
            .sales()
            .register_payment(
                &sale.id,
                &RegisterPaymentRequest {
                    payment_method_id: method.id.clone(),
                    amount,
                },
            )
            .await?;
        info!(sale_id = %sale.id, amount = %amount, method = %method.name, "payment registered");
        Ok(updated)
    }

    // =========================================================================
    // Admin Review
    // =========================================================================

    /// Approves a pending sale, returning the updated sale and the change
    /// (vuelto) owed from the tendered amount. Admin only.
    pub async fn approve_sale(&self, sale_id: &str, tendered: Money) -> ApiResult<(Sale, Money)> {
        check_can_review(self.role().await?)?;

        let sale = self.api.sales().detail(sale_id).await?;
        check_transition(sale.status, SaleStatus::Paid)?;
        let change = change_due(tendered, sale.total)?;

        let updated = self
            .api
            .sales()
            .approve(sale_id, &ApproveSaleRequest { tendered })
            .await?;
        info!(sale_id, change = %change, "sale approved");
        Ok((updated, change))
    }

    /// Rejects a pending sale. Admin only. No compensating inventory
    /// action happens client-side; the backend owns stock.
    pub async fn reject_sale(&self, sale_id: &str) -> ApiResult<Sale> {
        check_can_review(self.role().await?)?;

        let sale = self.api.sales().detail(sale_id).await?;
        check_transition(sale.status, SaleStatus::Rejected)?;

        let updated = self.api.sales().reject(sale_id).await?;
        info!(sale_id, "sale rejected");
        Ok(updated)
    }

    /// Pending sales awaiting review, for the approval screen.
    pub async fn pending_sales(&self) -> ApiResult<Vec<Sale>> {
        self.api.sales().list(Some(SaleStatus::Pending)).await
    }

    // =========================================================================
    // Delivery
    // =========================================================================

    /// Marks a paid sale delivered. Cashier only.
    ///
    /// The status guard runs against the sale object the screen already
    /// holds, so a non-deliverable sale fails with its specific message
    /// and no request is issued.
    pub async fn deliver_sale(&self, sale: &Sale) -> ApiResult<Sale> {
        check_can_deliver(self.role().await?)?;
        check_deliverable(sale.status, sale.delivery_state())?;

        let updated = self.api.sales().deliver(&sale.id).await?;
        info!(sale_id = %sale.id, "sale delivered");
        Ok(updated)
    }
}
