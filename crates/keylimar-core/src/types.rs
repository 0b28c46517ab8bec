//! # Domain Types
//!
//! Core domain types for the Keylimar POS client.
//!
//! These mirror the backend's JSON entities. Identity is backend-assigned
//! (string ids); the client never invents ids for server-owned entities.
//!
//! One deliberate normalization happens here: the backend exposes delivery
//! through three overlapping fields (`delivered`, `delivery_status`,
//! `delivered_at`), populated inconsistently per route. [`DeliveryState`]
//! is the single place that inconsistency is resolved; screens must never
//! re-derive it.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;
use crate::money::Money;

// =============================================================================
// Role
// =============================================================================

/// Job position driving role-based behavior.
///
/// The backend stores positions as free-ish strings, historically in
/// Spanish; parsing accepts both spellings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Runs the register: builds carts, charges, marks deliveries.
    Cashier,
    /// Stock handling only; no sale transitions.
    Warehouse,
    /// Approves/rejects pending sales, manages rates and users.
    Admin,
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Cashier => write!(f, "cashier"),
            Role::Warehouse => write!(f, "warehouse"),
            Role::Admin => write!(f, "admin"),
        }
    }
}

impl FromStr for Role {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "cashier" | "cajero" | "cajera" => Ok(Role::Cashier),
            "warehouse" | "almacen" | "almacén" | "almacenista" => Ok(Role::Warehouse),
            "admin" | "administrator" | "administrador" | "administradora" => Ok(Role::Admin),
            other => Err(ValidationError::InvalidFormat {
                field: "job_position",
                reason: format!("unknown role '{}'", other),
            }),
        }
    }
}

// =============================================================================
// Sale Status
// =============================================================================

/// The lifecycle status of a sale.
///
/// Transitions are monotonic forward; see [`crate::lifecycle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    /// Created, awaiting admin payment approval.
    Pending,
    /// Payment registered/approved; eligible for delivery.
    Paid,
    /// Admin declined the pending sale.
    Rejected,
    /// Abandoned before payment.
    Cancelled,
}

impl SaleStatus {
    /// Terminal statuses admit no further transition.
    pub const fn is_terminal(&self) -> bool {
        matches!(self, SaleStatus::Rejected | SaleStatus::Cancelled)
    }
}

impl fmt::Display for SaleStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SaleStatus::Pending => write!(f, "pending"),
            SaleStatus::Paid => write!(f, "paid"),
            SaleStatus::Rejected => write!(f, "rejected"),
            SaleStatus::Cancelled => write!(f, "cancelled"),
        }
    }
}

// =============================================================================
// Delivery State
// =============================================================================

/// Whether a paid sale has been handed over at the counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryState {
    Undelivered,
    Delivered,
}

impl DeliveryState {
    /// Derives the state from the backend's three overlapping fields.
    ///
    /// Precedence (first truthy wins):
    /// 1. `delivered == true`
    /// 2. `delivery_status == "delivered"`
    /// 3. `delivered_at` present
    pub fn from_fields(
        delivered: Option<bool>,
        delivery_status: Option<&str>,
        delivered_at: Option<&DateTime<Utc>>,
    ) -> Self {
        if delivered == Some(true)
            || delivery_status == Some("delivered")
            || delivered_at.is_some()
        {
            DeliveryState::Delivered
        } else {
            DeliveryState::Undelivered
        }
    }

    pub const fn is_delivered(&self) -> bool {
        matches!(self, DeliveryState::Delivered)
    }
}

// =============================================================================
// Payment Mode
// =============================================================================

/// Store-wide policy for who confirms payments.
///
/// Fetched once per session from the backend; branched on by the policy
/// function in [`crate::lifecycle`], never directly by screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMode {
    /// Only an admin confirms payment; cashiers send sales for approval.
    #[default]
    Centralized,
    /// Cashiers charge directly at the register.
    Decentralized,
}

impl fmt::Display for PaymentMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PaymentMode::Centralized => write!(f, "centralized"),
            PaymentMode::Decentralized => write!(f, "decentralized"),
        }
    }
}

impl FromStr for PaymentMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "centralized" | "centralizado" | "admin" => Ok(PaymentMode::Centralized),
            "decentralized" | "descentralizado" | "cashier" => Ok(PaymentMode::Decentralized),
            other => Err(ValidationError::InvalidFormat {
                field: "payment_mode",
                reason: format!("unknown mode '{}'", other),
            }),
        }
    }
}

// =============================================================================
// Payment Method
// =============================================================================

/// How a payment is tendered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentKind {
    Cash,
    Card,
    Transfer,
    MobilePayment,
}

/// A payment method configured on the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PaymentMethod {
    pub id: String,
    pub name: String,
    pub kind: PaymentKind,
    /// Currency this method settles in (e.g., "VES", "USD").
    pub currency_code: Option<String>,
}

impl PaymentMethod {
    /// Cash methods require tendered >= total; electronic methods settle
    /// exact amounts.
    pub const fn is_cash(&self) -> bool {
        matches!(self.kind, PaymentKind::Cash)
    }
}

// =============================================================================
// Clients, Products, Catalog
// =============================================================================

/// A registered store client, keyed by national ID (cedula).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Client {
    pub id: String,
    pub cedula: String,
    pub full_name: String,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

/// A product as returned by catalog lookups.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub barcode: Option<String>,
    pub description: Option<String>,
    /// Current list price. Frozen into the cart line on add.
    pub price: Money,
    pub category_id: Option<String>,
    /// Stock is advisory on the client; the backend enforces it on sale.
    pub stock: Option<i64>,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
}

/// An exchange rate administered by the admin role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyRate {
    pub id: String,
    /// ISO-ish code ("USD", "VES", "EUR").
    pub code: String,
    pub name: String,
    /// Units of local currency per one unit of this currency.
    pub rate: f64,
    pub updated_at: Option<DateTime<Utc>>,
}

impl CurrencyRate {
    /// Converts an amount priced in this currency into local currency.
    pub fn to_local(&self, amount: Money) -> Money {
        amount.convert(self.rate)
    }
}

// =============================================================================
// Sale
// =============================================================================

/// A line item in a sale. Unit price is frozen at sale time; later catalog
/// price changes never rewrite history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleLine {
    pub product_id: String,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: Money,
}

impl SaleLine {
    pub fn line_total(&self) -> Money {
        self.unit_price.multiply_quantity(self.quantity)
    }
}

/// A sale as returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Sale {
    pub id: String,
    pub client_id: String,
    pub client_name: String,
    pub lines: Vec<SaleLine>,
    pub total: Money,
    pub status: SaleStatus,
    pub payment_method_id: Option<String>,
    pub created_at: Option<DateTime<Utc>>,

    // The three overlapping delivery fields, as the backend sends them.
    // Use `delivery_state()`, never these directly.
    #[serde(default)]
    pub delivered: Option<bool>,
    #[serde(default)]
    pub delivery_status: Option<String>,
    #[serde(default)]
    pub delivered_at: Option<DateTime<Utc>>,
}

impl Sale {
    /// The canonical delivery state (see [`DeliveryState::from_fields`]).
    pub fn delivery_state(&self) -> DeliveryState {
        DeliveryState::from_fields(
            self.delivered,
            self.delivery_status.as_deref(),
            self.delivered_at.as_ref(),
        )
    }

    /// Sum of line totals; should equal `total` unless the backend applied
    /// an adjustment the client does not model.
    pub fn computed_total(&self) -> Money {
        self.lines
            .iter()
            .fold(Money::zero(), |acc, l| acc + l.line_total())
    }
}

// =============================================================================
// User Accounts (admin user management)
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserAccount {
    pub id: String,
    pub username: String,
    pub job_position: String,
    #[serde(default)]
    pub is_superuser: bool,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

impl UserAccount {
    /// Parsed role; superusers act as admins regardless of position string.
    pub fn role(&self) -> Result<Role, ValidationError> {
        if self.is_superuser {
            return Ok(Role::Admin);
        }
        self.job_position.parse()
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_parses_both_spellings() {
        assert_eq!("cashier".parse::<Role>().unwrap(), Role::Cashier);
        assert_eq!("Cajero".parse::<Role>().unwrap(), Role::Cashier);
        assert_eq!("almacenista".parse::<Role>().unwrap(), Role::Warehouse);
        assert_eq!("administrador".parse::<Role>().unwrap(), Role::Admin);
        assert!("gerente".parse::<Role>().is_err());
    }

    #[test]
    fn test_delivery_precedence_delivered_flag_wins() {
        let state = DeliveryState::from_fields(Some(true), None, None);
        assert!(state.is_delivered());
    }

    #[test]
    fn test_delivery_precedence_status_string() {
        let state = DeliveryState::from_fields(None, Some("delivered"), None);
        assert!(state.is_delivered());

        let state = DeliveryState::from_fields(Some(false), Some("in_transit"), None);
        assert!(!state.is_delivered());
    }

    #[test]
    fn test_delivery_precedence_timestamp_alone() {
        let state = DeliveryState::from_fields(None, None, Some(&Utc::now()));
        assert!(state.is_delivered());
    }

    #[test]
    fn test_delivery_all_absent_is_undelivered() {
        let state = DeliveryState::from_fields(None, None, None);
        assert!(!state.is_delivered());
    }

    #[test]
    fn test_sale_status_serde_is_snake_case() {
        assert_eq!(
            serde_json::to_string(&SaleStatus::Pending).unwrap(),
            "\"pending\""
        );
        let status: SaleStatus = serde_json::from_str("\"paid\"").unwrap();
        assert_eq!(status, SaleStatus::Paid);
    }

    #[test]
    fn test_sale_computed_total_matches_lines() {
        let sale = Sale {
            id: "s1".into(),
            client_id: "c1".into(),
            client_name: "Maria".into(),
            lines: vec![
                SaleLine {
                    product_id: "p1".into(),
                    product_name: "Harina".into(),
                    quantity: 2,
                    unit_price: Money::from_cents(150),
                },
                SaleLine {
                    product_id: "p2".into(),
                    product_name: "Arroz".into(),
                    quantity: 1,
                    unit_price: Money::from_cents(200),
                },
            ],
            total: Money::from_cents(500),
            status: SaleStatus::Pending,
            payment_method_id: None,
            created_at: None,
            delivered: None,
            delivery_status: None,
            delivered_at: None,
        };
        assert_eq!(sale.computed_total(), sale.total);
    }

    #[test]
    fn test_superuser_is_admin_regardless_of_position() {
        let user = UserAccount {
            id: "u1".into(),
            username: "root".into(),
            job_position: "cajero".into(),
            is_superuser: true,
            is_active: true,
        };
        assert_eq!(user.role().unwrap(), Role::Admin);
    }
}
