//! # Error Types
//!
//! Domain-specific error types for keylimar-core.
//!
//! ## Error Hierarchy
//! ```text
//! keylimar-core errors (this file)
//! ├── CoreError        - Business rule violations (lifecycle, payment, cart)
//! └── ValidationError  - Input validation failures
//!
//! keylimar-client errors (separate crate)
//! └── ApiError         - Session, transport and backend failures
//!
//! Flow: ValidationError → CoreError → ApiError → UI toast/inline message
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. Include context in error messages (status, amounts, role)
//! 3. Errors are enum variants, never String
//! 4. Each variant maps to a user-facing message the UI can show verbatim

use thiserror::Error;

use crate::money::Money;
use crate::types::{Role, SaleStatus};

// =============================================================================
// Core Error
// =============================================================================

/// Core business logic errors.
///
/// These represent rule violations the client catches before any network
/// call is made. The backend re-checks everything authoritatively.
#[derive(Debug, Error)]
pub enum CoreError {
    /// A sale cannot be created from an empty cart.
    #[error("cannot create a sale without line items")]
    EmptyCart,

    /// Cash received is below the sale total.
    ///
    /// Boundary: paid == total is valid; paid == total - 0.01 is rejected.
    #[error("received amount {paid} cannot be less than the sale total {total}")]
    InsufficientPayment { paid: Money, total: Money },

    /// The requested status change would move the sale backwards.
    #[error("sale cannot move from {from} to {to}")]
    InvalidTransition { from: SaleStatus, to: SaleStatus },

    /// Delivery attempted while payment approval is still pending.
    #[error("sale is pending payment approval and cannot be delivered yet")]
    DeliveryAwaitingApproval,

    /// Delivery attempted on a rejected sale.
    #[error("sale was rejected and cannot be delivered")]
    DeliveryOfRejectedSale,

    /// Delivery attempted on a cancelled sale.
    #[error("sale was cancelled and cannot be delivered")]
    DeliveryOfCancelledSale,

    /// Delivery attempted twice.
    #[error("sale has already been delivered")]
    AlreadyDelivered,

    /// The current role may not perform the requested transition.
    #[error("{role} is not allowed to {action}")]
    RoleNotAllowed { role: Role, action: &'static str },

    /// Cart has exceeded maximum allowed items.
    #[error("cart cannot have more than {max} items")]
    CartTooLarge { max: usize },

    /// Item quantity exceeds maximum allowed.
    #[error("quantity {requested} exceeds maximum allowed ({max})")]
    QuantityTooLarge { requested: i64, max: i64 },

    /// Product is not currently in the cart.
    #[error("product {0} is not in the cart")]
    ProductNotInCart(String),

    /// Validation error (wraps ValidationError).
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
///
/// Raised before business logic runs, for early inline feedback.
#[derive(Debug, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: &'static str },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: &'static str, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange {
        field: &'static str,
        min: i64,
        max: i64,
    },

    /// Invalid format (e.g., malformed cedula or amount).
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: &'static str, reason: String },
}

// =============================================================================
// Result Type Alias
// =============================================================================

/// Convenience type alias for Results with CoreError.
pub type CoreResult<T> = Result<T, CoreError>;

// =============================================================================
// Unit Tests
// =============================================================================
