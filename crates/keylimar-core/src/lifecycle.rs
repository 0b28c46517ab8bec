//! # Sale Lifecycle
//!
//! Status transitions and role policy for the sale workflow.
//!
//! ## Status Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Sale Status Transitions                          │
//! │                                                                         │
//! │              approve (admin)                deliver (cashier)           │
//! │  ┌─────────┐ ──────────────► ┌────────┐ ──────────────► [delivered]    │
//! │  │ Pending │                 │  Paid  │                                 │
//! │  └────┬────┘                 └────────┘                                 │
//! │       │ reject (admin)                                                  │
//! │       ├──────────────► Rejected   (terminal)                            │
//! │       │ cancel                                                          │
//! │       └──────────────► Cancelled  (terminal)                            │
//! │                                                                         │
//! │  Transitions are monotonic forward. There is no path backwards, and    │
//! │  no UI exposes one. Delivery is a flag on a Paid sale, not a status.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every guard here is advisory: the backend re-validates each transition.
//! The point of the client-side check is to fail fast with a precise
//! message and to guarantee no request is issued for a doomed transition.

use crate::error::{CoreError, CoreResult};
use crate::money::Money;
use crate::types::{DeliveryState, PaymentMethod, PaymentMode, Role, SaleStatus};

// =============================================================================
// Status Transitions
// =============================================================================

impl SaleStatus {
    /// Whether the forward transition `self -> next` is legal.
    pub fn can_transition_to(&self, next: SaleStatus) -> bool {
        matches!(
            (self, next),
            (SaleStatus::Pending, SaleStatus::Paid)
                | (SaleStatus::Pending, SaleStatus::Rejected)
                | (SaleStatus::Pending, SaleStatus::Cancelled)
        )
    }
}

/// Checks a transition, producing a typed error for the UI on violation.
pub fn check_transition(from: SaleStatus, to: SaleStatus) -> CoreResult<()> {
    if from.can_transition_to(to) {
        Ok(())
    } else {
        Err(CoreError::InvalidTransition { from, to })
    }
}

// =============================================================================
// Delivery Guard
// =============================================================================

/// Verifies a sale may be marked delivered.
///
/// Fails with a distinct message per non-deliverable state so the register
/// screen can explain exactly why. Callers must not issue a network call
/// when this fails.
pub fn check_deliverable(status: SaleStatus, delivery: DeliveryState) -> CoreResult<()> {
    match status {
        SaleStatus::Pending => Err(CoreError::DeliveryAwaitingApproval),
        SaleStatus::Rejected => Err(CoreError::DeliveryOfRejectedSale),
        SaleStatus::Cancelled => Err(CoreError::DeliveryOfCancelledSale),
        SaleStatus::Paid => {
            if delivery.is_delivered() {
                Err(CoreError::AlreadyDelivered)
            } else {
                Ok(())
            }
        }
    }
}

// =============================================================================
// Role Policy
// =============================================================================

/// The single policy-evaluation point for the payment-mode flag.
///
/// | mode          | cashier confirms | admin confirms |
/// |---------------|------------------|----------------|
/// | Decentralized | yes              | yes            |
/// | Centralized   | no (sends for approval) | yes     |
///
/// Warehouse never confirms payments.
pub fn can_confirm_payment(role: Role, mode: PaymentMode) -> bool {
    match (role, mode) {
        (Role::Admin, _) => true,
        (Role::Cashier, PaymentMode::Decentralized) => true,
        (Role::Cashier, PaymentMode::Centralized) => false,
        (Role::Warehouse, _) => false,
    }
}

/// Approve/reject are admin-only transitions.
pub fn check_can_review(role: Role) -> CoreResult<()> {
    if role == Role::Admin {
        Ok(())
    } else {
        Err(CoreError::RoleNotAllowed {
            role,
            action: "approve or reject sales",
        })
    }
}

/// Delivery confirmation happens at the register and is cashier-only.
pub fn check_can_deliver(role: Role) -> CoreResult<()> {
    if role == Role::Cashier {
        Ok(())
    } else {
        Err(CoreError::RoleNotAllowed {
            role,
            action: "mark sales as delivered",
        })
    }
}

// =============================================================================
// Payment Validation
// =============================================================================

/// Validates a payment amount against the sale total before it is sent.
///
/// Cash must cover the total (change is returned from the drawer);
/// electronic methods settle the exact total, so any positive amount the
/// backend accepts is passed through.
pub fn validate_payment(method: &PaymentMethod, paid: Money, total: Money) -> CoreResult<()> {
    if method.is_cash() && paid < total {
        return Err(CoreError::InsufficientPayment { paid, total });
    }
    Ok(())
}
