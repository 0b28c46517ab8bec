//! # keylimar-core: Pure Business Logic for the Keylimar POS Client
//!
//! Everything in this crate is a pure function over plain data: no network,
//! no storage, no async. The backend remains authoritative for inventory,
//! pricing and persistence; this crate mirrors the rules the client needs to
//! enforce *before* issuing a request.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Keylimar POS Client Stack                          │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                  UI (screens, not in this repo)                 │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │           keylimar-client (session, REST, workflow)             │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ keylimar-core (THIS CRATE) ★                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │   types   │  │   money   │  │   cart    │  │ lifecycle │  │   │
//! │  │   │  Sale     │  │   Money   │  │   Cart    │  │ statuses  │  │   │
//! │  │   │  Role     │  │  change   │  │ CartItem  │  │  policy   │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO NETWORK • PURE FUNCTIONS                         │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Sale, Client, Product, Role, etc.)
//! - [`money`] - Money type with integer arithmetic (no floating point!)
//! - [`cart`] - Client-local ephemeral cart
//! - [`lifecycle`] - Sale status transitions and payment policy
//! - [`validation`] - Input validation rules
//! - [`error`] - Domain error types

pub mod cart;
pub mod error;
pub mod lifecycle;
pub mod money;
pub mod types;
pub mod validation;

pub use cart::{Cart, CartItem};
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

/// Maximum distinct line items allowed in a single cart.
///
/// Prevents runaway carts; the backend applies its own ceiling as well.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single item in the cart.
///
/// Guards against fat-finger quantities (1000 typed instead of 10).
pub const MAX_LINE_QUANTITY: i64 = 999;
