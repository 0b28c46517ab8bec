//! # Typed Endpoint Groups
//!
//! Thin, typed wrappers over the backend's REST routes, grouped the way
//! the backend groups them. Each group borrows the [`crate::ApiClient`]
//! and is obtained through its accessors (`api.sales()`, `api.clients()`,
//! ...).
//!
//! These wrappers perform no business validation; that belongs to
//! [`crate::workflow`] (client-side guards) and the backend (authority).

mod catalog;
mod clients;
mod currency;
mod payments;
mod sales;
mod users;

pub use catalog::CatalogApi;
pub use clients::{ClientsApi, RegisterClientRequest};
pub use currency::CurrencyApi;
pub use payments::PaymentsApi;
pub use sales::{ApproveSaleRequest, CreateSaleRequest, RegisterPaymentRequest, SalesApi};
pub use users::{CreateUserRequest, UsersApi};
