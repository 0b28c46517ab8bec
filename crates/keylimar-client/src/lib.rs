//! # keylimar-client: Session and REST Layer for the Keylimar POS
//!
//! Everything between the UI and the backend lives here: the session
//! manager (login, silent refresh, keep-alive ping), the authenticated
//! HTTP client with its 401 handling and retry policy, typed endpoint
//! wrappers for the backend's routes, and the sale-workflow orchestrator
//! that enforces the [`keylimar_core`] rules before any request is sent.
//!
//! ## Modules
//!
//! - [`config`] - Client configuration (base URL, timeouts, ping interval)
//! - [`error`] - [`ApiError`] with kind categorization
//! - [`store`] - Persisted token storage ([`store::TokenStore`])
//! - [`session`] - [`SessionManager`] and the keep-alive task
//! - [`http`] - [`ApiClient`], the single fetch wrapper
//! - [`api`] - Typed endpoint groups (clients, catalog, sales, ...)
//! - [`workflow`] - [`SaleWorkflow`], the sale lifecycle driver

pub mod api;
pub mod config;
pub mod error;
pub mod http;
pub mod session;
pub mod store;
pub mod workflow;

pub use config::ClientConfig;
pub use error::{ApiError, ApiResult};
pub use http::ApiClient;
pub use session::{
    KeepaliveHandle, NoOpSessionEvents, SessionClaims, SessionEvents, SessionManager,
    SessionPhase,
};
pub use store::{FileTokenStore, MemoryTokenStore, TokenPair, TokenStore};
pub use workflow::SaleWorkflow;
