//! # gymdesk-server: Permission API for `Gymdesk`
//!
//! Serves the permission endpoints used by the editor and by every screen
//! gate, and enforces the same permissions on the server side.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       gymdesk-server                         │
//! │  ┌────────────┐   ┌───────────────┐   ┌──────────────────┐  │
//! │  │ ApiRequest │ → │ PermissionApi │ → │ PermissionStore  │  │
//! │  │ (http.rs)  │   │  + Enforcer   │   │ (gymdesk-rbac)   │  │
//! │  └────────────┘   └───────────────┘   └──────────────────┘  │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```
//! use gymdesk_config::GymdeskConfig;
//! use gymdesk_server::{ApiRequest, ServerContext};
//! use gymdesk_types::{Role, Session, UserId};
//!
//! let context = ServerContext::from_config(&GymdeskConfig::default());
//! let api = context.api();
//!
//! let root = Session::new(UserId::new(1), Role::SuperAdmin);
//! let response = api.handle(&ApiRequest::get("/permissoes/7", root));
//! assert_eq!(response.status, 200);
//! assert_eq!(response.body, "[]");
//! ```

mod context;
mod error;
mod handler;
pub mod http;
pub mod observability;
pub mod wire;

pub use context::{ServerContext, SharedStore};
pub use error::{ServerError, ServerResult};
pub use handler::PermissionApi;
pub use http::{ApiRequest, ApiResponse, Method};
pub use observability::init_tracing;
