//! # gymdesk-rbac: Resource permissions
//!
//! Decides which of four operations (create, read, update, delete) a user
//! may perform on each named resource of the application:
//! - **Resource catalog**: every protected resource and its applicable operations
//! - **Permission resolver**: effective grant with the superadmin override
//! - **Permission store**: per-(user, resource) records with upsert semantics
//! - **Permission editor**: bulk editing of one user's grants
//! - **Access gate / enforcer**: screen affordances and server-side checks
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────┐      ┌──────────────────────┐
//! │ ResourceCatalog  │─────▶│ PermissionEditor     │──upsert_batch──┐
//! └──────────────────┘      └──────────────────────┘                │
//!                                                                   ▼
//! ┌──────────────────┐      ┌──────────────────────┐      ┌──────────────────┐
//! │ Session          │─────▶│ PermissionResolver   │◀─────│ PermissionStore  │
//! │ (user, role)     │      └──────────┬───────────┘      └──────────────────┘
//! └──────────────────┘                 │
//!                          ┌───────────┴───────────┐
//!                          ▼                       ▼
//!                   AccessGate (UI)      PermissionEnforcer (server)
//! ```
//!
//! ## Resolution
//!
//! | Caller              | Stored record | Effective grant                 |
//! |---------------------|---------------|---------------------------------|
//! | `SUPERADMIN`        | any / none    | create, read, update, delete    |
//! | any other role      | present       | the record, verbatim            |
//! | any other role      | absent        | default grant (read only)       |
//!
//! ## Examples
//!
//! ```
//! use std::sync::Arc;
//!
//! use gymdesk_rbac::catalog::keys;
//! use gymdesk_rbac::{InMemoryPermissionStore, PermissionEditor, ResourceCatalog};
//! use gymdesk_types::{Operation, UserId};
//!
//! let store = Arc::new(InMemoryPermissionStore::new());
//! let catalog = Arc::new(ResourceCatalog::standard().clone());
//! let mut editor = PermissionEditor::new(catalog, store.clone());
//!
//! editor.select_user(UserId::new(7))?;
//! editor.toggle(keys::STUDENTS, Operation::Create)?;
//! let report = editor.save()?;
//!
//! assert_eq!(report.written, vec![keys::STUDENTS]);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod catalog;
pub mod editor;
pub mod enforcement;
pub mod gate;
pub mod grant;
pub mod resolver;
pub mod store;

// Re-export commonly used types
pub use catalog::{CatalogError, ResourceCatalog, ResourceDescriptor};
pub use editor::{
    EditorError, EditorResult, EditorRow, EditorState, PermissionEditor, SaveReport, SaveStrategy,
};
pub use enforcement::{EnforcementError, PermissionEnforcer};
pub use gate::{AccessGate, Affordances};
pub use grant::{Grant, OperationSet, PermissionRecord};
pub use resolver::{EffectivePermission, GrantSource, PermissionResolver};
pub use store::{
    InMemoryPermissionStore, InMemoryUserDirectory, PermissionStore, StoreError, StoreResult,
    UserDirectory,
};
