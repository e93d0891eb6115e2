//! Permission editor.
//!
//! Lets an administrator pick a user and edit that user's grants against the
//! whole resource catalog on one screen. Toggles only mutate local state;
//! nothing reaches the store until [`PermissionEditor::save`].
//!
//! ## States
//!
//! ```text
//! NoUserSelected ──select_user──▶ LoadingGrants ──ok──▶ Ready ◀──┐
//!                                      │                  │      │
//!                                      └──err──▶ LoadFailed      │ ok / err
//!                                                (reselect)      │
//!                                                  Ready ──save──▶ Saving
//! ```
//!
//! `LoadingGrants` and `Saving` are held only for the duration of
//! [`PermissionEditor::select_user`] and [`PermissionEditor::save`]. Stores
//! are synchronous, so callers only ever see the state each call settles in.
//!
//! ## Saving
//!
//! [`SaveStrategy::Transactional`] (the default) diffs the edited grants
//! against what was loaded and writes only the changed resources through a
//! single atomic [`PermissionStore::upsert_batch`]. A failure leaves the
//! store untouched.
//!
//! [`SaveStrategy::FanOut`] writes every catalog resource with one concurrent
//! upsert each. Some writes may succeed while others fail; the failure is
//! still reported as a single [`EditorError::SaveFailure`].
//!
//! In both cases local edits are kept after a failure so the save can be
//! retried immediately.

use std::collections::BTreeMap;
use std::sync::Arc;

use gymdesk_types::{Operation, Role, UserId, UserSummary};
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{info, warn};

use crate::catalog::{ResourceCatalog, ResourceDescriptor};
use crate::grant::{Grant, PermissionRecord};
use crate::store::{PermissionStore, StoreError, UserDirectory};

/// Result type for editor operations.
pub type EditorResult<T> = std::result::Result<T, EditorError>;

/// Lifecycle state of the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditorState {
    NoUserSelected,
    /// Set while `select_user` reads the store. Never returned by `state()`.
    LoadingGrants,
    Ready,
    LoadFailed,
    /// Set while `save` writes. Never returned by `state()`; `save` always
    /// settles back in `Ready`.
    Saving,
}

/// How [`PermissionEditor::save`] writes to the store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SaveStrategy {
    /// Write only changed resources, atomically.
    #[default]
    Transactional,
    /// Write every catalog resource, one concurrent upsert each.
    FanOut,
}

/// Errors surfaced by the editor.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum EditorError {
    #[error("no user selected")]
    NoUserSelected,

    #[error("editor is not ready (state: {state:?})")]
    NotReady { state: EditorState },

    #[error("unknown resource: {0}")]
    UnknownResource(String),

    #[error("operation '{operation}' does not apply to resource '{resource}'")]
    OperationNotApplicable {
        resource: String,
        operation: Operation,
    },

    #[error("resource '{0}' does not support the total toggle")]
    TotalNotAvailable(String),

    #[error("failed to list users: {0}")]
    Directory(StoreError),

    #[error("failed to load permissions: {0}")]
    LoadFailure(StoreError),

    #[error("failed to save permissions for {} resource(s): {cause}", .failed.len())]
    SaveFailure {
        /// Resources whose write did not go through.
        failed: Vec<String>,
        cause: StoreError,
    },
}

impl EditorError {
    /// Generic text shown to the administrator in a banner or toast.
    pub fn user_message(&self) -> &'static str {
        match self {
            EditorError::LoadFailure(_) => {
                "Não foi possível carregar as permissões. Selecione o usuário novamente."
            }
            EditorError::SaveFailure { .. } => "Erro ao salvar permissões. Tente novamente.",
            EditorError::Directory(_) => "Não foi possível carregar a lista de usuários.",
            EditorError::NoUserSelected => "Selecione um usuário.",
            EditorError::NotReady { .. }
            | EditorError::UnknownResource(_)
            | EditorError::OperationNotApplicable { .. }
            | EditorError::TotalNotAvailable(_) => "Ação indisponível.",
        }
    }
}

/// Outcome of a successful save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReport {
    pub user_id: UserId,
    pub strategy: SaveStrategy,
    /// Resource keys written to the store, in catalog order.
    pub written: Vec<String>,
}

/// One catalog row as rendered by the editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorRow<'a> {
    pub resource: &'a ResourceDescriptor,
    pub grant: Grant,
    /// Whether the "Total" toggle is rendered for this row.
    pub total_available: bool,
}

/// Permission editor for one administrator screen.
#[derive(Debug)]
pub struct PermissionEditor<S> {
    catalog: Arc<ResourceCatalog>,
    store: S,
    strategy: SaveStrategy,
    default_grant: Grant,
    state: EditorState,
    user: Option<UserId>,
    loaded: BTreeMap<String, Grant>,
    grants: BTreeMap<String, Grant>,
    last_error: Option<EditorError>,
}

impl<S: PermissionStore> PermissionEditor<S> {
    /// Creates an editor over the given catalog and store.
    pub fn new(catalog: Arc<ResourceCatalog>, store: S) -> Self {
        Self {
            catalog,
            store,
            strategy: SaveStrategy::default(),
            default_grant: Grant::FALLBACK,
            state: EditorState::NoUserSelected,
            user: None,
            loaded: BTreeMap::new(),
            grants: BTreeMap::new(),
            last_error: None,
        }
    }

    /// Sets the save strategy.
    pub fn with_strategy(mut self, strategy: SaveStrategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Sets the grant assumed for resources without a record.
    pub fn with_default_grant(mut self, grant: Grant) -> Self {
        self.default_grant = grant;
        self
    }

    pub fn state(&self) -> EditorState {
        self.state
    }

    pub fn selected_user(&self) -> Option<UserId> {
        self.user
    }

    pub fn catalog(&self) -> &ResourceCatalog {
        &self.catalog
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Last load or save failure, if it has not been cleared since.
    pub fn last_error(&self) -> Option<&EditorError> {
        self.last_error.as_ref()
    }

    /// Banner/toast text for the last failure.
    pub fn banner(&self) -> Option<&'static str> {
        self.last_error.as_ref().map(EditorError::user_message)
    }

    /// Lists users that can be selected.
    ///
    /// Only active users are listed. Unless `show_all` is set, the list is
    /// further restricted to `ADMIN` and `USER` accounts.
    pub fn available_users(
        &self,
        directory: &dyn UserDirectory,
        show_all: bool,
    ) -> EditorResult<Vec<UserSummary>> {
        let users = directory.list_users().map_err(EditorError::Directory)?;
        Ok(users
            .into_iter()
            .filter(UserSummary::is_active)
            .filter(|u| show_all || Role::EDITOR_DEFAULT_ROLES.contains(&u.role))
            .collect())
    }

    /// Selects a user and loads their current grants.
    ///
    /// On failure the editor enters [`EditorState::LoadFailed`] with no
    /// grants; selecting the user again retries the load.
    pub fn select_user(&mut self, user_id: UserId) -> EditorResult<()> {
        self.user = Some(user_id);
        self.state = EditorState::LoadingGrants;
        self.loaded.clear();
        self.grants.clear();
        self.last_error = None;

        match self.store.list_for_user(user_id) {
            Ok(records) => {
                self.loaded = records.into_iter().map(|r| (r.resource, r.grant)).collect();
                self.grants = self.loaded.clone();
                self.state = EditorState::Ready;
                info!(user = %user_id, records = self.loaded.len(), "Permissions loaded");
                Ok(())
            }
            Err(e) => {
                warn!(user = %user_id, error = %e, "Failed to load permissions");
                let err = EditorError::LoadFailure(e);
                self.state = EditorState::LoadFailed;
                self.last_error = Some(err.clone());
                Err(err)
            }
        }
    }

    /// Current (possibly edited) grant of a resource.
    pub fn grant(&self, resource: &str) -> EditorResult<Grant> {
        if self.user.is_none() {
            return Err(EditorError::NoUserSelected);
        }
        self.descriptor(resource)?;
        Ok(self.current(resource))
    }

    /// All catalog rows with their current grants.
    pub fn rows(&self) -> Vec<EditorRow<'_>> {
        self.catalog
            .iter()
            .map(|resource| EditorRow {
                resource,
                grant: self.current(&resource.key),
                total_available: resource.is_full(),
            })
            .collect()
    }

    /// Flips one operation of one resource. Returns the new value.
    pub fn toggle(&mut self, resource: &str, op: Operation) -> EditorResult<bool> {
        self.ensure_ready()?;
        let descriptor = self.descriptor(resource)?;
        if !descriptor.applies(op) {
            return Err(EditorError::OperationNotApplicable {
                resource: resource.to_string(),
                operation: op,
            });
        }

        let mut grant = self.current(resource);
        let value = grant.toggle(op);
        self.grants.insert(resource.to_string(), grant);
        Ok(value)
    }

    /// "Total" toggle of a full resource.
    ///
    /// Clears all four operations if any is set, otherwise sets all four.
    /// Returns the new grant.
    pub fn toggle_total(&mut self, resource: &str) -> EditorResult<Grant> {
        self.ensure_ready()?;
        if !self.descriptor(resource)?.is_full() {
            return Err(EditorError::TotalNotAvailable(resource.to_string()));
        }

        let grant = if self.current(resource).any() {
            Grant::NONE
        } else {
            Grant::FULL
        };
        self.grants.insert(resource.to_string(), grant);
        Ok(grant)
    }

    /// Returns whether `op` is set on every resource it applies to.
    pub fn is_column_checked(&self, op: Operation) -> bool {
        self.catalog
            .supporting(op)
            .all(|r| self.current(&r.key).get(op))
    }

    /// Column toggle: sets `op` to the same value on every resource it
    /// applies to. Returns the value written.
    ///
    /// The new value is `false` only when every such resource already has
    /// `op` set; a mixed column becomes all-`true`. Resources where `op` does
    /// not apply are left untouched.
    pub fn toggle_column(&mut self, op: Operation) -> EditorResult<bool> {
        self.ensure_ready()?;
        let value = !self.is_column_checked(op);

        let keys: Vec<String> = self.catalog.supporting(op).map(|r| r.key.clone()).collect();
        for key in keys {
            let mut grant = self.current(&key);
            grant.set(op, value);
            self.grants.insert(key, grant);
        }
        Ok(value)
    }

    /// Returns whether local state differs from what was loaded.
    pub fn is_dirty(&self) -> bool {
        !self.changed_resources().is_empty()
    }

    /// Catalog resources whose grant differs from the loaded one.
    pub fn changed_resources(&self) -> Vec<&str> {
        self.catalog
            .iter()
            .filter(|r| self.current(&r.key) != self.baseline(&r.key))
            .map(|r| r.key.as_str())
            .collect()
    }

    /// Drops local edits, restoring the loaded grants.
    pub fn discard_changes(&mut self) {
        self.grants = self.loaded.clone();
    }

    /// Persists local edits.
    pub fn save(&mut self) -> EditorResult<SaveReport> {
        let user_id = self.user.ok_or(EditorError::NoUserSelected)?;
        self.ensure_ready()?;

        self.state = EditorState::Saving;
        let result = match self.strategy {
            SaveStrategy::Transactional => self.save_changed(user_id),
            SaveStrategy::FanOut => self.save_all(user_id),
        };
        self.state = EditorState::Ready;

        match result {
            Ok(report) => {
                self.last_error = None;
                info!(
                    user = %user_id,
                    strategy = ?report.strategy,
                    written = report.written.len(),
                    "Permissions saved"
                );
                Ok(report)
            }
            Err(e) => {
                warn!(user = %user_id, error = %e, "Failed to save permissions");
                self.last_error = Some(e.clone());
                Err(e)
            }
        }
    }

    fn save_changed(&mut self, user_id: UserId) -> EditorResult<SaveReport> {
        let records: Vec<PermissionRecord> = self
            .changed_resources()
            .into_iter()
            .map(|key| PermissionRecord::new(user_id, key, self.current(key)))
            .collect();

        let written: Vec<String> = records.iter().map(|r| r.resource.clone()).collect();
        if !records.is_empty() {
            self.store
                .upsert_batch(&records)
                .map_err(|cause| EditorError::SaveFailure {
                    failed: written.clone(),
                    cause,
                })?;
            for record in records {
                self.loaded.insert(record.resource, record.grant);
            }
        }

        Ok(SaveReport {
            user_id,
            strategy: SaveStrategy::Transactional,
            written,
        })
    }

    fn save_all(&mut self, user_id: UserId) -> EditorResult<SaveReport> {
        let records: Vec<PermissionRecord> = self
            .catalog
            .iter()
            .map(|r| PermissionRecord::new(user_id, r.key.clone(), self.current(&r.key)))
            .collect();

        // All writes start before any result is inspected.
        let store = &self.store;
        let outcomes: Vec<(PermissionRecord, Result<PermissionRecord, StoreError>)> = records
            .into_par_iter()
            .map(|record| {
                let outcome = store.upsert(&record);
                (record, outcome)
            })
            .collect();

        let mut written = Vec::new();
        let mut failed = Vec::new();
        let mut cause = None;
        for (record, outcome) in outcomes {
            match outcome {
                Ok(_) => {
                    written.push(record.resource.clone());
                    self.loaded.insert(record.resource, record.grant);
                }
                Err(e) => {
                    failed.push(record.resource);
                    cause.get_or_insert(e);
                }
            }
        }

        match cause {
            None => Ok(SaveReport {
                user_id,
                strategy: SaveStrategy::FanOut,
                written,
            }),
            Some(cause) => {
                warn!(
                    user = %user_id,
                    written = written.len(),
                    failed = ?failed,
                    "Partial permission save"
                );
                Err(EditorError::SaveFailure { failed, cause })
            }
        }
    }

    fn ensure_ready(&self) -> EditorResult<()> {
        match self.state {
            EditorState::Ready => Ok(()),
            EditorState::NoUserSelected => Err(EditorError::NoUserSelected),
            state => Err(EditorError::NotReady { state }),
        }
    }

    fn descriptor(&self, resource: &str) -> EditorResult<&ResourceDescriptor> {
        self.catalog
            .get(resource)
            .ok_or_else(|| EditorError::UnknownResource(resource.to_string()))
    }

    fn current(&self, resource: &str) -> Grant {
        self.grants
            .get(resource)
            .copied()
            .unwrap_or(self.default_grant)
    }

    fn baseline(&self, resource: &str) -> Grant {
        self.loaded
            .get(resource)
            .copied()
            .unwrap_or(self.default_grant)
    }
}
