//! Permission record storage.
//!
//! [`PermissionStore`] is the contract the resolver, editor and enforcer
//! need from durable storage. [`InMemoryPermissionStore`] implements it for
//! tests and single-process deployments.
//!
//! # Upsert semantics
//!
//! Records are written wholesale, keyed by `(user_id, resource)`. Writing the
//! same record twice leaves the same state as writing it once. Records are
//! never deleted automatically.

use std::collections::{BTreeMap, HashSet};
use std::fmt::Debug;
use std::sync::{Arc, RwLock};

use gymdesk_types::{UserId, UserSummary};
use thiserror::Error;
use tracing::debug;

use crate::grant::PermissionRecord;

/// Result type for store operations.
pub type StoreResult<T> = std::result::Result<T, StoreError>;

/// Errors raised by a permission store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// Backend unreachable or request failed in transit.
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    /// Backend rejected the write.
    #[error("storage constraint violated: {0}")]
    Constraint(String),

    /// In-process lock was poisoned by a panicking writer.
    #[error("storage lock poisoned")]
    LockPoisoned,
}

/// Durable storage for permission records.
pub trait PermissionStore: Send + Sync + Debug {
    /// Returns every record of `user_id`, ordered by resource key.
    fn list_for_user(&self, user_id: UserId) -> StoreResult<Vec<PermissionRecord>>;

    /// Overwrites the record for `(record.user_id, record.resource)`.
    fn upsert(&self, record: &PermissionRecord) -> StoreResult<PermissionRecord>;

    /// Overwrites several records atomically.
    ///
    /// Either every record is written or none is.
    fn upsert_batch(&self, records: &[PermissionRecord]) -> StoreResult<Vec<PermissionRecord>>;
}

impl<T: PermissionStore + ?Sized> PermissionStore for Arc<T> {
    fn list_for_user(&self, user_id: UserId) -> StoreResult<Vec<PermissionRecord>> {
        (**self).list_for_user(user_id)
    }

    fn upsert(&self, record: &PermissionRecord) -> StoreResult<PermissionRecord> {
        (**self).upsert(record)
    }

    fn upsert_batch(&self, records: &[PermissionRecord]) -> StoreResult<Vec<PermissionRecord>> {
        (**self).upsert_batch(records)
    }
}

impl<T: PermissionStore + ?Sized> PermissionStore for &T {
    fn list_for_user(&self, user_id: UserId) -> StoreResult<Vec<PermissionRecord>> {
        (**self).list_for_user(user_id)
    }

    fn upsert(&self, record: &PermissionRecord) -> StoreResult<PermissionRecord> {
        (**self).upsert(record)
    }

    fn upsert_batch(&self, records: &[PermissionRecord]) -> StoreResult<Vec<PermissionRecord>> {
        (**self).upsert_batch(records)
    }
}

/// In-memory permission store.
///
/// Records live in a `BTreeMap` keyed by `(user_id, resource)`, so listing a
/// user's records yields them ordered by resource key. Faults can be injected
/// per resource or for listing to exercise the editor's failure paths.
#[derive(Debug, Default)]
pub struct InMemoryPermissionStore {
    records: RwLock<BTreeMap<(UserId, String), PermissionRecord>>,
    faults: RwLock<Faults>,
}

#[derive(Debug, Default)]
struct Faults {
    resources: HashSet<String>,
    listing: bool,
}

impl InMemoryPermissionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with `records`.
    pub fn with_records(records: impl IntoIterator<Item = PermissionRecord>) -> Self {
        let map = records
            .into_iter()
            .map(|r| ((r.user_id, r.resource.clone()), r))
            .collect();
        Self {
            records: RwLock::new(map),
            faults: RwLock::default(),
        }
    }

    /// Makes every subsequent write to `resource` fail with `Unavailable`.
    pub fn fail_resource(&self, resource: impl Into<String>) -> StoreResult<()> {
        let mut faults = self.faults.write().map_err(|_| StoreError::LockPoisoned)?;
        faults.resources.insert(resource.into());
        Ok(())
    }

    /// Makes every subsequent `list_for_user` fail with `Unavailable`.
    pub fn fail_listing(&self, fail: bool) -> StoreResult<()> {
        let mut faults = self.faults.write().map_err(|_| StoreError::LockPoisoned)?;
        faults.listing = fail;
        Ok(())
    }

    /// Removes all injected faults.
    pub fn clear_faults(&self) -> StoreResult<()> {
        let mut faults = self.faults.write().map_err(|_| StoreError::LockPoisoned)?;
        *faults = Faults::default();
        Ok(())
    }

    /// Returns the stored record for `(user_id, resource)`, if any.
    pub fn get(&self, user_id: UserId, resource: &str) -> StoreResult<Option<PermissionRecord>> {
        let records = self.records.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(records.get(&(user_id, resource.to_string())).cloned())
    }

    /// Total number of stored records across all users.
    pub fn len(&self) -> StoreResult<usize> {
        let records = self.records.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(records.len())
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }

    fn check_write(&self, resource: &str) -> StoreResult<()> {
        let faults = self.faults.read().map_err(|_| StoreError::LockPoisoned)?;
        if faults.resources.contains(resource) {
            return Err(StoreError::Unavailable(format!(
                "simulated failure writing '{resource}'"
            )));
        }
        Ok(())
    }
}

impl PermissionStore for InMemoryPermissionStore {
    fn list_for_user(&self, user_id: UserId) -> StoreResult<Vec<PermissionRecord>> {
        {
            let faults = self.faults.read().map_err(|_| StoreError::LockPoisoned)?;
            if faults.listing {
                return Err(StoreError::Unavailable("simulated listing failure".into()));
            }
        }

        let records = self.records.read().map_err(|_| StoreError::LockPoisoned)?;
        Ok(records
            .range((user_id, String::new())..)
            .take_while(|((uid, _), _)| *uid == user_id)
            .map(|(_, r)| r.clone())
            .collect())
    }

    fn upsert(&self, record: &PermissionRecord) -> StoreResult<PermissionRecord> {
        self.check_write(&record.resource)?;

        let mut records = self.records.write().map_err(|_| StoreError::LockPoisoned)?;
        records.insert((record.user_id, record.resource.clone()), record.clone());
        debug!(user = %record.user_id, resource = %record.resource, "Permission record upserted");
        Ok(record.clone())
    }

    fn upsert_batch(&self, records: &[PermissionRecord]) -> StoreResult<Vec<PermissionRecord>> {
        // Validate everything before touching the map so a failure writes nothing.
        let mut seen = HashSet::with_capacity(records.len());
        for record in records {
            self.check_write(&record.resource)?;
            if !seen.insert((record.user_id, record.resource.as_str())) {
                return Err(StoreError::Constraint(format!(
                    "duplicate record for user {} and resource '{}' in batch",
                    record.user_id, record.resource
                )));
            }
        }

        let mut map = self.records.write().map_err(|_| StoreError::LockPoisoned)?;
        for record in records {
            map.insert((record.user_id, record.resource.clone()), record.clone());
        }
        debug!(count = records.len(), "Permission batch upserted");
        Ok(records.to_vec())
    }
}

/// Source of users that can receive grants.
pub trait UserDirectory: Send + Sync + Debug {
    /// Returns every known user, in display order.
    fn list_users(&self) -> StoreResult<Vec<UserSummary>>;
}

/// In-memory user directory.
#[derive(Debug, Default, Clone)]
pub struct InMemoryUserDirectory {
    users: Vec<UserSummary>,
}

impl InMemoryUserDirectory {
    pub fn new(users: Vec<UserSummary>) -> Self {
        Self { users }
    }
}

impl UserDirectory for InMemoryUserDirectory {
    fn list_users(&self) -> StoreResult<Vec<UserSummary>> {
        Ok(self.users.clone())
    }
}
