//! Server-side permission enforcement.
//!
//! The authoritative check paired with every mutating endpoint. Uses the
//! same [`PermissionResolver`] as the screen gates, so both sides agree on
//! what a caller may do.

use gymdesk_types::{Operation, Session};
use thiserror::Error;
use tracing::{info, warn};

use crate::resolver::{EffectivePermission, PermissionResolver};
use crate::store::{PermissionStore, StoreError};

/// Error type for permission enforcement.
#[derive(Debug, Error)]
pub enum EnforcementError {
    /// Caller's effective grant does not include the operation.
    #[error("Access denied: {operation} on '{resource}'")]
    AccessDenied {
        resource: String,
        operation: Operation,
    },

    /// Grants could not be loaded.
    #[error("Permission lookup failed: {0}")]
    Store(#[from] StoreError),
}

/// Result type for enforcement operations.
pub type Result<T> = std::result::Result<T, EnforcementError>;

/// Permission enforcement engine.
#[derive(Debug)]
pub struct PermissionEnforcer<S> {
    store: S,
    resolver: PermissionResolver,

    /// Whether to log access decisions.
    audit_enabled: bool,
}

impl<S: PermissionStore> PermissionEnforcer<S> {
    /// Creates a new enforcer.
    pub fn new(store: S, resolver: PermissionResolver) -> Self {
        Self {
            store,
            resolver,
            audit_enabled: true,
        }
    }

    /// Disables audit logging (for testing).
    pub fn without_audit(mut self) -> Self {
        self.audit_enabled = false;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn resolver(&self) -> &PermissionResolver {
        &self.resolver
    }

    /// Resolves the caller's effective permission on `resource`.
    ///
    /// Superadmin sessions never touch the store.
    pub fn effective(&self, session: &Session, resource: &str) -> Result<EffectivePermission> {
        if session.is_superadmin() {
            return Ok(EffectivePermission::superadmin());
        }
        let records = self.store.list_for_user(session.user_id)?;
        Ok(self.resolver.resolve_in(&session.role, &records, resource))
    }

    /// Checks that `session` may perform `op` on `resource`.
    ///
    /// **Audit:** Logs every decision when enabled.
    pub fn enforce(
        &self,
        session: &Session,
        resource: &str,
        op: Operation,
    ) -> Result<EffectivePermission> {
        let permission = self.effective(session, resource)?;
        let allowed = permission.allows(op);

        if self.audit_enabled {
            if allowed {
                info!(
                    user = %session.user_id,
                    role = %session.role,
                    resource = %resource,
                    operation = %op,
                    source = ?permission.source(),
                    "Permission granted"
                );
            } else {
                warn!(
                    user = %session.user_id,
                    role = %session.role,
                    resource = %resource,
                    operation = %op,
                    source = ?permission.source(),
                    "Permission denied"
                );
            }
        }

        if allowed {
            Ok(permission)
        } else {
            Err(EnforcementError::AccessDenied {
                resource: resource.to_string(),
                operation: op,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grant::{Grant, PermissionRecord};
    use crate::store::InMemoryPermissionStore;
    use gymdesk_types::{Role, UserId};

    fn enforcer(records: Vec<PermissionRecord>) -> PermissionEnforcer<InMemoryPermissionStore> {
        PermissionEnforcer::new(
            InMemoryPermissionStore::with_records(records),
            PermissionResolver::new(),
        )
        .without_audit()
    }

    #[test]
    fn test_superadmin_always_allowed() {
        let enforcer = enforcer(vec![PermissionRecord::new(
            UserId::new(1),
            "alunos",
            Grant::NONE,
        )]);
        let root = Session::new(UserId::new(1), Role::SuperAdmin);

        for op in Operation::ALL {
            assert!(enforcer.enforce(&root, "alunos", op).is_ok());
        }
    }

    #[test]
    fn test_default_grant_allows_read_only() {
        let enforcer = enforcer(vec![]);
        let maria = Session::new(UserId::new(2), Role::User);

        assert!(enforcer.enforce(&maria, "alunos", Operation::Read).is_ok());
        let result = enforcer.enforce(&maria, "alunos", Operation::Delete);
        match result {
            Err(EnforcementError::AccessDenied { resource, operation }) => {
                assert_eq!(resource, "alunos");
                assert_eq!(operation, Operation::Delete);
            }
            _ => panic!("Expected AccessDenied error"),
        }
    }

    #[test]
    fn test_stored_grant_is_enforced() {
        let user = UserId::new(3);
        let enforcer = enforcer(vec![PermissionRecord::new(
            user,
            "treinos",
            Grant::new(false, false, true, false),
        )]);
        let session = Session::new(user, Role::Admin);

        assert!(enforcer.enforce(&session, "treinos", Operation::Update).is_ok());
        assert!(enforcer.enforce(&session, "treinos", Operation::Read).is_err());
    }

    #[test]
    fn test_store_failure_is_not_a_grant() {
        let enforcer = enforcer(vec![]);
        enforcer.store().fail_listing(true).unwrap();
        let session = Session::new(UserId::new(4), Role::User);

        let result = enforcer.enforce(&session, "alunos", Operation::Read);
        assert!(matches!(result, Err(EnforcementError::Store(_))));
    }
}
