//! Permission resolution.
//!
//! Computes the effective grant of a caller against one resource. The
//! superadmin role overrides every stored record; other roles get the stored
//! record verbatim, or the configured default grant when none exists.
//!
//! The resolver is pure: the caller's role and the stored record(s) are
//! passed in explicitly, so every consumption site and every server-side
//! check share the same decision logic.

use gymdesk_types::{Operation, Role};
use serde::{Deserialize, Serialize};

use crate::grant::{Grant, PermissionRecord};

/// Where an effective grant came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GrantSource {
    /// Superadmin role: full grant regardless of storage.
    SuperadminOverride,
    /// Stored permission record, returned verbatim.
    Stored,
    /// No record found; the configured default grant applies.
    Default,
}

/// Resolved grant for one (caller, resource) pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EffectivePermission {
    grant: Grant,
    source: GrantSource,
}

impl EffectivePermission {
    /// Full grant synthesized for superadmin callers.
    pub fn superadmin() -> Self {
        Self {
            grant: Grant::FULL,
            source: GrantSource::SuperadminOverride,
        }
    }

    pub fn grant(&self) -> Grant {
        self.grant
    }

    pub fn source(&self) -> GrantSource {
        self.source
    }

    pub fn allows(&self, op: Operation) -> bool {
        self.grant.get(op)
    }

    pub fn can_create(&self) -> bool {
        self.grant.create
    }

    pub fn can_read(&self) -> bool {
        self.grant.read
    }

    pub fn can_update(&self) -> bool {
        self.grant.update
    }

    pub fn can_delete(&self) -> bool {
        self.grant.delete
    }
}

/// Resolves effective permissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PermissionResolver {
    default_grant: Grant,
}

impl PermissionResolver {
    /// Creates a resolver using [`Grant::FALLBACK`] for missing records.
    pub fn new() -> Self {
        Self {
            default_grant: Grant::FALLBACK,
        }
    }

    /// Overrides the grant applied when no record exists.
    pub fn with_default_grant(mut self, grant: Grant) -> Self {
        self.default_grant = grant;
        self
    }

    /// Grant applied when no record exists.
    pub fn default_grant(&self) -> Grant {
        self.default_grant
    }

    /// Resolves the effective permission from an optional stored record.
    ///
    /// # Examples
    ///
    /// ```
    /// use gymdesk_rbac::{Grant, PermissionRecord, PermissionResolver};
    /// use gymdesk_types::{Role, UserId};
    ///
    /// let resolver = PermissionResolver::new();
    /// let denied = PermissionRecord::new(UserId::new(1), "alunos", Grant::NONE);
    ///
    /// // Superadmin ignores the record.
    /// assert_eq!(resolver.resolve(&Role::SuperAdmin, Some(&denied)).grant(), Grant::FULL);
    ///
    /// // Everyone else gets it verbatim.
    /// assert_eq!(resolver.resolve(&Role::User, Some(&denied)).grant(), Grant::NONE);
    ///
    /// // Missing record: read open, writes closed.
    /// assert_eq!(resolver.resolve(&Role::User, None).grant(), Grant::FALLBACK);
    /// ```
    pub fn resolve(&self, role: &Role, stored: Option<&PermissionRecord>) -> EffectivePermission {
        if role.is_superadmin() {
            return EffectivePermission::superadmin();
        }

        match stored {
            Some(record) => EffectivePermission {
                grant: record.grant,
                source: GrantSource::Stored,
            },
            None => EffectivePermission {
                grant: self.default_grant,
                source: GrantSource::Default,
            },
        }
    }

    /// Resolves one resource out of a user's full record list.
    ///
    /// Records for other resources (including orphans no longer in the
    /// catalog) are ignored.
    pub fn resolve_in(
        &self,
        role: &Role,
        records: &[PermissionRecord],
        resource: &str,
    ) -> EffectivePermission {
        let stored = records.iter().find(|r| r.resource == resource);
        self.resolve(role, stored)
    }
}

impl Default for PermissionResolver {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gymdesk_types::UserId;
    use proptest::prelude::*;

    fn any_grant() -> impl Strategy<Value = Grant> {
        (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>())
            .prop_map(|(c, r, u, d)| Grant::new(c, r, u, d))
    }

    fn non_superadmin() -> impl Strategy<Value = Role> {
        prop_oneof![
            Just(Role::Admin),
            Just(Role::User),
            Just(Role::Student),
            // Includes near misses such as "superadmin" or "SuperAdmin"
            "[A-Za-z ]{1,12}"
                .prop_filter("exact superadmin name", |name| name != "SUPERADMIN")
                .prop_map(Role::Other),
        ]
    }

    proptest! {
        /// Property: Superadmin always resolves to the full grant
        #[test]
        fn prop_superadmin_always_full(
            grant in proptest::option::of(any_grant()),
            resource in "[a-z_]{1,24}",
        ) {
            let record = grant.map(|g| PermissionRecord::new(UserId::new(1), resource, g));
            let effective = PermissionResolver::new().resolve(&Role::SuperAdmin, record.as_ref());

            prop_assert_eq!(effective.grant(), Grant::FULL);
            prop_assert_eq!(effective.source(), GrantSource::SuperadminOverride);
        }

        /// Property: Missing record resolves to the read-only default
        #[test]
        fn prop_missing_record_is_default(role in non_superadmin()) {
            let effective = PermissionResolver::new().resolve(&role, None);

            prop_assert_eq!(effective.grant(), Grant::FALLBACK);
            prop_assert_eq!(effective.source(), GrantSource::Default);
        }

        /// Property: Stored record is returned without field substitution
        #[test]
        fn prop_stored_record_is_verbatim(role in non_superadmin(), grant in any_grant()) {
            let record = PermissionRecord::new(UserId::new(9), "alunos", grant);
            let effective = PermissionResolver::new().resolve(&role, Some(&record));

            prop_assert_eq!(effective.grant(), grant);
            prop_assert_eq!(effective.source(), GrantSource::Stored);
        }
    }

    #[test]
    fn test_superadmin_ignores_all_false_record() {
        let record = PermissionRecord::new(UserId::new(1), "clientes", Grant::NONE);
        let effective = PermissionResolver::new().resolve(&Role::SuperAdmin, Some(&record));

        assert!(effective.can_create());
        assert!(effective.can_read());
        assert!(effective.can_update());
        assert!(effective.can_delete());
    }

    #[test]
    fn test_configured_default_grant() {
        let resolver = PermissionResolver::new().with_default_grant(Grant::NONE);
        let effective = resolver.resolve(&Role::User, None);

        assert_eq!(effective.grant(), Grant::NONE);
        assert!(!effective.can_read());
    }

    #[test]
    fn test_resolve_in_picks_matching_resource() {
        let user = UserId::new(3);
        let records = vec![
            PermissionRecord::new(user, "alunos", Grant::FULL),
            PermissionRecord::new(user, "treinos", Grant::NONE),
            PermissionRecord::new(user, "recurso_removido", Grant::FULL),
        ];
        let resolver = PermissionResolver::new();

        assert_eq!(resolver.resolve_in(&Role::User, &records, "treinos").grant(), Grant::NONE);
        assert_eq!(resolver.resolve_in(&Role::User, &records, "alunos").grant(), Grant::FULL);
        assert_eq!(
            resolver.resolve_in(&Role::User, &records, "medidas").grant(),
            Grant::FALLBACK
        );
    }

    #[test]
    fn test_superadmin_match_is_exact() {
        let record = PermissionRecord::new(UserId::new(5), "alunos", Grant::NONE);
        let resolver = PermissionResolver::new();

        for name in ["superadmin", "SuperAdmin", " SUPERADMIN "] {
            let role = Role::parse(name).unwrap();
            assert_eq!(resolver.resolve(&role, None).grant(), Grant::FALLBACK);
            assert_eq!(resolver.resolve(&role, Some(&record)).grant(), Grant::NONE);
        }

        let exact = Role::parse("SUPERADMIN").unwrap();
        assert_eq!(resolver.resolve(&exact, Some(&record)).grant(), Grant::FULL);
    }

    #[test]
    fn test_unknown_role_uses_record_then_default() {
        let professor = Role::parse("PROFESSOR").unwrap();
        let record = PermissionRecord::new(UserId::new(6), "treinos", Grant::FULL);
        let resolver = PermissionResolver::new();

        assert_eq!(
            resolver.resolve_in(&professor, std::slice::from_ref(&record), "treinos").source(),
            GrantSource::Stored
        );
        assert_eq!(
            resolver.resolve_in(&professor, &[record], "alunos").grant(),
            Grant::FALLBACK
        );
    }

    #[test]
    fn test_backup_delete_defaults_to_denied() {
        // Maria (USER) has no record for backup_excluir
        let effective = PermissionResolver::new().resolve_in(&Role::User, &[], "backup_excluir");
        assert!(!effective.allows(Operation::Delete));
    }
}
