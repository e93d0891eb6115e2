//! Screen-level access gate.
//!
//! Every list/detail screen decides which affordances (create, edit, delete
//! buttons) to render for its resource. Superadmin sessions get a full grant
//! without a store round-trip; everyone else fetches their full record list
//! and picks the entry for the screen's resource, falling back to the
//! default grant.
//!
//! This is a rendering gate only. Mutating endpoints must still go through
//! [`PermissionEnforcer`](crate::enforcement::PermissionEnforcer).

use gymdesk_types::{Operation, Session};
use serde::{Deserialize, Serialize};

use crate::catalog::ResourceDescriptor;
use crate::resolver::{EffectivePermission, PermissionResolver};
use crate::store::{PermissionStore, StoreResult};

/// Affordances a screen may render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Affordances {
    pub can_view: bool,
    pub can_create: bool,
    pub can_edit: bool,
    pub can_delete: bool,
}

impl Affordances {
    /// Derives affordances from an effective permission.
    ///
    /// An affordance is rendered only when the operation is granted and
    /// applies to the resource.
    pub fn from_permission(permission: &EffectivePermission, resource: &ResourceDescriptor) -> Self {
        let allowed = |op: Operation| resource.applies(op) && permission.allows(op);
        Self {
            can_view: allowed(Operation::Read),
            can_create: allowed(Operation::Create),
            can_edit: allowed(Operation::Update),
            can_delete: allowed(Operation::Delete),
        }
    }

    /// Returns whether the affordance for `op` is rendered.
    pub fn allows(&self, op: Operation) -> bool {
        match op {
            Operation::Create => self.can_create,
            Operation::Read => self.can_view,
            Operation::Update => self.can_edit,
            Operation::Delete => self.can_delete,
        }
    }

    /// Returns whether nothing may be rendered.
    pub fn is_hidden(&self) -> bool {
        !(self.can_view || self.can_create || self.can_edit || self.can_delete)
    }
}

/// Access decision for one screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccessGate {
    permission: EffectivePermission,
    affordances: Affordances,
}

impl AccessGate {
    /// Resolves the gate for `resource` on behalf of `session`.
    pub fn load(
        session: &Session,
        store: &dyn PermissionStore,
        resolver: &PermissionResolver,
        resource: &ResourceDescriptor,
    ) -> StoreResult<Self> {
        let permission = if session.is_superadmin() {
            EffectivePermission::superadmin()
        } else {
            let records = store.list_for_user(session.user_id)?;
            resolver.resolve_in(&session.role, &records, &resource.key)
        };

        Ok(Self {
            permission,
            affordances: Affordances::from_permission(&permission, resource),
        })
    }

    pub fn permission(&self) -> EffectivePermission {
        self.permission
    }

    pub fn affordances(&self) -> Affordances {
        self.affordances
    }
}
