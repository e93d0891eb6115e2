//! Grant types for resource permissions.
//!
//! A [`Grant`] is the four create/read/update/delete booleans a user holds
//! against one resource. A [`PermissionRecord`] ties a grant to its user and
//! resource key, and an [`OperationSet`] describes which of the four
//! operations are meaningful for a resource.

use gymdesk_types::{Operation, UserId};
use serde::{Deserialize, Serialize};

/// Create/read/update/delete grant for one resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Grant {
    pub create: bool,
    pub read: bool,
    pub update: bool,
    pub delete: bool,
}

impl Grant {
    /// Grant assumed when no record exists: read open, writes closed.
    pub const FALLBACK: Grant = Grant {
        create: false,
        read: true,
        update: false,
        delete: false,
    };

    /// Every operation allowed.
    pub const FULL: Grant = Grant {
        create: true,
        read: true,
        update: true,
        delete: true,
    };

    /// Every operation denied.
    pub const NONE: Grant = Grant {
        create: false,
        read: false,
        update: false,
        delete: false,
    };

    pub fn new(create: bool, read: bool, update: bool, delete: bool) -> Self {
        Self {
            create,
            read,
            update,
            delete,
        }
    }

    /// Returns whether the given operation is granted.
    pub fn get(&self, op: Operation) -> bool {
        match op {
            Operation::Create => self.create,
            Operation::Read => self.read,
            Operation::Update => self.update,
            Operation::Delete => self.delete,
        }
    }

    /// Sets a single operation.
    pub fn set(&mut self, op: Operation, value: bool) {
        match op {
            Operation::Create => self.create = value,
            Operation::Read => self.read = value,
            Operation::Update => self.update = value,
            Operation::Delete => self.delete = value,
        }
    }

    /// Flips a single operation and returns its new value.
    pub fn toggle(&mut self, op: Operation) -> bool {
        let value = !self.get(op);
        self.set(op, value);
        value
    }

    /// Returns whether at least one operation is granted.
    pub fn any(&self) -> bool {
        self.create || self.read || self.update || self.delete
    }

    /// Returns whether every operation is granted.
    pub fn all(&self) -> bool {
        self.create && self.read && self.update && self.delete
    }

    /// Returns the granted operations in column order.
    pub fn operations(&self) -> impl Iterator<Item = Operation> + '_ {
        Operation::ALL.into_iter().filter(|op| self.get(*op))
    }
}

impl Default for Grant {
    fn default() -> Self {
        Self::FALLBACK
    }
}

/// Subset of the four operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "Vec<Operation>", into = "Vec<Operation>")]
pub struct OperationSet {
    bits: u8,
}

impl OperationSet {
    /// All four operations.
    pub fn all() -> Self {
        Self { bits: 0b1111 }
    }

    /// No operation.
    pub fn empty() -> Self {
        Self { bits: 0 }
    }

    /// Only the listed operations.
    pub fn only(ops: &[Operation]) -> Self {
        ops.iter().copied().collect()
    }

    pub fn insert(&mut self, op: Operation) {
        self.bits |= 1 << op.index();
    }

    pub fn contains(&self, op: Operation) -> bool {
        self.bits & (1 << op.index()) != 0
    }

    pub fn is_empty(&self) -> bool {
        self.bits == 0
    }

    /// Returns whether all four operations are present.
    pub fn is_full(&self) -> bool {
        self.bits == 0b1111
    }

    pub fn len(&self) -> usize {
        self.bits.count_ones() as usize
    }

    /// Iterates the operations in column order.
    pub fn iter(&self) -> impl Iterator<Item = Operation> + '_ {
        Operation::ALL.into_iter().filter(|op| self.contains(*op))
    }
}

impl FromIterator<Operation> for OperationSet {
    fn from_iter<I: IntoIterator<Item = Operation>>(iter: I) -> Self {
        let mut set = Self::empty();
        for op in iter {
            set.insert(op);
        }
        set
    }
}

impl From<Vec<Operation>> for OperationSet {
    fn from(ops: Vec<Operation>) -> Self {
        ops.into_iter().collect()
    }
}

impl From<OperationSet> for Vec<Operation> {
    fn from(set: OperationSet) -> Self {
        set.iter().collect()
    }
}

/// Stored grant of one user against one resource.
///
/// At most one record exists per `(user_id, resource)` pair. A missing record
/// is valid and resolves to the configured default grant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PermissionRecord {
    pub user_id: UserId,
    pub resource: String,
    pub grant: Grant,
}

impl PermissionRecord {
    pub fn new(user_id: UserId, resource: impl Into<String>, grant: Grant) -> Self {
        Self {
            user_id,
            resource: resource.into(),
            grant,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fallback_grant_is_read_only() {
        let grant = Grant::default();
        assert!(!grant.create);
        assert!(grant.read);
        assert!(!grant.update);
        assert!(!grant.delete);
        assert_eq!(grant, Grant::FALLBACK);
    }

    #[test]
    fn test_grant_toggle() {
        let mut grant = Grant::NONE;
        assert!(grant.toggle(Operation::Update));
        assert!(grant.update);
        assert!(!grant.toggle(Operation::Update));
        assert_eq!(grant, Grant::NONE);
    }

    #[test]
    fn test_grant_any_all() {
        assert!(!Grant::NONE.any());
        assert!(Grant::FALLBACK.any());
        assert!(!Grant::FALLBACK.all());
        assert!(Grant::FULL.all());
    }

    #[test]
    fn test_grant_operations_in_column_order() {
        let grant = Grant::new(true, false, false, true);
        let ops: Vec<Operation> = grant.operations().collect();
        assert_eq!(ops, vec![Operation::Create, Operation::Delete]);
    }

    #[test]
    fn test_operation_set() {
        let mut set = OperationSet::only(&[Operation::Read]);
        assert!(set.contains(Operation::Read));
        assert!(!set.contains(Operation::Delete));
        assert!(!set.is_full());
        assert_eq!(set.len(), 1);

        set.insert(Operation::Read); // Duplicate insert is no-op
        assert_eq!(set.len(), 1);

        for op in Operation::ALL {
            set.insert(op);
        }
        assert!(set.is_full());
        assert_eq!(set, OperationSet::all());
        assert!(OperationSet::empty().is_empty());
    }

    #[test]
    fn test_operation_set_serializes_as_wire_list() {
        let set = OperationSet::only(&[Operation::Delete, Operation::Read]);
        let json = serde_json::to_string(&set).unwrap();
        assert_eq!(json, r#"["ler","deletar"]"#);

        let back: OperationSet = serde_json::from_str(&json).unwrap();
        assert_eq!(back, set);
    }
}
