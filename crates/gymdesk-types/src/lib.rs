//! # gymdesk-types: Core types for `Gymdesk`
//!
//! This crate contains shared types used across the `Gymdesk` system:
//! - Entity IDs ([`UserId`])
//! - Session vocabulary ([`Role`], [`Session`])
//! - User listings ([`UserStatus`], [`UserSummary`])
//! - Permission operations ([`Operation`])

use std::fmt::{Debug, Display};

use serde::{Deserialize, Serialize};

// ============================================================================
// Entity IDs
// ============================================================================

/// Opaque identifier of a user account (staff member or student).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct UserId(u64);

impl UserId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Returns the raw identifier.
    pub fn as_u64(&self) -> u64 {
        self.0
    }
}

impl Display for UserId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for UserId {
    fn from(value: u64) -> Self {
        Self(value)
    }
}

impl From<UserId> for u64 {
    fn from(id: UserId) -> Self {
        id.0
    }
}

// ============================================================================
// Roles
// ============================================================================

/// Role attached to an authenticated session.
///
/// Only [`Role::SuperAdmin`] carries special meaning for permission
/// resolution: it bypasses every stored grant. The remaining roles are
/// resolved through per-resource permission records.
///
/// Role names are matched exactly. Names outside the known set are kept
/// as [`Role::Other`] and never override stored grants.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Role {
    /// Platform operator. Always fully permitted.
    SuperAdmin,

    /// Academy administrator.
    Admin,

    /// Academy staff (trainers, front desk).
    User,

    /// Student using the self-service portal.
    Student,

    /// Any other role name issued by the identity provider.
    Other(String),
}

impl Role {
    /// Every known role, in declaration order.
    pub const ALL: [Role; 4] = [Role::SuperAdmin, Role::Admin, Role::User, Role::Student];

    /// Roles listed by the permission editor unless "show all" is enabled.
    pub const EDITOR_DEFAULT_ROLES: [Role; 2] = [Role::Admin, Role::User];

    const SUPERADMIN: &'static str = "SUPERADMIN";

    /// Parses a role name as stored in session tokens.
    ///
    /// Matching is exact and case-sensitive. Unknown names become
    /// [`Role::Other`]; only the empty name is rejected.
    ///
    /// # Examples
    ///
    /// ```
    /// use gymdesk_types::Role;
    ///
    /// assert_eq!(Role::parse("SUPERADMIN"), Some(Role::SuperAdmin));
    /// assert_eq!(Role::parse("ADMIN"), Some(Role::Admin));
    /// assert_eq!(Role::parse("superadmin"), Some(Role::Other("superadmin".to_string())));
    /// assert_eq!(Role::parse(""), None);
    /// ```
    pub fn parse(name: &str) -> Option<Self> {
        if name.is_empty() {
            return None;
        }
        let known = Self::ALL.into_iter().find(|role| role.as_str() == name);
        Some(known.unwrap_or_else(|| Role::Other(name.to_string())))
    }

    /// Returns the canonical (wire) name of the role.
    pub fn as_str(&self) -> &str {
        match self {
            Role::SuperAdmin => Self::SUPERADMIN,
            Role::Admin => "ADMIN",
            Role::User => "USER",
            Role::Student => "STUDENT",
            Role::Other(name) => name.as_str(),
        }
    }

    /// Returns whether this role overrides all stored grants.
    pub fn is_superadmin(&self) -> bool {
        matches!(self, Role::SuperAdmin)
    }
}

impl TryFrom<String> for Role {
    type Error = String;

    fn try_from(name: String) -> Result<Self, Self::Error> {
        Role::parse(&name).ok_or_else(|| "role name must not be empty".to_string())
    }
}

impl From<Role> for String {
    fn from(role: Role) -> Self {
        match role {
            Role::Other(name) => name,
            known => known.as_str().to_string(),
        }
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============================================================================
// Users
// ============================================================================

/// Lifecycle status of a user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UserStatus {
    #[default]
    Active,
    Inactive,
}

/// Minimal user projection used when picking a permission grantee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserSummary {
    pub id: UserId,
    pub name: String,
    pub role: Role,
    pub status: UserStatus,
}

impl UserSummary {
    pub fn new(id: UserId, name: impl Into<String>, role: Role) -> Self {
        Self {
            id,
            name: name.into(),
            role,
            status: UserStatus::Active,
        }
    }

    /// Marks the user as inactive.
    pub fn inactive(mut self) -> Self {
        self.status = UserStatus::Inactive;
        self
    }

    pub fn is_active(&self) -> bool {
        self.status == UserStatus::Active
    }
}

// ============================================================================
// Operations
// ============================================================================

/// One of the four operations a permission record can grant.
///
/// Serialized with the names used by the permission endpoints
/// (`criar`, `ler`, `editar`, `deletar`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Operation {
    #[serde(rename = "criar")]
    Create,
    #[serde(rename = "ler")]
    Read,
    #[serde(rename = "editar")]
    Update,
    #[serde(rename = "deletar")]
    Delete,
}

impl Operation {
    /// All operations in editor column order.
    pub const ALL: [Operation; 4] = [
        Operation::Create,
        Operation::Read,
        Operation::Update,
        Operation::Delete,
    ];

    /// Returns the wire name of the operation.
    pub fn wire_name(&self) -> &'static str {
        match self {
            Operation::Create => "criar",
            Operation::Read => "ler",
            Operation::Update => "editar",
            Operation::Delete => "deletar",
        }
    }

    /// Parses a wire name.
    pub fn from_wire_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.wire_name() == name)
    }

    /// Position of the operation inside [`Operation::ALL`].
    pub fn index(&self) -> usize {
        match self {
            Operation::Create => 0,
            Operation::Read => 1,
            Operation::Update => 2,
            Operation::Delete => 3,
        }
    }
}

impl Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wire_name())
    }
}

// ============================================================================
// Session
// ============================================================================

/// Identity of the caller, passed explicitly into every permission decision.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Session {
    pub user_id: UserId,
    pub role: Role,
}

impl Session {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }

    pub fn is_superadmin(&self) -> bool {
        self.role.is_superadmin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("SUPERADMIN", Some(Role::SuperAdmin); "superadmin exact")]
    #[test_case("ADMIN", Some(Role::Admin); "admin exact")]
    #[test_case("STUDENT", Some(Role::Student); "student exact")]
    #[test_case("superadmin", Some(Role::Other("superadmin".to_string())); "superadmin lower is not superadmin")]
    #[test_case(" SUPERADMIN ", Some(Role::Other(" SUPERADMIN ".to_string())); "superadmin padded is not superadmin")]
    #[test_case("PROFESSOR", Some(Role::Other("PROFESSOR".to_string())); "unknown name kept")]
    #[test_case("", None; "empty")]
    fn role_parse(input: &str, expected: Option<Role>) {
        assert_eq!(Role::parse(input), expected);
    }

    #[test_case("superadmin"; "lowercase")]
    #[test_case("SuperAdmin"; "mixed case")]
    #[test_case(" SUPERADMIN"; "leading space")]
    #[test_case("SUPERADMIN\n"; "trailing newline")]
    fn near_superadmin_names_do_not_override(name: &str) {
        let role = Role::parse(name).unwrap();
        assert!(!role.is_superadmin());

        let json = serde_json::to_string(name).unwrap();
        let decoded: Role = serde_json::from_str(&json).unwrap();
        assert_eq!(decoded, role);
    }

    #[test]
    fn role_serde_uses_wire_names() {
        let json = serde_json::to_string(&Role::SuperAdmin).unwrap();
        assert_eq!(json, "\"SUPERADMIN\"");

        let role: Role = serde_json::from_str("\"USER\"").unwrap();
        assert_eq!(role, Role::User);

        let other: Role = serde_json::from_str("\"PROFESSOR\"").unwrap();
        assert_eq!(other, Role::Other("PROFESSOR".to_string()));
        assert_eq!(serde_json::to_string(&other).unwrap(), "\"PROFESSOR\"");

        assert!(serde_json::from_str::<Role>("\"\"").is_err());
    }

    #[test]
    fn only_superadmin_overrides() {
        for role in Role::ALL {
            assert_eq!(role.is_superadmin(), role == Role::SuperAdmin);
        }
        assert!(!Role::Other("OWNER".to_string()).is_superadmin());
        assert!(!Role::Other("SUPERADMIN".to_string()).is_superadmin());
    }

    #[test]
    fn operation_wire_names_round_trip() {
        for op in Operation::ALL {
            assert_eq!(Operation::from_wire_name(op.wire_name()), Some(op));
        }
        assert_eq!(Operation::from_wire_name("excluir"), None);
    }

    #[test]
    fn operation_index_matches_column_order() {
        for (i, op) in Operation::ALL.iter().enumerate() {
            assert_eq!(op.index(), i);
        }
    }

    #[test]
    fn operation_serializes_to_wire_name() {
        let json = serde_json::to_string(&vec![Operation::Read, Operation::Delete]).unwrap();
        assert_eq!(json, r#"["ler","deletar"]"#);
    }

    #[test]
    fn user_id_is_transparent_on_the_wire() {
        let json = serde_json::to_string(&UserId::new(42)).unwrap();
        assert_eq!(json, "42");
        assert_eq!(u64::from(UserId::from(7)), 7);
    }

    #[test]
    fn user_summary_status() {
        let maria = UserSummary::new(UserId::new(1), "Maria", Role::User);
        assert!(maria.is_active());
        assert!(!maria.clone().inactive().is_active());
    }
}
