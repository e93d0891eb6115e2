//! Resource catalog.
//!
//! Declares every protected resource in one place, with its display text and
//! the operations that are meaningful for it. Two shapes exist:
//!
//! - **Full resources**: all four operations apply. The editor also offers a
//!   "Total" toggle for them.
//! - **Restricted resources**: a strict subset applies (e.g. sharing
//!   resources only expose `read`). No "Total" toggle.

use std::collections::HashSet;
use std::sync::LazyLock;

use gymdesk_types::Operation;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::grant::OperationSet;

/// Error type for catalog construction.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CatalogError {
    /// Two descriptors share the same key.
    #[error("duplicate resource key: {0}")]
    DuplicateKey(String),

    /// A descriptor declares no applicable operation.
    #[error("resource '{0}' declares no applicable operation")]
    NoOperations(String),

    /// A label override targets an operation that does not apply.
    #[error("resource '{key}' overrides the label of non-applicable operation '{operation}'")]
    OverrideNotApplicable { key: String, operation: Operation },
}

/// Static description of one protected resource.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    /// Unique key, as stored in permission records.
    pub key: String,

    /// Human-readable name.
    pub label: String,

    /// Longer explanation shown next to the label.
    pub description: String,

    /// Operations that can be toggled for this resource.
    pub applicable: OperationSet,

    /// Per-operation display text replacing the default column label.
    pub label_overrides: Vec<(Operation, String)>,
}

impl ResourceDescriptor {
    /// Creates a full resource (all four operations apply).
    pub fn full(
        key: impl Into<String>,
        label: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            label: label.into(),
            description: description.into(),
            applicable: OperationSet::all(),
            label_overrides: Vec::new(),
        }
    }

    /// Creates a restricted resource exposing only `ops`.
    pub fn restricted(
        key: impl Into<String>,
        label: impl Into<String>,
        description: impl Into<String>,
        ops: &[Operation],
    ) -> Self {
        Self {
            applicable: OperationSet::only(ops),
            ..Self::full(key, label, description)
        }
    }

    /// Renames the display text of one operation.
    pub fn with_label(mut self, op: Operation, label: impl Into<String>) -> Self {
        self.label_overrides.retain(|(o, _)| *o != op);
        self.label_overrides.push((op, label.into()));
        self
    }

    /// Returns whether all four operations apply.
    pub fn is_full(&self) -> bool {
        self.applicable.is_full()
    }

    /// Returns whether `op` can be toggled for this resource.
    pub fn applies(&self, op: Operation) -> bool {
        self.applicable.contains(op)
    }

    /// Display text for an operation toggle.
    pub fn operation_label(&self, op: Operation) -> &str {
        self.label_overrides
            .iter()
            .find(|(o, _)| *o == op)
            .map_or_else(|| default_operation_label(op), |(_, label)| label.as_str())
    }
}

/// Default column label for an operation.
pub fn default_operation_label(op: Operation) -> &'static str {
    match op {
        Operation::Create => "Criar",
        Operation::Read => "Ler",
        Operation::Update => "Editar",
        Operation::Delete => "Deletar",
    }
}

/// Ordered, validated list of resource descriptors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ResourceCatalog {
    resources: Vec<ResourceDescriptor>,
}

impl ResourceCatalog {
    /// Builds a catalog, rejecting duplicate keys and empty operation sets.
    pub fn new(resources: Vec<ResourceDescriptor>) -> Result<Self, CatalogError> {
        let mut seen = HashSet::with_capacity(resources.len());
        for resource in &resources {
            if !seen.insert(resource.key.as_str()) {
                return Err(CatalogError::DuplicateKey(resource.key.clone()));
            }
            if resource.applicable.is_empty() {
                return Err(CatalogError::NoOperations(resource.key.clone()));
            }
            if let Some((op, _)) = resource
                .label_overrides
                .iter()
                .find(|(op, _)| !resource.applies(*op))
            {
                return Err(CatalogError::OverrideNotApplicable {
                    key: resource.key.clone(),
                    operation: *op,
                });
            }
        }
        Ok(Self { resources })
    }

    /// The catalog compiled into the application.
    pub fn standard() -> &'static ResourceCatalog {
        &STANDARD
    }

    /// Looks up a descriptor by key.
    pub fn get(&self, key: &str) -> Option<&ResourceDescriptor> {
        self.resources.iter().find(|r| r.key == key)
    }

    /// Returns whether `key` is declared.
    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    /// Iterates descriptors in declaration order.
    pub fn iter(&self) -> std::slice::Iter<'_, ResourceDescriptor> {
        self.resources.iter()
    }

    /// Iterates descriptors for which `op` applies.
    pub fn supporting(&self, op: Operation) -> impl Iterator<Item = &ResourceDescriptor> {
        self.resources.iter().filter(move |r| r.applies(op))
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }
}

impl<'a> IntoIterator for &'a ResourceCatalog {
    type Item = &'a ResourceDescriptor;
    type IntoIter = std::slice::Iter<'a, ResourceDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Well-known resource keys.
pub mod keys {
    pub const STUDENTS: &str = "alunos";
    pub const EXERCISES: &str = "exercicios";
    pub const WORKOUTS: &str = "treinos";
    pub const WORKOUTS_SHARE: &str = "treinos_compartilhar";
    pub const MEASUREMENTS: &str = "medidas";
    pub const ASSESSMENTS: &str = "avaliacoes";
    pub const ASSESSMENTS_SHARE: &str = "avaliacoes_compartilhar";
    pub const CLIENTS: &str = "clientes";
    pub const USERS: &str = "usuarios";
    pub const PERMISSIONS: &str = "permissoes";
    pub const BACKUP_EXPORT: &str = "backup_exportar";
    pub const BACKUP_DELETE: &str = "backup_excluir";
    pub const REPORTS: &str = "relatorios";
}

static STANDARD: LazyLock<ResourceCatalog> = LazyLock::new(|| ResourceCatalog {
    resources: standard_resources(),
});

fn standard_resources() -> Vec<ResourceDescriptor> {
    use Operation::{Create, Delete, Read, Update};

    vec![
        ResourceDescriptor::full(
            keys::STUDENTS,
            "Alunos",
            "Cadastro, consulta e manutenção de alunos",
        ),
        ResourceDescriptor::full(
            keys::EXERCISES,
            "Exercícios",
            "Biblioteca de exercícios e grupos musculares",
        ),
        ResourceDescriptor::full(
            keys::WORKOUTS,
            "Treinos",
            "Modelos de treino e fichas dos alunos",
        ),
        ResourceDescriptor::restricted(
            keys::WORKOUTS_SHARE,
            "Compartilhar treinos",
            "Exportar treinos em PDF ou enviar por WhatsApp",
            &[Read],
        )
        .with_label(Read, "Compartilhar"),
        ResourceDescriptor::full(
            keys::MEASUREMENTS,
            "Medidas",
            "Registro de medidas corporais",
        ),
        ResourceDescriptor::full(
            keys::ASSESSMENTS,
            "Avaliações físicas",
            "Avaliações físicas e anexos",
        ),
        ResourceDescriptor::restricted(
            keys::ASSESSMENTS_SHARE,
            "Compartilhar avaliações",
            "Exportar avaliações em PDF ou enviar por WhatsApp",
            &[Read],
        )
        .with_label(Read, "Compartilhar"),
        ResourceDescriptor::full(
            keys::CLIENTS,
            "Clientes",
            "Academias e estúdios atendidos",
        ),
        ResourceDescriptor::full(keys::USERS, "Usuários", "Contas de acesso da equipe"),
        ResourceDescriptor::restricted(
            keys::PERMISSIONS,
            "Permissões",
            "Consulta e edição das permissões da equipe",
            &[Read, Update],
        ),
        ResourceDescriptor::restricted(
            keys::BACKUP_EXPORT,
            "Gerar backup",
            "Exportação completa dos dados da academia",
            &[Create],
        )
        .with_label(Create, "Gerar"),
        ResourceDescriptor::restricted(
            keys::BACKUP_DELETE,
            "Excluir backup",
            "Remoção de arquivos de backup",
            &[Delete],
        ),
        ResourceDescriptor::restricted(
            keys::REPORTS,
            "Relatórios",
            "Relatórios de frequência e evolução",
            &[Read],
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test]
    fn test_standard_catalog_is_valid() {
        let standard = ResourceCatalog::standard();
        let rebuilt = ResourceCatalog::new(standard_resources());
        assert_eq!(rebuilt.as_ref(), Ok(standard));
        assert_eq!(standard.len(), 13);
    }

    #[test_case(keys::STUDENTS, true; "students full")]
    #[test_case(keys::CLIENTS, true; "clients full")]
    #[test_case(keys::WORKOUTS_SHARE, false; "workout sharing restricted")]
    #[test_case(keys::PERMISSIONS, false; "permissions restricted")]
    #[test_case(keys::BACKUP_DELETE, false; "backup delete restricted")]
    fn test_resource_shape(key: &str, full: bool) {
        let resource = ResourceCatalog::standard().get(key).unwrap();
        assert_eq!(resource.is_full(), full);
    }

    #[test]
    fn test_backup_delete_only_exposes_delete() {
        let resource = ResourceCatalog::standard()
            .get(keys::BACKUP_DELETE)
            .unwrap();
        let ops: Vec<Operation> = resource.applicable.iter().collect();
        assert_eq!(ops, vec![Operation::Delete]);
    }

    #[test]
    fn test_operation_label_override() {
        let catalog = ResourceCatalog::standard();

        let backup = catalog.get(keys::BACKUP_EXPORT).unwrap();
        assert_eq!(backup.operation_label(Operation::Create), "Gerar");

        let students = catalog.get(keys::STUDENTS).unwrap();
        assert_eq!(students.operation_label(Operation::Create), "Criar");
        assert_eq!(students.operation_label(Operation::Delete), "Deletar");
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let result = ResourceCatalog::new(vec![
            ResourceDescriptor::full("alunos", "Alunos", ""),
            ResourceDescriptor::full("alunos", "Alunos (cópia)", ""),
        ]);
        assert_eq!(result, Err(CatalogError::DuplicateKey("alunos".to_string())));
    }

    #[test]
    fn test_empty_operation_set_rejected() {
        let result = ResourceCatalog::new(vec![ResourceDescriptor::restricted(
            "vazio",
            "Vazio",
            "",
            &[],
        )]);
        assert_eq!(result, Err(CatalogError::NoOperations("vazio".to_string())));
    }

    #[test]
    fn test_override_on_non_applicable_operation_rejected() {
        let result = ResourceCatalog::new(vec![
            ResourceDescriptor::restricted("relatorios", "Relatórios", "", &[Operation::Read])
                .with_label(Operation::Delete, "Apagar"),
        ]);
        assert!(matches!(
            result,
            Err(CatalogError::OverrideNotApplicable { operation: Operation::Delete, .. })
        ));
    }

    #[test]
    fn test_supporting_filters_by_operation() {
        let catalog = ResourceCatalog::standard();
        let deletable: Vec<&str> = catalog
            .supporting(Operation::Delete)
            .map(|r| r.key.as_str())
            .collect();

        assert!(deletable.contains(&keys::BACKUP_DELETE));
        assert!(!deletable.contains(&keys::WORKOUTS_SHARE));
        assert!(!deletable.contains(&keys::REPORTS));
    }

    #[test]
    fn test_declaration_order_preserved() {
        let first = ResourceCatalog::standard().iter().next().unwrap();
        assert_eq!(first.key, keys::STUDENTS);
    }
}
