//! JSON bodies of the permission endpoints.
//!
//! Field names are fixed by existing clients and storage (`recurso`,
//! `criar`, `ler`, `editar`, `deletar`, `usuarioId`).

use gymdesk_rbac::{Grant, PermissionRecord};
use gymdesk_types::UserId;
use serde::{Deserialize, Serialize};

/// One stored permission, without its owner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PermissionDto {
    #[serde(rename = "recurso")]
    pub resource: String,
    #[serde(rename = "criar")]
    pub create: bool,
    #[serde(rename = "ler")]
    pub read: bool,
    #[serde(rename = "editar")]
    pub update: bool,
    #[serde(rename = "deletar")]
    pub delete: bool,
}

impl PermissionDto {
    pub fn grant(&self) -> Grant {
        Grant::new(self.create, self.read, self.update, self.delete)
    }

    pub fn into_record(self, user_id: UserId) -> PermissionRecord {
        let grant = self.grant();
        PermissionRecord::new(user_id, self.resource, grant)
    }
}

impl From<PermissionRecord> for PermissionDto {
    fn from(record: PermissionRecord) -> Self {
        let Grant {
            create,
            read,
            update,
            delete,
        } = record.grant;
        Self {
            resource: record.resource,
            create,
            read,
            update,
            delete,
        }
    }
}

/// Body of `POST /permissoes`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpsertPermissionRequest {
    #[serde(rename = "usuarioId")]
    pub user_id: UserId,
    #[serde(flatten)]
    pub permission: PermissionDto,
}

/// Body of `POST /permissoes/lote`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchUpsertRequest {
    #[serde(rename = "usuarioId")]
    pub user_id: UserId,
    #[serde(rename = "permissoes")]
    pub permissions: Vec<PermissionDto>,
}

/// Error body returned with every non-2xx response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    #[serde(rename = "erro")]
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upsert_request_uses_wire_names() {
        let body = r#"{"usuarioId":7,"recurso":"alunos","criar":true,"ler":true,"editar":false,"deletar":false}"#;
        let request: UpsertPermissionRequest = serde_json::from_str(body).unwrap();

        assert_eq!(request.user_id, UserId::new(7));
        assert_eq!(request.permission.resource, "alunos");
        assert_eq!(
            request.permission.grant(),
            Grant::new(true, true, false, false)
        );
    }

    #[test]
    fn test_missing_flag_is_rejected() {
        let body = r#"{"usuarioId":7,"recurso":"alunos","criar":true,"ler":true,"editar":false}"#;
        assert!(serde_json::from_str::<UpsertPermissionRequest>(body).is_err());
    }

    #[test]
    fn test_dto_from_record() {
        let record = PermissionRecord::new(UserId::new(3), "relatorios", Grant::FALLBACK);
        let json = serde_json::to_string(&PermissionDto::from(record)).unwrap();
        assert_eq!(
            json,
            r#"{"recurso":"relatorios","criar":false,"ler":true,"editar":false,"deletar":false}"#
        );
    }
}
