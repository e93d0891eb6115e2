//! Request handler for the permission endpoints.
//!
//! | Route                      | Requires                          |
//! |----------------------------|-----------------------------------|
//! | `GET /permissoes/{id}`     | own id, or `ler` on `permissoes`  |
//! | `POST /permissoes`         | `editar` on `permissoes`          |
//! | `POST /permissoes/lote`    | `editar` on `permissoes`          |

use std::collections::HashSet;
use std::sync::Arc;

use gymdesk_rbac::catalog::keys;
use gymdesk_rbac::{PermissionEnforcer, PermissionResolver, PermissionStore, ResourceCatalog};
use gymdesk_types::{Operation, Session, UserId};
use tracing::{error, info, instrument, warn};

use crate::error::{ServerError, ServerResult};
use crate::http::{ApiRequest, ApiResponse, Method};
use crate::wire::{BatchUpsertRequest, PermissionDto, UpsertPermissionRequest};

/// Serves permission reads and writes with server-side enforcement.
#[derive(Debug)]
pub struct PermissionApi<S> {
    enforcer: PermissionEnforcer<S>,
    catalog: Arc<ResourceCatalog>,
}

impl<S: PermissionStore> PermissionApi<S> {
    pub fn new(store: S, resolver: PermissionResolver, catalog: Arc<ResourceCatalog>) -> Self {
        Self {
            enforcer: PermissionEnforcer::new(store, resolver),
            catalog,
        }
    }

    /// Disables audit logging of access decisions (for testing).
    pub fn without_audit(mut self) -> Self {
        self.enforcer = self.enforcer.without_audit();
        self
    }

    pub fn store(&self) -> &S {
        self.enforcer.store()
    }

    /// Handles a request and returns a response.
    #[instrument(skip_all, fields(method = %request.method, path = %request.path, user = %request.session.user_id))]
    pub fn handle(&self, request: &ApiRequest) -> ApiResponse {
        match self.route(request) {
            Ok(response) => response,
            Err(e) => {
                let response = ApiResponse::from_error(&e);
                if response.status >= 500 {
                    error!(status = response.status, error = %e, "Request failed");
                } else {
                    warn!(status = response.status, error = %e, "Request rejected");
                }
                response
            }
        }
    }

    fn route(&self, request: &ApiRequest) -> ServerResult<ApiResponse> {
        let path = request.path.split('?').next().unwrap_or_default();
        let segments: Vec<&str> = path.trim_matches('/').split('/').collect();

        match (request.method, segments.as_slice()) {
            (Method::Get, ["permissoes", id]) => {
                let user_id = parse_user_id(id)?;
                let permissions = self.list_permissions(&request.session, user_id)?;
                Ok(ApiResponse::json(200, &permissions))
            }
            (Method::Post, ["permissoes"]) => {
                self.authorize_write(&request.session)?;
                let body: UpsertPermissionRequest = serde_json::from_str(&request.body)?;
                let stored = self.write_one(&request.session, body)?;
                Ok(ApiResponse::json(200, &stored))
            }
            (Method::Post, ["permissoes", "lote"]) => {
                self.authorize_write(&request.session)?;
                let body: BatchUpsertRequest = serde_json::from_str(&request.body)?;
                let stored = self.write_batch(&request.session, body)?;
                Ok(ApiResponse::json(200, &stored))
            }
            _ => Err(ServerError::NotFound {
                method: request.method.to_string(),
                path: request.path.clone(),
            }),
        }
    }

    /// Lists the records of `user_id`, ordered by resource key.
    ///
    /// Callers may always read their own list.
    pub fn list_permissions(
        &self,
        session: &Session,
        user_id: UserId,
    ) -> ServerResult<Vec<PermissionDto>> {
        if session.user_id != user_id {
            self.enforcer
                .enforce(session, keys::PERMISSIONS, Operation::Read)?;
        }

        let records = self.store().list_for_user(user_id)?;
        Ok(records.into_iter().map(PermissionDto::from).collect())
    }

    /// Upserts one record by `(usuarioId, recurso)`.
    pub fn upsert_permission(
        &self,
        session: &Session,
        request: UpsertPermissionRequest,
    ) -> ServerResult<PermissionDto> {
        self.authorize_write(session)?;
        self.write_one(session, request)
    }

    /// Upserts several records of one user atomically.
    pub fn upsert_batch(
        &self,
        session: &Session,
        request: BatchUpsertRequest,
    ) -> ServerResult<Vec<PermissionDto>> {
        self.authorize_write(session)?;
        self.write_batch(session, request)
    }

    /// Caller must already hold `editar` on `permissoes`.
    fn write_one(
        &self,
        session: &Session,
        request: UpsertPermissionRequest,
    ) -> ServerResult<PermissionDto> {
        self.ensure_known(&request.permission.resource)?;

        let record = request.permission.into_record(request.user_id);
        let stored = self.store().upsert(&record)?;
        info!(
            by = %session.user_id,
            user = %stored.user_id,
            resource = %stored.resource,
            "Permission saved"
        );
        Ok(PermissionDto::from(stored))
    }

    /// Caller must already hold `editar` on `permissoes`.
    fn write_batch(
        &self,
        session: &Session,
        request: BatchUpsertRequest,
    ) -> ServerResult<Vec<PermissionDto>> {
        let mut seen = HashSet::new();
        for permission in &request.permissions {
            self.ensure_known(&permission.resource)?;
            if !seen.insert(permission.resource.as_str()) {
                return Err(ServerError::BadRequest(format!(
                    "duplicate resource in batch: {}",
                    permission.resource
                )));
            }
        }

        let user_id = request.user_id;
        let records: Vec<_> = request
            .permissions
            .into_iter()
            .map(|p| p.into_record(user_id))
            .collect();
        let stored = self.store().upsert_batch(&records)?;
        info!(
            by = %session.user_id,
            user = %user_id,
            count = stored.len(),
            "Permission batch saved"
        );
        Ok(stored.into_iter().map(PermissionDto::from).collect())
    }

    fn authorize_write(&self, session: &Session) -> ServerResult<()> {
        self.enforcer
            .enforce(session, keys::PERMISSIONS, Operation::Update)?;
        Ok(())
    }

    fn ensure_known(&self, resource: &str) -> ServerResult<()> {
        if self.catalog.contains(resource) {
            Ok(())
        } else {
            Err(ServerError::UnknownResource(resource.to_string()))
        }
    }
}

fn parse_user_id(raw: &str) -> ServerResult<UserId> {
    raw.parse::<u64>()
        .map(UserId::new)
        .map_err(|_| ServerError::BadRequest(format!("invalid user id: {raw}")))
}
