//! Server error types.

use gymdesk_rbac::{EnforcementError, StoreError};
use thiserror::Error;

/// Result type for server operations.
pub type ServerResult<T> = Result<T, ServerError>;

/// Errors that can occur while serving a permission request.
#[derive(Debug, Error)]
pub enum ServerError {
    /// No route matches the method and path.
    #[error("no route for {method} {path}")]
    NotFound { method: String, path: String },

    /// Request line, path parameter or body shape is invalid.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// Body is not valid JSON for the endpoint.
    #[error("malformed body: {0}")]
    Json(#[from] serde_json::Error),

    /// Resource key is not in the catalog.
    #[error("unknown resource: {0}")]
    UnknownResource(String),

    /// Caller is not allowed to perform the request.
    #[error(transparent)]
    Enforcement(#[from] EnforcementError),

    /// Permission store failed.
    #[error("permission store error: {0}")]
    Store(#[from] StoreError),

    /// Tracing subscriber could not be installed.
    #[error("logging setup failed: {0}")]
    Logging(String),
}

impl ServerError {
    /// HTTP status code for the error.
    pub fn status(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::BadRequest(_) | Self::Json(_) | Self::UnknownResource(_) => 400,
            Self::Enforcement(EnforcementError::AccessDenied { .. }) => 403,
            Self::Enforcement(EnforcementError::Store(_)) | Self::Store(_) => 503,
            Self::Logging(_) => 500,
        }
    }

    /// Message safe to return to the caller.
    ///
    /// Store and internal failures are reported generically; the detail only
    /// goes to the log.
    pub fn public_message(&self) -> String {
        match self {
            Self::NotFound { .. } => "Rota não encontrada.".to_string(),
            Self::BadRequest(_) | Self::Json(_) | Self::UnknownResource(_) => self.to_string(),
            Self::Enforcement(EnforcementError::AccessDenied { .. }) => {
                "Acesso negado.".to_string()
            }
            Self::Enforcement(EnforcementError::Store(_)) | Self::Store(_) => {
                "Serviço indisponível. Tente novamente.".to_string()
            }
            Self::Logging(_) => "Erro interno.".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gymdesk_types::Operation;

    #[test]
    fn test_status_mapping() {
        let denied = ServerError::from(EnforcementError::AccessDenied {
            resource: "permissoes".to_string(),
            operation: Operation::Update,
        });
        assert_eq!(denied.status(), 403);

        let unavailable = ServerError::from(StoreError::Unavailable("db down".to_string()));
        assert_eq!(unavailable.status(), 503);

        let lookup = ServerError::from(EnforcementError::Store(StoreError::LockPoisoned));
        assert_eq!(lookup.status(), 503);

        assert_eq!(ServerError::BadRequest("x".to_string()).status(), 400);
    }

    #[test]
    fn test_store_detail_not_disclosed() {
        let err = ServerError::from(StoreError::Unavailable("10.0.0.7:5432 refused".to_string()));
        assert!(!err.public_message().contains("10.0.0.7"));
    }
}
