//! Minimal HTTP/1.1 framing for the permission API.
//!
//! The API itself is transport-agnostic: [`ApiRequest`] in, [`ApiResponse`]
//! out. This module parses a raw request into an [`ApiRequest`] and renders
//! an [`ApiResponse`] back to bytes. Connections are not kept alive.
//!
//! The caller's [`Session`] is established by the authentication layer in
//! front of this API and is never read from the request itself.

use std::fmt::{self, Display};

use gymdesk_types::Session;
use serde::Serialize;

use crate::error::{ServerError, ServerResult};
use crate::wire::ErrorBody;

/// Methods served by the permission API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl Method {
    fn parse(method: &str) -> Option<Self> {
        match method {
            "GET" => Some(Self::Get),
            "POST" => Some(Self::Post),
            _ => None,
        }
    }
}

impl Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => f.write_str("GET"),
            Self::Post => f.write_str("POST"),
        }
    }
}

/// A request addressed to the permission API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub session: Session,
    pub body: String,
}

impl ApiRequest {
    pub fn get(path: impl Into<String>, session: Session) -> Self {
        Self {
            method: Method::Get,
            path: path.into(),
            session,
            body: String::new(),
        }
    }

    pub fn post(path: impl Into<String>, session: Session, body: impl Into<String>) -> Self {
        Self {
            method: Method::Post,
            path: path.into(),
            session,
            body: body.into(),
        }
    }

    /// Parses a raw HTTP/1.1 request.
    ///
    /// Unsupported methods are reported as unknown routes.
    pub fn from_http(raw: &str, session: Session) -> ServerResult<Self> {
        let (head, body) = raw.split_once("\r\n\r\n").unwrap_or((raw, ""));

        // First line: "POST /permissoes HTTP/1.1"
        let request_line = head
            .lines()
            .next()
            .ok_or_else(|| ServerError::BadRequest("empty request".to_string()))?;
        let mut parts = request_line.split_whitespace();
        let (Some(method), Some(path)) = (parts.next(), parts.next()) else {
            return Err(ServerError::BadRequest(format!(
                "malformed request line: {request_line}"
            )));
        };

        let method = Method::parse(method).ok_or_else(|| ServerError::NotFound {
            method: method.to_string(),
            path: path.to_string(),
        })?;

        Ok(Self {
            method,
            path: path.to_string(),
            session,
            body: body.to_string(),
        })
    }
}

/// A response produced by the permission API.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: String,
}

impl ApiResponse {
    /// Serializes `value` as the JSON body.
    pub fn json<T: Serialize>(status: u16, value: &T) -> Self {
        match serde_json::to_string(value) {
            Ok(body) => Self { status, body },
            Err(e) => {
                tracing::error!(error = %e, "Failed to serialize response");
                Self {
                    status: 500,
                    body: r#"{"erro":"Erro interno."}"#.to_string(),
                }
            }
        }
    }

    /// Error response with the caller-safe message.
    pub fn from_error(error: &ServerError) -> Self {
        Self::json(
            error.status(),
            &ErrorBody {
                error: error.public_message(),
            },
        )
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Renders a complete HTTP/1.1 response.
    pub fn to_http(&self) -> String {
        let reason = match self.status {
            200 => "OK",
            400 => "Bad Request",
            403 => "Forbidden",
            404 => "Not Found",
            500 => "Internal Server Error",
            503 => "Service Unavailable",
            _ => "Unknown",
        };

        format!(
            "HTTP/1.1 {} {reason}\r\n\
             Content-Type: application/json; charset=utf-8\r\n\
             Content-Length: {}\r\n\
             Connection: close\r\n\
             \r\n\
             {}",
            self.status,
            self.body.len(),
            self.body
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use gymdesk_types::{Role, UserId};

    fn session() -> Session {
        Session::new(UserId::new(1), Role::Admin)
    }

    #[test]
    fn test_parse_get() {
        let request =
            ApiRequest::from_http("GET /permissoes/7 HTTP/1.1\r\nHost: localhost\r\n\r\n", session())
                .unwrap();
        assert_eq!(request.method, Method::Get);
        assert_eq!(request.path, "/permissoes/7");
        assert!(request.body.is_empty());
    }

    #[test]
    fn test_parse_post_with_body() {
        let raw = "POST /permissoes HTTP/1.1\r\nContent-Type: application/json\r\n\r\n{\"usuarioId\":7}";
        let request = ApiRequest::from_http(raw, session()).unwrap();
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.body, "{\"usuarioId\":7}");
    }

    #[test]
    fn test_parse_unsupported_method() {
        let result = ApiRequest::from_http("DELETE /permissoes/7 HTTP/1.1\r\n\r\n", session());
        assert!(matches!(result, Err(ServerError::NotFound { .. })));
    }

    #[test]
    fn test_parse_malformed() {
        assert!(matches!(
            ApiRequest::from_http("", session()),
            Err(ServerError::BadRequest(_))
        ));
        assert!(matches!(
            ApiRequest::from_http("GET\r\n\r\n", session()),
            Err(ServerError::BadRequest(_))
        ));
    }

    #[test]
    fn test_http_response_format() {
        let resp = ApiResponse {
            status: 200,
            body: "[]".to_string(),
        };
        let http = resp.to_http();
        assert!(http.starts_with("HTTP/1.1 200 OK\r\n"));
        assert!(http.contains("Content-Length: 2\r\n"));
        assert!(http.ends_with("[]"));
    }

    #[test]
    fn test_error_response() {
        let resp = ApiResponse::from_error(&ServerError::BadRequest("bad id".to_string()));
        assert_eq!(resp.status, 400);
        assert!(!resp.is_success());
        assert!(resp.body.contains("\"erro\""));
        assert!(resp.to_http().starts_with("HTTP/1.1 400 Bad Request\r\n"));
    }
}
