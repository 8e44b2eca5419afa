//! Error types for lead sync and draft generation
//!
//! Remote failures are classified by how the UI should react:
//! - Network: the backend could not be reached
//! - PermissionDenied: a row-level security policy rejected the call
//! - Rejected: the backend refused the operation for any other reason

use thiserror::Error;

/// Postgres `insufficient_privilege`, surfaced by PostgREST on RLS rejections.
pub const PERMISSION_DENIED_CODE: &str = "42501";

/// Errors from the remote data gateway.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error("HTTP: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Backend unreachable: {0}")]
    Unavailable(String),

    #[error("API error {status} ({code}): {message}")]
    Api {
        status: u16,
        code: String,
        message: String,
    },

    #[error("Failed to decode backend response: {0}")]
    Decode(String),

    #[error("Backend returned no record for the inserted lead")]
    MissingRecord,

    #[error("Data backend not configured: {0}")]
    NotConfigured(String),
}

/// Coarse classification used to pick the notification shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ErrorKind {
    Network,
    PermissionDenied,
    Rejected,
}

impl RemoteError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            RemoteError::Http(_) | RemoteError::Unavailable(_) => ErrorKind::Network,
            RemoteError::Api {
                status,
                code,
                message,
            } => {
                if is_permission_denied(*status, code, message) {
                    ErrorKind::PermissionDenied
                } else {
                    ErrorKind::Rejected
                }
            }
            RemoteError::NotConfigured(_) => ErrorKind::Network,
            RemoteError::Decode(_) | RemoteError::MissingRecord => ErrorKind::Rejected,
        }
    }

    pub fn is_permission_denied(&self) -> bool {
        self.kind() == ErrorKind::PermissionDenied
    }

    /// Backend-provided message when there is one, otherwise the display text.
    pub fn user_message(&self) -> String {
        match self {
            RemoteError::Api { message, .. } if !message.trim().is_empty() => message.clone(),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.kind() {
            ErrorKind::Network => "Verifique sua conexão e a URL/chave do Supabase em ~/.vortex/config.json.",
            ErrorKind::PermissionDenied => {
                "Libere a política de segurança (RLS) que falta na tabela leads do Supabase."
            }
            ErrorKind::Rejected => "Confira os dados enviados e tente novamente.",
        }
    }
}

fn is_permission_denied(status: u16, code: &str, message: &str) -> bool {
    code == PERMISSION_DENIED_CODE
        || message.to_lowercase().contains("permission")
        || status == 401
        || status == 403
}

/// Errors from the hosted text-generation service. Never shown to the user:
/// the draft generator replaces them with a fallback message.
#[derive(Debug, Error)]
pub enum GenerationError {
    #[error("HTTP: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error {status}: {message}")]
    Api { status: u16, message: String },

    #[error("Generation returned no text")]
    EmptyResponse,
}

/// Why a store operation did not apply.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Remote(#[from] RemoteError),

    #[error("Deletion not confirmed")]
    Cancelled,

    #[error("{operation} already in flight for lead {lead_id}")]
    AlreadyInFlight { lead_id: String, operation: String },

    #[error("Invalid input: {0}")]
    Invalid(String),
}

/// Serializable error representation for a UI shell
#[derive(Debug, Clone, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserFacingError {
    pub message: String,
    pub error_type: ErrorKind,
    pub recovery_suggestion: String,
}

impl From<&RemoteError> for UserFacingError {
    fn from(err: &RemoteError) -> Self {
        UserFacingError {
            message: err.user_message(),
            error_type: err.kind(),
            recovery_suggestion: err.recovery_suggestion().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn api(status: u16, code: &str, message: &str) -> RemoteError {
        RemoteError::Api {
            status,
            code: code.to_string(),
            message: message.to_string(),
        }
    }

    #[test]
    fn test_rls_code_is_permission_denied() {
        let err = api(400, "42501", "new row violates row-level security policy");
        assert_eq!(err.kind(), ErrorKind::PermissionDenied);
    }

    #[test]
    fn test_permission_word_is_matched_case_insensitively() {
        let err = api(400, "PGRST000", "Permission denied for table leads");
        assert!(err.is_permission_denied());
    }

    #[test]
    fn test_forbidden_status_is_permission_denied() {
        assert!(api(403, "", "").is_permission_denied());
        assert!(api(401, "", "JWT expired").is_permission_denied());
    }

    #[test]
    fn test_constraint_violation_is_rejected() {
        let err = api(409, "23505", "duplicate key value violates unique constraint");
        assert_eq!(err.kind(), ErrorKind::Rejected);
        assert!(!err.is_permission_denied());
    }

    #[test]
    fn test_not_configured_counts_as_network() {
        let err = RemoteError::NotConfigured("missing url".into());
        assert_eq!(err.kind(), ErrorKind::Network);
    }

    #[test]
    fn test_user_message_prefers_backend_message() {
        let err = api(400, "23502", "null value in column \"name\"");
        assert_eq!(err.user_message(), "null value in column \"name\"");

        let blank = api(500, "", "  ");
        assert!(blank.user_message().contains("API error 500"));
    }

    #[test]
    fn test_user_facing_error_serializes_camel_case() {
        let err = api(403, "42501", "permission denied");
        let json = serde_json::to_value(UserFacingError::from(&err)).unwrap();
        assert_eq!(json["errorType"], "permissionDenied");
        assert!(json["recoverySuggestion"].as_str().unwrap().contains("política"));
    }
}
