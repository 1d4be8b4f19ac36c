use axum::{
    Json,
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::{
    auth::CredentialError,
    filter::InvalidFilter,
    models::ErrorBody,
    policy::RejectionReason,
    privilege::PrivilegeLevel,
};

/// CorpusError
///
/// Failures reported by the persistence collaborator: the video corpus and the
/// user table behind it.
#[derive(Debug, Error)]
pub enum CorpusError {
    #[error("{kind} `{id}` does not exist")]
    ScopeNotFound { kind: &'static str, id: String },
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// ApiError
///
/// Every way a listing request can fail. All of them are terminal: nothing is
/// retried and no partial listing is ever returned alongside one.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    InvalidFilter(#[from] InvalidFilter),
    #[error("malformed request: {0}")]
    MalformedRequest(String),
    #[error("authentication failed: {0}")]
    AuthenticationFailure(#[from] CredentialError),
    #[error("filter `{filter}` requires {required:?} privilege, caller is {level:?}")]
    InsufficientPrivilege {
        filter: &'static str,
        required: PrivilegeLevel,
        level: PrivilegeLevel,
    },
    #[error(transparent)]
    Corpus(#[from] CorpusError),
}

impl ApiError {
    /// Policy-level reason, for the two rejections the filter gate itself produces.
    pub fn reason(&self) -> Option<RejectionReason> {
        match self {
            ApiError::InvalidFilter(_) => Some(RejectionReason::InvalidFilter),
            ApiError::InsufficientPrivilege { .. } => Some(RejectionReason::InsufficientPrivilege),
            _ => None,
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::InvalidFilter(_) | ApiError::MalformedRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::AuthenticationFailure(_) => StatusCode::UNAUTHORIZED,
            ApiError::InsufficientPrivilege { .. } => StatusCode::FORBIDDEN,
            ApiError::Corpus(CorpusError::ScopeNotFound { .. }) => StatusCode::NOT_FOUND,
            ApiError::Corpus(CorpusError::Database(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Stable machine-readable code sent in the body.
    pub fn code(&self) -> &'static str {
        match self {
            ApiError::InvalidFilter(_) => "invalid_filter",
            ApiError::MalformedRequest(_) => "malformed_request",
            ApiError::AuthenticationFailure(_) => "authentication_failed",
            ApiError::InsufficientPrivilege { .. } => "insufficient_privilege",
            ApiError::Corpus(CorpusError::ScopeNotFound { .. }) => "not_found",
            ApiError::Corpus(CorpusError::Database(_)) => "internal_error",
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Database details stay in the logs.
        let message = match &self {
            ApiError::Corpus(CorpusError::Database(e)) => {
                tracing::error!("database query failed: {:?}", e);
                "internal error".to_string()
            }
            other => other.to_string(),
        };

        let body = ErrorBody {
            code: self.code().to_string(),
            message,
        };

        let mut response = (status, Json(body)).into_response();
        if let ApiError::AuthenticationFailure(_) = self {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static(r#"Bearer error="invalid_token""#),
            );
        }
        response
    }
}
