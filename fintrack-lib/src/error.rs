use crate::validate::ValidationError;
use actix_web::body::BoxBody;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use fintrack_repo::error::LedgerRepoError;
use std::fmt::{Debug, Display, Formatter};

/// Single failure surface for every handler. Each variant maps to one entry
/// of the error taxonomy: validation, reference (not found), consistency
/// (conflict), infrastructure (unavailable) or internal.
pub enum HandlerError {
    Validation(ValidationError),
    Repo(LedgerRepoError),
}

impl From<ValidationError> for HandlerError {
    fn from(e: ValidationError) -> Self {
        HandlerError::Validation(e)
    }
}

impl From<LedgerRepoError> for HandlerError {
    fn from(e: LedgerRepoError) -> Self {
        HandlerError::Repo(e)
    }
}

impl HandlerError {
    fn error_kind(&self) -> &'static str {
        match self {
            HandlerError::Validation(_) => "validation",
            HandlerError::Repo(e) => match e {
                LedgerRepoError::AccountNotFound(_)
                | LedgerRepoError::TransactionNotFound(_)
                | LedgerRepoError::TagNotFound(_) => "not_found",
                LedgerRepoError::Conflict(_) => "conflict",
                LedgerRepoError::Unavailable(_) => "unavailable",
                LedgerRepoError::Other(_) => "internal",
            },
        }
    }
}

impl Debug for HandlerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            HandlerError::Validation(e) => f.write_fmt(format_args!("Validation({})", e)),
            HandlerError::Repo(e) => f.write_fmt(format_args!("Repo({})", e)),
        }
    }
}

impl Display for HandlerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            HandlerError::Validation(e) => Display::fmt(e, f),
            HandlerError::Repo(e) => Display::fmt(e, f),
        }
    }
}

impl ResponseError for HandlerError {
    fn status_code(&self) -> StatusCode {
        match self {
            HandlerError::Validation(_) => StatusCode::BAD_REQUEST,
            HandlerError::Repo(e) => match e {
                LedgerRepoError::AccountNotFound(_)
                | LedgerRepoError::TransactionNotFound(_)
                | LedgerRepoError::TagNotFound(_) => StatusCode::NOT_FOUND,
                LedgerRepoError::Conflict(_) => StatusCode::CONFLICT,
                LedgerRepoError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
                LedgerRepoError::Other(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }

    fn error_response(&self) -> HttpResponse<BoxBody> {
        let body = serde_json::json!({
            "error_kind": self.error_kind(),
            "message": self.to_string(),
        });
        HttpResponse::build(self.status_code()).json(body)
    }
}
