//! HTTP adapter mapping for domain errors.
//!
//! Purpose: keep the domain error type HTTP-agnostic while allowing Actix
//! handlers to turn domain failures into consistent JSON responses and status
//! codes.

use actix_web::{HttpResponse, ResponseError, http::StatusCode};
use tracing::error;

use crate::domain::{Error, ErrorCode, TRACE_ID_HEADER};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

/// Message returned in place of internal failure details.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";
/// Message returned in place of store failure details.
pub const STORE_UNAVAILABLE_MESSAGE: &str = "Application store unavailable";

fn status_for(code: ErrorCode) -> StatusCode {
    match code {
        ErrorCode::MissingField | ErrorCode::InvalidFormat => StatusCode::BAD_REQUEST,
        ErrorCode::Conflict => StatusCode::CONFLICT,
        ErrorCode::StoreUnavailable | ErrorCode::InternalError => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

fn redact(error: &Error, message: &str) -> Error {
    error!(code = ?error.code(), message = error.message(), "request failed");
    let mut redacted = Error::new(error.code(), message);
    if let Some(id) = error.trace_id() {
        redacted = redacted.with_trace_id(id.to_owned());
    }
    redacted
}

fn redact_if_environmental(error: &Error) -> Error {
    match error.code() {
        ErrorCode::InternalError => redact(error, INTERNAL_ERROR_MESSAGE),
        ErrorCode::StoreUnavailable => redact(error, STORE_UNAVAILABLE_MESSAGE),
        _ => error.clone(),
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        status_for(self.code())
    }

    fn error_response(&self) -> HttpResponse {
        let mut builder = HttpResponse::build(self.status_code());
        if let Some(id) = self.trace_id() {
            builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
        }

        builder.json(redact_if_environmental(self))
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        error!(error = %err, "actix error promoted to domain error");
        Error::internal(INTERNAL_ERROR_MESSAGE)
    }
}
