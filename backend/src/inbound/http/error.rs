//! HTTP rendering of provisioning outcomes.
//!
//! Envelope statuses share their numeric codes with HTTP, so a response status
//! is always derived from [`Status`]. Two renderings exist:
//!
//! - resource endpoints answer with the payload on success and the [`Error`]
//!   JSON otherwise ([`resource_response`]);
//! - RPC endpoints answer with the envelope wire form itself
//!   ([`envelope_response`]).
//!
//! Internal failures are redacted in both before they leave the process.

use actix_web::{HttpResponse, HttpResponseBuilder, ResponseError, http::StatusCode};
use serde::Serialize;
use tracing::{error, warn};

use crate::domain::{Envelope, Error, ErrorCode, Status, TRACE_ID_HEADER};

/// Convenient result alias for HTTP handlers.
pub type ApiResult<T> = Result<T, Error>;

const REDACTED_MESSAGE: &str = "Internal server error";

/// HTTP status carrying the same code as `status`.
pub(crate) fn http_status(status: Status) -> StatusCode {
    StatusCode::from_u16(status.as_u16()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR)
}

/// Copy of `error` that is safe to show to a client.
///
/// Only internal failures change: their message and details are replaced and
/// the trace id is kept so the caller can quote it.
fn public_view(error: &Error) -> Error {
    if error.code() != ErrorCode::InternalError {
        return error.clone();
    }
    warn!(message = error.message(), "redacting internal failure");
    let redacted = Error::internal(REDACTED_MESSAGE);
    match error.trace_id() {
        Some(id) => redacted.with_trace_id(id.to_owned()),
        None => redacted,
    }
}

fn failure_builder(status: StatusCode, error: &Error) -> HttpResponseBuilder {
    let mut builder = HttpResponse::build(status);
    if let Some(id) = error.trace_id() {
        builder.insert_header((TRACE_ID_HEADER, id.to_owned()));
    }
    builder
}

/// Render an envelope for a resource endpoint.
///
/// Successful envelopes become `201`/`200` with the payload, or `204` when
/// there is none. Failures are returned as `Err` so they flow through
/// [`ResponseError`].
pub(crate) fn resource_response<T: Serialize>(envelope: Envelope<T>) -> ApiResult<HttpResponse> {
    let status = http_status(envelope.status());
    match envelope {
        Envelope::Created(data) | Envelope::Ok(Some(data)) => {
            Ok(HttpResponse::build(status).json(data))
        }
        Envelope::Ok(None) | Envelope::NoContent => Ok(HttpResponse::NoContent().finish()),
        Envelope::Failed(error) => Err(error),
    }
}

/// Render an envelope in its wire form with a mirrored HTTP status.
pub(crate) fn envelope_response<T: Serialize>(envelope: Envelope<T>) -> HttpResponse {
    let status = http_status(envelope.status());
    match envelope {
        Envelope::Failed(error) => {
            let public = public_view(&error);
            failure_builder(status, &public).json(Envelope::<T>::failed(public))
        }
        success => HttpResponse::build(status).json(success),
    }
}

impl ResponseError for Error {
    fn status_code(&self) -> StatusCode {
        http_status(Status::for_error(self.code()))
    }

    fn error_response(&self) -> HttpResponse {
        let public = public_view(self);
        failure_builder(self.status_code(), &public).json(public)
    }
}

impl From<actix_web::Error> for Error {
    fn from(err: actix_web::Error) -> Self {
        error!(error = %err, "actix error promoted to domain error");
        Error::internal(REDACTED_MESSAGE)
    }
}
