//! Shared validation helpers for inbound HTTP adapters.
//!
//! Request bodies are read as raw bytes so an absent or `null` body can be
//! told apart from a malformed one.

use serde::de::DeserializeOwned;
use serde_json::json;

use crate::domain::{Error, LoginValidationError, UserValidationError};

/// Message returned when a request arrives without a body.
pub(crate) const NULL_REQUEST_MESSAGE: &str = "Request cannot be null.";

/// Validation error codes carried in `details.code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ValidationCode {
    MissingBody,
    MalformedBody,
    EmptyField,
    InvalidUuid,
    InvalidEmail,
}

impl ValidationCode {
    fn as_str(self) -> &'static str {
        match self {
            Self::MissingBody => "missing_body",
            Self::MalformedBody => "malformed_body",
            Self::EmptyField => "empty_field",
            Self::InvalidUuid => "invalid_uuid",
            Self::InvalidEmail => "invalid_email",
        }
    }
}

fn field_error(field: &str, code: ValidationCode, message: impl Into<String>) -> Error {
    Error::invalid_request(message).with_details(json!({
        "field": field,
        "code": code.as_str(),
    }))
}

/// Error for an absent or `null` request body.
pub(crate) fn null_request_error() -> Error {
    Error::invalid_request(NULL_REQUEST_MESSAGE)
        .with_details(json!({ "code": ValidationCode::MissingBody.as_str() }))
}

/// Decode a JSON body, treating an empty or `null` payload as missing.
pub(crate) fn parse_json_body<T: DeserializeOwned>(body: &[u8]) -> Result<T, Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(null_request_error());
    }
    let parsed: Option<T> = serde_json::from_slice(body).map_err(|err| {
        Error::invalid_request(format!("malformed request body: {err}"))
            .with_details(json!({ "code": ValidationCode::MalformedBody.as_str() }))
    })?;
    parsed.ok_or_else(null_request_error)
}

pub(crate) fn user_validation_error(err: &UserValidationError) -> Error {
    let code = match err {
        UserValidationError::EmptyId
        | UserValidationError::EmptyFirstName
        | UserValidationError::EmptyLastName
        | UserValidationError::EmptyEmail => ValidationCode::EmptyField,
        UserValidationError::InvalidId => ValidationCode::InvalidUuid,
        UserValidationError::InvalidEmail => ValidationCode::InvalidEmail,
    };
    field_error(err.field(), code, err.to_string())
}

pub(crate) fn login_validation_error(err: &LoginValidationError) -> Error {
    let field = match err {
        LoginValidationError::EmptyEmail => "email",
        LoginValidationError::EmptyPassword => "password",
    };
    field_error(field, ValidationCode::EmptyField, err.to_string())
}
