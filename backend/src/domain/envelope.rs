//! Uniform outcome wrapper returned by every provisioning operation.
//!
//! An [`Envelope`] is either a success carrying an optional payload or a
//! failure carrying a domain [`Error`]. The status category is derived from the
//! variant, so the `succeeded`/`statusCode`/`errorMessage`/`data` fields of the
//! wire form can never disagree with each other.
//!
//! ```text
//! {"succeeded":true,"statusCode":201,"data":{...}}
//! {"succeeded":false,"statusCode":409,"errorMessage":"User with given email already exists"}
//! ```

use std::fmt;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::{Error, ErrorCode};

/// Status category carried by an envelope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Status {
    /// 200: success, optionally with a payload.
    Ok,
    /// 201: a resource was created; always carries a payload.
    Created,
    /// 204: success without a payload.
    NoContent,
    /// 400: the request failed validation.
    BadRequest,
    /// 401: authentication failed.
    Unauthorized,
    /// 404: the requested resource does not exist.
    NotFound,
    /// 409: the request conflicts with existing state.
    Conflict,
    /// 500: an unexpected fault, reported after compensation.
    InternalError,
}

impl Status {
    /// Numeric code shared with HTTP and the RPC wire form.
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        match self {
            Self::Ok => 200,
            Self::Created => 201,
            Self::NoContent => 204,
            Self::BadRequest => 400,
            Self::Unauthorized => 401,
            Self::NotFound => 404,
            Self::Conflict => 409,
            Self::InternalError => 500,
        }
    }

    /// Parse a numeric code, rejecting anything outside the closed set.
    #[must_use]
    pub const fn from_u16(code: u16) -> Option<Self> {
        match code {
            200 => Some(Self::Ok),
            201 => Some(Self::Created),
            204 => Some(Self::NoContent),
            400 => Some(Self::BadRequest),
            401 => Some(Self::Unauthorized),
            404 => Some(Self::NotFound),
            409 => Some(Self::Conflict),
            500 => Some(Self::InternalError),
            _ => None,
        }
    }

    /// `true` for every code below 400.
    #[must_use]
    pub const fn is_success(self) -> bool {
        self.as_u16() < 400
    }

    /// Status category used when a domain error is reported.
    #[must_use]
    pub const fn for_error(code: ErrorCode) -> Self {
        match code {
            ErrorCode::InvalidRequest => Self::BadRequest,
            ErrorCode::Unauthorized => Self::Unauthorized,
            ErrorCode::NotFound => Self::NotFound,
            ErrorCode::Conflict => Self::Conflict,
            ErrorCode::InternalError => Self::InternalError,
        }
    }

    const fn error_code(self) -> Option<ErrorCode> {
        match self {
            Self::BadRequest => Some(ErrorCode::InvalidRequest),
            Self::Unauthorized => Some(ErrorCode::Unauthorized),
            Self::NotFound => Some(ErrorCode::NotFound),
            Self::Conflict => Some(ErrorCode::Conflict),
            Self::InternalError => Some(ErrorCode::InternalError),
            Self::Ok | Self::Created | Self::NoContent => None,
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u16())
    }
}

/// Outcome of a provisioning operation.
///
/// # Examples
/// ```
/// use accounts::domain::{Envelope, Status};
///
/// let created = Envelope::created("payload");
/// assert!(created.succeeded());
/// assert_eq!(created.status(), Status::Created);
///
/// let conflict: Envelope<()> = Envelope::conflict("User with given email already exists");
/// assert!(!conflict.succeeded());
/// assert_eq!(conflict.status().as_u16(), 409);
/// assert!(conflict.data().is_none());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Envelope<T> {
    /// Success (200), with or without a payload.
    Ok(Option<T>),
    /// Resource created (201).
    Created(T),
    /// Success without payload (204).
    NoContent,
    /// Failure; the status is derived from the error code.
    Failed(Error),
}

impl<T> Envelope<T> {
    /// `Ok` without a payload.
    pub fn ok() -> Self {
        Self::Ok(None)
    }

    /// `Ok` carrying `data`.
    pub fn ok_with(data: T) -> Self {
        Self::Ok(Some(data))
    }

    /// `Created` carrying `data`.
    pub fn created(data: T) -> Self {
        Self::Created(data)
    }

    /// `NoContent`.
    pub fn no_content() -> Self {
        Self::NoContent
    }

    /// `BadRequest`; panics if `message` is blank.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::Failed(Error::invalid_request(message))
    }

    /// `Unauthorized`; panics if `message` is blank.
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::Failed(Error::unauthorized(message))
    }

    /// `NotFound`; panics if `message` is blank.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::Failed(Error::not_found(message))
    }

    /// `Conflict`; panics if `message` is blank.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::Failed(Error::conflict(message))
    }

    /// `InternalError`; panics if `message` is blank.
    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::Failed(Error::internal(message))
    }

    /// Wrap an already validated domain error.
    pub fn failed(error: Error) -> Self {
        Self::Failed(error)
    }

    /// Status category implied by the variant.
    pub fn status(&self) -> Status {
        match self {
            Self::Ok(_) => Status::Ok,
            Self::Created(_) => Status::Created,
            Self::NoContent => Status::NoContent,
            Self::Failed(error) => Status::for_error(error.code()),
        }
    }

    /// `true` iff the status is below 400.
    pub fn succeeded(&self) -> bool {
        !matches!(self, Self::Failed(_))
    }

    /// Failure message, present only on failures.
    pub fn error_message(&self) -> Option<&str> {
        self.error().map(Error::message)
    }

    /// Underlying domain error, present only on failures.
    pub fn error(&self) -> Option<&Error> {
        match self {
            Self::Failed(error) => Some(error),
            _ => None,
        }
    }

    /// Payload, present only on `Ok(data)` and `Created(data)`.
    pub fn data(&self) -> Option<&T> {
        match self {
            Self::Ok(data) => data.as_ref(),
            Self::Created(data) => Some(data),
            Self::NoContent | Self::Failed(_) => None,
        }
    }

    /// Consume the envelope and return its payload, if any.
    pub fn into_data(self) -> Option<T> {
        match self {
            Self::Ok(data) => data,
            Self::Created(data) => Some(data),
            Self::NoContent | Self::Failed(_) => None,
        }
    }

    /// Convert into a `Result` so adapters can use `?`.
    pub fn into_result(self) -> Result<Option<T>, Error> {
        match self {
            Self::Failed(error) => Err(error),
            other => Ok(other.into_data()),
        }
    }

    /// Transform the payload while keeping the status.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Envelope<U> {
        match self {
            Self::Ok(data) => Envelope::Ok(data.map(f)),
            Self::Created(data) => Envelope::Created(f(data)),
            Self::NoContent => Envelope::NoContent,
            Self::Failed(error) => Envelope::Failed(error),
        }
    }
}

impl<T> From<Error> for Envelope<T> {
    fn from(error: Error) -> Self {
        Self::Failed(error)
    }
}

/// Reasons a received wire envelope is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EnvelopeValidationError {
    /// The status code is not part of the closed set.
    #[error("unknown status code {code}")]
    UnknownStatus {
        /// Code found on the wire.
        code: u16,
    },
    /// `succeeded` disagrees with the status code.
    #[error("succeeded flag {succeeded} contradicts status code {code}")]
    SucceededMismatch {
        /// Flag found on the wire.
        succeeded: bool,
        /// Code found on the wire.
        code: u16,
    },
    /// A failure envelope lacked a non-empty message.
    #[error("failure envelopes require a non-empty error message")]
    MissingErrorMessage,
    /// A success envelope carried an error message.
    #[error("success envelopes must not carry an error message")]
    UnexpectedErrorMessage,
    /// A payload was attached to a variant that never carries one.
    #[error("status code {code} must not carry data")]
    UnexpectedData {
        /// Code found on the wire.
        code: u16,
    },
    /// `Created` arrived without its payload.
    #[error("created envelopes require data")]
    MissingData,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct EnvelopeWireRef<'a, T> {
    succeeded: bool,
    status_code: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    error_message: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<&'a T>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct EnvelopeWire<T> {
    succeeded: bool,
    status_code: u16,
    error_message: Option<String>,
    data: Option<T>,
}

impl<T: Serialize> Serialize for Envelope<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        EnvelopeWireRef {
            succeeded: self.succeeded(),
            status_code: self.status().as_u16(),
            error_message: self.error_message(),
            data: self.data(),
        }
        .serialize(serializer)
    }
}

impl<'de, T: DeserializeOwned> Deserialize<'de> for Envelope<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let wire = EnvelopeWire::<T>::deserialize(deserializer)?;
        Self::try_from(wire).map_err(serde::de::Error::custom)
    }
}

impl<T> TryFrom<EnvelopeWire<T>> for Envelope<T> {
    type Error = EnvelopeValidationError;

    fn try_from(wire: EnvelopeWire<T>) -> Result<Self, Self::Error> {
        let EnvelopeWire {
            succeeded,
            status_code,
            error_message,
            data,
        } = wire;

        let status = Status::from_u16(status_code)
            .ok_or(EnvelopeValidationError::UnknownStatus { code: status_code })?;
        if status.is_success() != succeeded {
            return Err(EnvelopeValidationError::SucceededMismatch {
                succeeded,
                code: status_code,
            });
        }

        if let Some(code) = status.error_code() {
            if data.is_some() {
                return Err(EnvelopeValidationError::UnexpectedData { code: status_code });
            }
            let message = error_message.ok_or(EnvelopeValidationError::MissingErrorMessage)?;
            let error = Error::try_new(code, message)
                .map_err(|_| EnvelopeValidationError::MissingErrorMessage)?;
            return Ok(Self::Failed(error));
        }

        if error_message.is_some() {
            return Err(EnvelopeValidationError::UnexpectedErrorMessage);
        }
        match status {
            Status::Ok => Ok(Self::Ok(data)),
            Status::Created => data
                .map(Self::Created)
                .ok_or(EnvelopeValidationError::MissingData),
            _ => match data {
                Some(_) => Err(EnvelopeValidationError::UnexpectedData { code: status_code }),
                None => Ok(Self::NoContent),
            },
        }
    }
}
