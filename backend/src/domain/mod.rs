//! Domain primitives, ports and the provisioning saga.
//!
//! Purpose: define the account types, the result envelope and the error model
//! shared by every adapter, plus the saga that keeps the identity store and
//! the profile service consistent.
//!
//! Public surface:
//! - `Envelope` / `Status`: outcome wrapper returned by every use-case.
//! - `Error` / `ErrorCode`: transport-agnostic failure payload.
//! - `UserProvisioningService`: the saga behind the `UserProvisioning` port.
//! - `TraceId`: request correlation identifier.

pub mod auth;
pub mod envelope;
pub mod error;
pub mod ports;
pub mod provisioning_service;
pub mod trace_id;
pub mod user;

pub use self::auth::{LoginCredentials, LoginValidationError, Password};
pub use self::envelope::{Envelope, EnvelopeValidationError, Status};
pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::provisioning_service::{
    DEFAULT_PROFILE_TIMEOUT, ProvisioningStage, UserProvisioningService,
};
pub use self::trace_id::{TRACE_ID_HEADER, TraceId};
pub use self::user::{
    AuthenticatedUser, ContactDetails, EmailAddress, IdentityRecord, ProvisionedUser,
    UserCreationRequest, UserId, UserValidationError,
};
