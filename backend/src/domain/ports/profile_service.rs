//! Driven port for the remote profile service.
//!
//! The profile service stores the non-authentication fields of an account
//! keyed by the identity id. The domain owns the request shape; adapters own
//! transport encoding.

use async_trait::async_trait;

use crate::domain::{UserCreationRequest, UserId};

use super::define_port_error;

/// Profile creation call sent once per provisioning attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateProfileRequest {
    pub user_id: UserId,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: Option<String>,
    pub street_address: Option<String>,
    pub postal_code: Option<String>,
    pub city: Option<String>,
}

impl CreateProfileRequest {
    /// Combine the identity id with every profile field of `request`.
    pub fn for_user(user_id: UserId, request: &UserCreationRequest) -> Self {
        let contact = request.contact();
        Self {
            user_id,
            first_name: request.first_name().to_owned(),
            last_name: request.last_name().to_owned(),
            email: request.email().to_string(),
            phone_number: contact.phone_number().map(str::to_owned),
            street_address: contact.street_address().map(str::to_owned),
            postal_code: contact.postal_code().map(str::to_owned),
            city: contact.city().map(str::to_owned),
        }
    }
}

/// Outcome reported by the profile service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CreateProfileResponse {
    pub succeeded: bool,
}

define_port_error! {
    /// Errors surfaced while calling the profile service.
    pub enum ProfileServiceError {
        /// The call failed before a response arrived.
        Transport { message: String } => "profile service transport failed: {message}",
        /// The call exceeded its deadline; the remote outcome is unknown.
        Timeout { message: String } => "profile service timed out: {message}",
        /// The service answered with a non-success HTTP status.
        Status { status: u16, message: String } =>
            "profile service returned status {status}: {message}",
        /// The response body could not be decoded.
        Decode { message: String } => "profile service response decode failed: {message}",
    }
}

impl ProfileServiceError {
    /// `true` when the remote side may have applied the request anyway.
    pub fn is_ambiguous(&self) -> bool {
        matches!(self, Self::Timeout { .. } | Self::Decode { .. })
    }
}

/// Port for creating remote profiles.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ProfileService: Send + Sync {
    /// Create the profile for a freshly created identity.
    async fn create_profile(
        &self,
        request: &CreateProfileRequest,
    ) -> Result<CreateProfileResponse, ProfileServiceError>;
}

/// In-process profile service that accepts every request.
///
/// Used when no remote endpoint is configured.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureProfileService;

#[async_trait]
impl ProfileService for FixtureProfileService {
    async fn create_profile(
        &self,
        _request: &CreateProfileRequest,
    ) -> Result<CreateProfileResponse, ProfileServiceError> {
        Ok(CreateProfileResponse { succeeded: true })
    }
}
