//! OpenAPI schema definitions for domain types.
//!
//! Domain types remain framework-agnostic by not deriving `ToSchema`. This
//! module provides the schema definitions required for OpenAPI documentation
//! using utoipa's external schema registration.
//!
//! The schema wrappers mirror the serialised shape of their domain
//! counterparts but live in the inbound adapter layer where framework concerns
//! belong.

use utoipa::ToSchema;

/// OpenAPI schema for [`crate::domain::ErrorCode`].
#[derive(ToSchema)]
#[schema(as = ErrorCode)]
pub enum ErrorCodeSchema {
    /// The request is malformed or fails validation.
    #[schema(rename = "invalid_request")]
    InvalidRequest,
    /// Authentication failed.
    #[schema(rename = "unauthorized")]
    Unauthorized,
    /// The requested resource does not exist.
    #[schema(rename = "not_found")]
    NotFound,
    /// The request collides with existing state.
    #[schema(rename = "conflict")]
    Conflict,
    /// An unexpected error occurred on the server.
    #[schema(rename = "internal_error")]
    InternalError,
}

/// OpenAPI schema for [`crate::domain::Error`].
#[derive(ToSchema)]
#[schema(as = Error)]
#[serde(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ErrorSchema {
    /// Stable machine-readable error code.
    #[schema(example = "conflict")]
    code: ErrorCodeSchema,
    /// Human-readable message returned to clients.
    #[schema(example = "User with given email already exists")]
    message: String,
    /// Correlation identifier, echoed in the `trace-id` header.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    trace_id: Option<String>,
    /// Supplementary error details, such as the offending field.
    details: Option<serde_json::Value>,
}

/// OpenAPI schema for [`crate::domain::ProvisionedUser`].
#[derive(ToSchema)]
#[schema(as = ProvisionedUser)]
#[serde(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct ProvisionedUserSchema {
    /// Stable user identifier.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    id: String,
    /// Normalised email address.
    #[schema(example = "ada@example.com")]
    email: String,
    /// Creation timestamp recorded by the identity store.
    #[schema(value_type = String, format = DateTime)]
    created: String,
}

/// OpenAPI schema for [`crate::domain::AuthenticatedUser`].
#[derive(ToSchema)]
#[schema(as = AuthenticatedUser)]
#[serde(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct AuthenticatedUserSchema {
    /// Identifier of the signed-in account.
    #[schema(example = "3fa85f64-5717-4562-b3fc-2c963f66afa6")]
    user_id: String,
    /// Whether the email address has been confirmed.
    email_confirmed: bool,
}

/// OpenAPI schema for the login result envelope.
#[derive(ToSchema)]
#[schema(as = LoginEnvelope)]
#[serde(rename_all = "camelCase")]
#[expect(
    dead_code,
    reason = "Used only for OpenAPI schema generation via utoipa"
)]
pub struct LoginEnvelopeSchema {
    /// `true` exactly when `statusCode` is below 400.
    succeeded: bool,
    /// One of 200, 201, 204, 400, 401, 404, 409, 500.
    #[schema(example = 200)]
    status_code: u16,
    /// Present on failure only.
    error_message: Option<String>,
    /// Present on success only.
    data: Option<AuthenticatedUserSchema>,
}
