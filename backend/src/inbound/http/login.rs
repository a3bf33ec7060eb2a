//! RPC-style login endpoint.
//!
//! Unlike the resource endpoints, the response body is always the full result
//! envelope and the HTTP status mirrors the envelope status:
//!
//! ```text
//! POST /api/v1/login {"email":"ada@example.com","password":"s3cret"}
//! 200 {"succeeded":true,"statusCode":200,"data":{"userId":"...","emailConfirmed":false}}
//! 401 {"succeeded":false,"statusCode":401,"errorMessage":"authentication failed"}
//! ```

use actix_web::{HttpResponse, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::{Envelope, LoginCredentials, LoginValidationError};
use crate::inbound::http::error::envelope_response;
use crate::inbound::http::schemas::LoginEnvelopeSchema;
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{login_validation_error, parse_json_body};

/// Login request body for `POST /api/v1/login`.
#[derive(Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl TryFrom<LoginRequest> for LoginCredentials {
    type Error = LoginValidationError;

    fn try_from(value: LoginRequest) -> Result<Self, Self::Error> {
        Self::try_from_parts(&value.email, &value.password)
    }
}

/// Verify credentials and report the outcome as a result envelope.
#[utoipa::path(
    post,
    path = "/api/v1/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Credentials accepted", body = LoginEnvelopeSchema),
        (status = 400, description = "Invalid request", body = LoginEnvelopeSchema),
        (status = 401, description = "Credentials rejected", body = LoginEnvelopeSchema),
        (status = 500, description = "Internal server error", body = LoginEnvelopeSchema)
    ),
    tags = ["users"],
    operation_id = "login"
)]
#[post("/login")]
pub async fn login(state: web::Data<HttpState>, body: web::Bytes) -> HttpResponse {
    let credentials = parse_json_body::<LoginRequest>(&body).and_then(|payload| {
        LoginCredentials::try_from(payload).map_err(|err| login_validation_error(&err))
    });
    let envelope = match credentials {
        Ok(credentials) => state.provisioning.login_user(credentials).await,
        Err(error) => Envelope::failed(error),
    };
    envelope_response(envelope)
}
