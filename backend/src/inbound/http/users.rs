//! Users API handlers.
//!
//! ```text
//! POST /api/v1/users {"firstName":"Ada","lastName":"Lovelace","email":"ada@example.com"}
//! GET /api/v1/users/3fa85f64-5717-4562-b3fc-2c963f66afa6
//! ```

use actix_web::{HttpResponse, get, post, web};
use serde::{Deserialize, Serialize};

use crate::domain::{ContactDetails, Error, Password, UserCreationRequest, UserId};
use crate::inbound::http::ApiResult;
use crate::inbound::http::error::resource_response;
use crate::inbound::http::schemas::{ErrorSchema, ProvisionedUserSchema};
use crate::inbound::http::state::HttpState;
use crate::inbound::http::validation::{
    login_validation_error, parse_json_body, user_validation_error,
};

/// Request body for `POST /api/v1/users`.
///
/// Example JSON:
/// `{"firstName":"Ada","lastName":"Lovelace","email":"ada@example.com","password":"s3cret"}`
#[derive(Debug, Deserialize, Serialize, utoipa::ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateUserRequest {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub street_address: Option<String>,
    #[serde(default)]
    pub postal_code: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
    /// Optional initial password; omitted for externally authenticated accounts.
    #[serde(default)]
    pub password: Option<String>,
}

impl CreateUserRequest {
    fn into_domain(self) -> Result<(UserCreationRequest, Option<Password>), Error> {
        let Self {
            first_name,
            last_name,
            email,
            phone_number,
            street_address,
            postal_code,
            city,
            password,
        } = self;
        let contact = ContactDetails::new(phone_number, street_address, postal_code, city);
        let request = UserCreationRequest::try_new(first_name, last_name, email, contact)
            .map_err(|err| user_validation_error(&err))?;
        let password = password
            .map(Password::new)
            .transpose()
            .map_err(|err| login_validation_error(&err))?;
        Ok((request, password))
    }
}

/// Provision a new account.
///
/// The identity store and the profile service are updated together; a
/// failure in either leaves neither side changed.
#[utoipa::path(
    post,
    path = "/api/v1/users",
    request_body = CreateUserRequest,
    responses(
        (status = 201, description = "User created", body = ProvisionedUserSchema),
        (status = 400, description = "Invalid request", body = ErrorSchema),
        (status = 409, description = "Email already registered", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "createUser"
)]
#[post("/users")]
pub async fn create_user(
    state: web::Data<HttpState>,
    body: web::Bytes,
) -> ApiResult<HttpResponse> {
    let payload: CreateUserRequest = parse_json_body(&body)?;
    let (request, password) = payload.into_domain()?;
    let envelope = state.provisioning.create_user(request, password).await;
    resource_response(envelope)
}

/// Fetch a provisioned account by identifier.
#[utoipa::path(
    get,
    path = "/api/v1/users/{id}",
    params(("id" = String, Path, description = "User identifier (UUID)")),
    responses(
        (status = 200, description = "User", body = ProvisionedUserSchema),
        (status = 400, description = "Malformed identifier", body = ErrorSchema),
        (status = 404, description = "Unknown user", body = ErrorSchema),
        (status = 500, description = "Internal server error", body = ErrorSchema)
    ),
    tags = ["users"],
    operation_id = "getUser"
)]
#[get("/users/{id}")]
pub async fn get_user(
    state: web::Data<HttpState>,
    path: web::Path<String>,
) -> ApiResult<HttpResponse> {
    let id = UserId::new(path.into_inner()).map_err(|err| user_validation_error(&err))?;
    let envelope = state.provisioning.find_user(id).await;
    resource_response(envelope)
}

#[cfg(test)]
#[path = "users_tests.rs"]
mod tests;
