//! JSON bodies exchanged with the profile service.

use serde::{Deserialize, Serialize};

use crate::domain::ports::{CreateProfileRequest, CreateProfileResponse};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(super) struct CreateProfileRequestDto<'a> {
    pub(super) user_id: String,
    pub(super) first_name: &'a str,
    pub(super) last_name: &'a str,
    pub(super) email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) phone_number: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) street_address: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) postal_code: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(super) city: Option<&'a str>,
}

impl<'a> From<&'a CreateProfileRequest> for CreateProfileRequestDto<'a> {
    fn from(request: &'a CreateProfileRequest) -> Self {
        Self {
            user_id: request.user_id.to_string(),
            first_name: &request.first_name,
            last_name: &request.last_name,
            email: &request.email,
            phone_number: request.phone_number.as_deref(),
            street_address: request.street_address.as_deref(),
            postal_code: request.postal_code.as_deref(),
            city: request.city.as_deref(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct CreateProfileResponseDto {
    pub(super) succeeded: bool,
}

impl From<CreateProfileResponseDto> for CreateProfileResponse {
    fn from(dto: CreateProfileResponseDto) -> Self {
        Self {
            succeeded: dto.succeeded,
        }
    }
}
