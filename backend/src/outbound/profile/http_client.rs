//! Reqwest-backed profile service client.
//!
//! Owns transport details only: JSON encoding, the client-level timeout, HTTP
//! status mapping and response decoding.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode, Url};

use super::dto::{CreateProfileRequestDto, CreateProfileResponseDto};
use crate::domain::ports::{
    CreateProfileRequest, CreateProfileResponse, ProfileService, ProfileServiceError,
};

const PROFILES_PATH: &str = "profiles";

/// Errors raised while constructing the client.
#[derive(Debug, thiserror::Error)]
pub enum ProfileClientBuildError {
    #[error("invalid profile service URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("failed to build HTTP client: {0}")]
    Client(#[from] reqwest::Error),
}

/// HTTP client for `POST {base}/profiles`.
pub struct HttpProfileService {
    client: Client,
    endpoint: Url,
}

impl HttpProfileService {
    /// Build a client whose requests give up after `timeout`.
    ///
    /// # Errors
    ///
    /// Returns an error when `base_url` cannot carry a path or the reqwest
    /// client cannot be constructed.
    pub fn new(base_url: &Url, timeout: Duration) -> Result<Self, ProfileClientBuildError> {
        let endpoint = profiles_endpoint(base_url)?;
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client, endpoint })
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

/// Resolve `profiles` below `base`, keeping any existing path prefix.
fn profiles_endpoint(base: &Url) -> Result<Url, url::ParseError> {
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(PROFILES_PATH)
}

#[async_trait]
impl ProfileService for HttpProfileService {
    async fn create_profile(
        &self,
        request: &CreateProfileRequest,
    ) -> Result<CreateProfileResponse, ProfileServiceError> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&CreateProfileRequestDto::from(request))
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            return Err(map_status_error(status, body.as_ref()));
        }
        decode_response(body.as_ref())
    }
}

fn decode_response(body: &[u8]) -> Result<CreateProfileResponse, ProfileServiceError> {
    serde_json::from_slice::<CreateProfileResponseDto>(body)
        .map(CreateProfileResponse::from)
        .map_err(|err| ProfileServiceError::decode(err.to_string()))
}

fn map_transport_error(error: reqwest::Error) -> ProfileServiceError {
    if error.is_timeout() {
        ProfileServiceError::timeout(error.to_string())
    } else {
        ProfileServiceError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> ProfileServiceError {
    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            ProfileServiceError::timeout(format!("status {}", status.as_u16()))
        }
        _ => ProfileServiceError::status(status.as_u16(), body_preview(body)),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 120;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        let preview: String = compact.chars().take(PREVIEW_CHAR_LIMIT).collect();
        format!("{preview}...")
    } else {
        compact
    }
}

#[cfg(test)]
mod tests {
    //! Regression coverage for non-network mapping helpers.
    use super::*;
    use crate::domain::UserId;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("http://profiles.internal", "http://profiles.internal/profiles")]
    #[case("http://profiles.internal/", "http://profiles.internal/profiles")]
    #[case("http://gateway.internal/api/v1", "http://gateway.internal/api/v1/profiles")]
    #[case("http://gateway.internal/api/v1/", "http://gateway.internal/api/v1/profiles")]
    fn endpoint_keeps_base_path(#[case] base: &str, #[case] expected: &str) {
        let base = Url::parse(base).expect("valid base");
        let endpoint = profiles_endpoint(&base).expect("endpoint resolves");
        assert_eq!(endpoint.as_str(), expected);
    }

    #[rstest]
    fn request_body_uses_camel_case_and_omits_missing_fields() {
        let user_id = UserId::new("3fa85f64-5717-4562-b3fc-2c963f66afa6").expect("valid id");
        let request = CreateProfileRequest {
            user_id,
            first_name: "Ada".into(),
            last_name: "Lovelace".into(),
            email: "a@x.com".into(),
            phone_number: Some("555-0100".into()),
            street_address: None,
            postal_code: None,
            city: Some("Oslo".into()),
        };

        let body = serde_json::to_value(CreateProfileRequestDto::from(&request)).expect("encode");
        assert_eq!(
            body,
            json!({
                "userId": "3fa85f64-5717-4562-b3fc-2c963f66afa6",
                "firstName": "Ada",
                "lastName": "Lovelace",
                "email": "a@x.com",
                "phoneNumber": "555-0100",
                "city": "Oslo"
            })
        );
    }

    #[rstest]
    #[case(br#"{"succeeded":true}"#.as_slice(), true)]
    #[case(br#"{"succeeded":false,"extra":1}"#.as_slice(), false)]
    fn decodes_success_flag(#[case] body: &[u8], #[case] expected: bool) {
        let response = decode_response(body).expect("valid body");
        assert_eq!(response.succeeded, expected);
    }

    #[rstest]
    fn undecodable_body_is_a_decode_error() {
        let error = decode_response(b"<html>").expect_err("invalid body");
        assert!(matches!(error, ProfileServiceError::Decode { .. }));
    }

    #[rstest]
    #[case(StatusCode::GATEWAY_TIMEOUT, true)]
    #[case(StatusCode::REQUEST_TIMEOUT, true)]
    #[case(StatusCode::BAD_REQUEST, false)]
    #[case(StatusCode::INTERNAL_SERVER_ERROR, false)]
    fn statuses_map_to_timeout_or_status(#[case] status: StatusCode, #[case] timeout: bool) {
        let error = map_status_error(status, b"{\"error\":\"unavailable\"}");
        if timeout {
            assert!(matches!(error, ProfileServiceError::Timeout { .. }));
        } else {
            assert_eq!(
                error,
                ProfileServiceError::status(status.as_u16(), "{\"error\":\"unavailable\"}")
            );
        }
    }

    #[rstest]
    fn long_bodies_are_truncated() {
        let body = "x".repeat(500);
        let preview = body_preview(body.as_bytes());
        assert_eq!(preview.chars().count(), 123);
        assert!(preview.ends_with("..."));
    }
}
