//! Profile service outbound adapters.
//!
//! A thin HTTP implementation of the `ProfileService` port.

mod dto;
mod http_client;

pub use http_client::{HttpProfileService, ProfileClientBuildError};
