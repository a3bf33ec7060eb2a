//! HTTP inbound adapter exposing REST endpoints.

pub mod error;
pub mod login;
pub mod schemas;
pub mod state;
pub mod users;
mod validation;

pub use error::ApiResult;
