//! Inbound adapters translating protocol requests into domain calls.

pub mod http;
