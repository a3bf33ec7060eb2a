//! Tests for domain error construction and its wire representation.

use super::*;
use rstest::{fixture, rstest};
use serde_json::json;

const TRACE_ID: &str = "00000000-0000-0000-0000-000000000000";

#[fixture]
fn trace_id() -> TraceId {
    TRACE_ID.parse().expect("fixture trace id is a valid UUID")
}

#[rstest]
#[case(Error::invalid_request("bad"), ErrorCode::InvalidRequest)]
#[case(Error::unauthorized("nope"), ErrorCode::Unauthorized)]
#[case(Error::not_found("missing"), ErrorCode::NotFound)]
#[case(Error::conflict("taken"), ErrorCode::Conflict)]
#[case(Error::internal("boom"), ErrorCode::InternalError)]
fn convenience_constructors_set_code(#[case] error: Error, #[case] expected: ErrorCode) {
    assert_eq!(error.code(), expected);
}

#[rstest]
#[case("")]
#[case("   ")]
#[case("\n\t")]
fn try_new_rejects_blank_messages(#[case] message: &str) {
    let result = Error::try_new(ErrorCode::Conflict, message);
    assert_eq!(result, Err(ErrorValidationError::EmptyMessage));
}

#[rstest]
fn try_with_trace_id_rejects_blank_values() {
    let result = Error::internal("boom").try_with_trace_id("  ");
    assert_eq!(result, Err(ErrorValidationError::EmptyTraceId));
}

#[rstest]
fn trace_id_is_absent_outside_a_request() {
    assert!(Error::internal("boom").trace_id().is_none());
}

#[rstest]
#[tokio::test]
async fn trace_id_is_captured_inside_a_request(trace_id: TraceId) {
    let error = TraceId::scope(trace_id, async { Error::conflict("taken") }).await;
    assert_eq!(error.trace_id(), Some(TRACE_ID));
}

#[rstest]
fn serialises_with_camel_case_and_omits_empty_fields() {
    let value = serde_json::to_value(Error::not_found("user not found")).expect("serialise");
    assert_eq!(value, json!({ "code": "not_found", "message": "user not found" }));
}

#[rstest]
fn deserialisation_rejects_blank_message() {
    let result: Result<Error, _> =
        serde_json::from_value(json!({ "code": "conflict", "message": " " }));
    assert!(result.is_err());
}

#[rstest]
#[tokio::test]
async fn deserialisation_keeps_payload_trace_not_ambient(trace_id: TraceId) {
    let payload = json!({
        "code": "invalid_request",
        "message": "bad",
        "traceId": "remote-trace",
        "details": { "field": "email" }
    });
    let error: Error = TraceId::scope(trace_id, async move {
        serde_json::from_value(payload).expect("valid payload")
    })
    .await;

    assert_eq!(error.trace_id(), Some("remote-trace"));
    assert_eq!(error.details(), Some(&json!({ "field": "email" })));
}
