//! Assertions for RFC 7807 error responses.

use actix_web::body::BoxBody;
use actix_web::dev::ServiceResponse;
use actix_web::http::header::{HeaderMap, CONTENT_TYPE};
use actix_web::http::StatusCode;
use serde::Deserialize;

/// Mirror of the service's Problem Details body.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ProblemDetailsLike {
    #[serde(rename = "type")]
    pub type_: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    pub code: String,
    pub trace_id: String,
}

/// Check status, content type, code and `x-trace-id` parity, then return the
/// parsed body for further assertions.
pub fn assert_problem_details_from_parts(
    status: StatusCode,
    headers: &HeaderMap,
    body: &[u8],
    expected_code: &str,
    expected_status: StatusCode,
) -> ProblemDetailsLike {
    assert_eq!(status, expected_status, "unexpected HTTP status");

    let content_type = headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    assert!(
        content_type.starts_with("application/problem+json"),
        "Content-Type must be application/problem+json (got {content_type})"
    );

    let body_str = std::str::from_utf8(body).expect("body should be UTF-8");
    let problem: ProblemDetailsLike = serde_json::from_str(body_str)
        .unwrap_or_else(|e| panic!("body is not Problem Details ({e}): {body_str}"));

    let trace_header = headers
        .get("x-trace-id")
        .expect("x-trace-id header should be present")
        .to_str()
        .expect("x-trace-id should be valid UTF-8");
    assert!(!trace_header.is_empty(), "x-trace-id should not be empty");
    assert_eq!(
        problem.trace_id, trace_header,
        "trace_id in body should match x-trace-id header"
    );

    assert_eq!(problem.code, expected_code);
    assert_eq!(problem.status, expected_status.as_u16());
    assert!(
        problem.type_.ends_with(expected_code),
        "type should end with the code (got {})",
        problem.type_
    );

    problem
}

pub async fn assert_problem_details(
    resp: ServiceResponse<BoxBody>,
    expected_code: &str,
    expected_status: StatusCode,
) -> ProblemDetailsLike {
    let status = resp.status();
    let headers = resp.headers().clone();
    let body = actix_web::test::read_body(resp).await;

    assert_problem_details_from_parts(status, &headers, &body, expected_code, expected_status)
}

#[cfg(test)]
mod tests {
    use actix_web::http::header::{HeaderName, HeaderValue};

    use super::*;

    const BODY: &[u8] = br#"{"type":"https://organizer.local/errors/TASK_NOT_FOUND","title":"Task Not Found","status":404,"detail":"Task 9 not found","code":"TASK_NOT_FOUND","trace_id":"t-1"}"#;

    fn headers(trace_id: &'static str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(
            CONTENT_TYPE,
            HeaderValue::from_static("application/problem+json"),
        );
        headers.insert(
            HeaderName::from_static("x-trace-id"),
            HeaderValue::from_static(trace_id),
        );
        headers
    }

    #[test]
    fn accepts_a_matching_problem() {
        let problem = assert_problem_details_from_parts(
            StatusCode::NOT_FOUND,
            &headers("t-1"),
            BODY,
            "TASK_NOT_FOUND",
            StatusCode::NOT_FOUND,
        );
        assert_eq!(problem.detail, "Task 9 not found");
    }

    #[test]
    #[should_panic(expected = "trace_id in body should match")]
    fn rejects_mismatched_trace_ids() {
        assert_problem_details_from_parts(
            StatusCode::NOT_FOUND,
            &headers("t-2"),
            BODY,
            "TASK_NOT_FOUND",
            StatusCode::NOT_FOUND,
        );
    }
}
