//! HTTP response building helpers
//!
//! Every reply is an envelope: `{"status":"success","data":...,"jobId":...}`
//! or `{"status":"error","message":...,"jobId":...}`. The audit log records
//! the envelope without its job id.

use bytes::Bytes;
use http_body_util::Full;
use hyper::header::{self, HeaderValue};
use hyper::{Response, StatusCode};
use serde_json::{json, Value};
use tracing::error;

use crate::error::BackofficeError;

pub type HttpResponse = Response<Full<Bytes>>;

/// Success envelope without job id
pub fn success_body(data: Value) -> Value {
    json!({ "status": "success", "data": data })
}

/// Error envelope without job id
pub fn error_body(message: &str) -> Value {
    json!({ "status": "error", "message": message })
}

/// Status and envelope for a failed request. Infrastructure detail is logged here
/// and replaced by a generic message.
pub fn error_envelope(err: &BackofficeError) -> (StatusCode, Value) {
    if err.is_infrastructure() {
        error!(error = %err, "Request failed");
    }
    (err.status_code(), error_body(&err.public_message()))
}

/// Stamp `job_id` into the envelope and build the response
pub fn envelope_response(status: StatusCode, mut body: Value, job_id: &str) -> HttpResponse {
    if let Value::Object(ref mut map) = body {
        map.insert("jobId".into(), Value::String(job_id.to_string()));
    }
    json_response(status, &body)
}

/// Build a JSON response with the given status code
pub fn json_response(status: StatusCode, body: &Value) -> HttpResponse {
    let json = serde_json::to_string(body).unwrap_or_else(|_| "{}".to_string());
    let mut response = Response::new(Full::new(Bytes::from(json)));
    *response.status_mut() = status;
    response
        .headers_mut()
        .insert(header::CONTENT_TYPE, HeaderValue::from_static("application/json"));
    response
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn envelope_carries_job_id() {
        let response = envelope_response(StatusCode::OK, success_body(json!([1, 2])), "job-1");
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/json"
        );
    }

    #[test]
    fn infrastructure_errors_are_masked() {
        let err = BackofficeError::Database(rusqlite::Error::InvalidQuery);
        let (status, body) = error_envelope(&err);
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body, json!({ "status": "error", "message": "database error" }));
    }
}
