use axum::{
    body::Body,
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use bytes::Bytes;
use http::{HeaderMap, HeaderValue, Method};
use http_body_util::BodyExt;
use serde_json::Value;
use std::time::Instant;

use crate::error::ApiError;
use crate::state::AppState;

const SENSITIVE_FIELDS: [&str; 8] = [
    "password",
    "token",
    "jwt",
    "authorization",
    "secret",
    "credentials",
    "accessToken",
    "access_token",
];

const SENSITIVE_HEADERS: [&str; 4] = ["authorization", "cookie", "x-api-key", "x-auth-token"];

fn should_ignore_path(path: &str) -> bool {
    matches!(path, "/api/health" | "/api/health/")
}

/// Replaces sensitive fields at any depth, so a nested `student.password`
/// is hidden as well as a top-level `token`.
fn redact(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, field) in map.iter_mut() {
                if SENSITIVE_FIELDS.iter().any(|s| s.eq_ignore_ascii_case(key)) {
                    *field = Value::String("[REDACTED]".to_string());
                } else {
                    redact(field);
                }
            }
        }
        Value::Array(items) => items.iter_mut().for_each(redact),
        _ => {}
    }
}

fn body_for_log(bytes: &[u8]) -> Value {
    match serde_json::from_slice::<Value>(bytes) {
        Ok(mut json) => {
            redact(&mut json);
            json
        }
        Err(_) => Value::Null,
    }
}

fn redact_headers(headers: &HeaderMap) -> HeaderMap {
    let mut filtered = headers.clone();
    for name in SENSITIVE_HEADERS {
        if let Some(value) = filtered.get_mut(name) {
            *value = HeaderValue::from_static("[REDACTED]");
        }
    }
    filtered
}

async fn buffer_body(direction: &str, body: Body) -> Result<Bytes, ApiError> {
    body.collect()
        .await
        .map(|collected| collected.to_bytes())
        .map_err(|e| ApiError::BadRequest(format!("Failed to read {} body: {}", direction, e)))
}

pub async fn http_logger(
    State(state): State<AppState>,
    req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let path = req.uri().path().to_string();
    if should_ignore_path(&path) || req.method() == Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    let start_time = Instant::now();
    let method = req.method().clone();
    let req_headers = redact_headers(req.headers());

    let (parts, body) = req.into_parts();
    let bytes = buffer_body("request", body).await?;
    let req_body = body_for_log(&bytes);
    let req = Request::from_parts(parts, Body::from(bytes));

    let response = next.run(req).await;
    let latency = start_time.elapsed();
    let status = response.status();

    let (parts, body) = response.into_parts();
    let bytes = buffer_body("response", body).await?;
    let res_body = if matches!(method, Method::POST | Method::PUT | Method::DELETE) {
        body_for_log(&bytes)
    } else {
        Value::Null
    };
    let response = Response::from_parts(parts, Body::from(bytes));

    tracing::info!(
        method = %method,
        path = %path,
        req_headers = ?req_headers,
        req_body = %req_body,
        status = status.as_u16(),
        latency_ms = latency.as_millis(),
        res_body = %res_body,
        app_env = %state.config.app_env,
        "HTTP request completed"
    );

    Ok(response)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn nested_secrets_are_redacted() {
        let logged = body_for_log(
            json!({
                "email": "ada@alpha.school",
                "password": "hunter2",
                "user": {"token": "abc", "name": "Ada"},
                "items": [{"Authorization": "Bearer x"}]
            })
            .to_string()
            .as_bytes(),
        );

        assert_eq!(logged["email"], "ada@alpha.school");
        assert_eq!(logged["password"], "[REDACTED]");
        assert_eq!(logged["user"]["token"], "[REDACTED]");
        assert_eq!(logged["user"]["name"], "Ada");
        assert_eq!(logged["items"][0]["Authorization"], "[REDACTED]");
    }

    #[test]
    fn auth_headers_are_hidden() {
        let mut headers = HeaderMap::new();
        headers.insert("authorization", HeaderValue::from_static("Bearer abc"));
        headers.insert("x-local-goals", HeaderValue::from_static("{}"));

        let filtered = redact_headers(&headers);
        assert_eq!(filtered["authorization"], "[REDACTED]");
        assert_eq!(filtered["x-local-goals"], "{}");
    }

    #[test]
    fn non_json_bodies_log_as_null() {
        assert_eq!(body_for_log(b"plain text"), Value::Null);
    }
}
