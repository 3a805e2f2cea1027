//! Request descriptor → HTTP round trip → invocation result
//!
//! One call per descriptor, no retries and no client-side timeout. Transport
//! failures are folded into a synthetic result with status code 0.

use std::error::Error as StdError;

use reqwest::Client;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{info, warn};

use crate::synth::RequestDescriptor;

/// Status code reserved for results manufactured after a transport failure.
pub const TRANSPORT_FAILURE_STATUS: u16 = 0;

/// Normalized outcome of one invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InvocationResult {
    pub status_code: u16,
    pub status_text: String,
    /// Decoded JSON body, raw text for non-JSON bodies, or `{"error": ...}`
    pub payload: Value,
    pub succeeded: bool,
}

impl InvocationResult {
    pub fn transport_failure(message: impl Into<String>) -> Self {
        Self {
            status_code: TRANSPORT_FAILURE_STATUS,
            status_text: "Error".to_string(),
            payload: json!({ "error": message.into() }),
            succeeded: false,
        }
    }

    pub fn is_transport_failure(&self) -> bool {
        self.status_code == TRANSPORT_FAILURE_STATUS
    }
}

/// Sends request descriptors over HTTP.
#[derive(Debug, Clone, Default)]
pub struct RequestExecutor {
    client: Client,
}

impl RequestExecutor {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Perform the request. Never fails: every error path yields a result.
    pub async fn execute(&self, req: &RequestDescriptor) -> InvocationResult {
        info!(request = %req, "invoking operation");
        match self.send(req).await {
            Ok(result) => {
                info!(
                    status = result.status_code,
                    succeeded = result.succeeded,
                    "received response"
                );
                result
            }
            Err(err) => {
                let message = error_chain(&err);
                warn!(request = %req, error = %message, "transport failure");
                InvocationResult::transport_failure(message)
            }
        }
    }

    async fn send(&self, req: &RequestDescriptor) -> Result<InvocationResult, reqwest::Error> {
        let mut builder = self.client.request(req.method.into(), &req.url);
        for (name, value) in &req.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }
        if let Some(body) = &req.body {
            builder = builder.body(body.clone());
        }

        let resp = builder.send().await?;
        let status = resp.status();
        let text = resp.text().await?;

        Ok(InvocationResult {
            status_code: status.as_u16(),
            status_text: status.canonical_reason().unwrap_or("").to_string(),
            payload: parse_payload(text),
            succeeded: status.is_success() || status.is_redirection(),
        })
    }
}

/// JSON when possible, raw text otherwise, `null` for an empty body.
fn parse_payload(text: String) -> Value {
    if text.trim().is_empty() {
        return Value::Null;
    }
    serde_json::from_str(&text).unwrap_or_else(|_| Value::String(text))
}

fn error_chain(err: &dyn StdError) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::HttpMethod;
    use mockito::Matcher;

    fn descriptor(method: HttpMethod, url: String, body: Option<&str>) -> RequestDescriptor {
        RequestDescriptor {
            url,
            method,
            headers: vec![("Content-Type".to_string(), "application/json".to_string())],
            body: body.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn execute_decodes_json_success() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/users/42")
            .match_query(Matcher::UrlEncoded("limit".into(), "10".into()))
            .match_header("content-type", "application/json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"id":42,"name":"John"}"#)
            .create_async()
            .await;

        let req = descriptor(
            HttpMethod::Get,
            format!("{}/users/42?limit=10", server.url()),
            None,
        );
        let result = RequestExecutor::default().execute(&req).await;

        assert_eq!(result.status_code, 200);
        assert_eq!(result.status_text, "OK");
        assert!(result.succeeded);
        assert_eq!(result.payload, json!({ "id": 42, "name": "John" }));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn execute_sends_body_verbatim() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/users")
            .match_header("content-type", "application/json")
            .match_body(Matcher::Exact("{not valid json".to_string()))
            .with_status(422)
            .with_header("content-type", "application/json")
            .with_body(r#"{"detail":"invalid body"}"#)
            .create_async()
            .await;

        let req = descriptor(
            HttpMethod::Post,
            format!("{}/users", server.url()),
            Some("{not valid json"),
        );
        let result = RequestExecutor::default().execute(&req).await;

        assert_eq!(result.status_code, 422);
        assert!(!result.succeeded);
        assert_eq!(result.payload["detail"], "invalid body");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn execute_reports_server_errors_as_results() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("DELETE", "/users/9")
            .with_status(404)
            .with_header("content-type", "application/json")
            .with_body(r#"{"detail":"User not found"}"#)
            .create_async()
            .await;

        let req = descriptor(HttpMethod::Delete, format!("{}/users/9", server.url()), None);
        let result = RequestExecutor::default().execute(&req).await;

        assert_eq!(result.status_code, 404);
        assert_eq!(result.status_text, "Not Found");
        assert!(!result.succeeded);
        assert!(!result.is_transport_failure());
        assert_eq!(result.payload, json!({ "detail": "User not found" }));
    }

    #[tokio::test]
    async fn execute_treats_redirection_status_as_success() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/cached")
            .with_status(304)
            .create_async()
            .await;

        let req = descriptor(HttpMethod::Get, format!("{}/cached", server.url()), None);
        let result = RequestExecutor::default().execute(&req).await;

        assert_eq!(result.status_code, 304);
        assert!(result.succeeded);
        assert_eq!(result.payload, Value::Null);
    }

    #[tokio::test]
    async fn execute_keeps_non_json_body_as_text() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("GET", "/plain")
            .with_status(200)
            .with_header("content-type", "text/plain")
            .with_body("plain text response")
            .create_async()
            .await;

        let req = descriptor(HttpMethod::Get, format!("{}/plain", server.url()), None);
        let result = RequestExecutor::default().execute(&req).await;

        assert!(result.succeeded);
        assert_eq!(result.payload, Value::String("plain text response".into()));
    }

    #[tokio::test]
    async fn execute_forwards_descriptor_headers() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/me")
            .match_header("x-request-id", "abc123")
            .match_header("cookie", "session=s1")
            .with_status(200)
            .with_body("{}")
            .create_async()
            .await;

        let mut req = descriptor(HttpMethod::Get, format!("{}/me", server.url()), None);
        req.headers.push(("X-Request-Id".to_string(), "abc123".to_string()));
        req.headers.push(("Cookie".to_string(), "session=s1".to_string()));
        let result = RequestExecutor::default().execute(&req).await;

        assert!(result.succeeded);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn execute_turns_connection_refused_into_transport_failure() {
        // Port 1 is reserved and has nothing listening.
        let req = descriptor(HttpMethod::Get, "http://127.0.0.1:1/users".to_string(), None);
        let result = RequestExecutor::default().execute(&req).await;

        assert_eq!(result.status_code, 0);
        assert_eq!(result.status_text, "Error");
        assert!(!result.succeeded);
        assert!(result.is_transport_failure());
        let message = result.payload["error"].as_str().unwrap();
        assert!(!message.is_empty());
    }

    #[tokio::test]
    async fn execute_turns_invalid_url_into_transport_failure() {
        let req = descriptor(HttpMethod::Get, "not a url".to_string(), None);
        let result = RequestExecutor::default().execute(&req).await;

        assert!(result.is_transport_failure());
        assert!(result.payload["error"].is_string());
    }

    #[test]
    fn parse_payload_handles_empty_and_whitespace_bodies() {
        assert_eq!(parse_payload(String::new()), Value::Null);
        assert_eq!(parse_payload("  \n".to_string()), Value::Null);
        assert_eq!(parse_payload("[1,2]".to_string()), json!([1, 2]));
    }
}
