//! Response classification shared by the gateways.

use reqwest::{RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::debug;

use audify_api_models::BackendProblem;

use crate::{HEADER_REQUEST_ID, HEADER_ROUTE};
use crate::error::{GatewayError, GatewayResult};

/// Attach the ambient request identifier and route, if any.
pub(crate) fn with_request_context(request: RequestBuilder) -> RequestBuilder {
    let request = match audify_telemetry::current_request_id() {
        Some(request_id) => request.header(HEADER_REQUEST_ID, request_id),
        None => request,
    };
    match audify_telemetry::current_route() {
        Some(route) => request.header(HEADER_ROUTE, route),
        None => request,
    }
}

/// Send a request, mapping transport failures.
pub(crate) async fn send(endpoint: &str, request: RequestBuilder) -> GatewayResult<Response> {
    debug!(
        endpoint,
        route = audify_telemetry::current_route().as_deref().unwrap_or("-"),
        "sending request"
    );
    with_request_context(request)
        .send()
        .await
        .map_err(|err| network_error(endpoint, &err))
}

pub(crate) fn network_error(endpoint: &str, err: &reqwest::Error) -> GatewayError {
    GatewayError::Network {
        endpoint: endpoint.to_string(),
        message: err.to_string(),
    }
}

/// Decode a success body, or classify a failure status.
pub(crate) async fn decode_json<T: DeserializeOwned>(
    endpoint: &str,
    response: Response,
) -> GatewayResult<T> {
    if !response.status().is_success() {
        return Err(classify_problem(endpoint, response).await);
    }
    let bytes = response
        .bytes()
        .await
        .map_err(|err| network_error(endpoint, &err))?;
    serde_json::from_slice(&bytes).map_err(|err| GatewayError::Decode {
        endpoint: endpoint.to_string(),
        message: err.to_string(),
    })
}

/// Classify a non-success HTTP response into a gateway error.
pub(crate) async fn classify_problem(endpoint: &str, response: Response) -> GatewayError {
    let status = response.status();
    let bytes = response.bytes().await.unwrap_or_default();

    let body_text = String::from_utf8_lossy(&bytes).trim().to_string();
    let message = problem_message(&bytes).unwrap_or(body_text);
    let message = if message.is_empty() {
        format!("request failed with status {status}")
    } else {
        message
    };

    if matches!(status, StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN) {
        GatewayError::Auth {
            endpoint: endpoint.to_string(),
            message,
        }
    } else {
        GatewayError::Status {
            endpoint: endpoint.to_string(),
            status: status.as_u16(),
            message,
        }
    }
}

/// Pull a human-readable detail out of the error bodies we know about.
///
/// Handles the backend's `{"error": "..."}`, Spotify Web API's
/// `{"error": {"message": "..."}}` and OAuth's `{"error", "error_description"}`.
pub(crate) fn problem_message(bytes: &[u8]) -> Option<String> {
    let value: Value = serde_json::from_slice(bytes).ok()?;
    if let Some(description) = value.get("error_description").and_then(Value::as_str) {
        return Some(description.to_string());
    }
    if let Some(message) = value
        .get("error")
        .and_then(|error| error.get("message"))
        .and_then(Value::as_str)
    {
        return Some(message.to_string());
    }
    serde_json::from_value::<BackendProblem>(value)
        .ok()
        .and_then(|problem| problem.error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    #[test]
    fn problem_message_understands_known_shapes() {
        assert_eq!(
            problem_message(br#"{"error": "playlist_link is required"}"#).as_deref(),
            Some("playlist_link is required")
        );
        assert_eq!(
            problem_message(br#"{"error": {"status": 401, "message": "The access token expired"}}"#)
                .as_deref(),
            Some("The access token expired")
        );
        assert_eq!(
            problem_message(
                br#"{"error": "invalid_grant", "error_description": "Invalid authorization code"}"#
            )
            .as_deref(),
            Some("Invalid authorization code")
        );
        assert_eq!(problem_message(b"<html>oops</html>"), None);
    }

    #[tokio::test]
    async fn send_forwards_ambient_request_context() {
        let server = MockServer::start_async().await;
        let tagged = server.mock(|when, then| {
            when.method(GET)
                .path("/v1/me")
                .header(HEADER_REQUEST_ID, "req-7")
                .header(HEADER_ROUTE, "whoami");
            then.status(200);
        });

        let client = reqwest::Client::new();
        let response = audify_telemetry::with_request_context(
            "req-7",
            "whoami",
            send("me", client.get(server.url("/v1/me"))),
        )
        .await
        .expect("request sent");
        assert!(response.status().is_success());
        tagged.assert();
    }

    #[tokio::test]
    async fn send_without_context_adds_no_route() {
        let server = MockServer::start_async().await;
        let plain = server.mock(|when, then| {
            when.method(GET)
                .path("/v1/me")
                .header_missing(HEADER_ROUTE)
                .header_missing(HEADER_REQUEST_ID);
            then.status(204);
        });

        let client = reqwest::Client::new();
        send("me", client.get(server.url("/v1/me")))
            .await
            .expect("request sent");
        plain.assert();
    }
}
