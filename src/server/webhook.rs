//! Webhook endpoint handler.
//!
//! Accepts GitHub webhook deliveries, validates signatures, parses the
//! payload into a typed event, and hands it to the engine on a spawned task
//! before returning 202 Accepted. A failure while processing one delivery
//! never surfaces to GitHub as anything but a status code; redelivery is not
//! required because the next natural event re-triggers evaluation.

use axum::body::Bytes;
use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{debug, warn};

use super::AppState;
use crate::webhooks::{ParseError, parse_webhook, verify_signature};

/// Header name for GitHub event type.
const HEADER_EVENT: &str = "x-github-event";
/// Header name for GitHub delivery ID.
const HEADER_DELIVERY: &str = "x-github-delivery";
/// Header name for GitHub signature.
const HEADER_SIGNATURE: &str = "x-hub-signature-256";

/// Errors that can occur when accepting a webhook.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// Missing required header.
    #[error("missing required header: {0}")]
    MissingHeader(&'static str),

    /// Invalid signature.
    #[error("invalid signature")]
    InvalidSignature,

    /// The payload should have parsed for this event type but didn't.
    #[error("malformed payload: {0}")]
    Malformed(#[from] ParseError),
}

impl IntoResponse for WebhookError {
    fn into_response(self) -> Response {
        let status = match &self {
            WebhookError::MissingHeader(_) => StatusCode::BAD_REQUEST,
            WebhookError::InvalidSignature => StatusCode::UNAUTHORIZED,
            WebhookError::Malformed(_) => StatusCode::BAD_REQUEST,
        };

        (status, self.to_string()).into_response()
    }
}

/// Webhook handler.
///
/// # Request
///
/// - Method: POST
/// - Required headers: `X-GitHub-Event`, `X-GitHub-Delivery`,
///   `X-Hub-Signature-256`
/// - Body: JSON webhook payload
///
/// # Response
///
/// - 202 Accepted: event accepted (or irrelevant and ignored)
/// - 400 Bad Request: missing header or malformed payload
/// - 401 Unauthorized: invalid signature
pub async fn webhook_handler(
    State(app_state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<(StatusCode, &'static str), WebhookError> {
    let event_type = get_header(&headers, HEADER_EVENT)?;
    let delivery_id = get_header(&headers, HEADER_DELIVERY)?;
    let signature_header = get_header(&headers, HEADER_SIGNATURE)?;

    debug!(
        delivery_id = %delivery_id,
        event_type = %event_type,
        "received webhook"
    );

    // Verify the signature before any parsing.
    if !verify_signature(&body, &signature_header, app_state.webhook_secret()) {
        warn!(delivery_id = %delivery_id, "invalid webhook signature");
        return Err(WebhookError::InvalidSignature);
    }

    match parse_webhook(&event_type, &body) {
        Ok(Some(event)) => {
            let engine = app_state.engine().clone();
            tokio::spawn(async move {
                engine.handle_event(event).await;
            });
            Ok((StatusCode::ACCEPTED, "Accepted"))
        }
        Ok(None) => {
            debug!(
                delivery_id = %delivery_id,
                event_type = %event_type,
                "ignoring irrelevant event"
            );
            Ok((StatusCode::ACCEPTED, "Ignored"))
        }
        Err(e) => {
            warn!(
                delivery_id = %delivery_id,
                event_type = %event_type,
                error = %e,
                "dropping malformed webhook payload"
            );
            Err(WebhookError::Malformed(e))
        }
    }
}

/// Extracts a required header value as a string.
fn get_header(headers: &HeaderMap, name: &'static str) -> Result<String, WebhookError> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(|s| s.to_string())
        .ok_or(WebhookError::MissingHeader(name))
}
