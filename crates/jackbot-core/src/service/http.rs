use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::channel::messenger::{self, WebhookEvent};
use crate::config::Config;

/// Shared application state for the webhook endpoint.
pub struct AppState {
    pub config: Arc<Config>,
    pub router: Arc<crate::router::Router>,
}

#[derive(Serialize)]
struct HealthResponse {
    status: String,
    version: String,
}

/// GET /webhook — Subscription verification handshake.
///
/// The platform calls this once when the webhook is registered; we
/// echo the challenge back only when the verify token matches ours.
async fn handle_verify(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> impl IntoResponse {
    let mode = params.get("hub.mode").map(String::as_str);
    let token = params.get("hub.verify_token").map(String::as_str);

    if mode == Some("subscribe") && token == Some(state.config.messenger.validation_token.as_str())
    {
        info!("webhook subscription validated");
        let challenge = params.get("hub.challenge").cloned().unwrap_or_default();
        (StatusCode::OK, challenge)
    } else {
        warn!("webhook validation failed, verify token mismatch");
        (StatusCode::FORBIDDEN, String::new())
    }
}

/// POST /webhook — Inbound messaging events.
async fn handle_webhook(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let signature = headers
        .get("x-hub-signature")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("");

    if !messenger::verify_signature(&state.config.messenger.app_secret, &body, signature) {
        warn!("webhook signature verification failed");
        return StatusCode::FORBIDDEN;
    }

    let event: WebhookEvent = match messenger::parse_webhook_event(&body) {
        Ok(event) => event,
        Err(e) => {
            error!(error = %e, "failed to parse webhook body");
            return StatusCode::BAD_REQUEST;
        }
    };

    if event.object != "page" {
        return StatusCode::OK;
    }

    // Acknowledge within the platform's delivery deadline and do the
    // actual work in the background.
    for entry in event.entry {
        for messaging in entry.messaging {
            let router = state.router.clone();
            tokio::spawn(async move {
                router.handle_event(messaging).await;
            });
        }
    }

    StatusCode::OK
}

/// GET /health — Health check.
async fn handle_health() -> impl IntoResponse {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: crate::VERSION.to_string(),
    })
}

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/webhook", get(handle_verify).post(handle_webhook))
        .route("/health", get(handle_health))
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the HTTP server on the given address.
pub async fn serve(addr: &str, state: Arc<AppState>) -> anyhow::Result<()> {
    let router = create_router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("HTTP server listening on {}", addr);
    axum::serve(listener, router).await?;
    Ok(())
}
