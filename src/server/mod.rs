// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Nereid-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Umlpress and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! HTTP surface.
//!
//! `POST /api/diagrams/render` turns `{ "plantUmlCode": ... }` into PNG/SVG URLs on the
//! configured PlantUML server. The rendered image is never fetched here.

use std::fmt;
use std::future::Future;
use std::sync::Arc;

use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::Value;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::config::ServerConfig;
use crate::render::{RenderHost, RenderUrls};
use crate::token::{EncodingError, TokenEncoder};

mod types;

pub use types::{ErrorBody, HealthResponse, RenderRequest, RequestError, SOURCE_FIELD};

pub const RENDER_PATH: &str = "/api/diagrams/render";
pub const HEALTH_PATH: &str = "/healthz";

#[derive(Debug, Clone)]
struct AppState {
    encoder: TokenEncoder,
    render_host: RenderHost,
}

#[derive(Debug)]
pub enum ApiError {
    Body(JsonRejection),
    Request(RequestError),
    Encoding(EncodingError),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Body(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
                StatusCode::PAYLOAD_TOO_LARGE
            }
            Self::Body(_) | Self::Request(_) => StatusCode::BAD_REQUEST,
            Self::Encoding(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Body(rejection) => write!(f, "invalid request body: {}", rejection.body_text()),
            Self::Request(err) => fmt::Display::fmt(err, f),
            Self::Encoding(err) => fmt::Display::fmt(err, f),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        (status, Json(ErrorBody { error: self.to_string() })).into_response()
    }
}

pub fn router(config: &ServerConfig) -> Router {
    let state = Arc::new(AppState {
        encoder: TokenEncoder::new(config.framing),
        render_host: config.render_host.clone(),
    });

    Router::new()
        .route(RENDER_PATH, post(render_diagram))
        .route(HEALTH_PATH, get(health))
        .layer(DefaultBodyLimit::max(config.max_body_bytes))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds `config.bind` and serves until `shutdown` resolves.
pub async fn serve(
    config: ServerConfig,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let listener = TcpListener::bind(config.bind).await?;
    serve_on(listener, &config, shutdown).await
}

pub async fn serve_on(
    listener: TcpListener,
    config: &ServerConfig,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> std::io::Result<()> {
    let addr = listener.local_addr()?;
    tracing::info!(
        %addr,
        render_host = %config.render_host,
        framing = %config.framing,
        "serving diagram render API"
    );

    axum::serve(listener, router(config)).with_graceful_shutdown(shutdown).await?;

    tracing::info!(%addr, "diagram render API stopped");
    Ok(())
}

async fn render_diagram(
    State(state): State<Arc<AppState>>,
    body: Result<Json<Value>, JsonRejection>,
) -> Result<Json<RenderUrls>, ApiError> {
    let Json(body) = body.map_err(|rejection| {
        tracing::debug!(error = %rejection.body_text(), "rejected render request body");
        ApiError::Body(rejection)
    })?;

    let request = RenderRequest::from_json(&body).map_err(|err| {
        tracing::debug!(error = %err, "rejected render request");
        ApiError::Request(err)
    })?;

    let token = state.encoder.encode(&request.plant_uml_code).map_err(|err| {
        tracing::error!(error = %err, source_len = request.plant_uml_code.len(), "encoding failed");
        ApiError::Encoding(err)
    })?;

    tracing::debug!(
        source_len = request.plant_uml_code.len(),
        token_len = token.as_str().len(),
        "encoded diagram"
    );
    Ok(Json(state.render_host.urls(&token)))
}

async fn health() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok".to_owned() })
}
