use crate::controller::{ ControllerError, ViewController, ViewSnapshot };
use crate::models::ContentKind;
use std::error::Error;
use std::net::SocketAddr;
use std::sync::Arc;
use axum::{
    routing::{get, post},
    Router,
    Json,
    extract::State,
    response::{IntoResponse, Response},
    http::StatusCode,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use log::{info, error};

#[derive(Deserialize)]
pub struct TabRequest {
    pub kind: ContentKind,
}

#[derive(Deserialize)]
pub struct GenerateRequest {
    #[serde(default)]
    pub kind: Option<ContentKind>,
}

#[derive(Deserialize)]
pub struct RateRequest {
    pub id: String,
    pub rating: f64,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Clone)]
struct AppState {
    controller: Arc<ViewController>,
}

pub fn router(controller: Arc<ViewController>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/state", get(state_handler))
        .route("/api/tab", post(tab_handler))
        .route("/api/generate", post(generate_handler))
        .route("/api/rate", post(rate_handler))
        .layer(cors)
        .with_state(AppState { controller })
}

pub async fn start_http_server(
    addr: &str,
    controller: Arc<ViewController>,
) -> Result<(), Box<dyn Error + Send + Sync>> {
    let addr = addr.parse::<SocketAddr>()?;
    let listener = tokio::net::TcpListener::bind(addr).await.map_err(|e| {
        error!("Failed to bind HTTP server to {}: {}. Try a different port.", addr, e);
        e
    })?;
    info!("Starting HTTP API server on: http://{}", addr);

    axum::serve(listener, router(controller).into_make_service()).await?;
    Ok(())
}

async fn state_handler(State(state): State<AppState>) -> Json<ViewSnapshot> {
    Json(state.controller.snapshot().await)
}

async fn tab_handler(
    State(state): State<AppState>,
    Json(req): Json<TabRequest>,
) -> Json<ViewSnapshot> {
    state.controller.select_tab(req.kind).await;
    Json(state.controller.snapshot().await)
}

async fn generate_handler(
    State(state): State<AppState>,
    Json(req): Json<GenerateRequest>,
) -> Json<ViewSnapshot> {
    state.controller.request_generation(req.kind).await;
    Json(state.controller.snapshot().await)
}

async fn rate_handler(
    State(state): State<AppState>,
    Json(req): Json<RateRequest>,
) -> Response {
    match state.controller.rate(&req.id, req.rating).await {
        Ok(()) => Json(state.controller.snapshot().await).into_response(),
        Err(e) => {
            let code = match e {
                ControllerError::InvalidRating(_) => StatusCode::BAD_REQUEST,
                ControllerError::Persist(_) => {
                    error!("Rating {} failed: {}", req.id, e);
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            };
            (code, Json(ErrorResponse { error: e.to_string() })).into_response()
        }
    }
}
