//! Servidor HTTP Axum para reconhecimento de entidades em chinês
//!
//! O modelo é carregado uma única vez na inicialização e compartilhado entre
//! as requisições.

mod config;

use std::sync::Arc;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use cner_core::{corpus::demo_texts, load_classifier, Analysis, NerError, NerPipeline, SharedClassifier};
use serde::Deserialize;
use thiserror::Error;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{error, info};

use crate::config::Config;

/// Estado compartilhado da aplicação
struct AppState {
    pipeline: NerPipeline<SharedClassifier>,
}

#[derive(Deserialize)]
struct RecognizeRequest {
    text: String,
}

#[derive(Debug, Error)]
enum ApiError {
    #[error("tarefa de inferência interrompida")]
    TaskJoin(#[from] tokio::task::JoinError),
    #[error(transparent)]
    Ner(#[from] NerError),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        error!(error = %self, "falha ao reconhecer entidades");
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (StatusCode::INTERNAL_SERVER_ERROR, body).into_response()
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(config.log_filter())
        .init();

    let classifier = load_classifier(&config.model_path)?;
    info!(path = %config.model_path.display(), "modelo carregado");

    let state = Arc::new(AppState {
        pipeline: NerPipeline::new(classifier),
    });

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/recognize", post(recognize_handler))
        .route("/demo-texts", get(demo_texts_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state);

    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    info!("🚀 Servidor NER iniciado em http://{}", config.bind_addr);
    axum::serve(listener, app).await?;
    Ok(())
}

/// Reconhecimento via HTTP POST
///
/// O pipeline é síncrono e roda em `spawn_blocking` para não bloquear o runtime.
async fn recognize_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<RecognizeRequest>,
) -> Result<Json<Analysis>, ApiError> {
    info!(chars = req.text.chars().count(), "analisando texto");
    let analysis =
        tokio::task::spawn_blocking(move || state.pipeline.analyze(&req.text)).await??;
    Ok(Json(analysis))
}

/// Retorna textos de demonstração
async fn demo_texts_handler() -> impl IntoResponse {
    let texts: Vec<serde_json::Value> = demo_texts()
        .iter()
        .map(|(domain, text)| {
            serde_json::json!({
                "domain": domain,
                "text": text
            })
        })
        .collect();
    Json(texts)
}
