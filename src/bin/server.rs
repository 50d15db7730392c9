//! HTTP front end for the bar cutter.
//!
//! `POST /optimize` takes `{"pieces": [[length, quantity], ...], "bar_length": n}`.
//! The older `tasseaux` key is still accepted in place of `pieces`. Responses
//! only use the current names (`cuts`, `total_bars`, `total_waste`,
//! `total_pieces_cut`, `leftover`); the legacy `total_chute` and
//! `total_tasseaux_decoupes` fields are no longer emitted.

use axum::{
    Json, Router,
    extract::State,
    http::{Method, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use bar_cutter::config::SolverConfig;
use bar_cutter::error::CutError;
use bar_cutter::patterns::PatternSummary;
use bar_cutter::types::{RawPiece, deserialize_i64_from_number};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::Level;

#[derive(Deserialize, Serialize)]
struct OptimizeRequest {
    #[serde(alias = "tasseaux")]
    pieces: Vec<RawPiece>,
    #[serde(deserialize_with = "deserialize_i64_from_number")]
    bar_length: i64,
}

enum ApiError {
    Cut(CutError),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Cut(e @ CutError::InvalidInput { .. }) => {
                (StatusCode::BAD_REQUEST, e.to_string())
            }
            ApiError::Cut(e @ CutError::SolverFailure { .. }) => {
                (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
            }
            ApiError::Internal(message) => (StatusCode::INTERNAL_SERVER_ERROR, message),
        };
        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

async fn optimize(
    State(config): State<SolverConfig>,
    Json(req): Json<OptimizeRequest>,
) -> Result<Json<PatternSummary>, ApiError> {
    tracing::info!(
        body = serde_json::to_string(&req).unwrap_or_default(),
        "POST /optimize"
    );

    let pairs: Vec<(i64, i64)> = req.pieces.iter().map(|p| (p.0, p.1)).collect();
    let bar_length = req.bar_length;
    let summary = tokio::task::spawn_blocking(move || {
        bar_cutter::optimize(&pairs, bar_length, &config)
    })
    .await
    .map_err(|e| ApiError::Internal(format!("optimization task failed: {e}")))?
    .map_err(|e| {
        if let CutError::SolverFailure { .. } = &e {
            tracing::error!(error = %e, "optimization failed");
        }
        ApiError::Cut(e)
    })?;

    tracing::info!(
        total_bars = summary.total_bars,
        total_waste = summary.total_waste,
        total_pieces_cut = summary.total_pieces_cut,
        "optimized"
    );
    Ok(Json(summary))
}

fn app(config: SolverConfig) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::AUTHORIZATION, header::CONTENT_TYPE]);

    Router::new()
        .route("/up", get(|| async { "ok" }))
        .route("/optimize", post(optimize))
        .route("/optimize/", post(optimize))
        .with_state(config)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
}

#[tokio::main]
async fn main() {
    let _sentry = std::env::var("SENTRY_DSN").ok().map(|dsn| {
        sentry::init((
            dsn.as_str(),
            sentry::ClientOptions {
                release: sentry::release_name!(),
                ..Default::default()
            },
        ))
    });

    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open("development.log")
        .expect("failed to open development.log");

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_target(false)
        .with_ansi(false)
        .with_max_level(Level::INFO)
        .init();

    let config = SolverConfig::from_env().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    let port = std::env::var("PORT").unwrap_or_else(|_| "3001".to_string());
    let addr = format!("0.0.0.0:{port}");

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    eprintln!("Listening on {addr} (solver: {})", config.kind.name());
    axum::serve(listener, app(config)).await.unwrap();
}
