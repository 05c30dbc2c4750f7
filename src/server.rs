use crate::config::ServerConfig;
use crate::data::{ScheduleRequest, ScheduleResponse};
use crate::scheduler::{self, ScheduleError, TimetableParams};
use axum::extract::State;
use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use log::{error, info, warn};
use rand::SeedableRng;
use rand::rngs::StdRng;
use serde_json::{Value, json};
use std::sync::Arc;

type ApiError = (StatusCode, Json<Value>);

fn api_error(status: StatusCode, message: impl ToString) -> ApiError {
    (status, Json(json!({ "error": message.to_string() })))
}

async fn solve_handler(
    State(config): State<Arc<ServerConfig>>,
    payload: Result<Json<ScheduleRequest>, JsonRejection>,
) -> Result<Json<ScheduleResponse>, ApiError> {
    let Json(request) = payload.map_err(|e| {
        warn!("Unreadable schedule request: {}", e.body_text());
        api_error(StatusCode::BAD_REQUEST, e.body_text())
    })?;
    let params = TimetableParams::try_from(&request).map_err(|e| {
        warn!("Rejected schedule request: {e}");
        api_error(StatusCode::BAD_REQUEST, e)
    })?;

    let seed = request
        .seed
        .or(config.seed)
        .unwrap_or_else(rand::random);
    info!(
        "Solving for {} classes, {} subjects, {} teachers (seed {seed})",
        params.classes,
        params.subjects.len(),
        params.teachers
    );

    let limits = config.search_limits();
    let outcome = tokio::task::spawn_blocking(move || {
        let mut rng = StdRng::seed_from_u64(seed);
        scheduler::generate_schedule(&params, limits, &mut rng)
    })
    .await
    .map_err(|e| api_error(StatusCode::INTERNAL_SERVER_ERROR, e))?;

    outcome.map(|lessons| Json(lessons.into())).map_err(|e| {
        let status = status_for(&e);
        if status.is_server_error() {
            error!("Schedule generation failed: {e}");
        } else {
            warn!("No schedule: {e}");
        }
        api_error(status, e)
    })
}

fn status_for(error: &ScheduleError) -> StatusCode {
    match error {
        ScheduleError::Infeasible | ScheduleError::SearchLimit(_) => {
            StatusCode::UNPROCESSABLE_ENTITY
        }
        ScheduleError::InvalidParameters | ScheduleError::TooLarge { .. } => {
            StatusCode::BAD_REQUEST
        }
        ScheduleError::Model(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

pub fn router(config: ServerConfig) -> Router {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .route("/v1/schedule/solve", post(solve_handler))
        .with_state(Arc::new(config))
}

pub async fn run_server(config: ServerConfig) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(config.addr).await?;

    info!("Server running at http://{}", listener.local_addr()?);

    axum::serve(listener, router(config)).await
}
