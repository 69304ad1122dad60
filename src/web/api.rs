//! Defines the Axum API routes and handlers.
//!
//! These routes are the external command layer: each lifecycle endpoint
//! forwards a notification to the tracker task and relays the one-line
//! confirmation or rejection back to the operator. Rejected transitions
//! map to 409, accepted ones to 200.

use crate::print_stats::{JobOutcome, StatsError, StatusSnapshot};
use crate::web::models::{AckResponse, ErrorRequest, ResetRequest};
use crate::web::stats_channel::StatsRequest;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use tokio::sync::mpsc::Sender;
use tokio::sync::oneshot;

pub type AppState = Sender<StatsRequest>;

/// Creates the Axum router with all the API endpoints.
pub fn create_router(stats_tx: AppState) -> Router {
    Router::new()
        .route("/api/v1/print_stats", get(get_status))
        .route("/api/v1/print_stats/start", post(start_job))
        .route("/api/v1/print_stats/pause", post(pause_job))
        .route("/api/v1/print_stats/error", post(fail_job))
        .route("/api/v1/print_stats/cancel", post(cancel_job))
        .route("/api/v1/print_stats/complete", post(complete_job))
        .route("/api/v1/print_stats/reset", post(reset_job))
        .with_state(stats_tx)
}

/// Handler to get the current status snapshot.
async fn get_status(State(stats_tx): State<AppState>) -> Result<Json<StatusSnapshot>, StatusCode> {
    let (resp_tx, resp_rx) = oneshot::channel();
    if stats_tx
        .send(StatsRequest::GetStatus {
            respond_to: resp_tx,
        })
        .await
        .is_err()
    {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    match resp_rx.await {
        Ok(status) => Ok(Json(status)),
        Err(_) => Err(StatusCode::INTERNAL_SERVER_ERROR),
    }
}

/// Send a lifecycle notification to the tracker task and map the outcome
/// string onto an HTTP response.
async fn dispatch(
    stats_tx: &AppState,
    build: impl FnOnce(oneshot::Sender<Result<String, StatsError>>) -> StatsRequest,
) -> Result<(StatusCode, Json<AckResponse>), StatusCode> {
    let (resp_tx, resp_rx) = oneshot::channel();
    if stats_tx.send(build(resp_tx)).await.is_err() {
        return Err(StatusCode::INTERNAL_SERVER_ERROR);
    }
    match resp_rx.await {
        Ok(Ok(message)) => Ok((StatusCode::OK, Json(AckResponse { message }))),
        Ok(Err(rejection)) => Ok((
            StatusCode::CONFLICT,
            Json(AckResponse {
                message: rejection.to_string(),
            }),
        )),
        Err(_) => Err(StatusCode::INTERNAL_SERVER_ERROR),
    }
}

async fn start_job(
    State(stats_tx): State<AppState>,
) -> Result<(StatusCode, Json<AckResponse>), StatusCode> {
    dispatch(&stats_tx, |respond_to| StatsRequest::Start { respond_to }).await
}

async fn pause_job(
    State(stats_tx): State<AppState>,
) -> Result<(StatusCode, Json<AckResponse>), StatusCode> {
    dispatch(&stats_tx, |respond_to| StatsRequest::Pause { respond_to }).await
}

async fn fail_job(
    State(stats_tx): State<AppState>,
    Json(payload): Json<ErrorRequest>,
) -> Result<(StatusCode, Json<AckResponse>), StatusCode> {
    dispatch(&stats_tx, |respond_to| StatsRequest::Terminate {
        outcome: JobOutcome::Error,
        message: payload.message,
        respond_to,
    })
    .await
}

async fn cancel_job(
    State(stats_tx): State<AppState>,
) -> Result<(StatusCode, Json<AckResponse>), StatusCode> {
    dispatch(&stats_tx, |respond_to| StatsRequest::Terminate {
        outcome: JobOutcome::Cancel,
        message: None,
        respond_to,
    })
    .await
}

async fn complete_job(
    State(stats_tx): State<AppState>,
) -> Result<(StatusCode, Json<AckResponse>), StatusCode> {
    dispatch(&stats_tx, |respond_to| StatsRequest::Terminate {
        outcome: JobOutcome::Complete,
        message: None,
        respond_to,
    })
    .await
}

async fn reset_job(
    State(stats_tx): State<AppState>,
    Json(payload): Json<ResetRequest>,
) -> Result<(StatusCode, Json<AckResponse>), StatusCode> {
    dispatch(&stats_tx, |respond_to| StatsRequest::Reset {
        filename: payload.filename,
        respond_to,
    })
    .await
}
