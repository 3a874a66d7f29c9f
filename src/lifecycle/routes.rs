//! HTTP route handlers for the lifecycle simulation API.

use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Json},
    routing::{get, post},
    Router,
};

use crate::error::Result;
use crate::AppState;

use super::export::{curve_to_csv, render_chart_svg};
use super::models::{Chemistry, ChemistryInfo, PredictResponse, SimulationRequest};
use super::service::simulate;

/// Create the lifecycle router with all endpoints.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/chemistries", get(chemistries))
        .route("/predict", post(predict))
        .route("/export.csv", get(export_csv))
        .route("/chart.svg", get(chart_svg))
}

/// Health check for the simulation engine.
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "service": "lifecycle-simulator",
        "version": env!("CARGO_PKG_VERSION"),
        "model": "exponential cycle-life decay"
    }))
}

/// Supported chemistries and their rated cycle life.
async fn chemistries() -> Json<Vec<ChemistryInfo>> {
    Json(Chemistry::ALL.into_iter().map(ChemistryInfo::from).collect())
}

/// Predict cycle life and return the sampled decay curve.
async fn predict(Json(request): Json<SimulationRequest>) -> Result<Json<PredictResponse>> {
    let simulation = simulate(&request)?;
    tracing::info!(
        "Predicted {} cycles for {}",
        simulation.result.predicted_cycles,
        simulation.input.chemistry
    );
    Ok(Json(simulation.into()))
}

/// Download the decay curve as CSV.
async fn export_csv(Query(request): Query<SimulationRequest>) -> Result<impl IntoResponse> {
    let simulation = simulate(&request)?;
    let body = curve_to_csv(&simulation.result)?;
    let disposition = format!(
        "attachment; filename=\"battery-life-{}.csv\"",
        simulation.input.chemistry.key()
    );

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    ))
}

/// Render capacity and efficiency decay as an SVG chart.
async fn chart_svg(
    State(state): State<AppState>,
    Query(request): Query<SimulationRequest>,
) -> Result<impl IntoResponse> {
    let simulation = simulate(&request)?;
    let svg = render_chart_svg(
        &simulation.result,
        state.config.chart_width,
        state.config.chart_height,
    )?;

    Ok(([(header::CONTENT_TYPE, "image/svg+xml")], svg))
}
