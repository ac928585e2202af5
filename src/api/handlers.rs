use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::header;
use axum::response::IntoResponse;
use axum::Json;
use tracing::info;

use super::{ApiError, AppState};
use crate::balancer::BalanceRequest;
use crate::format::{assignments_csv, AnalyzeResponse, AssignResponse};

pub(super) async fn health() -> &'static str {
    "OK"
}

pub(super) async fn analyze_orders(
    State(state): State<AppState>,
    payload: Result<Json<BalanceRequest>, JsonRejection>,
) -> Result<Json<AnalyzeResponse>, ApiError> {
    let Json(request) = payload?;
    let eval = state.balancer.analyze(&request)?;

    info!(
        orders = eval.report.total_orders,
        stations = eval.allocation.stations,
        dropped = eval.dropped.len(),
        imbalance = eval.report.imbalance_percent,
        "analyzed orders"
    );
    Ok(Json(AnalyzeResponse::from_evaluation(
        &eval,
        request.include_assignments,
    )))
}

pub(super) async fn assign_orders(
    State(state): State<AppState>,
    payload: Result<Json<BalanceRequest>, JsonRejection>,
) -> Result<Json<AssignResponse>, ApiError> {
    let Json(request) = payload?;
    let eval = state.balancer.optimize(&request)?;

    info!(
        strategy = eval.strategy,
        orders = eval.report.total_orders,
        stations = eval.allocation.stations,
        dropped = eval.dropped.len(),
        makespan = eval.report.peak_load,
        imbalance = eval.report.imbalance_percent,
        "assigned orders"
    );
    Ok(Json(AssignResponse::from_evaluation(&eval)))
}

pub(super) async fn export_assignments(
    State(state): State<AppState>,
    payload: Result<Json<BalanceRequest>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(request) = payload?;
    let eval = state.balancer.optimize(&request)?;

    info!(orders = eval.report.total_orders, "exported assignments");
    Ok((
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"optimized_workload.csv\"",
            ),
        ],
        assignments_csv(&eval),
    ))
}
