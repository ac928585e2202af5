//! Response shapes for the dashboard.
//!
//! Field names follow the dashboard's JSON contract (camelCase).
//! `imbalancePercent` is rounded to two decimals; all other numbers are
//! passed through unrounded.

use serde::{Deserialize, Serialize};

use crate::balancer::Evaluation;
use crate::models::Assignment;
use crate::validation::DroppedRecord;

/// One entry of `stationLoadSummary`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationLoadEntry {
    /// Station number (1-based).
    pub station: u32,
    /// Sum of packing time on the station.
    pub total_time: f64,
}

/// Body of `POST /api/analyze-orders`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    /// Current load per station, station 1 first.
    pub station_load_summary: Vec<StationLoadEntry>,
    /// Number of accepted orders.
    pub total_orders: usize,
    /// Sum of packing time over accepted orders.
    pub total_time: f64,
    /// `total_time / k`.
    pub avg_load_per_station: f64,
    /// Longest single order.
    pub max_order_time: f64,
    /// Excess of the peak over the average, in percent (2 decimals).
    pub imbalance_percent: f64,
    /// One-sentence summary.
    pub insight: String,
    /// Stations above the overload threshold.
    pub overloaded_stations: usize,
    /// Stations below the underload threshold.
    pub underutilized_stations: usize,
    /// Peak load minus the smallest station load.
    pub workload_spread: f64,
    /// Rows removed during ingestion.
    pub dropped_records: Vec<DroppedRecord>,
    /// Present only when the request asked for it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_assignments: Option<Vec<Assignment>>,
}

/// Body of `POST /api/assign-orders`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssignResponse {
    /// Proposed station per order, in request order.
    pub assignments: Vec<Assignment>,
    /// Load per station under the proposal, station 1 first.
    pub station_load_summary: Vec<StationLoadEntry>,
    /// Imbalance of the proposal, in percent (2 decimals).
    pub imbalance_percent: f64,
    /// Largest station load under the proposal.
    pub makespan: f64,
    /// Strategy that produced the proposal (e.g., "LPT").
    pub strategy: String,
    /// Rows removed during ingestion.
    pub dropped_records: Vec<DroppedRecord>,
}

impl AnalyzeResponse {
    /// Shapes an analyze evaluation.
    pub fn from_evaluation(eval: &Evaluation, include_assignments: bool) -> Self {
        let r = &eval.report;
        Self {
            station_load_summary: summary(eval),
            total_orders: r.total_orders,
            total_time: r.total_time,
            avg_load_per_station: r.avg_load_per_station,
            max_order_time: r.max_order_time,
            imbalance_percent: round2(r.imbalance_percent),
            insight: r.insight.clone(),
            overloaded_stations: r.overloaded_stations,
            underutilized_stations: r.underutilized_stations,
            workload_spread: r.workload_spread,
            dropped_records: eval.dropped.clone(),
            current_assignments: include_assignments.then(|| eval.allocation.assignments.clone()),
        }
    }
}

impl AssignResponse {
    /// Shapes an optimize evaluation.
    pub fn from_evaluation(eval: &Evaluation) -> Self {
        Self {
            assignments: eval.allocation.assignments.clone(),
            station_load_summary: summary(eval),
            imbalance_percent: round2(eval.report.imbalance_percent),
            makespan: eval.report.peak_load,
            strategy: eval.strategy.to_string(),
            dropped_records: eval.dropped.clone(),
        }
    }
}

/// CSV export of an allocation: `orderId,station,packingTime`.
///
/// One row per order in request order, `\n` line endings, header first.
pub fn assignments_csv(eval: &Evaluation) -> String {
    let mut out = String::from("orderId,station,packingTime\n");
    for (a, order) in eval.allocation.assignments.iter().zip(&eval.orders) {
        debug_assert_eq!(a.order_id, order.id);
        out.push_str(&format!("{},{},{}\n", a.order_id, a.station, order.packing_time));
    }
    out
}

fn summary(eval: &Evaluation) -> Vec<StationLoadEntry> {
    eval.report
        .station_loads
        .iter()
        .map(|s| StationLoadEntry {
            station: s.station,
            total_time: s.total_time,
        })
        .collect()
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
