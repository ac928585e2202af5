//! Request pipeline: ingest, assign, report.
//!
//! # Flow
//!
//! - **analyze**: ingest → [`CurrentStations`] → report
//! - **optimize**: ingest → configured [`AssignmentStrategy`] → report
//!
//! Every call is a pure function of the request and the balancer's
//! read-only settings, so one `Balancer` can serve concurrent requests.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::assign::{AssignmentStrategy, CurrentStations, Lpt};
use crate::error::Result;
use crate::models::{Allocation, Order};
use crate::report::{ImbalanceReport, InsightThresholds};
use crate::validation::{ingest, DroppedRecord, IngestLimits};

/// Input container shared by both endpoints.
///
/// Orders stay as raw JSON so malformed rows can be dropped individually
/// instead of failing the whole body.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceRequest {
    /// Raw order rows (`{id, packingTime, station?}`).
    #[serde(default)]
    pub orders: Vec<Value>,
    /// Raw station count.
    #[serde(default)]
    pub stations: Option<Value>,
    /// Include per-order assignments in analyze responses.
    #[serde(default)]
    pub include_assignments: bool,
}

impl BalanceRequest {
    /// Creates a request from typed orders.
    pub fn new(orders: &[Order], stations: u32) -> Self {
        Self {
            orders: orders.iter().map(order_row).collect(),
            stations: Some(Value::from(stations)),
            include_assignments: false,
        }
    }

    /// Requests per-order assignments in analyze responses.
    pub fn with_assignments(mut self) -> Self {
        self.include_assignments = true;
        self
    }
}

fn order_row(order: &Order) -> Value {
    let mut row = serde_json::Map::new();
    row.insert("id".into(), Value::from(order.id));
    row.insert("packingTime".into(), Value::from(order.packing_time));
    if let Some(station) = order.current_station {
        row.insert("station".into(), Value::from(station));
    }
    Value::Object(row)
}

/// Everything one pipeline run produced.
#[derive(Debug, Clone)]
pub struct Evaluation {
    /// Orders that survived ingestion.
    pub orders: Vec<Order>,
    /// Rows dropped during ingestion.
    pub dropped: Vec<DroppedRecord>,
    /// Order-to-station allocation.
    pub allocation: Allocation,
    /// Metrics for the allocation.
    pub report: ImbalanceReport,
    /// Name of the strategy that produced the allocation.
    pub strategy: &'static str,
}

impl Evaluation {
    /// Packing time of an order in this evaluation.
    pub fn packing_time(&self, order_id: i64) -> Option<f64> {
        self.orders
            .iter()
            .find(|o| o.id == order_id)
            .map(|o| o.packing_time)
    }
}

/// Stateless load-balancing engine.
///
/// # Example
///
/// ```
/// use u_balance::balancer::{BalanceRequest, Balancer};
/// use u_balance::models::Order;
///
/// let orders = vec![Order::new(1, 10.0), Order::new(2, 7.0), Order::new(3, 6.0), Order::new(4, 5.0)];
/// let balancer = Balancer::new();
/// let result = balancer.optimize(&BalanceRequest::new(&orders, 2)).unwrap();
/// assert_eq!(result.allocation.station_loads, vec![15.0, 13.0]);
/// ```
#[derive(Debug, Clone)]
pub struct Balancer {
    strategy: Arc<dyn AssignmentStrategy>,
    limits: IngestLimits,
    thresholds: InsightThresholds,
}

impl Balancer {
    /// Creates a balancer using LPT and default limits.
    pub fn new() -> Self {
        Self {
            strategy: Arc::new(Lpt),
            limits: IngestLimits::default(),
            thresholds: InsightThresholds::default(),
        }
    }

    /// Sets the optimizing strategy.
    pub fn with_strategy(mut self, strategy: Arc<dyn AssignmentStrategy>) -> Self {
        self.strategy = strategy;
        self
    }

    /// Sets ingestion limits.
    pub fn with_limits(mut self, limits: IngestLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Sets insight thresholds.
    pub fn with_thresholds(mut self, thresholds: InsightThresholds) -> Self {
        self.thresholds = thresholds;
        self
    }

    /// The optimizing strategy.
    pub fn strategy(&self) -> &dyn AssignmentStrategy {
        self.strategy.as_ref()
    }

    /// Describes the current distribution without rebalancing.
    pub fn analyze(&self, request: &BalanceRequest) -> Result<Evaluation> {
        self.evaluate(request, &CurrentStations)
    }

    /// Proposes a balanced distribution.
    pub fn optimize(&self, request: &BalanceRequest) -> Result<Evaluation> {
        self.evaluate(request, self.strategy.as_ref())
    }

    fn evaluate(
        &self,
        request: &BalanceRequest,
        strategy: &dyn AssignmentStrategy,
    ) -> Result<Evaluation> {
        let ingested = ingest(&request.orders, request.stations.as_ref(), &self.limits)?;

        if !ingested.dropped.is_empty() {
            warn!(
                dropped = ingested.dropped_count(),
                accepted = ingested.orders.len(),
                "dropped malformed order rows"
            );
            for record in &ingested.dropped {
                debug!(index = record.index, reason = ?record.reason, "{}", record.message);
            }
        }

        let allocation = strategy.assign(&ingested.orders, ingested.stations);
        let report = ImbalanceReport::calculate(&allocation, &ingested.orders, &self.thresholds)
            .map_err(|e| {
                error!(strategy = strategy.name(), error = %e, "allocation failed verification");
                e
            })?;

        debug!(
            strategy = strategy.name(),
            orders = report.total_orders,
            stations = ingested.stations,
            makespan = report.peak_load,
            imbalance = report.imbalance_percent,
            "evaluation complete"
        );

        Ok(Evaluation {
            orders: ingested.orders,
            dropped: ingested.dropped,
            allocation,
            report,
            strategy: strategy.name(),
        })
    }
}

impl Default for Balancer {
    fn default() -> Self {
        Self::new()
    }
}
