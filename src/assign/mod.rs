//! Order-to-station assignment strategies.
//!
//! Provides the [`AssignmentStrategy`] seam and the built-in strategies:
//!
//! - **`Lpt`**: Longest Processing Time first onto the least-loaded station
//!   (default; within 4/3 of the optimal makespan)
//! - **`Exhaustive`**: exact makespan minimization for small instances
//! - **`CurrentStations`**: keeps orders where they already are (used to
//!   describe the current state rather than to optimize it)
//!
//! # Usage
//!
//! ```
//! use u_balance::assign::{AssignmentStrategy, Lpt};
//! use u_balance::models::Order;
//!
//! let orders = vec![Order::new(1, 10.0), Order::new(2, 7.0), Order::new(3, 6.0)];
//! let allocation = Lpt.assign(&orders, 2);
//! assert_eq!(allocation.station_loads, vec![10.0, 13.0]);
//! ```
//!
//! # References
//!
//! - Graham (1969), "Bounds on Multiprocessing Timing Anomalies"
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 5

mod current;
mod exact;
mod lpt;

pub use current::CurrentStations;
pub use exact::{Exhaustive, MAX_EXACT_ORDER_LIMIT};
pub use lpt::Lpt;

use serde::{Deserialize, Serialize};
use std::fmt::{self, Debug};
use std::str::FromStr;
use std::sync::Arc;

use crate::models::{Allocation, Order};

/// A strategy that places every order on exactly one station.
///
/// # Contract
/// For `stations >= 1` the returned allocation must hold one assignment per
/// order, in the same order as `orders`, each on a station in `1..=stations`,
/// and must be deterministic for a fixed input.
pub trait AssignmentStrategy: Send + Sync + Debug {
    /// Strategy name (e.g., "LPT").
    fn name(&self) -> &'static str;

    /// Assigns `orders` to `stations` stations.
    fn assign(&self, orders: &[Order], stations: u32) -> Allocation;

    /// Strategy description.
    fn description(&self) -> &'static str {
        self.name()
    }
}

/// Selectable optimizing strategies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    /// Longest Processing Time heuristic.
    #[default]
    Lpt,
    /// Branch and bound, falling back to LPT on large inputs.
    Exact,
}

impl StrategyKind {
    /// Instantiates the strategy.
    ///
    /// `exact_order_limit` bounds the instance size the exact search accepts.
    pub fn build(self, exact_order_limit: usize) -> Arc<dyn AssignmentStrategy> {
        match self {
            Self::Lpt => Arc::new(Lpt),
            Self::Exact => Arc::new(Exhaustive::new(exact_order_limit)),
        }
    }
}

impl fmt::Display for StrategyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lpt => f.write_str("lpt"),
            Self::Exact => f.write_str("exact"),
        }
    }
}

impl FromStr for StrategyKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lpt" => Ok(Self::Lpt),
            "exact" => Ok(Self::Exact),
            other => Err(format!("unknown strategy '{other}' (expected 'lpt' or 'exact')")),
        }
    }
}

/// Order indices sorted longest packing time first.
///
/// Equal times are ordered by ascending order ID so the sequence is fully
/// determined by the input.
pub fn longest_first(orders: &[Order]) -> Vec<usize> {
    let mut indices: Vec<usize> = (0..orders.len()).collect();
    indices.sort_by(|&a, &b| {
        orders[b]
            .packing_time
            .total_cmp(&orders[a].packing_time)
            .then(orders[a].id.cmp(&orders[b].id))
    });
    indices
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_longest_first() {
        let orders = vec![
            Order::new(3, 5.0),
            Order::new(1, 9.0),
            Order::new(2, 5.0),
            Order::new(4, 0.5),
        ];
        assert_eq!(longest_first(&orders), vec![1, 2, 0, 3]);
        assert!(longest_first(&[]).is_empty());
    }

    #[test]
    fn test_strategy_kind_parse() {
        assert_eq!("LPT".parse::<StrategyKind>().unwrap(), StrategyKind::Lpt);
        assert_eq!(" exact ".parse::<StrategyKind>().unwrap(), StrategyKind::Exact);
        assert!("ilp".parse::<StrategyKind>().is_err());
        assert_eq!(StrategyKind::default().to_string(), "lpt");
    }

    #[test]
    fn test_strategy_kind_build() {
        assert_eq!(StrategyKind::Lpt.build(8).name(), "LPT");
        assert_eq!(StrategyKind::Exact.build(8).name(), "EXACT");
    }
}
