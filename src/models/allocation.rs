//! Allocation (solution) model.
//!
//! An allocation maps every order to exactly one station and carries the
//! resulting per-station load vector. Stations are numbered `1..=k`; the
//! load vector is indexed by `station - 1`.
//!
//! # Reference
//! Graham (1969), "Bounds on Multiprocessing Timing Anomalies"

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use super::Order;
use crate::error::{BalancerError, Result};

/// Relative tolerance used when comparing floating-point load sums.
const LOAD_EPSILON: f64 = 1e-9;

/// A complete order-to-station allocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    /// Number of stations (`k`).
    pub stations: u32,
    /// One entry per order, in ingestion order.
    pub assignments: Vec<Assignment>,
    /// Total packing time per station (index = station - 1).
    pub station_loads: Vec<f64>,
}

/// An order-station pairing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Assignment {
    /// Assigned order ID.
    pub order_id: i64,
    /// Station number (1-based).
    pub station: u32,
}

impl Assignment {
    /// Creates a new assignment.
    pub fn new(order_id: i64, station: u32) -> Self {
        Self { order_id, station }
    }
}

impl Allocation {
    /// Builds an allocation from a station slot per order.
    ///
    /// `slots[i]` is the station of `orders[i]`. Slots outside `1..=stations`
    /// are kept as-is (and later rejected by [`Allocation::verify`]) but
    /// contribute no load.
    pub fn from_slots(orders: &[Order], stations: u32, slots: &[u32]) -> Self {
        let mut station_loads = vec![0.0; stations as usize];
        let mut assignments = Vec::with_capacity(orders.len());

        for (order, &station) in orders.iter().zip(slots) {
            if let Some(load) = station
                .checked_sub(1)
                .and_then(|idx| station_loads.get_mut(idx as usize))
            {
                *load += order.packing_time;
            }
            assignments.push(Assignment::new(order.id, station));
        }

        Self {
            stations,
            assignments,
            station_loads,
        }
    }

    /// Makespan: largest station load.
    pub fn makespan(&self) -> f64 {
        self.station_loads.iter().copied().fold(0.0, f64::max)
    }

    /// Smallest station load (0 when there are no stations).
    pub fn min_load(&self) -> f64 {
        self.station_loads
            .iter()
            .copied()
            .reduce(f64::min)
            .unwrap_or(0.0)
    }

    /// Sum of all station loads.
    pub fn total_load(&self) -> f64 {
        self.station_loads.iter().sum()
    }

    /// Number of orders on each station (index = station - 1).
    pub fn order_counts(&self) -> Vec<usize> {
        let mut counts = vec![0; self.stations as usize];
        for a in &self.assignments {
            if let Some(c) = a
                .station
                .checked_sub(1)
                .and_then(|idx| counts.get_mut(idx as usize))
            {
                *c += 1;
            }
        }
        counts
    }

    /// Checks the allocation against the orders it was built from.
    ///
    /// Verifies:
    /// 1. Every station index lies in `1..=stations`
    /// 2. Every order appears exactly once, and no unknown order appears
    /// 3. The stored load vector matches loads recomputed from the orders
    /// 4. No station load is negative
    /// 5. Total packing time is conserved
    pub fn verify(&self, orders: &[Order]) -> Result<()> {
        if self.station_loads.len() != self.stations as usize {
            return Err(BalancerError::invariant(format!(
                "load vector has {} entries for {} stations",
                self.station_loads.len(),
                self.stations
            )));
        }

        let times: HashMap<i64, f64> = orders.iter().map(|o| (o.id, o.packing_time)).collect();
        let mut seen = HashSet::with_capacity(self.assignments.len());
        let mut recomputed = vec![0.0; self.stations as usize];

        for a in &self.assignments {
            if a.station == 0 || a.station > self.stations {
                return Err(BalancerError::invariant(format!(
                    "order {} placed on station {} outside 1..={}",
                    a.order_id, a.station, self.stations
                )));
            }
            let time = times.get(&a.order_id).ok_or_else(|| {
                BalancerError::invariant(format!("unknown order {} in allocation", a.order_id))
            })?;
            if !seen.insert(a.order_id) {
                return Err(BalancerError::invariant(format!(
                    "order {} assigned more than once",
                    a.order_id
                )));
            }
            recomputed[(a.station - 1) as usize] += time;
        }

        if let Some(missing) = orders.iter().find(|o| !seen.contains(&o.id)) {
            return Err(BalancerError::invariant(format!(
                "order {} left unassigned",
                missing.id
            )));
        }

        let total: f64 = orders.iter().map(|o| o.packing_time).sum();
        let tolerance = LOAD_EPSILON * total.abs().max(1.0);

        for (idx, (&stored, &actual)) in self.station_loads.iter().zip(&recomputed).enumerate() {
            if stored < 0.0 {
                return Err(BalancerError::invariant(format!(
                    "station {} has negative load {stored}",
                    idx + 1
                )));
            }
            if (stored - actual).abs() > tolerance {
                return Err(BalancerError::invariant(format!(
                    "station {} load {stored} does not match assigned orders ({actual})",
                    idx + 1
                )));
            }
        }

        if (self.total_load() - total).abs() > tolerance {
            return Err(BalancerError::invariant(format!(
                "station loads sum to {} but orders total {total}",
                self.total_load()
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_orders() -> Vec<Order> {
        vec![
            Order::new(1, 10.0),
            Order::new(2, 7.0),
            Order::new(3, 6.0),
            Order::new(4, 5.0),
        ]
    }

    fn sample_allocation() -> Allocation {
        Allocation::from_slots(&sample_orders(), 2, &[1, 2, 2, 1])
    }

    #[test]
    fn test_from_slots_loads() {
        let a = sample_allocation();
        assert_eq!(a.station_loads, vec![15.0, 13.0]);
        assert_eq!(a.assignments.len(), 4);
        assert!((a.makespan() - 15.0).abs() < 1e-10);
        assert!((a.min_load() - 13.0).abs() < 1e-10);
        assert!((a.total_load() - 28.0).abs() < 1e-10);
    }

    #[test]
    fn test_queries() {
        let a = sample_allocation();
        assert_eq!(a.assignments[2], Assignment::new(3, 2));
        assert_eq!(a.order_counts(), vec![2, 2]);
    }

    #[test]
    fn test_verify_ok() {
        assert!(sample_allocation().verify(&sample_orders()).is_ok());
    }

    #[test]
    fn test_verify_station_out_of_range() {
        let a = Allocation::from_slots(&sample_orders(), 2, &[1, 2, 3, 1]);
        let err = a.verify(&sample_orders()).unwrap_err();
        assert!(err.to_string().contains("outside"));
    }

    #[test]
    fn test_verify_unassigned_order() {
        let orders = sample_orders();
        let a = Allocation::from_slots(&orders[..3], 2, &[1, 2, 2]);
        let err = a.verify(&orders).unwrap_err();
        assert!(err.to_string().contains("order 4 left unassigned"));
    }

    #[test]
    fn test_verify_duplicate_assignment() {
        let mut a = sample_allocation();
        a.assignments.push(Assignment::new(1, 2));
        let err = a.verify(&sample_orders()).unwrap_err();
        assert!(err.to_string().contains("more than once"));
    }

    #[test]
    fn test_verify_tampered_load() {
        let mut a = sample_allocation();
        a.station_loads[0] = 99.0;
        let err = a.verify(&sample_orders()).unwrap_err();
        assert!(matches!(err, BalancerError::Invariant(_)));
    }

    #[test]
    fn test_empty_allocation() {
        let a = Allocation::from_slots(&[], 3, &[]);
        assert_eq!(a.station_loads, vec![0.0, 0.0, 0.0]);
        assert_eq!(a.makespan(), 0.0);
        assert!(a.verify(&[]).is_ok());
    }
}
