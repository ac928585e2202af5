//! Workload metrics for an allocation.
//!
//! Computes per-station totals and balance indicators from a completed
//! allocation and its input orders.
//!
//! # Metrics
//!
//! | Metric | Definition |
//! |--------|-----------|
//! | Total time | Sum of packing time over all orders |
//! | Avg load | Total time / k |
//! | Peak load (C_max) | Largest station load |
//! | Imbalance % | (peak - avg) / avg * 100, 0 when avg = 0 |
//! | Spread | Peak load - smallest station load |
//! | Overloaded | Stations above `overload_ratio` * avg |
//! | Underutilized | Stations below `underload_ratio` * avg |
//!
//! # Reference
//! Pinedo (2016), "Scheduling", Ch. 1.2: Performance Measures

mod insight;

use serde::{Deserialize, Serialize};

use crate::error::{BalancerError, Result};
use crate::models::{max_packing_time, Allocation, Order, StationLoad};

/// Ratios that classify stations and the balanced/unbalanced insight.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InsightThresholds {
    /// A station above `avg * overload_ratio` is overloaded.
    pub overload_ratio: f64,
    /// A station below `avg * underload_ratio` is underutilized.
    pub underload_ratio: f64,
    /// Imbalance percentages at or below this read as balanced.
    pub balanced_percent: f64,
}

impl Default for InsightThresholds {
    fn default() -> Self {
        Self {
            overload_ratio: 1.2,
            underload_ratio: 0.8,
            balanced_percent: 5.0,
        }
    }
}

/// Balance indicators for one allocation.
#[derive(Debug, Clone, PartialEq)]
pub struct ImbalanceReport {
    /// Load per station, station 1 first. Empty stations included.
    pub station_loads: Vec<StationLoad>,
    /// Number of orders.
    pub total_orders: usize,
    /// Sum of packing time.
    pub total_time: f64,
    /// Average load per station.
    pub avg_load_per_station: f64,
    /// Longest single order.
    pub max_order_time: f64,
    /// Most loaded station (lowest number on ties).
    pub peak_station: u32,
    /// Load of the most loaded station.
    pub peak_load: f64,
    /// Load of the least loaded station.
    pub min_station_load: f64,
    /// `peak_load - min_station_load`.
    pub workload_spread: f64,
    /// Excess of the peak over the average, in percent.
    pub imbalance_percent: f64,
    /// Stations above the overload threshold.
    pub overloaded_stations: usize,
    /// Stations below the underload threshold.
    pub underutilized_stations: usize,
    /// One-sentence summary of the dominant issue.
    pub insight: String,
}

impl ImbalanceReport {
    /// Computes the report for an allocation.
    ///
    /// The allocation is verified against `orders` first; a broken
    /// allocation or a non-finite total load yields
    /// [`BalancerError::Invariant`] rather than metrics.
    pub fn calculate(
        allocation: &Allocation,
        orders: &[Order],
        thresholds: &InsightThresholds,
    ) -> Result<Self> {
        if allocation.stations == 0 {
            return Err(BalancerError::invariant("allocation has no stations"));
        }
        let total_time = allocation.total_load();
        if !total_time.is_finite() {
            return Err(BalancerError::invariant(format!(
                "total station load {total_time} is not finite"
            )));
        }
        allocation.verify(orders)?;

        let station_loads = StationLoad::from_allocation(allocation);
        let k = allocation.stations as f64;
        let avg = total_time / k;

        let (peak_station, peak_load) = station_loads
            .iter()
            .fold((1, f64::MIN), |(best_s, best_l), s| {
                if s.total_time > best_l {
                    (s.station, s.total_time)
                } else {
                    (best_s, best_l)
                }
            });
        let min_station_load = allocation.min_load();

        let imbalance_percent = if avg > 0.0 {
            ((peak_load - avg) / avg * 100.0).max(0.0)
        } else {
            0.0
        };

        let (overloaded_stations, underutilized_stations) = if avg > 0.0 {
            (
                station_loads
                    .iter()
                    .filter(|s| s.total_time > avg * thresholds.overload_ratio)
                    .count(),
                station_loads
                    .iter()
                    .filter(|s| s.total_time < avg * thresholds.underload_ratio)
                    .count(),
            )
        } else {
            (0, 0)
        };

        let mut report = Self {
            station_loads,
            total_orders: orders.len(),
            total_time,
            avg_load_per_station: avg,
            max_order_time: max_packing_time(orders),
            peak_station,
            peak_load,
            min_station_load,
            workload_spread: peak_load - min_station_load,
            imbalance_percent,
            overloaded_stations,
            underutilized_stations,
            insight: String::new(),
        };
        report.insight = insight::compose(&report, thresholds);
        Ok(report)
    }

    /// Number of stations covered by the report.
    pub fn station_count(&self) -> usize {
        self.station_loads.len()
    }

    /// Whether the imbalance is within the balanced threshold.
    pub fn is_balanced(&self, thresholds: &InsightThresholds) -> bool {
        self.imbalance_percent <= thresholds.balanced_percent
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assign::{AssignmentStrategy, Lpt};

    fn orders(times: &[f64]) -> Vec<Order> {
        times
            .iter()
            .enumerate()
            .map(|(i, &t)| Order::new(i as i64 + 1, t))
            .collect()
    }

    #[test]
    fn test_report_worked_example() {
        let orders = orders(&[10.0, 7.0, 6.0, 5.0]);
        let allocation = Lpt.assign(&orders, 2);
        let r = ImbalanceReport::calculate(&allocation, &orders, &InsightThresholds::default())
            .unwrap();

        assert_eq!(r.total_orders, 4);
        assert!((r.total_time - 28.0).abs() < 1e-10);
        assert!((r.avg_load_per_station - 14.0).abs() < 1e-10);
        assert!((r.max_order_time - 10.0).abs() < 1e-10);
        assert_eq!(r.peak_station, 1);
        assert!((r.peak_load - 15.0).abs() < 1e-10);
        assert!((r.workload_spread - 2.0).abs() < 1e-10);
        // (15 - 14) / 14 * 100
        assert!((r.imbalance_percent - 100.0 / 14.0).abs() < 1e-10);
        assert_eq!(r.overloaded_stations, 0);
        assert!(!r.is_balanced(&InsightThresholds::default()));
    }

    #[test]
    fn test_single_station_zero_imbalance() {
        let orders = orders(&[3.0, 4.0]);
        let allocation = Lpt.assign(&orders, 1);
        let r = ImbalanceReport::calculate(&allocation, &orders, &InsightThresholds::default())
            .unwrap();
        assert_eq!(r.imbalance_percent, 0.0);
        assert_eq!(r.station_count(), 1);
        assert!(r.insight.contains("single station"));
    }

    #[test]
    fn test_zero_total_time() {
        let orders = orders(&[0.0, 0.0]);
        let allocation = Lpt.assign(&orders, 3);
        let r = ImbalanceReport::calculate(&allocation, &orders, &InsightThresholds::default())
            .unwrap();
        assert_eq!(r.avg_load_per_station, 0.0);
        assert_eq!(r.imbalance_percent, 0.0);
        assert_eq!(r.underutilized_stations, 0);
    }

    #[test]
    fn test_overloaded_and_underutilized() {
        // avg = 10; S1 = 20 overloaded, S2 = 7 and S3 = 3 underutilized
        let orders = orders(&[20.0, 7.0, 3.0]);
        let allocation = Allocation::from_slots(&orders, 3, &[1, 2, 3]);
        let r = ImbalanceReport::calculate(&allocation, &orders, &InsightThresholds::default())
            .unwrap();
        assert_eq!(r.overloaded_stations, 1);
        assert_eq!(r.underutilized_stations, 2);
        assert!((r.imbalance_percent - 100.0).abs() < 1e-10);
        assert!((r.workload_spread - 17.0).abs() < 1e-10);
        assert!(r.insight.starts_with("Station 1 is the bottleneck"));
    }

    #[test]
    fn test_peak_tie_reports_lowest_station() {
        let orders = orders(&[5.0, 5.0]);
        let allocation = Allocation::from_slots(&orders, 2, &[2, 1]);
        let r = ImbalanceReport::calculate(&allocation, &orders, &InsightThresholds::default())
            .unwrap();
        assert_eq!(r.peak_station, 1);
    }

    #[test]
    fn test_broken_allocation_is_invariant_error() {
        let orders = orders(&[1.0, 2.0]);
        let allocation = Allocation::from_slots(&orders[..1], 2, &[1]);
        let err = ImbalanceReport::calculate(&allocation, &orders, &InsightThresholds::default())
            .unwrap_err();
        assert!(matches!(err, BalancerError::Invariant(_)));
    }

    #[test]
    fn test_non_finite_total_is_invariant_error() {
        let orders = orders(&[1e308, 1e308]);
        let allocation = Allocation::from_slots(&orders, 2, &[1, 2]);
        let err = ImbalanceReport::calculate(&allocation, &orders, &InsightThresholds::default())
            .unwrap_err();
        assert!(matches!(err, BalancerError::Invariant(ref m) if m.contains("not finite")));
    }
}
