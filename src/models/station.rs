//! Station load model.
//!
//! Stations are anonymous packing bays numbered `1..=k`. They carry no
//! state of their own; a [`StationLoad`] is derived from an allocation.

use serde::{Deserialize, Serialize};

use super::Allocation;

/// Aggregated work placed on one station.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StationLoad {
    /// Station number (1-based).
    pub station: u32,
    /// Sum of packing time on this station.
    pub total_time: f64,
    /// Number of orders on this station.
    pub order_count: usize,
}

impl StationLoad {
    /// Creates a station load entry.
    pub fn new(station: u32, total_time: f64, order_count: usize) -> Self {
        Self {
            station,
            total_time,
            order_count,
        }
    }

    /// Per-station loads for every station of an allocation, station 1 first.
    ///
    /// Empty stations are included with zero load.
    pub fn from_allocation(allocation: &Allocation) -> Vec<Self> {
        let counts = allocation.order_counts();
        allocation
            .station_loads
            .iter()
            .zip(counts)
            .enumerate()
            .map(|(idx, (&total_time, count))| Self::new(idx as u32 + 1, total_time, count))
            .collect()
    }
}
