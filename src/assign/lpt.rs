//! Longest Processing Time first.
//!
//! # Algorithm
//!
//! 1. Sort orders by packing time, descending (ties: ascending ID).
//! 2. Keep a min-heap of stations keyed by `(load, station number)`.
//! 3. Pop the least-loaded station, place the order there, push it back.
//!
//! When `k >= n` every order gets its own station in sorted order, so even
//! zero-time orders never share a station.
//!
//! # Complexity
//! O(n log n + n log k).
//!
//! # Reference
//! Graham (1969): makespan <= (4/3 - 1/(3k)) * optimal.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use super::{longest_first, AssignmentStrategy};
use crate::models::{Allocation, Order};

/// Longest Processing Time heuristic.
///
/// # Example
///
/// ```
/// use u_balance::assign::{AssignmentStrategy, Lpt};
/// use u_balance::models::Order;
///
/// let orders = vec![
///     Order::new(1, 10.0),
///     Order::new(2, 7.0),
///     Order::new(3, 6.0),
///     Order::new(4, 5.0),
/// ];
/// let allocation = Lpt.assign(&orders, 2);
/// assert_eq!(allocation.station_loads, vec![15.0, 13.0]);
/// assert_eq!(allocation.assignments[3].station, 1);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Lpt;

/// Heap entry: current load of a station.
#[derive(Debug, Clone, Copy, PartialEq)]
struct StationSlot {
    load: f64,
    station: u32,
}

impl Eq for StationSlot {}

impl Ord for StationSlot {
    fn cmp(&self, other: &Self) -> Ordering {
        self.load
            .total_cmp(&other.load)
            .then(self.station.cmp(&other.station))
    }
}

impl PartialOrd for StationSlot {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl AssignmentStrategy for Lpt {
    fn name(&self) -> &'static str {
        "LPT"
    }

    fn assign(&self, orders: &[Order], stations: u32) -> Allocation {
        let sequence = longest_first(orders);
        let mut slots = vec![0u32; orders.len()];

        if stations as usize >= orders.len() {
            for (rank, &idx) in sequence.iter().enumerate() {
                slots[idx] = rank as u32 + 1;
            }
            return Allocation::from_slots(orders, stations, &slots);
        }

        let mut heap: BinaryHeap<Reverse<StationSlot>> = (1..=stations)
            .map(|station| Reverse(StationSlot { load: 0.0, station }))
            .collect();

        for idx in sequence {
            let Some(Reverse(mut slot)) = heap.pop() else {
                break;
            };
            slots[idx] = slot.station;
            slot.load += orders[idx].packing_time;
            heap.push(Reverse(slot));
        }

        Allocation::from_slots(orders, stations, &slots)
    }

    fn description(&self) -> &'static str {
        "Longest Processing Time first onto the least-loaded station"
    }
}
