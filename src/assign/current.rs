//! Identity assignment describing the current floor state.

use super::AssignmentStrategy;
use crate::models::{Allocation, Order};

/// Keeps every order on the station it is currently queued on.
///
/// Orders without a known station are dealt round-robin by their position
/// in the input (`position % k + 1`), which is how orders arrive at bays
/// when nothing balances them.
#[derive(Debug, Clone, Copy, Default)]
pub struct CurrentStations;

impl AssignmentStrategy for CurrentStations {
    fn name(&self) -> &'static str {
        "CURRENT"
    }

    fn assign(&self, orders: &[Order], stations: u32) -> Allocation {
        let slots: Vec<u32> = orders
            .iter()
            .enumerate()
            .map(|(position, order)| {
                order
                    .current_station
                    .filter(|s| (1..=stations).contains(s))
                    .unwrap_or_else(|| round_robin(position, stations))
            })
            .collect();

        Allocation::from_slots(orders, stations, &slots)
    }

    fn description(&self) -> &'static str {
        "Current station, round-robin when unknown"
    }
}

fn round_robin(position: usize, stations: u32) -> u32 {
    if stations == 0 {
        return 0;
    }
    (position % stations as usize) as u32 + 1
}
