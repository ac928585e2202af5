//! Exact makespan minimization by branch and bound.
//!
//! # Algorithm
//!
//! 1. Seed the incumbent with the LPT allocation.
//! 2. Stop at once if LPT already meets the lower bound
//!    `max(total / k, longest order)`.
//! 3. Depth-first over orders in LPT sequence; each order tries every
//!    station, skipping stations whose load equals an earlier station
//!    (symmetric branches) and stations where it would reach the incumbent.
//!
//! The search is capped by a node budget; when exhausted the best allocation
//! found so far (never worse than LPT) is returned.
//!
//! # Reference
//! Dell'Amico & Martello (1995), "Optimal Scheduling of Tasks on Identical
//! Parallel Processors"

use super::{longest_first, AssignmentStrategy, Lpt};
use crate::models::{Allocation, Order};

/// Search nodes explored before giving up on proving optimality.
const NODE_BUDGET: u64 = 2_000_000;

const EPSILON: f64 = 1e-9;

/// Largest `order_limit` accepted; the search recurses once per order.
pub const MAX_EXACT_ORDER_LIMIT: usize = 64;

/// Exact solver for small instances, LPT beyond `order_limit`.
#[derive(Debug, Clone, Copy)]
pub struct Exhaustive {
    order_limit: usize,
}

impl Exhaustive {
    /// Creates a solver that searches instances of at most `order_limit` orders.
    ///
    /// Limits above [`MAX_EXACT_ORDER_LIMIT`] are clamped to it.
    pub fn new(order_limit: usize) -> Self {
        Self {
            order_limit: order_limit.min(MAX_EXACT_ORDER_LIMIT),
        }
    }

    /// Largest instance searched exactly.
    pub fn order_limit(&self) -> usize {
        self.order_limit
    }
}

impl Default for Exhaustive {
    fn default() -> Self {
        Self::new(16)
    }
}

impl AssignmentStrategy for Exhaustive {
    fn name(&self) -> &'static str {
        "EXACT"
    }

    fn assign(&self, orders: &[Order], stations: u32) -> Allocation {
        let seed = Lpt.assign(orders, stations);
        if orders.len() > self.order_limit || stations as usize >= orders.len() || stations < 2 {
            return seed;
        }

        let sequence = longest_first(orders);
        let times: Vec<f64> = sequence.iter().map(|&i| orders[i].packing_time).collect();
        let total: f64 = times.iter().sum();
        let lower_bound = (total / stations as f64).max(times.first().copied().unwrap_or(0.0));

        if seed.makespan() <= lower_bound + EPSILON {
            return seed;
        }

        let mut incumbent = vec![0u32; orders.len()];
        for (rank, &idx) in sequence.iter().enumerate() {
            incumbent[rank] = seed.assignments[idx].station - 1;
        }

        let mut search = Search {
            times: &times,
            lower_bound,
            best: seed.makespan(),
            incumbent,
            current: vec![0; orders.len()],
            loads: vec![0.0; stations as usize],
            nodes: 0,
            improved: false,
        };
        search.descend(0);

        if !search.improved {
            return seed;
        }

        let mut slots = vec![0u32; orders.len()];
        for (rank, &idx) in sequence.iter().enumerate() {
            slots[idx] = search.incumbent[rank] + 1;
        }
        Allocation::from_slots(orders, stations, &slots)
    }

    fn description(&self) -> &'static str {
        "Branch and bound on makespan, seeded with LPT"
    }
}

struct Search<'a> {
    times: &'a [f64],
    lower_bound: f64,
    best: f64,
    /// Station (0-based) per sorted position of the best allocation.
    incumbent: Vec<u32>,
    current: Vec<u32>,
    loads: Vec<f64>,
    nodes: u64,
    improved: bool,
}

impl Search<'_> {
    fn finished(&self) -> bool {
        self.nodes >= NODE_BUDGET || self.best <= self.lower_bound + EPSILON
    }

    fn descend(&mut self, pos: usize) {
        self.nodes += 1;

        if pos == self.times.len() {
            let makespan = self.loads.iter().copied().fold(0.0, f64::max);
            if makespan < self.best - EPSILON {
                self.best = makespan;
                self.incumbent.copy_from_slice(&self.current);
                self.improved = true;
            }
            return;
        }

        let time = self.times[pos];
        for s in 0..self.loads.len() {
            if self.finished() {
                return;
            }
            let prev = self.loads[s];
            if prev + time >= self.best - EPSILON {
                continue;
            }
            // Stations with equal load are interchangeable
            if self.loads[..s].iter().any(|&l| l == prev) {
                continue;
            }

            self.loads[s] = prev + time;
            self.current[pos] = s as u32;
            self.descend(pos + 1);
            self.loads[s] = prev;
        }
    }
}
