//! Order-to-station workload balancing.
//!
//! Takes a batch of packing orders and a station count, reports how
//! unevenly the work is currently spread, and proposes an assignment that
//! minimizes the busiest station's load (makespan) using the Longest
//! Processing Time heuristic.
//!
//! # Modules
//!
//! - **`models`**: Domain types: `Order`, `Assignment`, `Allocation`, `StationLoad`
//! - **`validation`**: Ingestion of raw JSON rows (coercion, dropped rows, limits)
//! - **`assign`**: Assignment strategies: `Lpt`, `CurrentStations`, `Exhaustive`
//! - **`report`**: Workload metrics and the insight sentence
//! - **`balancer`**: Ingest → assign → report pipeline
//! - **`format`**: Dashboard response shapes and CSV export
//! - **`config`**: Environment configuration
//! - **`api`**: HTTP routes
//!
//! # Guarantees
//!
//! LPT on P||C_max is a 4/3 - 1/(3k) approximation of the optimal
//! makespan and runs in O(n log n + n log k).
//!
//! # References
//!
//! - Graham (1969), "Bounds on Multiprocessing Timing Anomalies"
//! - Pinedo (2016), "Scheduling: Theory, Algorithms, and Systems", Ch. 5

pub mod api;
pub mod assign;
pub mod balancer;
pub mod config;
pub mod error;
pub mod format;
pub mod models;
pub mod report;
pub mod validation;
