//! Load-balancing domain models.
//!
//! Provides the data types shared by ingestion, assignment and reporting.
//!
//! # Domain Mappings
//!
//! | u-balance | Packing floor | Scheduling theory |
//! |-----------|---------------|-------------------|
//! | Order | Customer order | Job |
//! | Station | Packing bay | Identical parallel machine |
//! | Allocation | Station plan | Schedule (P \|\| C_max) |

mod allocation;
mod order;
mod station;

pub use allocation::{Allocation, Assignment};
pub use order::{max_packing_time, total_packing_time, Order};
pub use station::StationLoad;
