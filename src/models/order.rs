//! Order model.
//!
//! An order is the unit of packing work to be balanced: an identifier and
//! the time it takes to pack. Orders may also carry the station they are
//! currently queued on, which is what the "analyze" path reports.

use serde::{Deserialize, Serialize};

/// A validated packing order.
///
/// Produced by the ingestor and immutable afterwards.
///
/// # Time Representation
/// Packing time is a non-negative real in the caller's unit (the dashboard
/// uses minutes). The balancer never converts it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Unique order identifier.
    pub id: i64,
    /// Time needed to pack this order.
    pub packing_time: f64,
    /// Station the order currently sits on (1-based). `None` = unknown.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_station: Option<u32>,
}

impl Order {
    /// Creates a new order.
    pub fn new(id: i64, packing_time: f64) -> Self {
        Self {
            id,
            packing_time,
            current_station: None,
        }
    }

    /// Sets the station the order is currently on.
    pub fn with_current_station(mut self, station: u32) -> Self {
        self.current_station = Some(station);
        self
    }
}

/// Sum of packing time across `orders`.
pub fn total_packing_time(orders: &[Order]) -> f64 {
    orders.iter().map(|o| o.packing_time).sum()
}

/// Longest single packing time, 0 for an empty slice.
pub fn max_packing_time(orders: &[Order]) -> f64 {
    orders.iter().map(|o| o.packing_time).fold(0.0, f64::max)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_order_builder() {
        let order = Order::new(7, 12.5).with_current_station(3);
        assert_eq!(order.id, 7);
        assert!((order.packing_time - 12.5).abs() < 1e-10);
        assert_eq!(order.current_station, Some(3));
    }

    #[test]
    fn test_totals() {
        let orders = vec![Order::new(1, 10.0), Order::new(2, 7.5), Order::new(3, 0.0)];
        assert!((total_packing_time(&orders) - 17.5).abs() < 1e-10);
        assert!((max_packing_time(&orders) - 10.0).abs() < 1e-10);
        assert_eq!(max_packing_time(&[]), 0.0);
    }

    #[test]
    fn test_serde_uses_camel_case() {
        let json = serde_json::to_value(Order::new(1, 2.0)).unwrap();
        assert_eq!(json["packingTime"], 2.0);
        assert!(json.get("currentStation").is_none());
    }
}
