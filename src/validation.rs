//! Order ingestion and request validation.
//!
//! Turns loosely-typed request rows into validated [`Order`]s. Row-level
//! problems never fail a request: the offending row is dropped and reported.
//! Request-level problems (no usable orders, bad station count, size limits)
//! are collected and returned together.
//!
//! # Coercion
//! - `id`: JSON integer, integral float, or a string holding either.
//! - `packingTime`: JSON number or numeric string; must be finite and `>= 0`.
//! - `station` (optional): same rules as `id`; must lie in `1..=stations`.
//!
//! Duplicate IDs keep the first occurrence.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashSet;
use std::fmt;

use crate::error::{BalancerError, Result};
use crate::models::{total_packing_time, Order};

/// Largest integer a JSON float can carry exactly (2^53).
const MAX_SAFE_INTEGER: f64 = 9_007_199_254_740_992.0;

/// A request-level validation error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationError {
    /// Error category.
    pub kind: ValidationErrorKind,
    /// Human-readable description.
    pub message: String,
}

/// Categories of request-level validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationErrorKind {
    /// No station count was supplied.
    MissingStationCount,
    /// Station count is not an integer or is below 1.
    InvalidStationCount,
    /// Station count exceeds the configured maximum.
    TooManyStations,
    /// No order survived cleaning.
    EmptyOrderSet,
    /// More orders than the configured maximum.
    TooManyOrders,
    /// Packing times are individually finite but their sum is not.
    TotalTimeOverflow,
}

impl ValidationError {
    /// Creates a validation error.
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

/// Why a row was dropped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RejectReason {
    /// The row is not a JSON object.
    NotARecord,
    /// No `id` field.
    MissingId,
    /// `id` is not an integer.
    InvalidId,
    /// No `packingTime` field.
    MissingPackingTime,
    /// `packingTime` is not a finite number.
    InvalidPackingTime,
    /// `packingTime` is below zero.
    NegativePackingTime,
    /// `station` is not an integer in `1..=stations`.
    InvalidStation,
    /// `id` repeats an earlier accepted row.
    DuplicateId,
}

/// A row removed during ingestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DroppedRecord {
    /// Zero-based position of the row in the request.
    pub index: usize,
    /// Rejection category.
    pub reason: RejectReason,
    /// Human-readable description.
    pub message: String,
}

impl DroppedRecord {
    fn new(index: usize, reason: RejectReason, message: impl Into<String>) -> Self {
        Self {
            index,
            reason,
            message: message.into(),
        }
    }
}

/// Size limits applied during ingestion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IngestLimits {
    /// Maximum number of clean orders per request.
    pub max_orders: usize,
    /// Maximum station count.
    pub max_stations: u32,
}

impl Default for IngestLimits {
    fn default() -> Self {
        Self {
            max_orders: 100_000,
            max_stations: 10_000,
        }
    }
}

/// Clean input ready for assignment.
#[derive(Debug, Clone, PartialEq)]
pub struct IngestedOrders {
    /// Accepted orders, in request order.
    pub orders: Vec<Order>,
    /// Station count (`k >= 1`).
    pub stations: u32,
    /// Rows that were dropped.
    pub dropped: Vec<DroppedRecord>,
}

impl IngestedOrders {
    /// Number of dropped rows.
    pub fn dropped_count(&self) -> usize {
        self.dropped.len()
    }
}

/// Validates raw rows and a raw station count.
///
/// Checks:
/// 1. Station count present, integral, `>= 1`, and within `limits`
/// 2. Each row coerces to an order (otherwise it is dropped)
/// 3. No duplicate order IDs (later duplicates are dropped)
/// 4. At least one order survives, and no more than `limits.max_orders`
/// 5. The total packing time is finite
///
/// # Returns
/// `Ok(IngestedOrders)` when the request is usable, otherwise
/// `Err(BalancerError::Validation)` carrying every request-level error
/// together with the dropped rows.
pub fn ingest(
    records: &[Value],
    stations: Option<&Value>,
    limits: &IngestLimits,
) -> Result<IngestedOrders> {
    let mut errors = Vec::new();
    let station_count = match check_station_count(stations, limits) {
        Ok(k) => Some(k),
        Err(e) => {
            errors.push(e);
            None
        }
    };

    let mut orders = Vec::with_capacity(records.len());
    let mut dropped = Vec::new();
    let mut seen = HashSet::with_capacity(records.len());

    for (index, record) in records.iter().enumerate() {
        match coerce_record(index, record, station_count) {
            Ok(order) => {
                if seen.insert(order.id) {
                    orders.push(order);
                } else {
                    dropped.push(DroppedRecord::new(
                        index,
                        RejectReason::DuplicateId,
                        format!("Row {index}: duplicate order id {}", order.id),
                    ));
                }
            }
            Err(d) => dropped.push(d),
        }
    }

    if orders.is_empty() {
        errors.push(ValidationError::new(
            ValidationErrorKind::EmptyOrderSet,
            format!(
                "No valid orders: {} row(s) submitted, {} dropped",
                records.len(),
                dropped.len()
            ),
        ));
    } else if orders.len() > limits.max_orders {
        errors.push(ValidationError::new(
            ValidationErrorKind::TooManyOrders,
            format!(
                "{} orders exceed the limit of {}",
                orders.len(),
                limits.max_orders
            ),
        ));
    } else if !total_packing_time(&orders).is_finite() {
        errors.push(ValidationError::new(
            ValidationErrorKind::TotalTimeOverflow,
            format!(
                "Total packing time of {} orders exceeds the representable range",
                orders.len()
            ),
        ));
    }

    match station_count {
        Some(stations) if errors.is_empty() => Ok(IngestedOrders {
            orders,
            stations,
            dropped,
        }),
        _ => Err(BalancerError::Validation { errors, dropped }),
    }
}

fn check_station_count(
    raw: Option<&Value>,
    limits: &IngestLimits,
) -> std::result::Result<u32, ValidationError> {
    let raw = match raw {
        None | Some(Value::Null) => {
            return Err(ValidationError::new(
                ValidationErrorKind::MissingStationCount,
                "Station count is required",
            ))
        }
        Some(v) => v,
    };

    let k = coerce_integer(raw).ok_or_else(|| {
        ValidationError::new(
            ValidationErrorKind::InvalidStationCount,
            format!("Station count must be an integer, got {raw}"),
        )
    })?;

    if k < 1 {
        return Err(ValidationError::new(
            ValidationErrorKind::InvalidStationCount,
            format!("Station count must be at least 1, got {k}"),
        ));
    }
    if k > i64::from(limits.max_stations) {
        return Err(ValidationError::new(
            ValidationErrorKind::TooManyStations,
            format!(
                "Station count {k} exceeds the limit of {}",
                limits.max_stations
            ),
        ));
    }

    // k <= max_stations, so it fits in u32
    Ok(k as u32)
}

fn coerce_record(
    index: usize,
    record: &Value,
    stations: Option<u32>,
) -> std::result::Result<Order, DroppedRecord> {
    let fields = record.as_object().ok_or_else(|| {
        DroppedRecord::new(
            index,
            RejectReason::NotARecord,
            format!("Row {index}: expected an object"),
        )
    })?;

    let id = match present(fields.get("id")) {
        None => {
            return Err(DroppedRecord::new(
                index,
                RejectReason::MissingId,
                format!("Row {index}: missing id"),
            ))
        }
        Some(v) => coerce_integer(v).ok_or_else(|| {
            DroppedRecord::new(
                index,
                RejectReason::InvalidId,
                format!("Row {index}: id {v} is not an integer"),
            )
        })?,
    };

    let packing_time = match present(fields.get("packingTime")) {
        None => {
            return Err(DroppedRecord::new(
                index,
                RejectReason::MissingPackingTime,
                format!("Row {index}: missing packingTime"),
            ))
        }
        Some(v) => coerce_real(v).ok_or_else(|| {
            DroppedRecord::new(
                index,
                RejectReason::InvalidPackingTime,
                format!("Row {index}: packingTime {v} is not a number"),
            )
        })?,
    };

    if packing_time < 0.0 {
        return Err(DroppedRecord::new(
            index,
            RejectReason::NegativePackingTime,
            format!("Row {index}: packingTime {packing_time} is negative"),
        ));
    }

    let mut order = Order::new(id, packing_time);

    if let Some(v) = present(fields.get("station")) {
        let upper = stations.map_or(i64::from(u32::MAX), i64::from);
        match coerce_integer(v) {
            Some(s) if (1..=upper).contains(&s) => order.current_station = Some(s as u32),
            _ => {
                return Err(DroppedRecord::new(
                    index,
                    RejectReason::InvalidStation,
                    format!("Row {index}: station {v} is not a station number"),
                ))
            }
        }
    }

    Ok(order)
}

/// Treats explicit `null` like an absent field.
fn present(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

fn coerce_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| n.as_f64().and_then(integral)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>()
                .ok()
                .or_else(|| s.parse::<f64>().ok().and_then(integral))
        }
        _ => None,
    }
}

fn integral(f: f64) -> Option<i64> {
    (f.is_finite() && f.fract() == 0.0 && f.abs() <= MAX_SAFE_INTEGER).then_some(f as i64)
}

fn coerce_real(value: &Value) -> Option<f64> {
    let f = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }?;
    f.is_finite().then_some(f)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rows(value: Value) -> Vec<Value> {
        match value {
            Value::Array(items) => items,
            other => panic!("expected array, got {other}"),
        }
    }

    fn validation_errors(err: BalancerError) -> (Vec<ValidationError>, Vec<DroppedRecord>) {
        match err {
            BalancerError::Validation { errors, dropped } => (errors, dropped),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_valid_input() {
        let records = rows(json!([
            {"id": 1, "packingTime": 10},
            {"id": 2, "packingTime": 7.5},
        ]));
        let ingested = ingest(&records, Some(&json!(2)), &IngestLimits::default()).unwrap();

        assert_eq!(ingested.stations, 2);
        assert_eq!(ingested.orders, vec![Order::new(1, 10.0), Order::new(2, 7.5)]);
        assert_eq!(ingested.dropped_count(), 0);
    }

    #[test]
    fn test_string_fields_are_coerced() {
        let records = rows(json!([
            {"id": " 12 ", "packingTime": "3.25"},
            {"id": "4.0", "packingTime": "0"},
        ]));
        let ingested = ingest(&records, Some(&json!("3")), &IngestLimits::default()).unwrap();

        assert_eq!(ingested.stations, 3);
        assert_eq!(ingested.orders[0], Order::new(12, 3.25));
        assert_eq!(ingested.orders[1], Order::new(4, 0.0));
    }

    #[test]
    fn test_malformed_rows_are_dropped() {
        let records = rows(json!([
            {"id": 1, "packingTime": 10},
            {"id": 2, "packingTime": "abc"},
            {"id": "x", "packingTime": 3},
            {"id": 4, "packingTime": -1},
            {"packingTime": 5},
            {"id": 6},
            {"id": 7.5, "packingTime": 1},
            42,
        ]));
        let ingested = ingest(&records, Some(&json!(2)), &IngestLimits::default()).unwrap();

        assert_eq!(ingested.orders, vec![Order::new(1, 10.0)]);
        let reasons: Vec<_> = ingested.dropped.iter().map(|d| d.reason).collect();
        assert_eq!(
            reasons,
            vec![
                RejectReason::InvalidPackingTime,
                RejectReason::InvalidId,
                RejectReason::NegativePackingTime,
                RejectReason::MissingId,
                RejectReason::MissingPackingTime,
                RejectReason::InvalidId,
                RejectReason::NotARecord,
            ]
        );
        assert_eq!(ingested.dropped[0].index, 1);
    }

    #[test]
    fn test_duplicate_id_keeps_first() {
        let records = rows(json!([
            {"id": 1, "packingTime": 10},
            {"id": "1", "packingTime": 99},
        ]));
        let ingested = ingest(&records, Some(&json!(1)), &IngestLimits::default()).unwrap();

        assert_eq!(ingested.orders, vec![Order::new(1, 10.0)]);
        assert_eq!(ingested.dropped[0].reason, RejectReason::DuplicateId);
    }

    #[test]
    fn test_non_finite_packing_time() {
        let records = rows(json!([{"id": 1, "packingTime": "NaN"}, {"id": 2, "packingTime": "inf"}]));
        let (errors, dropped) = validation_errors(
            ingest(&records, Some(&json!(1)), &IngestLimits::default()).unwrap_err(),
        );
        assert_eq!(errors[0].kind, ValidationErrorKind::EmptyOrderSet);
        assert!(dropped
            .iter()
            .all(|d| d.reason == RejectReason::InvalidPackingTime));
    }

    #[test]
    fn test_out_of_range_numbers_are_dropped() {
        let records: Vec<Value> = serde_json::from_str(
            r#"[
                {"id": 1, "packingTime": 5},
                {"id": 2, "packingTime": 1e400},
                {"id": 3e400, "packingTime": 1}
            ]"#,
        )
        .unwrap();
        let ingested = ingest(&records, Some(&json!(2)), &IngestLimits::default()).unwrap();

        assert_eq!(ingested.orders, vec![Order::new(1, 5.0)]);
        assert_eq!(ingested.dropped.len(), 2);
        assert_eq!(ingested.dropped[0].index, 1);
        assert_eq!(ingested.dropped[0].reason, RejectReason::InvalidPackingTime);
        assert_eq!(ingested.dropped[1].reason, RejectReason::InvalidId);
    }

    #[test]
    fn test_total_time_overflow() {
        let records = rows(json!([
            {"id": 1, "packingTime": 1e308},
            {"id": 2, "packingTime": 1e308},
        ]));
        let (errors, dropped) = validation_errors(
            ingest(&records, Some(&json!(2)), &IngestLimits::default()).unwrap_err(),
        );

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::TotalTimeOverflow);
        assert!(dropped.is_empty());
    }

    #[test]
    fn test_current_station() {
        let records = rows(json!([
            {"id": 1, "packingTime": 1, "station": 2},
            {"id": 2, "packingTime": 1, "station": 5},
            {"id": 3, "packingTime": 1, "station": null},
        ]));
        let ingested = ingest(&records, Some(&json!(3)), &IngestLimits::default()).unwrap();

        assert_eq!(ingested.orders[0].current_station, Some(2));
        assert_eq!(ingested.orders[1].id, 3);
        assert_eq!(ingested.orders[1].current_station, None);
        assert_eq!(ingested.dropped[0].reason, RejectReason::InvalidStation);
    }

    #[test]
    fn test_empty_order_set() {
        let (errors, _) =
            validation_errors(ingest(&[], Some(&json!(2)), &IngestLimits::default()).unwrap_err());
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ValidationErrorKind::EmptyOrderSet);
    }

    #[test]
    fn test_invalid_station_count() {
        let records = rows(json!([{"id": 1, "packingTime": 1}]));
        for bad in [json!(0), json!(-3), json!(2.5), json!("many"), json!([2])] {
            let (errors, _) = validation_errors(
                ingest(&records, Some(&bad), &IngestLimits::default()).unwrap_err(),
            );
            assert_eq!(errors[0].kind, ValidationErrorKind::InvalidStationCount, "{bad}");
        }
    }

    #[test]
    fn test_missing_station_count() {
        let records = rows(json!([{"id": 1, "packingTime": 1}]));
        for missing in [None, Some(&Value::Null)] {
            let (errors, _) = validation_errors(
                ingest(&records, missing, &IngestLimits::default()).unwrap_err(),
            );
            assert_eq!(errors[0].kind, ValidationErrorKind::MissingStationCount);
        }
    }

    #[test]
    fn test_limits() {
        let limits = IngestLimits {
            max_orders: 1,
            max_stations: 4,
        };
        let records = rows(json!([{"id": 1, "packingTime": 1}, {"id": 2, "packingTime": 1}]));

        let (errors, _) = validation_errors(ingest(&records, Some(&json!(5)), &limits).unwrap_err());
        let kinds: Vec<_> = errors.iter().map(|e| e.kind).collect();
        assert_eq!(
            kinds,
            vec![
                ValidationErrorKind::TooManyStations,
                ValidationErrorKind::TooManyOrders
            ]
        );
    }

    #[test]
    fn test_multiple_errors() {
        // Bad station count + nothing usable
        let records = rows(json!([{"id": "?", "packingTime": 1}]));
        let (errors, dropped) = validation_errors(
            ingest(&records, Some(&json!(0)), &IngestLimits::default()).unwrap_err(),
        );
        assert_eq!(errors.len(), 2);
        assert_eq!(dropped.len(), 1);
    }
}
