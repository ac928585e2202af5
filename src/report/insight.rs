//! Insight sentence for a report.
//!
//! Fixed templates, chosen in this order:
//! 1. No packing time at all
//! 2. A single station
//! 3. Imbalance within the balanced threshold
//! 4. Otherwise, name the bottleneck station

use super::{ImbalanceReport, InsightThresholds};

pub(super) fn compose(report: &ImbalanceReport, thresholds: &InsightThresholds) -> String {
    let k = report.station_count();

    if report.total_time <= 0.0 {
        return format!(
            "All {} order(s) have zero packing time; there is no workload to balance.",
            report.total_orders
        );
    }

    if k == 1 {
        return format!(
            "All {} order(s) run on a single station ({:.2} total); add stations to spread the load.",
            report.total_orders, report.total_time
        );
    }

    if report.is_balanced(thresholds) {
        return format!(
            "Workload is balanced across {k} stations: Station {} peaks at {:.2}, {:.1}% above the {:.2} average.",
            report.peak_station, report.peak_load, report.imbalance_percent, report.avg_load_per_station
        );
    }

    format!(
        "Station {} is the bottleneck at {:.2}, {:.1}% above the {:.2} average; {} station(s) overloaded, {} underutilized.",
        report.peak_station,
        report.peak_load,
        report.imbalance_percent,
        report.avg_load_per_station,
        report.overloaded_stations,
        report.underutilized_stations
    )
}
