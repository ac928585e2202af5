//! Service configuration.
//!
//! Read from `BALANCER_*` environment variables; every setting has a
//! default, and malformed values are reported instead of ignored.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `BALANCER_BIND_ADDR` | `0.0.0.0:8080` |
//! | `BALANCER_STRATEGY` | `lpt` |
//! | `BALANCER_EXACT_ORDER_LIMIT` | `16` (at most 64) |
//! | `BALANCER_MAX_ORDERS` | `100000` |
//! | `BALANCER_MAX_STATIONS` | `10000` |
//! | `BALANCER_BODY_LIMIT_BYTES` | `8388608` |
//! | `BALANCER_OVERLOAD_RATIO` | `1.2` |
//! | `BALANCER_UNDERLOAD_RATIO` | `0.8` |
//! | `BALANCER_BALANCED_PERCENT` | `5.0` |

use std::env;
use std::net::SocketAddr;
use std::str::FromStr;

use thiserror::Error;

use crate::assign::{StrategyKind, MAX_EXACT_ORDER_LIMIT};
use crate::balancer::Balancer;
use crate::report::InsightThresholds;
use crate::validation::IngestLimits;

/// A configuration value that could not be used.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The value does not parse.
    #[error("invalid value for {key}: '{value}' ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Settings for the HTTP service and the balancer it drives.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    /// Socket address to listen on.
    pub bind_addr: SocketAddr,
    /// Optimizing strategy.
    pub strategy: StrategyKind,
    /// Largest instance the exact strategy searches.
    pub exact_order_limit: usize,
    /// Ingestion size limits.
    pub limits: IngestLimits,
    /// Maximum request body size.
    pub body_limit_bytes: usize,
    /// Insight classification thresholds.
    pub thresholds: InsightThresholds,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
            strategy: StrategyKind::Lpt,
            exact_order_limit: 16,
            limits: IngestLimits::default(),
            body_limit_bytes: 8 * 1024 * 1024,
            thresholds: InsightThresholds::default(),
        }
    }
}

impl ServiceConfig {
    /// Loads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let l = &lookup;

        let config = Self {
            bind_addr: parse_or(l, "BALANCER_BIND_ADDR", defaults.bind_addr)?,
            strategy: parse_or(l, "BALANCER_STRATEGY", defaults.strategy)?,
            exact_order_limit: parse_or(l, "BALANCER_EXACT_ORDER_LIMIT", defaults.exact_order_limit)?,
            limits: IngestLimits {
                max_orders: parse_or(l, "BALANCER_MAX_ORDERS", defaults.limits.max_orders)?,
                max_stations: parse_or(l, "BALANCER_MAX_STATIONS", defaults.limits.max_stations)?,
            },
            body_limit_bytes: parse_or(l, "BALANCER_BODY_LIMIT_BYTES", defaults.body_limit_bytes)?,
            thresholds: InsightThresholds {
                overload_ratio: parse_or(
                    l,
                    "BALANCER_OVERLOAD_RATIO",
                    defaults.thresholds.overload_ratio,
                )?,
                underload_ratio: parse_or(
                    l,
                    "BALANCER_UNDERLOAD_RATIO",
                    defaults.thresholds.underload_ratio,
                )?,
                balanced_percent: parse_or(
                    l,
                    "BALANCER_BALANCED_PERCENT",
                    defaults.thresholds.balanced_percent,
                )?,
            },
        };

        if config.exact_order_limit > MAX_EXACT_ORDER_LIMIT {
            return Err(ConfigError::Invalid {
                key: "BALANCER_EXACT_ORDER_LIMIT",
                value: config.exact_order_limit.to_string(),
                reason: format!("must be at most {MAX_EXACT_ORDER_LIMIT}"),
            });
        }
        if config.limits.max_stations == 0 {
            return Err(ConfigError::Invalid {
                key: "BALANCER_MAX_STATIONS",
                value: "0".into(),
                reason: "must be at least 1".into(),
            });
        }
        Ok(config)
    }

    /// Builds the balancer described by this configuration.
    pub fn balancer(&self) -> Balancer {
        Balancer::new()
            .with_strategy(self.strategy.build(self.exact_order_limit))
            .with_limits(self.limits)
            .with_thresholds(self.thresholds)
    }
}

fn parse_or<T, F>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) if raw.trim().is_empty() => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            value: raw.clone(),
            reason: e.to_string(),
        }),
    }
}
