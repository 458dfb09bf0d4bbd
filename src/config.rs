//! Store configuration

use std::str::FromStr;
use std::time::Duration;
use crate::StoreError;

/// Largest accepted latency multiplier; keeps the slowest simulated call under a day.
pub const MAX_LATENCY_SCALE: f64 = 86_400.0;

/// Runtime settings for the store and the simulated services.
#[derive(Debug, Clone, PartialEq)]
pub struct StoreConfig {
    /// Number of products requested from the supplier on startup
    pub catalog_size: usize,

    /// Upper bound on every external service call
    pub service_timeout: Duration,

    /// Probability that the simulated order service reports SERVER_UNAVAILABLE
    pub order_failure_rate: f64,

    /// Probability that the simulated analytics sink fails to deliver
    pub analytics_failure_rate: f64,

    /// Multiplier applied to simulated network latency (0 disables it)
    pub latency_scale: f64,

    /// HTTP listen port
    pub port: u16,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            catalog_size: 1000,
            service_timeout: Duration::from_secs(10),
            order_failure_rate: 0.1,
            analytics_failure_rate: 0.15,
            latency_scale: 1.0,
            port: 8083,
        }
    }
}

impl StoreConfig {
    /// Reads `CART_*` and `PORT` from the environment, falling back to defaults for unset keys.
    pub fn from_env() -> Result<Self, StoreError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, StoreError> {
        let defaults = Self::default();
        let timeout_ms = parse(&lookup, "CART_SERVICE_TIMEOUT_MS", defaults.service_timeout.as_millis() as u64)?;
        let config = Self {
            catalog_size: parse(&lookup, "CART_CATALOG_SIZE", defaults.catalog_size)?,
            service_timeout: Duration::from_millis(timeout_ms),
            order_failure_rate: parse(&lookup, "CART_ORDER_FAILURE_RATE", defaults.order_failure_rate)?,
            analytics_failure_rate: parse(&lookup, "CART_ANALYTICS_FAILURE_RATE", defaults.analytics_failure_rate)?,
            latency_scale: parse(&lookup, "CART_LATENCY_SCALE", defaults.latency_scale)?,
            port: parse(&lookup, "PORT", defaults.port)?,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), StoreError> {
        for (key, rate) in [("CART_ORDER_FAILURE_RATE", self.order_failure_rate), ("CART_ANALYTICS_FAILURE_RATE", self.analytics_failure_rate)] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(StoreError::Config(format!("{key} must be within 0..=1, got {rate}")));
            }
        }
        if !self.latency_scale.is_finite() || !(0.0..=MAX_LATENCY_SCALE).contains(&self.latency_scale) {
            return Err(StoreError::Config(format!("CART_LATENCY_SCALE must be within 0..={MAX_LATENCY_SCALE}, got {}", self.latency_scale)));
        }
        if self.service_timeout.is_zero() {
            return Err(StoreError::Config("CART_SERVICE_TIMEOUT_MS must be positive".into()));
        }
        Ok(())
    }

    pub fn with_catalog_size(mut self, size: usize) -> Self {
        self.catalog_size = size;
        self
    }

    pub fn with_service_timeout(mut self, timeout: Duration) -> Self {
        self.service_timeout = timeout;
        self
    }

    pub fn with_failure_rates(mut self, order: f64, analytics: f64) -> Self {
        self.order_failure_rate = order;
        self.analytics_failure_rate = analytics;
        self
    }

    pub fn with_latency_scale(mut self, scale: f64) -> Self {
        self.latency_scale = scale;
        self
    }

    /// Simulated latency scaled by `latency_scale`.
    /// Saturates at `Duration::MAX` and treats an invalid scale as zero, so unvalidated configs never panic.
    pub fn latency(&self, base: Duration) -> Duration {
        let scale = if self.latency_scale.is_finite() { self.latency_scale.max(0.0) } else { 0.0 };
        Duration::try_from_secs_f64(base.as_secs_f64() * scale).unwrap_or(Duration::MAX)
    }
}

fn parse<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T, StoreError>
where
    T::Err: std::fmt::Display,
{
    match lookup(key) {
        Some(raw) => raw.trim().parse().map_err(|e| StoreError::Config(format!("{key}={raw}: {e}"))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults_when_unset() {
        assert_eq!(StoreConfig::from_lookup(lookup(&[])).unwrap(), StoreConfig::default());
    }

    #[test]
    fn test_overrides() {
        let config = StoreConfig::from_lookup(lookup(&[("CART_CATALOG_SIZE", "50"), ("CART_SERVICE_TIMEOUT_MS", "250"), ("PORT", "9000")])).unwrap();
        assert_eq!(config.catalog_size, 50);
        assert_eq!(config.service_timeout, Duration::from_millis(250));
        assert_eq!(config.port, 9000);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(matches!(StoreConfig::from_lookup(lookup(&[("CART_CATALOG_SIZE", "lots")])), Err(StoreError::Config(_))));
        assert!(matches!(StoreConfig::from_lookup(lookup(&[("CART_ORDER_FAILURE_RATE", "1.5")])), Err(StoreError::Config(_))));
        assert!(StoreConfig::default().with_latency_scale(-1.0).validate().is_err());
        assert!(matches!(StoreConfig::from_lookup(lookup(&[("CART_LATENCY_SCALE", "1e20")])), Err(StoreError::Config(_))));
    }

    #[test]
    fn test_latency_saturates_on_unvalidated_scale() {
        let huge = StoreConfig::default().with_latency_scale(1e20);
        assert_eq!(huge.latency(Duration::from_millis(1000)), Duration::MAX);
        let nan = StoreConfig::default().with_latency_scale(f64::NAN);
        assert_eq!(nan.latency(Duration::from_millis(500)), Duration::ZERO);
        assert_eq!(StoreConfig::default().with_latency_scale(0.5).latency(Duration::from_millis(1000)), Duration::from_millis(500));
    }
}
