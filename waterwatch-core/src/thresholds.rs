//! Threshold registry: per-metric band configuration.
//!
//! Bands are written by the administrative surface and read by the
//! classifier. Readers always see the latest committed write.

use crate::error::StoreError;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Inclusive lower/upper bounds of one band. `None` is an open end.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<f64>,
}

impl Bounds {
    pub fn new(min: Option<f64>, max: Option<f64>) -> Self {
        Self { min, max }
    }

    /// True when at least one bound is set.
    pub fn is_configured(&self) -> bool {
        self.min.is_some() || self.max.is_some()
    }

    /// Inclusive containment, honouring open ends.
    pub fn contains(&self, value: f64) -> bool {
        self.min.map_or(true, |min| value >= min) && self.max.map_or(true, |max| value <= max)
    }

    /// Distance from `value` to the closed interval (0 when contained).
    pub fn distance(&self, value: f64) -> f64 {
        if let Some(min) = self.min {
            if value < min {
                return min - value;
            }
        }
        if let Some(max) = self.max {
            if value > max {
                return value - max;
            }
        }
        0.0
    }
}

/// Band configuration for one metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdBand {
    pub metric_name: String,
    #[serde(default)]
    pub good: Bounds,
    #[serde(default)]
    pub warning: Bounds,
    #[serde(default)]
    pub critical: Bounds,
    /// Disabled metrics are excluded from classification and aggregation.
    #[serde(default = "default_enabled")]
    pub enabled: bool,
}

fn default_enabled() -> bool {
    true
}

impl ThresholdBand {
    /// An enabled band with no bounds configured.
    pub fn new(metric_name: impl Into<String>) -> Self {
        Self {
            metric_name: metric_name.into(),
            good: Bounds::default(),
            warning: Bounds::default(),
            critical: Bounds::default(),
            enabled: true,
        }
    }

    pub fn good(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.good = Bounds::new(min, max);
        self
    }

    pub fn warning(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.warning = Bounds::new(min, max);
        self
    }

    pub fn critical(mut self, min: Option<f64>, max: Option<f64>) -> Self {
        self.critical = Bounds::new(min, max);
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// Read/write access to threshold bands, keyed by metric name.
pub trait ThresholdRegistry: Send + Sync {
    fn get_band(&self, metric_name: &str) -> Result<Option<ThresholdBand>, StoreError>;

    /// Insert or replace the band for `band.metric_name`.
    fn upsert_band(&self, band: ThresholdBand) -> Result<(), StoreError>;

    /// Remove a band. Returns whether one existed.
    fn delete_band(&self, metric_name: &str) -> Result<bool, StoreError>;
}

fn registry_key(metric_name: &str) -> String {
    metric_name.trim().to_lowercase()
}

/// A registry held in memory behind a read/write lock.
#[derive(Debug, Default)]
pub struct InMemoryThresholdRegistry {
    bands: RwLock<HashMap<String, ThresholdBand>>,
}

impl InMemoryThresholdRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_bands(bands: impl IntoIterator<Item = ThresholdBand>) -> Self {
        let map = bands
            .into_iter()
            .map(|b| (registry_key(&b.metric_name), b))
            .collect();
        Self {
            bands: RwLock::new(map),
        }
    }

    /// Snapshot of every band, sorted by metric name.
    pub fn bands(&self) -> Vec<ThresholdBand> {
        let mut bands: Vec<_> = self.bands.read().values().cloned().collect();
        bands.sort_by(|a, b| a.metric_name.cmp(&b.metric_name));
        bands
    }
}

impl ThresholdRegistry for InMemoryThresholdRegistry {
    fn get_band(&self, metric_name: &str) -> Result<Option<ThresholdBand>, StoreError> {
        Ok(self.bands.read().get(&registry_key(metric_name)).cloned())
    }

    fn upsert_band(&self, band: ThresholdBand) -> Result<(), StoreError> {
        self.bands.write().insert(registry_key(&band.metric_name), band);
        Ok(())
    }

    fn delete_band(&self, metric_name: &str) -> Result<bool, StoreError> {
        Ok(self.bands.write().remove(&registry_key(metric_name)).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bounds_open_ends() {
        let upper_only = Bounds::new(None, Some(10.0));
        assert!(upper_only.contains(-1_000.0));
        assert!(upper_only.contains(10.0));
        assert!(!upper_only.contains(10.01));

        let lower_only = Bounds::new(Some(0.0), None);
        assert!(lower_only.contains(1e9));
        assert!(!lower_only.contains(-0.5));
    }

    #[test]
    fn test_missing_bound_is_not_zero() {
        let bounds = Bounds::new(Some(5.0), None);
        assert!(bounds.contains(500.0));
        assert_eq!(bounds.distance(3.0), 2.0);
        assert_eq!(bounds.distance(500.0), 0.0);
    }

    #[test]
    fn test_upsert_then_read_reflects_latest() {
        let registry = InMemoryThresholdRegistry::new();
        registry
            .upsert_band(ThresholdBand::new("quality").good(Some(80.0), None))
            .unwrap();
        registry
            .upsert_band(ThresholdBand::new("quality").good(Some(90.0), None))
            .unwrap();

        let band = registry.get_band("quality").unwrap().unwrap();
        assert_eq!(band.good.min, Some(90.0));
    }

    #[test]
    fn test_lookup_ignores_case() {
        let registry =
            InMemoryThresholdRegistry::from_bands([ThresholdBand::new("Pressure")]);
        assert!(registry.get_band("pressure").unwrap().is_some());
    }

    #[test]
    fn test_delete_band() {
        let registry = InMemoryThresholdRegistry::from_bands([ThresholdBand::new("volume")]);
        assert!(registry.delete_band("volume").unwrap());
        assert!(!registry.delete_band("volume").unwrap());
        assert!(registry.get_band("volume").unwrap().is_none());
    }

    #[test]
    fn test_band_deserializes_with_defaults() {
        let band: ThresholdBand = serde_json::from_str(
            r#"{"metric_name": "quality", "good": {"min": 80.0}}"#,
        )
        .unwrap();
        assert!(band.enabled);
        assert_eq!(band.good.min, Some(80.0));
        assert_eq!(band.good.max, None);
        assert!(!band.warning.is_configured());
    }
}
