//! Threshold classifier: maps a (metric, value) pair to a severity band.
//!
//! Each configured band of a [`ThresholdBand`] is an inclusive interval;
//! a missing bound is an open end. Bands are checked from most to least
//! severe. A value sitting exactly on a bound shared by two bands belongs
//! to the band whose lower bound it is, so with warning `[5, 10]` and good
//! `[10, 20]` the reading `10.0` is good and `9.999` is warning.
//!
//! A value that no band contains falls into the nearest band, ties going
//! to the more severe one.

use crate::error::StoreError;
use crate::metrics::MetricReading;
use crate::severity::{Band, SeverityResult};
use crate::thresholds::{Bounds, ThresholdBand, ThresholdRegistry};
use std::sync::Arc;
use tracing::debug;

/// Classify `value` against one band configuration.
pub fn classify_value(band: &ThresholdBand, value: f64) -> Band {
    if !band.enabled || !value.is_finite() {
        return Band::Unknown;
    }

    // Most severe first.
    let zones: Vec<(Band, Bounds)> = [
        (Band::Critical, band.critical),
        (Band::Warning, band.warning),
        (Band::Good, band.good),
    ]
    .into_iter()
    .filter(|(_, bounds)| bounds.is_configured())
    .collect();

    if zones.is_empty() {
        return Band::Good;
    }

    let containing: Vec<&(Band, Bounds)> =
        zones.iter().filter(|(_, b)| b.contains(value)).collect();

    if let Some((owner, _)) = containing.iter().find(|(_, b)| b.min == Some(value)) {
        return *owner;
    }
    if let Some((band, _)) = containing.first() {
        return *band;
    }

    zones
        .iter()
        .min_by(|(_, a), (_, b)| a.distance(value).total_cmp(&b.distance(value)))
        .map(|(band, _)| *band)
        .unwrap_or(Band::Unknown)
}

/// Classifier backed by a threshold registry.
///
/// Every consumer that needs a band for a reading goes through this type
/// so the comparison rules live in one place.
#[derive(Clone)]
pub struct ThresholdClassifier {
    registry: Arc<dyn ThresholdRegistry>,
}

impl ThresholdClassifier {
    pub fn new(registry: Arc<dyn ThresholdRegistry>) -> Self {
        Self { registry }
    }

    /// Band for one metric value. Missing or disabled bands yield `Unknown`.
    pub fn classify(&self, metric_name: &str, value: f64) -> Result<Band, StoreError> {
        let band = match self.registry.get_band(metric_name)? {
            Some(band) => classify_value(&band, value),
            None => Band::Unknown,
        };
        if band == Band::Unknown {
            debug!(metric = metric_name, value, "metric has no applicable threshold");
        }
        Ok(band)
    }

    /// Classify every reading, preserving order.
    pub fn classify_readings(
        &self,
        readings: &[MetricReading],
    ) -> Result<Vec<SeverityResult>, StoreError> {
        readings
            .iter()
            .map(|r| {
                self.classify(&r.metric_name, r.value)
                    .map(|band| SeverityResult::new(r.metric_name.clone(), r.value, band))
            })
            .collect()
    }

    pub fn registry(&self) -> &Arc<dyn ThresholdRegistry> {
        &self.registry
    }
}
