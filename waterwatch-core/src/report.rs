//! Classified readings for one district on one date.

use crate::classifier::ThresholdClassifier;
use crate::error::StoreError;
use crate::metrics::{sort_for_display, MetricReading, MetricStore};
use crate::severity::{aggregate, OverallSeverity, SeverityResult};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Raw readings, per-metric bands and the overall verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistrictReport {
    pub province: String,
    pub district: String,
    pub date: NaiveDate,
    /// In display order.
    pub readings: Vec<MetricReading>,
    /// Parallel to `readings`.
    pub results: Vec<SeverityResult>,
    pub overall: OverallSeverity,
}

impl DistrictReport {
    /// Look up and classify. `Ok(None)` when nothing was recorded.
    pub fn build(
        metrics: &dyn MetricStore,
        classifier: &ThresholdClassifier,
        province: &str,
        district: &str,
        date: NaiveDate,
    ) -> Result<Option<Self>, StoreError> {
        let Some(mut readings) = metrics.get_reading(province, district, date)? else {
            return Ok(None);
        };
        if readings.is_empty() {
            return Ok(None);
        }
        sort_for_display(&mut readings);

        let results = classifier.classify_readings(&readings)?;
        let overall = aggregate(&results);

        Ok(Some(Self {
            province: province.to_string(),
            district: district.to_string(),
            date,
            readings,
            results,
            overall,
        }))
    }

    /// Readings paired with their classification.
    pub fn rows(&self) -> impl Iterator<Item = (&MetricReading, &SeverityResult)> {
        self.readings.iter().zip(self.results.iter())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metrics::InMemoryMetricStore;
    use crate::severity::{Band, OverallBand};
    use crate::thresholds::{InMemoryThresholdRegistry, ThresholdBand};
    use std::sync::Arc;

    #[test]
    fn test_build_classifies_in_display_order() {
        let date = NaiveDate::from_ymd_opt(2025, 9, 1).unwrap();
        let store = InMemoryMetricStore::new()
            .with_reading("Chiang Mai", "Mae Rim", MetricReading::new("pressure", 0.5, date))
            .with_reading("Chiang Mai", "Mae Rim", MetricReading::new("quality", 90.0, date));
        let registry = InMemoryThresholdRegistry::from_bands([
            ThresholdBand::new("pressure").critical(None, Some(1.0)).good(Some(2.0), Some(6.0)),
            ThresholdBand::new("quality").good(Some(80.0), None),
        ]);
        let classifier = ThresholdClassifier::new(Arc::new(registry));

        let report = DistrictReport::build(&store, &classifier, "Chiang Mai", "Mae Rim", date)
            .unwrap()
            .unwrap();
        let bands: Vec<_> = report.rows().map(|(r, s)| (r.metric_name.as_str(), s.band)).collect();
        assert_eq!(bands, [("quality", Band::Good), ("pressure", Band::Critical)]);
        assert_eq!(report.overall.band, OverallBand::Critical);
    }

    #[test]
    fn test_build_without_data_is_none() {
        let date = NaiveDate::from_ymd_opt(2025, 9, 1).unwrap();
        let classifier = ThresholdClassifier::new(Arc::new(InMemoryThresholdRegistry::new()));
        let report = DistrictReport::build(
            &InMemoryMetricStore::new(),
            &classifier,
            "Chiang Mai",
            "Mae Rim",
            date,
        )
        .unwrap();
        assert!(report.is_none());
    }
}
