//! Metric readings per district and date.

use crate::error::StoreError;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// The four metrics every district reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StandardMetric {
    Quality,
    Volume,
    Pressure,
    Efficiency,
}

impl StandardMetric {
    /// Rendering order.
    pub const ALL: [StandardMetric; 4] = [
        StandardMetric::Quality,
        StandardMetric::Volume,
        StandardMetric::Pressure,
        StandardMetric::Efficiency,
    ];

    /// The metric name used by the store and the threshold registry.
    pub fn key(&self) -> &'static str {
        match self {
            StandardMetric::Quality => "quality",
            StandardMetric::Volume => "volume",
            StandardMetric::Pressure => "pressure",
            StandardMetric::Efficiency => "efficiency",
        }
    }

    /// Get the display name.
    pub fn label(&self) -> &'static str {
        match self {
            StandardMetric::Quality => "Water quality",
            StandardMetric::Volume => "Water volume",
            StandardMetric::Pressure => "Water pressure",
            StandardMetric::Efficiency => "System efficiency",
        }
    }

    /// Unit shown next to the raw value when the reading carries none.
    pub fn default_unit(&self) -> &'static str {
        match self {
            StandardMetric::Quality => "%",
            StandardMetric::Volume => "m³",
            StandardMetric::Pressure => "bar",
            StandardMetric::Efficiency => "%",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|m| m.key().eq_ignore_ascii_case(key))
    }
}

/// A single measured value for one metric on one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricReading {
    pub metric_name: String,
    pub value: f64,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
    /// Supplied trend figure, passed through as-is.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trend: Option<f64>,
}

impl MetricReading {
    pub fn new(metric_name: impl Into<String>, value: f64, date: NaiveDate) -> Self {
        Self {
            metric_name: metric_name.into(),
            value,
            date,
            unit: None,
            trend: None,
        }
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn with_trend(mut self, trend: f64) -> Self {
        self.trend = Some(trend);
        self
    }

    /// Display label: the standard label for known metrics, else the raw name.
    pub fn label(&self) -> &str {
        StandardMetric::from_key(&self.metric_name)
            .map(|m| m.label())
            .unwrap_or(&self.metric_name)
    }

    /// Unit carried by the reading, or the standard metric's default.
    pub fn display_unit(&self) -> Option<&str> {
        self.unit.as_deref().or_else(|| {
            StandardMetric::from_key(&self.metric_name).map(|m| m.default_unit())
        })
    }
}

/// Put readings in rendering order: the standard metrics first in their
/// fixed order, then everything else in the order given.
pub fn sort_for_display(readings: &mut [MetricReading]) {
    readings.sort_by_key(|r| {
        StandardMetric::from_key(&r.metric_name)
            .and_then(|m| StandardMetric::ALL.iter().position(|s| *s == m))
            .unwrap_or(StandardMetric::ALL.len())
    });
}

/// Read-only access to per-district, per-date readings.
///
/// A district is identified by its province and its own name: two provinces
/// may each have a district with the same name.
pub trait MetricStore: Send + Sync {
    /// All readings for `district` of `province` on `date`, or `None` when
    /// nothing was recorded.
    fn get_reading(
        &self,
        province: &str,
        district: &str,
        date: NaiveDate,
    ) -> Result<Option<Vec<MetricReading>>, StoreError>;
}

/// All readings recorded for one district on one date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistrictReadings {
    pub province: String,
    pub district: String,
    pub date: NaiveDate,
    pub readings: Vec<MetricReading>,
}

/// A metric store held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMetricStore {
    readings: HashMap<(String, String, NaiveDate), Vec<MetricReading>>,
}

impl InMemoryMetricStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a reading, replacing any earlier value for the same
    /// (province, district, metric, date).
    pub fn record(
        &mut self,
        province: impl Into<String>,
        district: impl Into<String>,
        reading: MetricReading,
    ) {
        let slot = self
            .readings
            .entry((province.into(), district.into(), reading.date))
            .or_default();
        match slot
            .iter_mut()
            .find(|r| r.metric_name == reading.metric_name)
        {
            Some(existing) => *existing = reading,
            None => slot.push(reading),
        }
    }

    pub fn with_reading(
        mut self,
        province: impl Into<String>,
        district: impl Into<String>,
        reading: MetricReading,
    ) -> Self {
        self.record(province, district, reading);
        self
    }

    /// Number of (province, district, date) entries.
    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    /// Export as a list sorted by province, district, then date.
    pub fn to_district_readings(&self) -> Vec<DistrictReadings> {
        let mut out: Vec<_> = self
            .readings
            .iter()
            .map(|((province, district, date), readings)| DistrictReadings {
                province: province.clone(),
                district: district.clone(),
                date: *date,
                readings: readings.clone(),
            })
            .collect();
        out.sort_by(|a, b| {
            a.province
                .cmp(&b.province)
                .then_with(|| a.district.cmp(&b.district))
                .then(a.date.cmp(&b.date))
        });
        out
    }
}

impl From<Vec<DistrictReadings>> for InMemoryMetricStore {
    fn from(entries: Vec<DistrictReadings>) -> Self {
        let mut store = Self::new();
        for entry in entries {
            for reading in entry.readings {
                // The entry date is authoritative.
                let reading = MetricReading {
                    date: entry.date,
                    ..reading
                };
                store.record(entry.province.clone(), entry.district.clone(), reading);
            }
        }
        store
    }
}

impl MetricStore for InMemoryMetricStore {
    fn get_reading(
        &self,
        province: &str,
        district: &str,
        date: NaiveDate,
    ) -> Result<Option<Vec<MetricReading>>, StoreError> {
        Ok(self
            .readings
            .get(&(province.to_string(), district.to_string(), date))
            .filter(|r| !r.is_empty())
            .cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn test_record_replaces_same_metric() {
        let d = date("2025-09-01");
        let store = InMemoryMetricStore::new()
            .with_reading("Chiang Mai", "Mae Rim", MetricReading::new("quality", 80.0, d))
            .with_reading("Chiang Mai", "Mae Rim", MetricReading::new("quality", 85.0, d))
            .with_reading("Chiang Mai", "Mae Rim", MetricReading::new("volume", 1200.0, d));

        let readings = store.get_reading("Chiang Mai", "Mae Rim", d).unwrap().unwrap();
        assert_eq!(readings.len(), 2);
        assert_eq!(readings[0].value, 85.0);
    }

    #[test]
    fn test_missing_reading_is_none() {
        let store = InMemoryMetricStore::new();
        assert!(store
            .get_reading("Chiang Mai", "Mae Rim", date("2025-09-01"))
            .unwrap()
            .is_none());
    }

    #[test]
    fn test_same_district_name_in_two_provinces_is_distinct() {
        let d = date("2025-09-01");
        let store = InMemoryMetricStore::new()
            .with_reading("Chiang Mai", "Mueang", MetricReading::new("pressure", 0.5, d));

        assert!(store.get_reading("Chiang Mai", "Mueang", d).unwrap().is_some());
        assert!(store.get_reading("Lampang", "Mueang", d).unwrap().is_none());
    }

    #[test]
    fn test_export_keeps_province() {
        let d = date("2025-09-01");
        let store = InMemoryMetricStore::new()
            .with_reading("Lampang", "Mueang", MetricReading::new("quality", 70.0, d))
            .with_reading("Chiang Mai", "Mueang", MetricReading::new("quality", 90.0, d));

        let exported = store.to_district_readings();
        let keys: Vec<_> = exported
            .iter()
            .map(|e| (e.province.as_str(), e.district.as_str()))
            .collect();
        assert_eq!(keys, [("Chiang Mai", "Mueang"), ("Lampang", "Mueang")]);

        let restored = InMemoryMetricStore::from(exported);
        let lampang = restored.get_reading("Lampang", "Mueang", d).unwrap().unwrap();
        assert_eq!(lampang[0].value, 70.0);
    }

    #[test]
    fn test_sort_for_display_puts_standard_metrics_first() {
        let d = date("2025-09-01");
        let mut readings = vec![
            MetricReading::new("turbidity", 1.0, d),
            MetricReading::new("efficiency", 90.0, d),
            MetricReading::new("quality", 80.0, d),
            MetricReading::new("pressure", 3.0, d),
        ];
        sort_for_display(&mut readings);
        let names: Vec<_> = readings.iter().map(|r| r.metric_name.as_str()).collect();
        assert_eq!(names, ["quality", "pressure", "efficiency", "turbidity"]);
    }

    #[test]
    fn test_display_unit_falls_back_to_standard() {
        let d = date("2025-09-01");
        assert_eq!(MetricReading::new("pressure", 3.0, d).display_unit(), Some("bar"));
        assert_eq!(
            MetricReading::new("pressure", 3.0, d).with_unit("psi").display_unit(),
            Some("psi")
        );
        assert_eq!(MetricReading::new("turbidity", 1.0, d).display_unit(), None);
    }
}
