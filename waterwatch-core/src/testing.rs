//! Testing utilities.
//!
//! This module provides:
//! - Fixture data: a small Thai catalog, readings and threshold bands
//! - `TestHarness` for building services and scripted conversations
//! - `UnavailableStore`, a collaborator double whose every call fails

use crate::catalog::{InMemoryCatalog, LocationCatalog, LocationEntity};
use crate::config::ServiceConfig;
use crate::error::StoreError;
use crate::headless::QueryConsole;
use crate::metrics::{InMemoryMetricStore, MetricReading, MetricStore};
use crate::persist::SeedData;
use crate::service::QueryService;
use crate::thresholds::{InMemoryThresholdRegistry, ThresholdBand, ThresholdRegistry};
use chrono::NaiveDate;
use std::sync::Arc;

/// Date every fixture district except San Sai has readings for.
pub fn fixture_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 9, 1).expect("fixture date")
}

/// The "today" used by harness conversations. Only Mae Rim has readings.
pub fn fixture_today() -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 9, 2).expect("fixture date")
}

/// Regions, provinces and districts used across tests.
pub fn fixture_catalog() -> InMemoryCatalog {
    InMemoryCatalog::new()
        .with_region("Northern")
        .with_region("Northeastern")
        .with_region("Southern")
        .with_region("ภาคกลาง")
        .with_province("Northern", "Chiang Mai")
        .with_province("Northern", "Lampang")
        .with_province("Northeastern", "Khon Kaen")
        .with_province("Southern", "Songkhla")
        .with_province("ภาคกลาง", "นนทบุรี")
        .with_district("Chiang Mai", "Mae Rim")
        .with_district("Chiang Mai", "Hang Dong")
        .with_district("Chiang Mai", "San Sai")
        .with_district("Lampang", "Ko Kha")
        .with_district("Khon Kaen", "Ban Phai")
        .with_district("Songkhla", "Hat Yai")
        .with_district("นนทบุรี", "ปากเกร็ด")
}

/// Bands for the four standard metrics.
pub fn fixture_thresholds() -> InMemoryThresholdRegistry {
    InMemoryThresholdRegistry::from_bands([
        ThresholdBand::new("quality")
            .critical(None, Some(60.0))
            .warning(Some(60.0), Some(80.0))
            .good(Some(80.0), None),
        ThresholdBand::new("volume")
            .critical(None, Some(500.0))
            .warning(Some(500.0), Some(1000.0))
            .good(Some(1000.0), None),
        ThresholdBand::new("pressure")
            .critical(None, Some(1.0))
            .warning(Some(1.0), Some(2.0))
            .good(Some(2.0), Some(6.0)),
        ThresholdBand::new("efficiency")
            .critical(None, Some(50.0))
            .warning(Some(50.0), Some(70.0))
            .good(Some(70.0), Some(100.0)),
    ])
}

/// Readings on [`fixture_date`]:
/// Mae Rim all good, Hang Dong critical, Hat Yai warning, San Sai only an
/// unconfigured metric. Mae Rim also has readings on [`fixture_today`].
pub fn fixture_metrics() -> InMemoryMetricStore {
    let day = fixture_date();
    let today = fixture_today();
    let mut store = InMemoryMetricStore::new();

    let rows: [(&str, &str, NaiveDate, [(&str, f64); 4]); 4] = [
        ("Chiang Mai", "Mae Rim", day, [("quality", 92.0), ("volume", 1500.0), ("pressure", 3.2), ("efficiency", 85.0)]),
        ("Chiang Mai", "Hang Dong", day, [("quality", 75.0), ("volume", 1200.0), ("pressure", 0.8), ("efficiency", 72.0)]),
        ("Songkhla", "Hat Yai", day, [("quality", 85.0), ("volume", 800.0), ("pressure", 2.5), ("efficiency", 65.0)]),
        ("Chiang Mai", "Mae Rim", today, [("quality", 88.0), ("volume", 1400.0), ("pressure", 3.0), ("efficiency", 80.0)]),
    ];
    for (province, district, date, values) in rows {
        for (metric, value) in values {
            store.record(province, district, MetricReading::new(metric, value, date));
        }
    }

    store.record(
        "Chiang Mai",
        "Mae Rim",
        MetricReading::new("quality", 92.0, day).with_trend(1.5),
    );
    store.record(
        "Chiang Mai",
        "San Sai",
        MetricReading::new("turbidity", 3.0, day).with_unit("NTU"),
    );
    store
}

/// Builds services over the fixtures.
pub struct TestHarness {
    pub catalog: Arc<InMemoryCatalog>,
    pub metrics: Arc<InMemoryMetricStore>,
    pub thresholds: Arc<InMemoryThresholdRegistry>,
    pub config: ServiceConfig,
}

impl Default for TestHarness {
    fn default() -> Self {
        Self::new()
    }
}

impl TestHarness {
    /// Create a harness over the fixture data with default config.
    pub fn new() -> Self {
        Self {
            catalog: Arc::new(fixture_catalog()),
            metrics: Arc::new(fixture_metrics()),
            thresholds: Arc::new(fixture_thresholds()),
            config: ServiceConfig::new(),
        }
    }

    pub fn with_config(mut self, config: ServiceConfig) -> Self {
        self.config = config;
        self
    }

    /// A service over the fixture backends.
    pub fn service(&self) -> Arc<QueryService> {
        self.service_with(
            self.catalog.clone(),
            self.metrics.clone(),
            self.thresholds.clone(),
        )
    }

    /// A service over arbitrary collaborators.
    pub fn service_with(
        &self,
        catalog: Arc<dyn LocationCatalog>,
        metrics: Arc<dyn MetricStore>,
        thresholds: Arc<dyn ThresholdRegistry>,
    ) -> Arc<QueryService> {
        Arc::new(QueryService::new(
            catalog,
            metrics,
            thresholds,
            self.config.clone(),
        ))
    }

    /// A service whose metric store always fails.
    pub fn service_with_failing_metrics(&self) -> Arc<QueryService> {
        self.service_with(
            self.catalog.clone(),
            Arc::new(UnavailableStore),
            self.thresholds.clone(),
        )
    }

    /// A service whose catalog always fails.
    pub fn service_with_failing_catalog(&self) -> Arc<QueryService> {
        self.service_with(
            Arc::new(UnavailableStore),
            self.metrics.clone(),
            self.thresholds.clone(),
        )
    }

    /// A scripted conversation pinned to [`fixture_today`].
    pub fn console(&self) -> QueryConsole {
        QueryConsole::new(self.service()).with_today(fixture_today())
    }

    /// The fixtures as a seed document.
    pub fn seed(&self) -> SeedData {
        SeedData::new("fixture", &self.catalog, &self.metrics, &self.thresholds)
    }
}

/// A collaborator whose every call reports the backend as unavailable.
#[derive(Debug, Clone, Copy, Default)]
pub struct UnavailableStore;

impl UnavailableStore {
    fn fail<T>(store: &'static str) -> Result<T, StoreError> {
        Err(StoreError::unavailable(store, "connection refused"))
    }
}

impl LocationCatalog for UnavailableStore {
    fn list_regions(&self, _filter: Option<&str>) -> Result<Vec<LocationEntity>, StoreError> {
        Self::fail("catalog")
    }

    fn list_provinces(
        &self,
        _region: &str,
        _filter: Option<&str>,
    ) -> Result<Vec<LocationEntity>, StoreError> {
        Self::fail("catalog")
    }

    fn list_districts(
        &self,
        _province: &str,
        _filter: Option<&str>,
    ) -> Result<Vec<LocationEntity>, StoreError> {
        Self::fail("catalog")
    }
}

impl MetricStore for UnavailableStore {
    fn get_reading(
        &self,
        _province: &str,
        _district: &str,
        _date: NaiveDate,
    ) -> Result<Option<Vec<MetricReading>>, StoreError> {
        Self::fail("metric store")
    }
}

impl ThresholdRegistry for UnavailableStore {
    fn get_band(&self, _metric_name: &str) -> Result<Option<ThresholdBand>, StoreError> {
        Self::fail("threshold registry")
    }

    fn upsert_band(&self, _band: ThresholdBand) -> Result<(), StoreError> {
        Self::fail("threshold registry")
    }

    fn delete_band(&self, _metric_name: &str) -> Result<bool, StoreError> {
        Self::fail("threshold registry")
    }
}
