//! Seed files for the in-memory backends.
//!
//! A seed is one versioned JSON document holding the location catalog,
//! the recorded readings and the threshold bands. It is loaded at startup
//! and can be written back after threshold changes.

use crate::catalog::{InMemoryCatalog, LocationEntity, LocationLevel};
use crate::metrics::{DistrictReadings, InMemoryMetricStore};
use crate::thresholds::{InMemoryThresholdRegistry, ThresholdBand};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use thiserror::Error;
use tokio::fs;

/// Errors from seed persistence.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },

    #[error("Invalid seed: {0}")]
    InvalidSeed(String),
}

/// Current seed file version.
pub const SEED_VERSION: u32 = 1;

/// Everything needed to build the in-memory backends.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeedData {
    /// Format version for compatibility checking.
    pub version: u32,

    /// When the seed was written.
    pub saved_at: String,

    pub metadata: SeedMetadata,

    pub catalog: Vec<LocationEntity>,

    #[serde(default)]
    pub readings: Vec<DistrictReadings>,

    #[serde(default)]
    pub thresholds: Vec<ThresholdBand>,
}

/// Summary counts, readable without loading the whole seed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedMetadata {
    pub name: String,
    pub regions: usize,
    pub provinces: usize,
    pub districts: usize,
    /// Number of (province, district, date) entries.
    pub readings: usize,
    pub thresholds: usize,
    #[serde(default)]
    pub saved_at: String,
}

impl SeedData {
    /// Snapshot the given backends.
    pub fn new(
        name: impl Into<String>,
        catalog: &InMemoryCatalog,
        metrics: &InMemoryMetricStore,
        thresholds: &InMemoryThresholdRegistry,
    ) -> Self {
        let saved_at = Utc::now().to_rfc3339();
        let entries = catalog.entries().to_vec();
        let count = |level: LocationLevel| entries.iter().filter(|e| e.level == level).count();
        let readings = metrics.to_district_readings();
        let thresholds = thresholds.bands();

        let metadata = SeedMetadata {
            name: name.into(),
            regions: count(LocationLevel::Region),
            provinces: count(LocationLevel::Province),
            districts: count(LocationLevel::District),
            readings: readings.len(),
            thresholds: thresholds.len(),
            saved_at: saved_at.clone(),
        };

        Self {
            version: SEED_VERSION,
            saved_at,
            metadata,
            catalog: entries,
            readings,
            thresholds,
        }
    }

    /// Save to a JSON file.
    pub async fn save_json(&self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).await?;
        Ok(())
    }

    /// Load from a JSON file and check it.
    pub async fn load_json(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let content = fs::read_to_string(path).await?;
        Self::from_json(&content)
    }

    /// Parse a seed document and check it.
    pub fn from_json(content: &str) -> Result<Self, PersistError> {
        let seed: Self = serde_json::from_str(content)?;
        check_version(seed.version)?;
        seed.validate()?;
        Ok(seed)
    }

    /// Read only the metadata of a seed file.
    pub async fn peek_metadata(path: impl AsRef<Path>) -> Result<SeedMetadata, PersistError> {
        let content = fs::read_to_string(path).await?;

        #[derive(Deserialize)]
        struct Partial {
            version: u32,
            metadata: SeedMetadata,
        }

        let partial: Partial = serde_json::from_str(&content)?;
        check_version(partial.version)?;
        Ok(partial.metadata)
    }

    /// Every province and district must hang under a known parent, and
    /// readings may only name known districts.
    ///
    /// Districts refer to their province by name alone, so region and
    /// province names must be unique across the catalog. District names
    /// only need to be unique within their province.
    pub fn validate(&self) -> Result<(), PersistError> {
        let mut regions = HashSet::new();
        let mut provinces = HashSet::new();
        let mut districts = HashSet::new();

        for entity in &self.catalog {
            if entity.name.trim().is_empty() {
                return Err(PersistError::InvalidSeed(format!(
                    "{} with an empty name",
                    entity.level
                )));
            }
            let parent = entity.parent_name.as_deref();
            let fresh = match (entity.level, parent) {
                (LocationLevel::Region, None) => regions.insert(entity.name.as_str()),
                (LocationLevel::Province, Some(_)) => provinces.insert(entity.name.as_str()),
                (LocationLevel::District, Some(parent)) => {
                    districts.insert((parent, entity.name.as_str()))
                }
                _ => {
                    return Err(PersistError::InvalidSeed(format!(
                        "{} '{}' has no valid parent",
                        entity.level, entity.name
                    )))
                }
            };
            if !fresh {
                return Err(PersistError::InvalidSeed(format!(
                    "duplicate {} '{}'",
                    entity.level, entity.name
                )));
            }
        }

        for entity in &self.catalog {
            let known = match (entity.level, entity.parent_name.as_deref()) {
                (LocationLevel::Province, Some(parent)) => regions.contains(parent),
                (LocationLevel::District, Some(parent)) => provinces.contains(parent),
                _ => true,
            };
            if !known {
                return Err(PersistError::InvalidSeed(format!(
                    "{} '{}' has no valid parent",
                    entity.level, entity.name
                )));
            }
        }

        if let Some(entry) = self
            .readings
            .iter()
            .find(|r| !districts.contains(&(r.province.as_str(), r.district.as_str())))
        {
            return Err(PersistError::InvalidSeed(format!(
                "readings for unknown district '{}' in '{}'",
                entry.district, entry.province
            )));
        }

        Ok(())
    }

    /// Build the in-memory backends.
    pub fn into_backends(
        self,
    ) -> Result<(InMemoryCatalog, InMemoryMetricStore, InMemoryThresholdRegistry), PersistError>
    {
        self.validate()?;
        Ok((
            InMemoryCatalog::from_entries(self.catalog),
            InMemoryMetricStore::from(self.readings),
            InMemoryThresholdRegistry::from_bands(self.thresholds),
        ))
    }
}

fn check_version(found: u32) -> Result<(), PersistError> {
    if found != SEED_VERSION {
        return Err(PersistError::VersionMismatch {
            expected: SEED_VERSION,
            found,
        });
    }
    Ok(())
}
