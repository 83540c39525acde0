//! Location catalog: the region → province → district hierarchy.
//!
//! The catalog is reference data owned by an external store. This module
//! defines the lookup boundary ([`LocationCatalog`]) and an in-memory
//! implementation used for seeding, the console and tests.

use crate::error::StoreError;
use serde::{Deserialize, Serialize};

/// A level in the location hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LocationLevel {
    Region,
    Province,
    District,
}

impl LocationLevel {
    /// Get the display name.
    pub fn name(&self) -> &'static str {
        match self {
            LocationLevel::Region => "region",
            LocationLevel::Province => "province",
            LocationLevel::District => "district",
        }
    }

    /// The level one step above this one, if any.
    pub fn parent(&self) -> Option<LocationLevel> {
        match self {
            LocationLevel::Region => None,
            LocationLevel::Province => Some(LocationLevel::Region),
            LocationLevel::District => Some(LocationLevel::Province),
        }
    }
}

impl std::fmt::Display for LocationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One entry of the catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationEntity {
    pub level: LocationLevel,
    pub name: String,
    /// Name of the enclosing region (for provinces) or province (for districts).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_name: Option<String>,
}

impl LocationEntity {
    pub fn region(name: impl Into<String>) -> Self {
        Self {
            level: LocationLevel::Region,
            name: name.into(),
            parent_name: None,
        }
    }

    pub fn province(region: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            level: LocationLevel::Province,
            name: name.into(),
            parent_name: Some(region.into()),
        }
    }

    pub fn district(province: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            level: LocationLevel::District,
            name: name.into(),
            parent_name: Some(province.into()),
        }
    }

    /// Case-insensitive substring containment of `fragment` in the name.
    ///
    /// An empty or whitespace-only fragment matches nothing.
    pub fn matches_partial(&self, fragment: &str) -> bool {
        let fragment = fragment.trim();
        if fragment.is_empty() {
            return false;
        }
        self.name.to_lowercase().contains(&fragment.to_lowercase())
    }

    fn is_child_of(&self, parent: &str) -> bool {
        self.parent_name.as_deref() == Some(parent)
    }
}

/// Read-only access to the location hierarchy.
///
/// Every listing accepts an optional substring filter with the same
/// semantics as [`LocationEntity::matches_partial`].
///
/// Districts are listed by province name, so province names are unique
/// across regions. District names are unique only within a province.
pub trait LocationCatalog: Send + Sync {
    fn list_regions(&self, filter: Option<&str>) -> Result<Vec<LocationEntity>, StoreError>;

    fn list_provinces(
        &self,
        region: &str,
        filter: Option<&str>,
    ) -> Result<Vec<LocationEntity>, StoreError>;

    fn list_districts(
        &self,
        province: &str,
        filter: Option<&str>,
    ) -> Result<Vec<LocationEntity>, StoreError>;
}

/// A catalog held entirely in memory, in insertion order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InMemoryCatalog {
    entries: Vec<LocationEntity>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a catalog from existing entries.
    pub fn from_entries(entries: Vec<LocationEntity>) -> Self {
        Self { entries }
    }

    pub fn with_region(mut self, name: impl Into<String>) -> Self {
        self.entries.push(LocationEntity::region(name));
        self
    }

    pub fn with_province(mut self, region: impl Into<String>, name: impl Into<String>) -> Self {
        self.entries.push(LocationEntity::province(region, name));
        self
    }

    pub fn with_district(
        mut self,
        province: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        self.entries.push(LocationEntity::district(province, name));
        self
    }

    /// All entries, in insertion order.
    pub fn entries(&self) -> &[LocationEntity] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn select(
        &self,
        level: LocationLevel,
        parent: Option<&str>,
        filter: Option<&str>,
    ) -> Vec<LocationEntity> {
        self.entries
            .iter()
            .filter(|e| e.level == level)
            .filter(|e| parent.map_or(true, |p| e.is_child_of(p)))
            .filter(|e| filter.map_or(true, |f| e.matches_partial(f)))
            .cloned()
            .collect()
    }
}

impl LocationCatalog for InMemoryCatalog {
    fn list_regions(&self, filter: Option<&str>) -> Result<Vec<LocationEntity>, StoreError> {
        Ok(self.select(LocationLevel::Region, None, filter))
    }

    fn list_provinces(
        &self,
        region: &str,
        filter: Option<&str>,
    ) -> Result<Vec<LocationEntity>, StoreError> {
        Ok(self.select(LocationLevel::Province, Some(region), filter))
    }

    fn list_districts(
        &self,
        province: &str,
        filter: Option<&str>,
    ) -> Result<Vec<LocationEntity>, StoreError> {
        Ok(self.select(LocationLevel::District, Some(province), filter))
    }
}
