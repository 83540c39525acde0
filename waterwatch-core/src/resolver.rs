//! Entity resolver: free-text fragment → one catalog entity.
//!
//! Matching is case-insensitive substring containment of the fragment in
//! the entity name. When several entities match, the first one in
//! lexicographic name order wins; there is no ranking and no fuzzy
//! matching.

use crate::catalog::{LocationCatalog, LocationEntity, LocationLevel};
use crate::error::StoreError;
use std::sync::Arc;

/// Stable catalog ordering: by name, then by parent name.
pub fn sort_entities(entities: &mut [LocationEntity]) {
    entities.sort_by(|a, b| {
        a.name
            .cmp(&b.name)
            .then_with(|| a.parent_name.cmp(&b.parent_name))
    });
}

/// Resolves fragments against a [`LocationCatalog`].
#[derive(Clone)]
pub struct EntityResolver {
    catalog: Arc<dyn LocationCatalog>,
}

impl EntityResolver {
    pub fn new(catalog: Arc<dyn LocationCatalog>) -> Self {
        Self { catalog }
    }

    /// Resolve `fragment` at `level`, restricted to children of `parent`
    /// when given.
    pub fn resolve(
        &self,
        level: LocationLevel,
        fragment: &str,
        parent: Option<&str>,
    ) -> Result<Option<LocationEntity>, StoreError> {
        let fragment = fragment.trim();
        if fragment.is_empty() {
            return Ok(None);
        }

        let mut candidates = self.candidates(level, parent, Some(fragment))?;
        // Backends may filter loosely; containment is re-checked here.
        candidates.retain(|e| e.matches_partial(fragment));
        sort_entities(&mut candidates);
        Ok(candidates.into_iter().next())
    }

    /// Every entity at `level` under `parent`, in stable order.
    pub fn children(
        &self,
        level: LocationLevel,
        parent: Option<&str>,
    ) -> Result<Vec<LocationEntity>, StoreError> {
        let mut entities = self.candidates(level, parent, None)?;
        sort_entities(&mut entities);
        Ok(entities)
    }

    fn candidates(
        &self,
        level: LocationLevel,
        parent: Option<&str>,
        filter: Option<&str>,
    ) -> Result<Vec<LocationEntity>, StoreError> {
        match (level, parent) {
            (LocationLevel::Region, _) => self.catalog.list_regions(filter),
            (LocationLevel::Province, Some(region)) => self.catalog.list_provinces(region, filter),
            (LocationLevel::District, Some(province)) => {
                self.catalog.list_districts(province, filter)
            }
            (LocationLevel::Province, None) => {
                let mut all = Vec::new();
                for region in self.catalog.list_regions(None)? {
                    all.extend(self.catalog.list_provinces(&region.name, filter)?);
                }
                Ok(all)
            }
            (LocationLevel::District, None) => {
                let mut all = Vec::new();
                for province in self.candidates(LocationLevel::Province, None, None)? {
                    all.extend(self.catalog.list_districts(&province.name, filter)?);
                }
                Ok(all)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::InMemoryCatalog;

    fn resolver() -> EntityResolver {
        let catalog = InMemoryCatalog::new()
            .with_region("Southern")
            .with_region("Northern")
            .with_region("Northeastern")
            .with_province("Northern", "Chiang Rai")
            .with_province("Northern", "Chiang Mai")
            .with_province("Southern", "Songkhla")
            .with_district("Chiang Mai", "Mae Taeng")
            .with_district("Chiang Mai", "Mae Rim")
            .with_district("Chiang Rai", "Mae Sai")
            .with_district("Songkhla", "Hat Yai");
        EntityResolver::new(Arc::new(catalog))
    }

    #[test]
    fn test_first_match_in_name_order() {
        let resolver = resolver();
        // "north" matches Northern and Northeastern; Northeastern sorts first.
        let region = resolver
            .resolve(LocationLevel::Region, "north", None)
            .unwrap()
            .unwrap();
        assert_eq!(region.name, "Northeastern");
    }

    #[test]
    fn test_resolution_is_deterministic() {
        let resolver = resolver();
        let first = resolver.resolve(LocationLevel::District, "mae", Some("Chiang Mai")).unwrap();
        for _ in 0..10 {
            let again = resolver.resolve(LocationLevel::District, "mae", Some("Chiang Mai")).unwrap();
            assert_eq!(first, again);
        }
        assert_eq!(first.unwrap().name, "Mae Rim");
    }

    #[test]
    fn test_scoped_to_parent() {
        let resolver = resolver();
        assert!(resolver
            .resolve(LocationLevel::District, "hat yai", Some("Chiang Mai"))
            .unwrap()
            .is_none());
        let district = resolver
            .resolve(LocationLevel::District, "hat yai", Some("Songkhla"))
            .unwrap()
            .unwrap();
        assert_eq!(district.parent_name.as_deref(), Some("Songkhla"));
    }

    #[test]
    fn test_unscoped_search_spans_parents() {
        let resolver = resolver();
        let district = resolver
            .resolve(LocationLevel::District, "sai", None)
            .unwrap()
            .unwrap();
        assert_eq!(district.name, "Mae Sai");
    }

    #[test]
    fn test_no_fuzzy_matching() {
        let resolver = resolver();
        assert!(resolver
            .resolve(LocationLevel::Region, "nothern", None)
            .unwrap()
            .is_none());
        assert!(resolver.resolve(LocationLevel::Region, "  ", None).unwrap().is_none());
    }

    #[test]
    fn test_children_sorted_by_name() {
        let resolver = resolver();
        let names: Vec<_> = resolver
            .children(LocationLevel::District, Some("Chiang Mai"))
            .unwrap()
            .into_iter()
            .map(|e| e.name)
            .collect();
        assert_eq!(names, ["Mae Rim", "Mae Taeng"]);
    }
}
