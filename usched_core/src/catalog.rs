//! Section and room catalogs.
//!
//! Catalogs are reference data: loaded once at startup (from the built-in
//! seed or a JSON file) and only ever read afterwards.

use crate::types::*;
use crate::{Error, Result};
use once_cell::sync::Lazy;
use std::collections::HashSet;
use std::path::Path;

/// Cached seed catalog - built once and reused across all operations
static DEFAULT_CATALOG: Lazy<Catalog> = Lazy::new(build_default_catalog_internal);

/// Get a reference to the cached seed catalog
pub fn get_default_catalog() -> &'static Catalog {
    &DEFAULT_CATALOG
}

/// Builds the seed catalog with the built-in sections and rooms
///
/// **Note**: For production use, prefer `get_default_catalog()` which returns a
/// cached reference. This function is retained for tests that need an owned,
/// modifiable copy.
pub fn build_default_catalog() -> Catalog {
    build_default_catalog_internal()
}

fn build_default_catalog_internal() -> Catalog {
    let section = |id: &str, name: &str, year_level: u8, demand: u32| Section {
        id: id.into(),
        name: name.into(),
        group_id: "dept-1".into(),
        group_code: "SE".into(),
        year_level,
        capacity_demand: demand,
    };

    let room = |id: &str, name: &str, capacity: u32, floor: i32, kind: RoomKind| Room {
        id: id.into(),
        name: name.into(),
        capacity,
        building_id: "b-1".into(),
        building_name: "Tech".into(),
        floor,
        kind,
        status: RoomStatus::Available,
    };

    Catalog {
        sections: vec![
            section("sec-1", "Section 1", 1, 45),
            section("sec-2", "Section 2", 1, 42),
            section("sec-3", "Section 3", 2, 38),
        ],
        rooms: vec![
            room("r-1", "T-101", 50, 1, RoomKind::Classroom),
            room("r-2", "T-102", 45, 1, RoomKind::Classroom),
            room("r-3", "Hall-1", 150, 0, RoomKind::Hall),
            room("r-4", "Lab-A", 30, 2, RoomKind::Lab),
        ],
    }
}

impl Catalog {
    /// Load a catalog from a JSON file of the form `{"sections": [...], "rooms": [...]}`
    pub fn load_from(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        let catalog: Catalog = serde_json::from_str(&contents)?;
        tracing::info!(
            sections = catalog.sections.len(),
            rooms = catalog.rooms.len(),
            "Loaded catalog from {:?}",
            path
        );
        Ok(catalog)
    }

    /// Load and validate, turning validation problems into an error
    pub fn load_validated(path: &Path) -> Result<Self> {
        let catalog = Self::load_from(path)?;
        catalog.ensure_valid()?;
        Ok(catalog)
    }

    /// Fail with `CatalogValidation` listing every problem, if any
    pub fn ensure_valid(&self) -> Result<()> {
        let errors = self.validate();
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Error::CatalogValidation(errors.join("; ")))
        }
    }

    /// Validate the catalog for consistency
    ///
    /// Returns a list of validation errors, or empty Vec if valid.
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();

        let mut seen = HashSet::new();
        for section in &self.sections {
            if section.id.is_empty() {
                errors.push("Section has empty ID".to_string());
            } else if !seen.insert(section.id.as_str()) {
                errors.push(format!("Duplicate section ID '{}'", section.id));
            }
            if section.name.is_empty() {
                errors.push(format!("Section '{}' has empty name", section.id));
            }
            if section.capacity_demand == 0 {
                errors.push(format!("Section '{}' has zero capacity demand", section.id));
            }
        }

        let mut seen = HashSet::new();
        for room in &self.rooms {
            if room.id.is_empty() {
                errors.push("Room has empty ID".to_string());
            } else if !seen.insert(room.id.as_str()) {
                errors.push(format!("Duplicate room ID '{}'", room.id));
            }
            if room.name.is_empty() {
                errors.push(format!("Room '{}' has empty name", room.id));
            }
            if room.capacity == 0 {
                errors.push(format!("Room '{}' has zero capacity", room.id));
            }
        }

        errors
    }

    /// Sections matching `filter`, in catalog order
    pub fn sections<'a>(&'a self, filter: &'a SectionFilter) -> impl Iterator<Item = &'a Section> + 'a {
        self.sections.iter().filter(move |s| filter.matches(s))
    }

    /// Rooms matching `filter`, in catalog order
    pub fn rooms<'a>(&'a self, filter: &'a RoomFilter) -> impl Iterator<Item = &'a Room> + 'a {
        self.rooms.iter().filter(move |r| filter.matches(r))
    }

    pub fn section(&self, id: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.id == id)
    }

    pub fn room(&self, id: &str) -> Option<&Room> {
        self.rooms.iter().find(|r| r.id == id)
    }
}
