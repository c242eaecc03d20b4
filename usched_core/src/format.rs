//! Presentation join of assignments with the catalogs.

use crate::{AssignmentSet, Catalog, Error, Result, SectionFilter};
use serde::{Deserialize, Serialize};

/// One assignment rendered for display
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DisplayRecord {
    pub id: String,
    pub section_name: String,
    #[serde(rename = "departmentName")]
    pub group_name: String,
    #[serde(rename = "studentCount")]
    pub capacity_demand: u32,
    pub room_name: String,
    pub building_name: String,
    pub floor: i32,
}

/// A section together with its homebase room, if it has one
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SectionOverview {
    pub id: String,
    pub name: String,
    #[serde(rename = "academicProgramId")]
    pub group_id: String,
    pub year_level: u8,
    #[serde(rename = "studentCount")]
    pub capacity_demand: u32,
    pub assigned_room_id: Option<String>,
    pub assigned_room_name: Option<String>,
}

/// Join every assignment with its section and room
///
/// A missing section or room is an [`Error::Invariant`]: the engine only
/// assigns identities taken from the live catalog, so a dangling reference
/// means something else broke. Records are never silently dropped, so the
/// output length always equals `set.len()`.
pub fn format_assignments(set: &AssignmentSet, catalog: &Catalog) -> Result<Vec<DisplayRecord>> {
    set.iter()
        .map(|hb| -> Result<DisplayRecord> {
            let section = catalog
                .section(&hb.section_id)
                .ok_or_else(|| dangling(&hb.id, "section", &hb.section_id))?;
            let room = catalog
                .room(&hb.room_id)
                .ok_or_else(|| dangling(&hb.id, "room", &hb.room_id))?;

            Ok(DisplayRecord {
                id: hb.id.clone(),
                section_name: format!("{} {}", section.group_code, section.name),
                group_name: section.group_id.clone(),
                capacity_demand: section.capacity_demand,
                room_name: room.name.clone(),
                building_name: room.building_name.clone(),
                floor: room.floor,
            })
        })
        .collect()
}

/// List sections matching `filter` with their assigned room
pub fn section_overview(
    set: &AssignmentSet,
    catalog: &Catalog,
    filter: &SectionFilter,
) -> Result<Vec<SectionOverview>> {
    catalog
        .sections(filter)
        .map(|section| -> Result<SectionOverview> {
            let room = match set.for_section(&section.id) {
                Some(hb) => Some(
                    catalog
                        .room(&hb.room_id)
                        .ok_or_else(|| dangling(&hb.id, "room", &hb.room_id))?,
                ),
                None => None,
            };

            Ok(SectionOverview {
                id: section.id.clone(),
                name: section.name.clone(),
                group_id: section.group_id.clone(),
                year_level: section.year_level,
                capacity_demand: section.capacity_demand,
                assigned_room_id: room.map(|r| r.id.clone()),
                assigned_room_name: room.map(|r| r.name.clone()),
            })
        })
        .collect()
}

fn dangling(assignment_id: &str, what: &str, id: &str) -> Error {
    tracing::error!(assignment_id, what, id, "Assignment references missing catalog entry");
    Error::Invariant(format!(
        "assignment {} references unknown {} '{}'",
        assignment_id, what, id
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{allocate, build_default_catalog, Eligibility};
    use chrono::Utc;

    fn allocated(catalog: &Catalog) -> AssignmentSet {
        allocate(
            &catalog.sections,
            &catalog.rooms,
            |r| Eligibility::ClassroomOrHall.admits(r),
            Utc::now(),
        )
        .unwrap()
    }

    #[test]
    fn test_format_joins_catalog_fields() {
        let catalog = build_default_catalog();
        let set = allocated(&catalog);

        let records = format_assignments(&set, &catalog).unwrap();
        assert_eq!(records.len(), set.len());

        let first = &records[0];
        assert_eq!(first.id, "hb-sec-1");
        assert_eq!(first.section_name, "SE Section 1");
        assert_eq!(first.group_name, "dept-1");
        assert_eq!(first.capacity_demand, 45);
        assert_eq!(first.room_name, "T-102");
        assert_eq!(first.building_name, "Tech");
        assert_eq!(first.floor, 1);
    }

    #[test]
    fn test_display_record_wire_names() {
        let catalog = build_default_catalog();
        let records = format_assignments(&allocated(&catalog), &catalog).unwrap();

        let json = serde_json::to_value(&records[2]).unwrap();
        assert_eq!(json["sectionName"], "SE Section 3");
        assert_eq!(json["departmentName"], "dept-1");
        assert_eq!(json["studentCount"], 38);
        assert_eq!(json["roomName"], "Hall-1");
        assert_eq!(json["buildingName"], "Tech");
        assert_eq!(json["floor"], 0);
    }

    #[test]
    fn test_missing_room_is_invariant_error() {
        let mut catalog = build_default_catalog();
        let set = allocated(&catalog);
        catalog.rooms.retain(|r| r.id != "r-3");

        match format_assignments(&set, &catalog) {
            Err(Error::Invariant(msg)) => assert!(msg.contains("r-3")),
            other => panic!("Expected Invariant, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_section_is_invariant_error() {
        let mut catalog = build_default_catalog();
        let set = allocated(&catalog);
        catalog.sections.remove(0);

        let err = format_assignments(&set, &catalog).unwrap_err();
        assert!(err.is_fatal());
    }

    #[test]
    fn test_empty_set_formats_to_nothing() {
        let catalog = build_default_catalog();
        let records = format_assignments(&AssignmentSet::default(), &catalog).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_section_overview() {
        let catalog = build_default_catalog();
        let filter = SectionFilter::default();

        let before = section_overview(&AssignmentSet::default(), &catalog, &filter).unwrap();
        assert!(before.iter().all(|s| s.assigned_room_id.is_none()));

        let set = allocated(&catalog);
        let after = section_overview(&set, &catalog, &filter).unwrap();
        assert_eq!(after.len(), 3);
        assert_eq!(after[1].assigned_room_id.as_deref(), Some("r-1"));
        assert_eq!(after[1].assigned_room_name.as_deref(), Some("T-101"));
    }
}
