//! Core domain types for the USched homebase allocation system.
//!
//! This module defines the fundamental types used throughout the system:
//! - Sections and their capacity demand
//! - Rooms, their classification and availability
//! - Assignments and assignment sets produced by allocation runs
//! - The read-only catalog that ties sections and rooms together

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Section Types
// ============================================================================

/// A course section that needs a homebase room
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Section {
    pub id: String,
    pub name: String,
    /// Department or program the section belongs to
    pub group_id: String,
    /// Short department code used in display names (e.g. "SE")
    pub group_code: String,
    #[serde(default = "default_year_level")]
    pub year_level: u8,
    /// Number of occupants requiring a seat
    pub capacity_demand: u32,
}

fn default_year_level() -> u8 {
    1
}

// ============================================================================
// Room Types
// ============================================================================

/// Classification of a physical room
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum RoomKind {
    Classroom,
    Hall,
    Lab,
}

impl fmt::Display for RoomKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RoomKind::Classroom => "classroom",
            RoomKind::Hall => "hall",
            RoomKind::Lab => "lab",
        };
        f.write_str(s)
    }
}

impl FromStr for RoomKind {
    type Err = crate::Error;

    fn from_str(s: &str) -> crate::Result<Self> {
        match s.to_lowercase().as_str() {
            "classroom" => Ok(RoomKind::Classroom),
            "hall" => Ok(RoomKind::Hall),
            "lab" => Ok(RoomKind::Lab),
            other => Err(crate::Error::Config(format!("Unknown room kind: {}", other))),
        }
    }
}

/// Whether a room can currently be used
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RoomStatus {
    #[default]
    Available,
    Unavailable,
}

/// A physical room
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Room {
    pub id: String,
    pub name: String,
    pub capacity: u32,
    pub building_id: String,
    pub building_name: String,
    pub floor: i32,
    pub kind: RoomKind,
    #[serde(default)]
    pub status: RoomStatus,
}

impl Room {
    pub fn is_available(&self) -> bool {
        self.status == RoomStatus::Available
    }
}

// ============================================================================
// Assignment Types
// ============================================================================

/// A homebase assignment of one section to one room
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Assignment {
    pub id: String,
    pub section_id: String,
    pub room_id: String,
    pub assigned_at: DateTime<Utc>,
}

impl Assignment {
    /// Create an assignment with the conventional `hb-<section>` identity
    pub fn new(section_id: &str, room_id: &str, assigned_at: DateTime<Utc>) -> Self {
        Self {
            id: format!("hb-{}", section_id),
            section_id: section_id.to_string(),
            room_id: room_id.to_string(),
            assigned_at,
        }
    }
}

/// The complete result of one allocation run
///
/// Sets are only ever built whole by the engine; there is no API for
/// adding or removing a single assignment.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct AssignmentSet {
    /// Identifier of the run that produced this set (None for the empty set)
    pub run_id: Option<Uuid>,
    assignments: Vec<Assignment>,
}

impl AssignmentSet {
    pub(crate) fn from_run(run_id: Uuid, assignments: Vec<Assignment>) -> Self {
        Self {
            run_id: Some(run_id),
            assignments,
        }
    }

    pub fn len(&self) -> usize {
        self.assignments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assignments.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Assignment> {
        self.assignments.iter()
    }

    pub fn as_slice(&self) -> &[Assignment] {
        &self.assignments
    }

    /// Find the assignment for a section, if any
    pub fn for_section(&self, section_id: &str) -> Option<&Assignment> {
        self.assignments.iter().find(|a| a.section_id == section_id)
    }

    /// Section/room pairs in run order, ignoring timestamps
    pub fn pairs(&self) -> Vec<(String, String)> {
        self.assignments
            .iter()
            .map(|a| (a.section_id.clone(), a.room_id.clone()))
            .collect()
    }
}

impl<'a> IntoIterator for &'a AssignmentSet {
    type Item = &'a Assignment;
    type IntoIter = std::slice::Iter<'a, Assignment>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

// ============================================================================
// Catalog Type
// ============================================================================

/// Read-only reference data: sections and rooms, in catalog order
///
/// Catalog order matters: it is the tie-break order used by the allocation
/// engine when two sections (or rooms) have equal capacity.
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Catalog {
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub rooms: Vec<Room>,
}

/// Optional filters for section listings
#[derive(Clone, Debug, Default)]
pub struct SectionFilter {
    pub group_id: Option<String>,
    pub year_level: Option<u8>,
}

impl SectionFilter {
    pub fn matches(&self, section: &Section) -> bool {
        self.group_id
            .as_deref()
            .map_or(true, |g| section.group_id == g)
            && self.year_level.map_or(true, |y| section.year_level == y)
    }
}

/// Optional filters for room listings
#[derive(Clone, Debug, Default)]
pub struct RoomFilter {
    pub kind: Option<RoomKind>,
    pub available_only: bool,
}

impl RoomFilter {
    pub fn matches(&self, room: &Room) -> bool {
        self.kind.map_or(true, |k| room.kind == k) && (!self.available_only || room.is_available())
    }
}
