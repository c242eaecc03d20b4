//! Allocation engine for homebase room assignment.
//!
//! The engine maps every section to a distinct eligible room whose capacity
//! covers the section's demand:
//! - Largest demand first
//! - Tightest fitting room for each section
//! - All or nothing: one unmatched section fails the whole run
//!
//! ## Limitation
//!
//! Largest-first / tightest-fit is a greedy heuristic with no backtracking.
//! The contract is the ordering, not optimality: the engine never revisits a
//! choice made for an earlier (larger) section. With a single capacity
//! dimension and one eligibility pool for every section the greedy order
//! happens to find an assignment whenever one exists, but any per-section
//! constraint added on top (time slots, per-section room kinds) can make it
//! report infeasible where a solution exists. Swapping in an exact solver
//! changes the contract of [`allocate`].

use crate::{Assignment, AssignmentSet, Error, Result, Room, RoomKind, Section};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Named room eligibility policies
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum Eligibility {
    /// Classrooms and halls that are currently available
    #[default]
    ClassroomOrHall,
    /// Anything that is not a lab, regardless of availability
    NotLab,
}

impl Eligibility {
    /// Whether `room` may receive a homebase section under this policy
    pub fn admits(&self, room: &Room) -> bool {
        match self {
            Eligibility::ClassroomOrHall => {
                matches!(room.kind, RoomKind::Classroom | RoomKind::Hall) && room.is_available()
            }
            Eligibility::NotLab => room.kind != RoomKind::Lab,
        }
    }
}

impl fmt::Display for Eligibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Eligibility::ClassroomOrHall => f.write_str("classroom-or-hall"),
            Eligibility::NotLab => f.write_str("not-lab"),
        }
    }
}

impl FromStr for Eligibility {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "classroom-or-hall" => Ok(Eligibility::ClassroomOrHall),
            "not-lab" => Ok(Eligibility::NotLab),
            other => Err(Error::Config(format!(
                "Unknown eligibility policy: {} (expected classroom-or-hall or not-lab)",
                other
            ))),
        }
    }
}

/// Assign every section to a room
///
/// ## Ordering
///
/// 1. Sections sorted by `capacity_demand` descending
/// 2. Eligible rooms sorted by `capacity` ascending
///
/// Equal keys are broken by catalog position (earlier first). The position is
/// part of the sort key, so the result does not depend on the sort being
/// stable.
///
/// ## Failure
///
/// Returns [`Error::Infeasible`] for the first section (in processing order)
/// with no unclaimed eligible room large enough. Nothing is returned for the
/// sections matched before it.
pub fn allocate<P>(
    sections: &[Section],
    rooms: &[Room],
    eligible: P,
    now: DateTime<Utc>,
) -> Result<AssignmentSet>
where
    P: Fn(&Room) -> bool,
{
    let mut pool: Vec<(usize, &Room)> = rooms
        .iter()
        .enumerate()
        .filter(|(_, r)| eligible(*r))
        .collect();
    pool.sort_by_key(|&(idx, r)| (r.capacity, idx));

    let mut ordered: Vec<(usize, &Section)> = sections.iter().enumerate().collect();
    ordered.sort_by_key(|&(idx, s)| (Reverse(s.capacity_demand), idx));

    tracing::info!(
        sections = ordered.len(),
        eligible_rooms = pool.len(),
        total_rooms = rooms.len(),
        "Starting allocation"
    );

    // Claims are keyed by room id, so a catalog repeating an id still books it once
    let mut claimed: HashSet<&str> = HashSet::with_capacity(pool.len());
    let mut tentative = Vec::with_capacity(ordered.len());

    for (_, section) in ordered {
        let room = pool
            .iter()
            .map(|&(_, r)| r)
            .find(|r| !claimed.contains(r.id.as_str()) && r.capacity >= section.capacity_demand);

        let Some(room) = room else {
            tracing::warn!(
                section_id = %section.id,
                demand = section.capacity_demand,
                matched = tentative.len(),
                "No eligible room fits section, discarding run"
            );
            return Err(Error::Infeasible {
                section_id: section.id.clone(),
                section_name: section.name.clone(),
            });
        };

        claimed.insert(room.id.as_str());
        tracing::debug!(
            section_id = %section.id,
            room_id = %room.id,
            demand = section.capacity_demand,
            capacity = room.capacity,
            "Matched section"
        );
        tentative.push(Assignment::new(&section.id, &room.id, now));
    }

    Ok(AssignmentSet::from_run(Uuid::new_v4(), tentative))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{build_default_catalog, RoomStatus};

    fn section(id: &str, demand: u32) -> Section {
        Section {
            id: id.into(),
            name: id.into(),
            group_id: "dept-1".into(),
            group_code: "SE".into(),
            year_level: 1,
            capacity_demand: demand,
        }
    }

    fn room(id: &str, capacity: u32, kind: RoomKind) -> Room {
        Room {
            id: id.into(),
            name: id.to_uppercase(),
            capacity,
            building_id: "b-1".into(),
            building_name: "Tech".into(),
            floor: 1,
            kind,
            status: RoomStatus::Available,
        }
    }

    fn run(sections: &[Section], rooms: &[Room]) -> Result<AssignmentSet> {
        crate::logging::init_test();
        allocate(sections, rooms, |r| Eligibility::NotLab.admits(r), Utc::now())
    }

    #[test]
    fn test_default_catalog_tightest_fit() {
        let catalog = build_default_catalog();
        let set = allocate(
            &catalog.sections,
            &catalog.rooms,
            |r| Eligibility::ClassroomOrHall.admits(r),
            Utc::now(),
        )
        .unwrap();

        assert_eq!(
            set.pairs(),
            vec![
                ("sec-1".to_string(), "r-2".to_string()),
                ("sec-2".to_string(), "r-1".to_string()),
                ("sec-3".to_string(), "r-3".to_string()),
            ]
        );
        assert!(set.run_id.is_some());
    }

    #[test]
    fn test_infeasible_names_first_unmatched_section() {
        let sections = vec![section("sec-1", 45), section("sec-x", 200)];
        let rooms = vec![room("r-1", 50, RoomKind::Classroom), room("r-3", 150, RoomKind::Hall)];

        match run(&sections, &rooms) {
            Err(Error::Infeasible { section_id, .. }) => assert_eq!(section_id, "sec-x"),
            other => panic!("Expected Infeasible, got {:?}", other),
        }
    }

    #[test]
    fn test_labs_never_used_under_not_lab() {
        let sections = vec![section("sec-1", 20)];
        let rooms = vec![room("lab", 25, RoomKind::Lab), room("r-1", 60, RoomKind::Classroom)];

        let set = run(&sections, &rooms).unwrap();
        assert_eq!(set.as_slice()[0].room_id, "r-1");
    }

    #[test]
    fn test_classroom_or_hall_skips_unavailable() {
        let mut closed = room("r-1", 40, RoomKind::Classroom);
        closed.status = RoomStatus::Unavailable;
        let open = room("r-2", 80, RoomKind::Hall);

        assert!(!Eligibility::ClassroomOrHall.admits(&closed));
        assert!(Eligibility::ClassroomOrHall.admits(&open));
        // not-lab ignores availability
        assert!(Eligibility::NotLab.admits(&closed));
    }

    #[test]
    fn test_equal_demand_keeps_catalog_order() {
        let sections = vec![section("a", 30), section("b", 30), section("c", 30)];
        let rooms = vec![
            room("r-big", 40, RoomKind::Classroom),
            room("r-x", 30, RoomKind::Classroom),
            room("r-y", 30, RoomKind::Classroom),
        ];

        let set = run(&sections, &rooms).unwrap();
        assert_eq!(
            set.pairs(),
            vec![
                ("a".to_string(), "r-x".to_string()),
                ("b".to_string(), "r-y".to_string()),
                ("c".to_string(), "r-big".to_string()),
            ]
        );
    }

    #[test]
    fn test_no_double_booking_and_demand_met() {
        let sections: Vec<_> = (0..12).map(|i| section(&format!("s{}", i), 10 + i * 7)).collect();
        let rooms: Vec<_> = (0..15)
            .map(|i| room(&format!("r{}", i), 20 + i * 9, RoomKind::Classroom))
            .collect();

        let set = run(&sections, &rooms).unwrap();
        assert_eq!(set.len(), sections.len());

        let mut seen = HashSet::new();
        for a in &set {
            assert!(seen.insert(a.room_id.clone()), "room {} booked twice", a.room_id);
            let s = sections.iter().find(|s| s.id == a.section_id).unwrap();
            let r = rooms.iter().find(|r| r.id == a.room_id).unwrap();
            assert!(r.capacity >= s.capacity_demand);
        }
    }

    #[test]
    fn test_repeated_room_id_is_booked_once() {
        let sections = vec![section("a", 30), section("b", 30)];
        let rooms = vec![room("r-1", 40, RoomKind::Classroom), room("r-1", 40, RoomKind::Classroom)];

        match run(&sections, &rooms) {
            Err(Error::Infeasible { section_id, .. }) => assert_eq!(section_id, "b"),
            other => panic!("Expected Infeasible, got {:?}", other),
        }
    }

    #[test]
    fn test_zero_sections_is_empty_success() {
        let rooms = vec![room("r-1", 50, RoomKind::Classroom)];
        let set = run(&[], &rooms).unwrap();
        assert!(set.is_empty());
    }

    #[test]
    fn test_eligibility_parse() {
        assert_eq!("not-lab".parse::<Eligibility>().unwrap(), Eligibility::NotLab);
        assert_eq!(
            "classroom_or_hall".parse::<Eligibility>().unwrap(),
            Eligibility::ClassroomOrHall
        );
        assert!("everything".parse::<Eligibility>().is_err());
    }
}
