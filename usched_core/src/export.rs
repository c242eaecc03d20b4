//! CSV export of formatted assignments.

use crate::format::DisplayRecord;
use crate::Result;
use std::fs::File;
use std::path::Path;

/// A row in the CSV output
#[derive(Debug, serde::Serialize)]
struct CsvRow<'a> {
    id: &'a str,
    section: &'a str,
    department: &'a str,
    students: u32,
    room: &'a str,
    building: &'a str,
    floor: i32,
}

impl<'a> From<&'a DisplayRecord> for CsvRow<'a> {
    fn from(record: &'a DisplayRecord) -> Self {
        CsvRow {
            id: &record.id,
            section: &record.section_name,
            department: &record.group_name,
            students: record.capacity_demand,
            room: &record.room_name,
            building: &record.building_name,
            floor: record.floor,
        }
    }
}

/// Write display records to `path`, replacing any existing file
///
/// The header row is always written, even for an empty export. Returns the
/// number of data rows written.
pub fn write_csv(records: &[DisplayRecord], path: &Path) -> Result<usize> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let file = File::create(path)?;
    let mut writer = csv::WriterBuilder::new().from_writer(file);

    if records.is_empty() {
        writer.write_record(["id", "section", "department", "students", "room", "building", "floor"])?;
    }
    for record in records {
        writer.serialize(CsvRow::from(record))?;
    }

    writer.flush()?;
    let file = writer
        .into_inner()
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;
    file.sync_all()?;

    tracing::info!("Exported {} assignments to {:?}", records.len(), path);
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(id: &str, room: &str) -> DisplayRecord {
        DisplayRecord {
            id: id.into(),
            section_name: "SE Section 1".into(),
            group_name: "dept-1".into(),
            capacity_demand: 45,
            room_name: room.into(),
            building_name: "Tech".into(),
            floor: 1,
        }
    }

    #[test]
    fn test_write_csv_with_headers() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("out/assignments.csv");

        let written = write_csv(&[record("hb-sec-1", "T-102"), record("hb-sec-2", "T-101")], &path)
            .unwrap();
        assert_eq!(written, 2);

        let content = std::fs::read_to_string(&path).unwrap();
        let lines: Vec<_> = content.lines().collect();
        assert_eq!(lines[0], "id,section,department,students,room,building,floor");
        assert_eq!(lines[1], "hb-sec-1,SE Section 1,dept-1,45,T-102,Tech,1");
        assert_eq!(lines.len(), 3);
    }

    #[test]
    fn test_empty_export_has_only_header() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("empty.csv");

        assert_eq!(write_csv(&[], &path).unwrap(), 0);
        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.trim(), "id,section,department,students,room,building,floor");
    }

    #[test]
    fn test_export_overwrites() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("a.csv");

        write_csv(&[record("hb-1", "A"), record("hb-2", "B")], &path).unwrap();
        write_csv(&[record("hb-3", "C")], &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content.lines().count(), 2);
        assert!(content.contains("hb-3"));
    }
}
