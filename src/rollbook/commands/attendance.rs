use crate::attendance::find_record;
use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::{to_document, AttendanceRecord, AttendanceStatus, Collection, Document};
use crate::store::DataStore;
use chrono::NaiveDate;
use serde_json::Value;
use uuid::Uuid;

use super::helpers::records;

/// Records `status` for one student on one day.
///
/// An existing record for the pair is updated in place; notes are only
/// overwritten when new ones are given.
pub fn mark<S: DataStore>(
    store: &mut S,
    student_id: Uuid,
    student_name: &str,
    date: NaiveDate,
    status: AttendanceStatus,
    notes: Option<String>,
) -> Result<CmdResult> {
    let existing = records::<AttendanceRecord, S>(store)?;
    let notes = notes
        .map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty());

    let id = match find_record(&existing, &student_id, date) {
        Some(record) => {
            let mut patch = Document::new();
            patch.insert("status".into(), Value::String(status.as_str().into()));
            if let Some(notes) = notes {
                patch.insert("notes".into(), Value::String(notes));
            }
            store.update(Collection::Attendance, &record.id, patch)?;
            record.id
        }
        None => {
            let record = AttendanceRecord {
                student_id,
                student_name: student_name.to_string(),
                date,
                status,
                notes,
            };
            store.create(Collection::Attendance, to_document(&record)?)?
        }
    };

    Ok(CmdResult::default()
        .with_affected(id)
        .with_message(CmdMessage::success(format!(
            "{} marked {} on {}",
            student_name, status, date
        ))))
}
