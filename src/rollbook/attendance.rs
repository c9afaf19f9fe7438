//! Per-day attendance derived from the attendance collection.
//!
//! A day is never stored as such: it is reduced from whichever records carry
//! that date. At most one record per (student, date) is meaningful; writers go
//! through [`find_record`] to update that record instead of adding another.

use crate::model::{AttendanceRecord, AttendanceStatus, Record};
use chrono::NaiveDate;
use std::collections::HashMap;
use uuid::Uuid;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DaySummary {
    pub present: usize,
    pub late: usize,
    pub absent: usize,
    pub per_student: HashMap<Uuid, AttendanceStatus>,
}

impl DaySummary {
    pub fn status_of(&self, student_id: &Uuid) -> Option<AttendanceStatus> {
        self.per_student.get(student_id).copied()
    }

    pub fn marked(&self) -> usize {
        self.present + self.late + self.absent
    }
}

pub fn derive_day(records: &[Record<AttendanceRecord>], date: NaiveDate) -> DaySummary {
    let mut summary = DaySummary::default();
    for record in records.iter().filter(|r| r.date == date) {
        match record.status {
            AttendanceStatus::Present => summary.present += 1,
            AttendanceStatus::Late => summary.late += 1,
            AttendanceStatus::Absent => summary.absent += 1,
        }
        // First record wins if a duplicate slipped in.
        summary
            .per_student
            .entry(record.student_id)
            .or_insert(record.status);
    }
    summary
}

/// The record holding `student_id`'s attendance on `date`, if one exists.
pub fn find_record<'a>(
    records: &'a [Record<AttendanceRecord>],
    student_id: &Uuid,
    date: NaiveDate,
) -> Option<&'a Record<AttendanceRecord>> {
    records
        .iter()
        .find(|r| &r.student_id == student_id && r.date == date)
}
