use crate::commands::{CmdMessage, CmdResult};
use crate::error::Result;
use crate::model::{to_document, Batch, Collection, Student};
use crate::store::DataStore;
use chrono::NaiveDate;
use serde::Serialize;
use uuid::Uuid;

use super::helpers::find_record;

/// Fields to change on an existing student. Unset fields are left alone.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub batch: Option<Batch>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub registration_date: Option<NaiveDate>,
}

impl StudentPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.address.is_none()
            && self.phone.is_none()
            && self.batch.is_none()
            && self.registration_date.is_none()
    }
}

pub fn add<S: DataStore>(store: &mut S, mut student: Student) -> Result<CmdResult> {
    student.name = student.name.trim().to_string();
    if student.name.is_empty() {
        return Ok(CmdResult::default()
            .with_message(CmdMessage::info("A student needs a name; nothing saved")));
    }

    let id = store.create(Collection::Students, to_document(&student)?)?;
    Ok(CmdResult::default()
        .with_affected(id)
        .with_message(CmdMessage::success(format!(
            "Student added: {} ({})",
            student.name, student.batch
        ))))
}

pub fn update<S: DataStore>(store: &mut S, id: &Uuid, mut patch: StudentPatch) -> Result<CmdResult> {
    if let Some(name) = patch.name.as_mut() {
        *name = name.trim().to_string();
        if name.is_empty() {
            return Ok(CmdResult::default()
                .with_message(CmdMessage::info("A student needs a name; nothing saved")));
        }
    }
    if patch.is_empty() {
        return Ok(CmdResult::default().with_message(CmdMessage::info("Nothing to change")));
    }

    store.update(Collection::Students, id, to_document(&patch)?)?;
    let student = find_record::<Student, S>(store, id)?;
    Ok(CmdResult::default()
        .with_affected(*id)
        .with_message(CmdMessage::success(format!(
            "Student updated: {}",
            student.name
        ))))
}

/// Removes the student only. Their attendance and bookings keep the name they
/// were recorded with.
pub fn delete<S: DataStore>(store: &mut S, id: &Uuid) -> Result<CmdResult> {
    let student = find_record::<Student, S>(store, id)?;
    store.delete(Collection::Students, id)?;
    Ok(CmdResult::default()
        .with_affected(*id)
        .with_message(CmdMessage::success(format!(
            "Student removed: {}",
            student.name
        ))))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::helpers::records;
    use crate::error::RollbookError;
    use crate::store::memory::fixtures::{day, student, StoreFixture};
    use crate::store::memory::InMemoryStore;

    #[test]
    fn add_trims_and_stores() {
        let mut store = InMemoryStore::new();
        let result = add(&mut store, student("  Alice ")).unwrap();

        assert_eq!(result.affected_ids.len(), 1);
        let all = records::<Student, _>(&store).unwrap();
        assert_eq!(all[0].name, "Alice");
        assert_eq!(all[0].id, result.affected_ids[0]);
    }

    #[test]
    fn add_without_name_writes_nothing() {
        let mut store = InMemoryStore::new();
        let result = add(&mut store, student("   ")).unwrap();

        assert!(result.is_noop());
        assert!(store.is_empty(Collection::Students));
    }

    #[test]
    fn update_changes_only_given_fields() {
        let mut fixture = StoreFixture::new().with_student("Alice");
        let id = fixture.ids[0];
        let patch = StudentPatch {
            phone: Some("5550199".into()),
            batch: Some(Batch::BeginnerOver12),
            ..Default::default()
        };
        update(&mut fixture.store, &id, patch).unwrap();

        let alice = find_record::<Student, _>(&fixture.store, &id).unwrap();
        assert_eq!(alice.name, "Alice");
        assert_eq!(alice.phone, "5550199");
        assert_eq!(alice.batch, Batch::BeginnerOver12);
        assert_eq!(alice.registration_date, day(2024, 1, 15));
    }

    #[test]
    fn empty_patch_is_a_noop() {
        let mut fixture = StoreFixture::new().with_student("Alice");
        let id = fixture.ids[0];
        assert!(update(&mut fixture.store, &id, StudentPatch::default())
            .unwrap()
            .is_noop());

        let blank = StudentPatch {
            name: Some(" ".into()),
            ..Default::default()
        };
        assert!(update(&mut fixture.store, &id, blank).unwrap().is_noop());
    }

    #[test]
    fn delete_removes_and_reports_missing() {
        let mut fixture = StoreFixture::new().with_student("Alice");
        let id = fixture.ids[0];
        delete(&mut fixture.store, &id).unwrap();

        assert!(fixture.store.is_empty(Collection::Students));
        assert!(matches!(
            delete(&mut fixture.store, &id),
            Err(RollbookError::NotFound { .. })
        ));
    }
}
