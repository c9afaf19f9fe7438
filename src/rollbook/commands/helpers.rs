use crate::error::{RollbookError, Result};
use crate::model::{Entity, Record};
use crate::store::DataStore;
use uuid::Uuid;

/// Typed read of a whole collection straight from the store.
pub fn records<T: Entity, S: DataStore>(store: &S) -> Result<Vec<Record<T>>> {
    store
        .snapshot(T::COLLECTION)?
        .into_iter()
        .map(Record::from_document)
        .collect()
}

pub fn find_record<T: Entity, S: DataStore>(store: &S, id: &Uuid) -> Result<Record<T>> {
    records::<T, S>(store)?
        .into_iter()
        .find(|r| &r.id == id)
        .ok_or(RollbookError::NotFound {
            collection: T::COLLECTION,
            id: *id,
        })
}

/// Resolves a full id or a unique id prefix against a collection snapshot.
pub fn resolve_id<T: Entity>(records: &[Record<T>], input: &str) -> Result<Uuid> {
    let wanted = input.trim().to_lowercase().replace('-', "");
    if wanted.is_empty() {
        return Err(RollbookError::Api("An id is required".to_string()));
    }

    let mut matches = records
        .iter()
        .filter(|r| r.id.simple().to_string().starts_with(&wanted));

    match (matches.next(), matches.next()) {
        (Some(record), None) => Ok(record.id),
        (None, _) => Err(RollbookError::Api(format!(
            "No {} matches id {}",
            T::COLLECTION.singular(),
            input
        ))),
        (Some(_), Some(_)) => Err(RollbookError::Api(format!(
            "Id {} matches more than one {}; use more characters",
            input,
            T::COLLECTION.singular()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Student;
    use crate::store::memory::fixtures::{student, StoreFixture};

    #[test]
    fn resolves_unique_prefixes() {
        let fixture = StoreFixture::new().with_student("A").with_student("B");
        let all = records::<Student, _>(&fixture.store).unwrap();

        let full = all[0].id.to_string();
        assert_eq!(resolve_id(&all, &full).unwrap(), all[0].id);
        assert_eq!(resolve_id(&all, &all[1].short_id()).unwrap(), all[1].id);
    }

    #[test]
    fn rejects_unknown_and_ambiguous_ids() {
        let all = vec![
            Record::new(Uuid::parse_str("aaaa0000-0000-4000-8000-000000000001").unwrap(), student("A")),
            Record::new(Uuid::parse_str("aaaa0000-0000-4000-8000-000000000002").unwrap(), student("B")),
        ];
        assert!(resolve_id(&all, "aaaa").is_err());
        assert!(resolve_id(&all, "ffff").is_err());
        assert!(resolve_id(&all, "").is_err());
        assert_eq!(
            resolve_id(&all, "aaaa0000-0000-4000-8000-000000000002").unwrap(),
            all[1].id
        );
    }

    #[test]
    fn find_record_reports_not_found() {
        let fixture = StoreFixture::new().with_student("A");
        assert!(matches!(
            find_record::<Student, _>(&fixture.store, &Uuid::new_v4()),
            Err(RollbookError::NotFound { .. })
        ));
        let found = find_record::<Student, _>(&fixture.store, &fixture.ids[0]).unwrap();
        assert_eq!(found.name, "A");
    }
}
