use super::{strip_id, with_id, DataStore};
use crate::error::{RollbookError, Result};
use crate::model::{Collection, Document};
use std::collections::{BTreeMap, HashMap, HashSet};
use uuid::Uuid;

/// In-memory storage for testing and development.
/// Does NOT persist data.
///
/// Documents keep their insertion order, so snapshots are stable across calls.
#[derive(Default)]
pub struct InMemoryStore {
    docs: HashMap<Collection, BTreeMap<u64, (Uuid, Document)>>,
    next_seq: u64,
    failing_writes: HashSet<Collection>,
    failing_reads: HashSet<Collection>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every write to `collection` fail until [`Self::heal`] is called.
    pub fn fail_writes(&mut self, collection: Collection) {
        self.failing_writes.insert(collection);
    }

    /// Make snapshots of `collection` fail, as a dropped connection would.
    pub fn fail_reads(&mut self, collection: Collection) {
        self.failing_reads.insert(collection);
    }

    pub fn heal(&mut self, collection: Collection) {
        self.failing_writes.remove(&collection);
        self.failing_reads.remove(&collection);
    }

    pub fn len(&self, collection: Collection) -> usize {
        self.docs.get(&collection).map_or(0, BTreeMap::len)
    }

    pub fn is_empty(&self, collection: Collection) -> bool {
        self.len(collection) == 0
    }

    fn check_write(&self, collection: Collection) -> Result<()> {
        if self.failing_writes.contains(&collection) {
            return Err(RollbookError::Store(format!(
                "writes to {} are unavailable",
                collection
            )));
        }
        Ok(())
    }

    fn find_mut(&mut self, collection: Collection, id: &Uuid) -> Option<&mut Document> {
        self.docs
            .get_mut(&collection)?
            .values_mut()
            .find(|(doc_id, _)| doc_id == id)
            .map(|(_, doc)| doc)
    }
}

impl DataStore for InMemoryStore {
    fn snapshot(&self, collection: Collection) -> Result<Vec<Document>> {
        if self.failing_reads.contains(&collection) {
            return Err(RollbookError::Store(format!(
                "connection to {} lost",
                collection
            )));
        }
        Ok(self
            .docs
            .get(&collection)
            .map(|docs| {
                docs.values()
                    .map(|(id, doc)| with_id(id, doc.clone()))
                    .collect()
            })
            .unwrap_or_default())
    }

    fn create(&mut self, collection: Collection, doc: Document) -> Result<Uuid> {
        self.check_write(collection)?;
        let id = Uuid::new_v4();
        let seq = self.next_seq;
        self.next_seq += 1;
        self.docs
            .entry(collection)
            .or_default()
            .insert(seq, (id, strip_id(doc)));
        Ok(id)
    }

    fn update(&mut self, collection: Collection, id: &Uuid, patch: Document) -> Result<()> {
        self.check_write(collection)?;
        let doc = self
            .find_mut(collection, id)
            .ok_or(RollbookError::NotFound {
                collection,
                id: *id,
            })?;
        doc.extend(strip_id(patch));
        Ok(())
    }

    fn delete(&mut self, collection: Collection, id: &Uuid) -> Result<()> {
        self.check_write(collection)?;
        let docs = self.docs.entry(collection).or_default();
        let seq = docs
            .iter()
            .find(|(_, (doc_id, _))| doc_id == id)
            .map(|(seq, _)| *seq)
            .ok_or(RollbookError::NotFound {
                collection,
                id: *id,
            })?;
        docs.remove(&seq);
        Ok(())
    }
}

// --- Test Fixtures ---

#[cfg(any(test, feature = "test_utils"))]
pub mod fixtures {
    use super::*;
    use crate::model::{
        to_document, AttendanceRecord, AttendanceStatus, Batch, Booking, BookingStatus, Entity,
        Invoice, InvoiceStatus, LineItem, Student,
    };
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    pub fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    pub fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    pub fn student(name: &str) -> Student {
        Student {
            name: name.to_string(),
            address: format!("{} Street", name),
            phone: "5550100".to_string(),
            batch: Batch::default(),
            registration_date: day(2024, 1, 15),
        }
    }

    pub fn booking(name: &str, hours: &str, rate: &str, status: BookingStatus) -> Booking {
        let hours = dec(hours);
        let rate = dec(rate);
        Booking {
            student_id: None,
            student_name: name.to_string(),
            date: day(2024, 1, 1),
            start_time: "09:00".to_string(),
            end_time: "10:00".to_string(),
            hours,
            rate_per_hour: rate,
            total_amount: hours * rate,
            status,
        }
    }

    pub fn invoice(number: &str, amount: &str, status: InvoiceStatus) -> Invoice {
        Invoice {
            invoice_number: number.to_string(),
            student_name: "Someone".to_string(),
            date: day(2024, 1, 1),
            amount: dec(amount),
            status,
            items: vec![LineItem {
                description: "Session".to_string(),
                hours: Decimal::ONE,
                rate: dec(amount),
            }],
        }
    }

    pub struct StoreFixture {
        pub store: InMemoryStore,
        pub ids: Vec<Uuid>,
    }

    impl Default for StoreFixture {
        fn default() -> Self {
            Self::new()
        }
    }

    impl StoreFixture {
        pub fn new() -> Self {
            Self {
                store: InMemoryStore::new(),
                ids: Vec::new(),
            }
        }

        pub fn with<T: Entity>(mut self, record: T) -> Self {
            let doc = to_document(&record).unwrap();
            let id = self.store.create(T::COLLECTION, doc).unwrap();
            self.ids.push(id);
            self
        }

        pub fn with_student(self, name: &str) -> Self {
            self.with(student(name))
        }

        pub fn with_booking(self, name: &str, hours: &str, rate: &str, status: BookingStatus) -> Self {
            self.with(booking(name, hours, rate, status))
        }

        pub fn with_attendance(
            self,
            student_id: Uuid,
            name: &str,
            date: NaiveDate,
            status: AttendanceStatus,
        ) -> Self {
            self.with(AttendanceRecord {
                student_id,
                student_name: name.to_string(),
                date,
                status,
                notes: None,
            })
        }
    }
}
