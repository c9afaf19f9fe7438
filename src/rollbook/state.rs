//! Latest snapshots of the four collections.
//!
//! [`Roster`] subscribes to every collection of a [`LiveStore`] and keeps whatever
//! was pushed last. Each delivery replaces its slot wholesale, so a reader never
//! sees a half-applied change. Derived views (lists, day summaries, totals) are
//! recomputed from these slots on every read.

use crate::error::{RollbookError, Result};
use crate::model::{AttendanceRecord, Booking, Collection, Entity, Invoice, Record, Student};
use crate::store::live::{LiveStore, Snapshot, Subscription};
use crate::store::DataStore;
use std::cell::RefCell;
use std::rc::Rc;

/// One collection as last seen by the feed.
#[derive(Debug, Clone)]
pub enum Slot<T> {
    /// Nothing delivered yet.
    Loading,
    Ready(Vec<Record<T>>),
    /// The feed reported a failure. Distinct from an empty collection.
    Unavailable(String),
}

impl<T> Default for Slot<T> {
    fn default() -> Self {
        Slot::Loading
    }
}

impl<T: Clone> Slot<T> {
    fn records(&self, collection: Collection) -> Result<Vec<Record<T>>> {
        match self {
            Slot::Ready(records) => Ok(records.clone()),
            Slot::Loading => Err(RollbookError::Unavailable {
                collection,
                reason: "not loaded yet".to_string(),
            }),
            Slot::Unavailable(reason) => Err(RollbookError::Unavailable {
                collection,
                reason: reason.clone(),
            }),
        }
    }

    fn apply(&mut self, snapshot: Snapshot<T>) {
        *self = match snapshot {
            Ok(records) => Slot::Ready(records),
            Err(e) => Slot::Unavailable(e.to_string()),
        };
    }
}

#[derive(Debug, Default)]
pub struct Collections {
    pub students: Slot<Student>,
    pub attendance: Slot<AttendanceRecord>,
    pub bookings: Slot<Booking>,
    pub invoices: Slot<Invoice>,
}

pub struct Roster {
    state: Rc<RefCell<Collections>>,
    _subscriptions: Vec<Subscription>,
}

impl Roster {
    /// Subscribes to all four collections. Slots are filled before this returns.
    pub fn attach<S: DataStore>(store: &LiveStore<S>) -> Self {
        let state = Rc::new(RefCell::new(Collections::default()));
        let subscriptions = vec![
            watch::<Student, S>(store, &state, |c| &mut c.students),
            watch::<AttendanceRecord, S>(store, &state, |c| &mut c.attendance),
            watch::<Booking, S>(store, &state, |c| &mut c.bookings),
            watch::<Invoice, S>(store, &state, |c| &mut c.invoices),
        ];
        Self {
            state,
            _subscriptions: subscriptions,
        }
    }

    pub fn students(&self) -> Result<Vec<Record<Student>>> {
        self.state.borrow().students.records(Collection::Students)
    }

    pub fn attendance(&self) -> Result<Vec<Record<AttendanceRecord>>> {
        self.state.borrow().attendance.records(Collection::Attendance)
    }

    pub fn bookings(&self) -> Result<Vec<Record<Booking>>> {
        self.state.borrow().bookings.records(Collection::Bookings)
    }

    pub fn invoices(&self) -> Result<Vec<Record<Invoice>>> {
        self.state.borrow().invoices.records(Collection::Invoices)
    }

    /// Whether any collection is currently unavailable.
    pub fn is_degraded(&self) -> bool {
        let state = self.state.borrow();
        matches!(state.students, Slot::Unavailable(_))
            || matches!(state.attendance, Slot::Unavailable(_))
            || matches!(state.bookings, Slot::Unavailable(_))
            || matches!(state.invoices, Slot::Unavailable(_))
    }
}

fn watch<T, S>(
    store: &LiveStore<S>,
    state: &Rc<RefCell<Collections>>,
    slot: fn(&mut Collections) -> &mut Slot<T>,
) -> Subscription
where
    T: Entity,
    S: DataStore,
{
    let state = Rc::downgrade(state);
    store.subscribe::<T, _>(move |snapshot| {
        if let Some(state) = state.upgrade() {
            slot(&mut state.borrow_mut()).apply(snapshot);
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::BookingStatus;
    use crate::store::memory::fixtures::{booking, student, StoreFixture};

    #[test]
    fn attach_loads_every_collection() {
        let fixture = StoreFixture::new()
            .with_student("Alice")
            .with_booking("Alice", "1", "50", BookingStatus::Paid);
        let live = LiveStore::new(fixture.store);
        let roster = Roster::attach(&live);

        assert_eq!(roster.students().unwrap().len(), 1);
        assert_eq!(roster.bookings().unwrap().len(), 1);
        assert!(roster.attendance().unwrap().is_empty());
        assert!(roster.invoices().unwrap().is_empty());
    }

    #[test]
    fn follows_writes_through_the_feed() {
        let mut live = LiveStore::new(StoreFixture::new().store);
        let roster = Roster::attach(&live);

        live.insert(&student("Bob")).unwrap();
        live.insert(&booking("Bob", "2", "40", BookingStatus::Pending))
            .unwrap();

        assert_eq!(roster.students().unwrap()[0].name, "Bob");
        assert_eq!(roster.bookings().unwrap().len(), 1);
    }

    #[test]
    fn unavailable_feed_is_not_an_empty_list() {
        let mut store = StoreFixture::new().store;
        store.fail_reads(Collection::Invoices);
        let live = LiveStore::new(store);
        let roster = Roster::attach(&live);

        assert!(roster.is_degraded());
        assert!(matches!(
            roster.invoices(),
            Err(RollbookError::Unavailable {
                collection: Collection::Invoices,
                ..
            })
        ));
        assert!(roster.students().unwrap().is_empty());
    }

    #[test]
    fn recovers_when_the_feed_comes_back() {
        let mut store = StoreFixture::new().store;
        store.fail_reads(Collection::Students);
        let mut live = LiveStore::new(store);
        let roster = Roster::attach(&live);
        assert!(roster.students().is_err());

        live.inner_mut().heal(Collection::Students);
        live.refresh(Collection::Students);
        assert!(roster.students().unwrap().is_empty());
        assert!(!roster.is_degraded());
    }
}
