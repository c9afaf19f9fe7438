//! Push-based feed over any [`DataStore`].
//!
//! A subscriber registers a listener for one collection and gets back a
//! [`Subscription`] handle. The listener is called with the full current
//! collection right away and again after every successful write to that
//! collection. Dropping or calling [`Subscription::unsubscribe`] stops delivery.
//!
//! Writes are never applied to subscribers optimistically: a listener only sees a
//! change once the underlying store reports it in a fresh snapshot. When that
//! snapshot cannot be read, listeners receive [`RollbookError::Unavailable`]
//! instead of an empty collection.
//!
//! Everything here is single-threaded; listeners may subscribe or unsubscribe
//! from inside a callback.

use super::DataStore;
use crate::error::{RollbookError, Result};
use crate::model::{to_document, Collection, Document, Entity, Record};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};
use std::rc::{Rc, Weak};
use uuid::Uuid;

/// What a listener receives: the whole collection, or why it could not be read.
pub type Snapshot<T> = Result<Vec<Record<T>>>;

type Outcome = std::result::Result<Vec<Document>, String>;
type Listener = Box<dyn FnMut(&Outcome)>;

#[derive(Default)]
struct Registry {
    next_id: u64,
    listeners: HashMap<Collection, Vec<(u64, Listener)>>,
    // Unsubscribed while their collection was being dispatched.
    cancelled: HashSet<u64>,
}

impl Registry {
    fn remove(&mut self, collection: Collection, id: u64) {
        let found = self
            .listeners
            .get_mut(&collection)
            .and_then(|list| {
                list.iter()
                    .position(|(lid, _)| *lid == id)
                    .map(|pos| list.remove(pos))
            })
            .is_some();
        if !found {
            self.cancelled.insert(id);
        }
    }
}

/// Handle for a live subscription. Delivery stops when it is dropped.
#[must_use = "dropping a Subscription unsubscribes immediately"]
pub struct Subscription {
    id: u64,
    collection: Collection,
    registry: Weak<RefCell<Registry>>,
}

impl Subscription {
    pub fn collection(&self) -> Collection {
        self.collection
    }

    pub fn unsubscribe(self) {
        // Drop does the work.
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.upgrade() {
            registry.borrow_mut().remove(self.collection, self.id);
            tracing::debug!(collection = %self.collection, id = self.id, "unsubscribed");
        }
    }
}

pub struct LiveStore<S: DataStore> {
    inner: S,
    registry: Rc<RefCell<Registry>>,
}

impl<S: DataStore> LiveStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            registry: Rc::new(RefCell::new(Registry::default())),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut S {
        &mut self.inner
    }

    /// Number of active listeners on a collection.
    pub fn listener_count(&self, collection: Collection) -> usize {
        self.registry
            .borrow()
            .listeners
            .get(&collection)
            .map_or(0, Vec::len)
    }

    /// Registers `listener` for `T`'s collection and delivers the current snapshot.
    pub fn subscribe<T, F>(&self, mut listener: F) -> Subscription
    where
        T: Entity,
        F: FnMut(Snapshot<T>) + 'static,
    {
        let collection = T::COLLECTION;
        let mut boxed: Listener = Box::new(move |outcome: &Outcome| {
            listener(decode::<T>(collection, outcome));
        });

        // Initial delivery happens before registration so it cannot re-enter dispatch.
        boxed(&self.read(collection));

        let id = {
            let mut reg = self.registry.borrow_mut();
            let id = reg.next_id;
            reg.next_id += 1;
            reg.listeners.entry(collection).or_default().push((id, boxed));
            id
        };
        tracing::debug!(%collection, id, "subscribed");

        Subscription {
            id,
            collection,
            registry: Rc::downgrade(&self.registry),
        }
    }

    /// Re-reads a collection and pushes it to its listeners.
    pub fn refresh(&self, collection: Collection) {
        let outcome = self.read(collection);
        self.dispatch(collection, &outcome);
    }

    /// One-shot typed read of `T`'s collection.
    pub fn records<T: Entity>(&self) -> Result<Vec<Record<T>>> {
        self.inner
            .snapshot(T::COLLECTION)?
            .into_iter()
            .map(Record::from_document)
            .collect()
    }

    pub fn insert<T: Entity>(&mut self, record: &T) -> Result<Uuid> {
        self.create(T::COLLECTION, to_document(record)?)
    }

    fn read(&self, collection: Collection) -> Outcome {
        self.inner.snapshot(collection).map_err(|e| {
            tracing::warn!(%collection, error = %e, "snapshot failed");
            e.to_string()
        })
    }

    fn dispatch(&self, collection: Collection, outcome: &Outcome) {
        let mut current = self
            .registry
            .borrow_mut()
            .listeners
            .remove(&collection)
            .unwrap_or_default();

        for (_, listener) in current.iter_mut() {
            listener(outcome);
        }

        let mut reg = self.registry.borrow_mut();
        current.retain(|(id, _)| !reg.cancelled.remove(id));
        if let Some(added) = reg.listeners.remove(&collection) {
            current.extend(added);
        }
        if !current.is_empty() {
            reg.listeners.insert(collection, current);
        }
    }
}

impl<S: DataStore> DataStore for LiveStore<S> {
    fn snapshot(&self, collection: Collection) -> Result<Vec<Document>> {
        self.inner.snapshot(collection)
    }

    fn create(&mut self, collection: Collection, doc: Document) -> Result<Uuid> {
        let id = self.inner.create(collection, doc)?;
        tracing::debug!(%collection, %id, "created");
        self.refresh(collection);
        Ok(id)
    }

    fn update(&mut self, collection: Collection, id: &Uuid, patch: Document) -> Result<()> {
        self.inner.update(collection, id, patch)?;
        tracing::debug!(%collection, %id, "updated");
        self.refresh(collection);
        Ok(())
    }

    fn delete(&mut self, collection: Collection, id: &Uuid) -> Result<()> {
        self.inner.delete(collection, id)?;
        tracing::debug!(%collection, %id, "deleted");
        self.refresh(collection);
        Ok(())
    }
}

fn decode<T: Entity>(collection: Collection, outcome: &Outcome) -> Snapshot<T> {
    let docs = outcome
        .as_ref()
        .map_err(|reason| RollbookError::Unavailable {
            collection,
            reason: reason.clone(),
        })?;
    docs.iter()
        .cloned()
        .map(Record::from_document)
        .collect::<Result<Vec<_>>>()
        .map_err(|e| RollbookError::Unavailable {
            collection,
            reason: e.to_string(),
        })
}
