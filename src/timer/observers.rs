//! Observer registry and unsubscribe handles

use std::{
    cell::RefCell,
    rc::{Rc, Weak},
};
use tracing::debug;

/// Callback receiving the new remaining value after each tick
pub type Observer = Rc<dyn Fn(i64)>;

/// Observers in registration order
#[derive(Default)]
pub(crate) struct ObserverRegistry {
    next_id: u64,
    entries: Vec<(u64, Observer)>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an observer and return its id
    pub fn insert(&mut self, observer: Observer) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push((id, observer));
        id
    }

    /// Remove an observer, returning whether it was present
    pub fn remove(&mut self, id: u64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry_id, _)| *entry_id != id);
        self.entries.len() != before
    }

    pub fn contains(&self, id: u64) -> bool {
        self.entries.iter().any(|(entry_id, _)| *entry_id == id)
    }

    /// Copy of the current observers so they can be called without holding
    /// a borrow on the registry
    pub fn snapshot(&self) -> Vec<(u64, Observer)> {
        self.entries
            .iter()
            .map(|(id, observer)| (*id, Rc::clone(observer)))
            .collect()
    }
}

/// Handle returned by `CountdownTimer::subscribe`
///
/// Dropping the handle leaves the observer registered; call
/// [`Subscription::unsubscribe`] to remove it.
#[derive(Debug)]
pub struct Subscription {
    registry: Weak<RefCell<ObserverRegistry>>,
    id: u64,
}

impl Subscription {
    pub(crate) fn new(registry: &Rc<RefCell<ObserverRegistry>>, id: u64) -> Self {
        Self {
            registry: Rc::downgrade(registry),
            id,
        }
    }

    /// Remove the observer. Returns `false` if it was already gone or the
    /// timer no longer exists.
    pub fn unsubscribe(self) -> bool {
        let Some(registry) = self.registry.upgrade() else {
            return false;
        };
        let removed = registry.borrow_mut().remove(self.id);
        debug!("Observer {} unsubscribed (removed={})", self.id, removed);
        removed
    }
}
