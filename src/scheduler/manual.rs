//! Deterministic, manually advanced tick sources

use std::{cell::RefCell, rc::Rc, time::Duration};
use tracing::{debug, trace};

use super::{Scheduler, TickCallback};

/// Cancel handle for a tick source registered with [`ManualScheduler`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ManualHandle(u64);

struct Source {
    id: u64,
    interval: Duration,
    /// Clock reading at which the source fires next
    due: Duration,
    callback: Rc<RefCell<TickCallback>>,
}

#[derive(Default)]
struct Sources {
    next_id: u64,
    now: Duration,
    active: Vec<Source>,
}

/// Scheduler whose clock only moves when [`ManualScheduler::advance`] is called
///
/// Clones share the same clock and set of tick sources, so a host can hand
/// one clone to a timer and keep another to drive it.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    sources: Rc<RefCell<Sources>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tick sources currently scheduled
    pub fn pending(&self) -> usize {
        self.sources.borrow().active.len()
    }

    /// Move the clock forward by `elapsed`, firing every tick that falls due
    ///
    /// Ticks fire in time order across all sources; ties go to the source
    /// scheduled first. A source scheduled from inside a callback counts from
    /// the moment it was scheduled, and a cancelled source never fires again.
    pub fn advance(&self, elapsed: Duration) {
        let target = self.sources.borrow().now + elapsed;

        while let Some((id, callback)) = self.next_due(target) {
            trace!("Firing manual tick source {}", id);
            let mut tick = callback.borrow_mut();
            (*tick)();
        }

        self.sources.borrow_mut().now = target;
    }

    /// Pop the earliest tick due at or before `target`, moving the clock to it
    fn next_due(&self, target: Duration) -> Option<(u64, Rc<RefCell<TickCallback>>)> {
        let mut sources = self.sources.borrow_mut();
        let source = sources
            .active
            .iter_mut()
            .filter(|source| source.due <= target)
            .min_by_key(|source| (source.due, source.id))?;

        let due = source.due;
        source.due += source.interval;
        let next = (source.id, Rc::clone(&source.callback));
        sources.now = due;
        Some(next)
    }
}

impl Scheduler for ManualScheduler {
    type Handle = ManualHandle;

    fn schedule_repeating(
        &self,
        callback: TickCallback,
        interval: Duration,
    ) -> Result<ManualHandle, String> {
        let mut sources = self.sources.borrow_mut();
        let id = sources.next_id;
        sources.next_id += 1;
        // A zero interval would never let the clock move past a tick
        let interval = interval.max(Duration::from_nanos(1));
        let due = sources.now + interval;
        sources.active.push(Source {
            id,
            interval,
            due,
            callback: Rc::new(RefCell::new(callback)),
        });

        debug!("Scheduled manual tick source {} every {:?}", id, interval);
        Ok(ManualHandle(id))
    }

    fn cancel(&self, handle: ManualHandle) {
        self.sources
            .borrow_mut()
            .active
            .retain(|source| source.id != handle.0);
        debug!("Cancelled manual tick source {}", handle.0);
    }
}
