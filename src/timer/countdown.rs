//! Countdown timer driven by a host scheduler

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
    thread,
    time::Duration,
};
use tracing::{debug, info, trace, warn};

use super::{
    observers::{ObserverRegistry, Subscription},
    CountdownState,
};
use crate::scheduler::{Scheduler, TokioScheduler};

/// Cadence at which a running countdown ticks
pub const TICK_INTERVAL: Duration = Duration::from_millis(1000);

/// State shared between the timer and its tick callback
struct Core {
    initial_value: i64,
    remaining: Cell<i64>,
    running: Cell<bool>,
    /// Bumped on every start; a tick callback from an older epoch is inert
    epoch: Cell<u64>,
    elapsed_ticks: Cell<u64>,
    observers: Rc<RefCell<ObserverRegistry>>,
}

impl Core {
    fn is_live(&self, epoch: u64) -> bool {
        self.running.get() && self.epoch.get() == epoch
    }

    fn tick(&self, epoch: u64) {
        if !self.is_live(epoch) {
            return;
        }

        let value = self.remaining.get().saturating_sub(1);
        self.remaining.set(value);
        self.elapsed_ticks.set(self.elapsed_ticks.get().saturating_add(1));
        trace!("Countdown ticked to {}", value);

        let _halt = HaltOnUnwind(self);

        // Observers may call back into the timer, so no borrow is held
        // while they run
        let observers = self.observers.borrow().snapshot();
        for (id, observer) in observers {
            if !self.is_live(epoch) {
                debug!("Countdown stopped during notification, skipping remaining observers");
                break;
            }
            if !self.observers.borrow().contains(id) {
                continue;
            }
            observer(value);
        }
    }
}

/// Marks the countdown stopped when an observer unwinds out of a tick, since
/// the unwind also ends the tick source
struct HaltOnUnwind<'a>(&'a Core);

impl Drop for HaltOnUnwind<'_> {
    fn drop(&mut self) {
        if thread::panicking() {
            self.0.running.set(false);
            warn!("Observer panicked, countdown halted at {}", self.0.remaining.get());
        }
    }
}

/// A single integer counter that decrements once per [`TICK_INTERVAL`] and
/// notifies its observers after every tick
///
/// The countdown does not stop at zero. Dropping the timer stops it, which
/// releases its tick source.
pub struct CountdownTimer<S: Scheduler = TokioScheduler> {
    core: Rc<Core>,
    scheduler: S,
    tick_source: RefCell<Option<S::Handle>>,
}

impl CountdownTimer<TokioScheduler> {
    /// Create a countdown ticking on the Tokio event loop
    pub fn new(initial_value: i64) -> Self {
        Self::with_scheduler(initial_value, TokioScheduler::new())
    }
}

impl<S: Scheduler> CountdownTimer<S> {
    /// Create a countdown that asks `scheduler` for its tick source
    pub fn with_scheduler(initial_value: i64, scheduler: S) -> Self {
        Self {
            core: Rc::new(Core {
                initial_value,
                remaining: Cell::new(initial_value),
                running: Cell::new(false),
                epoch: Cell::new(0),
                elapsed_ticks: Cell::new(0),
                observers: Rc::new(RefCell::new(ObserverRegistry::new())),
            }),
            scheduler,
            tick_source: RefCell::new(None),
        }
    }

    /// Start ticking. Does nothing if already running.
    ///
    /// Fails only when the scheduler cannot provide a tick source.
    pub fn start(&self) -> Result<(), String> {
        if self.core.running.get() {
            debug!("Countdown already running, ignoring start");
            return Ok(());
        }

        // Left behind when an observer panic ended the previous tick source
        let stale = self.tick_source.borrow_mut().take();
        if let Some(stale) = stale {
            self.scheduler.cancel(stale);
        }

        let epoch = self.core.epoch.get().wrapping_add(1);
        self.core.epoch.set(epoch);

        let core = Rc::downgrade(&self.core);
        let handle = self.scheduler.schedule_repeating(
            Box::new(move || {
                if let Some(core) = core.upgrade() {
                    core.tick(epoch);
                }
            }),
            TICK_INTERVAL,
        )?;

        *self.tick_source.borrow_mut() = Some(handle);
        self.core.running.set(true);
        info!("Countdown started at {}", self.core.remaining.get());
        Ok(())
    }

    /// Stop ticking and release the tick source. Does nothing if not running.
    ///
    /// No observer is notified after this returns.
    pub fn stop(&self) {
        if !self.core.running.get() {
            debug!("Countdown not running, ignoring stop");
            return;
        }

        self.core.running.set(false);
        let handle = self.tick_source.borrow_mut().take();
        if let Some(handle) = handle {
            self.scheduler.cancel(handle);
        }
        info!("Countdown stopped at {}", self.core.remaining.get());
    }

    /// The scheduler supplying this countdown's tick source
    pub fn scheduler(&self) -> &S {
        &self.scheduler
    }

    pub fn current_value(&self) -> i64 {
        self.core.remaining.get()
    }

    pub fn initial_value(&self) -> i64 {
        self.core.initial_value
    }

    pub fn is_running(&self) -> bool {
        self.core.running.get()
    }

    /// Register an observer called with the new value after each tick
    ///
    /// Observers run in registration order.
    pub fn subscribe<F>(&self, observer: F) -> Subscription
    where
        F: Fn(i64) + 'static,
    {
        let id = self.core.observers.borrow_mut().insert(Rc::new(observer));
        debug!("Observer {} subscribed", id);
        Subscription::new(&self.core.observers, id)
    }

    /// Get a snapshot of the countdown state
    pub fn snapshot(&self) -> CountdownState {
        CountdownState {
            initial_value: self.core.initial_value,
            remaining: self.core.remaining.get(),
            running: self.core.running.get(),
            elapsed_ticks: self.core.elapsed_ticks.get(),
        }
    }
}

impl<S: Scheduler> Drop for CountdownTimer<S> {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scheduler::ManualScheduler;
    use std::panic::{self, AssertUnwindSafe};

    fn recorded(timer: &CountdownTimer<ManualScheduler>) -> Rc<RefCell<Vec<i64>>> {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _subscription = timer.subscribe(move |value| sink.borrow_mut().push(value));
        seen
    }

    fn manual(initial_value: i64) -> (ManualScheduler, CountdownTimer<ManualScheduler>) {
        let host = ManualScheduler::new();
        let timer = CountdownTimer::with_scheduler(initial_value, host.clone());
        (host, timer)
    }

    #[test]
    fn new_timer_holds_initial_value() {
        for initial_value in [0, 1, 7, 3600] {
            let (host, timer) = manual(initial_value);
            assert_eq!(timer.current_value(), initial_value);
            assert_eq!(timer.initial_value(), initial_value);
            assert!(!timer.is_running());
            assert_eq!(host.pending(), 0);
        }
    }

    #[test]
    fn counts_down_past_zero() {
        let (host, timer) = manual(2);
        timer.start().unwrap();

        host.advance(TICK_INTERVAL * 5);

        assert_eq!(timer.current_value(), -3);
        assert_eq!(timer.initial_value(), 2);
        assert_eq!(timer.snapshot().elapsed_ticks, 5);
    }

    #[test]
    fn start_twice_keeps_one_tick_source() {
        let (host, timer) = manual(10);
        let seen = recorded(&timer);

        timer.start().unwrap();
        timer.start().unwrap();
        assert_eq!(host.pending(), 1);

        host.advance(TICK_INTERVAL * 2);
        assert_eq!(*seen.borrow(), vec![9, 8]);
    }

    #[test]
    fn stop_is_idempotent_and_safe_before_start() {
        let (host, timer) = manual(4);
        timer.stop();
        assert!(!timer.is_running());

        timer.start().unwrap();
        host.advance(TICK_INTERVAL);
        timer.stop();
        let once = timer.snapshot();
        timer.stop();

        assert_eq!(timer.snapshot(), once);
        assert_eq!(host.pending(), 0);
    }

    #[test]
    fn restart_resumes_from_current_value() {
        let (host, timer) = manual(5);
        timer.start().unwrap();
        host.advance(TICK_INTERVAL * 2);
        timer.stop();

        host.advance(TICK_INTERVAL * 3);
        assert_eq!(timer.current_value(), 3);

        timer.start().unwrap();
        host.advance(TICK_INTERVAL);
        assert_eq!(timer.current_value(), 2);
    }

    #[test]
    fn observer_stopping_the_timer_silences_the_rest_of_the_round() {
        let (host, timer) = manual(3);
        let timer = Rc::new(timer);

        let handle = Rc::downgrade(&timer);
        let _stopper = timer.subscribe(move |_| {
            if let Some(timer) = handle.upgrade() {
                timer.stop();
            }
        });
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _late = timer.subscribe(move |value| sink.borrow_mut().push(value));

        timer.start().unwrap();
        host.advance(TICK_INTERVAL * 3);

        assert!(seen.borrow().is_empty());
        assert_eq!(timer.current_value(), 2);
        assert_eq!(host.pending(), 0);
    }

    #[test]
    fn observer_restarting_the_timer_keeps_one_tick_source() {
        let (host, timer) = manual(10);
        let timer = Rc::new(timer);

        let handle = Rc::downgrade(&timer);
        let _restarter = timer.subscribe(move |value| {
            if value == 8 {
                if let Some(timer) = handle.upgrade() {
                    timer.stop();
                    timer.start().unwrap();
                }
            }
        });
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        let _recorder = timer.subscribe(move |value| sink.borrow_mut().push(value));

        timer.start().unwrap();
        host.advance(TICK_INTERVAL * 4);

        // The restart at 8 ends that round; afterwards one tick per interval
        assert_eq!(*seen.borrow(), vec![9, 7, 6]);
        assert!(timer.is_running());
        assert_eq!(host.pending(), 1);
    }

    #[test]
    fn observer_panic_halts_the_countdown() {
        let (host, timer) = manual(4);
        let _faulty = timer.subscribe(|value| {
            if value == 2 {
                panic!("display failed at {}", value);
            }
        });

        timer.start().unwrap();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| host.advance(TICK_INTERVAL * 3)));

        assert!(outcome.is_err());
        assert!(!timer.is_running());
        assert_eq!(timer.current_value(), 2);

        // Restarting replaces the dead source instead of adding a second one
        timer.start().unwrap();
        assert_eq!(host.pending(), 1);
        host.advance(TICK_INTERVAL * 2);
        assert_eq!(timer.current_value(), 0);
    }

    #[test]
    fn observer_removed_mid_round_is_not_called() {
        let (host, timer) = manual(3);
        let seen = Rc::new(RefCell::new(Vec::new()));
        let victim: Rc<RefCell<Option<Subscription>>> = Rc::new(RefCell::new(None));

        let remover = Rc::clone(&victim);
        let _first = timer.subscribe(move |_| {
            if let Some(subscription) = remover.borrow_mut().take() {
                assert!(subscription.unsubscribe());
            }
        });
        let sink = Rc::clone(&seen);
        *victim.borrow_mut() = Some(timer.subscribe(move |value| sink.borrow_mut().push(value)));

        timer.start().unwrap();
        host.advance(TICK_INTERVAL * 2);

        assert!(seen.borrow().is_empty());
        assert_eq!(timer.current_value(), 1);
    }

    #[test]
    fn dropping_the_timer_releases_its_tick_source() {
        let (host, timer) = manual(3);
        timer.start().unwrap();
        assert_eq!(host.pending(), 1);

        drop(timer);
        assert_eq!(host.pending(), 0);
        host.advance(TICK_INTERVAL * 2);
    }

    #[test]
    fn decrement_saturates_at_minimum() {
        let (host, timer) = manual(i64::MIN + 1);
        timer.start().unwrap();
        host.advance(TICK_INTERVAL * 3);
        assert_eq!(timer.current_value(), i64::MIN);
    }
}
