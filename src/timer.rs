//! Repeating timers and a monotonic clock
//!
//! The loop and the held-down repeat both run on a [`Scheduler`]. In the
//! browser that is `setInterval`; [`ManualScheduler`] runs on virtual time
//! for headless runs and tests.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::error::PodiumError;

/// Identifies a running interval
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IntervalHandle(pub u64);

/// Single-threaded timer source.
///
/// Callbacks run on the same thread as input handlers, one at a time.
pub trait Scheduler {
    /// Monotonic time in milliseconds
    fn now_ms(&self) -> f64;

    fn set_interval(
        &self,
        period_ms: u32,
        callback: Box<dyn FnMut()>,
    ) -> Result<IntervalHandle, PodiumError>;

    /// Cancel an interval. Unknown or already-cancelled handles are ignored.
    fn clear_interval(&self, handle: IntervalHandle);
}

struct ManualInterval {
    handle: IntervalHandle,
    period_ms: f64,
    next_due: f64,
    callback: Rc<RefCell<Box<dyn FnMut()>>>,
}

/// Virtual-time scheduler. Time only moves when [`ManualScheduler::advance`]
/// is called; due callbacks fire in deadline order.
#[derive(Default)]
pub struct ManualScheduler {
    now_ms: Cell<f64>,
    next_id: Cell<u64>,
    intervals: RefCell<Vec<ManualInterval>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of intervals still scheduled
    pub fn active_intervals(&self) -> usize {
        self.intervals.borrow().len()
    }

    /// Move time forward by `ms`, firing every callback that falls due
    pub fn advance(&self, ms: f64) {
        let target = self.now_ms.get() + ms;

        loop {
            // Borrow is released before the callback runs so it may schedule
            // or cancel intervals itself
            let due = {
                let intervals = self.intervals.borrow();
                intervals
                    .iter()
                    .filter(|i| i.next_due <= target)
                    .min_by(|a, b| a.next_due.total_cmp(&b.next_due))
                    .map(|i| (i.handle, i.next_due, Rc::clone(&i.callback)))
            };
            let Some((handle, due_at, callback)) = due else {
                break;
            };

            self.now_ms.set(due_at);
            if let Some(interval) = self
                .intervals
                .borrow_mut()
                .iter_mut()
                .find(|i| i.handle == handle)
            {
                interval.next_due += interval.period_ms;
            }

            (callback.borrow_mut())();
        }

        self.now_ms.set(target);
    }
}

impl Scheduler for ManualScheduler {
    fn now_ms(&self) -> f64 {
        self.now_ms.get()
    }

    fn set_interval(
        &self,
        period_ms: u32,
        callback: Box<dyn FnMut()>,
    ) -> Result<IntervalHandle, PodiumError> {
        let id = self.next_id.get();
        self.next_id.set(id + 1);
        let handle = IntervalHandle(id);

        // Browsers clamp to at least 1ms; a zero period would never let time advance
        let period_ms = f64::from(period_ms.max(1));
        self.intervals.borrow_mut().push(ManualInterval {
            handle,
            period_ms,
            next_due: self.now_ms.get() + period_ms,
            callback: Rc::new(RefCell::new(callback)),
        });
        Ok(handle)
    }

    fn clear_interval(&self, handle: IntervalHandle) {
        self.intervals.borrow_mut().retain(|i| i.handle != handle);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter() -> (Rc<Cell<u32>>, Box<dyn FnMut()>) {
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        (count, Box::new(move || c.set(c.get() + 1)))
    }

    #[test]
    fn test_interval_fires_once_per_period() {
        let scheduler = ManualScheduler::new();
        let (count, cb) = counter();
        scheduler.set_interval(25, cb).unwrap();

        scheduler.advance(24.0);
        assert_eq!(count.get(), 0);
        scheduler.advance(1.0);
        assert_eq!(count.get(), 1);
        scheduler.advance(100.0);
        assert_eq!(count.get(), 5);
        assert_eq!(scheduler.now_ms(), 125.0);
    }

    #[test]
    fn test_clear_interval_stops_firing() {
        let scheduler = ManualScheduler::new();
        let (count, cb) = counter();
        let handle = scheduler.set_interval(10, cb).unwrap();
        scheduler.advance(30.0);
        scheduler.clear_interval(handle);
        scheduler.clear_interval(handle);
        scheduler.advance(100.0);
        assert_eq!(count.get(), 3);
        assert_eq!(scheduler.active_intervals(), 0);
    }

    #[test]
    fn test_callbacks_fire_in_deadline_order() {
        let scheduler = Rc::new(ManualScheduler::new());
        let order = Rc::new(RefCell::new(Vec::new()));

        let o = Rc::clone(&order);
        scheduler
            .set_interval(30, Box::new(move || o.borrow_mut().push("slow")))
            .unwrap();
        let o = Rc::clone(&order);
        scheduler
            .set_interval(20, Box::new(move || o.borrow_mut().push("fast")))
            .unwrap();

        // At the 60ms tie the earlier registration fires first
        scheduler.advance(60.0);
        assert_eq!(*order.borrow(), ["fast", "slow", "fast", "slow", "fast"]);
    }

    #[test]
    fn test_callback_can_cancel_other_interval() {
        let scheduler = Rc::new(ManualScheduler::new());
        let (count, cb) = counter();
        let victim = scheduler.set_interval(50, cb).unwrap();

        let s = Rc::clone(&scheduler);
        scheduler
            .set_interval(10, Box::new(move || s.clear_interval(victim)))
            .unwrap();

        scheduler.advance(200.0);
        assert_eq!(count.get(), 0);
    }
}
