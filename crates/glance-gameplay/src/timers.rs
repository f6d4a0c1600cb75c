//! Delayed and repeating callback scheduling.
//!
//! The [`TimerManager`] does not own callbacks. The host advances simulated
//! time and then pulls due timers one by one with [`TimerManager::next_due`],
//! dispatching each handle to whoever scheduled it. Because timers are pulled
//! individually, a callback that clears another timer prevents that timer
//! from firing later within the same advance.

use tracing::trace;

/// Tolerance used when comparing due times against the horizon.
const DUE_EPSILON: f64 = 1e-9;

/// Handle to a scheduled timer.
///
/// Handles are generation checked: once a timer is cleared (or a one-shot
/// timer fires) its handle never matches again, even if the slot is reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerHandle {
    index: u32,
    generation: u32,
}

impl TimerHandle {
    /// Handle that refers to no timer.
    pub const INVALID: Self = Self {
        index: u32::MAX,
        generation: 0,
    };

    /// Returns true if this handle was produced by [`TimerManager::set_timer`]
    /// and has not been reset.
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.index != u32::MAX
    }
}

impl Default for TimerHandle {
    fn default() -> Self {
        Self::INVALID
    }
}

#[derive(Debug, Clone)]
struct TimerSlot {
    generation: u32,
    active: bool,
    interval: f64,
    repeating: bool,
    due: f64,
    sequence: u64,
}

/// Scheduler for delayed and repeating timers over simulated time.
#[derive(Debug, Default)]
pub struct TimerManager {
    slots: Vec<TimerSlot>,
    free: Vec<u32>,
    /// Time of the most recently dispatched timer (or the horizon when idle)
    now: f64,
    /// Time the host has advanced to
    horizon: f64,
    next_sequence: u64,
}

impl TimerManager {
    /// Creates an empty scheduler at time zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current simulated time in seconds.
    #[must_use]
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Schedules a timer that first fires `interval` seconds from now.
    ///
    /// A non-positive interval schedules nothing and returns
    /// [`TimerHandle::INVALID`].
    pub fn set_timer(&mut self, interval: f32, repeating: bool) -> TimerHandle {
        if interval <= 0.0 {
            return TimerHandle::INVALID;
        }

        let sequence = self.bump_sequence();
        let interval = f64::from(interval);
        let due = self.now + interval;

        let index = if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.active = true;
            slot.interval = interval;
            slot.repeating = repeating;
            slot.due = due;
            slot.sequence = sequence;
            index
        } else {
            let index = u32::try_from(self.slots.len()).unwrap_or(u32::MAX - 1);
            self.slots.push(TimerSlot {
                generation: 0,
                active: true,
                interval,
                repeating,
                due,
                sequence,
            });
            index
        };

        let handle = TimerHandle {
            index,
            generation: self.slots[index as usize].generation,
        };
        trace!("Timer {:?} set: interval={interval}s repeating={repeating}", handle);
        handle
    }

    /// Cancels a timer and resets the caller's handle.
    ///
    /// Takes effect immediately: the timer cannot fire after this returns.
    pub fn clear_timer(&mut self, handle: &mut TimerHandle) {
        if let Some(slot) = self.slot_mut(*handle) {
            slot.active = false;
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(handle.index);
            trace!("Timer {:?} cleared", handle);
        }
        *handle = TimerHandle::INVALID;
    }

    /// Returns true if the handle refers to a live timer.
    #[must_use]
    pub fn is_timer_active(&self, handle: TimerHandle) -> bool {
        self.slot(handle).is_some()
    }

    /// Seconds until the timer next fires.
    #[must_use]
    pub fn time_remaining(&self, handle: TimerHandle) -> Option<f64> {
        self.slot(handle).map(|slot| (slot.due - self.now).max(0.0))
    }

    /// Number of live timers.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.active).count()
    }

    /// Moves the horizon forward by `dt` seconds.
    pub fn advance(&mut self, dt: f32) {
        if dt > 0.0 {
            self.horizon += f64::from(dt);
        }
    }

    /// Pops the earliest timer due at or before the horizon.
    ///
    /// Sets the current time to the timer's due time. Repeating timers are
    /// rescheduled; one-shot timers are released and their handles go stale.
    /// Returns `None` (and catches the clock up to the horizon) when nothing
    /// else is due.
    pub fn next_due(&mut self) -> Option<TimerHandle> {
        let horizon = self.horizon + DUE_EPSILON;
        let index = self
            .slots
            .iter()
            .enumerate()
            .filter(|(_, slot)| slot.active && slot.due <= horizon)
            .min_by(|(_, a), (_, b)| {
                a.due
                    .total_cmp(&b.due)
                    .then(a.sequence.cmp(&b.sequence))
            })
            .map(|(index, _)| index);

        let Some(index) = index else {
            self.now = self.now.max(self.horizon);
            return None;
        };

        let sequence = self.bump_sequence();
        let slot = &mut self.slots[index];
        let handle = TimerHandle {
            index: u32::try_from(index).unwrap_or(u32::MAX - 1),
            generation: slot.generation,
        };

        self.now = self.now.max(slot.due);
        if slot.repeating {
            slot.due += slot.interval;
            slot.sequence = sequence;
        } else {
            slot.active = false;
            slot.generation = slot.generation.wrapping_add(1);
            self.free.push(handle.index);
        }

        Some(handle)
    }

    fn bump_sequence(&mut self) -> u64 {
        let sequence = self.next_sequence;
        self.next_sequence += 1;
        sequence
    }

    fn slot(&self, handle: TimerHandle) -> Option<&TimerSlot> {
        if !handle.is_valid() {
            return None;
        }
        self.slots
            .get(handle.index as usize)
            .filter(|slot| slot.active && slot.generation == handle.generation)
    }

    fn slot_mut(&mut self, handle: TimerHandle) -> Option<&mut TimerSlot> {
        if !handle.is_valid() {
            return None;
        }
        self.slots
            .get_mut(handle.index as usize)
            .filter(|slot| slot.active && slot.generation == handle.generation)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn drain_due(timers: &mut TimerManager) -> Vec<(TimerHandle, f64)> {
        let mut fired = Vec::new();
        while let Some(handle) = timers.next_due() {
            fired.push((handle, timers.now()));
        }
        fired
    }

    #[test]
    fn test_one_shot_fires_once() {
        let mut timers = TimerManager::new();
        let handle = timers.set_timer(0.5, false);

        timers.advance(0.4);
        assert!(drain_due(&mut timers).is_empty());

        timers.advance(0.2);
        let fired = drain_due(&mut timers);
        assert_eq!(fired.len(), 1);
        assert_eq!(fired[0].0, handle);
        assert!((fired[0].1 - 0.5).abs() < 1e-6);
        assert!(!timers.is_timer_active(handle));
    }

    #[test]
    fn test_repeating_catches_up() {
        let mut timers = TimerManager::new();
        let handle = timers.set_timer(0.25, true);

        timers.advance(1.0);
        let fired = drain_due(&mut timers);
        assert_eq!(fired.len(), 4);
        assert!(fired.iter().all(|(h, _)| *h == handle));
        assert!(timers.is_timer_active(handle));
        assert!((timers.now() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_interleaving_is_ordered_by_due_time() {
        let mut timers = TimerManager::new();
        let slow = timers.set_timer(0.5, true);
        let fast = timers.set_timer(0.25, true);

        timers.advance(1.0);
        let order: Vec<TimerHandle> = drain_due(&mut timers).into_iter().map(|(h, _)| h).collect();
        // Ties go to whichever was scheduled first
        assert_eq!(order, vec![fast, slow, fast, fast, slow, fast]);
    }

    #[test]
    fn test_clear_during_dispatch_prevents_firing() {
        let mut timers = TimerManager::new();
        let first = timers.set_timer(0.1, false);
        let mut second = timers.set_timer(0.2, true);

        timers.advance(1.0);
        assert_eq!(timers.next_due(), Some(first));
        timers.clear_timer(&mut second);
        assert_eq!(second, TimerHandle::INVALID);
        assert_eq!(timers.next_due(), None);
    }

    #[test]
    fn test_stale_handle_does_not_match_reused_slot() {
        let mut timers = TimerManager::new();
        let mut old = timers.set_timer(1.0, true);
        let stale = old;
        timers.clear_timer(&mut old);

        let fresh = timers.set_timer(1.0, true);
        assert!(timers.is_timer_active(fresh));
        assert!(!timers.is_timer_active(stale));

        let mut stale_copy = stale;
        timers.clear_timer(&mut stale_copy);
        assert!(timers.is_timer_active(fresh));
    }

    #[test]
    fn test_non_positive_interval_is_rejected() {
        let mut timers = TimerManager::new();
        let handle = timers.set_timer(0.0, true);
        assert!(!handle.is_valid());
        assert_eq!(timers.active_count(), 0);
    }

    #[test]
    fn test_timer_set_during_dispatch_starts_from_dispatch_time() {
        let mut timers = TimerManager::new();
        timers.set_timer(0.5, false);
        timers.advance(1.0);

        assert!(timers.next_due().is_some());
        let nested = timers.set_timer(0.25, false);
        let remaining = timers.time_remaining(nested).unwrap_or_default();
        assert!((remaining - 0.25).abs() < 1e-6);

        assert_eq!(timers.next_due(), Some(nested));
        assert!((timers.now() - 0.75).abs() < 1e-6);
    }
}
