//! # Interactive Redraw Timer
//!
//! While the face is visible and interactive it redraws once a second. Ticks
//! are aligned to whole seconds of wall-clock time: after a tick at `T` the
//! next one is scheduled `interval - (T mod interval)` ms later, so the
//! seconds never drift against the real clock.
//!
//! The driver does not hold a reference to the engine. It records at most one
//! pending tick, tagged with an epoch. Removing pending ticks bumps the epoch,
//! so a tick that was already handed out before a stop or a teardown carries
//! a stale epoch and is ignored when it arrives.

/// Whether the driver is currently producing ticks
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TimerState {
    Running,
    Stopped,
}

/// A tick message, due at `due_ms` wall-clock time
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TimerTick {
    pub epoch: u64,
    pub due_ms: i64,
}

#[derive(Debug)]
pub struct TimerDriver {
    interval_ms: u64,
    epoch: u64,
    state: TimerState,
    pending: Option<TimerTick>,
}

/// Delay that lands the next tick on the following interval boundary
pub fn aligned_delay(interval_ms: u64, now_ms: i64) -> u64 {
    let interval = interval_ms.max(1) as i64;
    (interval - now_ms.rem_euclid(interval)) as u64
}

impl TimerDriver {
    pub fn new(interval_ms: u64) -> Self {
        Self {
            interval_ms: interval_ms.max(1),
            epoch: 0,
            state: TimerState::Stopped,
            pending: None,
        }
    }

    pub fn state(&self) -> TimerState {
        self.state
    }

    pub fn epoch(&self) -> u64 {
        self.epoch
    }

    /// The tick the host loop should wait for, if any
    pub fn pending(&self) -> Option<TimerTick> {
        self.pending
    }

    /// Drop any pending tick and invalidate ticks already handed out
    pub fn remove_pending(&mut self) {
        self.epoch = self.epoch.wrapping_add(1);
        self.pending = None;
    }

    /// Stop or (re)start depending on `should_run`.
    ///
    /// Starting schedules an immediate tick so the face redraws right away.
    pub fn update(&mut self, should_run: bool, now_ms: i64) {
        self.remove_pending();
        if should_run {
            self.state = TimerState::Running;
            self.pending = Some(TimerTick {
                epoch: self.epoch,
                due_ms: now_ms,
            });
        } else {
            self.state = TimerState::Stopped;
        }
    }

    /// Hand out the pending tick if it is due
    pub fn take_due(&mut self, now_ms: i64) -> Option<TimerTick> {
        match self.pending {
            Some(tick) if tick.due_ms <= now_ms => self.pending.take(),
            _ => None,
        }
    }

    /// Whether `tick` still belongs to the current schedule
    pub fn accepts(&self, tick: TimerTick) -> bool {
        self.state == TimerState::Running && tick.epoch == self.epoch
    }

    /// Schedule the next aligned tick; returns the delay used
    pub fn schedule_next(&mut self, now_ms: i64) -> u64 {
        let delay = aligned_delay(self.interval_ms, now_ms);
        self.pending = Some(TimerTick {
            epoch: self.epoch,
            due_ms: now_ms + delay as i64,
        });
        delay
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_aligned_delay() {
        assert_eq!(aligned_delay(1000, 12_345), 655);
        assert_eq!(aligned_delay(1000, 13_000), 1000);
        assert_eq!(aligned_delay(1000, 13_999), 1);
    }

    #[test]
    fn test_consecutive_ticks_land_on_second_boundaries() {
        let mut timer = TimerDriver::new(1000);
        timer.update(true, 41_730);

        let first = timer.take_due(41_730).unwrap();
        assert!(timer.accepts(first));
        assert_eq!(timer.schedule_next(41_730), 270);

        // Ticks tend to fire a little late; the delay absorbs it
        let second = timer.take_due(42_004).unwrap();
        assert_eq!(second.due_ms, 42_000);
        assert_eq!(timer.schedule_next(42_004), 996);
        assert_eq!(timer.pending().unwrap().due_ms, 43_000);
    }

    #[test]
    fn test_not_due_yet() {
        let mut timer = TimerDriver::new(1000);
        timer.update(true, 0);
        timer.take_due(0).unwrap();
        timer.schedule_next(0);
        assert!(timer.take_due(999).is_none());
        assert!(timer.take_due(1000).is_some());
    }

    #[test]
    fn test_stop_invalidates_handed_out_ticks() {
        let mut timer = TimerDriver::new(1000);
        timer.update(true, 500);
        let tick = timer.take_due(500).unwrap();

        timer.update(false, 600);
        assert_eq!(timer.state(), TimerState::Stopped);
        assert!(timer.pending().is_none());
        assert!(!timer.accepts(tick));

        // Restarting does not revive the old tick either
        timer.update(true, 700);
        assert!(!timer.accepts(tick));
        assert!(timer.accepts(timer.pending().unwrap()));
    }
}
