//! # Wall Clock and Calendar
//!
//! The engine never reads the system clock directly. It samples a
//! [`WallClock`] into its [`Calendar`] right before each draw and whenever the
//! timer needs to align to the next second, which keeps every time-dependent
//! path testable with a [`ManualClock`].

use chrono::{DateTime, FixedOffset, Local, Offset, Utc};
use std::cell::Cell;
use std::rc::Rc;

/// Source of the current instant and the device's time zone
pub trait WallClock {
    /// Milliseconds since the Unix epoch
    fn now_millis(&self) -> i64;

    /// Current default time-zone offset
    fn zone(&self) -> FixedOffset;
}

/// The host's real clock and local time zone
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemClock;

impl WallClock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }

    fn zone(&self) -> FixedOffset {
        Local::now().offset().fix()
    }
}

/// Hand-driven clock; clones share the same time and zone.
#[derive(Clone, Debug)]
pub struct ManualClock {
    millis: Rc<Cell<i64>>,
    zone: Rc<Cell<FixedOffset>>,
}

impl ManualClock {
    pub fn new(millis: i64) -> Self {
        Self {
            millis: Rc::new(Cell::new(millis)),
            zone: Rc::new(Cell::new(utc())),
        }
    }

    pub fn set_millis(&self, millis: i64) {
        self.millis.set(millis);
    }

    pub fn advance(&self, millis: i64) {
        self.millis.set(self.millis.get() + millis);
    }

    pub fn set_zone(&self, zone: FixedOffset) {
        self.zone.set(zone);
    }
}

impl WallClock for ManualClock {
    fn now_millis(&self) -> i64 {
        self.millis.get()
    }

    fn zone(&self) -> FixedOffset {
        self.zone.get()
    }
}

fn utc() -> FixedOffset {
    Utc.fix()
}

/// Sampled instant plus the zone it should be shown in
#[derive(Clone, Copy, Debug)]
pub struct Calendar {
    millis: i64,
    zone: FixedOffset,
}

impl Calendar {
    pub fn new(zone: FixedOffset) -> Self {
        Self { millis: 0, zone }
    }

    pub fn set_time_in_millis(&mut self, millis: i64) {
        self.millis = millis;
    }

    pub fn set_time_zone(&mut self, zone: FixedOffset) {
        self.zone = zone;
    }

    pub fn time_zone(&self) -> FixedOffset {
        self.zone
    }

    /// Local date and time of the sampled instant
    pub fn local(&self) -> DateTime<FixedOffset> {
        let utc = DateTime::<Utc>::from_timestamp_millis(self.millis).unwrap_or_default();
        utc.with_timezone(&self.zone)
    }
}
