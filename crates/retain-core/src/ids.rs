//! Injectable clock and id generation
//!
//! The CRM's record layer stamps ids as `<prefix>-<millis>` and timestamps
//! as ISO-8601 wall-clock time. Both are behind traits here so record
//! creation stays deterministic under test; filtering and aggregation never
//! read the clock at all.

use std::sync::atomic::{AtomicU64, Ordering};

use chrono::{DateTime, NaiveDate, TimeZone, Utc};

/// Source of the current time
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;

    fn today(&self) -> NaiveDate {
        self.now().date_naive()
    }

    /// ISO-8601 timestamp string
    fn timestamp(&self) -> String {
        self.now().to_rfc3339()
    }
}

/// Wall-clock time
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// A clock pinned to a single instant, for tests
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(DateTime<Utc>);

impl FixedClock {
    pub fn at(instant: DateTime<Utc>) -> Self {
        Self(instant)
    }

    /// Midnight UTC on the given date
    pub fn at_midnight(year: i32, month: u32, day: u32) -> Self {
        Self(
            Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
                .single()
                .expect("valid date"),
        )
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}

/// Source of fresh record ids
pub trait IdGenerator: Send + Sync {
    fn next_id(&self, prefix: &str) -> String;
}

/// `<prefix>-<millis>` ids, the scheme the CRM's existing records use
#[derive(Debug, Clone, Copy, Default)]
pub struct MillisIdGen<C: Clock = SystemClock> {
    clock: C,
}

impl MillisIdGen<SystemClock> {
    pub fn new() -> Self {
        Self { clock: SystemClock }
    }
}

impl<C: Clock> MillisIdGen<C> {
    pub fn with_clock(clock: C) -> Self {
        Self { clock }
    }
}

impl<C: Clock> IdGenerator for MillisIdGen<C> {
    fn next_id(&self, prefix: &str) -> String {
        format!("{}-{}", prefix, self.clock.now().timestamp_millis())
    }
}

/// Monotonic counter ids, for deterministic tests
#[derive(Debug, Default)]
pub struct SequentialIdGen {
    counter: AtomicU64,
}

impl SequentialIdGen {
    pub fn new() -> Self {
        Self::default()
    }
}

impl IdGenerator for SequentialIdGen {
    fn next_id(&self, prefix: &str) -> String {
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        format!("{}-{}", prefix, n)
    }
}
