//! Filter engine for narrowing record sets
//!
//! Filters are builders over optional criteria. All set criteria are
//! AND-ed together; an unset criterion matches everything for that
//! dimension. Filtering never mutates the input collection, and an empty
//! result set is valid, not an error.

use chrono::NaiveDate;

use crate::error::{Error, Result};
use crate::models::{CancelReason, CancellationRecord, MembershipRecord, MembershipStatus};

/// An inclusive [start, end] date range
///
/// The only constructor validates the bounds, so a held range is always
/// well-formed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Result<Self> {
        if end < start {
            return Err(Error::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

impl From<DateRange> for crate::models::ReportPeriod {
    fn from(range: DateRange) -> Self {
        Self {
            from: range.start.to_string(),
            to: range.end.to_string(),
        }
    }
}

/// Builder for membership record filters
///
/// The lifetime `'query` represents how long the borrowed criteria
/// (plan name, trainer id, search term) must remain valid.
#[derive(Debug, Clone, Default)]
pub struct MembershipFilter<'query> {
    pub range: Option<DateRange>,
    pub status: Option<MembershipStatus>,
    pub plan: Option<&'query str>,
    pub trainer_id: Option<&'query str>,
    pub search: Option<&'query str>,
}

impl<'query> MembershipFilter<'query> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to memberships whose start date falls in the range
    pub fn range(mut self, range: Option<DateRange>) -> Self {
        self.range = range;
        self
    }

    pub fn status(mut self, status: Option<MembershipStatus>) -> Self {
        self.status = status;
        self
    }

    pub fn plan(mut self, plan: Option<&'query str>) -> Self {
        self.plan = plan;
        self
    }

    /// Restrict to a trainer's members (gym-wide when unset)
    pub fn trainer(mut self, trainer_id: Option<&'query str>) -> Self {
        self.trainer_id = trainer_id;
        self
    }

    /// Case-insensitive substring match on member id or plan
    pub fn search(mut self, query: Option<&'query str>) -> Self {
        self.search = query;
        self
    }

    pub fn matches(&self, record: &MembershipRecord) -> bool {
        if let Some(range) = &self.range {
            if !range.contains(record.start_date) {
                return false;
            }
        }
        if let Some(status) = self.status {
            if record.status != status {
                return false;
            }
        }
        if let Some(plan) = self.plan {
            if !record.plan.eq_ignore_ascii_case(plan) {
                return false;
            }
        }
        if let Some(trainer_id) = self.trainer_id {
            match record.trainer_id.as_deref() {
                Some(t) if t.eq_ignore_ascii_case(trainer_id) => {}
                _ => return false,
            }
        }
        if let Some(q) = self.search {
            let q = q.trim().to_lowercase();
            if !q.is_empty()
                && !record.member_id.to_lowercase().contains(&q)
                && !record.plan.to_lowercase().contains(&q)
            {
                return false;
            }
        }
        true
    }

    /// Select the matching subset, preserving input order
    pub fn apply<'a>(&self, records: &'a [MembershipRecord]) -> Vec<&'a MembershipRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }
}

/// Builder for cancellation record filters
#[derive(Debug, Clone, Default)]
pub struct CancellationFilter<'query> {
    pub range: Option<DateRange>,
    pub reason: Option<CancelReason>,
    pub search: Option<&'query str>,
}

impl<'query> CancellationFilter<'query> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Restrict to cancellations dated within the range
    pub fn range(mut self, range: Option<DateRange>) -> Self {
        self.range = range;
        self
    }

    pub fn reason(mut self, reason: Option<CancelReason>) -> Self {
        self.reason = reason;
        self
    }

    /// Case-insensitive substring match on the exit note
    pub fn search(mut self, query: Option<&'query str>) -> Self {
        self.search = query;
        self
    }

    pub fn matches(&self, record: &CancellationRecord) -> bool {
        if let Some(range) = &self.range {
            if !range.contains(record.cancelled_on) {
                return false;
            }
        }
        if let Some(reason) = self.reason {
            if record.reason != reason {
                return false;
            }
        }
        if let Some(q) = self.search {
            let q = q.trim().to_lowercase();
            if !q.is_empty() {
                match &record.note {
                    Some(note) if note.to_lowercase().contains(&q) => {}
                    _ => return false,
                }
            }
        }
        true
    }

    /// Select the matching subset, preserving input order
    pub fn apply<'a>(&self, records: &'a [CancellationRecord]) -> Vec<&'a CancellationRecord> {
        records.iter().filter(|r| self.matches(r)).collect()
    }
}
