//! Record store
//!
//! The analytics layer reads records through the `RecordStore` trait; a
//! real deployment backs it with the CRM's database, while `MemoryStore`
//! serves file-loaded data sets and tests. Passing a store instance
//! explicitly replaces the source CRM's module-level mutable arrays.

use crate::error::{Error, Result};
use crate::ids::{Clock, IdGenerator};
use crate::models::{
    CancelReason, CancellationRecord, MembershipRecord, MembershipStatus, Question,
    SurveyResponse,
};

/// Read access to the raw record collections
pub trait RecordStore {
    fn memberships(&self) -> Result<Vec<MembershipRecord>>;
    fn cancellations(&self) -> Result<Vec<CancellationRecord>>;
    fn questions(&self) -> Result<Vec<Question>>;
    fn responses(&self) -> Result<Vec<SurveyResponse>>;
}

/// In-memory record store
#[derive(Debug, Default)]
pub struct MemoryStore {
    memberships: Vec<MembershipRecord>,
    cancellations: Vec<CancellationRecord>,
    questions: Vec<Question>,
    responses: Vec<SurveyResponse>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_membership(&mut self, record: MembershipRecord) {
        self.memberships.push(record);
    }

    pub fn add_memberships<I: IntoIterator<Item = MembershipRecord>>(&mut self, records: I) {
        self.memberships.extend(records);
    }

    pub fn add_cancellation(&mut self, record: CancellationRecord) {
        self.cancellations.push(record);
    }

    pub fn add_cancellations<I: IntoIterator<Item = CancellationRecord>>(&mut self, records: I) {
        self.cancellations.extend(records);
    }

    pub fn add_question(&mut self, question: Question) {
        self.questions.push(question);
    }

    pub fn add_questions<I: IntoIterator<Item = Question>>(&mut self, questions: I) {
        self.questions.extend(questions);
    }

    pub fn add_response(&mut self, response: SurveyResponse) {
        self.responses.push(response);
    }

    pub fn add_responses<I: IntoIterator<Item = SurveyResponse>>(&mut self, responses: I) {
        self.responses.extend(responses);
    }

    /// Cancel a membership: soft status change plus an immutable
    /// cancellation record
    ///
    /// The id and creation timestamp come from the injected generator and
    /// clock, never from ambient wall-clock state.
    pub fn record_cancellation(
        &mut self,
        membership_id: &str,
        reason: CancelReason,
        cancelled_on: chrono::NaiveDate,
        note: Option<String>,
        ids: &dyn IdGenerator,
        clock: &dyn Clock,
    ) -> Result<CancellationRecord> {
        let membership = self
            .memberships
            .iter_mut()
            .find(|m| m.id == membership_id)
            .ok_or_else(|| Error::NotFound(format!("Membership not found: {}", membership_id)))?;
        membership.status = MembershipStatus::Cancelled;

        let record = CancellationRecord {
            id: ids.next_id("cancel"),
            membership_id: membership_id.to_string(),
            reason,
            cancelled_on,
            note,
            document_ref: None,
            created_at: clock.now(),
        };
        self.cancellations.push(record.clone());
        Ok(record)
    }

    /// Renew a membership: back to active with a new renewal date
    pub fn record_renewal(
        &mut self,
        membership_id: &str,
        renewal_date: chrono::NaiveDate,
    ) -> Result<()> {
        let membership = self
            .memberships
            .iter_mut()
            .find(|m| m.id == membership_id)
            .ok_or_else(|| Error::NotFound(format!("Membership not found: {}", membership_id)))?;
        membership.status = MembershipStatus::Active;
        membership.renewal_date = Some(renewal_date);
        Ok(())
    }

    pub fn membership_count(&self) -> usize {
        self.memberships.len()
    }

    pub fn cancellation_count(&self) -> usize {
        self.cancellations.len()
    }

    pub fn response_count(&self) -> usize {
        self.responses.len()
    }
}

impl RecordStore for MemoryStore {
    fn memberships(&self) -> Result<Vec<MembershipRecord>> {
        Ok(self.memberships.clone())
    }

    fn cancellations(&self) -> Result<Vec<CancellationRecord>> {
        Ok(self.cancellations.clone())
    }

    fn questions(&self) -> Result<Vec<Question>> {
        Ok(self.questions.clone())
    }

    fn responses(&self) -> Result<Vec<SurveyResponse>> {
        Ok(self.responses.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::{FixedClock, SequentialIdGen};
    use chrono::NaiveDate;

    fn membership(id: &str) -> MembershipRecord {
        MembershipRecord {
            id: id.to_string(),
            member_id: format!("member-{}", id),
            plan: "monthly".to_string(),
            monthly_value: 59.0,
            status: MembershipStatus::Active,
            start_date: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            renewal_date: Some(NaiveDate::from_ymd_opt(2024, 7, 1).unwrap()),
            trainer_id: None,
            created_at: FixedClock::at_midnight(2024, 1, 1).now(),
        }
    }

    #[test]
    fn test_record_cancellation_flips_status() {
        let mut store = MemoryStore::new();
        store.add_membership(membership("m1"));

        let ids = SequentialIdGen::new();
        let clock = FixedClock::at_midnight(2024, 6, 15);
        let record = store
            .record_cancellation(
                "m1",
                CancelReason::Price,
                NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(),
                Some("rate hike".to_string()),
                &ids,
                &clock,
            )
            .unwrap();

        assert_eq!(record.id, "cancel-1");
        assert_eq!(record.created_at, clock.now());
        let memberships = store.memberships().unwrap();
        assert_eq!(memberships[0].status, MembershipStatus::Cancelled);
        assert_eq!(store.cancellation_count(), 1);
    }

    #[test]
    fn test_record_cancellation_unknown_membership() {
        let mut store = MemoryStore::new();
        let ids = SequentialIdGen::new();
        let clock = FixedClock::at_midnight(2024, 6, 15);
        let err = store
            .record_cancellation(
                "nope",
                CancelReason::Other,
                NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(),
                None,
                &ids,
                &clock,
            )
            .unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }

    #[test]
    fn test_record_renewal() {
        let mut store = MemoryStore::new();
        let mut m = membership("m1");
        m.status = MembershipStatus::Expired;
        store.add_membership(m);

        let new_date = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();
        store.record_renewal("m1", new_date).unwrap();

        let memberships = store.memberships().unwrap();
        assert_eq!(memberships[0].status, MembershipStatus::Active);
        assert_eq!(memberships[0].renewal_date, Some(new_date));
    }
}
