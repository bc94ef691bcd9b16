//! Churn and survey report assembly
//!
//! `ChurnAnalyzer` borrows a record store, narrows the record set through
//! the filter engine, and hands the result to the aggregation primitives in
//! `stats`. Every report is derived on demand; nothing here is cached or
//! persisted.

use std::collections::{HashMap, HashSet};

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::error::Result;
use crate::filter::{CancellationFilter, DateRange, MembershipFilter};
use crate::models::{
    CancellationRecord, ChurnStats, DistributionBucket, Granularity, MembershipRecord,
    MembershipStatus, QuestionKind, SurveySummary, TrendsReport,
};
use crate::stats;
use crate::store::RecordStore;

/// Analyzer configuration
#[derive(Debug, Clone)]
pub struct AnalyzerConfig {
    /// Churn rate (percent) above which report assembly logs a warning
    pub churn_warn_threshold: f64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            churn_warn_threshold: 5.0,
        }
    }
}

/// Assembles churn and survey reports from a record store
pub struct ChurnAnalyzer<'a> {
    store: &'a dyn RecordStore,
    config: AnalyzerConfig,
}

impl<'a> ChurnAnalyzer<'a> {
    pub fn new(store: &'a dyn RecordStore) -> Self {
        Self {
            store,
            config: AnalyzerConfig::default(),
        }
    }

    pub fn with_config(store: &'a dyn RecordStore, config: AnalyzerConfig) -> Self {
        Self { store, config }
    }

    /// Memberships that were active on the given date
    ///
    /// Uses the record dates rather than the current status field: a
    /// membership counts if it had started by `date` and had neither been
    /// cancelled nor lapsed by then. Pending memberships have not started.
    pub fn active_on(&self, date: NaiveDate) -> Result<Vec<MembershipRecord>> {
        let memberships = self.store.memberships()?;
        let cancellations = self.store.cancellations()?;
        let cancelled_on: HashMap<String, NaiveDate> = cancellations
            .iter()
            .map(|c| (c.membership_id.clone(), c.cancelled_on))
            .collect();

        Ok(memberships
            .into_iter()
            .filter(|m| was_active_on(m, date, cancelled_on.get(&m.id).copied()))
            .collect())
    }

    /// Churn statistics for the period, optionally scoped to one trainer
    ///
    /// The denominator is the count of memberships active on the day before
    /// the period start, computed from the records themselves.
    pub fn churn_stats(&self, range: DateRange, trainer: Option<&str>) -> Result<ChurnStats> {
        let scope = MembershipFilter::new().trainer(trainer);
        let day_before = range.start().pred_opt().unwrap_or_else(|| range.start());
        let active_start: Vec<MembershipRecord> = self
            .active_on(day_before)?
            .into_iter()
            .filter(|m| scope.matches(m))
            .collect();

        let (memberships, cancelled) = self.scoped_cancellations(range, trainer)?;
        let by_id: HashMap<&str, &MembershipRecord> =
            memberships.iter().map(|m| (m.id.as_str(), m)).collect();

        let value_at_start: f64 = active_start.iter().map(|m| m.monthly_value).sum();
        let cancelled_value: f64 = cancelled
            .iter()
            .filter_map(|c| by_id.get(c.membership_id.as_str()))
            .map(|m| m.monthly_value)
            .sum();

        // Lifetime value needs the membership's start date; cancellations
        // that reference an unknown membership are skipped here, which is
        // the visible branch for that missing data.
        let lifetime_values: Vec<f64> = cancelled
            .iter()
            .filter_map(|c| {
                by_id.get(c.membership_id.as_str()).map(|m| {
                    stats::months_active(m.start_date, c.cancelled_on) as f64 * m.monthly_value
                })
            })
            .collect();

        let churn_rate = stats::churn_rate(cancelled.len() as i64, active_start.len() as i64);
        if churn_rate > self.config.churn_warn_threshold {
            warn!(
                churn_rate,
                threshold = self.config.churn_warn_threshold,
                "Churn rate above threshold"
            );
        }
        debug!(
            cancellations = cancelled.len(),
            active_at_start = active_start.len(),
            "Assembled churn stats"
        );

        Ok(ChurnStats {
            period: range.into(),
            total_cancellations: cancelled.len() as i64,
            active_at_start: active_start.len() as i64,
            churn_rate,
            revenue_churn_rate: stats::revenue_churn_rate(cancelled_value, value_at_start),
            reasons: stats::distribution(&cancelled, |c| c.reason.as_str().to_string()),
            avg_churned_lifetime_value: stats::average(&lifetime_values),
        })
    }

    /// Which plans the period's churned members were on
    pub fn plan_distribution(
        &self,
        range: DateRange,
        trainer: Option<&str>,
    ) -> Result<Vec<DistributionBucket>> {
        let (memberships, cancelled) = self.scoped_cancellations(range, trainer)?;
        let by_id: HashMap<&str, &MembershipRecord> =
            memberships.iter().map(|m| (m.id.as_str(), m)).collect();

        let plans: Vec<String> = cancelled
            .iter()
            .filter_map(|c| by_id.get(c.membership_id.as_str()))
            .map(|m| m.plan.clone())
            .collect();
        Ok(stats::distribution(&plans, |p| p.clone()))
    }

    /// Cancellations over time at the given granularity
    pub fn cancellation_trends(
        &self,
        range: DateRange,
        granularity: Granularity,
        trainer: Option<&str>,
    ) -> Result<TrendsReport> {
        let (_, cancelled) = self.scoped_cancellations(range, trainer)?;
        let dates: Vec<NaiveDate> = cancelled.iter().map(|c| c.cancelled_on).collect();
        Ok(TrendsReport {
            granularity,
            period: range.into(),
            data: stats::time_buckets(&dates, granularity),
        })
    }

    /// Survey statistics for the period
    ///
    /// `invited` is how many members received the survey; the store only
    /// holds responses, so the caller supplies it.
    pub fn survey_summary(&self, range: DateRange, invited: i64) -> Result<SurveySummary> {
        let questions = self.store.questions()?;
        let responses = self.store.responses()?;

        let nps_questions: HashSet<&str> = questions
            .iter()
            .filter(|q| q.kind == QuestionKind::Nps)
            .map(|q| q.id.as_str())
            .collect();
        let rating_questions: HashSet<&str> = questions
            .iter()
            .filter(|q| matches!(q.kind, QuestionKind::Rating | QuestionKind::Scale))
            .map(|q| q.id.as_str())
            .collect();

        let mut scores: Vec<i64> = Vec::new();
        let mut ratings: Vec<f64> = Vec::new();
        let mut total_responses = 0i64;
        for response in &responses {
            if !range.contains(response.submitted_on) {
                continue;
            }
            total_responses += 1;
            for (question_id, answer) in &response.answers {
                if nps_questions.contains(question_id.as_str()) {
                    // Non-numeric or out-of-range answers to an NPS question
                    // are dropped, not coerced
                    if let Some(n) = answer.as_number() {
                        if (0.0..=10.0).contains(&n) {
                            scores.push(n.round() as i64);
                        }
                    }
                } else if rating_questions.contains(question_id.as_str()) {
                    if let Some(n) = answer.as_number() {
                        ratings.push(n);
                    }
                }
            }
        }

        debug!(
            responses = total_responses,
            nps_answers = scores.len(),
            rating_answers = ratings.len(),
            "Assembled survey summary"
        );

        Ok(SurveySummary {
            period: range.into(),
            total_responses,
            invited,
            response_rate: stats::response_rate(total_responses, invited),
            nps: if scores.is_empty() {
                None
            } else {
                Some(stats::nps_breakdown(&scores))
            },
            csat: if ratings.is_empty() {
                None
            } else {
                Some(stats::csat(&ratings))
            },
        })
    }

    /// Cancellations in the window restricted to the trainer scope, plus
    /// the full membership set for joins
    fn scoped_cancellations(
        &self,
        range: DateRange,
        trainer: Option<&str>,
    ) -> Result<(Vec<MembershipRecord>, Vec<CancellationRecord>)> {
        let memberships = self.store.memberships()?;
        let cancellations = self.store.cancellations()?;

        let scope = MembershipFilter::new().trainer(trainer);
        let window = CancellationFilter::new().range(Some(range));
        let by_id: HashMap<&str, &MembershipRecord> =
            memberships.iter().map(|m| (m.id.as_str(), m)).collect();

        let selected: Vec<CancellationRecord> = cancellations
            .iter()
            .filter(|c| window.matches(c))
            .filter(|c| match by_id.get(c.membership_id.as_str()) {
                Some(m) => scope.matches(m),
                // A cancellation with no matching membership cannot be
                // attributed to a trainer; it still counts gym-wide
                None => trainer.is_none(),
            })
            .cloned()
            .collect();

        Ok((memberships, selected))
    }
}

fn was_active_on(
    membership: &MembershipRecord,
    date: NaiveDate,
    cancelled_on: Option<NaiveDate>,
) -> bool {
    if membership.status == MembershipStatus::Pending {
        return false;
    }
    if membership.start_date > date {
        return false;
    }
    if let Some(cancelled) = cancelled_on {
        if cancelled <= date {
            return false;
        }
    }
    if membership.status == MembershipStatus::Expired {
        if let Some(lapsed) = membership.renewal_date {
            if lapsed <= date {
                return false;
            }
        }
    }
    true
}
