//! Domain models for Retain

use std::collections::BTreeMap;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Membership status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MembershipStatus {
    Active,
    /// Signed up but not yet started
    Pending,
    /// Lapsed without an explicit cancellation
    Expired,
    Cancelled,
}

impl MembershipStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Pending => "pending",
            Self::Expired => "expired",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::str::FromStr for MembershipStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(Self::Active),
            "pending" => Ok(Self::Pending),
            "expired" => Ok(Self::Expired),
            "cancelled" | "canceled" => Ok(Self::Cancelled),
            _ => Err(format!("Unknown membership status: {}", s)),
        }
    }
}

impl std::fmt::Display for MembershipStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A gym membership
///
/// Records are never deleted; cancellation and expiry are soft status
/// changes, with the cancellation details kept in a separate record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MembershipRecord {
    pub id: String,
    pub member_id: String,
    /// Plan name (e.g., "monthly-unlimited", "annual-basic")
    pub plan: String,
    /// Monthly value of the plan
    pub monthly_value: f64,
    pub status: MembershipStatus,
    pub start_date: NaiveDate,
    /// Next renewal date while active; the lapse date once expired
    pub renewal_date: Option<NaiveDate>,
    /// Assigned trainer (None = gym-wide/unassigned)
    pub trainer_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Cancellation reason catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CancelReason {
    Price,
    /// Couldn't fit training into their schedule
    Schedule,
    Relocation,
    /// Unhappy with the service
    Service,
    Health,
    /// Switched to a competing gym
    Competitor,
    Other,
}

impl CancelReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Price => "price",
            Self::Schedule => "schedule",
            Self::Relocation => "relocation",
            Self::Service => "service",
            Self::Health => "health",
            Self::Competitor => "competitor",
            Self::Other => "other",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Price => "Too expensive",
            Self::Schedule => "No time to train",
            Self::Relocation => "Moved away",
            Self::Service => "Unhappy with service",
            Self::Health => "Health reasons",
            Self::Competitor => "Switched gyms",
            Self::Other => "Other",
        }
    }
}

impl std::str::FromStr for CancelReason {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "price" => Ok(Self::Price),
            "schedule" | "time" => Ok(Self::Schedule),
            "relocation" | "moved" => Ok(Self::Relocation),
            "service" => Ok(Self::Service),
            "health" => Ok(Self::Health),
            "competitor" => Ok(Self::Competitor),
            "other" => Ok(Self::Other),
            _ => Err(format!("Unknown cancellation reason: {}", s)),
        }
    }
}

impl std::fmt::Display for CancelReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A membership cancellation
///
/// Created once, immutable after creation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancellationRecord {
    pub id: String,
    pub membership_id: String,
    pub reason: CancelReason,
    pub cancelled_on: NaiveDate,
    /// Free-text note from the exit conversation
    pub note: Option<String>,
    /// Reference to an attached document (e.g., a scanned cancellation form)
    pub document_ref: Option<String>,
    pub created_at: DateTime<Utc>,
}

// ========== Survey Models ==========

/// Survey question types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    /// 1-5 star rating
    Rating,
    /// 0-10 recommendation score
    Nps,
    MultipleChoice,
    FreeText,
    YesNo,
    /// Arbitrary numeric scale
    Scale,
}

impl QuestionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Rating => "rating",
            Self::Nps => "nps",
            Self::MultipleChoice => "multiple_choice",
            Self::FreeText => "free_text",
            Self::YesNo => "yes_no",
            Self::Scale => "scale",
        }
    }
}

impl std::str::FromStr for QuestionKind {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "rating" => Ok(Self::Rating),
            "nps" => Ok(Self::Nps),
            "multiple_choice" => Ok(Self::MultipleChoice),
            "free_text" => Ok(Self::FreeText),
            "yes_no" => Ok(Self::YesNo),
            "scale" => Ok(Self::Scale),
            _ => Err(format!("Unknown question kind: {}", s)),
        }
    }
}

impl std::fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A survey question
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    pub kind: QuestionKind,
    pub text: String,
    /// Options for multiple-choice questions (empty otherwise)
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub choices: Vec<String>,
}

/// A typed answer value
///
/// Answers are an explicit tagged value rather than loose optional fields,
/// so a missing or mistyped answer is a visible branch at the aggregation
/// boundary.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Answer {
    Number(f64),
    Text(String),
    Choice(String),
    YesNo(bool),
}

impl Answer {
    /// Numeric value, if this answer carries one
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) | Self::Choice(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::YesNo(b) => Some(*b),
            _ => None,
        }
    }
}

/// A member's answers to a survey, keyed by question id
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveyResponse {
    pub id: String,
    pub member_id: Option<String>,
    pub submitted_on: NaiveDate,
    pub answers: BTreeMap<String, Answer>,
}

// ========== Report Models ==========

/// Report time granularity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Daily,
    Weekly,
    Monthly,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Daily => "daily",
            Self::Weekly => "weekly",
            Self::Monthly => "monthly",
        }
    }
}

impl std::str::FromStr for Granularity {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "daily" => Ok(Self::Daily),
            "weekly" => Ok(Self::Weekly),
            "monthly" => Ok(Self::Monthly),
            _ => Err(format!(
                "Unknown granularity: {} (valid: daily, weekly, monthly)",
                s
            )),
        }
    }
}

impl std::fmt::Display for Granularity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Report period info
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportPeriod {
    pub from: String,
    pub to: String,
}

/// One bucket of a categorical distribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DistributionBucket {
    pub key: String,
    pub count: i64,
    /// Share of the distribution total, one decimal
    pub percentage: f64,
}

/// Churn statistics for a period
///
/// Derived on demand from the record set; rates are always recomputed,
/// never stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChurnStats {
    pub period: ReportPeriod,
    pub total_cancellations: i64,
    /// Memberships active on the day before the period start
    pub active_at_start: i64,
    /// cancelled / active_at_start, as a percentage with one decimal
    pub churn_rate: f64,
    /// Cancelled monthly value / monthly value active at period start
    pub revenue_churn_rate: f64,
    /// Cancellation reasons, descending by count
    pub reasons: Vec<DistributionBucket>,
    /// Mean lifetime value (months active x monthly value) of churned members
    pub avg_churned_lifetime_value: f64,
}

/// A single data point in a trends report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    pub period: String,
    pub count: i64,
}

/// Cancellations over time
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrendsReport {
    pub granularity: Granularity,
    pub period: ReportPeriod,
    pub data: Vec<TrendPoint>,
}

/// NPS breakdown from 0-10 recommendation scores
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NpsBreakdown {
    /// Promoter percentage minus detractor percentage, rounded to integer
    pub score: i64,
    /// Scores 9-10
    pub promoters: i64,
    /// Scores 7-8 (excluded from the formula, included in the total)
    pub passives: i64,
    /// Scores 0-6
    pub detractors: i64,
    pub total: i64,
}

/// Survey statistics for a period
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SurveySummary {
    pub period: ReportPeriod,
    pub total_responses: i64,
    /// How many members were invited to respond
    pub invited: i64,
    /// responses / invited, as a percentage with one decimal
    pub response_rate: f64,
    /// None when the period has no NPS answers
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nps: Option<NpsBreakdown>,
    /// Mean rating across rating/scale answers; None when there are none
    #[serde(skip_serializing_if = "Option::is_none")]
    pub csat: Option<f64>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_status_roundtrip() {
        for status in [
            MembershipStatus::Active,
            MembershipStatus::Pending,
            MembershipStatus::Expired,
            MembershipStatus::Cancelled,
        ] {
            assert_eq!(MembershipStatus::from_str(status.as_str()), Ok(status));
        }
        assert!(MembershipStatus::from_str("frozen").is_err());
    }

    #[test]
    fn test_cancel_reason_aliases() {
        assert_eq!(CancelReason::from_str("time"), Ok(CancelReason::Schedule));
        assert_eq!(
            CancelReason::from_str("moved"),
            Ok(CancelReason::Relocation)
        );
    }

    #[test]
    fn test_answer_accessors() {
        assert_eq!(Answer::Number(7.0).as_number(), Some(7.0));
        assert_eq!(Answer::Text("fine".into()).as_number(), None);
        assert_eq!(Answer::Choice("classes".into()).as_text(), Some("classes"));
        assert_eq!(Answer::YesNo(true).as_bool(), Some(true));
    }

    #[test]
    fn test_answer_serialization_is_tagged() {
        let json = serde_json::to_string(&Answer::Number(9.0)).unwrap();
        assert!(json.contains("\"kind\":\"number\""));
        let parsed: Answer = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, Answer::Number(9.0));
    }
}
