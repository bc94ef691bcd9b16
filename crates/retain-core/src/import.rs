//! CSV import parsers for CRM record exports
//!
//! Four file shapes are supported, distinguished by header line:
//! memberships, cancellations, survey questions, and survey responses
//! (one row per answer, grouped by response id). Duplicate rows within a
//! file are dropped via a content hash.

use std::collections::{HashMap, HashSet};
use std::io::Read;
use std::str::FromStr;

use chrono::NaiveDate;
use csv::ReaderBuilder;
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::error::{Error, Result};
use crate::ids::Clock;
use crate::models::{
    Answer, CancelReason, CancellationRecord, MembershipRecord, MembershipStatus, Question,
    QuestionKind, SurveyResponse,
};

pub const MEMBERSHIP_HEADER: &str =
    "id,member_id,plan,monthly_value,status,start_date,renewal_date,trainer_id";
pub const CANCELLATION_HEADER: &str = "id,membership_id,reason,cancelled_on,note,document_ref";
pub const QUESTION_HEADER: &str = "id,kind,text,choices";
pub const RESPONSE_HEADER: &str = "response_id,member_id,submitted_on,question_id,kind,value";

/// Which record collection a CSV file holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Memberships,
    Cancellations,
    Questions,
    Responses,
}

impl RecordKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Memberships => "memberships",
            Self::Cancellations => "cancellations",
            Self::Questions => "questions",
            Self::Responses => "responses",
        }
    }
}

impl std::fmt::Display for RecordKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Detect the record kind from a CSV header line
///
/// Returns None if the header matches no known export shape.
pub fn detect_record_kind(header: &str) -> Option<RecordKind> {
    let header = header.trim();

    if header.starts_with("id,member_id,plan") {
        return Some(RecordKind::Memberships);
    }
    if header.starts_with("id,membership_id,reason") {
        return Some(RecordKind::Cancellations);
    }
    if header.starts_with("id,kind,text") {
        return Some(RecordKind::Questions);
    }
    // Response exports are one row per answer
    if header.starts_with("response_id,member_id,submitted_on") {
        return Some(RecordKind::Responses);
    }

    None
}

/// Content hash of a CSV row, for deduplication
pub fn record_hash(fields: &[&str]) -> String {
    let mut hasher = Sha256::new();
    for field in fields {
        hasher.update(field.as_bytes());
        hasher.update([0u8]);
    }
    hex::encode(hasher.finalize())
}

/// Parse a membership export
///
/// `created_at` on the parsed records comes from the injected clock, so
/// imports are deterministic under test.
pub fn parse_memberships_csv<R: Read>(
    reader: R,
    clock: &dyn Clock,
) -> Result<Vec<MembershipRecord>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut seen: HashSet<String> = HashSet::new();
    let mut records = Vec::new();
    let mut skipped = 0usize;

    for result in rdr.records() {
        let row = result?;
        let fields: Vec<&str> = row.iter().collect();
        if !seen.insert(record_hash(&fields)) {
            skipped += 1;
            continue;
        }

        let id = required(&row, 0, "id")?;
        let member_id = required(&row, 1, "member_id")?;
        let plan = required(&row, 2, "plan")?;
        let monthly_value = parse_amount(&required(&row, 3, "monthly_value")?)?;
        let status = MembershipStatus::from_str(&required(&row, 4, "status")?)
            .map_err(Error::InvalidData)?;
        let start_date = parse_date(&required(&row, 5, "start_date")?)?;
        let renewal_date = optional(&row, 6).map(|s| parse_date(&s)).transpose()?;
        let trainer_id = optional(&row, 7);

        records.push(MembershipRecord {
            id,
            member_id,
            plan,
            monthly_value,
            status,
            start_date,
            renewal_date,
            trainer_id,
            created_at: clock.now(),
        });
    }

    debug!(
        imported = records.len(),
        skipped, "Parsed membership export"
    );
    Ok(records)
}

/// Parse a cancellation export
pub fn parse_cancellations_csv<R: Read>(
    reader: R,
    clock: &dyn Clock,
) -> Result<Vec<CancellationRecord>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut seen: HashSet<String> = HashSet::new();
    let mut records = Vec::new();
    let mut skipped = 0usize;

    for result in rdr.records() {
        let row = result?;
        let fields: Vec<&str> = row.iter().collect();
        if !seen.insert(record_hash(&fields)) {
            skipped += 1;
            continue;
        }

        let id = required(&row, 0, "id")?;
        let membership_id = required(&row, 1, "membership_id")?;
        let reason =
            CancelReason::from_str(&required(&row, 2, "reason")?).map_err(Error::InvalidData)?;
        let cancelled_on = parse_date(&required(&row, 3, "cancelled_on")?)?;
        let note = optional(&row, 4);
        let document_ref = optional(&row, 5);

        records.push(CancellationRecord {
            id,
            membership_id,
            reason,
            cancelled_on,
            note,
            document_ref,
            created_at: clock.now(),
        });
    }

    debug!(
        imported = records.len(),
        skipped, "Parsed cancellation export"
    );
    Ok(records)
}

/// Parse a survey question export
pub fn parse_questions_csv<R: Read>(reader: R) -> Result<Vec<Question>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut questions = Vec::new();
    for result in rdr.records() {
        let row = result?;
        let id = required(&row, 0, "id")?;
        let kind =
            QuestionKind::from_str(&required(&row, 1, "kind")?).map_err(Error::InvalidData)?;
        let text = required(&row, 2, "text")?;
        // Choices are pipe-separated in the export
        let choices = optional(&row, 3)
            .map(|s| s.split('|').map(|c| c.trim().to_string()).collect())
            .unwrap_or_default();

        questions.push(Question {
            id,
            kind,
            text,
            choices,
        });
    }

    debug!(imported = questions.len(), "Parsed question export");
    Ok(questions)
}

/// Parse a survey response export (one row per answer)
///
/// Rows are grouped by response id, preserving first-seen response order.
pub fn parse_responses_csv<R: Read>(reader: R) -> Result<Vec<SurveyResponse>> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let mut responses: Vec<SurveyResponse> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();

    for result in rdr.records() {
        let row = result?;
        let response_id = required(&row, 0, "response_id")?;
        let member_id = optional(&row, 1);
        let submitted_on = parse_date(&required(&row, 2, "submitted_on")?)?;
        let question_id = required(&row, 3, "question_id")?;
        let kind = required(&row, 4, "kind")?;
        let value = required(&row, 5, "value")?;

        let answer = parse_answer(&kind, &value)?;

        let idx = match index.get(&response_id) {
            Some(&idx) => idx,
            None => {
                responses.push(SurveyResponse {
                    id: response_id.clone(),
                    member_id,
                    submitted_on,
                    answers: Default::default(),
                });
                index.insert(response_id, responses.len() - 1);
                responses.len() - 1
            }
        };
        responses[idx].answers.insert(question_id, answer);
    }

    debug!(imported = responses.len(), "Parsed response export");
    Ok(responses)
}

/// Parse one answer cell into its typed value
fn parse_answer(kind: &str, value: &str) -> Result<Answer> {
    match kind {
        "number" => value
            .trim()
            .parse::<f64>()
            .map(Answer::Number)
            .map_err(|_| Error::InvalidData(format!("Not a numeric answer: {}", value))),
        "text" => Ok(Answer::Text(value.to_string())),
        "choice" => Ok(Answer::Choice(value.to_string())),
        "yes_no" => match value.trim().to_lowercase().as_str() {
            "yes" | "true" | "1" => Ok(Answer::YesNo(true)),
            "no" | "false" | "0" => Ok(Answer::YesNo(false)),
            other => Err(Error::InvalidData(format!(
                "Not a yes/no answer: {}",
                other
            ))),
        },
        other => Err(Error::InvalidData(format!("Unknown answer kind: {}", other))),
    }
}

/// Parse a date in ISO (2024-06-15) or US (06/15/2024) format
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .or_else(|_| NaiveDate::parse_from_str(s, "%m/%d/%Y"))
        .map_err(|_| Error::Import(format!("Unparseable date: {}", s)))
}

/// Parse a monetary amount, tolerating currency symbols and thousands
/// separators
fn parse_amount(s: &str) -> Result<f64> {
    let cleaned: String = s
        .trim()
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    cleaned
        .parse::<f64>()
        .map_err(|_| Error::Import(format!("Unparseable amount: {}", s)))
}

fn required(row: &csv::StringRecord, idx: usize, name: &str) -> Result<String> {
    match row.get(idx) {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(Error::Import(format!("Missing {}", name))),
    }
}

fn optional(row: &csv::StringRecord, idx: usize) -> Option<String> {
    row.get(idx)
        .map(|v| v.trim())
        .filter(|v| !v.is_empty())
        .map(|v| v.to_string())
}
