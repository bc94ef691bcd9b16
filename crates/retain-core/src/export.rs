//! Export formatting for record sets and report snapshots
//!
//! CSV export writes the same column layout the import parsers read, so an
//! export/import round trip preserves row count and field values. Report
//! snapshots go out as JSON.

use crate::error::Result;
use crate::import::{CANCELLATION_HEADER, MEMBERSHIP_HEADER};
use crate::models::{CancellationRecord, ChurnStats, MembershipRecord};

/// Export format options
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown export format: {} (valid: csv, json)", s)),
        }
    }
}

/// Render memberships as CSV, matching the import column layout
pub fn memberships_to_csv<'a, I>(records: I) -> String
where
    I: IntoIterator<Item = &'a MembershipRecord>,
{
    let mut csv = String::from(MEMBERSHIP_HEADER);
    csv.push('\n');

    for m in records {
        let renewal = m.renewal_date.map(|d| d.to_string()).unwrap_or_default();
        let trainer = m.trainer_id.as_deref().unwrap_or("");
        csv.push_str(&format!(
            "{},{},{},{:.2},{},{},{},{}\n",
            escape_csv_field(&m.id),
            escape_csv_field(&m.member_id),
            escape_csv_field(&m.plan),
            m.monthly_value,
            m.status,
            m.start_date,
            renewal,
            escape_csv_field(trainer)
        ));
    }

    csv
}

/// Render cancellations as CSV, matching the import column layout
pub fn cancellations_to_csv<'a, I>(records: I) -> String
where
    I: IntoIterator<Item = &'a CancellationRecord>,
{
    let mut csv = String::from(CANCELLATION_HEADER);
    csv.push('\n');

    for c in records {
        let note = c.note.as_deref().unwrap_or("");
        let document_ref = c.document_ref.as_deref().unwrap_or("");
        csv.push_str(&format!(
            "{},{},{},{},{},{}\n",
            escape_csv_field(&c.id),
            escape_csv_field(&c.membership_id),
            c.reason,
            c.cancelled_on,
            escape_csv_field(note),
            escape_csv_field(document_ref)
        ));
    }

    csv
}

/// Render a churn snapshot as pretty JSON
pub fn churn_stats_to_json(stats: &ChurnStats) -> Result<String> {
    Ok(serde_json::to_string_pretty(stats)?)
}

/// Escape a field for CSV output
fn escape_csv_field(field: &str) -> String {
    if field.contains(',') || field.contains('"') || field.contains('\n') {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}
