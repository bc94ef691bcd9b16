//! Integration tests for retain-core
//!
//! These tests exercise the full import → filter → report workflow.

use chrono::NaiveDate;

use retain_core::{
    export::{cancellations_to_csv, memberships_to_csv},
    filter::{CancellationFilter, DateRange, MembershipFilter},
    ids::FixedClock,
    import::{parse_cancellations_csv, parse_memberships_csv, parse_responses_csv},
    models::Granularity,
    store::{MemoryStore, RecordStore},
    ChurnAnalyzer,
};

/// Membership export with 10 members, all started before June 2024.
/// Members 1-3 have a trainer assigned.
fn membership_csv() -> &'static str {
    "id,member_id,plan,monthly_value,status,start_date,renewal_date,trainer_id\n\
     m1,u101,monthly-unlimited,59.00,cancelled,2024-01-10,,t-1\n\
     m2,u102,monthly-unlimited,59.00,cancelled,2024-02-01,,t-1\n\
     m3,u103,annual-basic,39.00,cancelled,2023-11-20,,t-1\n\
     m4,u104,annual-basic,39.00,cancelled,2024-03-05,,\n\
     m5,u105,monthly-unlimited,59.00,cancelled,2024-01-28,,\n\
     m6,u106,monthly-unlimited,59.00,active,2024-02-14,2024-08-14,\n\
     m7,u107,annual-basic,39.00,active,2023-09-01,2024-09-01,\n\
     m8,u108,monthly-unlimited,59.00,active,2024-04-02,2024-10-02,\n\
     m9,u109,annual-basic,39.00,active,2024-05-11,2024-11-11,\n\
     m10,u110,monthly-unlimited,59.00,active,2024-05-30,2024-11-30,\n"
}

/// Cancellation export: 3 price + 2 schedule, all inside June 2024
fn cancellation_csv() -> &'static str {
    "id,membership_id,reason,cancelled_on,note,document_ref\n\
     c1,m1,price,2024-06-03,\"Found a cheaper gym, leaving\",\n\
     c2,m2,price,2024-06-08,,\n\
     c3,m3,price,2024-06-15,,doc-3\n\
     c4,m4,schedule,2024-06-21,New job with night shifts,\n\
     c5,m5,schedule,2024-06-27,,\n"
}

fn june() -> DateRange {
    DateRange::new(
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
    )
    .unwrap()
}

fn loaded_store() -> MemoryStore {
    let clock = FixedClock::at_midnight(2024, 7, 1);
    let mut store = MemoryStore::new();
    store.add_memberships(parse_memberships_csv(membership_csv().as_bytes(), &clock).unwrap());
    store.add_cancellations(
        parse_cancellations_csv(cancellation_csv().as_bytes(), &clock).unwrap(),
    );
    store
}

#[test]
fn test_full_import_workflow() {
    let store = loaded_store();
    assert_eq!(store.membership_count(), 10);
    assert_eq!(store.cancellation_count(), 5);
}

#[test]
fn test_churn_report_from_imported_records() {
    let store = loaded_store();
    let analyzer = ChurnAnalyzer::new(&store);
    let report = analyzer.churn_stats(june(), None).unwrap();

    // All 10 memberships were active on May 31
    assert_eq!(report.active_at_start, 10);
    assert_eq!(report.total_cancellations, 5);
    assert_eq!(report.churn_rate, 50.0);

    assert_eq!(report.reasons[0].key, "price");
    assert_eq!(report.reasons[0].count, 3);
    assert_eq!(report.reasons[0].percentage, 60.0);
    assert_eq!(report.reasons[1].key, "schedule");
    assert_eq!(report.reasons[1].count, 2);
    assert_eq!(report.reasons[1].percentage, 40.0);

    // Reason counts cover every cancellation in the window
    let counted: i64 = report.reasons.iter().map(|b| b.count).sum();
    assert_eq!(counted, report.total_cancellations);
}

#[test]
fn test_trainer_scoped_report() {
    let store = loaded_store();
    let analyzer = ChurnAnalyzer::new(&store);
    let report = analyzer.churn_stats(june(), Some("t-1")).unwrap();

    assert_eq!(report.active_at_start, 3);
    assert_eq!(report.total_cancellations, 3);
    assert_eq!(report.churn_rate, 100.0);
}

#[test]
fn test_filter_subset_and_identity_on_imported_records() {
    let store = loaded_store();
    let memberships = store.memberships().unwrap();

    let all = MembershipFilter::new().apply(&memberships);
    assert_eq!(all.len(), memberships.len());

    let plan_filter = MembershipFilter::new().plan(Some("annual-basic"));
    let subset = plan_filter.apply(&memberships);
    assert_eq!(subset.len(), 4);
    assert!(subset
        .iter()
        .all(|r| memberships.iter().any(|o| o.id == r.id)));
}

#[test]
fn test_trends_from_imported_records() {
    let store = loaded_store();
    let analyzer = ChurnAnalyzer::new(&store);

    let weekly = analyzer
        .cancellation_trends(june(), Granularity::Weekly, None)
        .unwrap();
    let total: i64 = weekly.data.iter().map(|p| p.count).sum();
    assert_eq!(total, 5);
    // Chronological bucket order
    let labels: Vec<&str> = weekly.data.iter().map(|p| p.period.as_str()).collect();
    let mut sorted = labels.clone();
    sorted.sort();
    assert_eq!(labels, sorted);
}

#[test]
fn test_export_import_roundtrip() {
    let clock = FixedClock::at_midnight(2024, 7, 1);
    let store = loaded_store();

    let memberships = store.memberships().unwrap();
    let csv = memberships_to_csv(&memberships);
    let reparsed = parse_memberships_csv(csv.as_bytes(), &clock).unwrap();
    assert_eq!(reparsed.len(), memberships.len());
    for (got, want) in reparsed.iter().zip(&memberships) {
        assert_eq!(got.id, want.id);
        assert_eq!(got.plan, want.plan);
        assert_eq!(got.monthly_value, want.monthly_value);
        assert_eq!(got.start_date, want.start_date);
    }

    let cancellations = store.cancellations().unwrap();
    let filtered = CancellationFilter::new()
        .range(Some(june()))
        .apply(&cancellations);
    let count = filtered.len();
    let csv = cancellations_to_csv(filtered);
    let reparsed = parse_cancellations_csv(csv.as_bytes(), &clock).unwrap();
    assert_eq!(reparsed.len(), count);
    assert_eq!(
        reparsed[0].note.as_deref(),
        Some("Found a cheaper gym, leaving")
    );
}

#[test]
fn test_survey_workflow() {
    let question_csv = "id,kind,text,choices\n\
                        q1,nps,How likely are you to recommend us?,\n\
                        q2,rating,Rate the trainers,\n";
    let response_csv = "response_id,member_id,submitted_on,question_id,kind,value\n\
                        r1,u101,2024-06-05,q1,number,10\n\
                        r1,u101,2024-06-05,q2,number,5\n\
                        r2,u104,2024-06-12,q1,number,10\n\
                        r3,u107,2024-06-19,q1,number,10\n";

    let mut store = loaded_store();
    store.add_questions(retain_core::import::parse_questions_csv(question_csv.as_bytes()).unwrap());
    store.add_responses(parse_responses_csv(response_csv.as_bytes()).unwrap());

    let analyzer = ChurnAnalyzer::new(&store);
    let summary = analyzer.survey_summary(june(), 10).unwrap();

    assert_eq!(summary.total_responses, 3);
    assert_eq!(summary.response_rate, 30.0);
    // Every respondent scored 10
    assert_eq!(summary.nps.unwrap().score, 100);
    assert_eq!(summary.csat, Some(5.0));
}
