//! CLI command tests
//!
//! This module contains all tests for the CLI commands.

use std::fs;

use chrono::NaiveDate;
use tempfile::TempDir;

use retain_core::filter::DateRange;
use retain_core::reports::AnalyzerConfig;
use retain_core::store::MemoryStore;

use crate::commands::{self, truncate};
use crate::config::CliConfig;

const MEMBERSHIP_CSV: &str = "\
id,member_id,plan,monthly_value,status,start_date,renewal_date,trainer_id
m1,u101,monthly-unlimited,59.00,active,2024-01-10,2024-07-10,t-1
m2,u102,annual-basic,39.00,cancelled,2024-02-01,,
m3,u103,monthly-unlimited,59.00,active,2024-03-15,2024-09-15,
";

const CANCELLATION_CSV: &str = "\
id,membership_id,reason,cancelled_on,note,document_ref
c1,m2,price,2024-06-08,Too pricey after the increase,
";

fn setup_data_dir() -> TempDir {
    let dir = TempDir::new().unwrap();
    fs::write(dir.path().join("memberships.csv"), MEMBERSHIP_CSV).unwrap();
    fs::write(dir.path().join("cancellations.csv"), CANCELLATION_CSV).unwrap();
    dir
}

fn setup_store() -> (TempDir, MemoryStore) {
    let dir = setup_data_dir();
    let store = commands::load_store(dir.path()).unwrap();
    (dir, store)
}

fn june() -> DateRange {
    DateRange::new(
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap(),
        NaiveDate::from_ymd_opt(2024, 6, 30).unwrap(),
    )
    .unwrap()
}

// ========== Utility Tests ==========

#[test]
fn test_truncate() {
    assert_eq!(truncate("short", 10), "short");
    assert_eq!(truncate("exactly-ten", 11), "exactly-ten");
    assert_eq!(truncate("much too long for this", 10), "much to...");
}

// ========== Period Resolution Tests ==========

#[test]
fn test_resolve_period_custom_dates() {
    let (from, to) =
        commands::resolve_period("ignored", Some("2024-06-01"), Some("2024-06-30")).unwrap();
    assert_eq!(from, NaiveDate::from_ymd_opt(2024, 6, 1).unwrap());
    assert_eq!(to, NaiveDate::from_ymd_opt(2024, 6, 30).unwrap());
}

#[test]
fn test_resolve_period_bad_custom_date() {
    let result = commands::resolve_period("ignored", Some("June 1st"), Some("2024-06-30"));
    assert!(result.is_err());
}

#[test]
fn test_resolve_period_named_periods() {
    for period in [
        "this-month",
        "last-month",
        "this-year",
        "last-30-days",
        "last-90-days",
        "last-12-months",
        "all",
    ] {
        let (from, to) = commands::resolve_period(period, None, None).unwrap();
        assert!(from <= to, "period {} produced an inverted range", period);
    }
}

#[test]
fn test_resolve_period_unknown() {
    assert!(commands::resolve_period("fortnight", None, None).is_err());
}

// ========== Data Loading Tests ==========

#[test]
fn test_load_store_reads_exports() {
    let (_dir, store) = setup_store();
    assert_eq!(store.membership_count(), 3);
    assert_eq!(store.cancellation_count(), 1);
}

#[test]
fn test_load_store_empty_dir_fails() {
    let dir = TempDir::new().unwrap();
    assert!(commands::load_store(dir.path()).is_err());
}

#[test]
fn test_cmd_inspect() {
    let dir = setup_data_dir();
    let result = commands::cmd_inspect(&dir.path().join("memberships.csv"));
    assert!(result.is_ok());
}

// ========== Report Command Tests ==========

#[test]
fn test_cmd_report_churn() {
    let (_dir, store) = setup_store();
    let result =
        commands::cmd_report_churn(&store, &AnalyzerConfig::default(), june(), None, false);
    assert!(result.is_ok());
}

#[test]
fn test_cmd_report_churn_json() {
    let (_dir, store) = setup_store();
    let result =
        commands::cmd_report_churn(&store, &AnalyzerConfig::default(), june(), None, true);
    assert!(result.is_ok());
}

#[test]
fn test_cmd_report_reasons_and_plans() {
    let (_dir, store) = setup_store();
    assert!(
        commands::cmd_report_reasons(&store, &AnalyzerConfig::default(), june(), None).is_ok()
    );
    assert!(commands::cmd_report_plans(&store, &AnalyzerConfig::default(), june(), None).is_ok());
}

#[test]
fn test_cmd_report_trends() {
    let (_dir, store) = setup_store();
    let result = commands::cmd_report_trends(
        &store,
        &AnalyzerConfig::default(),
        june(),
        retain_core::models::Granularity::Weekly,
        None,
    );
    assert!(result.is_ok());
}

#[test]
fn test_cmd_report_survey_without_responses() {
    let (_dir, store) = setup_store();
    let result = commands::cmd_report_survey(&store, &AnalyzerConfig::default(), june(), 10);
    assert!(result.is_ok());
}

// ========== Export Command Tests ==========

#[test]
fn test_parse_range_requires_both_bounds() {
    assert!(commands::parse_range(Some("2024-06-01"), None).is_err());
    assert!(commands::parse_range(None, None).unwrap().is_none());
    assert!(commands::parse_range(Some("2024-06-01"), Some("2024-06-30"))
        .unwrap()
        .is_some());
}

#[test]
fn test_parse_range_rejects_inverted_dates() {
    assert!(commands::parse_range(Some("2024-06-30"), Some("2024-06-01")).is_err());
}

#[test]
fn test_cmd_export_cancellations_csv() {
    let (dir, store) = setup_store();
    let out = dir.path().join("out.csv");
    commands::cmd_export(
        &store,
        "cancellations",
        Some(&out),
        "csv",
        Some("2024-06-01"),
        Some("2024-06-30"),
        None,
        None,
    )
    .unwrap();

    let content = fs::read_to_string(&out).unwrap();
    // Header plus the one June cancellation
    assert_eq!(content.lines().count(), 2);
    assert!(content.contains("c1,m2,price,2024-06-08"));
}

#[test]
fn test_cmd_export_memberships_json() {
    let (dir, store) = setup_store();
    let out = dir.path().join("out.json");
    commands::cmd_export(
        &store,
        "memberships",
        Some(&out),
        "json",
        None,
        None,
        Some("active"),
        None,
    )
    .unwrap();

    let content = fs::read_to_string(&out).unwrap();
    let parsed: serde_json::Value = serde_json::from_str(&content).unwrap();
    assert_eq!(parsed.as_array().unwrap().len(), 2);
}

#[test]
fn test_cmd_export_unknown_kind() {
    let (_dir, store) = setup_store();
    let result = commands::cmd_export(&store, "members", None, "csv", None, None, None, None);
    assert!(result.is_err());
}

// ========== Config Tests ==========

#[test]
fn test_config_from_explicit_path() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    fs::write(
        &path,
        "data_dir = \"/var/lib/retain\"\ninvited_per_survey = 120\nchurn_warn_threshold = 7.5\n",
    )
    .unwrap();

    let config = CliConfig::load(Some(&path)).unwrap();
    assert_eq!(
        config.data_dir.as_deref(),
        Some(std::path::Path::new("/var/lib/retain"))
    );
    assert_eq!(config.invited_per_survey, Some(120));
    assert_eq!(config.churn_warn_threshold, Some(7.5));
    assert_eq!(config.default_trainer, None);
}

#[test]
fn test_config_missing_explicit_path_fails() {
    let dir = TempDir::new().unwrap();
    let result = CliConfig::load(Some(&dir.path().join("nope.toml")));
    assert!(result.is_err());
}
