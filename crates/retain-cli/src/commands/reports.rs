//! Report command implementations

use std::str::FromStr;

use anyhow::{Context, Result};
use chrono::{Datelike, NaiveDate, Utc};

use retain_core::export::churn_stats_to_json;
use retain_core::filter::DateRange;
use retain_core::models::Granularity;
use retain_core::reports::{AnalyzerConfig, ChurnAnalyzer};
use retain_core::store::MemoryStore;

use super::truncate;

/// Resolve a period string to (from_date, to_date)
pub fn resolve_period(
    period: &str,
    custom_from: Option<&str>,
    custom_to: Option<&str>,
) -> Result<(NaiveDate, NaiveDate)> {
    // If custom dates provided, use those
    if let (Some(from), Some(to)) = (custom_from, custom_to) {
        let from_date = NaiveDate::parse_from_str(from, "%Y-%m-%d")
            .context("Invalid --from date format (use YYYY-MM-DD)")?;
        let to_date = NaiveDate::parse_from_str(to, "%Y-%m-%d")
            .context("Invalid --to date format (use YYYY-MM-DD)")?;
        return Ok((from_date, to_date));
    }

    let today = Utc::now().date_naive();

    match period.to_lowercase().as_str() {
        "this-month" => {
            let from = NaiveDate::from_ymd_opt(today.year(), today.month(), 1).unwrap();
            Ok((from, today))
        }
        "last-month" => {
            let last_month = if today.month() == 1 {
                NaiveDate::from_ymd_opt(today.year() - 1, 12, 1).unwrap()
            } else {
                NaiveDate::from_ymd_opt(today.year(), today.month() - 1, 1).unwrap()
            };
            let last_day = if today.month() == 1 {
                NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap().pred_opt().unwrap()
            } else {
                NaiveDate::from_ymd_opt(today.year(), today.month(), 1).unwrap().pred_opt().unwrap()
            };
            Ok((last_month, last_day))
        }
        "this-year" => {
            let from = NaiveDate::from_ymd_opt(today.year(), 1, 1).unwrap();
            Ok((from, today))
        }
        "last-30-days" => {
            let from = today - chrono::Duration::days(30);
            Ok((from, today))
        }
        "last-90-days" => {
            let from = today - chrono::Duration::days(90);
            Ok((from, today))
        }
        "last-12-months" => {
            let from = if today.month() == 1 {
                NaiveDate::from_ymd_opt(today.year() - 1, 1, 1).unwrap()
            } else {
                NaiveDate::from_ymd_opt(today.year() - 1, today.month(), 1).unwrap()
            };
            Ok((from, today))
        }
        "all" => {
            let from = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap();
            Ok((from, today))
        }
        _ => anyhow::bail!("Unknown period: {}. Available: this-month, last-month, this-year, last-30-days, last-90-days, last-12-months, all", period),
    }
}

pub fn cmd_report_churn(
    store: &MemoryStore,
    config: &AnalyzerConfig,
    range: DateRange,
    trainer: Option<&str>,
    json: bool,
) -> Result<()> {
    let analyzer = ChurnAnalyzer::with_config(store, config.clone());
    let report = analyzer.churn_stats(range, trainer)?;

    if json {
        println!("{}", churn_stats_to_json(&report)?);
        return Ok(());
    }

    println!();
    println!("📉 Churn Summary");
    println!(
        "   Period: {} to {}",
        report.period.from, report.period.to
    );
    if let Some(trainer) = trainer {
        println!("   Trainer: {}", trainer);
    }
    println!("   ─────────────────────────────────────────────────────────────");
    println!("   Active at period start: {}", report.active_at_start);
    println!("   Cancellations:          {}", report.total_cancellations);
    println!("   Churn rate:             {:.1}%", report.churn_rate);
    println!("   Revenue churn rate:     {:.1}%", report.revenue_churn_rate);
    println!(
        "   Avg churned LTV:        ${:.2}",
        report.avg_churned_lifetime_value
    );

    if !report.reasons.is_empty() {
        println!();
        println!("   {:25} │ {:>6} │ {:>6}", "Reason", "Count", "%");
        println!("   ──────────────────────────┼────────┼────────");
        for bucket in &report.reasons {
            println!(
                "   {:25} │ {:>6} │ {:>5.1}%",
                truncate(&bucket.key, 25),
                bucket.count,
                bucket.percentage
            );
        }
    }

    Ok(())
}

pub fn cmd_report_reasons(
    store: &MemoryStore,
    config: &AnalyzerConfig,
    range: DateRange,
    trainer: Option<&str>,
) -> Result<()> {
    let analyzer = ChurnAnalyzer::with_config(store, config.clone());
    let report = analyzer.churn_stats(range, trainer)?;

    println!();
    println!("🚪 Cancellation Reasons");
    println!(
        "   Period: {} to {}",
        report.period.from, report.period.to
    );
    println!("   ─────────────────────────────────────────────────────────────");

    if report.reasons.is_empty() {
        println!("   No cancellations found in this period.");
        return Ok(());
    }

    println!("   {:25} │ {:>6} │ {:>6}", "Reason", "Count", "%");
    println!("   ──────────────────────────┼────────┼────────");
    for bucket in &report.reasons {
        // Show the catalog label when the key parses as a known reason
        let label = retain_core::models::CancelReason::from_str(&bucket.key)
            .map(|r| r.label().to_string())
            .unwrap_or_else(|_| bucket.key.clone());
        println!(
            "   {:25} │ {:>6} │ {:>5.1}%",
            truncate(&label, 25),
            bucket.count,
            bucket.percentage
        );
    }
    println!("   ──────────────────────────┼────────┼────────");
    println!(
        "   {:25} │ {:>6} │",
        "Total", report.total_cancellations
    );

    Ok(())
}

pub fn cmd_report_plans(
    store: &MemoryStore,
    config: &AnalyzerConfig,
    range: DateRange,
    trainer: Option<&str>,
) -> Result<()> {
    let analyzer = ChurnAnalyzer::with_config(store, config.clone());
    let plans = analyzer.plan_distribution(range, trainer)?;

    println!();
    println!("📋 Churned Plans");
    println!(
        "   Period: {} to {}",
        range.start(),
        range.end()
    );
    println!("   ─────────────────────────────────────────────────────────────");

    if plans.is_empty() {
        println!("   No cancellations found in this period.");
        return Ok(());
    }

    println!("   {:25} │ {:>6} │ {:>6}", "Plan", "Count", "%");
    println!("   ──────────────────────────┼────────┼────────");
    for bucket in &plans {
        println!(
            "   {:25} │ {:>6} │ {:>5.1}%",
            truncate(&bucket.key, 25),
            bucket.count,
            bucket.percentage
        );
    }

    Ok(())
}

pub fn cmd_report_trends(
    store: &MemoryStore,
    config: &AnalyzerConfig,
    range: DateRange,
    granularity: Granularity,
    trainer: Option<&str>,
) -> Result<()> {
    let analyzer = ChurnAnalyzer::with_config(store, config.clone());
    let report = analyzer.cancellation_trends(range, granularity, trainer)?;

    println!();
    println!("📈 Cancellation Trends ({})", report.granularity.as_str());
    println!(
        "   Period: {} to {}",
        report.period.from, report.period.to
    );
    println!("   ─────────────────────────────────────────────────────────────");

    if report.data.is_empty() {
        println!("   No cancellations found.");
        return Ok(());
    }

    println!("   {:12} │ {:>6}", "Period", "Count");
    println!("   ─────────────┼────────");
    for point in &report.data {
        println!("   {:12} │ {:>6}", point.period, point.count);
    }

    let total: i64 = report.data.iter().map(|p| p.count).sum();
    println!("   ─────────────┼────────");
    println!("   {:12} │ {:>6}", "Total", total);

    Ok(())
}

pub fn cmd_report_survey(
    store: &MemoryStore,
    config: &AnalyzerConfig,
    range: DateRange,
    invited: i64,
) -> Result<()> {
    let analyzer = ChurnAnalyzer::with_config(store, config.clone());
    let summary = analyzer.survey_summary(range, invited)?;

    println!();
    println!("📝 Survey Summary");
    println!(
        "   Period: {} to {}",
        summary.period.from, summary.period.to
    );
    println!("   ─────────────────────────────────────────────────────────────");
    println!(
        "   Responses: {} of {} invited ({:.1}%)",
        summary.total_responses, summary.invited, summary.response_rate
    );

    match &summary.nps {
        Some(nps) => {
            println!();
            println!("   NPS: {}", nps.score);
            println!(
                "      Promoters: {}   Passives: {}   Detractors: {}",
                nps.promoters, nps.passives, nps.detractors
            );
        }
        None => println!("   NPS: no data"),
    }

    match summary.csat {
        Some(csat) => println!("   CSAT: {:.1}", csat),
        None => println!("   CSAT: no data"),
    }

    Ok(())
}
