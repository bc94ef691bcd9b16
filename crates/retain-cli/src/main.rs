//! Retain CLI - Membership churn and survey analytics
//!
//! Usage:
//!   retain inspect FILE                 Identify a CRM CSV export
//!   retain report churn -p last-month   Churn summary for a period
//!   retain report survey                Survey response rate, NPS, CSAT
//!   retain export -k cancellations      Export a filtered record set

mod cli;
mod commands;
mod config;

#[cfg(test)]
mod tests;

use std::path::PathBuf;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;
use config::CliConfig;
use retain_core::filter::DateRange;
use retain_core::reports::AnalyzerConfig;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_target(false).compact())
        .init();

    let config = CliConfig::load(cli.config.as_deref())?;
    let data_dir = cli
        .data_dir
        .clone()
        .or_else(|| config.data_dir.clone())
        .unwrap_or_else(|| PathBuf::from("."));
    let analyzer_config = AnalyzerConfig {
        churn_warn_threshold: config
            .churn_warn_threshold
            .unwrap_or_else(|| AnalyzerConfig::default().churn_warn_threshold),
    };

    match cli.command {
        Commands::Inspect { file } => commands::cmd_inspect(&file),
        Commands::Report { report_type } => {
            let store = commands::load_store(&data_dir)?;
            match report_type {
                ReportType::Churn {
                    period,
                    from,
                    to,
                    trainer,
                    json,
                } => {
                    let (from_date, to_date) =
                        commands::resolve_period(&period, from.as_deref(), to.as_deref())?;
                    let range = DateRange::new(from_date, to_date)?;
                    let trainer = trainer.or_else(|| config.default_trainer.clone());
                    commands::cmd_report_churn(
                        &store,
                        &analyzer_config,
                        range,
                        trainer.as_deref(),
                        json,
                    )
                }
                ReportType::Reasons {
                    period,
                    from,
                    to,
                    trainer,
                } => {
                    let (from_date, to_date) =
                        commands::resolve_period(&period, from.as_deref(), to.as_deref())?;
                    let range = DateRange::new(from_date, to_date)?;
                    let trainer = trainer.or_else(|| config.default_trainer.clone());
                    commands::cmd_report_reasons(&store, &analyzer_config, range, trainer.as_deref())
                }
                ReportType::Plans {
                    period,
                    from,
                    to,
                    trainer,
                } => {
                    let (from_date, to_date) =
                        commands::resolve_period(&period, from.as_deref(), to.as_deref())?;
                    let range = DateRange::new(from_date, to_date)?;
                    let trainer = trainer.or_else(|| config.default_trainer.clone());
                    commands::cmd_report_plans(&store, &analyzer_config, range, trainer.as_deref())
                }
                ReportType::Trends {
                    granularity,
                    period,
                    trainer,
                } => {
                    let (from_date, to_date) = commands::resolve_period(&period, None, None)?;
                    let range = DateRange::new(from_date, to_date)?;
                    let granularity: retain_core::models::Granularity = granularity
                        .parse()
                        .map_err(|e: String| anyhow::anyhow!(e))?;
                    let trainer = trainer.or_else(|| config.default_trainer.clone());
                    commands::cmd_report_trends(
                        &store,
                        &analyzer_config,
                        range,
                        granularity,
                        trainer.as_deref(),
                    )
                }
                ReportType::Survey {
                    period,
                    from,
                    to,
                    invited,
                } => {
                    let (from_date, to_date) =
                        commands::resolve_period(&period, from.as_deref(), to.as_deref())?;
                    let range = DateRange::new(from_date, to_date)?;
                    let invited = invited.or(config.invited_per_survey).unwrap_or(0);
                    commands::cmd_report_survey(&store, &analyzer_config, range, invited)
                }
            }
        }
        Commands::Export {
            kind,
            output,
            format,
            from,
            to,
            status,
            reason,
        } => {
            let store = commands::load_store(&data_dir)?;
            commands::cmd_export(
                &store,
                &kind,
                output.as_deref(),
                &format,
                from.as_deref(),
                to.as_deref(),
                status.as_deref(),
                reason.as_deref(),
            )
        }
    }
}
