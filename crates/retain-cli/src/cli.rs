//! CLI argument definitions using clap
//!
//! This module contains all the clap structs and enums for parsing CLI
//! arguments. The actual command implementations are in the `commands`
//! module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Retain - Membership churn and survey analytics
#[derive(Parser)]
#[command(name = "retain")]
#[command(about = "Churn and survey analytics over gym CRM exports", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Directory containing the CRM CSV exports
    /// (memberships.csv, cancellations.csv, questions.csv, responses.csv)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    /// Config file path (defaults to ~/.config/retain/config.toml)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Inspect a CSV export: detected record kind and row count
    Inspect {
        /// CSV file to inspect
        file: PathBuf,
    },

    /// Generate reports from the loaded records
    Report {
        #[command(subcommand)]
        report_type: ReportType,
    },

    /// Export filtered records
    Export {
        /// Record set to export: memberships, cancellations
        #[arg(short, long, default_value = "cancellations")]
        kind: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format: csv, json
        #[arg(long, default_value = "csv")]
        format: String,

        /// Start date (YYYY-MM-DD); requires --to
        #[arg(long)]
        from: Option<String>,

        /// End date (YYYY-MM-DD); requires --from
        #[arg(long)]
        to: Option<String>,

        /// Filter memberships by status (active, pending, expired, cancelled)
        #[arg(long)]
        status: Option<String>,

        /// Filter cancellations by reason (price, schedule, ...)
        #[arg(long)]
        reason: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ReportType {
    /// Churn summary for a period
    Churn {
        /// Period: this-month, last-month, this-year, last-30-days,
        /// last-90-days, last-12-months, all
        #[arg(short, long, default_value = "last-month")]
        period: String,

        /// Custom start date (YYYY-MM-DD), overrides --period with --to
        #[arg(long)]
        from: Option<String>,

        /// Custom end date (YYYY-MM-DD), overrides --period with --from
        #[arg(long)]
        to: Option<String>,

        /// Scope to one trainer's members
        #[arg(long)]
        trainer: Option<String>,

        /// Print the snapshot as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Cancellation reason breakdown
    Reasons {
        #[arg(short, long, default_value = "last-month")]
        period: String,

        #[arg(long)]
        from: Option<String>,

        #[arg(long)]
        to: Option<String>,

        /// Scope to one trainer's members
        #[arg(long)]
        trainer: Option<String>,
    },

    /// Plans the churned members were on
    Plans {
        #[arg(short, long, default_value = "last-month")]
        period: String,

        #[arg(long)]
        from: Option<String>,

        #[arg(long)]
        to: Option<String>,

        /// Scope to one trainer's members
        #[arg(long)]
        trainer: Option<String>,
    },

    /// Cancellations over time
    Trends {
        /// Bucket size: daily, weekly, monthly
        #[arg(short, long, default_value = "weekly")]
        granularity: String,

        #[arg(short, long, default_value = "last-90-days")]
        period: String,

        /// Scope to one trainer's members
        #[arg(long)]
        trainer: Option<String>,
    },

    /// Survey summary (response rate, NPS, CSAT)
    Survey {
        #[arg(short, long, default_value = "last-month")]
        period: String,

        #[arg(long)]
        from: Option<String>,

        #[arg(long)]
        to: Option<String>,

        /// How many members were invited to the survey
        /// (falls back to invited_per_survey in the config file)
        #[arg(long)]
        invited: Option<i64>,
    },
}
