//! Record loading, inspection, and export commands

use std::fs::{self, File};
use std::path::Path;
use std::str::FromStr;

use anyhow::{bail, Context, Result};
use tracing::info;

use retain_core::export::{cancellations_to_csv, memberships_to_csv};
use retain_core::filter::{CancellationFilter, DateRange, MembershipFilter};
use retain_core::ids::SystemClock;
use retain_core::import::{
    detect_record_kind, parse_cancellations_csv, parse_date, parse_memberships_csv,
    parse_questions_csv, parse_responses_csv,
};
use retain_core::models::{CancelReason, MembershipStatus};
use retain_core::store::{MemoryStore, RecordStore};
use retain_core::ExportFormat;

/// Load whichever record exports exist in the data directory
///
/// Looks for memberships.csv, cancellations.csv, questions.csv, and
/// responses.csv; missing files are fine.
pub fn load_store(data_dir: &Path) -> Result<MemoryStore> {
    let clock = SystemClock;
    let mut store = MemoryStore::new();

    let path = data_dir.join("memberships.csv");
    if path.exists() {
        let file = File::open(&path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        store.add_memberships(
            parse_memberships_csv(file, &clock)
                .with_context(|| format!("Failed to parse {}", path.display()))?,
        );
    }

    let path = data_dir.join("cancellations.csv");
    if path.exists() {
        let file = File::open(&path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        store.add_cancellations(
            parse_cancellations_csv(file, &clock)
                .with_context(|| format!("Failed to parse {}", path.display()))?,
        );
    }

    let path = data_dir.join("questions.csv");
    if path.exists() {
        let file = File::open(&path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        store.add_questions(
            parse_questions_csv(file)
                .with_context(|| format!("Failed to parse {}", path.display()))?,
        );
    }

    let path = data_dir.join("responses.csv");
    if path.exists() {
        let file = File::open(&path)
            .with_context(|| format!("Failed to open {}", path.display()))?;
        store.add_responses(
            parse_responses_csv(file)
                .with_context(|| format!("Failed to parse {}", path.display()))?,
        );
    }

    if store.membership_count() == 0 && store.cancellation_count() == 0 {
        bail!(
            "No record exports found in {} (expected memberships.csv and/or cancellations.csv)",
            data_dir.display()
        );
    }

    info!(
        memberships = store.membership_count(),
        cancellations = store.cancellation_count(),
        responses = store.response_count(),
        "Loaded records"
    );
    Ok(store)
}

/// Report a CSV file's detected record kind and row count
pub fn cmd_inspect(file: &Path) -> Result<()> {
    let content = fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;

    let header = content.lines().next().unwrap_or("");
    let rows = content.lines().skip(1).filter(|l| !l.trim().is_empty()).count();

    println!();
    match detect_record_kind(header) {
        Some(kind) => {
            println!("📄 {}", file.display());
            println!("   Kind: {}", kind);
            println!("   Rows: {}", rows);
        }
        None => {
            println!("📄 {}", file.display());
            println!("   Kind: unrecognized");
            println!("   Header: {}", super::truncate(header, 60));
        }
    }

    Ok(())
}

/// Parse --from/--to into an optional validated range
pub fn parse_range(from: Option<&str>, to: Option<&str>) -> Result<Option<DateRange>> {
    match (from, to) {
        (Some(from), Some(to)) => {
            let from = parse_date(from).context("Invalid --from date (use YYYY-MM-DD)")?;
            let to = parse_date(to).context("Invalid --to date (use YYYY-MM-DD)")?;
            Ok(Some(DateRange::new(from, to)?))
        }
        (None, None) => Ok(None),
        _ => bail!("--from and --to must be provided together"),
    }
}

/// Export a filtered record set as CSV or JSON
#[allow(clippy::too_many_arguments)]
pub fn cmd_export(
    store: &MemoryStore,
    kind: &str,
    output: Option<&Path>,
    format: &str,
    from: Option<&str>,
    to: Option<&str>,
    status: Option<&str>,
    reason: Option<&str>,
) -> Result<()> {
    let format = ExportFormat::from_str(format).map_err(|e| anyhow::anyhow!(e))?;
    let range = parse_range(from, to)?;

    let (rendered, count) = match kind {
        "memberships" => {
            let status = status
                .map(MembershipStatus::from_str)
                .transpose()
                .map_err(|e| anyhow::anyhow!(e))?;
            let records = store.memberships()?;
            let filter = MembershipFilter::new().range(range).status(status);
            let selected = filter.apply(&records);
            let count = selected.len();
            let rendered = match format {
                ExportFormat::Csv => memberships_to_csv(selected),
                ExportFormat::Json => serde_json::to_string_pretty(&selected)?,
            };
            (rendered, count)
        }
        "cancellations" => {
            let reason = reason
                .map(CancelReason::from_str)
                .transpose()
                .map_err(|e| anyhow::anyhow!(e))?;
            let records = store.cancellations()?;
            let filter = CancellationFilter::new().range(range).reason(reason);
            let selected = filter.apply(&records);
            let count = selected.len();
            let rendered = match format {
                ExportFormat::Csv => cancellations_to_csv(selected),
                ExportFormat::Json => serde_json::to_string_pretty(&selected)?,
            };
            (rendered, count)
        }
        other => bail!(
            "Unknown export kind: {} (valid: memberships, cancellations)",
            other
        ),
    };

    match output {
        Some(path) => {
            fs::write(path, &rendered)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            println!("✅ Exported {} records to {}", count, path.display());
        }
        None => print!("{}", rendered),
    }

    Ok(())
}
