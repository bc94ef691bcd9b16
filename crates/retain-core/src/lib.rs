//! Retain Core Library
//!
//! Shared functionality for the Retain member-retention analytics tool:
//! - Domain models for memberships, cancellations, and surveys
//! - Filter engine for narrowing record sets
//! - Aggregation of churn, revenue, and survey statistics
//! - CSV import parsers and export formatting
//! - Injectable clock and id generation for deterministic record creation

pub mod error;
pub mod export;
pub mod filter;
pub mod ids;
pub mod import;
pub mod models;
pub mod reports;
pub mod stats;
pub mod store;

pub use error::{Error, Result};
pub use export::ExportFormat;
pub use filter::{CancellationFilter, DateRange, MembershipFilter};
pub use ids::{Clock, FixedClock, IdGenerator, MillisIdGen, SequentialIdGen, SystemClock};
pub use import::RecordKind;
pub use reports::{AnalyzerConfig, ChurnAnalyzer};
pub use store::{MemoryStore, RecordStore};
