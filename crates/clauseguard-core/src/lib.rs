//! Core types for clause risk analysis: the clause lexicon, compiled pattern
//! tables, the hand-authored baseline, and document-level risk aggregation.

pub mod aggregate;
pub mod baseline;
pub mod config;
pub mod error;
pub mod lexicon;
pub mod model;
pub mod pattern;
pub mod store;

pub use aggregate::RiskAggregator;
pub use baseline::baseline_table;
pub use config::AnalyzerConfig;
pub use error::CoreError;
pub use lexicon::{CategoryId, ClauseCategory, RiskLevel};
pub use model::{Analysis, Change, MinedTriple, RevisionEvent, RevisionKind};
pub use pattern::{MatchKind, Matcher, Pattern, PatternSpec, PatternTable, TableOrigin};
pub use store::PatternStore;
