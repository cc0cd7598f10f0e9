//! Shared record types flowing between mining, analysis, and reporting.

use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use crate::lexicon::{CategoryId, RiskLevel};

/// Placeholder for revision metadata the markup did not carry.
pub const UNKNOWN: &str = "Unknown";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RevisionKind {
    Insertion,
    Deletion,
}

/// One tracked change read from a training document's revision markup.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevisionEvent {
    pub kind: RevisionKind,
    /// Never blank after trimming.
    pub text: String,
    pub author: String,
    pub date: Option<DateTime<FixedOffset>>,
}

impl RevisionEvent {
    /// Build an event from raw markup attributes.
    ///
    /// Missing authors become [`UNKNOWN`]; dates that are not RFC 3339 are dropped.
    pub fn new(kind: RevisionKind, text: String, author: Option<&str>, date: Option<&str>) -> Self {
        let author = author
            .map(str::trim)
            .filter(|a| !a.is_empty())
            .unwrap_or(UNKNOWN)
            .to_string();
        let date = date.and_then(|d| DateTime::parse_from_rfc3339(d.trim()).ok());
        Self {
            kind,
            text,
            author,
            date,
        }
    }

    pub fn date_label(&self) -> String {
        self.date
            .map(|d| d.to_rfc3339())
            .unwrap_or_else(|| UNKNOWN.to_string())
    }
}

impl fmt::Display for RevisionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = match self.kind {
            RevisionKind::Insertion => '+',
            RevisionKind::Deletion => '-',
        };
        write!(f, "{sign}[{} @ {}] {}", self.author, self.date_label(), self.text)
    }
}

/// A (removed, inserted, surrounding) text triple mined from one redline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MinedTriple {
    pub original_text: String,
    pub suggested_text: String,
    pub context_text: Option<String>,
}

impl MinedTriple {
    /// Text used for keyword categorization: removed and inserted text together.
    pub fn union_text(&self) -> String {
        format!("{} {}", self.original_text, self.suggested_text)
    }
}

/// One flagged span of a paragraph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Change {
    pub original_text: String,
    pub suggested_text: String,
    pub description: String,
    pub suggestion: String,
    pub risk_level: RiskLevel,
    pub category: CategoryId,
}

/// Document-level risk report.
///
/// Built by [`RiskAggregator`](crate::RiskAggregator); read-only once returned.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Analysis {
    pub changes: Vec<Change>,
    /// Paragraph texts bucketed by their own worst risk level.
    pub risk_assessment: BTreeMap<RiskLevel, Vec<String>>,
    /// Paragraph texts bucketed by semantic category.
    pub clause_categories: BTreeMap<CategoryId, Vec<String>>,
    pub missing_clauses: Vec<String>,
    pub overall_risk_level: RiskLevel,
}
