//! Static clause lexicon: categories, risk levels, and keyword sets.
//!
//! The table is defined once for the process lifetime. Its order matters:
//! [`categorize`] returns the *first* category whose keywords occur in the
//! text, so broad categories placed early win ties.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Risk attached to a clause category, pattern, or paragraph.
///
/// Ordered `Low < Medium < High` so that `max()` picks the worst level.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum RiskLevel {
    #[default]
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Legal-topic bucket a clause belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryId {
    Confidentiality,
    Duration,
    Scope,
    Liability,
    IntellectualProperty,
    Assignment,
    Termination,
    GoverningLaw,
    Other,
}

impl CategoryId {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Confidentiality => "confidentiality",
            Self::Duration => "duration",
            Self::Scope => "scope",
            Self::Liability => "liability",
            Self::IntellectualProperty => "intellectual_property",
            Self::Assignment => "assignment",
            Self::Termination => "termination",
            Self::GoverningLaw => "governing_law",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for CategoryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for CategoryId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CATEGORIES
            .iter()
            .map(|c| c.id)
            .find(|id| id.as_str() == s.trim().to_ascii_lowercase())
            .ok_or_else(|| format!("unknown clause category: {s}"))
    }
}

/// One row of the lexicon.
#[derive(Debug)]
pub struct ClauseCategory {
    pub id: CategoryId,
    pub risk_level: RiskLevel,
    /// Lowercase keywords, never empty.
    pub keywords: &'static [&'static str],
    pub description: &'static str,
}

impl ClauseCategory {
    /// Keywords joined into one string, the text embedded for semantic matching.
    pub fn keyword_text(&self) -> String {
        self.keywords.join(" ")
    }

    /// Whether any keyword occurs in already-lowercased `text`.
    pub fn matches(&self, lower_text: &str) -> bool {
        self.keywords.iter().any(|kw| contains_term(lower_text, kw))
    }
}

static CATEGORIES: &[ClauseCategory] = &[
    ClauseCategory {
        id: CategoryId::Confidentiality,
        risk_level: RiskLevel::High,
        keywords: &["confidential", "secret", "proprietary", "trade secret"],
        description: "confidentiality",
    },
    ClauseCategory {
        id: CategoryId::Duration,
        risk_level: RiskLevel::High,
        keywords: &["perpetual", "term", "period", "duration", "expiration"],
        description: "term and duration",
    },
    ClauseCategory {
        id: CategoryId::Scope,
        risk_level: RiskLevel::High,
        keywords: &["scope", "purpose", "use", "application", "all", "any"],
        description: "scope of confidential information",
    },
    ClauseCategory {
        id: CategoryId::Liability,
        risk_level: RiskLevel::High,
        keywords: &["liability", "damages", "indemnification", "warranty"],
        description: "liability and remedies",
    },
    ClauseCategory {
        id: CategoryId::IntellectualProperty,
        risk_level: RiskLevel::High,
        keywords: &["intellectual property", "ip", "patent", "copyright", "trademark"],
        description: "intellectual property",
    },
    ClauseCategory {
        id: CategoryId::Assignment,
        risk_level: RiskLevel::Medium,
        keywords: &["assign", "transfer", "convey", "license"],
        description: "assignment",
    },
    ClauseCategory {
        id: CategoryId::Termination,
        risk_level: RiskLevel::Medium,
        keywords: &["terminate", "termination", "end", "expire"],
        description: "termination",
    },
    ClauseCategory {
        id: CategoryId::GoverningLaw,
        risk_level: RiskLevel::Low,
        keywords: &["governing law", "jurisdiction", "venue", "dispute"],
        description: "governing law",
    },
    ClauseCategory {
        id: CategoryId::Other,
        risk_level: RiskLevel::Low,
        keywords: &["miscellaneous", "general", "notice", "entire agreement"],
        description: "general provisions",
    },
];

/// All categories in lexicon order.
pub fn categories() -> &'static [ClauseCategory] {
    CATEGORIES
}

/// Look up a category row. Every [`CategoryId`] has exactly one row.
pub fn get(id: CategoryId) -> &'static ClauseCategory {
    CATEGORIES
        .iter()
        .find(|c| c.id == id)
        .unwrap_or(&CATEGORIES[CATEGORIES.len() - 1])
}

/// Categories whose absence from a document is reported as a missing clause.
pub fn high_risk() -> impl Iterator<Item = &'static ClauseCategory> {
    CATEGORIES.iter().filter(|c| c.risk_level == RiskLevel::High)
}

/// Keyword categorization: first category with a keyword in `text`, else `Other`.
pub fn categorize(text: &str) -> CategoryId {
    let lower = text.to_lowercase();
    CATEGORIES
        .iter()
        .find(|c| c.matches(&lower))
        .map(|c| c.id)
        .unwrap_or(CategoryId::Other)
}

/// True when `term` occurs in `text` starting at a word boundary.
///
/// Suffixes are allowed (`assign` matches `assignment`); occurrences inside a
/// word are not (`ip` does not match `relationship`).
pub fn contains_term(text: &str, term: &str) -> bool {
    if term.is_empty() {
        return false;
    }
    text.match_indices(term).any(|(idx, _)| {
        text[..idx]
            .chars()
            .next_back()
            .is_none_or(|c| !c.is_alphanumeric())
    })
}
