//! Folds per-paragraph findings into a document-level [`Analysis`].

use std::collections::BTreeMap;

use crate::lexicon::{self, CategoryId, RiskLevel};
use crate::model::{Analysis, Change};

/// Accumulates paragraph findings in document order.
///
/// Pure aggregation: no I/O, no failure modes.
#[derive(Debug, Default)]
pub struct RiskAggregator {
    changes: Vec<Change>,
    risk_assessment: BTreeMap<RiskLevel, Vec<String>>,
    clause_categories: BTreeMap<CategoryId, Vec<String>>,
}

impl RiskAggregator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one non-blank paragraph with its changes and semantic category.
    ///
    /// The paragraph's risk is the worst level among its own changes, `Low`
    /// when it has none.
    pub fn record(&mut self, paragraph: &str, changes: Vec<Change>, category: Option<CategoryId>) {
        let risk = changes
            .iter()
            .map(|c| c.risk_level)
            .max()
            .unwrap_or(RiskLevel::Low);

        self.risk_assessment
            .entry(risk)
            .or_default()
            .push(paragraph.to_string());

        if let Some(category) = category {
            self.clause_categories
                .entry(category)
                .or_default()
                .push(paragraph.to_string());
        }

        self.changes.extend(changes);
    }

    pub fn finish(self) -> Analysis {
        let overall_risk_level = self
            .risk_assessment
            .iter()
            .filter(|(_, paragraphs)| !paragraphs.is_empty())
            .map(|(level, _)| *level)
            .max()
            .unwrap_or(RiskLevel::Low);

        let missing_clauses = lexicon::high_risk()
            .filter(|cat| {
                self.clause_categories
                    .get(&cat.id)
                    .is_none_or(|paragraphs| paragraphs.is_empty())
            })
            .map(|cat| format!("Missing {} clause", cat.description))
            .collect();

        Analysis {
            changes: self.changes,
            risk_assessment: self.risk_assessment,
            clause_categories: self.clause_categories,
            missing_clauses,
            overall_risk_level,
        }
    }
}
