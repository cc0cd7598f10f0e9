//! Compiled clause patterns and the tables that hold them.
//!
//! A [`Pattern`] is built from a serializable [`PatternSpec`]. Matching goes
//! through [`Matcher::find`], the only place that distinguishes literal from
//! regex patterns.

use std::collections::{BTreeSet, HashSet};
use std::fs;
use std::path::Path;

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::lexicon::{self, CategoryId, RiskLevel};
use crate::model::Change;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchKind {
    Literal,
    Regex,
}

/// Serializable pattern definition, the on-disk form of a [`Pattern`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternSpec {
    pub kind: MatchKind,
    pub value: String,
    pub category: CategoryId,
    /// Overrides the category's risk level when set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<RiskLevel>,
    pub description: String,
    pub suggestion: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replacement: Option<String>,
    /// Phrases of which at least one must occur in the paragraph. Empty = unconditional.
    #[serde(default)]
    pub context: Vec<String>,
}

/// Literal text with its case-insensitive finder and fuzzy word list.
#[derive(Debug, Clone)]
pub struct LiteralMatcher {
    text: String,
    exact: Regex,
    words: Vec<String>,
}

impl LiteralMatcher {
    fn new(text: &str) -> Result<Self, regex::Error> {
        let exact = RegexBuilder::new(&regex::escape(text))
            .case_insensitive(true)
            .build()?;
        let words = words_of(&text.to_lowercase()).map(str::to_string).collect();
        Ok(Self {
            text: text.to_string(),
            exact,
            words,
        })
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// At least `ratio` of the literal's words occur as whole words of `lower`.
    fn fuzzy_hit(&self, lower: &str, ratio: f32) -> bool {
        if self.words.is_empty() {
            return false;
        }
        let present: HashSet<&str> = words_of(lower).collect();
        let hits = self
            .words
            .iter()
            .filter(|w| present.contains(w.as_str()))
            .count();
        hits as f32 >= ratio * self.words.len() as f32
    }
}

/// Whitespace-separated words with surrounding punctuation stripped.
fn words_of(text: &str) -> impl Iterator<Item = &str> {
    text.split_whitespace()
        .map(|w| w.trim_matches(|c: char| c.is_ascii_punctuation()))
        .filter(|w| !w.is_empty())
}

#[derive(Debug, Clone)]
pub enum Matcher {
    Literal(LiteralMatcher),
    Regex(Regex),
}

impl Matcher {
    /// Matched texts in `paragraph`; `lower` is its lowercased form.
    ///
    /// Literal: the exact span on a case-insensitive hit, else the pattern text
    /// on a fuzzy hit. Regex: every non-empty, non-overlapping match.
    pub fn find(&self, paragraph: &str, lower: &str, fuzzy_ratio: f32) -> Vec<String> {
        match self {
            Matcher::Literal(lit) => {
                if let Some(m) = lit.exact.find(paragraph) {
                    vec![m.as_str().to_string()]
                } else if lit.fuzzy_hit(lower, fuzzy_ratio) {
                    vec![lit.text.clone()]
                } else {
                    Vec::new()
                }
            }
            Matcher::Regex(re) => re
                .find_iter(paragraph)
                .filter(|m| !m.as_str().is_empty())
                .map(|m| m.as_str().to_string())
                .collect(),
        }
    }

    pub fn kind(&self) -> MatchKind {
        match self {
            Matcher::Literal(_) => MatchKind::Literal,
            Matcher::Regex(_) => MatchKind::Regex,
        }
    }

    pub fn value(&self) -> &str {
        match self {
            Matcher::Literal(lit) => lit.text(),
            Matcher::Regex(re) => re.as_str(),
        }
    }
}

/// A compiled, immutable clause pattern.
#[derive(Debug, Clone)]
pub struct Pattern {
    pub matcher: Matcher,
    pub category: CategoryId,
    pub risk_level: RiskLevel,
    pub description: String,
    pub suggestion: String,
    pub replacement: Option<String>,
    /// Lowercased context phrases.
    pub context_requirements: Vec<String>,
    risk_override: bool,
}

impl Pattern {
    pub fn compile(spec: PatternSpec) -> Result<Self, CoreError> {
        let matcher = match spec.kind {
            MatchKind::Literal => {
                if spec.value.trim().is_empty() {
                    return Err(CoreError::EmptyLiteral(spec.category));
                }
                let lit = LiteralMatcher::new(spec.value.trim()).map_err(|source| {
                    CoreError::InvalidRegex {
                        value: spec.value.clone(),
                        source,
                    }
                })?;
                Matcher::Literal(lit)
            }
            MatchKind::Regex => {
                let re = RegexBuilder::new(&spec.value)
                    .case_insensitive(true)
                    .build()
                    .map_err(|source| CoreError::InvalidRegex {
                        value: spec.value.clone(),
                        source,
                    })?;
                Matcher::Regex(re)
            }
        };

        let risk_override = spec.risk_level.is_some();
        let risk_level = spec
            .risk_level
            .unwrap_or_else(|| lexicon::get(spec.category).risk_level);

        Ok(Self {
            matcher,
            category: spec.category,
            risk_level,
            description: spec.description,
            suggestion: spec.suggestion,
            replacement: spec.replacement,
            context_requirements: spec
                .context
                .iter()
                .map(|c| c.trim().to_lowercase())
                .filter(|c| !c.is_empty())
                .collect(),
            risk_override,
        })
    }

    /// Unconditional patterns always pass; gated ones need one phrase in `lower`.
    pub fn context_satisfied(&self, lower: &str) -> bool {
        self.context_requirements.is_empty()
            || self
                .context_requirements
                .iter()
                .any(|req| lower.contains(req.as_str()))
    }

    /// Matches of this pattern in a paragraph, after the context gate.
    pub fn find_matches(&self, paragraph: &str, lower: &str, fuzzy_ratio: f32) -> Vec<String> {
        if !self.context_satisfied(lower) {
            return Vec::new();
        }
        self.matcher.find(paragraph, lower, fuzzy_ratio)
    }

    pub fn to_change(&self, matched: String) -> Change {
        let suggested_text = self.replacement.clone().unwrap_or_else(|| matched.clone());
        Change {
            original_text: matched,
            suggested_text,
            description: self.description.clone(),
            suggestion: self.suggestion.clone(),
            risk_level: self.risk_level,
            category: self.category,
        }
    }

    pub fn to_spec(&self) -> PatternSpec {
        PatternSpec {
            kind: self.matcher.kind(),
            value: self.matcher.value().to_string(),
            category: self.category,
            risk_level: self.risk_override.then_some(self.risk_level),
            description: self.description.clone(),
            suggestion: self.suggestion.clone(),
            replacement: self.replacement.clone(),
            context: self.context_requirements.clone(),
        }
    }
}

/// Where a table's patterns came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableOrigin {
    Mined,
    Baseline,
    Combined,
}

/// The unified rule set consumed by analysis.
///
/// Built wholesale; there is no API for editing a table in place.
#[derive(Debug, Clone)]
pub struct PatternTable {
    origin: TableOrigin,
    patterns: Vec<Pattern>,
}

#[derive(Serialize, Deserialize)]
struct TableFile {
    origin: TableOrigin,
    patterns: Vec<PatternSpec>,
}

impl PatternTable {
    pub fn new(origin: TableOrigin, patterns: Vec<Pattern>) -> Self {
        Self { origin, patterns }
    }

    pub fn from_specs(origin: TableOrigin, specs: Vec<PatternSpec>) -> Result<Self, CoreError> {
        let patterns = specs
            .into_iter()
            .map(Pattern::compile)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self::new(origin, patterns))
    }

    pub fn origin(&self) -> TableOrigin {
        self.origin
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Distinct categories covered by at least one pattern.
    pub fn categories(&self) -> BTreeSet<CategoryId> {
        self.patterns.iter().map(|p| p.category).collect()
    }

    /// A new table holding this table's patterns followed by `other`'s.
    pub fn combined_with(&self, other: &PatternTable) -> PatternTable {
        let mut patterns = self.patterns.clone();
        patterns.extend(other.patterns.iter().cloned());
        PatternTable::new(TableOrigin::Combined, patterns)
    }

    pub fn to_specs(&self) -> Vec<PatternSpec> {
        self.patterns.iter().map(Pattern::to_spec).collect()
    }

    pub fn to_json(&self) -> Result<String, CoreError> {
        let file = TableFile {
            origin: self.origin,
            patterns: self.to_specs(),
        };
        Ok(serde_json::to_string_pretty(&file)?)
    }

    pub fn from_json(json: &str) -> Result<Self, CoreError> {
        let file: TableFile = serde_json::from_str(json)?;
        Self::from_specs(file.origin, file.patterns)
    }

    pub fn save(&self, path: &Path) -> Result<(), CoreError> {
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self, CoreError> {
        Self::from_json(&fs::read_to_string(path)?)
    }
}

/// Regex that tolerates formatting drift around a mined literal.
///
/// Lowercases, turns whitespace runs into `\s+`, and makes ASCII punctuation
/// optional. Returns `None` when the result would match the empty string.
pub fn tolerant_regex(literal: &str) -> Option<String> {
    let lower = literal.trim().to_lowercase();
    let mut out = String::with_capacity(lower.len() * 2);
    let mut in_space = false;

    for c in lower.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push_str(r"\s+");
                in_space = true;
            }
            continue;
        }
        in_space = false;
        let escaped = regex::escape(c.encode_utf8(&mut [0u8; 4]));
        if c.is_ascii_punctuation() {
            out.push_str(&escaped);
            out.push('?');
        } else {
            out.push_str(&escaped);
        }
    }

    let re = RegexBuilder::new(&out).case_insensitive(true).build().ok()?;
    if re.is_match("") {
        return None;
    }
    Some(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spec(kind: MatchKind, value: &str, context: &[&str]) -> PatternSpec {
        PatternSpec {
            kind,
            value: value.to_string(),
            category: CategoryId::Duration,
            risk_level: None,
            description: "test".into(),
            suggestion: "fix it".into(),
            replacement: None,
            context: context.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn matches(p: &Pattern, text: &str) -> Vec<String> {
        p.find_matches(text, &text.to_lowercase(), 0.5)
    }

    #[test]
    fn literal_exact_is_case_insensitive_and_keeps_span() {
        let p = Pattern::compile(spec(MatchKind::Literal, "in perpetuity", &[])).unwrap();
        assert_eq!(matches(&p, "Binding IN PERPETUITY hereafter"), vec!["IN PERPETUITY"]);
    }

    #[test]
    fn literal_fuzzy_needs_half_the_words() {
        let p = Pattern::compile(spec(
            MatchKind::Literal,
            "shall survive any termination forever",
            &[],
        ))
        .unwrap();
        // 3 of 5 words present.
        assert_eq!(
            matches(&p, "Obligations survive the termination of this deal and shall continue"),
            vec!["shall survive any termination forever"]
        );
        // 1 of 5 words present.
        assert!(matches(&p, "Nothing here but forever").is_empty());
    }

    #[test]
    fn fuzzy_words_must_stand_alone() {
        let p = Pattern::compile(spec(MatchKind::Literal, "all information", &[])).unwrap();
        // "all" inside "shall" and "in" inside "invoice" do not count.
        assert!(matches(&p, "The Purchaser shall pay the invoice within thirty days.").is_empty());
        assert_eq!(
            matches(&p, "It covers all, including the information."),
            vec!["all information"]
        );
    }

    #[test]
    fn fuzzy_ratio_is_configurable() {
        let p = Pattern::compile(spec(MatchKind::Literal, "alpha beta gamma delta", &[])).unwrap();
        let text = "alpha and beta";
        assert_eq!(p.find_matches(text, text, 0.5).len(), 1);
        assert!(p.find_matches(text, text, 0.75).is_empty());
    }

    #[test]
    fn regex_finds_all_non_overlapping() {
        let p = Pattern::compile(spec(MatchKind::Regex, r"perpetu\w*", &[])).unwrap();
        assert_eq!(
            matches(&p, "Perpetual rights, in perpetuity."),
            vec!["Perpetual", "perpetuity"]
        );
    }

    #[test]
    fn context_gate_blocks_and_allows() {
        let p = Pattern::compile(spec(MatchKind::Regex, r"perpetual", &["Confidential"])).unwrap();
        assert!(matches(&p, "The licence is perpetual.").is_empty());
        assert_eq!(
            matches(&p, "Confidential duties are perpetual."),
            vec!["perpetual"]
        );
    }

    #[test]
    fn risk_inherits_from_category_unless_overridden() {
        let p = Pattern::compile(spec(MatchKind::Literal, "x y", &[])).unwrap();
        assert_eq!(p.risk_level, RiskLevel::High);
        let mut s = spec(MatchKind::Literal, "x y", &[]);
        s.risk_level = Some(RiskLevel::Low);
        let p = Pattern::compile(s).unwrap();
        assert_eq!(p.risk_level, RiskLevel::Low);
        assert_eq!(p.to_spec().risk_level, Some(RiskLevel::Low));
    }

    #[test]
    fn change_uses_replacement_when_present() {
        let mut s = spec(MatchKind::Literal, "forever", &[]);
        s.replacement = Some("for three years".into());
        let p = Pattern::compile(s).unwrap();
        let change = p.to_change("Forever".into());
        assert_eq!(change.original_text, "Forever");
        assert_eq!(change.suggested_text, "for three years");
        assert_eq!(change.category, CategoryId::Duration);

        let p = Pattern::compile(spec(MatchKind::Literal, "forever", &[])).unwrap();
        assert_eq!(p.to_change("forever".into()).suggested_text, "forever");
    }

    #[test]
    fn invalid_specs_are_rejected() {
        assert!(matches!(
            Pattern::compile(spec(MatchKind::Regex, "(unclosed", &[])),
            Err(CoreError::InvalidRegex { .. })
        ));
        assert!(matches!(
            Pattern::compile(spec(MatchKind::Literal, "   ", &[])),
            Err(CoreError::EmptyLiteral(CategoryId::Duration))
        ));
    }

    #[test]
    fn tolerant_regex_absorbs_formatting_drift() {
        let src = tolerant_regex("Shall remain  in effect, forever.").unwrap();
        assert_eq!(src, r"shall\s+remain\s+in\s+effect,?\s+forever\.?");
        let re = RegexBuilder::new(&src).case_insensitive(true).build().unwrap();
        assert!(re.is_match("It SHALL REMAIN in\teffect forever"));
        assert!(!re.is_match("shall remain in force forever"));
    }

    #[test]
    fn tolerant_regex_rejects_punctuation_only() {
        assert!(tolerant_regex("...").is_none());
        assert!(tolerant_regex("  ").is_none());
    }

    #[test]
    fn table_json_round_trip_preserves_behaviour() {
        let table = PatternTable::from_specs(
            TableOrigin::Mined,
            vec![
                spec(MatchKind::Literal, "in perpetuity", &["confidential"]),
                spec(MatchKind::Regex, r"forever\b", &[]),
            ],
        )
        .unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("patterns.json");
        table.save(&path).unwrap();

        let loaded = PatternTable::load(&path).unwrap();
        assert_eq!(loaded.origin(), TableOrigin::Mined);
        assert_eq!(loaded.to_specs(), table.to_specs());
        assert_eq!(loaded.categories().len(), 1);
    }

    #[test]
    fn combined_table_keeps_both_sides_in_order() {
        let a = PatternTable::from_specs(
            TableOrigin::Mined,
            vec![spec(MatchKind::Literal, "alpha", &[])],
        )
        .unwrap();
        let b = PatternTable::from_specs(
            TableOrigin::Baseline,
            vec![spec(MatchKind::Literal, "beta", &[])],
        )
        .unwrap();
        let c = a.combined_with(&b);
        assert_eq!(c.origin(), TableOrigin::Combined);
        let values: Vec<&str> = c.patterns().iter().map(|p| p.matcher.value()).collect();
        assert_eq!(values, vec!["alpha", "beta"]);
        assert_eq!(a.len(), 1);
    }
}
