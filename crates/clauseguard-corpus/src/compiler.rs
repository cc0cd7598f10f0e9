//! Turns a mined corpus into the unified [`PatternTable`].

use std::collections::HashSet;
use std::path::Path;

use clauseguard_core::pattern::tolerant_regex;
use clauseguard_core::{
    CategoryId, MatchKind, MinedTriple, Pattern, PatternSpec, PatternTable, TableOrigin,
    baseline_table, lexicon,
};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::CorpusError;
use crate::miner::{CorpusMiner, MinedCorpus, MiningConfig};

/// Example triples kept per category profile.
pub const PROFILE_EXAMPLES: usize = 5;

/// Per-category summary of a mining pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CategoryProfile {
    pub category: CategoryId,
    pub patterns: Vec<String>,
    pub suggestions: Vec<String>,
    pub contexts: Vec<String>,
    /// Word bigrams present in every original text of the category.
    pub common_phrases: Vec<String>,
    pub examples: Vec<MinedTriple>,
}

#[derive(Debug, Clone)]
pub struct CompiledPatterns {
    pub table: PatternTable,
    pub profiles: Vec<CategoryProfile>,
    pub corpus: MinedCorpus,
}

/// Compiles mined triples into a table; mined patterns come first, the
/// baseline rules after them unless disabled.
#[derive(Debug, Clone)]
pub struct PatternCompiler {
    include_baseline: bool,
}

impl Default for PatternCompiler {
    fn default() -> Self {
        Self::new(true)
    }
}

impl PatternCompiler {
    pub fn new(include_baseline: bool) -> Self {
        Self { include_baseline }
    }

    /// The hand-authored rules used when mining finds nothing.
    pub fn baseline() -> PatternTable {
        baseline_table()
    }

    pub fn compile(&self, corpus: MinedCorpus) -> CompiledPatterns {
        let mut patterns = Vec::new();
        let mut profiles = Vec::new();

        for (&category, triples) in &corpus.triples {
            patterns.extend(mined_patterns(category, triples));
            profiles.push(profile(category, triples));
        }

        let table = if patterns.is_empty() {
            info!("no mined patterns, using baseline rules");
            Self::baseline()
        } else {
            let mined = PatternTable::new(TableOrigin::Mined, patterns);
            if self.include_baseline {
                mined.combined_with(&Self::baseline())
            } else {
                mined
            }
        };

        info!(
            origin = ?table.origin(),
            patterns = table.len(),
            categories = table.categories().len(),
            "pattern table compiled"
        );
        CompiledPatterns {
            table,
            profiles,
            corpus,
        }
    }
}

/// Mine `training_dir` and compile the result.
pub async fn compile(training_dir: &Path, config: &MiningConfig) -> Result<CompiledPatterns, CorpusError> {
    let corpus = CorpusMiner::new(config).mine(training_dir).await?;
    Ok(PatternCompiler::new(config.include_baseline).compile(corpus))
}

/// One literal plus one tolerant regex per distinct original text.
fn mined_patterns(category: CategoryId, triples: &[MinedTriple]) -> Vec<Pattern> {
    let description = format!(
        "Previously revised {} language",
        lexicon::get(category).description
    );
    let mut seen = HashSet::new();
    let mut out = Vec::new();

    for triple in triples {
        let original = triple.original_text.trim();
        if original.is_empty() || !seen.insert(original.to_lowercase()) {
            continue;
        }
        let suggestion = if triple.suggested_text.is_empty() {
            "Strike this language".to_string()
        } else {
            format!("Replace with \"{}\"", triple.suggested_text)
        };
        let literal = PatternSpec {
            kind: MatchKind::Literal,
            value: original.to_string(),
            category,
            risk_level: None,
            description: description.clone(),
            suggestion,
            replacement: Some(triple.suggested_text.clone()),
            context: triple.context_text.iter().cloned().collect(),
        };
        let derived = tolerant_regex(original).map(|value| PatternSpec {
            kind: MatchKind::Regex,
            value,
            ..literal.clone()
        });

        for spec in std::iter::once(literal).chain(derived) {
            match Pattern::compile(spec) {
                Ok(p) => out.push(p),
                Err(e) => warn!(category = %category, error = %e, "dropping mined pattern"),
            }
        }
    }
    debug!(category = %category, patterns = out.len(), "mined patterns");
    out
}

fn profile(category: CategoryId, triples: &[MinedTriple]) -> CategoryProfile {
    let originals: Vec<&str> = triples.iter().map(|t| t.original_text.as_str()).collect();
    CategoryProfile {
        category,
        patterns: distinct(originals.iter().copied()),
        suggestions: distinct(triples.iter().map(|t| t.suggested_text.as_str())),
        contexts: distinct(triples.iter().filter_map(|t| t.context_text.as_deref())),
        common_phrases: common_phrases(&originals),
        examples: triples.iter().take(PROFILE_EXAMPLES).cloned().collect(),
    }
}

/// Non-empty texts, first occurrence of each (case-insensitive) kept.
fn distinct<'a>(texts: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen = HashSet::new();
    texts
        .map(str::trim)
        .filter(|t| !t.is_empty() && seen.insert(t.to_lowercase()))
        .map(str::to_string)
        .collect()
}

/// Lowercased word bigrams that occur in every non-empty text, sorted.
pub fn common_phrases(texts: &[&str]) -> Vec<String> {
    let lower: Vec<String> = texts
        .iter()
        .map(|t| t.to_lowercase())
        .filter(|t| !t.trim().is_empty())
        .collect();

    let mut phrases: Vec<String> = lower
        .iter()
        .flat_map(|text| {
            let words: Vec<&str> = text.split_whitespace().collect();
            words
                .windows(2)
                .map(|pair| pair.join(" "))
                .collect::<Vec<_>>()
        })
        .filter(|phrase| lower.iter().all(|t| t.contains(phrase.as_str())))
        .collect();
    phrases.sort();
    phrases.dedup();
    phrases
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    use crate::fixtures::{del, ins, para, run, write_docx};

    fn triple(original: &str, suggested: &str, context: Option<&str>) -> MinedTriple {
        MinedTriple {
            original_text: original.into(),
            suggested_text: suggested.into(),
            context_text: context.map(str::to_string),
        }
    }

    fn corpus(entries: Vec<(CategoryId, Vec<MinedTriple>)>) -> MinedCorpus {
        MinedCorpus {
            triples: entries.into_iter().collect::<BTreeMap<_, _>>(),
            ..MinedCorpus::default()
        }
    }

    #[test]
    fn empty_corpus_falls_back_to_baseline() {
        let compiled = PatternCompiler::default().compile(MinedCorpus::default());
        assert_eq!(compiled.table.origin(), TableOrigin::Baseline);
        assert_eq!(compiled.table.len(), PatternCompiler::baseline().len());
        assert!(compiled.profiles.is_empty());
    }

    #[test]
    fn one_literal_and_one_regex_per_distinct_original() {
        let compiled = PatternCompiler::new(false).compile(corpus(vec![(
            CategoryId::Duration,
            vec![
                triple("in perpetuity", "for three years", Some("obligations survive")),
                triple("  IN PERPETUITY ", "for two years", None),
                triple("forever", "", None),
            ],
        )]));
        let table = &compiled.table;
        assert_eq!(table.origin(), TableOrigin::Mined);
        assert_eq!(table.len(), 4);

        let lit = &table.patterns()[0];
        assert_eq!(lit.matcher.kind(), MatchKind::Literal);
        assert_eq!(lit.matcher.value(), "in perpetuity");
        assert_eq!(lit.description, "Previously revised term and duration language");
        assert_eq!(lit.suggestion, "Replace with \"for three years\"");
        assert_eq!(lit.replacement.as_deref(), Some("for three years"));
        assert_eq!(lit.context_requirements, vec!["obligations survive"]);

        let re = &table.patterns()[1];
        assert_eq!(re.matcher.kind(), MatchKind::Regex);
        assert_eq!(re.matcher.value(), r"in\s+perpetuity");
        assert_eq!(re.suggestion, lit.suggestion);

        let strike = &table.patterns()[2];
        assert_eq!(strike.suggestion, "Strike this language");
        assert_eq!(strike.replacement.as_deref(), Some(""));
    }

    #[test]
    fn insertion_only_triples_feed_profile_not_table() {
        let compiled = PatternCompiler::default().compile(corpus(vec![(
            CategoryId::GoverningLaw,
            vec![triple("", "governed by Delaware law", Some("this agreement"))],
        )]));
        // No match patterns at all, so the baseline stands in.
        assert_eq!(compiled.table.origin(), TableOrigin::Baseline);
        let profile = &compiled.profiles[0];
        assert!(profile.patterns.is_empty());
        assert_eq!(profile.suggestions, vec!["governed by Delaware law"]);
        assert_eq!(profile.examples.len(), 1);
    }

    #[test]
    fn baseline_is_appended_after_mined_by_default() {
        let compiled = PatternCompiler::default().compile(corpus(vec![(
            CategoryId::Assignment,
            vec![triple("may freely assign", "may not assign", None)],
        )]));
        let table = &compiled.table;
        assert_eq!(table.origin(), TableOrigin::Combined);
        assert_eq!(table.len(), 2 + PatternCompiler::baseline().len());
        assert_eq!(table.patterns()[0].matcher.value(), "may freely assign");
    }

    #[test]
    fn baseline_can_be_left_out() {
        let compiled = PatternCompiler::new(false).compile(corpus(vec![(
            CategoryId::Assignment,
            vec![triple("may freely assign", "may not assign", None)],
        )]));
        assert_eq!(compiled.table.origin(), TableOrigin::Mined);
        assert_eq!(compiled.table.len(), 2);
    }

    #[test]
    fn profile_caps_examples() {
        let triples: Vec<MinedTriple> = (0..8)
            .map(|i| triple(&format!("all information {i}"), "marked information", None))
            .collect();
        let compiled =
            PatternCompiler::new(false).compile(corpus(vec![(CategoryId::Scope, triples)]));
        let profile = &compiled.profiles[0];
        assert_eq!(profile.examples.len(), PROFILE_EXAMPLES);
        assert_eq!(profile.patterns.len(), 8);
        assert_eq!(profile.suggestions, vec!["marked information"]);
        assert_eq!(profile.common_phrases, vec!["all information"]);

        let json = serde_json::to_value(profile).unwrap();
        assert_eq!(json["category"], "scope");
        assert_eq!(json["examples"][0]["original_text"], "all information 0");
    }

    #[test]
    fn common_phrases_must_appear_everywhere() {
        let phrases = common_phrases(&[
            "shall survive termination forever",
            "Obligations shall survive termination",
            "",
        ]);
        assert_eq!(phrases, vec!["shall survive", "survive termination"]);
        assert!(common_phrases(&[]).is_empty());
    }

    #[tokio::test]
    async fn compile_reports_missing_directory() {
        let err = compile(Path::new("/nonexistent/training"), &MiningConfig::default())
            .await
            .unwrap_err();
        assert!(matches!(err, CorpusError::CorpusNotFound(_)));
    }

    #[tokio::test]
    async fn compile_mines_directory_end_to_end() {
        let dir = tempfile::tempdir().unwrap();
        write_docx(
            &dir.path().join("nda.docx"),
            &[para(&[
                run("The Recipient shall hold "),
                del("all information"),
                ins("information marked confidential"),
                run(" in confidence."),
            ])],
        );

        let config = MiningConfig {
            include_baseline: false,
            ..MiningConfig::default()
        };
        let compiled = compile(dir.path(), &config).await.unwrap();
        assert_eq!(compiled.corpus.documents_scanned, 1);
        assert_eq!(compiled.table.origin(), TableOrigin::Mined);
        assert_eq!(compiled.table.len(), 2);
        let p = &compiled.table.patterns()[0];
        assert_eq!(p.matcher.value(), "all information");
        assert_eq!(p.context_requirements, vec!["the recipient shall hold"]);
    }

    #[tokio::test]
    async fn mined_table_still_flags_baseline_risks() {
        let dir = tempfile::tempdir().unwrap();
        write_docx(
            &dir.path().join("nda.docx"),
            &[para(&[
                run("Either party "),
                del("may freely assign"),
                ins("may not assign"),
                run(" this Agreement."),
            ])],
        );

        let compiled = compile(dir.path(), &MiningConfig::default()).await.unwrap();
        let table = &compiled.table;
        assert_eq!(table.origin(), TableOrigin::Combined);
        assert_eq!(table.patterns()[0].matcher.value(), "may freely assign");

        let text = "This Agreement shall remain confidential in perpetuity and shall survive termination.";
        let lower = text.to_lowercase();
        assert!(table.patterns().iter().any(|p| {
            p.category == CategoryId::Duration && !p.find_matches(text, &lower, 0.5).is_empty()
        }));
    }

    #[tokio::test]
    async fn empty_directory_compiles_to_baseline() {
        let dir = tempfile::tempdir().unwrap();
        let compiled = compile(dir.path(), &MiningConfig::default()).await.unwrap();
        assert_eq!(compiled.corpus.documents_scanned, 0);
        assert!(compiled.profiles.is_empty());
        assert_eq!(compiled.table.origin(), TableOrigin::Baseline);
        assert_eq!(compiled.table.len(), PatternCompiler::baseline().len());
    }

    #[tokio::test]
    async fn unreadable_corpus_falls_back_to_baseline() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("broken.docx"), b"garbage").unwrap();
        let compiled = compile(dir.path(), &MiningConfig::default()).await.unwrap();
        assert_eq!(compiled.corpus.documents_skipped, 1);
        assert_eq!(compiled.table.origin(), TableOrigin::Baseline);
    }
}
