//! Plain-text rendering of training summaries and analysis reports.

use std::path::Path;

use clauseguard_core::{Analysis, RiskLevel, lexicon};
use clauseguard_corpus::{CategoryProfile, CompiledPatterns};

const MAX_LIST_ITEMS: usize = 10;
const MAX_TEXT_WIDTH: usize = 72;

// ── Training ──

pub fn print_training_summary(compiled: &CompiledPatterns) {
    let corpus = &compiled.corpus;
    println!("=== Training corpus ===");
    println!("  {:<26} {}", "documents scanned", corpus.documents_scanned);
    println!("  {:<26} {}", "documents skipped", corpus.documents_skipped);
    println!("  {:<26} {}", "insertions", corpus.insertions);
    println!("  {:<26} {}", "deletions", corpus.deletions);
    println!("  {:<26} {}", "mined changes", corpus.triple_count());
    println!();

    for profile in &compiled.profiles {
        print_profile(profile);
    }

    let table = &compiled.table;
    println!("=== Pattern table ===");
    println!("  {:<26} {:?}", "origin", table.origin());
    println!("  {:<26} {}", "patterns", table.len());
    let categories: Vec<&str> = table.categories().iter().map(|c| c.as_str()).collect();
    println!("  {:<26} {}", "categories", categories.join(", "));
}

fn print_profile(profile: &CategoryProfile) {
    let category = lexicon::get(profile.category);
    println!(
        "{} [{}] ({} examples)",
        category.id,
        category.risk_level,
        profile.examples.len()
    );
    print_list("patterns", &profile.patterns);
    print_list("suggestions", &profile.suggestions);
    print_list("contexts", &profile.contexts);
    print_list("common phrases", &profile.common_phrases);
    println!();
}

// ── Analysis ──

pub fn print_analysis(path: &Path, analysis: &Analysis) {
    println!("=== {} ===", path.display());
    println!("  {:<26} {}", "overall risk", analysis.overall_risk_level);
    println!("  {:<26} {}", "flagged changes", analysis.changes.len());
    println!();

    if !analysis.changes.is_empty() {
        println!("Changes");
        for level in [RiskLevel::High, RiskLevel::Medium, RiskLevel::Low] {
            let changes: Vec<_> = analysis
                .changes
                .iter()
                .filter(|c| c.risk_level == level)
                .collect();
            for change in changes.iter().take(MAX_LIST_ITEMS) {
                println!(
                    "  [{:<6}] {:<22} {}",
                    change.risk_level,
                    change.category,
                    shorten(&change.original_text, MAX_TEXT_WIDTH)
                );
                println!("  {:<31} {}", "", change.description);
                println!("  {:<31} {}", "", shorten(&change.suggestion, MAX_TEXT_WIDTH));
            }
            if changes.len() > MAX_LIST_ITEMS {
                println!("    ... and {} more {level}", changes.len() - MAX_LIST_ITEMS);
            }
        }
        println!();
    }

    println!("Risk assessment");
    for (level, paragraphs) in analysis.risk_assessment.iter().rev() {
        println!("  {:<26} {} paragraphs", level, paragraphs.len());
    }
    println!();

    if !analysis.clause_categories.is_empty() {
        println!("Clause categories");
        for (category, paragraphs) in &analysis.clause_categories {
            println!("  {:<26} {} paragraphs", category, paragraphs.len());
        }
        println!();
    }

    if !analysis.missing_clauses.is_empty() {
        println!("Missing clauses");
        for missing in &analysis.missing_clauses {
            println!("  {missing}");
        }
        println!();
    }
}

// ── Lexicon ──

pub fn print_categories() {
    println!("  {:<24} {:<8} keywords", "category", "risk");
    for category in lexicon::categories() {
        println!(
            "  {:<24} {:<8} {}",
            category.id,
            category.risk_level,
            category.keywords.join(", ")
        );
    }
}

// ── Helpers ──

fn print_list(header: &str, items: &[String]) {
    if items.is_empty() {
        return;
    }
    println!("  {} ({}):", header, items.len());
    for item in items.iter().take(MAX_LIST_ITEMS) {
        println!("    {}", shorten(item, MAX_TEXT_WIDTH));
    }
    if items.len() > MAX_LIST_ITEMS {
        println!("    ... and {} more", items.len() - MAX_LIST_ITEMS);
    }
}

/// Cut `text` to at most `width` characters, marking the cut with `...`.
fn shorten(text: &str, width: usize) -> String {
    if text.chars().count() <= width {
        return text.to_string();
    }
    let kept: String = text.chars().take(width.saturating_sub(3)).collect();
    format!("{kept}...")
}
