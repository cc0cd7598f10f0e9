//! Hand-authored fallback patterns for NDA review.
//!
//! Used when no training corpus is available or mining yields no pairable
//! changes. Every pattern is gated on confidentiality or obligation
//! vocabulary so that generic wording ("perpetual licence", "all data") in
//! unrelated clauses does not fire.

use crate::lexicon::CategoryId;
use crate::pattern::{MatchKind, PatternSpec, PatternTable, TableOrigin};

const CONFIDENTIALITY_CONTEXT: &[&str] = &[
    "confidential",
    "non-disclosure",
    "nondisclosure",
    "proprietary",
    "disclos",
];

const OBLIGATION_CONTEXT: &[&str] = &[
    "confidential",
    "obligation",
    "non-disclosure",
    "nondisclosure",
    "recipient",
    "disclos",
    "undertak",
];

const INFORMATION_CONTEXT: &[&str] = &["confidential", "information", "proprietary", "disclos"];

const BREACH_CONTEXT: &[&str] = &["confidential", "breach", "disclos", "obligation"];

struct Row {
    category: CategoryId,
    regex: &'static str,
    description: &'static str,
    suggestion: &'static str,
    replacement: &'static str,
    context: &'static [&'static str],
}

const ROWS: &[Row] = &[
    // ── duration ──
    Row {
        category: CategoryId::Duration,
        regex: r"\bperpetu(?:al|ally|ity)\b",
        description: "Perpetual confidentiality obligations",
        suggestion: "Consider adding a reasonable time limit for confidentiality obligations",
        replacement: "for a period of five (5) years",
        context: CONFIDENTIALITY_CONTEXT,
    },
    Row {
        category: CategoryId::Duration,
        regex: r"\bindefinite(?:ly)?\b",
        description: "Open-ended confidentiality term",
        suggestion: "Replace the open-ended term with a fixed number of years",
        replacement: "for a period of five (5) years",
        context: OBLIGATION_CONTEXT,
    },
    Row {
        category: CategoryId::Duration,
        regex: r"\bforever\b",
        description: "Unlimited duration of obligations",
        suggestion: "Limit the obligation to a defined period after disclosure",
        replacement: "for a period of five (5) years",
        context: OBLIGATION_CONTEXT,
    },
    Row {
        category: CategoryId::Duration,
        regex: r"\bsurvives?\s+(?:any\s+|the\s+)?(?:termination|expiration|expiry)\b",
        description: "Obligations survive termination without limit",
        suggestion: "Cap survival to a fixed period after termination",
        replacement: "survive for two (2) years following termination",
        context: CONFIDENTIALITY_CONTEXT,
    },
    // ── scope ──
    Row {
        category: CategoryId::Scope,
        regex: r"\b(?:all|any)\s+(?:information|data|materials?)\b",
        description: "Overly broad confidentiality scope",
        suggestion: "Specify the types of information that are considered confidential",
        replacement: "specifically identified confidential information",
        context: INFORMATION_CONTEXT,
    },
    Row {
        category: CategoryId::Scope,
        regex: r"\bshall\s+be\s+deemed\b.{0,160}?\bas\s+defined\b",
        description: "Blanket deeming of information as confidential",
        suggestion: "Limit confidential status to information marked or identified as confidential",
        replacement: "shall be considered confidential only if marked or identified as such",
        context: INFORMATION_CONTEXT,
    },
    Row {
        category: CategoryId::Scope,
        regex: r"\bwhether\s+or\s+not\s+(?:marked|identified|designated|labell?ed)\b",
        description: "Unmarked information treated as confidential",
        suggestion: "Require confidential information to be marked or confirmed in writing",
        replacement: "that is marked or identified in writing as confidential",
        context: CONFIDENTIALITY_CONTEXT,
    },
    Row {
        category: CategoryId::Scope,
        regex: r"\bin\s+any\s+(?:form|medium|manner)\b",
        description: "Scope extends to every form of disclosure",
        suggestion: "Enumerate the forms of disclosure covered by the agreement",
        replacement: "in written or electronic form",
        context: INFORMATION_CONTEXT,
    },
    Row {
        category: CategoryId::Scope,
        regex: r"\bincluding\s+(?:but\s+not\s+limited\s+to|without\s+limitation)\b",
        description: "Open-ended definition of confidential information",
        suggestion: "Replace the open-ended list with an exhaustive definition",
        replacement: "consisting of",
        context: INFORMATION_CONTEXT,
    },
    // ── liability ──
    Row {
        category: CategoryId::Liability,
        regex: r"\bunlimited\s+liability\b",
        description: "Unlimited liability for breach",
        suggestion: "Cap liability at a defined amount",
        replacement: "liability capped at the fees paid in the preceding twelve (12) months",
        context: BREACH_CONTEXT,
    },
    Row {
        category: CategoryId::Liability,
        regex: r"\bindemnif(?:y|ies|ication)\b.{0,80}?\b(?:any\s+and\s+all|all)\s+(?:losses|claims|damages)\b",
        description: "Broad indemnification obligation",
        suggestion: "Limit indemnification to direct losses caused by a material breach",
        replacement: "indemnify against direct losses arising from a material breach",
        context: BREACH_CONTEXT,
    },
    Row {
        category: CategoryId::Liability,
        regex: r"\b(?:liquidated|punitive|exemplary)\s+damages\b",
        description: "Penalty-style damages for breach",
        suggestion: "Remove liquidated or punitive damages and rely on actual damages",
        replacement: "actual damages",
        context: BREACH_CONTEXT,
    },
    Row {
        category: CategoryId::Liability,
        regex: r"\bwithout\s+(?:the\s+)?(?:need|necessity|requirement)\s+(?:to|of)\s+(?:post(?:ing)?|prov(?:e|ing))\b",
        description: "Equitable relief without usual safeguards",
        suggestion: "Keep equitable relief subject to the usual requirements of the court",
        replacement: "subject to applicable requirements to",
        context: BREACH_CONTEXT,
    },
    // ── intellectual property ──
    Row {
        category: CategoryId::IntellectualProperty,
        regex: r"\b(?:no\s+reverse\s+engineering|reverse[-\s]engineer(?:ing|ed)?)\b",
        description: "Restrictive reverse engineering clause",
        suggestion: "Consider allowing reverse engineering for interoperability purposes",
        replacement: "no reverse engineering except for interoperability purposes",
        context: INFORMATION_CONTEXT,
    },
    Row {
        category: CategoryId::IntellectualProperty,
        regex: r"\b(?:assigns?|transfers?)\b.{0,60}?\b(?:right|title|interest)s?\b.{0,60}?\b(?:intellectual\s+property|inventions?|improvements?)\b",
        description: "Transfer of recipient intellectual property",
        suggestion: "Confidentiality agreements should not transfer ownership of intellectual property",
        replacement: "retains all right, title and interest in its own intellectual property",
        context: CONFIDENTIALITY_CONTEXT,
    },
    Row {
        category: CategoryId::IntellectualProperty,
        regex: r"\bderivative\s+works?\b",
        description: "Ownership claim over derivative works",
        suggestion: "Limit ownership to the disclosed information itself",
        replacement: "the disclosed information",
        context: CONFIDENTIALITY_CONTEXT,
    },
    Row {
        category: CategoryId::IntellectualProperty,
        regex: r"\bfeedback\b.{0,80}?\b(?:sole|exclusive)\s+property\b",
        description: "Feedback becomes the discloser's property",
        suggestion: "Grant a licence to feedback rather than ownership",
        replacement: "may be used under a non-exclusive licence",
        context: CONFIDENTIALITY_CONTEXT,
    },
    // ── confidentiality ──
    Row {
        category: CategoryId::Confidentiality,
        regex: r"\b(?:even\s+if|regardless\s+of\s+whether)\b.{0,80}?\bpublic(?:ly)?\b",
        description: "Public information treated as confidential",
        suggestion: "Add the standard exclusion for publicly available information",
        replacement: "except information that is or becomes publicly available",
        context: CONFIDENTIALITY_CONTEXT,
    },
    Row {
        category: CategoryId::Confidentiality,
        regex: r"\b(?:sole|absolute)\s+discretion\b",
        description: "Unilateral control over confidentiality designations",
        suggestion: "Require designations to be reasonable and made in writing",
        replacement: "reasonable discretion, exercised in writing",
        context: CONFIDENTIALITY_CONTEXT,
    },
    Row {
        category: CategoryId::Confidentiality,
        regex: r"\b(?:any|all)\s+(?:employees?|personnel|third\s+part(?:y|ies))\b.{0,60}?\bwithout\s+(?:limitation|restriction)\b",
        description: "Unrestricted onward disclosure",
        suggestion: "Limit disclosure to representatives with a need to know",
        replacement: "representatives who need to know and are bound by confidentiality obligations",
        context: CONFIDENTIALITY_CONTEXT,
    },
    // ── assignment ──
    Row {
        category: CategoryId::Assignment,
        regex: r"\b(?:assign|transfer)\w*\b.{0,60}?\bwithout\b.{0,30}?\bconsent\b",
        description: "Restrictive assignment clause",
        suggestion: "Allow assignment to affiliates or in case of merger/acquisition",
        replacement: "with prior written consent, not to be unreasonably withheld",
        context: OBLIGATION_CONTEXT,
    },
];

/// Pattern specs of the baseline table, in table order.
pub fn baseline_specs() -> Vec<PatternSpec> {
    ROWS.iter()
        .map(|row| PatternSpec {
            kind: MatchKind::Regex,
            value: row.regex.to_string(),
            category: row.category,
            risk_level: None,
            description: row.description.to_string(),
            suggestion: row.suggestion.to_string(),
            replacement: Some(row.replacement.to_string()),
            context: row.context.iter().map(|c| c.to_string()).collect(),
        })
        .collect()
}

/// The compiled baseline table.
pub fn baseline_table() -> PatternTable {
    // A row that fails to compile is dropped.
    let patterns = baseline_specs()
        .into_iter()
        .filter_map(|spec| match crate::pattern::Pattern::compile(spec) {
            Ok(p) => Some(p),
            Err(e) => {
                tracing::error!(error = %e, "baseline pattern failed to compile");
                None
            }
        })
        .collect();
    PatternTable::new(TableOrigin::Baseline, patterns)
}
