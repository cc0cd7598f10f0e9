//! Training corpus mining: scan a directory of redlined documents and collect
//! categorized (original, suggested, context) triples.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use clauseguard_core::{CategoryId, MinedTriple, RevisionKind, lexicon};
use serde::{Deserialize, Serialize};
use tempfile::TempDir;
use tracing::{debug, info, warn};

use crate::convert::{LegacyConverter, OfficeConverter};
use crate::docx::{self, DocFormat};
use crate::error::CorpusError;
use crate::markup::RevisionMarkup;

pub const DEFAULT_CONTEXT_WINDOW: usize = 6;
pub const DEFAULT_CONVERTER: &str = "soffice";
pub const DEFAULT_CONVERT_TIMEOUT_SECS: u64 = 120;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MiningConfig {
    /// Words of surrounding text kept as a triple's context.
    pub context_window: usize,
    /// Append the baseline rules after the mined patterns (on by default).
    pub include_baseline: bool,
    /// Office suite used for legacy `.doc` files.
    pub converter_program: String,
    pub convert_timeout_secs: u64,
}

impl Default for MiningConfig {
    fn default() -> Self {
        Self {
            context_window: DEFAULT_CONTEXT_WINDOW,
            include_baseline: true,
            converter_program: DEFAULT_CONVERTER.to_string(),
            convert_timeout_secs: DEFAULT_CONVERT_TIMEOUT_SECS,
        }
    }
}

impl MiningConfig {
    pub fn convert_timeout(&self) -> Duration {
        Duration::from_secs(self.convert_timeout_secs)
    }
}

/// Triples grouped by lexicon category, plus scan counters.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct MinedCorpus {
    pub triples: BTreeMap<CategoryId, Vec<MinedTriple>>,
    pub documents_scanned: usize,
    pub documents_skipped: usize,
    pub insertions: usize,
    pub deletions: usize,
}

impl MinedCorpus {
    pub fn is_empty(&self) -> bool {
        self.triples.is_empty()
    }

    pub fn triple_count(&self) -> usize {
        self.triples.values().map(Vec::len).sum()
    }

    /// Fold one document's markup into the corpus.
    pub fn absorb(&mut self, markup: &RevisionMarkup, context_window: usize) {
        for event in markup.events() {
            match event.kind {
                RevisionKind::Insertion => self.insertions += 1,
                RevisionKind::Deletion => self.deletions += 1,
            }
        }
        for triple in markup.mine_triples(context_window) {
            let category = lexicon::categorize(&triple.union_text());
            self.triples.entry(category).or_default().push(triple);
        }
    }
}

pub struct CorpusMiner {
    converter: Box<dyn LegacyConverter>,
    context_window: usize,
}

impl CorpusMiner {
    pub fn new(config: &MiningConfig) -> Self {
        Self::with_converter(
            Box::new(OfficeConverter::new(
                config.converter_program.clone(),
                config.convert_timeout(),
            )),
            config.context_window,
        )
    }

    pub fn with_converter(converter: Box<dyn LegacyConverter>, context_window: usize) -> Self {
        Self {
            converter,
            context_window,
        }
    }

    /// Mine every `.docx` and `.doc` directly inside `dir`, in file-name order.
    ///
    /// A missing directory is an error. Individual documents that cannot be
    /// read or converted are logged and skipped.
    pub async fn mine(&self, dir: &Path) -> Result<MinedCorpus, CorpusError> {
        if !dir.is_dir() {
            return Err(CorpusError::CorpusNotFound(dir.to_path_buf()));
        }
        let candidates = list_candidates(dir)?;
        info!(dir = %dir.display(), documents = candidates.len(), "mining training corpus");

        let mut scratch: Option<TempDir> = None;
        let mut corpus = MinedCorpus::default();

        for (path, format) in candidates {
            match self.load(&path, format, &mut scratch).await {
                Ok(markup) => {
                    corpus.absorb(&markup, self.context_window);
                    corpus.documents_scanned += 1;
                    debug!(path = %path.display(), "mined document");
                }
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "skipping training document");
                    corpus.documents_skipped += 1;
                }
            }
        }

        info!(
            scanned = corpus.documents_scanned,
            skipped = corpus.documents_skipped,
            insertions = corpus.insertions,
            deletions = corpus.deletions,
            triples = corpus.triple_count(),
            categories = corpus.triples.len(),
            "corpus mined"
        );
        Ok(corpus)
    }

    async fn load(
        &self,
        path: &Path,
        format: DocFormat,
        scratch: &mut Option<TempDir>,
    ) -> Result<RevisionMarkup, CorpusError> {
        let docx_path = match format {
            DocFormat::Docx => path.to_path_buf(),
            DocFormat::Doc => {
                let out_dir = match scratch {
                    Some(dir) => dir.path().to_path_buf(),
                    None => scratch.insert(tempfile::tempdir()?).path().to_path_buf(),
                };
                self.converter.convert(path, &out_dir).await?
            }
        };
        let source = path.to_path_buf();
        tokio::task::spawn_blocking(move || docx::read_revisions(&docx_path))
            .await
            .map_err(|e| CorpusError::unreadable(source, e))?
    }
}

/// Candidate documents directly inside `dir`, sorted by file name.
fn list_candidates(dir: &Path) -> Result<Vec<(PathBuf, DocFormat)>, CorpusError> {
    let mut found = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        if let Some(format) = DocFormat::of(&path) {
            found.push((path, format));
        }
    }
    found.sort_by(|a, b| a.0.file_name().cmp(&b.0.file_name()));
    Ok(found)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{del, ins, para, run, write_docx};
    use async_trait::async_trait;

    /// Converter standing in for an office suite: copies a prepared `.docx`
    /// or fails outright.
    struct StubConverter {
        prepared: Option<PathBuf>,
    }

    #[async_trait]
    impl LegacyConverter for StubConverter {
        async fn convert(&self, source: &Path, out_dir: &Path) -> Result<PathBuf, CorpusError> {
            let prepared = self
                .prepared
                .as_ref()
                .ok_or_else(|| CorpusError::conversion(source, "stub refuses"))?;
            let target = out_dir.join("converted.docx");
            std::fs::copy(prepared, &target)?;
            Ok(target)
        }
    }

    fn miner(prepared: Option<PathBuf>) -> CorpusMiner {
        CorpusMiner::with_converter(Box::new(StubConverter { prepared }), DEFAULT_CONTEXT_WINDOW)
    }

    #[test]
    fn default_config() {
        let config = MiningConfig::default();
        assert_eq!(config.context_window, 6);
        assert!(config.include_baseline);
        assert_eq!(config.converter_program, "soffice");
        assert_eq!(config.convert_timeout(), Duration::from_secs(120));
    }

    #[tokio::test]
    async fn missing_directory_is_an_error() {
        let err = miner(None)
            .mine(Path::new("/nonexistent/training"))
            .await
            .unwrap_err();
        assert!(matches!(err, CorpusError::CorpusNotFound(_)));
    }

    #[tokio::test]
    async fn empty_directory_mines_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let corpus = miner(None).mine(dir.path()).await.unwrap();
        assert!(corpus.is_empty());
        assert_eq!(corpus.documents_scanned, 0);
    }

    #[tokio::test]
    async fn mines_and_categorizes_redlines() {
        let dir = tempfile::tempdir().unwrap();
        write_docx(
            &dir.path().join("a.docx"),
            &[para(&[
                run("The confidentiality obligations "),
                del("shall be perpetual"),
                ins("shall last for a period of three years"),
            ])],
        );
        write_docx(
            &dir.path().join("b.DOCX"),
            &[para(&[
                run("Disputes arising hereunder: "),
                del("the courts of New York have jurisdiction"),
                ins("the courts of Delaware have jurisdiction"),
            ])],
        );
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();
        std::fs::write(dir.path().join("~$a.docx"), "lock file").unwrap();

        let corpus = miner(None).mine(dir.path()).await.unwrap();
        assert_eq!(corpus.documents_scanned, 2);
        assert_eq!(corpus.documents_skipped, 0);
        assert_eq!(corpus.insertions, 2);
        assert_eq!(corpus.deletions, 2);

        let duration = &corpus.triples[&CategoryId::Duration];
        assert_eq!(duration[0].original_text, "shall be perpetual");
        assert_eq!(
            duration[0].context_text.as_deref(),
            Some("The confidentiality obligations")
        );
        let law = &corpus.triples[&CategoryId::GoverningLaw];
        assert_eq!(law[0].suggested_text, "the courts of Delaware have jurisdiction");
    }

    #[tokio::test]
    async fn unreadable_documents_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("corrupt.docx"), b"garbage").unwrap();
        std::fs::write(dir.path().join("legacy.doc"), b"binary").unwrap();
        write_docx(
            &dir.path().join("good.docx"),
            &[para(&[del("all information"), ins("marked information")])],
        );

        let corpus = miner(None).mine(dir.path()).await.unwrap();
        assert_eq!(corpus.documents_scanned, 1);
        assert_eq!(corpus.documents_skipped, 2);
        assert_eq!(corpus.triple_count(), 1);
    }

    #[tokio::test]
    async fn legacy_documents_go_through_converter() {
        let prepared_dir = tempfile::tempdir().unwrap();
        let prepared = prepared_dir.path().join("prepared.docx");
        write_docx(
            &prepared,
            &[para(&[
                run("Recipient "),
                del("may assign this Agreement"),
                ins("may not assign this Agreement"),
            ])],
        );

        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("legacy.DOC"), b"binary").unwrap();

        let corpus = miner(Some(prepared)).mine(dir.path()).await.unwrap();
        assert_eq!(corpus.documents_scanned, 1);
        assert_eq!(
            corpus.triples[&CategoryId::Assignment][0].suggested_text,
            "may not assign this Agreement"
        );
    }
}
