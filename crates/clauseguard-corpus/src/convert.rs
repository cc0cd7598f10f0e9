//! Legacy `.doc` to `.docx` conversion.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::CorpusError;

/// Turns a legacy binary document into a `.docx` package inside `out_dir`.
#[async_trait]
pub trait LegacyConverter: Send + Sync {
    async fn convert(&self, source: &Path, out_dir: &Path) -> Result<PathBuf, CorpusError>;
}

/// Shells out to an office suite in headless mode
/// (`<program> --headless --convert-to docx --outdir <dir> <file>`).
#[derive(Debug, Clone)]
pub struct OfficeConverter {
    program: String,
    timeout: Duration,
}

impl OfficeConverter {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }
}

#[async_trait]
impl LegacyConverter for OfficeConverter {
    async fn convert(&self, source: &Path, out_dir: &Path) -> Result<PathBuf, CorpusError> {
        let stem = source
            .file_stem()
            .ok_or_else(|| CorpusError::conversion(source, "no file name"))?;
        let converted = out_dir.join(format!("{}.docx", stem.to_string_lossy()));

        debug!(program = %self.program, source = %source.display(), "converting legacy document");
        let child = Command::new(&self.program)
            .arg("--headless")
            .arg("--convert-to")
            .arg("docx")
            .arg("--outdir")
            .arg(out_dir)
            .arg(source)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| CorpusError::conversion(source, format!("{}: {e}", self.program)))?;

        // Dropping the wait future on timeout kills the child.
        let output = tokio::time::timeout(self.timeout, child.wait_with_output())
            .await
            .map_err(|_| {
                CorpusError::conversion(source, format!("timed out after {:?}", self.timeout))
            })?
            .map_err(|e| CorpusError::conversion(source, e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(CorpusError::conversion(
                source,
                format!("{} exited with {}: {}", self.program, output.status, stderr.trim()),
            ));
        }
        if !converted.is_file() {
            return Err(CorpusError::conversion(source, "converter produced no output"));
        }
        Ok(converted)
    }
}
