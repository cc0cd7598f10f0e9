//! Training corpus side of clauseguard: reads tracked changes out of redlined
//! `.docx` (and converted `.doc`) documents, mines them into categorized
//! triples, and compiles those into a [`PatternTable`](clauseguard_core::PatternTable).

pub mod compiler;
pub mod convert;
pub mod docx;
mod error;
pub mod markup;
pub mod miner;

#[cfg(test)]
mod fixtures;

pub use compiler::{CategoryProfile, CompiledPatterns, PatternCompiler, compile};
pub use convert::{LegacyConverter, OfficeConverter};
pub use docx::read_paragraphs;
pub use error::CorpusError;
pub use markup::RevisionMarkup;
pub use miner::{CorpusMiner, MinedCorpus, MiningConfig};
