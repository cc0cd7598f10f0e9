use thiserror::Error;

use crate::lexicon::CategoryId;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("invalid regex pattern {value:?}: {source}")]
    InvalidRegex {
        value: String,
        #[source]
        source: regex::Error,
    },

    #[error("empty literal pattern in category {0}")]
    EmptyLiteral(CategoryId),

    #[error("pattern table json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
