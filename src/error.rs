use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Every failure the loader and generator can report.
///
/// `FileAccess`, `InvalidPosition`, `InvalidBinaryLength` and `InvalidPrefix`
/// stop a run.
/// `MalformedLine` and `MissingAddress` are logged where they happen and the
/// run carries on with what it has.
#[derive(Debug, Error)]
pub enum BlockError {
    #[error("cannot read mapping file '{}': {source}", path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid line format at line {line}: '{content}'")]
    MalformedLine { line: usize, content: String },

    #[error("position is not an integer at line {line}: '{content}'")]
    InvalidPosition { line: usize, content: String },

    #[error("binary string must have at least three digits (2 base nodes and 1 external connection), got {len}")]
    InvalidBinaryLength { len: usize },

    #[error("invalid base node combination '{prefix}', only '00' or '11' are allowed")]
    InvalidPrefix { prefix: String },

    #[error("no address found for binary position {position}")]
    MissingAddress { position: usize },
}

impl BlockError {
    pub fn is_fatal(&self) -> bool {
        !matches!(
            self,
            BlockError::MalformedLine { .. } | BlockError::MissingAddress { .. }
        )
    }

    /// Process exit status for this error. Recoverable kinds map to 0.
    pub fn exit_code(&self) -> u8 {
        match self {
            BlockError::FileAccess { .. } | BlockError::InvalidPosition { .. } => 1,
            BlockError::InvalidBinaryLength { .. } | BlockError::InvalidPrefix { .. } => 2,
            BlockError::MalformedLine { .. } | BlockError::MissingAddress { .. } => 0,
        }
    }
}
