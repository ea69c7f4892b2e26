//! Error types for model loading, batch parsing and decoding.

use std::num::ParseIntError;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised anywhere between reading the model files and writing
/// the reference output.
#[derive(Error, Debug)]
pub enum GoldenError {
    /// A token that is not a hexadecimal integer fitting in 32 bits.
    #[error("malformed hex token '{token}'")]
    MalformedHex {
        token: String,
        #[source]
        source: Option<ParseIntError>,
    },

    /// A model table entry failed the hex codec.
    #[error("{file}:{line}: malformed hex token '{token}' at {table}[{row}][{col}]")]
    MalformedModelToken {
        file: String,
        line: usize,
        table: &'static str,
        row: usize,
        col: usize,
        token: String,
    },

    /// Model files disagree with the declared dimensions.
    #[error("{file}:{line}: {reason}")]
    ModelFormat {
        file: String,
        line: usize,
        reason: String,
    },

    /// A non-sentinel observation line that is not a positive integer.
    #[error("{file}:{line}: invalid observation '{token}': {reason}")]
    SequenceFormat {
        file: String,
        line: usize,
        token: String,
        reason: String,
    },

    /// An observation symbol outside `[1, n_symbols]`.
    #[error("observation {index} has symbol {symbol}, expected 1..={n_symbols}")]
    SymbolOutOfRange {
        index: usize,
        symbol: usize,
        n_symbols: usize,
    },

    /// [`GoldenError::SymbolOutOfRange`] located in the observation file.
    #[error("{file}:{line}: observation symbol {symbol} outside 1..={n_symbols}")]
    ObservationOutOfRange {
        file: String,
        line: usize,
        symbol: usize,
        n_symbols: usize,
    },

    /// Opening, reading or writing a named file failed.
    #[error("I/O error on '{}': {source}", .path.display())]
    File {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Stream-level I/O failure with no file name attached.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl GoldenError {
    /// Attach a path to an I/O error.
    pub fn file(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        GoldenError::File {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for the crate.
pub type Result<T> = std::result::Result<T, GoldenError>;
