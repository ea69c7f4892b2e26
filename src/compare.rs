//! Line-by-line comparison of a reference output against a DUT capture.
//!
//! Comparison is textual: hex-float lines must match digit for digit, which is
//! exactly bit equality of the underlying `f32`.

use std::fmt;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::codec::SENTINEL;
use crate::error::{GoldenError, Result};

/// Shown in place of a line when one side ends early.
pub const EOF_MARKER: &str = "<eof>";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Comparison {
    /// Both streams hold the same `lines` lines.
    Match { lines: usize },
    /// First differing line, 1-based, inside output block `block` (0-based).
    Mismatch {
        line: usize,
        block: usize,
        expected: String,
        actual: String,
    },
}

impl Comparison {
    pub fn is_match(&self) -> bool {
        matches!(self, Comparison::Match { .. })
    }
}

impl fmt::Display for Comparison {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Comparison::Match { lines } => write!(f, "outputs match ({lines} lines)"),
            Comparison::Mismatch {
                line,
                block,
                expected,
                actual,
            } => write!(
                f,
                "mismatch at line {line} (sequence {block}): expected '{expected}', got '{actual}'"
            ),
        }
    }
}

/// Compare two output streams, stopping at the first difference.
///
/// Trailing whitespace on a line is ignored.
pub fn compare_outputs<A: BufRead, B: BufRead>(reference: A, candidate: B) -> Result<Comparison> {
    let mut expected_lines = reference.lines();
    let mut actual_lines = candidate.lines();
    let mut line = 0;
    let mut block = 0;

    loop {
        let expected = expected_lines.next().transpose()?;
        let actual = actual_lines.next().transpose()?;
        line += 1;
        match (expected, actual) {
            (None, None) => return Ok(Comparison::Match { lines: line - 1 }),
            (Some(e), Some(a)) if e.trim_end() == a.trim_end() => {
                if e.trim_end() == SENTINEL {
                    block += 1;
                }
            }
            (e, a) => {
                let side = |s: Option<String>| {
                    s.map(|s| s.trim_end().to_string())
                        .unwrap_or_else(|| EOF_MARKER.to_string())
                };
                return Ok(Comparison::Mismatch {
                    line,
                    block,
                    expected: side(e),
                    actual: side(a),
                });
            }
        }
    }
}

/// Compare two output files on disk.
pub fn compare_files(reference: &Path, candidate: &Path) -> Result<Comparison> {
    let open = |path: &Path| -> Result<BufReader<File>> {
        File::open(path)
            .map(BufReader::new)
            .map_err(|e| GoldenError::file(path, e))
    };
    let outcome = compare_outputs(open(reference)?, open(candidate)?)?;
    match &outcome {
        Comparison::Match { lines } => tracing::info!(lines, "outputs match"),
        Comparison::Mismatch { line, block, .. } => {
            tracing::warn!(line, block, "outputs differ")
        }
    }
    Ok(outcome)
}
