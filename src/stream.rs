//! Observation batch parser.
//!
//! `Input.dat` holds one decimal symbol per line. Each sequence ends with the
//! [`SENTINEL`] line; the line right after a sentinel is either the
//! [`TERMINATOR`] (batch done) or the first symbol of the next sequence.
//!
//! ```
//! use std::io::Cursor;
//! use viterbi_golden::stream::SequenceStream;
//!
//! let input = Cursor::new("1\n2\nFFFFFFFF\n1\nFFFFFFFF\n0\n");
//! let mut stream = SequenceStream::new(input);
//! let batch: Vec<_> = stream.by_ref().map(|s| s.unwrap().symbols).collect();
//! assert_eq!(batch, vec![vec![1, 2], vec![1]]);
//! assert!(stream.terminated());
//! ```

use std::io::BufRead;
use std::path::Path;

use crate::codec::{SENTINEL, TERMINATOR};
use crate::error::{GoldenError, Result};

/// One observation sequence, symbols 1-indexed as in the input file.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Sequence {
    /// Position of this sequence in the batch, starting at 0.
    pub index: usize,
    pub symbols: Vec<usize>,
    /// Input line of each symbol, 1-based.
    pub lines: Vec<usize>,
}

impl Sequence {
    #[inline]
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Input line of the symbol at `index`.
    pub fn line_of(&self, index: usize) -> Option<usize> {
        self.lines.get(index).copied()
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum ParseState {
    Accumulating,
    Done,
}

/// Lazy, single-pass iterator over the sequences of a batch file.
///
/// Iteration stops after the terminator, at end of input, or after the first
/// error.
pub struct SequenceStream<R> {
    name: String,
    lines: std::io::Lines<R>,
    state: ParseState,
    line_no: usize,
    /// Line read while peeking past a sentinel; it opens the next sequence.
    head: Option<(usize, String)>,
    /// Read error hit while peeking; reported after the completed sequence.
    deferred: Option<GoldenError>,
    emitted: usize,
    terminated: bool,
    truncated: bool,
}

impl<R: BufRead> SequenceStream<R> {
    /// Stream an unnamed reader; diagnostics call it `<input>`.
    pub fn new(reader: R) -> Self {
        Self::named("<input>", reader)
    }

    /// Stream a reader tagged with the file name used in diagnostics.
    pub fn named(name: impl AsRef<Path>, reader: R) -> Self {
        Self {
            name: name.as_ref().display().to_string(),
            lines: reader.lines(),
            state: ParseState::Accumulating,
            line_no: 0,
            head: None,
            deferred: None,
            emitted: 0,
            terminated: false,
            truncated: false,
        }
    }

    /// True once the terminator line following a sentinel has been read.
    pub fn terminated(&self) -> bool {
        self.terminated
    }

    /// True if input ended while a non-empty sequence was still open.
    ///
    /// That sequence is dropped, not emitted.
    pub fn truncated(&self) -> bool {
        self.truncated
    }

    /// Name reported in errors.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of sequences yielded so far.
    pub fn emitted(&self) -> usize {
        self.emitted
    }

    fn read_line(&mut self) -> Option<Result<(usize, String)>> {
        let line = self.lines.next()?;
        self.line_no += 1;
        Some(
            line.map(|l| (self.line_no, l.trim().to_string()))
                .map_err(|e| GoldenError::file(&self.name, e)),
        )
    }

    fn fail<T>(&mut self, err: GoldenError) -> Option<Result<T>> {
        self.state = ParseState::Done;
        Some(Err(err))
    }

    fn emit(&mut self, symbols: Vec<usize>, lines: Vec<usize>) -> Option<Result<Sequence>> {
        let index = self.emitted;
        self.emitted += 1;
        Some(Ok(Sequence {
            index,
            symbols,
            lines,
        }))
    }
}

fn parse_symbol(file: &str, line: usize, token: &str) -> Result<usize> {
    match token.parse::<usize>() {
        Ok(v) if v > 0 => Ok(v),
        Ok(_) => Err(GoldenError::SequenceFormat {
            file: file.to_string(),
            line,
            token: token.to_string(),
            reason: "symbols are 1-indexed".to_string(),
        }),
        Err(e) => Err(GoldenError::SequenceFormat {
            file: file.to_string(),
            line,
            token: token.to_string(),
            reason: e.to_string(),
        }),
    }
}

impl<R: BufRead> Iterator for SequenceStream<R> {
    type Item = Result<Sequence>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(err) = self.deferred.take() {
            return Some(Err(err));
        }
        if self.state == ParseState::Done {
            return None;
        }

        let mut symbols = Vec::new();
        let mut lines = Vec::new();
        if let Some((line, token)) = self.head.take() {
            match parse_symbol(&self.name, line, &token) {
                Ok(sym) => {
                    symbols.push(sym);
                    lines.push(line);
                }
                Err(e) => return self.fail(e),
            }
        }

        loop {
            let (line, token) = match self.read_line() {
                Some(Ok(entry)) => entry,
                Some(Err(e)) => return self.fail(e),
                None => {
                    self.state = ParseState::Done;
                    if !symbols.is_empty() {
                        self.truncated = true;
                        tracing::warn!(
                            sequence = self.emitted,
                            symbols = symbols.len(),
                            "input ended without a sentinel; dropping partial sequence"
                        );
                    }
                    return None;
                }
            };

            if token == SENTINEL {
                match self.read_line() {
                    Some(Ok((_, next))) if next == TERMINATOR => {
                        self.state = ParseState::Done;
                        self.terminated = true;
                    }
                    Some(Ok(entry)) => self.head = Some(entry),
                    Some(Err(e)) => {
                        self.state = ParseState::Done;
                        self.deferred = Some(e);
                    }
                    None => self.state = ParseState::Done,
                }
                return self.emit(symbols, lines);
            }

            if token == TERMINATOR {
                tracing::debug!(line, "ignoring stray terminator inside sequence");
                continue;
            }

            match parse_symbol(&self.name, line, &token) {
                Ok(sym) => {
                    symbols.push(sym);
                    lines.push(line);
                }
                Err(e) => return self.fail(e),
            }
        }
    }
}
