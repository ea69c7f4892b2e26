//! Batch driver: parse, decode, write.
//!
//! This module wires the three stages together:
//! 1. [`SequenceStream`] pulls sequences out of `Input.dat` lazily.
//! 2. A [`SequenceDecoder`] turns each into a path and score.
//! 3. [`ResultWriter`] appends the matching output block.
//!
//! Output blocks always appear in input order. With the `parallel` feature the
//! engine buffers a chunk of sequences, decodes the chunk on the rayon pool and
//! writes the results back in order, so the bytes written are identical to a
//! sequential run.

use std::io::{BufRead, Write};
use std::path::Path;

use crate::decoder::DecodeResult;
use crate::error::{GoldenError, Result};
use crate::stream::{Sequence, SequenceStream};
use crate::traits::SequenceDecoder;
use crate::utils::default_chunk_size;
use crate::writer::ResultWriter;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Outcome of one batch run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct BatchReport {
    /// Sequences decoded and written.
    pub sequences: usize,
    /// The terminator line after a sentinel was reached.
    pub terminated: bool,
    /// Input ended in the middle of a sequence, which was dropped.
    pub truncated: bool,
}

/// Batch engine for a given decoder `D`.
///
/// Typical usage:
/// ```
/// use std::io::Cursor;
/// use viterbi_golden::{BatchEngine, Model, ViterbiDecoder};
///
/// let model = Model::new(2, 2, vec![0.0; 6], vec![0.0; 4]).unwrap();
/// let engine = BatchEngine::new(ViterbiDecoder::new(&model));
/// let mut out = Vec::new();
/// let report = engine
///     .run(Cursor::new("1\n1\nFFFFFFFF\n0\n"), &mut out)
///     .unwrap();
/// assert_eq!(report.sequences, 1);
/// assert_eq!(String::from_utf8(out).unwrap(), "1\n1\n00000000\nFFFFFFFF\n0\n");
/// ```
pub struct BatchEngine<D: SequenceDecoder> {
    decoder: D,
    parallel: bool,
    chunk_size: usize,
}

impl<D: SequenceDecoder> BatchEngine<D> {
    /// Create a sequential engine.
    pub fn new(decoder: D) -> Self {
        Self::with_chunk_size(decoder, default_chunk_size(1))
    }

    /// Create an engine with an explicit parallel chunk size.
    ///
    /// # Panics
    /// Panics if `chunk_size == 0`.
    pub fn with_chunk_size(decoder: D, chunk_size: usize) -> Self {
        assert!(chunk_size > 0, "chunk_size must be positive");
        Self {
            decoder,
            parallel: false,
            chunk_size,
        }
    }

    /// Enable or disable chunked parallel decoding.
    ///
    /// Without the `parallel` feature this flag has no effect.
    pub fn parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    pub fn decoder(&self) -> &D {
        &self.decoder
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn is_parallel(&self) -> bool {
        self.parallel && cfg!(feature = "parallel")
    }

    /// Decode one sequence, locating out-of-range symbols in `file`.
    fn decode_one(&self, file: &str, seq: &Sequence) -> Result<DecodeResult> {
        let span = tracing::trace_span!("decode_sequence", index = seq.index, len = seq.len());
        let _enter = span.enter();
        let result = self.decoder.decode(&seq.symbols).map_err(|e| match e {
            GoldenError::SymbolOutOfRange {
                index,
                symbol,
                n_symbols,
            } => GoldenError::ObservationOutOfRange {
                file: file.to_string(),
                line: seq.line_of(index).unwrap_or_default(),
                symbol,
                n_symbols,
            },
            other => other,
        })?;
        tracing::debug!(
            index = seq.index,
            len = seq.len(),
            log_probability = result.log_probability,
            "decoded sequence"
        );
        Ok(result)
    }

    /// Shared driver. `decode_chunk` maps a buffered chunk to results in the
    /// same order.
    fn drive<R, W, F>(
        &self,
        stream: &mut SequenceStream<R>,
        output: W,
        decode_chunk: F,
    ) -> Result<BatchReport>
    where
        R: BufRead,
        W: Write,
        F: Fn(&Self, &str, &[Sequence]) -> Vec<Result<DecodeResult>>,
    {
        let chunked = self.is_parallel();
        let span = tracing::info_span!(
            "decode_batch",
            file = stream.name(),
            parallel = chunked,
            chunk_size = self.chunk_size
        );
        let _enter = span.enter();

        let mut writer = ResultWriter::new(output);
        let limit = if chunked { self.chunk_size } else { 1 };
        let mut chunk = Vec::with_capacity(limit);

        loop {
            let mut pending_err = None;
            while chunk.len() < limit {
                match stream.next() {
                    Some(Ok(seq)) => chunk.push(seq),
                    Some(Err(e)) => {
                        pending_err = Some(e);
                        break;
                    }
                    None => break,
                }
            }
            let exhausted = chunk.len() < limit;

            for result in decode_chunk(self, stream.name(), &chunk) {
                writer.write_result(&result?)?;
            }
            chunk.clear();

            if let Some(e) = pending_err {
                return Err(e);
            }
            if exhausted {
                break;
            }
        }

        let report = BatchReport {
            sequences: writer.blocks(),
            terminated: stream.terminated(),
            truncated: stream.truncated(),
        };
        if report.terminated {
            writer.finish()?;
        } else {
            tracing::warn!("input ended without the terminator line");
            writer.close()?;
        }
        tracing::info!(
            sequences = report.sequences,
            terminated = report.terminated,
            truncated = report.truncated,
            "batch complete"
        );
        Ok(report)
    }
}

fn decode_serial<D: SequenceDecoder>(
    engine: &BatchEngine<D>,
    file: &str,
    chunk: &[Sequence],
) -> Vec<Result<DecodeResult>> {
    chunk.iter().map(|seq| engine.decode_one(file, seq)).collect()
}

#[cfg(feature = "parallel")]
impl<D> BatchEngine<D>
where
    D: SequenceDecoder + Sync,
{
    /// Decode every sequence of `input` and write the reference output.
    ///
    /// Stops at the first malformed sequence or decode failure; blocks for
    /// earlier sequences have already been written by then.
    pub fn run<R: BufRead, W: Write>(&self, input: R, output: W) -> Result<BatchReport> {
        self.run_stream(&mut SequenceStream::new(input), output)
    }

    /// [`BatchEngine::run`] with `name` reported in input errors.
    pub fn run_named<R: BufRead, W: Write>(
        &self,
        name: impl AsRef<Path>,
        input: R,
        output: W,
    ) -> Result<BatchReport> {
        self.run_stream(&mut SequenceStream::named(name, input), output)
    }

    fn run_stream<R: BufRead, W: Write>(
        &self,
        stream: &mut SequenceStream<R>,
        output: W,
    ) -> Result<BatchReport> {
        if self.parallel {
            self.drive(stream, output, |engine, file, chunk| {
                chunk
                    .par_iter()
                    .map(|seq| engine.decode_one(file, seq))
                    .collect()
            })
        } else {
            self.drive(stream, output, decode_serial)
        }
    }
}

#[cfg(not(feature = "parallel"))]
impl<D: SequenceDecoder> BatchEngine<D> {
    /// Decode every sequence of `input` and write the reference output.
    ///
    /// Stops at the first malformed sequence or decode failure; blocks for
    /// earlier sequences have already been written by then.
    pub fn run<R: BufRead, W: Write>(&self, input: R, output: W) -> Result<BatchReport> {
        self.drive(&mut SequenceStream::new(input), output, decode_serial)
    }

    /// [`BatchEngine::run`] with `name` reported in input errors.
    pub fn run_named<R: BufRead, W: Write>(
        &self,
        name: impl AsRef<Path>,
        input: R,
        output: W,
    ) -> Result<BatchReport> {
        self.drive(&mut SequenceStream::named(name, input), output, decode_serial)
    }
}
