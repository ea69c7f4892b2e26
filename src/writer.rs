//! Serializes decode results in the `Output.dat` block format.

use std::io::Write;

use crate::codec::{encode_hex_float, encode_int, SENTINEL, TERMINATOR};
use crate::decoder::DecodeResult;
use crate::error::Result;

/// Appends one block per decoded sequence, then the closing terminator once
/// the input's own terminator has been seen.
///
/// A block is the path (one decimal state per line), the hex-encoded
/// log-probability, and the sentinel line.
pub struct ResultWriter<W: Write> {
    out: W,
    blocks: usize,
}

impl<W: Write> ResultWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out, blocks: 0 }
    }

    /// Number of blocks written so far.
    pub fn blocks(&self) -> usize {
        self.blocks
    }

    pub fn write_result(&mut self, result: &DecodeResult) -> Result<()> {
        for &state in &result.path {
            writeln!(self.out, "{}", encode_int(state))?;
        }
        writeln!(self.out, "{}", encode_hex_float(result.log_probability))?;
        writeln!(self.out, "{SENTINEL}")?;
        self.blocks += 1;
        Ok(())
    }

    /// Write the terminator, flush, and hand back the underlying writer.
    pub fn finish(mut self) -> Result<W> {
        writeln!(self.out, "{TERMINATOR}")?;
        self.close()
    }

    /// Flush without the terminator, for input that never reached one.
    pub fn close(mut self) -> Result<W> {
        self.out.flush()?;
        Ok(self.out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_layout() {
        let mut w = ResultWriter::new(Vec::new());
        w.write_result(&DecodeResult {
            path: vec![1, 2, 2],
            log_probability: -1.0,
        })
        .unwrap();
        w.write_result(&DecodeResult::empty()).unwrap();
        assert_eq!(w.blocks(), 2);
        let text = String::from_utf8(w.finish().unwrap()).unwrap();
        assert_eq!(
            text,
            "1\n2\n2\nBF800000\nFFFFFFFF\nFF800000\nFFFFFFFF\n0\n"
        );
    }

    #[test]
    fn empty_batch_is_just_terminator() {
        let text = String::from_utf8(ResultWriter::new(Vec::new()).finish().unwrap()).unwrap();
        assert_eq!(text, "0\n");
    }

    #[test]
    fn close_leaves_out_the_terminator() {
        let mut w = ResultWriter::new(Vec::new());
        w.write_result(&DecodeResult {
            path: vec![1],
            log_probability: 0.0,
        })
        .unwrap();
        let text = String::from_utf8(w.close().unwrap()).unwrap();
        assert_eq!(text, "1\n00000000\nFFFFFFFF\n");
    }
}
