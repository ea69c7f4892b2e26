//! Decoder seam used by the batch engine.
//!
//! The engine only needs "symbols in, path and score out". Anything that can
//! do that (the Viterbi decoder, a recorded DUT trace, a test double) plugs in
//! through [`SequenceDecoder`].

use crate::decoder::DecodeResult;
use crate::error::Result;

/// Decodes one observation sequence.
///
/// Implementations must be pure in their inputs: decoding the same symbols
/// twice yields the same result, and calls for different sequences do not
/// interact. The batch engine relies on this to decode sequences out of order
/// when running in parallel.
pub trait SequenceDecoder {
    /// Decode 1-indexed observation `symbols` into a 1-indexed state path.
    fn decode(&self, symbols: &[usize]) -> Result<DecodeResult>;
}

impl<D: SequenceDecoder + ?Sized> SequenceDecoder for &D {
    fn decode(&self, symbols: &[usize]) -> Result<DecodeResult> {
        (**self).decode(symbols)
    }
}
