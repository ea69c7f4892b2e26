//! Single-precision log-domain Viterbi decoding.
//!
//! All scores are `f32` and combined in the same order as the hardware
//! datapath: `V[t-1][i] + a[i][j]`, then the running max, then `+ b[j][o_t]`.
//!
//! Ties go to the lowest state index: candidates are scanned in increasing
//! order and only a strictly greater score replaces the incumbent.

use crate::error::{GoldenError, Result};
use crate::model::Model;
use crate::traits::SequenceDecoder;

/// Most likely state path for one sequence.
#[derive(Clone, Debug, PartialEq)]
pub struct DecodeResult {
    /// 1-indexed states, one per observation.
    pub path: Vec<usize>,
    /// Log-probability of `path`; `-inf` for an empty sequence.
    pub log_probability: f32,
}

impl DecodeResult {
    /// Result for an empty observation sequence.
    pub fn empty() -> Self {
        Self {
            path: Vec::new(),
            log_probability: f32::NEG_INFINITY,
        }
    }
}

/// Viterbi decoder over a borrowed, immutable model.
#[derive(Clone, Copy, Debug)]
pub struct ViterbiDecoder<'m> {
    model: &'m Model,
}

impl<'m> ViterbiDecoder<'m> {
    pub fn new(model: &'m Model) -> Self {
        Self { model }
    }

    pub fn model(&self) -> &'m Model {
        self.model
    }
}

impl SequenceDecoder for ViterbiDecoder<'_> {
    fn decode(&self, symbols: &[usize]) -> Result<DecodeResult> {
        decode(self.model, symbols)
    }
}

/// Index of the first maximum under strict `>`; 0 if nothing beats `-inf`.
#[inline]
fn first_argmax(scores: impl IntoIterator<Item = f32>) -> (usize, f32) {
    let mut best = f32::NEG_INFINITY;
    let mut arg = 0;
    for (i, v) in scores.into_iter().enumerate() {
        if v > best {
            best = v;
            arg = i;
        }
    }
    (arg, best)
}

/// Decode `symbols` (1-indexed) against `model`.
///
/// Fails only if a symbol lies outside `[1, n_symbols]`.
pub fn decode(model: &Model, symbols: &[usize]) -> Result<DecodeResult> {
    let m = model.n_symbols();
    if let Some((index, &symbol)) = symbols
        .iter()
        .enumerate()
        .find(|&(_, &s)| s == 0 || s > m)
    {
        return Err(GoldenError::SymbolOutOfRange {
            index,
            symbol,
            n_symbols: m,
        });
    }

    let t_len = symbols.len();
    if t_len == 0 {
        return Ok(DecodeResult::empty());
    }
    let n = model.n_states();

    // v[t * n + j] and back[t * n + j]
    let mut v = vec![f32::NEG_INFINITY; t_len * n];
    let mut back = vec![0usize; t_len * n];

    let o0 = symbols[0] - 1;
    for j in 0..n {
        v[j] = model.start(j) + model.emission(j, o0);
    }

    for t in 1..t_len {
        let obs = symbols[t] - 1;
        let (prev, cur) = v.split_at_mut(t * n);
        let prev = &prev[(t - 1) * n..];
        for j in 0..n {
            let (arg, best) =
                first_argmax((0..n).map(|i| prev[i] + model.transition(i, j)));
            cur[j] = best + model.emission(j, obs);
            back[t * n + j] = arg;
        }
    }

    let last = &v[(t_len - 1) * n..t_len * n];
    let (final_state, log_probability) = first_argmax(last.iter().copied());

    let mut path = vec![0usize; t_len];
    path[t_len - 1] = final_state + 1;
    for t in (0..t_len - 1).rev() {
        path[t] = back[(t + 1) * n + (path[t + 1] - 1)] + 1;
    }

    Ok(DecodeResult {
        path,
        log_probability,
    })
}
