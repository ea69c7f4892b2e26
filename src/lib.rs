//! Bit-exact Viterbi golden reference model
//!
//! This crate reproduces, bit for bit, the output a single-precision hardware
//! Viterbi decoder is expected to produce, so that a verification flow can
//! diff the device-under-test capture against it.
//!
//! ## Pipeline
//! 1. [`model`] loads N, M and the log-probability tables from `N.dat`,
//!    `A.dat` and `B.dat` (floats carried as IEEE-754 bit patterns in hex).
//! 2. [`stream`] splits `Input.dat` into observation sequences.
//! 3. [`decoder`] runs log-domain Viterbi in `f32` with lowest-index tie-breaks.
//! 4. [`writer`] emits one block per sequence in the same text protocol.
//!
//! [`BatchEngine`] drives the whole pipeline; [`config::RunConfig`] wraps it
//! for on-disk test-case directories.
//!
//! ## Quick start
//! ```
//! use viterbi_golden::{decode, Model};
//!
//! // Every log-probability is 0, so every path ties and state 1 wins.
//! let model = Model::new(2, 2, vec![0.0; 6], vec![0.0; 4]).unwrap();
//! let result = decode(&model, &[1, 1]).unwrap();
//! assert_eq!(result.path, vec![1, 1]);
//! assert_eq!(viterbi_golden::codec::encode_hex_float(result.log_probability), "00000000");
//! ```
//!
//! ## Features
//! - `parallel`: decode chunks of sequences on the rayon pool. Output is
//!   byte-identical to a sequential run.

pub mod builder;
pub mod codec;
pub mod compare;
pub mod config;
pub mod decoder;
pub mod engine;
pub mod error;
pub mod model;
pub mod stream;
pub mod traits;
pub mod utils;
pub mod writer;

pub use crate::builder::BatchEngineBuilder;
pub use crate::decoder::{decode, DecodeResult, ViterbiDecoder};
pub use crate::engine::{BatchEngine, BatchReport};
pub use crate::error::{GoldenError, Result};
pub use crate::model::{load_model, Model};
pub use crate::traits::SequenceDecoder;
