//! Example: decode an in-memory batch and print the reference output.
//!
//! Run with:
//! `cargo run --example decode_batch`

use std::io::Cursor;

use viterbi_golden::{BatchEngine, Model, ViterbiDecoder};

fn main() {
    // Fair/loaded coin in log space:
    //
    // States: 1 = fair, 2 = loaded
    // Symbols: 1 = heads, 2 = tails
    let ln = |p: f32| p.ln();
    let start = [ln(0.5), ln(0.5)];
    let from_fair = [ln(0.9), ln(0.1)];
    let from_loaded = [ln(0.2), ln(0.8)];
    let fair_emits = [ln(0.8), ln(0.2)];
    let loaded_emits = [ln(0.3), ln(0.7)];

    let model = Model::new(
        2,
        2,
        [start, from_fair, from_loaded].concat(),
        [fair_emits, loaded_emits].concat(),
    )
    .expect("2x2 model");

    let input = "1\n1\n2\n2\n2\n1\n2\nFFFFFFFF\n2\nFFFFFFFF\n0\n";
    let engine = BatchEngine::new(ViterbiDecoder::new(&model));

    let mut out = Vec::new();
    let report = engine
        .run_named("Input.dat", Cursor::new(input), &mut out)
        .expect("well-formed batch");

    println!("decoded {} sequence(s):", report.sequences);
    print!("{}", String::from_utf8_lossy(&out));
}
