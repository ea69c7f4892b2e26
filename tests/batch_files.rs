use std::fs;
use std::path::Path;

use viterbi_golden::codec::{encode_hex_float, HexPolicy};
use viterbi_golden::compare::{compare_files, Comparison};
use viterbi_golden::config::RunConfig;
use viterbi_golden::{load_model, GoldenError};

fn hex_lines(values: &[f32]) -> String {
    values.iter().map(|&v| encode_hex_float(v) + "\n").collect()
}

fn write_case(dir: &Path, n: usize, m: usize, a: &[f32], b: &[f32], input: &str) {
    fs::write(dir.join("N.dat"), format!("{n}\n{m}\n")).unwrap();
    fs::write(dir.join("A.dat"), hex_lines(a)).unwrap();
    fs::write(dir.join("B.dat"), hex_lines(b)).unwrap();
    fs::write(dir.join("Input.dat"), input).unwrap();
}

#[test]
fn batch_protocol_ignores_bytes_after_terminator() {
    let dir = tempfile::tempdir().unwrap();
    write_case(
        dir.path(),
        2,
        2,
        &[0.0; 6],
        &[0.0; 4],
        "1\n2\nFFFFFFFF\n1\nFFFFFFFF\n0\n2\n1\nFFFFFFFF\ngarbage\n",
    );
    let report = RunConfig::in_dir(dir.path()).run().unwrap();
    assert_eq!(report.sequences, 2);
    assert!(report.terminated);
    assert!(!report.truncated);

    let out = fs::read_to_string(dir.path().join("Ref_Output.dat")).unwrap();
    assert_eq!(out, "1\n1\n00000000\nFFFFFFFF\n1\n00000000\nFFFFFFFF\n0\n");
}

#[test]
fn coin_model_round_trip_through_files() {
    let ln = |p: f32| p.ln();
    let a = [ln(0.5), ln(0.5), ln(0.9), ln(0.1), ln(0.2), ln(0.8)];
    let b = [ln(0.8), ln(0.2), ln(0.3), ln(0.7)];
    let dir = tempfile::tempdir().unwrap();
    write_case(dir.path(), 2, 2, &a, &b, "1\n1\n2\n2\n2\n1\n2\nFFFFFFFF\n2\nFFFFFFFF\n0\n");

    let model = load_model(
        &dir.path().join("N.dat"),
        &dir.path().join("A.dat"),
        &dir.path().join("B.dat"),
    )
    .unwrap();
    assert_eq!(model.transition_table(), &a);
    assert_eq!(model.emission_table(), &b);

    RunConfig::in_dir(dir.path()).run().unwrap();
    let out = fs::read_to_string(dir.path().join("Ref_Output.dat")).unwrap();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(&lines[..7], &["1", "1", "2", "2", "2", "2", "2"]);
    assert_eq!(lines[8], "FFFFFFFF");
    assert_eq!(lines[9], "2");
    assert_eq!(lines[10], encode_hex_float(ln(0.5) + ln(0.7)));
    assert_eq!(&lines[11..], &["FFFFFFFF", "0"]);
}

#[test]
fn malformed_transition_token_names_row_and_column() {
    let dir = tempfile::tempdir().unwrap();
    write_case(dir.path(), 2, 2, &[0.0; 6], &[0.0; 4], "1\nFFFFFFFF\n0\n");
    fs::write(
        dir.path().join("A.dat"),
        "00000000\n00000000\nZZZZZZZZ\n00000000\n00000000\n00000000\n",
    )
    .unwrap();

    let err = RunConfig::in_dir(dir.path()).run().unwrap_err();
    match err {
        GoldenError::MalformedModelToken {
            line,
            table,
            row,
            col,
            ref token,
            ..
        } => {
            assert_eq!((line, table, row, col), (3, "transition", 1, 0));
            assert_eq!(token, "ZZZZZZZZ");
        }
        other => panic!("expected a malformed token error, got {other}"),
    }
    assert!(err.to_string().contains("transition[1][0]"));
    assert!(!dir.path().join("Ref_Output.dat").exists());
}

#[test]
fn lenient_policy_is_opt_in() {
    let dir = tempfile::tempdir().unwrap();
    write_case(dir.path(), 1, 1, &[0.0; 2], &[0.0; 1], "1\nFFFFFFFF\n0\n");
    fs::write(dir.path().join("B.dat"), "ZZZZZZZZ\n").unwrap();

    assert!(RunConfig::in_dir(dir.path()).run().is_err());

    let mut cfg = RunConfig::in_dir(dir.path());
    cfg.hex_policy = HexPolicy::Lenient;
    let report = cfg.run().unwrap();
    assert_eq!(report.sequences, 1);
}

#[test]
fn line_count_mismatch_is_a_model_format_error() {
    let dir = tempfile::tempdir().unwrap();
    write_case(dir.path(), 2, 3, &[0.0; 6], &[0.0; 5], "1\nFFFFFFFF\n0\n");
    let err = RunConfig::in_dir(dir.path()).run().unwrap_err();
    assert!(matches!(err, GoldenError::ModelFormat { line: 6, .. }), "{err}");
}

#[test]
fn truncated_input_is_reported_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    write_case(dir.path(), 2, 2, &[0.0; 6], &[0.0; 4], "1\nFFFFFFFF\n2\n2\n");
    let report = RunConfig::in_dir(dir.path()).run().unwrap();
    assert_eq!(report.sequences, 1);
    assert!(report.truncated);
    assert!(!report.terminated);
    let written = fs::read_to_string(dir.path().join("Ref_Output.dat")).unwrap();
    assert_eq!(written, "1\n00000000\nFFFFFFFF\n");
}

#[test]
fn out_of_range_symbol_names_input_file_and_line() {
    let dir = tempfile::tempdir().unwrap();
    write_case(dir.path(), 2, 2, &[0.0; 6], &[0.0; 4], "1\nFFFFFFFF\n2\n7\nFFFFFFFF\n0\n");
    let err = RunConfig::in_dir(dir.path()).run().unwrap_err();
    match err {
        GoldenError::ObservationOutOfRange {
            ref file,
            line,
            symbol,
            ..
        } => {
            assert!(file.ends_with("Input.dat"), "{file}");
            assert_eq!((line, symbol), (4, 7));
        }
        ref other => panic!("expected a located symbol error, got {other}"),
    }
    assert!(err.to_string().contains("Input.dat:4:"), "{err}");
}

#[test]
fn reference_output_compares_against_dut_capture() {
    let dir = tempfile::tempdir().unwrap();
    write_case(dir.path(), 2, 2, &[0.0; 6], &[0.0; 4], "1\n2\nFFFFFFFF\n0\n");
    RunConfig::in_dir(dir.path()).run().unwrap();
    let reference = dir.path().join("Ref_Output.dat");

    let good = dir.path().join("dut_good.dat");
    fs::write(&good, "1\n1\n00000000\nFFFFFFFF\n0\n").unwrap();
    assert_eq!(
        compare_files(&reference, &good).unwrap(),
        Comparison::Match { lines: 5 }
    );

    let bad = dir.path().join("dut_bad.dat");
    fs::write(&bad, "1\n2\n00000000\nFFFFFFFF\n0\n").unwrap();
    assert!(!compare_files(&reference, &bad).unwrap().is_match());
}
