//! Run configuration: where the batch files live and how to treat them.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use crate::builder::BatchEngineBuilder;
use crate::codec::HexPolicy;
use crate::decoder::ViterbiDecoder;
use crate::engine::BatchReport;
use crate::error::{GoldenError, Result};
use crate::model::{load_model_with_policy, Model, ModelPaths};

/// Conventional file names inside a test-case directory.
pub const N_FILE: &str = "N.dat";
pub const A_FILE: &str = "A.dat";
pub const B_FILE: &str = "B.dat";
pub const INPUT_FILE: &str = "Input.dat";
pub const OUTPUT_FILE: &str = "Ref_Output.dat";

/// Everything one reference-model run needs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunConfig {
    pub n_path: PathBuf,
    pub a_path: PathBuf,
    pub b_path: PathBuf,
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub hex_policy: HexPolicy,
    pub parallel: bool,
    /// Sequences buffered per parallel chunk; `None` picks a default.
    pub chunk_size: Option<usize>,
}

impl RunConfig {
    /// Standard layout rooted at `dir`.
    pub fn in_dir(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            n_path: dir.join(N_FILE),
            a_path: dir.join(A_FILE),
            b_path: dir.join(B_FILE),
            input_path: dir.join(INPUT_FILE),
            output_path: dir.join(OUTPUT_FILE),
            hex_policy: HexPolicy::Strict,
            parallel: false,
            chunk_size: None,
        }
    }

    pub fn model_paths(&self) -> ModelPaths<'_> {
        ModelPaths {
            n_file: &self.n_path,
            a_file: &self.a_path,
            b_file: &self.b_path,
        }
    }

    pub fn load_model(&self) -> Result<Model> {
        if self.hex_policy == HexPolicy::Lenient {
            tracing::warn!("lenient hex policy: malformed model tokens load as 0.0");
        }
        load_model_with_policy(self.model_paths(), self.hex_policy)
    }

    /// Load the model, decode `input_path` and write `output_path`.
    pub fn run(&self) -> Result<BatchReport> {
        let model = self.load_model()?;

        let input = File::open(&self.input_path)
            .map(BufReader::new)
            .map_err(|e| GoldenError::file(&self.input_path, e))?;
        let output = File::create(&self.output_path)
            .map(BufWriter::new)
            .map_err(|e| GoldenError::file(&self.output_path, e))?;

        let mut builder =
            BatchEngineBuilder::new(ViterbiDecoder::new(&model)).with_parallel(self.parallel);
        if let Some(chunk) = self.chunk_size {
            builder = builder.with_chunk_size(chunk);
        }
        let report = builder
            .build()
            .run_named(&self.input_path, input, output)?;
        tracing::info!(output = %self.output_path.display(), "wrote reference output");
        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn in_dir_uses_conventional_names() {
        let cfg = RunConfig::in_dir("/cases/small");
        assert_eq!(cfg.n_path, PathBuf::from("/cases/small/N.dat"));
        assert_eq!(cfg.input_path, PathBuf::from("/cases/small/Input.dat"));
        assert_eq!(cfg.output_path, PathBuf::from("/cases/small/Ref_Output.dat"));
        assert_eq!(cfg.hex_policy, HexPolicy::Strict);
        assert!(!cfg.parallel);
    }

    #[test]
    fn missing_files_name_the_path() {
        let dir = tempfile::tempdir().unwrap();
        let err = RunConfig::in_dir(dir.path()).run().unwrap_err();
        match err {
            GoldenError::File { path, .. } => assert!(path.ends_with(N_FILE)),
            other => panic!("unexpected error: {other}"),
        }
    }
}
