use crate::utils::{available_workers, default_chunk_size};
use crate::{BatchEngine, SequenceDecoder};

pub struct BatchEngineBuilder<D: SequenceDecoder> {
    decoder: D,
    parallel: bool,
    chunk_size: Option<usize>,
}

impl<D: SequenceDecoder> BatchEngineBuilder<D> {
    pub fn new(decoder: D) -> Self {
        Self {
            decoder,
            parallel: false,
            chunk_size: None,
        }
    }
    /// Decode chunks of sequences concurrently. Needs the `parallel` feature.
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = Some(chunk_size);
        self
    }
    pub fn build(self) -> BatchEngine<D> {
        if self.parallel && !cfg!(feature = "parallel") {
            tracing::warn!("parallel decoding requested but the `parallel` feature is disabled");
        }
        let chunk = self
            .chunk_size
            .unwrap_or_else(|| default_chunk_size(available_workers()))
            .max(1);
        BatchEngine::with_chunk_size(self.decoder, chunk).parallel(self.parallel)
    }
}
