use crate::{Error, Result};
use std::time::Duration;

fn default_batch_size() -> usize {
    32
}

fn default_num_workers() -> usize {
    1
}

fn default_poll_interval_secs() -> u64 {
    10
}

/// Inference-time settings shared by all drivers.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct InferConfig {
    /// Number of sentences fed to the model per decode step.
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
    /// Beam width used by the model, 0 for greedy decoding. Only beam 0 is
    /// ever extracted.
    #[serde(default)]
    pub beam_width: usize,
    /// End-of-sequence token. Decoded output is truncated at its first
    /// occurrence when set.
    #[serde(default)]
    pub eos: Option<String>,
    /// Sub-word delimiter used to merge BPE pieces back into words.
    #[serde(default)]
    pub bpe_delimiter: Option<String>,
    /// Number of independent worker processes decoding the corpus.
    #[serde(default = "default_num_workers")]
    pub num_workers: usize,
    /// Shard decoded by this process, in `[0, num_workers)`.
    #[serde(default)]
    pub worker_id: usize,
    /// Decode only these corpus indices. Single-worker mode only.
    #[serde(default)]
    pub inference_indices: Option<Vec<usize>>,
    /// Metric names forwarded to the evaluator when a reference file is
    /// supplied.
    #[serde(default)]
    pub metrics: Vec<String>,
    /// Seconds between done-marker existence checks during aggregation.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
}

impl Default for InferConfig {
    fn default() -> Self {
        Self {
            batch_size: default_batch_size(),
            beam_width: 0,
            eos: None,
            bpe_delimiter: None,
            num_workers: default_num_workers(),
            worker_id: 0,
            inference_indices: None,
            metrics: vec![],
            poll_interval_secs: default_poll_interval_secs(),
        }
    }
}

impl InferConfig {
    /// Checks the fatal configuration conditions. This runs before the corpus
    /// is read or any output file is touched.
    pub fn validate(&self) -> Result<()> {
        if self.num_workers == 0 {
            return Err(Error::NoWorkers);
        }
        if self.worker_id >= self.num_workers {
            return Err(Error::WorkerIdOutOfRange {
                worker_id: self.worker_id,
                num_workers: self.num_workers,
            });
        }
        if self.inference_indices.is_some() && self.num_workers > 1 {
            return Err(Error::IndicesWithWorkers {
                num_workers: self.num_workers,
            });
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}
