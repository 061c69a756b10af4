//! The decode loop: drives a session-bound model until its input iterator is
//! exhausted, writing one translation line per sentence as soon as it is
//! available.

use crate::config::InferConfig;
use crate::evaluate::Evaluator;
use crate::extract::{best_beam, get_translation};
use crate::vocab::TokenLookup;
use crate::{Error, Result};
use candle::Tensor;
use std::collections::HashMap;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Raw output of one decode step over a batch of sentences.
#[derive(Debug, Clone)]
pub struct DecodeOutput {
    /// Token ids, `[beam, batch, len]` under beam search, `[batch, len]`
    /// otherwise.
    pub tokens: Tensor,
    /// Opaque per-step payload (e.g. serialized attention weights) passed
    /// through for external visualization.
    pub summary: Option<Vec<u8>>,
}

/// Capability interface for a loaded model bound to a checkpoint session.
///
/// The decode loop is agnostic to model internals; it only needs to feed one
/// shard of sentences and pull batches until exhaustion.
pub trait DecodeModel {
    /// Binds the model's input iterator to one shard of sentences.
    fn bind(&mut self, sentences: &[String], batch_size: usize) -> Result<()>;

    /// Runs one decode step. `Ok(None)` signals that the input iterator is
    /// exhausted, which is the loop's sole normal termination condition. Any
    /// other failure propagates uncaught; retries are the caller's concern.
    fn decode(&mut self) -> Result<Option<DecodeOutput>>;
}

/// Decodes a bound shard to `trans_file`, one translation per line, then
/// scores the result when both a reference file and an evaluator are
/// supplied. Returns the per-metric scores (empty without a reference).
pub fn decode_and_evaluate<M: DecodeModel + ?Sized>(
    name: &str,
    model: &mut M,
    cfg: &InferConfig,
    vocab: &dyn TokenLookup,
    trans_file: &Path,
    ref_file: Option<&Path>,
    evaluator: Option<&dyn Evaluator>,
) -> Result<HashMap<String, f64>> {
    tracing::info!("decoding to output {}", trans_file.display());
    let start = std::time::Instant::now();
    let mut num_sentences = 0;
    // Created empty up front so that existence never reads as "in progress".
    // Writes are unbuffered: each line is on disk as soon as it is decoded.
    let mut trans_f = std::fs::File::create(trans_file)?;
    while let Some(step) = model.decode()? {
        let outputs = best_beam(&step.tokens, cfg.beam_width)?;
        let batch_size = outputs.dim(0)?;
        num_sentences += batch_size;
        for sent_id in 0..batch_size {
            let translation = get_translation(
                &outputs,
                sent_id,
                vocab,
                cfg.eos.as_deref(),
                cfg.bpe_delimiter.as_deref(),
            )?;
            writeln!(trans_f, "{translation}")?;
        }
    }
    tracing::info!(
        "done {name}, num sentences {num_sentences}, time {:.2}s",
        start.elapsed().as_secs_f64()
    );

    let mut evaluation_scores = HashMap::new();
    if let (Some(ref_file), Some(evaluator)) = (ref_file, evaluator) {
        if trans_file.exists() {
            for metric in &cfg.metrics {
                let score = evaluator.score(ref_file, trans_file, metric)?;
                tracing::info!("{metric} {name}: {score:.1}");
                evaluation_scores.insert(metric.clone(), score);
            }
        }
    }
    Ok(evaluation_scores)
}

/// Decodes an explicit index subset, one sentence per step, writing any
/// per-step summary payload to `{trans_file}{index}.png`.
pub fn decode_indices<M: DecodeModel + ?Sized>(
    model: &mut M,
    cfg: &InferConfig,
    vocab: &dyn TokenLookup,
    trans_file: &Path,
    indices: &[usize],
) -> Result<()> {
    tracing::info!(
        "decoding to output {}, num sents {}",
        trans_file.display(),
        indices.len()
    );
    let start = std::time::Instant::now();
    let mut trans_f = std::fs::File::create(trans_file)?;
    for (done, &decode_id) in indices.iter().enumerate() {
        let step = model.decode()?.ok_or(Error::EarlyExhaustion {
            got: done,
            expected: indices.len(),
        })?;
        let outputs = best_beam(&step.tokens, cfg.beam_width)?;
        let batch_size = outputs.dim(0)?;
        if batch_size != 1 {
            return Err(Error::UnexpectedBatchSize { got: batch_size });
        }
        let translation = get_translation(
            &outputs,
            0,
            vocab,
            cfg.eos.as_deref(),
            cfg.bpe_delimiter.as_deref(),
        )?;
        if let Some(summary) = &step.summary {
            let image_file = summary_path(trans_file, decode_id);
            tracing::info!("save attention image to {}", image_file.display());
            std::fs::write(&image_file, summary)?;
        }
        writeln!(trans_f, "{translation}")?;
    }
    tracing::info!("done, time {:.2}s", start.elapsed().as_secs_f64());
    Ok(())
}

fn summary_path(prefix: &Path, decode_id: usize) -> PathBuf {
    let mut path = prefix.as_os_str().to_os_string();
    path.push(format!("{decode_id}.png"));
    PathBuf::from(path)
}
