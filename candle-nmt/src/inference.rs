//! Single- and multi-worker inference drivers.

use crate::config::InferConfig;
use crate::corpus::load_corpus;
use crate::decode::{decode_and_evaluate, decode_indices, DecodeModel};
use crate::evaluate::Evaluator;
use crate::protocol::{collect_shards, mark_done, worker_output_path};
use crate::shard::Shard;
use crate::vocab::TokenLookup;
use crate::Result;
use std::path::Path;

/// Runs inference end to end, dispatching on the worker topology.
///
/// Configuration errors are raised here, before the corpus is read or any
/// output file is touched.
pub fn inference<M: DecodeModel + ?Sized>(
    model: &mut M,
    cfg: &InferConfig,
    vocab: &dyn TokenLookup,
    input_file: &Path,
    output_file: &Path,
    ref_file: Option<&Path>,
    evaluator: Option<&dyn Evaluator>,
) -> Result<()> {
    cfg.validate()?;
    if cfg.num_workers == 1 {
        single_worker_inference(model, cfg, vocab, input_file, output_file, ref_file, evaluator)
    } else {
        multi_worker_inference(model, cfg, vocab, input_file, output_file)
    }
}

/// Decodes the whole corpus, or an explicit index subset, directly to the
/// final output path. No sharding, no marker protocol.
pub fn single_worker_inference<M: DecodeModel + ?Sized>(
    model: &mut M,
    cfg: &InferConfig,
    vocab: &dyn TokenLookup,
    input_file: &Path,
    output_file: &Path,
    ref_file: Option<&Path>,
    evaluator: Option<&dyn Evaluator>,
) -> Result<()> {
    let infer_data = load_corpus(input_file, cfg.inference_indices.as_deref())?;
    model.bind(&infer_data, cfg.batch_size)?;
    tracing::info!("start decoding");
    match &cfg.inference_indices {
        Some(indices) => decode_indices(model, cfg, vocab, output_file, indices),
        None => {
            decode_and_evaluate(
                "infer",
                model,
                cfg,
                vocab,
                output_file,
                ref_file,
                evaluator,
            )?;
            Ok(())
        }
    }
}

/// Decodes this worker's shard, publishes its done-marker and, on worker 0
/// only, assembles the final output file from all markers in worker-id order.
pub fn multi_worker_inference<M: DecodeModel + ?Sized>(
    model: &mut M,
    cfg: &InferConfig,
    vocab: &dyn TokenLookup,
    input_file: &Path,
    output_file: &Path,
) -> Result<()> {
    let infer_data = load_corpus(input_file, None)?;
    let shard = Shard::compute(infer_data.len(), cfg.num_workers, cfg.worker_id);
    model.bind(shard.slice(&infer_data), cfg.batch_size)?;
    tracing::info!(
        "start decoding, worker {} holds sentences {}..{} of {}",
        shard.worker_id,
        shard.start,
        shard.end.max(shard.start),
        infer_data.len()
    );
    let output_infer = worker_output_path(output_file, cfg.worker_id);
    // Shards are never scored on their own: a reference file covers the whole
    // corpus, not one worker's slice.
    decode_and_evaluate("infer", model, cfg, vocab, &output_infer, None, None)?;

    // Flip the shard output to its done-marker name so peers can see it.
    mark_done(output_file, cfg.worker_id)?;

    // Worker 0 is responsible for the final file and the cleanup.
    if cfg.worker_id != 0 {
        return Ok(());
    }
    collect_shards(output_file, cfg.num_workers, cfg.poll_interval())
}
