use crate::Result;
use std::path::Path;

/// Reference-based scoring of a decoded file. The metric computation itself
/// (BLEU, chrF, ...) is an external concern consumed through this seam.
pub trait Evaluator {
    /// Scores `trans_file` against `ref_file` for the named metric.
    fn score(&self, ref_file: &Path, trans_file: &Path, metric: &str) -> Result<f64>;
}
