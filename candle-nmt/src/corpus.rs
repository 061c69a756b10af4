use crate::{Error, Result};
use std::path::Path;

/// Reads a line-oriented corpus fully into memory, one sentence per line,
/// optionally projecting it down to an explicit index subset.
pub fn load_corpus(path: &Path, indices: Option<&[usize]>) -> Result<Vec<String>> {
    let raw = std::fs::read_to_string(path)?;
    let sentences: Vec<String> = raw.lines().map(str::to_string).collect();
    match indices {
        None => Ok(sentences),
        Some(indices) => indices
            .iter()
            .map(|&index| {
                sentences
                    .get(index)
                    .cloned()
                    .ok_or(Error::IndexOutOfRange {
                        index,
                        len: sentences.len(),
                    })
            })
            .collect(),
    }
}
