//! File-presence rendezvous between workers: a finished shard is published by
//! atomically renaming its output file to a done-marker name, and worker 0
//! merges the markers into the final output in worker-id order.

use crate::Result;
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Output file decoded by one worker: `{base}_{worker_id}`.
pub fn worker_output_path(base: &Path, worker_id: usize) -> PathBuf {
    let mut path = base.as_os_str().to_os_string();
    path.push(format!("_{worker_id}"));
    PathBuf::from(path)
}

/// Done-marker for one worker: `{base}_done_{worker_id}`. Its existence is
/// the completion signal; its contents are the worker's shard output.
pub fn done_marker_path(base: &Path, worker_id: usize) -> PathBuf {
    let mut path = base.as_os_str().to_os_string();
    path.push(format!("_done_{worker_id}"));
    PathBuf::from(path)
}

/// Renames a worker's finished output file to its done-marker name.
///
/// The rename must be atomic: the aggregator can then never observe a
/// half-written file under the marker name, which is what makes the whole
/// protocol safe without locks.
pub fn mark_done(base: &Path, worker_id: usize) -> Result<()> {
    std::fs::rename(
        worker_output_path(base, worker_id),
        done_marker_path(base, worker_id),
    )?;
    Ok(())
}

/// Worker-0 aggregation: waits for every worker's done-marker in ascending
/// worker-id order, appends each shard's lines to the final output file at
/// `base` and deletes the consumed marker.
///
/// Polling has no timeout: a worker that never completes stalls the
/// aggregator indefinitely.
pub fn collect_shards(base: &Path, num_workers: usize, poll_interval: Duration) -> Result<()> {
    let mut final_f = std::fs::File::create(base)?;
    for worker_id in 0..num_workers {
        let marker = done_marker_path(base, worker_id);
        while !marker.exists() {
            tracing::info!("waiting for job {worker_id} to complete");
            std::thread::sleep(poll_interval);
        }
        let reader = std::io::BufReader::new(std::fs::File::open(&marker)?);
        for translation in reader.lines() {
            writeln!(final_f, "{}", translation?)?;
        }
        std::fs::remove_file(&marker)?;
    }
    Ok(())
}
