use candle_nmt::protocol::{collect_shards, done_marker_path, mark_done, worker_output_path};
use candle_nmt::Result;
use std::time::Duration;

#[test]
fn paths_follow_the_naming_scheme() {
    let base = std::path::Path::new("/tmp/trans.txt");
    assert_eq!(
        worker_output_path(base, 2),
        std::path::PathBuf::from("/tmp/trans.txt_2")
    );
    assert_eq!(
        done_marker_path(base, 2),
        std::path::PathBuf::from("/tmp/trans.txt_done_2")
    );
}

#[test]
fn mark_done_renames_the_shard_output() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let base = dir.path().join("trans");
    std::fs::write(worker_output_path(&base, 1), "hello\nworld\n")?;
    mark_done(&base, 1)?;
    assert!(!worker_output_path(&base, 1).exists());
    assert_eq!(
        std::fs::read_to_string(done_marker_path(&base, 1))?,
        "hello\nworld\n"
    );
    Ok(())
}

#[test]
fn aggregation_orders_by_worker_id_not_completion_time() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let base = dir.path().join("trans");

    // Workers complete in real-time order 2, 0, 1. The aggregator is already
    // polling while no marker exists yet.
    let publisher = {
        let base = base.clone();
        std::thread::spawn(move || -> Result<()> {
            for (delay_ms, worker_id) in [(20u64, 2usize), (60, 0), (100, 1)] {
                std::thread::sleep(Duration::from_millis(delay_ms));
                let lines: String = (0..2)
                    .map(|sent| format!("worker{worker_id} sent{sent}\n"))
                    .collect();
                std::fs::write(worker_output_path(&base, worker_id), lines)?;
                mark_done(&base, worker_id)?;
            }
            Ok(())
        })
    };

    collect_shards(&base, 3, Duration::from_millis(5))?;
    publisher.join().unwrap()?;

    let expected = "worker0 sent0\nworker0 sent1\n\
                    worker1 sent0\nworker1 sent1\n\
                    worker2 sent0\nworker2 sent1\n";
    assert_eq!(std::fs::read_to_string(&base)?, expected);

    // Every marker was consumed and deleted.
    for worker_id in 0..3 {
        assert!(!done_marker_path(&base, worker_id).exists());
    }
    Ok(())
}

#[test]
fn aggregation_keeps_polling_instead_of_fabricating_output() -> Result<()> {
    let dir = tempfile::tempdir()?;
    let base = dir.path().join("trans");

    let aggregator = {
        let base = base.clone();
        std::thread::spawn(move || collect_shards(&base, 1, Duration::from_millis(5)))
    };
    // With no marker present the aggregator must still be blocked in its
    // poll loop rather than finishing with an empty file.
    std::thread::sleep(Duration::from_millis(60));
    assert!(!aggregator.is_finished());

    std::fs::write(worker_output_path(&base, 0), "late\n")?;
    mark_done(&base, 0)?;
    aggregator.join().unwrap()?;
    assert_eq!(std::fs::read_to_string(&base)?, "late\n");
    Ok(())
}
