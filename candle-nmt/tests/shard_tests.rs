use candle_nmt::Shard;

#[test]
fn partition_is_total_ordered_and_disjoint() {
    for total in 0..50usize {
        for num_workers in 1..8usize {
            let data: Vec<usize> = (0..total).collect();
            let mut seen = Vec::new();
            for worker_id in 0..num_workers {
                let shard = Shard::compute(total, num_workers, worker_id);
                seen.extend_from_slice(shard.slice(&data));
            }
            // Concatenating the shards in worker-id order must rebuild the
            // corpus exactly: no gap, no overlap, no reordering.
            assert_eq!(seen, data, "total {total}, num_workers {num_workers}");
        }
    }
}

#[test]
fn partition_is_deterministic() {
    for _ in 0..3 {
        let shard = Shard::compute(1021, 7, 3);
        assert_eq!(shard, Shard::compute(1021, 7, 3));
        assert_eq!((shard.start, shard.end), (438, 584));
    }
}

#[test]
fn trailing_empty_shards_are_legal() {
    let expected = [(0, 1), (1, 2), (2, 3), (3, 3), (4, 3)];
    for (worker_id, &(start, end)) in expected.iter().enumerate() {
        let shard = Shard::compute(3, 5, worker_id);
        assert_eq!((shard.start, shard.end), (start, end));
        assert_eq!(shard.is_empty(), worker_id >= 3);
        assert_eq!(shard.len(), if worker_id < 3 { 1 } else { 0 });
    }
    let data = ["a", "b", "c"];
    assert!(Shard::compute(3, 5, 4).slice(&data).is_empty());
}

#[test]
fn ten_sentences_three_workers() {
    assert_eq!(
        (0..3)
            .map(|worker_id| {
                let shard = Shard::compute(10, 3, worker_id);
                (shard.start, shard.end)
            })
            .collect::<Vec<_>>(),
        [(0, 4), (4, 8), (8, 10)]
    );
}

#[test]
fn empty_corpus_yields_empty_shards() {
    for worker_id in 0..4 {
        let shard = Shard::compute(0, 4, worker_id);
        assert!(shard.is_empty());
        assert_eq!(shard.end, 0);
    }
}
