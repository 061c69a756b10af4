/// A contiguous sub-range of the corpus assigned to one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Shard {
    pub worker_id: usize,
    pub start: usize,
    pub end: usize,
}

impl Shard {
    /// Computes the shard for `worker_id` over a corpus of `total` sentences
    /// using ceiling-division sizing: `per_worker = ceil(total / num_workers)`.
    ///
    /// The partition is pure and exact. Taken over all worker ids, the shards
    /// cover `[0, total)` contiguously with no overlap; trailing shards may be
    /// empty (`start >= end`), which is a valid assignment, not an error.
    pub fn compute(total: usize, num_workers: usize, worker_id: usize) -> Self {
        let per_worker = total.div_ceil(num_workers);
        let start = worker_id * per_worker;
        let end = usize::min(start + per_worker, total);
        Self {
            worker_id,
            start,
            end,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// The sentences of `data` covered by this shard.
    pub fn slice<'a, T>(&self, data: &'a [T]) -> &'a [T] {
        if self.is_empty() {
            &[]
        } else {
            &data[self.start..self.end]
        }
    }
}
