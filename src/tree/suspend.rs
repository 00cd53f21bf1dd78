//! Suspension (stop-the-world / throttling) log for a pod.
//!
//! Entries are `(end timestamp, delay)` pairs: the run was suspended for
//! `delay` millis ending at `end`. A forward-only cursor computes the net
//! suspension inside consecutive `[begin, end)` windows, which the tree
//! builder charges to the call active at the time.

/// Sorted suspension entries
#[derive(Debug, Clone, Default)]
pub struct SuspendLog {
    /// (end timestamp, delay) sorted by timestamp
    list: Vec<(i64, i64)>,
}

impl SuspendLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry; timestamps must arrive ascending
    pub fn add(&mut self, t: i64, delay: i64) {
        self.list.push((t, delay));
    }

    pub fn add_all(&mut self, other: &SuspendLog) {
        self.list.extend_from_slice(&other.list);
        self.list.sort_by_key(|p| p.0); // for binary search
    }

    pub fn len(&self) -> usize {
        self.list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    /// Net suspension time inside `[begin, end)`
    pub fn suspend_duration(&self, begin: i64, end: i64) -> i64 {
        let mut cursor = SuspendCursor::default();
        cursor.skip_to(self, begin);
        cursor.move_to(self, end)
    }

    fn first_at_or_after(&self, begin: i64) -> usize {
        self.list.partition_point(|p| p.0 < begin)
    }
}

/// Forward cursor over a [`SuspendLog`]
#[derive(Debug, Clone, Copy, Default)]
pub struct SuspendCursor {
    idx: usize,
    now: i64,
    /// start of the entry under the cursor
    a: i64,
}

impl SuspendCursor {
    /// Position the cursor at `begin` without accumulating
    pub fn skip_to(&mut self, log: &SuspendLog, begin: i64) {
        let idx = log.first_at_or_after(begin);
        self.idx = idx;
        self.now = begin;
        if idx == log.list.len() {
            return;
        }
        let (t, delay) = log.list[idx];
        self.a = t - delay;
    }

    /// Net suspension in `[now, end)`, advancing the cursor to `end`
    pub fn move_to(&mut self, log: &SuspendLog, end: i64) -> i64 {
        if self.idx == log.list.len() {
            return 0;
        }

        let mut a = self.a;
        if a >= end {
            return 0;
        }

        let (t, delay) = log.list[self.idx];
        let mut suspend = delay.min(t - self.now);
        if t >= end {
            suspend -= t - end;
            self.now = end;
            return suspend;
        }

        self.idx += 1;
        while self.idx < log.list.len() {
            let (t, delay) = log.list[self.idx];
            if t < end {
                suspend += delay;
                self.idx += 1;
                continue;
            }
            a = t - delay;
            if a < end {
                suspend += end - a;
            }
            break;
        }
        self.now = end;
        self.a = a;
        suspend
    }
}
