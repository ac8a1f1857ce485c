use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Default)]
pub struct Metrics {
    total: AtomicU64,
    statuses: Mutex<HashMap<u16, u64>>,
}

impl Metrics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_attempt(&self) {
        self.total.fetch_add(1, Ordering::SeqCst);
    }

    pub fn record_status(&self, code: u16) {
        *self.statuses().entry(code).or_insert(0) += 1;
    }

    pub fn total(&self) -> u64 {
        self.total.load(Ordering::SeqCst)
    }

    /// Copy both fields. The pair is not read atomically; exact once every
    /// worker has exited.
    pub fn snapshot(&self) -> Snapshot {
        let statuses = self.statuses().clone();
        Snapshot {
            total: self.total(),
            statuses,
        }
    }

    fn statuses(&self) -> MutexGuard<'_, HashMap<u16, u64>> {
        self.statuses.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Point-in-time copy of [`Metrics`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub total: u64,
    pub statuses: HashMap<u16, u64>,
}

impl Snapshot {
    pub fn responses(&self) -> u64 {
        self.statuses.values().sum()
    }

    /// Attempts that failed before a status code was obtained.
    pub fn failures(&self) -> u64 {
        self.total.saturating_sub(self.responses())
    }

    pub fn sorted_statuses(&self) -> Vec<(u16, u64)> {
        let mut statuses: Vec<_> = self.statuses.iter().map(|(&c, &n)| (c, n)).collect();
        statuses.sort_unstable();
        statuses
    }
}
