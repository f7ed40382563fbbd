use alloc::collections::BTreeMap;
use alloc::vec::Vec;

/// When queued work runs relative to the current turn.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Tier {
    /// At the end of the current turn, after every synchronous mutation.
    Finally,
    /// On the next turn, once layout of the current one has settled.
    Deferred,
}

/// A coalescing, single-threaded work queue.
///
/// Each key is scheduled at most once at a time ("mark dirty, schedule once"). Cancelling a
/// key clears its flag, so a cancelled task is never handed out. The scheduler owns no clock:
/// callers drain tiers explicitly, which keeps it testable with a fake time source.
#[derive(Clone, Debug)]
pub struct Scheduler<K> {
    finally: Vec<K>,
    deferred: Vec<K>,
    timers: BTreeMap<K, u64>,
}

impl<K> Default for Scheduler<K> {
    fn default() -> Self {
        Self {
            finally: Vec::new(),
            deferred: Vec::new(),
            timers: BTreeMap::new(),
        }
    }
}

impl<K: Ord + Copy> Scheduler<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues `key` on `tier` unless it is already queued on either tier.
    ///
    /// Returns `true` if the key was newly queued.
    pub fn schedule_coalesced(&mut self, key: K, tier: Tier) -> bool {
        if self.finally.contains(&key) || self.deferred.contains(&key) {
            return false;
        }
        self.queue(tier).push(key);
        true
    }

    /// Moves `key` to `tier`, queueing it if needed.
    pub fn reschedule(&mut self, key: K, tier: Tier) {
        self.finally.retain(|k| *k != key);
        self.deferred.retain(|k| *k != key);
        self.queue(tier).push(key);
    }

    /// Arms a timer for `key`, replacing an earlier deadline.
    pub fn schedule_at(&mut self, key: K, due_ms: u64) {
        self.timers.insert(key, due_ms);
    }

    /// Removes `key` from every tier. Returns `true` if anything was pending.
    pub fn cancel(&mut self, key: K) -> bool {
        let before = self.finally.len() + self.deferred.len();
        self.finally.retain(|k| *k != key);
        self.deferred.retain(|k| *k != key);
        let timer = self.timers.remove(&key).is_some();
        timer || before != self.finally.len() + self.deferred.len()
    }

    pub fn is_scheduled(&self, key: K) -> bool {
        self.finally.contains(&key) || self.deferred.contains(&key) || self.timers.contains_key(&key)
    }

    pub fn has_finally(&self) -> bool {
        !self.finally.is_empty()
    }

    pub fn has_deferred(&self) -> bool {
        !self.deferred.is_empty()
    }

    pub fn is_idle(&self) -> bool {
        self.finally.is_empty() && self.deferred.is_empty() && self.timers.is_empty()
    }

    /// Takes the end-of-turn queue in scheduling order. Work queued while running it lands in a
    /// fresh queue.
    pub fn drain_finally(&mut self) -> Vec<K> {
        core::mem::take(&mut self.finally)
    }

    pub fn drain_deferred(&mut self) -> Vec<K> {
        core::mem::take(&mut self.deferred)
    }

    /// Takes every timer due at `now_ms`, earliest first.
    pub fn drain_due(&mut self, now_ms: u64) -> Vec<K> {
        let mut due: Vec<(u64, K)> = self
            .timers
            .iter()
            .filter(|(_, at)| **at <= now_ms)
            .map(|(k, at)| (*at, *k))
            .collect();
        due.sort_by_key(|(at, _)| *at);
        for (_, key) in &due {
            self.timers.remove(key);
        }
        due.into_iter().map(|(_, k)| k).collect()
    }

    /// The earliest pending timer deadline.
    pub fn next_due(&self) -> Option<u64> {
        self.timers.values().copied().min()
    }

    fn queue(&mut self, tier: Tier) -> &mut Vec<K> {
        match tier {
            Tier::Finally => &mut self.finally,
            Tier::Deferred => &mut self.deferred,
        }
    }
}

/// What the column width task should do when it gets to run.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum WidthStep {
    Run,
    Again(Tier),
}

/// Retry bookkeeping of the column width task.
///
/// Widths depend on header/footer content, so the task waits for dirty sections by re-queueing
/// itself at end of turn. After `limit` attempts it falls back to the next turn so it cannot
/// starve the loop. While rows are being fetched it always waits a turn.
#[derive(Clone, Copy, Debug)]
pub(crate) struct WidthRetry {
    retries: u32,
    limit: u32,
}

impl WidthRetry {
    pub(crate) fn new(limit: u32) -> Self {
        Self { retries: 0, limit }
    }

    pub(crate) fn retries(&self) -> u32 {
        self.retries
    }

    pub(crate) fn next_step(&mut self, sections_dirty: bool, fetching: bool) -> WidthStep {
        if sections_dirty {
            if self.retries < self.limit {
                self.retries += 1;
                return WidthStep::Again(Tier::Finally);
            }
            self.retries = 0;
            return WidthStep::Again(Tier::Deferred);
        }
        if fetching {
            return WidthStep::Again(Tier::Deferred);
        }
        self.retries = 0;
        WidthStep::Run
    }
}
