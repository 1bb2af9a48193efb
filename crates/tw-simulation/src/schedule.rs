use std::collections::{BTreeMap, HashSet};

use tracing::trace;
use tw_core::ActionId;

/// A queue entry: an action bound to the tick it is due.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scheduled<A> {
    /// Handle used for cancellation.
    pub id: ActionId,
    /// Tick the entry was scheduled for.
    pub tick: u64,
    /// The action payload.
    pub action: A,
}

/// Time-ordered, multi-valued action queue.
///
/// Entries due at the same tick run in the order they were scheduled.
/// Scheduling and cancelling never fail; unknown handles are ignored.
#[derive(Debug)]
pub struct Scheduler<A> {
    current_tick: u64,
    queue: BTreeMap<u64, Vec<Scheduled<A>>>,
    next_id: u64,
    in_flight: HashSet<ActionId>,
}

impl<A> Default for Scheduler<A> {
    fn default() -> Self {
        Self::new()
    }
}

impl<A> Scheduler<A> {
    /// Create an empty scheduler at tick 0.
    pub fn new() -> Self {
        Self {
            current_tick: 0,
            queue: BTreeMap::new(),
            next_id: 0,
            in_flight: HashSet::new(),
        }
    }

    /// The tick most recently advanced to.
    pub fn current_tick(&self) -> u64 {
        self.current_tick
    }

    /// Number of queued entries.
    pub fn len(&self) -> usize {
        self.queue.values().map(Vec::len).sum()
    }

    /// True when nothing is queued.
    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    /// Smallest tick with a queued entry.
    pub fn next_due(&self) -> Option<u64> {
        self.queue.keys().next().copied()
    }

    /// True when `id` is still queued.
    pub fn contains(&self, id: ActionId) -> bool {
        self.tick_of(id).is_some()
    }

    /// Tick a queued entry is due at.
    pub fn tick_of(&self, id: ActionId) -> Option<u64> {
        self.queue
            .iter()
            .find_map(|(tick, entries)| entries.iter().any(|e| e.id == id).then_some(*tick))
    }

    /// Queue `action` for `tick`. Ticks in the past are allowed and run on
    /// the next advance.
    pub fn schedule_at(&mut self, action: A, tick: u64) -> ActionId {
        let id = ActionId(self.next_id);
        self.next_id += 1;
        self.queue
            .entry(tick)
            .or_default()
            .push(Scheduled { id, tick, action });
        id
    }

    /// Queue `action` for `current_tick + delay`.
    pub fn schedule_after(&mut self, action: A, delay: u64) -> ActionId {
        self.schedule_at(action, self.current_tick.saturating_add(delay))
    }

    /// Withdraw every entry whose handle is in `ids`, wherever it is queued.
    ///
    /// Entries of the batch currently being drained are withdrawn too, so a
    /// cancelled action never runs. Returns the number of entries withdrawn.
    pub fn cancel(&mut self, ids: &[ActionId]) -> usize {
        if ids.is_empty() {
            return 0;
        }
        let mut withdrawn = 0;
        for id in ids {
            if self.in_flight.remove(id) {
                withdrawn += 1;
            }
        }
        self.queue.retain(|_, entries| {
            let before = entries.len();
            entries.retain(|e| !ids.contains(&e.id));
            withdrawn += before - entries.len();
            !entries.is_empty()
        });
        withdrawn
    }

    /// Advance to `tick`, running every entry due at or before it.
    ///
    /// The current tick never moves backwards: a target below it drains up
    /// to the current tick instead. Keys are drained smallest first, each at
    /// most once per call. Each key's entries are taken as a snapshot and
    /// handed to `run` together with the target tick (not the key). Entries
    /// scheduled while draining land at their key: a key already drained in
    /// this call keeps them for the next advance, any other key up to `tick`
    /// is picked up in this call, even one below the key being drained.
    ///
    /// Returns the number of entries run.
    pub fn advance_to<F>(&mut self, tick: u64, mut run: F) -> usize
    where
        F: FnMut(&mut Self, Scheduled<A>, u64),
    {
        let tick = tick.max(self.current_tick);
        self.current_tick = tick;
        let mut drained: HashSet<u64> = HashSet::new();
        let mut fired = 0;

        loop {
            let next = self
                .queue
                .range(..=tick)
                .map(|(key, _)| *key)
                .find(|key| !drained.contains(key));
            let Some(key) = next else { break };

            let batch = self.queue.remove(&key).unwrap_or_default();
            drained.insert(key);
            self.in_flight = batch.iter().map(|e| e.id).collect();

            for entry in batch {
                if !self.in_flight.remove(&entry.id) {
                    trace!(id = %entry.id, key, "skipping action cancelled mid-batch");
                    continue;
                }
                fired += 1;
                run(self, entry, tick);
            }
            self.in_flight.clear();
        }
        fired
    }
}
