/// Handle to a pending timeout or interval.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct TimerId(u64);

struct Entry<E> {
    id: TimerId,
    due_ms: u64,
    period_ms: Option<u64>,
    event: E,
}

/// Single-threaded timeouts and intervals over a millisecond clock.
///
/// Nothing fires on its own: the owner calls [`TimerQueue::pop_due`] with the
/// current time and dispatches whatever came due, in order.
pub struct TimerQueue<E> {
    now_ms: u64,
    next_id: u64,
    entries: Vec<Entry<E>>,
}

impl<E: Clone> TimerQueue<E> {
    pub fn new() -> Self {
        Self {
            now_ms: 0,
            next_id: 0,
            entries: Vec::new(),
        }
    }

    #[cfg(test)]
    pub fn now_ms(&self) -> u64 {
        self.now_ms
    }

    pub fn set_timeout(&mut self, delay_ms: u64, event: E) -> TimerId {
        self.insert(delay_ms, None, event)
    }

    pub fn set_interval(&mut self, period_ms: u64, event: E) -> TimerId {
        // a zero period would fire forever inside one advance
        let period_ms = period_ms.max(1);
        self.insert(period_ms, Some(period_ms), event)
    }

    fn insert(&mut self, delay_ms: u64, period_ms: Option<u64>, event: E) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.entries.push(Entry {
            id,
            due_ms: self.now_ms + delay_ms,
            period_ms,
            event,
        });
        id
    }

    /// Cancels a timer. Unknown or already-fired ids are ignored.
    pub fn clear(&mut self, id: TimerId) {
        self.entries.retain(|e| e.id != id);
    }

    #[cfg(test)]
    pub fn is_pending(&self, id: TimerId) -> bool {
        self.entries.iter().any(|e| e.id == id)
    }

    /// Earliest due time, used by the driver to size its poll timeout.
    pub fn next_due_ms(&self) -> Option<u64> {
        self.entries.iter().map(|e| e.due_ms).min()
    }

    /// Moves the clock forward and returns the next timer due at or before
    /// `now_ms`, or `None` once nothing else is due.
    ///
    /// Popping one event at a time lets the caller cancel or schedule timers
    /// between firings.
    pub fn pop_due(&mut self, now_ms: u64) -> Option<(TimerId, E)> {
        let idx = self
            .entries
            .iter()
            .enumerate()
            .filter(|(_, e)| e.due_ms <= now_ms)
            .min_by_key(|(_, e)| (e.due_ms, e.id.0))
            .map(|(i, _)| i);

        let Some(idx) = idx else {
            self.now_ms = self.now_ms.max(now_ms);
            return None;
        };

        let entry = &mut self.entries[idx];
        self.now_ms = self.now_ms.max(entry.due_ms);
        let fired = (entry.id, entry.event.clone());

        match entry.period_ms {
            Some(period) => entry.due_ms += period,
            None => {
                self.entries.swap_remove(idx);
            }
        }
        Some(fired)
    }
}

impl<E: Clone> Default for TimerQueue<E> {
    fn default() -> Self {
        Self::new()
    }
}

/// Handle returned by a frame request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FrameHandle(pub u64);

/// Source of animation frames. The loop asks for exactly one frame at a time.
pub trait FrameScheduler {
    fn request_frame(&mut self) -> FrameHandle;
    fn cancel_frame(&mut self, handle: FrameHandle);
}
