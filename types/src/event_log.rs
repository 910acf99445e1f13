//! Append-only event record with synchronous subscribers.

/// Committed events of one engine instance, in emission order.
///
/// Operations stage their events locally and hand them over through
/// [`EventLog::commit`] only once every check and transfer has succeeded,
/// so a failed call never leaves a partial trail. Listeners are invoked
/// inline on commit; keep them fast.
pub struct EventLog<E> {
    records: Vec<E>,
    listeners: Vec<Box<dyn Fn(&E) + Send + Sync>>,
}

impl<E> EventLog<E> {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&E) + Send + Sync>) {
        self.listeners.push(listener);
    }

    /// Append a batch of events produced by one successful operation.
    pub fn commit(&mut self, events: Vec<E>) {
        for event in events {
            for listener in &self.listeners {
                listener(&event);
            }
            self.records.push(event);
        }
    }

    pub fn records(&self) -> &[E] {
        &self.records
    }

    pub fn last(&self) -> Option<&E> {
        self.records.last()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Hand the recorded events to the caller and start a fresh record.
    pub fn drain(&mut self) -> Vec<E> {
        std::mem::take(&mut self.records)
    }
}

impl<E> Default for EventLog<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: std::fmt::Debug> std::fmt::Debug for EventLog<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventLog")
            .field("records", &self.records)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[test]
    fn commit_appends_in_order() {
        let mut log = EventLog::new();
        log.commit(vec![1, 2]);
        log.commit(vec![3]);
        assert_eq!(log.records(), &[1, 2, 3]);
        assert_eq!(log.last(), Some(&3));
    }

    #[test]
    fn listeners_see_every_committed_event() {
        let seen = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&seen);
        let mut log = EventLog::new();
        log.subscribe(Box::new(move |_: &u8| {
            counter.fetch_add(1, Ordering::Relaxed);
        }));
        log.commit(vec![7, 8, 9]);
        log.commit(Vec::new());
        assert_eq!(seen.load(Ordering::Relaxed), 3);
    }

    #[test]
    fn drain_empties_the_record() {
        let mut log = EventLog::new();
        log.commit(vec!["a", "b"]);
        assert_eq!(log.drain(), vec!["a", "b"]);
        assert!(log.is_empty());
    }
}
