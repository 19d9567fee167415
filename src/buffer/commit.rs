//! `CommitGate`: publishes immutable snapshots of the row set.
//!
//! This is the only shared state between producers and the render loop.
//! A snapshot is replaced as a whole under one lock, so readers never see
//! a mix of two commits.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// An immutable copy of the row set taken at commit time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snapshot {
    rows: Arc<[String]>,
    generation: u64,
}

impl Snapshot {
    /// Blank snapshot with `row_count` empty rows and generation 0.
    pub fn blank(row_count: usize) -> Self {
        Self {
            rows: vec![String::new(); row_count].into(),
            generation: 0,
        }
    }

    /// Rows in order.
    #[inline]
    pub fn rows(&self) -> &[String] {
        &self.rows
    }

    /// Text of one row.
    #[inline]
    pub fn row(&self, index: usize) -> Option<&str> {
        self.rows.get(index).map(String::as_str)
    }

    /// Number of commits published before and including this one.
    #[inline]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// Number of rows.
    #[inline]
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the snapshot has no rows at all.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Mutex-guarded slot holding the committed snapshot.
#[derive(Debug)]
pub struct CommitGate {
    current: Mutex<Snapshot>,
}

impl CommitGate {
    /// Create a gate holding a blank snapshot.
    pub fn new(row_count: usize) -> Self {
        Self {
            current: Mutex::new(Snapshot::blank(row_count)),
        }
    }

    /// Replace the committed snapshot with a copy of `rows`.
    ///
    /// Returns the generation of the new snapshot.
    pub fn publish(&self, rows: &[String]) -> u64 {
        let rows: Arc<[String]> = rows.into();
        let mut current = self.lock();
        let generation = current.generation + 1;
        *current = Snapshot { rows, generation };
        generation
    }

    /// The latest committed snapshot.
    pub fn read(&self) -> Snapshot {
        self.lock().clone()
    }

    // The slot is only ever assigned whole, so a poisoned lock still guards
    // a complete snapshot.
    fn lock(&self) -> MutexGuard<'_, Snapshot> {
        self.current.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    fn rows(texts: &[&str]) -> Vec<String> {
        texts.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_initial_snapshot_is_blank() {
        let gate = CommitGate::new(4);
        let snapshot = gate.read();
        assert_eq!(snapshot.len(), 4);
        assert_eq!(snapshot.generation(), 0);
        assert!(snapshot.rows().iter().all(String::is_empty));
    }

    #[test]
    fn test_publish_then_read() {
        let gate = CommitGate::new(2);
        let generation = gate.publish(&rows(&["a", "b"]));
        assert_eq!(generation, 1);

        let snapshot = gate.read();
        assert_eq!(snapshot.row(0), Some("a"));
        assert_eq!(snapshot.row(1), Some("b"));
        assert_eq!(snapshot.generation(), 1);
    }

    #[test]
    fn test_snapshot_survives_later_publish() {
        let gate = CommitGate::new(1);
        gate.publish(&rows(&["first"]));
        let held = gate.read();
        gate.publish(&rows(&["second"]));

        assert_eq!(held.row(0), Some("first"));
        assert_eq!(gate.read().row(0), Some("second"));
    }

    #[test]
    fn test_concurrent_readers_see_whole_snapshots() {
        let gate = Arc::new(CommitGate::new(8));
        let writer = {
            let gate = Arc::clone(&gate);
            thread::spawn(move || {
                for i in 0..500 {
                    let text = i.to_string();
                    gate.publish(&vec![text; 8]);
                }
            })
        };

        for _ in 0..500 {
            let snapshot = gate.read();
            let first = snapshot.row(0).unwrap_or_default();
            assert!(snapshot.rows().iter().all(|row| row == first));
        }
        writer.join().unwrap();
        assert_eq!(gate.read().generation(), 500);
    }
}
