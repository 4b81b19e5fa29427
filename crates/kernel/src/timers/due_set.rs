use crate::Instant;
use heapless::Vec;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DueEntry {
    pub(crate) due: Instant,
    pub(crate) seq: u32,
    pub(crate) slot: usize,
}

impl DueEntry {
    fn order(&self) -> (Instant, u32) {
        (self.due, self.seq)
    }
}

/// Armed timers ordered by `(due, creation order)`.
///
/// Entries are kept sorted from latest to earliest so that the next timer to fire sits at
/// the end of the vector and is removed in constant time.
pub(crate) struct DueSet<const N: usize> {
    entries: Vec<DueEntry, N>,
}

impl<const N: usize> DueSet<N> {
    pub(crate) const fn new() -> Self {
        DueSet { entries: Vec::new() }
    }

    /// Inserts `p_entry`. A slot is present at most once, so the set never overflows as
    /// long as it is sized like the timer table.
    pub(crate) fn insert(&mut self, p_entry: DueEntry) -> Result<(), DueEntry> {
        let l_index = self
            .entries
            .partition_point(|l_e| l_e.order() > p_entry.order());
        self.entries.insert(l_index, p_entry)
    }

    /// Removes the entry of `p_slot`, if armed.
    pub(crate) fn remove_slot(&mut self, p_slot: usize) -> Option<DueEntry> {
        let l_index = self.entries.iter().position(|l_e| l_e.slot == p_slot)?;
        Some(self.entries.remove(l_index))
    }

    pub(crate) fn peek(&self) -> Option<&DueEntry> {
        self.entries.last()
    }

    /// Removes the earliest entry if it is due at `p_now`.
    pub(crate) fn pop_due(&mut self, p_now: Instant) -> Option<DueEntry> {
        match self.entries.last() {
            Some(l_e) if l_e.due <= p_now => self.entries.pop(),
            _ => None,
        }
    }

    pub(crate) fn next_deadline(&self) -> Option<Instant> {
        self.peek().map(|l_e| l_e.due)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(p_due: u64, p_seq: u32, p_slot: usize) -> DueEntry {
        DueEntry {
            due: Instant::from_millis(p_due),
            seq: p_seq,
            slot: p_slot,
        }
    }

    #[test]
    fn earliest_first_then_creation_order() {
        let mut l_set: DueSet<4> = DueSet::new();
        l_set.insert(entry(2000, 0, 0)).unwrap();
        l_set.insert(entry(1000, 3, 3)).unwrap();
        l_set.insert(entry(1000, 1, 1)).unwrap();
        l_set.insert(entry(1500, 2, 2)).unwrap();

        assert_eq!(l_set.next_deadline(), Some(Instant::from_millis(1000)));
        let l_now = Instant::from_millis(1500);
        assert_eq!(l_set.pop_due(l_now).map(|l_e| l_e.slot), Some(1));
        assert_eq!(l_set.pop_due(l_now).map(|l_e| l_e.slot), Some(3));
        assert_eq!(l_set.pop_due(l_now).map(|l_e| l_e.slot), Some(2));
        assert_eq!(l_set.pop_due(l_now), None);
        assert_eq!(l_set.entries.len(), 1);
    }

    #[test]
    fn remove_by_slot() {
        let mut l_set: DueSet<2> = DueSet::new();
        l_set.insert(entry(10, 0, 0)).unwrap();
        l_set.insert(entry(20, 1, 1)).unwrap();
        assert!(l_set.insert(entry(30, 2, 2)).is_err());

        assert_eq!(l_set.remove_slot(0).map(|l_e| l_e.due.as_millis()), Some(10));
        assert_eq!(l_set.remove_slot(0), None);
        assert_eq!(l_set.next_deadline(), Some(Instant::from_millis(20)));
    }
}
