//! Restores enumeration order for results that complete out of order.
//!
//! Items are inserted with the index they were enumerated at and come back out
//! strictly in index order (0, 1, 2, ...), regardless of insertion order.

use std::collections::BTreeMap;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertError<T> {
    /// The index was already released.
    Stale(T),
    /// The index is already waiting to be released.
    Duplicate(T),
}

#[derive(Debug)]
pub struct ReorderBuffer<T> {
    pending: BTreeMap<usize, T>,
    next_index: usize,
}

impl<T> Default for ReorderBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> ReorderBuffer<T> {
    pub fn new() -> Self {
        Self {
            pending: BTreeMap::new(),
            next_index: 0,
        }
    }

    pub fn insert(&mut self, index: usize, item: T) -> Result<(), InsertError<T>> {
        if index < self.next_index {
            return Err(InsertError::Stale(item));
        }

        if self.pending.contains_key(&index) {
            return Err(InsertError::Duplicate(item));
        }

        self.pending.insert(index, item);
        Ok(())
    }

    /// Release every item that is next in line.
    pub fn drain_ready(&mut self) -> impl Iterator<Item = T> + '_ {
        std::iter::from_fn(move || {
            let item = self.pending.remove(&self.next_index)?;
            self.next_index += 1;
            Some(item)
        })
    }

    /// Index of the next item to be released.
    pub fn next_index(&self) -> usize {
        self.next_index
    }
}
