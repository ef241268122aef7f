//! Dense component storage
//!
//! Records of one component kind live contiguously in a `Vec`, with a side
//! index from entity to slot. Removal swaps the last record into the hole,
//! so iteration order is compaction order and changes after a destroy.

use super::{Component, Entity};
use std::collections::HashMap;

/// Dense per-kind store keyed by entity
#[derive(Debug, Clone)]
pub struct ComponentPool<T: Component> {
    records: Vec<T>,
    index: HashMap<Entity, usize>,
}

impl<T: Component> Default for ComponentPool<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Component> ComponentPool<T> {
    /// Create an empty pool
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Create an empty pool with room for `capacity` records
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    /// Get the record for `entity`, constructing a default one if absent
    ///
    /// An existing record is returned untouched.
    pub fn emplace(&mut self, entity: Entity) -> &mut T {
        let slot = match self.index.get(&entity).copied() {
            Some(slot) => slot,
            None => self.push(T::for_entity(entity)),
        };
        &mut self.records[slot]
    }

    /// Store a fully built record keyed by its own entity
    ///
    /// Like [`emplace`](Self::emplace), an existing record wins and `record`
    /// is dropped.
    pub fn insert(&mut self, record: T) -> &mut T {
        let slot = match self.index.get(&record.entity()).copied() {
            Some(slot) => slot,
            None => self.push(record),
        };
        &mut self.records[slot]
    }

    fn push(&mut self, record: T) -> usize {
        let slot = self.records.len();
        self.index.insert(record.entity(), slot);
        self.records.push(record);
        slot
    }

    /// Get the record for `entity`
    pub fn get(&self, entity: Entity) -> Option<&T> {
        self.index.get(&entity).map(|&slot| &self.records[slot])
    }

    /// Get the record for `entity` mutably
    pub fn get_mut(&mut self, entity: Entity) -> Option<&mut T> {
        let slot = *self.index.get(&entity)?;
        Some(&mut self.records[slot])
    }

    /// Check whether `entity` has a record
    pub fn contains(&self, entity: Entity) -> bool {
        self.index.contains_key(&entity)
    }

    /// Remove and return the record for `entity`
    pub fn destroy(&mut self, entity: Entity) -> Option<T> {
        let slot = self.index.remove(&entity)?;
        let removed = self.records.swap_remove(slot);

        // The former last record now sits in `slot`
        if let Some(moved) = self.records.get(slot) {
            self.index.insert(moved.entity(), slot);
        }

        Some(removed)
    }

    /// Visit every record
    pub fn for_each(&self, mut f: impl FnMut(&T)) {
        self.records.iter().for_each(|record| f(record));
    }

    /// Visit every record mutably
    pub fn for_each_mut(&mut self, mut f: impl FnMut(&mut T)) {
        self.records.iter_mut().for_each(|record| f(record));
    }

    /// Iterate records in storage order
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.records.iter()
    }

    /// Iterate records mutably in storage order
    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.records.iter_mut()
    }

    /// Iterate the entities that own a record
    pub fn entities(&self) -> impl Iterator<Item = Entity> + '_ {
        self.records.iter().map(T::entity)
    }

    /// Records as a contiguous slice
    pub fn as_slice(&self) -> &[T] {
        &self.records
    }

    /// Number of live records
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// True if the pool holds no records
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Drop every record
    pub fn clear(&mut self) {
        self.records.clear();
        self.index.clear();
    }
}

impl<'a, T: Component> IntoIterator for &'a ComponentPool<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl<'a, T: Component> IntoIterator for &'a mut ComponentPool<T> {
    type Item = &'a mut T;
    type IntoIter = std::slice::IterMut<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter_mut()
    }
}
