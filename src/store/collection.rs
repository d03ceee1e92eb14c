//! Generic keyed collection with stable newest-first enumeration.

use std::collections::HashMap;
use std::fmt::Display;
use std::hash::Hash;

/// A record kind managed by [`Collection`].
///
/// `derive` recomputes every derived field from its raw inputs; it is the
/// per-kind status classifier hook and runs on every write.
pub trait Entity: Clone {
    type Key: Eq + Hash + Clone + Display;

    /// Name used in logs and not-found errors.
    const KIND: &'static str;

    fn key(&self) -> Self::Key;

    fn derive(&mut self);
}

/// Outcome of [`Collection::upsert`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Inserted,
    Replaced,
}

/// Records in insertion order plus a key → slot index.
///
/// Enumeration walks the slots backwards, so the latest inserted key comes
/// first. Replacing an existing key keeps its slot.
#[derive(Debug, Clone)]
pub struct Collection<E: Entity> {
    slots: Vec<E>,
    index: HashMap<E::Key, usize>,
}

impl<E: Entity> Default for Collection<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: Entity> Collection<E> {
    pub fn new() -> Self {
        Self {
            slots: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Derive, then insert at the head or replace in place.
    pub fn upsert(&mut self, mut entity: E) -> (Upsert, &E) {
        entity.derive();
        let key = entity.key();
        let existing = self.index.get(&key).copied();
        match existing {
            Some(slot) => {
                self.slots[slot] = entity;
                (Upsert::Replaced, &self.slots[slot])
            }
            None => {
                let slot = self.slots.len();
                self.slots.push(entity);
                self.index.insert(key, slot);
                (Upsert::Inserted, &self.slots[slot])
            }
        }
    }

    /// Mutate an existing record in place and re-derive it.
    pub fn update<F>(&mut self, key: &E::Key, mutate: F) -> Option<&E>
    where
        F: FnOnce(&mut E),
    {
        let slot = *self.index.get(key)?;
        let entity = &mut self.slots[slot];
        mutate(entity);
        entity.derive();
        Some(&self.slots[slot])
    }

    pub fn get(&self, key: &E::Key) -> Option<&E> {
        self.index.get(key).map(|&slot| &self.slots[slot])
    }

    /// Newest-first.
    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &E> + ExactSizeIterator {
        self.slots.iter().rev()
    }

    pub fn to_vec(&self) -> Vec<E> {
        self.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Replace everything with `records`, given newest-first.
    pub fn replace_all(&mut self, records: Vec<E>) {
        self.slots.clear();
        self.index.clear();
        for record in records.into_iter().rev() {
            self.upsert(record);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Counter {
        name: &'static str,
        value: u32,
        doubled: u32,
    }

    impl Counter {
        fn new(name: &'static str, value: u32) -> Self {
            Self { name, value, doubled: 0 }
        }
    }

    impl Entity for Counter {
        type Key = &'static str;
        const KIND: &'static str = "counter";

        fn key(&self) -> &'static str {
            self.name
        }

        fn derive(&mut self) {
            self.doubled = self.value * 2;
        }
    }

    #[test]
    fn new_keys_enumerate_first() {
        let mut c = Collection::new();
        c.upsert(Counter::new("a", 1));
        c.upsert(Counter::new("b", 2));
        let names: Vec<_> = c.iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["b", "a"]);
    }

    #[test]
    fn replace_keeps_position() {
        let mut c = Collection::new();
        c.upsert(Counter::new("a", 1));
        c.upsert(Counter::new("b", 2));
        let (outcome, record) = c.upsert(Counter::new("a", 10));
        assert_eq!(outcome, Upsert::Replaced);
        assert_eq!(record.doubled, 20);
        let names: Vec<_> = c.iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(c.len(), 2);
    }

    #[test]
    fn update_rederives() {
        let mut c = Collection::new();
        c.upsert(Counter::new("a", 1));
        let updated = c.update(&"a", |e| e.value = 7).unwrap();
        assert_eq!(updated.doubled, 14);
        assert!(c.update(&"missing", |e| e.value = 1).is_none());
    }

    #[test]
    fn replace_all_preserves_given_order() {
        let mut c = Collection::new();
        c.upsert(Counter::new("stale", 1));
        c.replace_all(vec![Counter::new("x", 1), Counter::new("y", 2), Counter::new("z", 3)]);
        let names: Vec<_> = c.iter().map(|e| e.name).collect();
        assert_eq!(names, vec!["x", "y", "z"]);
        assert!(c.get(&"stale").is_none());
        assert!(c.iter().all(|e| e.doubled == e.value * 2));
    }
}
