//! Residency cache of decoded collections.
//!
//! The cache is derived state: dropping any or all of it never loses information, as long as
//! no entry is [`Residency::Dirty`]. Dirty entries have been handed out mutably and must be
//! committed back into the payload before they can be discarded.

use std::collections::{HashMap, VecDeque};

use strum::Display;
use tracing::warn;

use crate::codec::Collection;

/// Cache state of a named collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Residency {
    /// Only present as payload bytes (or not present at all)
    Absent,
    /// Decoded and consistent with the payload bytes
    Resident,
    /// Decoded and possibly modified since it was last written to the payload
    Dirty,
}

#[derive(Debug)]
struct Slot {
    collection: Box<dyn Collection>,
    dirty: bool,
}

/// Name → decoded collection map, with optional bounded residency.
#[derive(Debug, Default)]
pub(crate) struct CollectionCache {
    slots: HashMap<String, Slot>,
    /// Names in insertion order, oldest first
    order: VecDeque<String>,
    max_resident: usize,
}

impl CollectionCache {
    pub(crate) fn new(max_resident: usize) -> Self {
        CollectionCache {
            slots: HashMap::new(),
            order: VecDeque::new(),
            max_resident,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn contains(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    pub(crate) fn residency(&self, name: &str) -> Residency {
        match self.slots.get(name) {
            Some(slot) if slot.dirty => Residency::Dirty,
            Some(_) => Residency::Resident,
            None => Residency::Absent,
        }
    }

    pub(crate) fn get(&self, name: &str) -> Option<&dyn Collection> {
        self.slots.get(name).map(|slot| slot.collection.as_ref())
    }

    /// Returns the collection for modification and marks it dirty
    pub(crate) fn get_mut(&mut self, name: &str) -> Option<&mut dyn Collection> {
        let slot = self.slots.get_mut(name)?;
        slot.dirty = true;

        let collection: &mut dyn Collection = slot.collection.as_mut();
        Some(collection)
    }

    /// Stores a clean collection under `name`, replacing any previous one
    pub(crate) fn insert(&mut self, name: &str, collection: Box<dyn Collection>) {
        if self.slots.contains_key(name) {
            self.order.retain(|existing| existing != name);
        } else {
            self.evict_for(name);
        }

        self.slots.insert(
            name.to_string(),
            Slot {
                collection,
                dirty: false,
            },
        );
        self.order.push_back(name.to_string());
    }

    pub(crate) fn remove(&mut self, name: &str) -> Option<Box<dyn Collection>> {
        let slot = self.slots.remove(name)?;
        self.order.retain(|existing| existing != name);
        Some(slot.collection)
    }

    /// Drops every entry, returning how many were resident
    pub(crate) fn clear(&mut self) -> usize {
        let count = self.slots.len();
        self.slots.clear();
        self.order.clear();
        count
    }

    pub(crate) fn dirty_names(&self) -> Vec<String> {
        self.order
            .iter()
            .filter(|name| self.slots.get(*name).is_some_and(|slot| slot.dirty))
            .cloned()
            .collect()
    }

    pub(crate) fn mark_clean(&mut self, name: &str) {
        if let Some(slot) = self.slots.get_mut(name) {
            slot.dirty = false;
        }
    }

    /// Makes room for one more entry, evicting the oldest clean entries first
    fn evict_for(&mut self, incoming: &str) {
        if self.max_resident == 0 {
            return;
        }

        while self.slots.len() >= self.max_resident {
            let victim = self
                .order
                .iter()
                .find(|name| self.slots.get(*name).is_some_and(|slot| !slot.dirty))
                .cloned();

            let Some(victim) = victim else {
                // Only dirty entries left, those are never dropped silently
                warn!(
                    collection = incoming,
                    resident = self.slots.len(),
                    max_resident = self.max_resident,
                    "residency limit exceeded by dirty collections"
                );
                return;
            };

            warn!(
                collection = %victim,
                incoming,
                max_resident = self.max_resident,
                "evicting resident collection"
            );
            self.remove(&victim);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Records;

    fn records(values: &[u32]) -> Box<dyn Collection> {
        Box::new(Records::from(values.to_vec()))
    }

    #[test]
    fn residency_states() {
        let mut cache = CollectionCache::new(0);
        assert_eq!(cache.residency("a"), Residency::Absent);

        cache.insert("a", records(&[1]));
        assert_eq!(cache.residency("a"), Residency::Resident);

        cache.get_mut("a").unwrap();
        assert_eq!(cache.residency("a"), Residency::Dirty);
        assert_eq!(cache.dirty_names(), vec!["a"]);

        cache.mark_clean("a");
        assert_eq!(cache.residency("a"), Residency::Resident);
        assert!(cache.dirty_names().is_empty());

        assert!(cache.remove("a").is_some());
        assert_eq!(cache.residency("a"), Residency::Absent);
    }

    #[test]
    fn insert_replaces() {
        let mut cache = CollectionCache::new(0);
        cache.insert("a", records(&[1]));
        cache.get_mut("a").unwrap();
        cache.insert("a", records(&[1, 2]));

        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("a").unwrap().len(), 2);
        assert_eq!(cache.residency("a"), Residency::Resident);
    }

    #[test]
    fn bounded_evicts_oldest_clean() {
        let mut cache = CollectionCache::new(2);
        cache.insert("a", records(&[1]));
        cache.insert("b", records(&[2]));
        cache.get_mut("a").unwrap();

        cache.insert("c", records(&[3]));

        assert_eq!(cache.len(), 2);
        assert!(cache.contains("a"));
        assert!(!cache.contains("b"));
        assert!(cache.contains("c"));
    }

    #[test]
    fn bounded_keeps_dirty() {
        let mut cache = CollectionCache::new(1);
        cache.insert("a", records(&[1]));
        cache.get_mut("a").unwrap();

        cache.insert("b", records(&[2]));

        assert_eq!(cache.len(), 2);
        assert_eq!(cache.residency("a"), Residency::Dirty);
    }

    #[test]
    fn clear() {
        let mut cache = CollectionCache::new(0);
        cache.insert("a", records(&[1]));
        cache.insert("b", records(&[2]));

        assert_eq!(cache.clear(), 2);
        assert_eq!(cache.len(), 0);
        assert_eq!(Residency::Dirty.to_string(), "dirty");
    }
}
