//! Entity reconciliation.
//!
//! Local lists never patch fields of an entity. After every server round trip
//! the returned copy replaces the local entry with the same id, so the client
//! cannot drift from the backend.

mod directory;
mod notifications;

pub use directory::*;
pub use notifications::*;

use std::collections::HashSet;

/// Anything that lives in an id-keyed list.
pub trait Entity: Clone {
    fn id(&self) -> &str;
}

/// What [`EntityList::upsert`] did with the entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Upsert {
    Replaced,
    Inserted,
}

/// Ordered list holding at most one entry per id.
#[derive(Debug, Clone)]
pub struct EntityList<T: Entity> {
    items: Vec<T>,
}

impl<T: Entity> Default for EntityList<T> {
    fn default() -> Self {
        Self { items: Vec::new() }
    }
}

impl<T: Entity> EntityList<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from a server list. Later duplicates of an id are dropped.
    pub fn from_vec(items: Vec<T>) -> Self {
        let mut seen = HashSet::new();
        let items = items
            .into_iter()
            .filter(|item| seen.insert(item.id().to_string()))
            .collect();
        Self { items }
    }

    /// Adopt a fresh server list wholesale.
    pub fn replace_all(&mut self, items: Vec<T>) {
        *self = Self::from_vec(items);
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }

    /// Replace the entry with the same id in place, or prepend it.
    pub fn upsert(&mut self, entity: T) -> Upsert {
        match self.position(entity.id()) {
            Some(index) => {
                self.items[index] = entity;
                Upsert::Replaced
            }
            None => {
                self.items.insert(0, entity);
                Upsert::Inserted
            }
        }
    }

    /// Replace the entry with the same id in place, or append it.
    pub fn upsert_back(&mut self, entity: T) -> Upsert {
        match self.position(entity.id()) {
            Some(index) => {
                self.items[index] = entity;
                Upsert::Replaced
            }
            None => {
                self.items.push(entity);
                Upsert::Inserted
            }
        }
    }

    /// Replace in place, or insert keeping the list sorted by `key`.
    ///
    /// New entries go after existing ones with an equal key, so arrival order
    /// breaks ties.
    pub fn upsert_sorted_by_key<K, F>(&mut self, entity: T, key: F) -> Upsert
    where
        K: Ord,
        F: Fn(&T) -> K,
    {
        if let Some(index) = self.position(entity.id()) {
            self.items[index] = entity;
            return Upsert::Replaced;
        }
        let new_key = key(&entity);
        let index = self.items.partition_point(|item| key(item) <= new_key);
        self.items.insert(index, entity);
        Upsert::Inserted
    }

    /// Replace the entry only if it is already present.
    pub fn replace_existing(&mut self, entity: T) -> bool {
        match self.position(entity.id()) {
            Some(index) => {
                self.items[index] = entity;
                true
            }
            None => false,
        }
    }

    pub fn remove(&mut self, id: &str) -> Option<T> {
        self.position(id).map(|index| self.items.remove(index))
    }

    pub fn get(&self, id: &str) -> Option<&T> {
        self.items.iter().find(|item| item.id() == id)
    }

    pub(crate) fn get_mut(&mut self, id: &str) -> Option<&mut T> {
        self.items.iter_mut().find(|item| item.id() == id)
    }

    pub(crate) fn iter_mut(&mut self) -> std::slice::IterMut<'_, T> {
        self.items.iter_mut()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.position(id).is_some()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<'a, T: Entity> IntoIterator for &'a EntityList<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
