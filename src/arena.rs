//! Generational handle table for dictionaries.
//!
//! Host bindings that can only pass integers around refer to dictionaries
//! through a [`Handle`]. Removing a dictionary bumps its slot's generation,
//! so handles to a freed slot stop resolving even after the slot is reused.

use crate::{Dictionary, Result, TrieError};

/// Opaque reference to a dictionary stored in a [`DictionaryArena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Handle {
    index: u32,
    generation: u32,
}

impl Handle {
    /// Packs the handle into a single integer for foreign callers.
    pub fn to_bits(self) -> u64 {
        (u64::from(self.generation) << 32) | u64::from(self.index)
    }

    /// Unpacks a handle produced by [`Handle::to_bits`].
    pub fn from_bits(bits: u64) -> Self {
        Self {
            index: bits as u32,
            generation: (bits >> 32) as u32,
        }
    }
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    dict: Option<Dictionary>,
}

/// Owns dictionaries and hands out [`Handle`]s to them.
///
/// Vacant slots are reused lowest index first.
#[derive(Debug, Default)]
pub struct DictionaryArena {
    slots: Vec<Slot>,
    len: usize,
}

impl DictionaryArena {
    /// Creates an empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stores `dict` and returns its handle.
    pub fn insert(&mut self, dict: Dictionary) -> Handle {
        self.len += 1;
        if let Some(index) = self.slots.iter().position(|s| s.dict.is_none()) {
            let slot = &mut self.slots[index];
            slot.dict = Some(dict);
            return Handle {
                index: index as u32,
                generation: slot.generation,
            };
        }
        self.slots.push(Slot {
            generation: 0,
            dict: Some(dict),
        });
        Handle {
            index: (self.slots.len() - 1) as u32,
            generation: 0,
        }
    }

    /// Returns the dictionary behind `handle`, if it is still live.
    pub fn get(&self, handle: Handle) -> Option<&Dictionary> {
        self.slots
            .get(handle.index as usize)
            .filter(|s| s.generation == handle.generation)
            .and_then(|s| s.dict.as_ref())
    }

    /// Mutable access to the dictionary behind `handle`.
    pub fn get_mut(&mut self, handle: Handle) -> Option<&mut Dictionary> {
        self.slots
            .get_mut(handle.index as usize)
            .filter(|s| s.generation == handle.generation)
            .and_then(|s| s.dict.as_mut())
    }

    /// Like [`DictionaryArena::get`], but reports a stale handle as an error.
    pub fn resolve(&self, handle: Handle) -> Result<&Dictionary> {
        self.get(handle).ok_or(TrieError::InvalidHandle)
    }

    /// Removes and returns the dictionary behind `handle`.
    pub fn remove(&mut self, handle: Handle) -> Option<Dictionary> {
        let slot = self
            .slots
            .get_mut(handle.index as usize)
            .filter(|s| s.generation == handle.generation)?;
        let dict = slot.dict.take()?;
        slot.generation = slot.generation.wrapping_add(1);
        self.len -= 1;
        tracing::trace!(index = handle.index, "dictionary released");
        Some(dict)
    }

    /// Number of live dictionaries.
    pub fn len(&self) -> usize {
        self.len
    }

    /// Returns true if no dictionary is stored.
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dict(words: &[&str]) -> Dictionary {
        Dictionary::build(words).unwrap()
    }

    #[test]
    fn insert_and_get() {
        let mut arena = DictionaryArena::new();
        let a = arena.insert(dict(&["a"]));
        let b = arena.insert(dict(&["b"]));
        assert_ne!(a, b);
        assert_eq!(arena.len(), 2);
        assert_eq!(arena.get(a).unwrap().exact_match("a"), Some(0));
        assert_eq!(arena.get(b).unwrap().exact_match("a"), None);
    }

    #[test]
    fn removed_handle_is_stale() {
        let mut arena = DictionaryArena::new();
        let a = arena.insert(dict(&["a"]));
        assert!(arena.remove(a).is_some());
        assert!(arena.get(a).is_none());
        assert!(arena.remove(a).is_none());
        assert!(matches!(arena.resolve(a), Err(TrieError::InvalidHandle)));
        assert!(arena.is_empty());
    }

    #[test]
    fn slots_are_reused_with_new_generation() {
        let mut arena = DictionaryArena::new();
        let a = arena.insert(dict(&["a"]));
        let _b = arena.insert(dict(&["b"]));
        arena.remove(a);
        let c = arena.insert(dict(&["c"]));
        assert_eq!(c.index, a.index);
        assert_ne!(c.generation, a.generation);
        assert!(arena.get(a).is_none());
        assert_eq!(arena.get(c).unwrap().exact_match("c"), Some(0));
    }

    #[test]
    fn get_mut_reconfigures() {
        let mut arena = DictionaryArena::new();
        let h = arena.insert(dict(&["a", "ab", "abc"]));
        let d = arena.get_mut(h).unwrap();
        *d = d.clone().with_config(crate::DictionaryConfig {
            max_prefix_results: 1,
        });
        assert_eq!(arena.resolve(h).unwrap().common_prefix_search("abc"), vec![0]);
    }

    #[test]
    fn bits_round_trip() {
        let mut arena = DictionaryArena::new();
        let a = arena.insert(dict(&["a"]));
        arena.remove(a);
        let b = arena.insert(dict(&["b"]));
        assert_eq!(Handle::from_bits(b.to_bits()), b);
        assert_eq!(b.to_bits(), 1 << 32);
    }

    #[test]
    fn unknown_handle() {
        let arena = DictionaryArena::new();
        assert!(arena.get(Handle::from_bits(42)).is_none());
    }
}
