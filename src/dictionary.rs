use std::fs;
use std::ops::ControlFlow;
use std::path::Path;

use crate::codec::encode;
use crate::{DoubleArray, Result, TrieError};

/// Tunables for a [`Dictionary`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DictionaryConfig {
    /// Upper bound on the values returned by
    /// [`Dictionary::common_prefix_search`].
    pub max_prefix_results: usize,
}

impl Default for DictionaryConfig {
    fn default() -> Self {
        Self {
            max_prefix_results: 100,
        }
    }
}

/// One successful step reported by [`Dictionary::traverse`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TraverseStep {
    /// The node reached.
    pub node: u32,
    /// Index of the byte just consumed.
    pub position: usize,
    /// Value of the key ending here, if any.
    pub value: Option<i32>,
}

/// A text-keyed dictionary backed by a [`DoubleArray`].
///
/// Accepts keys in any order, sorts and deduplicates them before building,
/// and takes care of file handling around the binary format.
#[derive(Clone, Debug)]
pub struct Dictionary {
    da: DoubleArray,
    num_keys: Option<usize>,
    config: DictionaryConfig,
}

impl Dictionary {
    /// Builds a dictionary; each key's value is its position in sorted order.
    pub fn build<S: AsRef<str>>(keys: &[S]) -> Result<Self> {
        Self::build_impl(keys, None)
    }

    /// Builds a dictionary with explicit values.
    ///
    /// `values[i]` belongs to the `i`-th key *after* sorting and removing
    /// duplicates, so `values.len()` must equal the number of distinct keys.
    pub fn build_with_values<S: AsRef<str>>(keys: &[S], values: &[i32]) -> Result<Self> {
        Self::build_impl(keys, Some(values))
    }

    fn build_impl<S: AsRef<str>>(keys: &[S], values: Option<&[i32]>) -> Result<Self> {
        if keys.is_empty() {
            return Err(TrieError::EmptyKeySet);
        }

        let mut sorted: Vec<&[u8]> = keys.iter().map(|k| encode(k.as_ref())).collect();
        sorted.sort_unstable();
        sorted.dedup();

        tracing::debug!(
            input = keys.len(),
            unique = sorted.len(),
            "dictionary keys prepared"
        );

        let da = match values {
            Some(values) => DoubleArray::build_with_values(&sorted, values)?,
            None => DoubleArray::build(&sorted)?,
        };
        Ok(Self {
            da,
            num_keys: Some(sorted.len()),
            config: DictionaryConfig::default(),
        })
    }

    /// Loads a dictionary saved with [`Dictionary::save`].
    ///
    /// # Errors
    /// Same as [`DoubleArray::open`]: a missing file is
    /// [`TrieError::FileNotFound`].
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::from(DoubleArray::open(path)?))
    }

    /// Saves the dictionary, creating missing parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|source| TrieError::File {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        self.da.save(path)
    }

    /// Replaces the configuration.
    pub fn with_config(mut self, config: DictionaryConfig) -> Self {
        self.config = config;
        self
    }

    /// Returns the configuration.
    pub fn config(&self) -> &DictionaryConfig {
        &self.config
    }

    /// Returns the underlying double-array.
    pub fn double_array(&self) -> &DoubleArray {
        &self.da
    }

    /// Returns the value stored for `key`.
    pub fn exact_match(&self, key: &str) -> Option<i32> {
        self.da.exact_match(encode(key))
    }

    /// Returns the values of all keys that are prefixes of `key`, shortest
    /// first, capped at `max_prefix_results`.
    pub fn common_prefix_search(&self, key: &str) -> Vec<i32> {
        self.da
            .common_prefix_search(encode(key), self.config.max_prefix_results)
    }

    /// Walks `key` byte by byte from the root, calling `f` after every
    /// successful step.
    ///
    /// Stops at the first missing edge or when `f` breaks. Returns the number
    /// of bytes consumed.
    ///
    /// A failed step is not reported to `f`: bindings that expect a final
    /// callback with a `-2` status for the missing edge must synthesize it
    /// from a return value shorter than `key.len()`.
    pub fn traverse<F>(&self, key: &str, mut f: F) -> usize
    where
        F: FnMut(TraverseStep) -> ControlFlow<()>,
    {
        let mut node = 0;
        for (position, &byte) in encode(key).iter().enumerate() {
            let Some(t) = self.da.traverse_step(node, byte) else {
                return position;
            };
            node = t.node;
            let step = TraverseStep {
                node,
                position,
                value: t.value,
            };
            if f(step).is_break() {
                return position + 1;
            }
        }
        key.len()
    }

    /// Returns the number of slots in the underlying array.
    ///
    /// This is not the key count; see [`Dictionary::num_keys`].
    pub fn size(&self) -> usize {
        self.da.size()
    }

    /// Returns the number of distinct keys, when known. Dictionaries loaded
    /// from a file do not record it.
    pub fn num_keys(&self) -> Option<usize> {
        self.num_keys
    }
}

impl From<DoubleArray> for Dictionary {
    fn from(da: DoubleArray) -> Self {
        Self {
            da,
            num_keys: None,
            config: DictionaryConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_sorts_and_dedups() {
        let dict = Dictionary::build(&["banana", "apple", "cherry", "apple"]).unwrap();
        assert_eq!(dict.num_keys(), Some(3));
        assert_eq!(dict.exact_match("apple"), Some(0));
        assert_eq!(dict.exact_match("banana"), Some(1));
        assert_eq!(dict.exact_match("cherry"), Some(2));
        assert_eq!(dict.exact_match("durian"), None);
    }

    #[test]
    fn values_follow_sorted_order() {
        let dict = Dictionary::build_with_values(&["b", "a", "c"], &[10, 20, 30]).unwrap();
        assert_eq!(dict.exact_match("a"), Some(10));
        assert_eq!(dict.exact_match("b"), Some(20));
        assert_eq!(dict.exact_match("c"), Some(30));
    }

    #[test]
    fn values_counted_after_dedup() {
        let keys = ["x", "y", "x"];
        assert!(Dictionary::build_with_values(&keys, &[1, 2]).is_ok());
        assert!(matches!(
            Dictionary::build_with_values(&keys, &[1, 2, 3]),
            Err(TrieError::ValueCountMismatch { keys: 2, values: 3 })
        ));
    }

    #[test]
    fn empty_input_rejected() {
        let keys: [&str; 0] = [];
        assert!(matches!(
            Dictionary::build(&keys),
            Err(TrieError::EmptyKeySet)
        ));
    }

    #[test]
    fn common_prefix_search_is_capped() {
        let keys = ["a", "ab", "abc", "abcd"];
        let dict = Dictionary::build(&keys).unwrap();
        assert_eq!(dict.common_prefix_search("abcde"), vec![0, 1, 2, 3]);

        let dict = dict.with_config(DictionaryConfig {
            max_prefix_results: 2,
        });
        assert_eq!(dict.common_prefix_search("abcde"), vec![0, 1]);
        assert_eq!(dict.config().max_prefix_results, 2);
    }

    #[test]
    fn traverse_reports_each_step() {
        let dict = Dictionary::build_with_values(&["a", "abc"], &[1, 3]).unwrap();
        let mut steps = Vec::new();
        let consumed = dict.traverse("abcd", |s| {
            steps.push(s);
            ControlFlow::Continue(())
        });
        assert_eq!(consumed, 3);
        let values: Vec<Option<i32>> = steps.iter().map(|s| s.value).collect();
        assert_eq!(values, vec![Some(1), None, Some(3)]);
        let positions: Vec<usize> = steps.iter().map(|s| s.position).collect();
        assert_eq!(positions, vec![0, 1, 2]);
        assert_eq!(Some(steps[2].node), dict.double_array().traverse(b"abc"));
    }

    #[test]
    fn traverse_failed_step_is_silent() {
        let dict = Dictionary::build(&["ab"]).unwrap();
        let mut calls = 0;
        let consumed = dict.traverse("axb", |_| {
            calls += 1;
            ControlFlow::Continue(())
        });
        assert_eq!(calls, 1);
        assert_eq!(consumed, 1);
    }

    #[test]
    fn traverse_stops_on_break() {
        let dict = Dictionary::build(&["abc"]).unwrap();
        let mut calls = 0;
        let consumed = dict.traverse("abc", |_| {
            calls += 1;
            if calls == 2 {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });
        assert_eq!(calls, 2);
        assert_eq!(consumed, 2);
    }

    #[test]
    fn size_is_slot_count() {
        let dict = Dictionary::build(&["x"]).unwrap();
        assert_eq!(dict.size(), dict.double_array().size());
        assert_eq!(dict.num_keys(), Some(1));
    }

    #[test]
    fn save_creates_directories_and_reloads() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested/dirs/words.dart");
        let dict = Dictionary::build(&["東京", "東京都", "京都"]).unwrap();
        dict.save(&path).unwrap();

        let loaded = Dictionary::open(&path).unwrap();
        assert_eq!(loaded.num_keys(), None);
        for word in ["東京", "東京都", "京都"] {
            assert_eq!(loaded.exact_match(word), dict.exact_match(word));
        }
        assert_eq!(loaded.exact_match("東"), None);
    }

    #[test]
    fn open_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.dart");
        match Dictionary::open(&path) {
            Err(TrieError::FileNotFound { path: p }) => assert_eq!(p, path),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn open_rejects_garbage() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("garbage.dart");
        fs::write(&path, b"not a dictionary").unwrap();
        let err = Dictionary::open(&path).unwrap_err();
        assert!(err.is_format_error());
    }
}
