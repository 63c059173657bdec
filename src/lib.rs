//! A byte-wise Double-Array Trie.
//!
//! This crate provides [`DoubleArray`], a compact trie stored as two parallel
//! integer arrays (`base`, `check`). It supports exact match, common prefix
//! search and single-step traversal in time proportional to the key length,
//! and persists to a fixed little-endian binary format.
//!
//! [`Dictionary`] layers text keys, sorting, file handling and word
//! replacement on top; [`DictionaryArena`] hands out generational handles to
//! dictionaries for host bindings that cannot hold Rust values directly.
//!
//! # Quick start
//!
//! ```
//! use darts_trie::DoubleArray;
//!
//! let keys: Vec<&[u8]> = vec![b"a", b"ab", b"abc", b"b", b"bc"];
//! let da = DoubleArray::build(&keys).unwrap();
//! assert_eq!(da.exact_match(b"abc"), Some(2));
//! assert_eq!(da.common_prefix_search(b"abcd", 10), vec![0, 1, 2]);
//! ```

#![warn(missing_docs)]

mod arena;
mod build;
pub mod codec;
#[cfg(target_endian = "little")]
mod da_ref;
mod dictionary;
mod node;
mod replace;
mod search;
mod serial;
mod store;
mod view;

#[cfg(test)]
mod proptests;

use std::io;
use std::path::PathBuf;

pub use arena::{DictionaryArena, Handle};
#[cfg(target_endian = "little")]
pub use da_ref::DoubleArrayRef;
pub use dictionary::{Dictionary, DictionaryConfig, TraverseStep};
pub use node::Node;
pub use replace::Replacer;
pub use search::{PrefixMatch, Transition};

/// Result type alias using [`TrieError`].
pub type Result<T> = std::result::Result<T, TrieError>;

/// Errors that can occur during trie operations.
#[derive(Debug, thiserror::Error)]
pub enum TrieError {
    /// No keys were given to the builder.
    #[error("empty key set")]
    EmptyKeySet,

    /// Keys and values differ in length.
    #[error("{keys} keys but {values} values")]
    ValueCountMismatch {
        /// Number of keys.
        keys: usize,
        /// Number of values.
        values: usize,
    },

    /// A value cannot be stored in a terminal slot.
    #[error("negative value {value} at index {index}")]
    NegativeValue {
        /// Position of the offending value.
        index: usize,
        /// The value.
        value: i32,
    },

    /// Keys are not strictly ascending.
    #[error("key at index {index} is not greater than its predecessor")]
    UnsortedKeys {
        /// Position of the first out-of-order key.
        index: usize,
    },

    /// The array would outgrow 31-bit slot indices.
    #[error("double-array overflow at {slots} slots")]
    Overflow {
        /// Slot count when growth failed.
        slots: usize,
    },

    /// A dictionary file does not exist.
    #[error("dictionary file not found: {}", path.display())]
    FileNotFound {
        /// The missing path.
        path: PathBuf,
    },

    /// Reading or writing a file failed.
    #[error("I/O error on {}: {source}", path.display())]
    File {
        /// The file being accessed.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: io::Error,
    },

    /// Reading or writing a stream failed.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The binary data has an invalid magic number.
    #[error("invalid magic number")]
    InvalidMagic,

    /// The binary data has an unsupported version.
    #[error("unsupported version: {0}")]
    UnsupportedVersion(u8),

    /// The binary data is shorter than its header declares.
    #[error("truncated data: expected {expected} bytes, got {actual}")]
    TruncatedData {
        /// Length implied by the header.
        expected: usize,
        /// Length available.
        actual: usize,
    },

    /// The binary data is longer than its header declares.
    #[error("trailing data: expected {expected} bytes, got {actual}")]
    TrailingData {
        /// Length implied by the header.
        expected: usize,
        /// Length available.
        actual: usize,
    },

    /// The binary data declares zero slots, so it has no root.
    #[error("double-array has no slots")]
    EmptyArray,

    /// The buffer is not aligned for zero-copy access.
    #[error("misaligned data")]
    MisalignedData,

    /// A handle does not refer to a live dictionary.
    #[error("invalid dictionary handle")]
    InvalidHandle,
}

impl TrieError {
    /// Returns true if the error describes malformed serialized data.
    pub fn is_format_error(&self) -> bool {
        matches!(
            self,
            TrieError::InvalidMagic
                | TrieError::UnsupportedVersion(_)
                | TrieError::TruncatedData { .. }
                | TrieError::TrailingData { .. }
                | TrieError::EmptyArray
                | TrieError::MisalignedData
        )
    }
}

/// A double-array trie supporting exact match, common prefix search and
/// single-step traversal.
///
/// Immutable once built or loaded; share it freely across threads for
/// concurrent lookups.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DoubleArray {
    pub(crate) nodes: Vec<Node>,
}

impl DoubleArray {
    /// Creates a DoubleArray from finished slots.
    pub(crate) fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Returns the number of slots in the array.
    ///
    /// This is the array size, not the number of stored keys: free slots
    /// left between placed nodes are counted too.
    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    /// Returns the raw slots.
    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }
}
