use std::mem;

use crate::serial::{parse_header, HEADER_SIZE};
use crate::view::TrieView;
use crate::{DoubleArray, Node, PrefixMatch, Result, Transition, TrieError};

/// A zero-copy reference to a serialized double-array trie.
///
/// Unlike [`DoubleArray`], this type borrows its slots directly from an
/// external byte buffer (e.g. an mmap region), avoiding a heap copy.
/// Only available on little-endian targets, where the in-memory layout of
/// [`Node`] matches the serialized one.
pub struct DoubleArrayRef<'a> {
    nodes: &'a [Node],
}

impl<'a> DoubleArrayRef<'a> {
    /// Creates a zero-copy `DoubleArrayRef` from a byte slice.
    ///
    /// The byte slice must hold exactly one serialized trie and be aligned
    /// to at least 4 bytes.
    ///
    /// # Errors
    ///
    /// Returns the same format errors as [`DoubleArray::from_bytes`], and
    /// [`TrieError::MisalignedData`] if the buffer is not properly aligned.
    pub fn from_bytes_ref(bytes: &'a [u8]) -> Result<Self> {
        let slots = parse_header(bytes)?;

        let nodes_ptr = bytes[HEADER_SIZE..].as_ptr();
        if !(nodes_ptr as usize).is_multiple_of(mem::align_of::<Node>()) {
            return Err(TrieError::MisalignedData);
        }

        // SAFETY:
        // - `Node` is `#[repr(C)]` with two `i32` fields, size 8, align 4, no padding
        // - parse_header verified the body holds exactly `slots` nodes, and
        //   alignment is checked above
        // - every bit pattern is a valid `Node`
        // - the lifetime `'a` ties the slice to the input buffer
        // - the module is only compiled on little-endian targets, where the
        //   in-memory layout matches the serialized LE format
        let nodes = unsafe { std::slice::from_raw_parts(nodes_ptr as *const Node, slots) };

        Ok(Self { nodes })
    }

    /// Returns a `TrieView` borrowing this ref's data.
    #[inline]
    fn view(&self) -> TrieView<'_> {
        TrieView { nodes: self.nodes }
    }

    /// Returns the number of slots in the array.
    pub fn size(&self) -> usize {
        self.nodes.len()
    }

    /// Exact match search. Returns the value if the key exists.
    #[inline]
    pub fn exact_match(&self, key: &[u8]) -> Option<i32> {
        self.view().exact_match(key)
    }

    /// Returns the values of all keys that are prefixes of `query`, shortest
    /// first, stopping after `max_results`.
    pub fn common_prefix_search(&self, query: &[u8], max_results: usize) -> Vec<i32> {
        self.view().common_prefix_search(query, max_results)
    }

    /// Common prefix search. Returns an iterator over all prefixes of `query`
    /// that exist as keys in the trie.
    pub fn common_prefixes<'b>(
        &'b self,
        query: &'b [u8],
    ) -> impl Iterator<Item = PrefixMatch> + 'b {
        self.view().common_prefixes(query)
    }

    /// Follows one byte from `node`. The root is node 0.
    #[inline]
    pub fn traverse_step(&self, node: u32, byte: u8) -> Option<Transition> {
        self.view().traverse_step(node, byte)
    }

    /// Walks `key` from the root and returns the node reached.
    #[inline]
    pub fn traverse(&self, key: &[u8]) -> Option<u32> {
        self.view().traverse(key)
    }

    /// Returns the value of the key ending at `node`.
    #[inline]
    pub fn value_at(&self, node: u32) -> Option<i32> {
        self.view().value_at(node)
    }

    /// Converts this zero-copy reference to an owned [`DoubleArray`].
    pub fn to_owned(&self) -> DoubleArray {
        DoubleArray::new(self.nodes.to_vec())
    }
}
