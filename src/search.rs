use crate::view::TrieView;
use crate::DoubleArray;

/// Result of a common prefix search match.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PrefixMatch {
    /// Length of the matched prefix (in bytes).
    pub len: usize,
    /// The value associated with the matched key.
    pub value: i32,
}

/// Result of a single traversal step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Transition {
    /// The node reached.
    pub node: u32,
    /// The value of the key ending at `node`, if there is one.
    pub value: Option<i32>,
}

impl DoubleArray {
    #[inline]
    fn view(&self) -> TrieView<'_> {
        TrieView { nodes: &self.nodes }
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
    pub fn common_prefixes<'a>(
        &'a self,
        query: &'a [u8],
    ) -> impl Iterator<Item = PrefixMatch> + 'a {
        self.view().common_prefixes(query)
    }

    /// Follows one byte from `node`. The root is node 0.
    ///
    /// Returns `None` when the edge does not exist; traversal must then
    /// restart from the root.
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
}
