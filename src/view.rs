use crate::codec::code;
use crate::{Node, PrefixMatch, Transition};

/// A borrowed view of the slots of a double-array trie. All search methods
/// are implemented here and shared between `DoubleArray` and `DoubleArrayRef`.
///
/// Every computed index is bounds-checked, so searching loaded data never
/// panics even if its `base`/`check` pairs are inconsistent.
#[derive(Clone, Copy)]
pub(crate) struct TrieView<'a> {
    pub(crate) nodes: &'a [Node],
}

impl<'a> TrieView<'a> {
    /// Follows the edge labelled `byte` out of `node_idx`.
    ///
    /// Slot 0 is the root and never a child, which rules out the root's
    /// self-owning `check` being taken for an edge.
    #[inline]
    pub(crate) fn child(&self, node_idx: u32, byte: u8) -> Option<u32> {
        let node = self.nodes.get(node_idx as usize)?;
        let next_idx = node.base() ^ code(byte);
        if next_idx == 0 {
            return None;
        }
        let next = self.nodes.get(next_idx as usize)?;
        if next.is_child_of(node_idx) {
            Some(next_idx)
        } else {
            None
        }
    }

    /// Traverses the trie from the root following the given key bytes.
    /// Returns the node index after consuming all bytes, or None if traversal fails.
    #[inline]
    pub(crate) fn traverse(&self, key: &[u8]) -> Option<u32> {
        if self.nodes.is_empty() {
            return None;
        }
        key.iter()
            .try_fold(0u32, |node_idx, &byte| self.child(node_idx, byte))
    }

    /// Returns the value of the key ending at `node_idx`, if any.
    #[inline]
    pub(crate) fn value_at(&self, node_idx: u32) -> Option<i32> {
        let node = self.nodes.get(node_idx as usize)?;
        // The terminal child sits at base ^ 0.
        let terminal_idx = node.base();
        if terminal_idx == 0 {
            return None;
        }
        let terminal = self.nodes.get(terminal_idx as usize)?;
        if terminal.is_child_of(node_idx) {
            terminal.value()
        } else {
            None
        }
    }

    /// Exact match search. Returns the value if the key exists.
    #[inline]
    pub(crate) fn exact_match(&self, key: &[u8]) -> Option<i32> {
        let node_idx = self.traverse(key)?;
        self.value_at(node_idx)
    }

    /// Common prefix search. Returns an iterator over all prefixes of `query`
    /// that exist as keys in the trie, shortest first.
    pub(crate) fn common_prefixes(self, query: &'a [u8]) -> CommonPrefixIter<'a> {
        CommonPrefixIter {
            view: self,
            query,
            pos: 0,
            node_idx: 0,
            done: self.nodes.is_empty(),
        }
    }

    /// Common prefix search collecting at most `max_results` values.
    pub(crate) fn common_prefix_search(self, query: &'a [u8], max_results: usize) -> Vec<i32> {
        self.common_prefixes(query)
            .take(max_results)
            .map(|m| m.value)
            .collect()
    }

    /// Single transition from `node_idx` on `byte`.
    #[inline]
    pub(crate) fn traverse_step(&self, node_idx: u32, byte: u8) -> Option<Transition> {
        let next = self.child(node_idx, byte)?;
        Some(Transition {
            node: next,
            value: self.value_at(next),
        })
    }
}

/// Iterator returned by common prefix search.
pub(crate) struct CommonPrefixIter<'a> {
    view: TrieView<'a>,
    query: &'a [u8],
    pos: usize,
    node_idx: u32,
    done: bool,
}

impl CommonPrefixIter<'_> {
    #[inline]
    fn check_terminal(&self) -> Option<PrefixMatch> {
        self.view.value_at(self.node_idx).map(|value| PrefixMatch {
            len: self.pos,
            value,
        })
    }

    #[inline]
    fn try_advance(&mut self) -> bool {
        let Some(&byte) = self.query.get(self.pos) else {
            return false;
        };
        match self.view.child(self.node_idx, byte) {
            Some(next_idx) => {
                self.node_idx = next_idx;
                self.pos += 1;
                true
            }
            None => false,
        }
    }
}

impl Iterator for CommonPrefixIter<'_> {
    type Item = PrefixMatch;

    fn next(&mut self) -> Option<PrefixMatch> {
        while !self.done {
            let result = self.check_terminal();
            if !self.try_advance() {
                self.done = true;
            }
            if result.is_some() {
                return result;
            }
        }
        None
    }
}
