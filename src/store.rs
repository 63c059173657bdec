use crate::codec::ALPHABET_SIZE;
use crate::node::{Node, MAX_INDEX};
use crate::{Result, TrieError};

/// Slots are allocated in blocks. XOR with any code stays inside the block
/// that contains the offset, so a block must cover every code.
pub(crate) const BLOCK_SIZE: u32 = ALPHABET_SIZE.next_power_of_two();

/// Number of trailing blocks whose free slots stay on the free list.
/// Older blocks are fixed: their remaining free slots are never reused.
pub(crate) const NUM_EXTRA_BLOCKS: u32 = 16;

/// Free-list links for one slot. Only meaningful while the slot is free and
/// its block is still active.
#[derive(Clone, Copy, Debug, Default)]
struct Extra {
    prev: u32,
    next: u32,
}

/// The growable double-array used during construction.
///
/// Holds the `base`/`check` slots plus a circular doubly-linked list threading
/// every free slot of the active blocks. The head of that list is the search
/// cursor for base offsets; it only moves forward as blocks are fixed.
pub(crate) struct Store {
    nodes: Vec<Node>,
    extras: Vec<Extra>,
    free_head: Option<u32>,
    first_active_block: u32,
}

/// Returns the end of the block starting at `start`, or `Overflow` if its
/// last slot would not be addressable by an `i32`.
fn block_end(start: u32) -> Result<u32> {
    start
        .checked_add(BLOCK_SIZE)
        .filter(|&end| end - 1 <= MAX_INDEX)
        .ok_or(TrieError::Overflow {
            slots: start as usize,
        })
}

impl Store {
    /// Creates a store holding one block with the root claimed at slot 0.
    pub(crate) fn new() -> Result<Self> {
        let mut store = Self {
            nodes: Vec::new(),
            extras: Vec::new(),
            free_head: None,
            first_active_block: 0,
        };
        store.ensure_capacity(BLOCK_SIZE as usize)?;
        store.claim(0, 0);
        Ok(store)
    }

    /// Grows the store by whole blocks until it holds at least `n` slots.
    pub(crate) fn ensure_capacity(&mut self, n: usize) -> Result<()> {
        while self.nodes.len() < n {
            self.push_block()?;
        }
        Ok(())
    }

    #[inline]
    pub(crate) fn get_base(&self, i: u32) -> i32 {
        self.nodes[i as usize].raw_base()
    }

    #[inline]
    pub(crate) fn get_check(&self, i: u32) -> i32 {
        self.nodes[i as usize].raw_check()
    }

    #[inline]
    pub(crate) fn set_base(&mut self, i: u32, base: u32) {
        self.nodes[i as usize].set_base(base);
    }

    /// Stores a terminal value in slot `i`.
    #[inline]
    pub(crate) fn set_leaf(&mut self, i: u32, value: i32) {
        self.nodes[i as usize].set_leaf(value);
    }

    /// Marks a free slot as owned by `parent` and unlinks it from the free list.
    pub(crate) fn claim(&mut self, i: u32, parent: u32) {
        debug_assert!(self.nodes[i as usize].is_free(), "slot {i} already owned");
        self.unlink(i);
        self.nodes[i as usize].set_check(parent);
    }

    /// Finds a base offset such that `base ^ code` is free for every code.
    ///
    /// `codes` must be non-empty and ascending. Candidates are taken from the
    /// free list, starting at its head; when none fits, a fresh block is
    /// appended, which always fits.
    pub(crate) fn find_base(&mut self, codes: &[u32]) -> Result<u32> {
        let first = codes[0];
        if let Some(head) = self.free_head {
            let mut pos = head;
            loop {
                let base = pos ^ first;
                if self.fits(base, &codes[1..]) {
                    return Ok(base);
                }
                pos = self.extras[pos as usize].next;
                if pos == head {
                    break;
                }
            }
        }

        let start = self.nodes.len() as u32;
        self.push_block()?;
        Ok(start ^ first)
    }

    /// Drops trailing free slots and returns the finished array.
    pub(crate) fn finish(mut self) -> Vec<Node> {
        let used = self
            .nodes
            .iter()
            .rposition(|n| !n.is_free())
            .map_or(0, |i| i + 1);
        self.nodes.truncate(used);
        self.nodes.shrink_to_fit();
        self.nodes
    }

    #[inline]
    fn fits(&self, base: u32, codes: &[u32]) -> bool {
        codes.iter().all(|&c| {
            let idx = (base ^ c) as usize;
            idx < self.nodes.len() && self.nodes[idx].is_free()
        })
    }

    fn push_block(&mut self) -> Result<()> {
        let start = self.nodes.len() as u32;
        let end = block_end(start)?;

        if start / BLOCK_SIZE >= self.first_active_block + NUM_EXTRA_BLOCKS {
            self.fix_block(self.first_active_block);
        }

        tracing::trace!(block = start / BLOCK_SIZE, slots = end, "double-array grown");

        self.nodes.resize(end as usize, Node::default());
        self.extras.resize(end as usize, Extra::default());
        for i in start..end {
            self.link(i);
        }
        Ok(())
    }

    /// Removes every free slot of `block` from the free list.
    fn fix_block(&mut self, block: u32) {
        let start = block * BLOCK_SIZE;
        for i in start..start + BLOCK_SIZE {
            if self.nodes[i as usize].is_free() {
                self.unlink(i);
            }
        }
        self.first_active_block = block + 1;
    }

    /// Appends slot `i` to the tail of the free list.
    fn link(&mut self, i: u32) {
        match self.free_head {
            None => {
                self.extras[i as usize] = Extra { prev: i, next: i };
                self.free_head = Some(i);
            }
            Some(head) => {
                let tail = self.extras[head as usize].prev;
                self.extras[i as usize] = Extra {
                    prev: tail,
                    next: head,
                };
                self.extras[tail as usize].next = i;
                self.extras[head as usize].prev = i;
            }
        }
    }

    fn unlink(&mut self, i: u32) {
        let Extra { prev, next } = self.extras[i as usize];
        if next == i {
            self.free_head = None;
            return;
        }
        self.extras[prev as usize].next = next;
        self.extras[next as usize].prev = prev;
        if self.free_head == Some(i) {
            self.free_head = Some(next);
        }
    }
}
