/// `check` of a slot that no parent owns.
pub(crate) const FREE: i32 = -1;

/// Largest offset or index a slot can hold.
pub(crate) const MAX_INDEX: u32 = i32::MAX as u32;

/// A slot in the double-array trie.
///
/// Each slot is exactly 8 bytes (`#[repr(C)]`):
/// - `base`: XOR offset of the node's children, or `-value - 1` for a terminal slot
/// - `check`: index of the owning parent, or `-1` when the slot is free
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Node {
    base: i32,
    check: i32,
}

impl Default for Node {
    fn default() -> Self {
        Self {
            base: 0,
            check: FREE,
        }
    }
}

impl Node {
    /// Creates a slot from its raw `base` and `check` words.
    #[inline]
    pub fn from_raw(base: i32, check: i32) -> Self {
        Self { base, check }
    }

    /// Returns the raw `base` word.
    #[inline]
    pub fn raw_base(&self) -> i32 {
        self.base
    }

    /// Returns the raw `check` word.
    #[inline]
    pub fn raw_check(&self) -> i32 {
        self.check
    }

    /// Returns the XOR offset of this node's children.
    ///
    /// Terminal slots have a negative base; reinterpreting it as `u32` yields an
    /// index beyond any real array, so a transition out of a terminal slot
    /// always fails the bounds check.
    #[inline]
    pub fn base(&self) -> u32 {
        self.base as u32
    }

    /// Returns the parent index, or `None` for a free slot.
    #[inline]
    pub fn check(&self) -> Option<u32> {
        u32::try_from(self.check).ok()
    }

    /// Returns true if `parent` owns this slot.
    #[inline]
    pub fn is_child_of(&self, parent: u32) -> bool {
        self.check >= 0 && self.check as u32 == parent
    }

    /// Returns true if no parent owns this slot.
    #[inline]
    pub fn is_free(&self) -> bool {
        self.check == FREE
    }

    /// Returns true if this is a terminal slot storing a value.
    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.base < 0
    }

    /// Returns the value stored in a terminal slot.
    #[inline]
    pub fn value(&self) -> Option<i32> {
        if self.is_leaf() {
            Some(!self.base)
        } else {
            None
        }
    }

    /// Sets the XOR offset of this node's children.
    #[inline]
    pub fn set_base(&mut self, base: u32) {
        debug_assert!(base <= MAX_INDEX, "base must fit in 31 bits");
        self.base = base as i32;
    }

    /// Sets the owning parent.
    #[inline]
    pub fn set_check(&mut self, parent: u32) {
        debug_assert!(parent <= MAX_INDEX, "check must fit in 31 bits");
        self.check = parent as i32;
    }

    /// Marks this slot as terminal and stores `value`.
    #[inline]
    pub fn set_leaf(&mut self, value: i32) {
        debug_assert!(value >= 0, "terminal values must be non-negative");
        self.base = !value;
    }
}
