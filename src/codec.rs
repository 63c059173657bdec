//! Byte-key codec.
//!
//! Keys are walked one byte at a time. Each byte `b` maps to the transition
//! code `b + 1`, leaving code 0 free for the terminal symbol that marks the end
//! of a key. The alphabet therefore has 257 codes, and every XOR offset block
//! must span 512 slots to hold all of them.

/// Code reserved for the end-of-key terminal symbol.
pub const TERMINAL_CODE: u32 = 0;

/// Number of distinct codes, including the terminal symbol.
pub const ALPHABET_SIZE: u32 = 257;

/// Returns the transition code for a key byte.
#[inline]
pub fn code(byte: u8) -> u32 {
    byte as u32 + 1
}

/// Encodes text into the byte sequence the trie is keyed on.
///
/// UTF-8 encoding keeps the trie's key order identical to `str`'s ordering,
/// which is byte-wise lexicographic.
#[inline]
pub fn encode(text: &str) -> &[u8] {
    text.as_bytes()
}
