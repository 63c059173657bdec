use std::collections::HashMap;
use std::fmt;

use crate::codec::encode;
use crate::Dictionary;

/// How a matched dictionary word is rewritten by
/// [`Dictionary::replace_words`].
pub enum Replacer<'a> {
    /// Computes the replacement from the matched word.
    Callback(Box<dyn FnMut(&str) -> String + 'a>),
    /// Looks the matched word up; words missing from the map are kept.
    Lookup(HashMap<String, String>),
}

impl<'a> Replacer<'a> {
    /// Wraps a closure.
    pub fn callback(f: impl FnMut(&str) -> String + 'a) -> Self {
        Replacer::Callback(Box::new(f))
    }

    fn replace(&mut self, word: &str, out: &mut String) {
        match self {
            Replacer::Callback(f) => out.push_str(&f(word)),
            Replacer::Lookup(map) => out.push_str(map.get(word).map_or(word, String::as_str)),
        }
    }
}

impl fmt::Debug for Replacer<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Replacer::Callback(_) => f.write_str("Replacer::Callback(..)"),
            Replacer::Lookup(map) => f.debug_tuple("Replacer::Lookup").field(map).finish(),
        }
    }
}

impl From<HashMap<String, String>> for Replacer<'_> {
    fn from(map: HashMap<String, String>) -> Self {
        Replacer::Lookup(map)
    }
}

impl Dictionary {
    /// Rewrites every dictionary word found in `text`.
    ///
    /// Scans left to right; at each position the longest key starting there
    /// is handed to `replacer`, and scanning resumes after it. Characters that
    /// start no key are copied unchanged.
    pub fn replace_words(&self, text: &str, replacer: &mut Replacer<'_>) -> String {
        let da = self.double_array();
        let mut out = String::with_capacity(text.len());
        let mut pos = 0;

        while pos < text.len() {
            let rest = &text[pos..];
            let longest = da
                .common_prefixes(encode(rest))
                .filter(|m| m.len > 0 && rest.is_char_boundary(m.len))
                .last();

            match longest {
                Some(m) => {
                    replacer.replace(&rest[..m.len], &mut out);
                    pos += m.len;
                }
                None => {
                    // `rest` is non-empty, so it has a first char.
                    let ch_len = rest.chars().next().map_or(1, char::len_utf8);
                    out.push_str(&rest[..ch_len]);
                    pos += ch_len;
                }
            }
        }
        out
    }
}
