use std::time::Instant;

use crate::codec::{code, TERMINAL_CODE};
use crate::node::MAX_INDEX;
use crate::store::Store;
use crate::{DoubleArray, Result, TrieError};

/// A pending node: the keys in `begin..end` share their first `depth` bytes,
/// and `node` is the slot standing for that prefix.
#[derive(Clone, Copy, Debug)]
struct Pending {
    node: u32,
    begin: usize,
    end: usize,
    depth: usize,
}

/// A child edge of the node being placed, covering keys `begin..end`.
#[derive(Clone, Copy, Debug)]
struct Child {
    code: u32,
    begin: usize,
    end: usize,
}

struct Builder<'k, K> {
    keys: &'k [K],
    values: Option<&'k [i32]>,
    store: Store,
    children: Vec<Child>,
    codes: Vec<u32>,
}

impl<K: AsRef<[u8]>> Builder<'_, K> {
    fn value(&self, index: usize) -> i32 {
        match self.values {
            Some(values) => values[index],
            None => index as i32,
        }
    }

    fn run(mut self) -> Result<DoubleArray> {
        let mut stack = vec![Pending {
            node: 0,
            begin: 0,
            end: self.keys.len(),
            depth: 0,
        }];

        while let Some(pending) = stack.pop() {
            self.collect_children(pending);
            self.place(pending)?;

            // Reverse so the smallest code is placed first.
            for child in self.children.iter().rev() {
                if child.code == TERMINAL_CODE {
                    continue;
                }
                stack.push(Pending {
                    node: self.store.get_base(pending.node) as u32 ^ child.code,
                    begin: child.begin,
                    end: child.end,
                    depth: pending.depth + 1,
                });
            }
        }

        Ok(DoubleArray::new(self.store.finish()))
    }

    /// Splits `pending` into one range per distinct next byte. A key ending
    /// exactly at `depth` becomes a terminal child; sorted input puts it first.
    fn collect_children(&mut self, pending: Pending) {
        self.children.clear();
        for i in pending.begin..pending.end {
            let key = self.keys[i].as_ref();
            let c = match key.get(pending.depth) {
                Some(&b) => code(b),
                None => TERMINAL_CODE,
            };
            match self.children.last_mut() {
                Some(last) if last.code == c => last.end = i + 1,
                _ => self.children.push(Child {
                    code: c,
                    begin: i,
                    end: i + 1,
                }),
            }
        }
    }

    /// Assigns a base to `pending.node` and claims a slot for every child.
    fn place(&mut self, pending: Pending) -> Result<()> {
        self.codes.clear();
        self.codes.extend(self.children.iter().map(|c| c.code));

        let base = self.store.find_base(&self.codes)?;
        self.store.set_base(pending.node, base);

        for child in &self.children {
            let slot = base ^ child.code;
            self.store.claim(slot, pending.node);
            if child.code == TERMINAL_CODE {
                let value = self.value(child.begin);
                self.store.set_leaf(slot, value);
            }
            debug_assert_eq!(self.store.get_check(slot), pending.node as i32);
        }
        Ok(())
    }
}

/// Rejects key sets the construction cannot handle.
fn validate<K: AsRef<[u8]>>(keys: &[K], values: Option<&[i32]>) -> Result<()> {
    if keys.is_empty() {
        return Err(TrieError::EmptyKeySet);
    }
    match values {
        Some(values) => {
            if values.len() != keys.len() {
                return Err(TrieError::ValueCountMismatch {
                    keys: keys.len(),
                    values: values.len(),
                });
            }
            if let Some(index) = values.iter().position(|&v| v < 0) {
                return Err(TrieError::NegativeValue {
                    index,
                    value: values[index],
                });
            }
        }
        None => {
            if keys.len() - 1 > MAX_INDEX as usize {
                return Err(TrieError::Overflow { slots: keys.len() });
            }
        }
    }
    if let Some(index) = keys
        .windows(2)
        .position(|w| w[0].as_ref() >= w[1].as_ref())
    {
        return Err(TrieError::UnsortedKeys { index: index + 1 });
    }
    Ok(())
}

fn build_impl<K: AsRef<[u8]>>(keys: &[K], values: Option<&[i32]>) -> Result<DoubleArray> {
    validate(keys, values)?;

    let started = Instant::now();
    let builder = Builder {
        keys,
        values,
        store: Store::new()?,
        children: Vec::new(),
        codes: Vec::new(),
    };
    let da = builder.run()?;

    tracing::debug!(
        keys = keys.len(),
        slots = da.size(),
        elapsed_us = started.elapsed().as_micros() as u64,
        "double-array built"
    );
    Ok(da)
}

impl DoubleArray {
    /// Builds a double-array trie from sorted keys.
    ///
    /// Each key `keys[i]` is assigned the value `i`.
    ///
    /// # Errors
    /// - [`TrieError::EmptyKeySet`] if `keys` is empty.
    /// - [`TrieError::UnsortedKeys`] if keys are not strictly ascending
    ///   (byte-wise), which includes duplicates.
    /// - [`TrieError::Overflow`] if the array outgrows 31-bit indices.
    pub fn build(keys: &[impl AsRef<[u8]>]) -> Result<Self> {
        build_impl(keys, None)
    }

    /// Builds a double-array trie from sorted keys and their values.
    ///
    /// `values[i]` is stored for `keys[i]`. Values must be non-negative.
    ///
    /// # Errors
    /// Same as [`DoubleArray::build`], plus
    /// [`TrieError::ValueCountMismatch`] and [`TrieError::NegativeValue`].
    pub fn build_with_values(keys: &[impl AsRef<[u8]>], values: &[i32]) -> Result<Self> {
        build_impl(keys, Some(values))
    }
}
