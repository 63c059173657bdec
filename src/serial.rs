//! Binary format:
//!
//! ```text
//! offset  size  field
//! 0       4     magic b"DART"
//! 4       1     version
//! 5       3     reserved (zero)
//! 8       4     slot count N (u32 LE)
//! 12      8*N   N x (base i32 LE, check i32 LE)
//! ```

use std::fs::File;
use std::io::{BufReader, BufWriter, ErrorKind, Read, Write};
use std::path::Path;

use crate::{DoubleArray, Node, Result, TrieError};

pub(crate) const MAGIC: &[u8; 4] = b"DART";
pub(crate) const VERSION: u8 = 1;
pub(crate) const HEADER_SIZE: usize = 12;
pub(crate) const SLOT_SIZE: usize = 8;

/// Validates the header and total length of a serialized array.
/// Returns the slot count.
pub(crate) fn parse_header(bytes: &[u8]) -> Result<usize> {
    if bytes.len() < HEADER_SIZE {
        return Err(TrieError::TruncatedData {
            expected: HEADER_SIZE,
            actual: bytes.len(),
        });
    }
    if &bytes[0..4] != MAGIC {
        return Err(TrieError::InvalidMagic);
    }
    if bytes[4] != VERSION {
        return Err(TrieError::UnsupportedVersion(bytes[4]));
    }

    let slots = u32::from_le_bytes([bytes[8], bytes[9], bytes[10], bytes[11]]) as usize;
    if slots == 0 {
        return Err(TrieError::EmptyArray);
    }

    let expected = slots
        .checked_mul(SLOT_SIZE)
        .and_then(|n| n.checked_add(HEADER_SIZE))
        .ok_or(TrieError::TruncatedData {
            expected: usize::MAX,
            actual: bytes.len(),
        })?;
    if bytes.len() < expected {
        return Err(TrieError::TruncatedData {
            expected,
            actual: bytes.len(),
        });
    }
    if bytes.len() > expected {
        return Err(TrieError::TrailingData {
            expected,
            actual: bytes.len(),
        });
    }
    Ok(slots)
}

impl DoubleArray {
    /// Returns the serialized size in bytes.
    pub fn serialized_size(&self) -> usize {
        HEADER_SIZE + self.nodes.len() * SLOT_SIZE
    }

    /// Serializes the double-array trie to a byte vector.
    pub fn as_bytes(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.serialized_size());
        buf.extend_from_slice(MAGIC);
        buf.push(VERSION);
        buf.extend_from_slice(&[0; 3]);
        buf.extend_from_slice(&(self.nodes.len() as u32).to_le_bytes());
        for node in &self.nodes {
            buf.extend_from_slice(&node.raw_base().to_le_bytes());
            buf.extend_from_slice(&node.raw_check().to_le_bytes());
        }
        buf
    }

    /// Deserializes a double-array trie from a byte slice.
    ///
    /// Only the framing is validated; `base`/`check` consistency is trusted.
    /// Searches stay memory-safe on inconsistent data but may return
    /// arbitrary results.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let slots = parse_header(bytes)?;
        let nodes = bytes[HEADER_SIZE..]
            .chunks_exact(SLOT_SIZE)
            .map(|c| {
                Node::from_raw(
                    i32::from_le_bytes([c[0], c[1], c[2], c[3]]),
                    i32::from_le_bytes([c[4], c[5], c[6], c[7]]),
                )
            })
            .collect::<Vec<_>>();
        debug_assert_eq!(nodes.len(), slots);
        Ok(Self::new(nodes))
    }

    /// Writes the serialized trie to `writer`.
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        writer.write_all(&self.as_bytes())?;
        writer.flush()?;
        Ok(())
    }

    /// Reads a serialized trie from `reader`, consuming it to the end.
    pub fn read_from<R: Read>(mut reader: R) -> Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::from_bytes(&bytes)
    }

    /// Saves the trie to a file, replacing any existing file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let file_err = |source| TrieError::File {
            path: path.to_path_buf(),
            source,
        };
        let file = File::create(path).map_err(file_err)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(&self.as_bytes()).map_err(file_err)?;
        writer.flush().map_err(file_err)?;

        tracing::debug!(
            path = %path.display(),
            slots = self.nodes.len(),
            bytes = self.serialized_size(),
            "double-array saved"
        );
        Ok(())
    }

    /// Loads a trie from a file written by [`DoubleArray::save`].
    ///
    /// # Errors
    /// [`TrieError::FileNotFound`] if `path` does not exist,
    /// [`TrieError::File`] for any other I/O failure, and the format errors
    /// of [`DoubleArray::from_bytes`].
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|source| match source.kind() {
            ErrorKind::NotFound => TrieError::FileNotFound {
                path: path.to_path_buf(),
            },
            _ => TrieError::File {
                path: path.to_path_buf(),
                source,
            },
        })?;
        let mut bytes = Vec::new();
        BufReader::new(file)
            .read_to_end(&mut bytes)
            .map_err(|source| TrieError::File {
                path: path.to_path_buf(),
                source,
            })?;
        let da = Self::from_bytes(&bytes)?;

        tracing::debug!(
            path = %path.display(),
            slots = da.nodes.len(),
            bytes = bytes.len(),
            "double-array loaded"
        );
        Ok(da)
    }
}
