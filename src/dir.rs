//! Directory-entry wire format: a 32-byte record naming a file or
//! subdirectory and pointing at its chain head.

use crate::error::{FsError, FsResult};
use crate::geometry::DIR_ENTRY_SIZE;

/// Maximum usable name length: 17 bytes, leaving room for the trailing NUL
/// within the 18-byte `filename` field.
pub const MAX_NAME_LEN: usize = 17;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Attribute {
    File,
    Directory,
}

impl Attribute {
    fn decode(b: u8) -> FsResult<Self> {
        match b {
            0 => Ok(Attribute::File),
            1 => Ok(Attribute::Directory),
            other => Err(FsError::Corrupt(format!("invalid attribute byte {other}"))),
        }
    }

    fn encode(self) -> u8 {
        match self {
            Attribute::File => 0,
            Attribute::Directory => 1,
        }
    }
}

/// One 32-byte directory entry, decoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub attributes: Attribute,
    pub first_block: u16,
    pub size: u32,
}

impl DirEntry {
    pub fn is_dir(&self) -> bool {
        self.attributes == Attribute::Directory
    }

    pub fn is_file(&self) -> bool {
        self.attributes == Attribute::File
    }

    /// Synthesizes the entry `find_entry_by_path` returns for `"/"`
    /// itself, which has no real slot in any parent directory.
    pub fn synthetic_root() -> Self {
        Self {
            name: "/".to_string(),
            attributes: Attribute::Directory,
            first_block: crate::geometry::ROOT_DIR_CLUSTER,
            size: 0,
        }
    }

    /// Parses a 32-byte slot. Returns `Ok(None)` for an empty slot
    /// (`filename[0] == 0x00`), never an error — an empty slot is a normal,
    /// expected state, not a corruption.
    pub fn parse(slot: &[u8]) -> FsResult<Option<Self>> {
        debug_assert_eq!(slot.len(), DIR_ENTRY_SIZE);
        if slot[0] == 0 {
            return Ok(None);
        }

        let name = decode_name(&slot[0..18]);
        let attributes = Attribute::decode(slot[18])?;
        let first_block = u16::from_le_bytes([slot[26], slot[27]]);
        let size = u32::from_le_bytes([slot[28], slot[29], slot[30], slot[31]]);

        Ok(Some(Self {
            name,
            attributes,
            first_block,
            size,
        }))
    }

    /// Encodes this entry into a fresh 32-byte slot.
    pub fn encode(&self) -> [u8; DIR_ENTRY_SIZE] {
        let mut slot = [0u8; DIR_ENTRY_SIZE];
        encode_name(&self.name, &mut slot[0..18]);
        slot[18] = self.attributes.encode();
        // slot[19..26] stays zero: reserved.
        slot[26..28].copy_from_slice(&self.first_block.to_le_bytes());
        slot[28..32].copy_from_slice(&self.size.to_le_bytes());
        slot
    }
}

/// Writes a zeroed (empty) slot.
pub fn empty_slot() -> [u8; DIR_ENTRY_SIZE] {
    [0u8; DIR_ENTRY_SIZE]
}

fn decode_name(field: &[u8]) -> String {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    String::from_utf8_lossy(&field[..end]).into_owned()
}

/// Encodes `name` into an 18-byte field, truncating to [`MAX_NAME_LEN`]
/// bytes and NUL-terminating. A name this long is not rejected; the
/// truncation happens silently.
fn encode_name(name: &str, field: &mut [u8]) {
    debug_assert_eq!(field.len(), 18);
    let bytes = name.as_bytes();
    let len = bytes.len().min(MAX_NAME_LEN);
    field[..len].copy_from_slice(&bytes[..len]);
    field[len] = 0;
}

/// `true` if `name` would be truncated when stored.
pub fn name_would_truncate(name: &str) -> bool {
    name.as_bytes().len() > MAX_NAME_LEN
}
