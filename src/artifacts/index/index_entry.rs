//! Index entry codec
//!
//! Each entry records a tracked path, the blob id of its staged content, and
//! the stat metadata (mode, size, timestamps) used for fast change detection
//! without re-reading file content. Entries are stored with network-endian
//! u32 fields and padded to 8-byte blocks.

use crate::artifacts::index::entry_mode::EntryMode;
use crate::artifacts::objects::object_id::ObjectId;
use crate::errors::CoreError;
use byteorder::{ByteOrder, WriteBytesExt};
use bytes::Bytes;
use derive_new::new;
use std::cmp::min;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Maximum path length representable in the flags field
const MAX_PATH_SIZE: usize = 0xfff;

/// Entry alignment block size
pub const ENTRY_BLOCK: usize = 8;

/// Smallest possible entry: 62 fixed bytes plus NUL padding to one block
pub const ENTRY_MIN_SIZE: usize = 64;

/// Fixed-size prefix before the path
pub const ENTRY_FIXED_SIZE: usize = 62;

#[derive(Debug, Clone, Default, new)]
pub struct IndexEntry {
    /// Path relative to the repository root
    pub name: PathBuf,
    /// Blob id of the staged content
    pub oid: ObjectId,
    /// Recorded stat metadata
    pub metadata: EntryMetadata,
    /// Raw flags field; bits 0-11 are the path length, bits 12-13 the stage
    pub flags: u16,
}

impl IndexEntry {
    /// Merge stage recorded in the flags field (0 for a normal entry).
    pub fn stage(&self) -> u8 {
        ((self.flags >> 12) & 0b11) as u8
    }

    /// Fast change heuristic: the recorded size and modification time both
    /// match the live stat. Content is deliberately not re-hashed.
    pub fn stat_match(&self, live: &EntryMetadata) -> bool {
        self.metadata.size == live.size
            && self.metadata.mtime == live.mtime
            && self.metadata.mtime_nsec == live.mtime_nsec
    }

    pub fn serialize(&self) -> anyhow::Result<Bytes> {
        let entry_name = self
            .name
            .to_str()
            .ok_or_else(|| CoreError::CorruptIndex("non-utf8 entry name".to_string()))?;

        let mut entry_bytes = Vec::new();
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.ctime as u32)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.ctime_nsec as u32)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.mtime as u32)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.mtime_nsec as u32)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.dev as u32)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.ino as u32)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.mode.as_u32())?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.uid)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.gid)?;
        entry_bytes.write_u32::<byteorder::NetworkEndian>(self.metadata.size as u32)?;
        self.oid.write_raw_to(&mut entry_bytes)?;
        entry_bytes.write_u16::<byteorder::NetworkEndian>(self.flags)?;
        entry_bytes.write_all(entry_name.as_bytes())?;

        // at least one NUL terminator, padded to the block size
        entry_bytes.push(0);
        while entry_bytes.len() % ENTRY_BLOCK != 0 {
            entry_bytes.push(0);
        }

        Ok(Bytes::from(entry_bytes))
    }

    pub fn deserialize(bytes: &[u8]) -> anyhow::Result<Self> {
        if bytes.len() < ENTRY_MIN_SIZE {
            return Err(CoreError::CorruptIndex("truncated entry".to_string()).into());
        }

        let ctime = byteorder::NetworkEndian::read_u32(&bytes[0..4]) as i64;
        let ctime_nsec = byteorder::NetworkEndian::read_u32(&bytes[4..8]) as i64;
        let mtime = byteorder::NetworkEndian::read_u32(&bytes[8..12]) as i64;
        let mtime_nsec = byteorder::NetworkEndian::read_u32(&bytes[12..16]) as i64;
        let dev = byteorder::NetworkEndian::read_u32(&bytes[16..20]) as u64;
        let ino = byteorder::NetworkEndian::read_u32(&bytes[20..24]) as u64;
        let mode = EntryMode::try_from_u32(byteorder::NetworkEndian::read_u32(&bytes[24..28]))?;
        let uid = byteorder::NetworkEndian::read_u32(&bytes[28..32]);
        let gid = byteorder::NetworkEndian::read_u32(&bytes[32..36]);
        let size = byteorder::NetworkEndian::read_u32(&bytes[36..40]) as u64;
        let mut oid_bytes = std::io::Cursor::new(&bytes[40..60]);
        let oid = ObjectId::read_raw_from(&mut oid_bytes)?;
        let flags = byteorder::NetworkEndian::read_u16(&bytes[60..62]);

        let name_end = bytes[ENTRY_FIXED_SIZE..]
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| CoreError::CorruptIndex("unterminated entry name".to_string()))?;
        let name_bytes = &bytes[ENTRY_FIXED_SIZE..ENTRY_FIXED_SIZE + name_end];
        let name = PathBuf::from(
            std::str::from_utf8(name_bytes)
                .map_err(|_| CoreError::CorruptIndex("non-utf8 entry name".to_string()))?,
        );

        Ok(IndexEntry {
            name,
            oid,
            metadata: EntryMetadata {
                ctime,
                ctime_nsec,
                mtime,
                mtime_nsec,
                dev,
                ino,
                mode,
                uid,
                gid,
                size,
            },
            flags,
        })
    }

    /// Flags value for a stage-0 entry with the given path.
    pub fn flags_for_path(path: &Path) -> u16 {
        min(path.as_os_str().len(), MAX_PATH_SIZE) as u16
    }
}

impl PartialEq for IndexEntry {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for IndexEntry {}

/// Stat metadata recorded per entry
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EntryMetadata {
    pub ctime: i64,
    pub ctime_nsec: i64,
    pub mtime: i64,
    pub mtime_nsec: i64,
    pub dev: u64,
    pub ino: u64,
    pub mode: EntryMode,
    pub uid: u32,
    pub gid: u32,
    pub size: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn entry() -> IndexEntry {
        let name = PathBuf::from("src/lib.rs");
        IndexEntry::new(
            name.clone(),
            ObjectId::try_parse("f".repeat(40)).unwrap(),
            EntryMetadata {
                ctime: 100,
                ctime_nsec: 1,
                mtime: 200,
                mtime_nsec: 2,
                dev: 3,
                ino: 4,
                mode: EntryMode::Regular,
                uid: 5,
                gid: 6,
                size: 7,
            },
            IndexEntry::flags_for_path(&name),
        )
    }

    #[rstest]
    fn round_trip(entry: IndexEntry) {
        let bytes = entry.serialize().unwrap();
        assert_eq!(bytes.len() % ENTRY_BLOCK, 0);

        let back = IndexEntry::deserialize(&bytes).unwrap();
        assert_eq!(back.name, entry.name);
        assert_eq!(back.oid, entry.oid);
        assert_eq!(back.metadata, entry.metadata);
        assert_eq!(back.stage(), 0);
    }

    #[rstest]
    fn stage_is_read_from_flag_bits(entry: IndexEntry) {
        let mut entry = entry;
        entry.flags |= 0b10 << 12;

        let bytes = entry.serialize().unwrap();
        let back = IndexEntry::deserialize(&bytes).unwrap();
        assert_eq!(back.stage(), 2);
    }

    #[rstest]
    fn stat_match_detects_size_and_mtime_changes(entry: IndexEntry) {
        let mut live = entry.metadata.clone();
        assert!(entry.stat_match(&live));

        live.size = 8;
        assert!(!entry.stat_match(&live));

        live.size = 7;
        live.mtime = 201;
        assert!(!entry.stat_match(&live));
    }

    #[rstest]
    fn truncated_entry_is_corrupt(entry: IndexEntry) {
        let bytes = entry.serialize().unwrap();
        assert!(IndexEntry::deserialize(&bytes[..40]).is_err());
    }
}
