//! Staging snapshot reader
//!
//! Rehydrates the binary index file into memory and answers the questions
//! status needs: which tracked files look changed on disk, and which files
//! on disk are not tracked at all. Change detection is a pure stat
//! comparison against the metadata recorded per entry; content is never
//! re-hashed here.

use crate::areas::workspace::Workspace;
use crate::artifacts::index::checksum::Checksum;
use crate::artifacts::index::index_entry::{ENTRY_BLOCK, ENTRY_FIXED_SIZE, IndexEntry};
use crate::artifacts::index::index_header::IndexHeader;
use crate::artifacts::index::{EXTENSION_HEADER_SIZE, HEADER_SIZE, SIGNATURE, VERSION};
use crate::errors::CoreError;
use byteorder::ByteOrder;
use std::collections::{BTreeMap, BTreeSet};
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct Index {
    path: Box<Path>,
    entries: BTreeMap<PathBuf, IndexEntry>,
}

impl Index {
    pub fn new(path: Box<Path>) -> Self {
        Index {
            path,
            entries: BTreeMap::new(),
        }
    }

    /// Reload the in-memory entries from the index file. A missing file is
    /// an empty index, not an error. Extensions are skipped over (their
    /// bytes still count toward the checksum); a bad signature, version,
    /// entry shape or trailer is reported as corruption.
    pub fn rehydrate(&mut self) -> anyhow::Result<()> {
        self.entries.clear();

        let file = match File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(err) => return Err(CoreError::Storage(err).into()),
        };
        let total_size = file.metadata().map_err(CoreError::Storage)?.len() as usize;
        let mut reader = Checksum::new(BufReader::new(file));

        let header = IndexHeader::deserialize(&reader.read(HEADER_SIZE)?)?;
        if header.marker != SIGNATURE {
            return Err(CoreError::CorruptIndex(format!(
                "invalid signature {:?}",
                header.marker
            ))
            .into());
        }
        if header.version != VERSION {
            return Err(
                CoreError::CorruptIndex(format!("unsupported version {}", header.version)).into(),
            );
        }

        for _ in 0..header.entries_count {
            self.read_entry(&mut reader)?;
        }

        if self.entries.len() != header.entries_count as usize {
            return Err(CoreError::CorruptIndex(format!(
                "header announces {} entries, found {}",
                header.entries_count,
                self.entries.len()
            ))
            .into());
        }

        self.skip_extensions(&mut reader, total_size)?;
        reader.verify()?;

        Ok(())
    }

    // Entries are keyed by path, so a conflicted index carrying the same path
    // at stages 1-3 collapses and surfaces as an entry-count mismatch.
    fn read_entry(&mut self, reader: &mut Checksum<BufReader<File>>) -> anyhow::Result<()> {
        let mut bytes = reader.read(ENTRY_FIXED_SIZE + 2)?.to_vec();

        // the path is NUL-terminated and the whole entry NUL-padded to
        // 8-byte blocks, so extend until the last byte read is a NUL
        while bytes[bytes.len() - 1] != 0 {
            bytes.extend_from_slice(&reader.read(ENTRY_BLOCK)?);
        }

        let entry = IndexEntry::deserialize(&bytes)?;
        self.entries.insert(entry.name.clone(), entry);

        Ok(())
    }

    fn skip_extensions(
        &self,
        reader: &mut Checksum<BufReader<File>>,
        total_size: usize,
    ) -> anyhow::Result<()> {
        let body_size = total_size.saturating_sub(crate::artifacts::index::CHECKSUM_SIZE);

        while reader.bytes_read() + EXTENSION_HEADER_SIZE <= body_size {
            let header = reader.read(EXTENSION_HEADER_SIZE)?;
            let signature = &header[0..4];
            if !signature.iter().all(|b| b.is_ascii_uppercase()) {
                return Err(CoreError::CorruptIndex(format!(
                    "invalid extension signature {:?}",
                    String::from_utf8_lossy(signature)
                ))
                .into());
            }

            let length = byteorder::NetworkEndian::read_u32(&header[4..8]) as usize;
            if reader.bytes_read() + length > body_size {
                return Err(CoreError::CorruptIndex(
                    "extension length exceeds index size".to_string(),
                )
                .into());
            }
            reader.read(length)?;
        }

        if reader.bytes_read() != body_size {
            return Err(CoreError::CorruptIndex("trailing garbage after extensions".to_string()).into());
        }

        Ok(())
    }

    pub fn entries(&self) -> impl Iterator<Item = &IndexEntry> {
        self.entries.values()
    }

    pub fn is_tracked(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Compare the tracked entries against the live working tree.
    ///
    /// Returns the tracked paths whose size or mtime diverges from the
    /// recorded metadata (deleted files count as modified) and the on-disk
    /// files with no entry at all, both in path order.
    pub fn compare_worktree(
        &self,
        workspace: &Workspace,
    ) -> anyhow::Result<(BTreeSet<PathBuf>, BTreeSet<PathBuf>)> {
        let mut modified = BTreeSet::new();
        let mut untracked = BTreeSet::new();

        for entry in self.entries.values() {
            match workspace.stat_file(&entry.name) {
                Ok(live) if entry.stat_match(&live) => {}
                Ok(_) => {
                    modified.insert(entry.name.clone());
                }
                Err(_) => {
                    modified.insert(entry.name.clone());
                }
            }
        }

        for file in workspace.list_files()? {
            if !self.is_tracked(&file) {
                untracked.insert(file);
            }
        }

        Ok((modified, untracked))
    }
}
