//! Tree object
//!
//! Trees are directory snapshots: a sequence of `(mode, name, object id)`
//! entries. Entries are kept in file order; no on-disk ordering is required
//! for correctness, but a duplicate name within one tree is malformed.
//!
//! On disk: `tree <size>\0<entries>`, each entry `<mode> <name>\0<20-byte id>`.

use crate::artifacts::index::entry_mode::EntryMode;
use crate::artifacts::objects::object::Unpackable;
use crate::artifacts::objects::object::{Object, Packable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::CoreError;
use anyhow::Context;
use bytes::Bytes;
use derive_new::new;
use std::collections::HashSet;
use std::io::{BufRead, Write};

#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct TreeEntry {
    pub mode: EntryMode,
    pub name: String,
    pub oid: ObjectId,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, new)]
pub struct Tree {
    entries: Vec<TreeEntry>,
}

impl Tree {
    pub fn entries(&self) -> impl Iterator<Item = &TreeEntry> {
        self.entries.iter()
    }

    pub fn into_entries(self) -> impl Iterator<Item = TreeEntry> {
        self.entries.into_iter()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Packable for Tree {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut content_bytes = Vec::new();
        for entry in &self.entries {
            let header = format!("{} {}", entry.mode.as_octal_str(), entry.name);
            content_bytes.write_all(header.as_bytes())?;
            content_bytes.push(0);
            entry.oid.write_raw_to(&mut content_bytes)?;
        }

        let mut tree_bytes = Vec::new();
        let header = format!("{} {}\0", self.object_type().as_str(), content_bytes.len());
        tree_bytes.write_all(header.as_bytes())?;
        tree_bytes.write_all(&content_bytes)?;

        Ok(Bytes::from(tree_bytes))
    }
}

impl Unpackable for Tree {
    fn deserialize(reader: impl BufRead) -> anyhow::Result<Self> {
        let mut entries = Vec::new();
        let mut seen_names = HashSet::new();
        let mut reader = reader;

        // scratch buffers reused across entries
        let mut mode_bytes = Vec::new();
        let mut name_bytes = Vec::new();

        loop {
            mode_bytes.clear();
            let n = reader.read_until(b' ', &mut mode_bytes)?;
            if n == 0 {
                break; // clean EOF: no more entries
            }
            if mode_bytes.pop() != Some(b' ') {
                return Err(
                    CoreError::MalformedObject("unexpected EOF in tree entry mode".to_string())
                        .into(),
                );
            }

            let mode_str = std::str::from_utf8(&mode_bytes)
                .map_err(|_| CoreError::MalformedObject("non-ascii tree entry mode".to_string()))?;
            let mode = EntryMode::from_octal_str(mode_str)?;

            name_bytes.clear();
            let n = reader.read_until(b'\0', &mut name_bytes)?;
            if n == 0 || name_bytes.pop() != Some(b'\0') {
                return Err(
                    CoreError::MalformedObject("unexpected EOF in tree entry name".to_string())
                        .into(),
                );
            }
            let name = std::str::from_utf8(&name_bytes)
                .map_err(|_| CoreError::MalformedObject("non-utf8 tree entry name".to_string()))?
                .to_owned();

            if !seen_names.insert(name.clone()) {
                return Err(CoreError::MalformedObject(format!(
                    "duplicate tree entry name {name}"
                ))
                .into());
            }

            let oid = ObjectId::read_raw_from(&mut reader)
                .context("unexpected EOF in tree entry object id")?;

            entries.push(TreeEntry::new(mode, name, oid));
        }

        Ok(Tree { entries })
    }
}

impl Object for Tree {
    fn object_type(&self) -> ObjectType {
        ObjectType::Tree
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};
    use std::io::Cursor;

    #[fixture]
    fn oid_a() -> ObjectId {
        ObjectId::try_parse("a".repeat(40)).unwrap()
    }

    #[fixture]
    fn oid_b() -> ObjectId {
        ObjectId::try_parse("b".repeat(40)).unwrap()
    }

    #[rstest]
    fn round_trip_preserves_file_order(oid_a: ObjectId, oid_b: ObjectId) {
        let tree = Tree::new(vec![
            TreeEntry::new(EntryMode::Directory, "zeta".to_string(), oid_b),
            TreeEntry::new(EntryMode::Regular, "alpha.txt".to_string(), oid_a),
        ]);

        let bytes = tree.serialize().unwrap();
        let mut reader = Cursor::new(bytes);
        ObjectType::parse_header(&mut reader).unwrap();
        let back = Tree::deserialize(reader).unwrap();

        // entries come back in file order, not sorted
        assert_eq!(back, tree);
    }

    #[rstest]
    fn duplicate_names_are_malformed(oid_a: ObjectId, oid_b: ObjectId) {
        let tree = Tree::new(vec![
            TreeEntry::new(EntryMode::Regular, "same".to_string(), oid_a),
            TreeEntry::new(EntryMode::Regular, "same".to_string(), oid_b),
        ]);

        let bytes = tree.serialize().unwrap();
        let mut reader = Cursor::new(bytes);
        ObjectType::parse_header(&mut reader).unwrap();

        let err = Tree::deserialize(reader).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<crate::errors::CoreError>(),
            Some(crate::errors::CoreError::MalformedObject(_))
        ));
    }

    #[rstest]
    fn truncated_entry_is_malformed(oid_a: ObjectId) {
        let tree = Tree::new(vec![TreeEntry::new(
            EntryMode::Regular,
            "a.txt".to_string(),
            oid_a,
        )]);
        let bytes = tree.serialize().unwrap();

        let mut reader = Cursor::new(bytes.slice(..bytes.len() - 5));
        ObjectType::parse_header(&mut reader).unwrap();
        assert!(Tree::deserialize(reader).is_err());
    }

    #[rstest]
    fn empty_tree_round_trips() {
        let tree = Tree::default();
        let bytes = tree.serialize().unwrap();
        assert_eq!(&bytes[..], b"tree 0\0");

        let mut reader = Cursor::new(bytes);
        ObjectType::parse_header(&mut reader).unwrap();
        assert!(Tree::deserialize(reader).unwrap().is_empty());
    }
}
