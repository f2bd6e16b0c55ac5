//! Loose-object database
//!
//! Objects live at `objects/<first-2-hex>/<remaining-38-hex>`, zlib-deflated.
//! The store is an append-only map from hash to bytes: a write of an already
//! present hash is a no-op, and nothing ever mutates an object in place.

use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object::{Object, ObjectBox, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tag::Tag;
use crate::artifacts::objects::tree::Tree;
use crate::errors::CoreError;
use anyhow::Context;
use bytes::Bytes;
use fake::rand;
use std::io::{Cursor, Read, Write};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub struct Database {
    path: Box<Path>,
}

impl Database {
    pub fn new(path: Box<Path>) -> Self {
        Database { path }
    }

    pub fn objects_path(&self) -> &Path {
        &self.path
    }

    /// Decompressed object bytes, framing header included.
    pub fn load(&self, object_id: &ObjectId) -> anyhow::Result<Bytes> {
        let object_path = self.path.join(object_id.to_path());

        self.read_object(object_id, object_path)
    }

    /// Decompressed payload with the framing header stripped and the declared
    /// length checked.
    pub fn load_payload(&self, object_id: &ObjectId) -> anyhow::Result<(ObjectType, Bytes)> {
        let (object_type, reader) = self.parse_object_as_bytes(object_id)?;
        let position = reader.position() as usize;
        let content = reader.into_inner();

        Ok((object_type, content.slice(position..)))
    }

    /// Decode a stored object into its typed form.
    pub fn parse_object(&self, object_id: &ObjectId) -> anyhow::Result<ObjectBox> {
        let (object_type, object_reader) = self.parse_object_as_bytes(object_id)?;

        match object_type {
            ObjectType::Blob => Ok(ObjectBox::Blob(Box::new(Blob::deserialize(object_reader)?))),
            ObjectType::Tree => Ok(ObjectBox::Tree(Box::new(Tree::deserialize(object_reader)?))),
            ObjectType::Commit => Ok(ObjectBox::Commit(Box::new(Commit::deserialize(
                object_reader,
            )?))),
            ObjectType::Tag => Ok(ObjectBox::Tag(Box::new(Tag::deserialize(object_reader)?))),
        }
    }

    pub fn parse_object_as_blob(&self, object_id: &ObjectId) -> anyhow::Result<Option<Blob>> {
        match self.parse_object(object_id)? {
            ObjectBox::Blob(blob) => Ok(Some(*blob)),
            _ => Ok(None),
        }
    }

    pub fn parse_object_as_tree(&self, object_id: &ObjectId) -> anyhow::Result<Option<Tree>> {
        match self.parse_object(object_id)? {
            ObjectBox::Tree(tree) => Ok(Some(*tree)),
            _ => Ok(None),
        }
    }

    pub fn parse_object_as_commit(&self, object_id: &ObjectId) -> anyhow::Result<Option<Commit>> {
        match self.parse_object(object_id)? {
            ObjectBox::Commit(commit) => Ok(Some(*commit)),
            _ => Ok(None),
        }
    }

    pub fn parse_object_as_tag(&self, object_id: &ObjectId) -> anyhow::Result<Option<Tag>> {
        match self.parse_object(object_id)? {
            ObjectBox::Tag(tag) => Ok(Some(*tag)),
            _ => Ok(None),
        }
    }

    pub fn object_type_of(&self, object_id: &ObjectId) -> anyhow::Result<ObjectType> {
        let (object_type, _) = self.parse_object_as_bytes(object_id)?;
        Ok(object_type)
    }

    pub fn contains(&self, object_id: &ObjectId) -> bool {
        self.path.join(object_id.to_path()).exists()
    }

    /// Hash an object and, when `persist` is set, write it to disk. The hash
    /// is always computed; without `persist` this is a dry run.
    ///
    /// Writes go through a temporary file renamed into place so a crash never
    /// leaves a truncated object visible under its final name, and an already
    /// stored object is left untouched.
    pub fn store(&self, object: &impl Object, persist: bool) -> anyhow::Result<ObjectId> {
        let object_id = object.object_id()?;

        if persist {
            let object_path = self.path.join(object_id.to_path());
            if !object_path.exists() {
                std::fs::create_dir_all(object_path.parent().context("invalid object path")?)
                    .map_err(CoreError::Storage)?;
                self.write_object(object_path, object.serialize()?)?;
            }
        }

        Ok(object_id)
    }

    /// Resolve an abbreviated hash (at least 4 hex chars) to exactly one
    /// stored object.
    pub fn resolve_prefix(&self, prefix: &str) -> anyhow::Result<ObjectId> {
        if !ObjectId::is_prefix_candidate(prefix) {
            return Err(CoreError::NotFound(prefix.to_string()).into());
        }

        let mut matches = self.find_objects_by_prefix(prefix)?;
        match matches.len() {
            0 => Err(CoreError::NotFound(prefix.to_string()).into()),
            1 => Ok(matches.remove(0)),
            count => Err(CoreError::AmbiguousHash {
                prefix: prefix.to_string(),
                count,
            }
            .into()),
        }
    }

    /// All stored object ids starting with `prefix`. With at least two
    /// characters only one fan-out directory needs scanning.
    pub fn find_objects_by_prefix(&self, prefix: &str) -> anyhow::Result<Vec<ObjectId>> {
        let prefix = prefix.to_ascii_lowercase();
        let mut matches = Vec::new();

        let (dir_name, file_prefix) = prefix.split_at(2.min(prefix.len()));
        let dir_path = self.path.join(dir_name);

        if dir_name.len() == 2 {
            self.scan_fanout_dir(&dir_path, dir_name, file_prefix, &mut matches)?;
        } else {
            for i in 0..=255u8 {
                let dir_name = format!("{i:02x}");
                if !dir_name.starts_with(&prefix) {
                    continue;
                }
                self.scan_fanout_dir(&self.path.join(&dir_name), &dir_name, "", &mut matches)?;
            }
        }

        matches.sort();
        Ok(matches)
    }

    fn scan_fanout_dir(
        &self,
        dir_path: &Path,
        dir_name: &str,
        file_prefix: &str,
        matches: &mut Vec<ObjectId>,
    ) -> anyhow::Result<()> {
        if !dir_path.is_dir() {
            return Ok(());
        }

        for entry in std::fs::read_dir(dir_path).map_err(CoreError::Storage)? {
            let entry = entry.map_err(CoreError::Storage)?;
            let file_name = entry.file_name();
            let file_name = file_name.to_string_lossy();

            if file_name.starts_with(file_prefix)
                && let Ok(oid) = ObjectId::try_parse(format!("{dir_name}{file_name}"))
            {
                matches.push(oid);
            }
        }

        Ok(())
    }

    fn parse_object_as_bytes(
        &self,
        object_id: &ObjectId,
    ) -> anyhow::Result<(ObjectType, Cursor<Bytes>)> {
        let object_content = self.load(object_id)?;
        let total_len = object_content.len();
        let mut object_reader = Cursor::new(object_content);

        let (object_type, declared_size) = ObjectType::parse_header(&mut object_reader)?;

        let payload_len = total_len - object_reader.position() as usize;
        if payload_len != declared_size {
            return Err(CoreError::MalformedObject(format!(
                "object {object_id}: declared size {declared_size} but payload is {payload_len} bytes"
            ))
            .into());
        }

        Ok((object_type, object_reader))
    }

    fn read_object(&self, object_id: &ObjectId, object_path: PathBuf) -> anyhow::Result<Bytes> {
        if !object_path.exists() {
            return Err(CoreError::NotFound(object_id.to_string()).into());
        }

        let object_content = std::fs::read(&object_path).map_err(CoreError::Storage)?;

        Self::decompress(object_id, object_content.into())
    }

    fn write_object(&self, object_path: PathBuf, object_content: Bytes) -> anyhow::Result<()> {
        let object_dir = object_path.parent().context("invalid object path")?;
        let temp_object_path = object_dir.join(Self::generate_temp_name());

        let object_content = Self::compress(object_content)?;

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&temp_object_path)
            .map_err(CoreError::Storage)?;
        file.write_all(&object_content).map_err(CoreError::Storage)?;

        // rename makes the object visible atomically
        std::fs::rename(&temp_object_path, &object_path).map_err(CoreError::Storage)?;

        Ok(())
    }

    fn compress(data: Bytes) -> anyhow::Result<Bytes> {
        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder
            .write_all(&data)
            .context("unable to compress object content")?;

        encoder
            .finish()
            .map(|compressed| compressed.into())
            .context("unable to finish compressing object content")
    }

    fn decompress(object_id: &ObjectId, data: Bytes) -> anyhow::Result<Bytes> {
        let mut decoder = flate2::read::ZlibDecoder::new(&*data);
        let mut decompressed = Vec::new();
        decoder
            .read_to_end(&mut decompressed)
            .map_err(|_| CoreError::CorruptObject(object_id.to_string()))?;

        Ok(decompressed.into())
    }

    fn generate_temp_name() -> String {
        format!("tmp-obj-{}", rand::random::<u32>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::objects::object::Packable;
    use bytes::Bytes;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn database() -> (tempfile::TempDir, Database) {
        let dir = tempfile::tempdir().unwrap();
        let database = Database::new(dir.path().to_path_buf().into_boxed_path());
        (dir, database)
    }

    #[rstest]
    fn store_and_load_round_trip(database: (tempfile::TempDir, Database)) {
        let (_dir, database) = database;
        let blob = Blob::new(Bytes::from_static(b"payload"));

        let oid = database.store(&blob, true).unwrap();
        let loaded = database.parse_object_as_blob(&oid).unwrap().unwrap();
        assert_eq!(loaded, blob);
    }

    #[rstest]
    fn dry_run_computes_hash_without_writing(database: (tempfile::TempDir, Database)) {
        let (_dir, database) = database;
        let blob = Blob::new(Bytes::from_static(b"ephemeral"));

        let dry_oid = database.store(&blob, false).unwrap();
        assert!(!database.contains(&dry_oid));

        let stored_oid = database.store(&blob, true).unwrap();
        assert_eq!(dry_oid, stored_oid);
        assert!(database.contains(&stored_oid));
    }

    #[rstest]
    fn second_write_is_a_noop(database: (tempfile::TempDir, Database)) {
        let (_dir, database) = database;
        let blob = Blob::new(Bytes::from_static(b"idempotent"));

        let oid = database.store(&blob, true).unwrap();
        let object_path = database.objects_path().join(oid.to_path());
        let first_bytes = std::fs::read(&object_path).unwrap();
        let first_mtime = std::fs::metadata(&object_path).unwrap().modified().unwrap();

        database.store(&blob, true).unwrap();
        assert_eq!(std::fs::read(&object_path).unwrap(), first_bytes);
        assert_eq!(
            std::fs::metadata(&object_path).unwrap().modified().unwrap(),
            first_mtime
        );
    }

    #[rstest]
    fn missing_object_is_not_found(database: (tempfile::TempDir, Database)) {
        let (_dir, database) = database;
        let oid = ObjectId::try_parse("0".repeat(40)).unwrap();

        let err = database.load(&oid).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CoreError>(),
            Some(CoreError::NotFound(_))
        ));
    }

    #[rstest]
    fn garbage_bytes_are_corrupt(database: (tempfile::TempDir, Database)) {
        let (_dir, database) = database;
        let oid = ObjectId::try_parse("ab".to_string() + &"0".repeat(38)).unwrap();
        let object_path = database.objects_path().join(oid.to_path());
        std::fs::create_dir_all(object_path.parent().unwrap()).unwrap();
        std::fs::write(&object_path, b"not zlib data").unwrap();

        let err = database.load(&oid).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CoreError>(),
            Some(CoreError::CorruptObject(_))
        ));
    }

    #[rstest]
    fn declared_size_mismatch_is_malformed(database: (tempfile::TempDir, Database)) {
        let (_dir, database) = database;

        // a blob framed with the wrong declared length
        let framed = Bytes::from_static(b"blob 99\0short");
        let mut hasher = <sha1::Sha1 as sha1::Digest>::new();
        sha1::Digest::update(&mut hasher, &framed);
        let oid = ObjectId::try_parse(format!("{:x}", sha1::Digest::finalize(hasher))).unwrap();

        let object_path = database.objects_path().join(oid.to_path());
        std::fs::create_dir_all(object_path.parent().unwrap()).unwrap();
        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(&framed).unwrap();
        std::fs::write(&object_path, encoder.finish().unwrap()).unwrap();

        let err = database.parse_object(&oid).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CoreError>(),
            Some(CoreError::MalformedObject(_))
        ));
    }

    #[rstest]
    fn prefix_resolution_distinguishes_unique_and_ambiguous(
        database: (tempfile::TempDir, Database),
    ) {
        let (_dir, database) = database;

        let first = database
            .store(&Blob::new(Bytes::from_static(b"one")), true)
            .unwrap();
        let second = database
            .store(&Blob::new(Bytes::from_static(b"two")), true)
            .unwrap();

        // a unique 8-char prefix resolves to its object
        let resolved = database.resolve_prefix(&first.as_ref()[..8]).unwrap();
        assert_eq!(resolved, first);

        let err = database.resolve_prefix("zzzz").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CoreError>(),
            Some(CoreError::NotFound(_))
        ));

        // force an ambiguous prefix by planting a sibling in first's fan-out dir
        let sibling_hex = format!("{}{}", &first.as_ref()[..4], &second.as_ref()[4..]);
        let sibling = ObjectId::try_parse(sibling_hex).unwrap();
        let sibling_path = database.objects_path().join(sibling.to_path());
        std::fs::create_dir_all(sibling_path.parent().unwrap()).unwrap();
        std::fs::write(&sibling_path, b"").unwrap();

        let err = database.resolve_prefix(&first.as_ref()[..4]).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CoreError>(),
            Some(CoreError::AmbiguousHash { .. })
        ));
    }

    #[rstest]
    fn load_payload_strips_framing(database: (tempfile::TempDir, Database)) {
        let (_dir, database) = database;
        let blob = Blob::new(Bytes::from_static(b"raw payload"));
        let oid = database.store(&blob, true).unwrap();

        let (object_type, payload) = database.load_payload(&oid).unwrap();
        assert_eq!(object_type, ObjectType::Blob);
        assert_eq!(&payload[..], b"raw payload");

        let full = database.load(&oid).unwrap();
        assert_eq!(full, blob.serialize().unwrap());
    }
}
