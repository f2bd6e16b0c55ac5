use crate::areas::repository::Repository;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object::Unpackable;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tag::Tag;
use crate::artifacts::objects::tree::Tree;
use crate::errors::CoreError;
use std::io::Write;
use std::path::Path;

impl Repository {
    /// Hash a file's content as an object of the given type and print the
    /// resulting id. Without `write` the hash is computed but nothing is
    /// stored. Non-blob types expect the file to hold a valid payload.
    pub fn hash_object(
        &self,
        path: &Path,
        object_type: ObjectType,
        write: bool,
    ) -> anyhow::Result<()> {
        let content = std::fs::read(path).map_err(CoreError::Storage)?;

        let oid = match object_type {
            ObjectType::Blob => self.database().store(&Blob::new(content.into()), write)?,
            ObjectType::Tree => self.database().store(&Tree::deserialize(&content[..])?, write)?,
            ObjectType::Commit => self
                .database()
                .store(&Commit::deserialize(&content[..])?, write)?,
            ObjectType::Tag => self.database().store(&Tag::deserialize(&content[..])?, write)?,
        };

        writeln!(self.writer(), "{oid}")?;

        Ok(())
    }
}
