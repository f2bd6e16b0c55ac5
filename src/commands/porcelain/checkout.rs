use crate::areas::repository::Repository;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::CoreError;
use anyhow::Context;
use std::path::Path;

impl Repository {
    /// Materialize the tree `name` resolves to (a commit is dereferenced
    /// through its tree) into `destination`, which must be an empty
    /// directory and is created when missing. A mid-walk failure leaves the
    /// files written so far in place.
    pub fn checkout(&self, name: &str, destination: &Path) -> anyhow::Result<()> {
        let root = self
            .refs()
            .resolve_as(name, ObjectType::Tree, self.database())?;

        if destination.exists() {
            if !destination.is_dir() {
                return Err(CoreError::DestinationNotDirectory(destination.to_path_buf()).into());
            }
            let mut entries = std::fs::read_dir(destination).map_err(CoreError::Storage)?;
            if entries.next().is_some() {
                return Err(CoreError::DestinationNotEmpty(destination.to_path_buf()).into());
            }
        } else {
            std::fs::create_dir_all(destination).map_err(CoreError::Storage)?;
        }

        self.materialize_tree(root, destination)
    }

    fn materialize_tree(&self, root: ObjectId, destination: &Path) -> anyhow::Result<()> {
        // explicit work list; order within a directory does not matter
        let mut pending = vec![(root, destination.to_path_buf())];

        while let Some((tree_oid, dir)) = pending.pop() {
            let tree = self
                .database()
                .parse_object_as_tree(&tree_oid)?
                .context("tree entry does not point at a tree")?;

            for entry in tree.into_entries() {
                let path = dir.join(&entry.name);

                if entry.mode.is_tree() {
                    std::fs::create_dir(&path).map_err(CoreError::Storage)?;
                    pending.push((entry.oid, path));
                } else {
                    let blob = self
                        .database()
                        .parse_object_as_blob(&entry.oid)?
                        .context("tree entry does not point at a blob")?;
                    std::fs::write(&path, blob.content()).map_err(CoreError::Storage)?;
                }
            }
        }

        Ok(())
    }
}
