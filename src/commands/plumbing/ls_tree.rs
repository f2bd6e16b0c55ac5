use crate::areas::repository::Repository;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use std::io::Write;
use std::path::Path;

impl Repository {
    /// List the entries of the tree `name` resolves to, one line per entry:
    /// zero-padded octal mode, entry type, object id, and path. With
    /// `recursive` set, subtrees are descended into instead of listed.
    pub fn ls_tree(&self, name: &str, recursive: bool) -> anyhow::Result<()> {
        let root = self
            .refs()
            .resolve_as(name, ObjectType::Tree, self.database())?;

        self.print_tree(&root, Path::new(""), recursive)
    }

    fn print_tree(&self, oid: &ObjectId, prefix: &Path, recursive: bool) -> anyhow::Result<()> {
        let tree = self
            .database()
            .parse_object_as_tree(oid)?
            .context("tree entry does not point at a tree")?;

        for entry in tree.into_entries() {
            let path = prefix.join(&entry.name);

            if entry.mode.is_tree() && recursive {
                self.print_tree(&entry.oid, &path, recursive)?;
            } else {
                let entry_type = if entry.mode.is_tree() { "tree" } else { "blob" };
                writeln!(
                    self.writer(),
                    "{:0>6} {} {}\t{}",
                    entry.mode.as_octal_str(),
                    entry_type,
                    entry.oid,
                    path.display()
                )?;
            }
        }

        Ok(())
    }
}
