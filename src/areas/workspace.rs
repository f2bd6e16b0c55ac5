//! Working tree access
//!
//! All reads of live files and their stat metadata go through here, so the
//! rest of the crate only ever sees repository-relative paths.

use crate::artifacts::index::entry_mode::EntryMode;
use crate::artifacts::index::index_entry::EntryMetadata;
use crate::errors::CoreError;
use anyhow::Context;
use derive_new::new;
use is_executable::IsExecutable;
use std::os::unix::fs::MetadataExt;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug, new)]
pub struct Workspace {
    /// Repository root (the directory containing `.git`)
    path: Box<Path>,
}

impl Workspace {
    pub fn root(&self) -> &Path {
        &self.path
    }

    /// All regular files under the root, as repository-relative paths in
    /// byte order, with the git directory excluded.
    pub fn list_files(&self) -> anyhow::Result<Vec<PathBuf>> {
        let mut files = Vec::new();

        let walker = WalkDir::new(&self.path)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(|entry| entry.file_name() != ".git");

        for entry in walker {
            let entry = entry.map_err(|err| {
                CoreError::Storage(err.into_io_error().unwrap_or_else(|| {
                    std::io::Error::other("walk failed on a symlink loop")
                }))
            })?;

            if entry.file_type().is_file() {
                let relative = entry
                    .path()
                    .strip_prefix(&self.path)
                    .context("walked outside the workspace root")?;
                files.push(relative.to_path_buf());
            }
        }

        Ok(files)
    }

    /// Stat a workspace file, translated into the metadata shape the index
    /// records.
    pub fn stat_file(&self, relative: &Path) -> anyhow::Result<EntryMetadata> {
        let absolute = self.path.join(relative);
        let stat = std::fs::metadata(&absolute).map_err(CoreError::Storage)?;

        let mode = if absolute.is_executable() {
            EntryMode::Executable
        } else {
            EntryMode::Regular
        };

        Ok(EntryMetadata {
            ctime: stat.ctime(),
            ctime_nsec: stat.ctime_nsec(),
            mtime: stat.mtime(),
            mtime_nsec: stat.mtime_nsec(),
            dev: stat.dev(),
            ino: stat.ino(),
            mode,
            uid: stat.uid(),
            gid: stat.gid(),
            size: stat.size(),
        })
    }

}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    struct World {
        _dir: tempfile::TempDir,
        workspace: Workspace,
    }

    #[fixture]
    fn world() -> World {
        let dir = tempfile::tempdir().unwrap();
        let workspace = Workspace::new(dir.path().to_path_buf().into_boxed_path());
        World {
            _dir: dir,
            workspace,
        }
    }

    #[rstest]
    fn lists_files_recursively_excluding_git_dir(world: World) {
        let root = world.workspace.root().to_path_buf();
        std::fs::create_dir_all(root.join("src")).unwrap();
        std::fs::create_dir_all(root.join(".git/objects")).unwrap();
        std::fs::write(root.join("README.md"), "hi").unwrap();
        std::fs::write(root.join("src/lib.rs"), "pub fn f() {}").unwrap();
        std::fs::write(root.join(".git/objects/ignored"), "x").unwrap();

        let files = world.workspace.list_files().unwrap();
        assert_eq!(
            files,
            vec![PathBuf::from("README.md"), PathBuf::from("src/lib.rs")]
        );
    }

    #[rstest]
    fn stat_records_size_and_mode(world: World) {
        let root = world.workspace.root().to_path_buf();
        std::fs::write(root.join("file.txt"), "12345").unwrap();

        let metadata = world.workspace.stat_file(Path::new("file.txt")).unwrap();
        assert_eq!(metadata.size, 5);
        assert_eq!(metadata.mode, EntryMode::Regular);
    }

    #[rstest]
    fn missing_file_is_a_storage_error(world: World) {
        let err = world.workspace.stat_file(Path::new("ghost")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CoreError>(),
            Some(CoreError::Storage(_))
        ));
    }
}
