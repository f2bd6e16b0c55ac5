#![allow(dead_code)]

use assert_cmd::Command;
use grit::areas::database::Database;
use grit::areas::workspace::Workspace;
use grit::artifacts::index::entry_mode::EntryMode;
use grit::artifacts::index::index_entry::IndexEntry;
use grit::artifacts::index::index_header::IndexHeader;
use grit::artifacts::index::{SIGNATURE, VERSION};
use grit::artifacts::objects::blob::Blob;
use grit::artifacts::objects::commit::{Author, Commit};
use grit::artifacts::objects::object::Object;
use grit::artifacts::objects::object_id::ObjectId;
use grit::artifacts::objects::tree::{Tree, TreeEntry};
use sha1::{Digest, Sha1};
use std::path::{Path, PathBuf};

/// A repository skeleton in a temp dir, populated through the library API
/// (there is no `init` command).
pub struct TestRepo {
    pub dir: assert_fs::TempDir,
}

impl TestRepo {
    pub fn init() -> Self {
        let dir = assert_fs::TempDir::new().unwrap();
        let git_path = dir.path().join(".git");
        std::fs::create_dir_all(git_path.join("objects")).unwrap();
        std::fs::create_dir_all(git_path.join("refs/heads")).unwrap();
        std::fs::create_dir_all(git_path.join("refs/tags")).unwrap();
        std::fs::write(git_path.join("HEAD"), "ref: refs/heads/main\n").unwrap();

        TestRepo { dir }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    pub fn database(&self) -> Database {
        Database::new(self.root().join(".git/objects").into_boxed_path())
    }

    pub fn workspace(&self) -> Workspace {
        Workspace::new(self.root().to_path_buf().into_boxed_path())
    }

    pub fn cmd(&self) -> Command {
        let mut cmd = Command::cargo_bin("grit").unwrap();
        cmd.current_dir(self.root());
        cmd
    }

    pub fn store_blob(&self, content: &[u8]) -> ObjectId {
        self.database()
            .store(&Blob::new(bytes::Bytes::copy_from_slice(content)), true)
            .unwrap()
    }

    pub fn store_tree(&self, entries: Vec<(EntryMode, &str, ObjectId)>) -> ObjectId {
        let entries = entries
            .into_iter()
            .map(|(mode, name, oid)| TreeEntry::new(mode, name.to_string(), oid))
            .collect();
        self.database().store(&Tree::new(entries), true).unwrap()
    }

    pub fn store_commit(
        &self,
        tree: ObjectId,
        parents: Vec<ObjectId>,
        message: &str,
    ) -> ObjectId {
        let commit = Commit::new(parents, tree, fixed_author(), message.to_string());
        self.database().store(&commit, true).unwrap()
    }

    pub fn write_ref(&self, ref_path: &str, oid: &ObjectId) {
        let full = self.root().join(".git").join(ref_path);
        std::fs::create_dir_all(full.parent().unwrap()).unwrap();
        std::fs::write(full, format!("{oid}\n")).unwrap();
    }

    pub fn set_head_branch(&self, oid: &ObjectId) {
        self.write_ref("refs/heads/main", oid);
    }

    pub fn write_file(&self, path: &str, content: &str) {
        let full = self.root().join(path);
        std::fs::create_dir_all(full.parent().unwrap()).unwrap();
        std::fs::write(full, content).unwrap();
    }

    /// An index entry whose stat metadata matches the file currently on disk.
    pub fn tracked_entry(&self, path: &str) -> IndexEntry {
        let metadata = self.workspace().stat_file(Path::new(path)).unwrap();
        let content = std::fs::read(self.root().join(path)).unwrap();
        let oid = Blob::new(content.into()).object_id().unwrap();

        IndexEntry::new(
            PathBuf::from(path),
            oid,
            metadata,
            IndexEntry::flags_for_path(Path::new(path)),
        )
    }

    /// Write a well-formed index file (header, entries, trailing checksum).
    pub fn write_index(&self, entries: &[IndexEntry]) {
        let mut body = Vec::new();
        body.extend_from_slice(
            &IndexHeader::new(SIGNATURE.to_string(), VERSION, entries.len() as u32)
                .serialize()
                .unwrap(),
        );
        for entry in entries {
            body.extend_from_slice(&entry.serialize().unwrap());
        }

        let digest = Sha1::digest(&body);
        body.extend_from_slice(&digest);
        std::fs::write(self.root().join(".git/index"), body).unwrap();
    }
}

pub fn fixed_author() -> Author {
    let offset = chrono::FixedOffset::east_opt(0).unwrap();
    Author::new_with_timestamp(
        "Test Author".to_string(),
        "test@example.com".to_string(),
        chrono::DateTime::from_timestamp(1_700_000_000, 0)
            .unwrap()
            .with_timezone(&offset),
    )
}
