use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::refs::Refs;
use crate::areas::workspace::Workspace;
use crate::errors::CoreError;
use std::cell::{RefCell, RefMut};
use std::path::Path;

pub struct Repository {
    path: Box<Path>,
    writer: RefCell<Box<dyn std::io::Write>>,
    index: RefCell<Index>,
    database: Database,
    workspace: Workspace,
    refs: Refs,
}

impl Repository {
    /// Open the repository rooted at `path` (the directory containing
    /// `.git`).
    pub fn at(path: &Path, writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        let path = path.canonicalize().map_err(CoreError::Storage)?;
        let git_path = path.join(".git");

        if !git_path.is_dir() {
            return Err(CoreError::NotFound(format!(
                "no repository at {}",
                path.display()
            ))
            .into());
        }

        let index = Index::new(git_path.join("index").into_boxed_path());
        let database = Database::new(git_path.join("objects").into_boxed_path());
        let workspace = Workspace::new(path.clone().into_boxed_path());
        let refs = Refs::new(git_path.into_boxed_path());

        Ok(Repository {
            path: path.into_boxed_path(),
            writer: RefCell::new(writer),
            index: RefCell::new(index),
            database,
            workspace,
            refs,
        })
    }

    /// Walk up from `start` looking for a directory containing `.git`.
    pub fn discover(start: &Path, writer: Box<dyn std::io::Write>) -> anyhow::Result<Self> {
        let start = start.canonicalize().map_err(CoreError::Storage)?;

        let mut current = start.as_path();
        loop {
            if current.join(".git").is_dir() {
                return Self::at(current, writer);
            }
            current = match current.parent() {
                Some(parent) => parent,
                None => {
                    return Err(CoreError::NotFound(format!(
                        "no repository found above {}",
                        start.display()
                    ))
                    .into());
                }
            };
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn writer(&'_ self) -> RefMut<'_, Box<dyn std::io::Write>> {
        self.writer.borrow_mut()
    }

    pub fn index(&'_ self) -> RefMut<'_, Index> {
        self.index.borrow_mut()
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn refs(&self) -> &Refs {
        &self.refs
    }
}
