//! Commit graph walk
//!
//! Parent traversal over the commit graph using an explicit work-list and a
//! visited set keyed by object id, so shared ancestry (or the same start
//! given twice) yields each commit exactly once and arbitrarily deep
//! histories never exhaust the call stack.

use crate::areas::database::Database;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use std::collections::{HashSet, VecDeque};

pub struct RevList<'d> {
    database: &'d Database,
    queue: VecDeque<ObjectId>,
    visited: HashSet<ObjectId>,
}

impl<'d> RevList<'d> {
    pub fn new(database: &'d Database, starts: impl IntoIterator<Item = ObjectId>) -> Self {
        let mut rev_list = RevList {
            database,
            queue: VecDeque::new(),
            visited: HashSet::new(),
        };

        for start in starts {
            rev_list.enqueue(start);
        }

        rev_list
    }

    fn enqueue(&mut self, oid: ObjectId) {
        // visited is marked at enqueue time so duplicate starts and shared
        // ancestors are queued once
        if self.visited.insert(oid.clone()) {
            self.queue.push_back(oid);
        }
    }
}

impl Iterator for RevList<'_> {
    type Item = anyhow::Result<(ObjectId, Commit)>;

    fn next(&mut self) -> Option<Self::Item> {
        let oid = self.queue.pop_front()?;

        let commit = match self.database.parse_object_as_commit(&oid) {
            Ok(Some(commit)) => commit,
            Ok(None) => {
                return Some(Err(crate::errors::CoreError::TypeMismatch {
                    oid: oid.to_string(),
                    expected: "commit".to_string(),
                    actual: "non-commit".to_string(),
                }
                .into()));
            }
            Err(err) => return Some(Err(err)),
        };

        match commit.parents() {
            Ok(parents) => {
                for parent in parents {
                    self.enqueue(parent);
                }
            }
            Err(err) => return Some(Err(err)),
        }

        Some(Ok((oid, commit)))
    }
}
