use crate::areas::repository::Repository;
use crate::artifacts::log::rev_list::RevList;
use crate::artifacts::objects::object_type::ObjectType;
use std::io::Write;

impl Repository {
    /// Walk the commit graph from `name` (parents before-first, each commit
    /// shown once even through merges) and print every commit in medium
    /// format.
    pub fn log(&self, name: &str) -> anyhow::Result<()> {
        let start = self
            .refs()
            .resolve_as(name, ObjectType::Commit, self.database())?;

        for visited in RevList::new(self.database(), [start]) {
            let (oid, commit) = visited?;
            let author = commit.author()?;

            writeln!(self.writer(), "commit {oid}")?;
            writeln!(self.writer(), "Author: {}", author.display_name())?;
            writeln!(self.writer(), "Date:   {}", author.readable_timestamp())?;
            writeln!(self.writer())?;
            for message_line in commit.message().lines() {
                writeln!(self.writer(), "    {}", message_line)?;
            }
            writeln!(self.writer())?;
        }

        Ok(())
    }
}
