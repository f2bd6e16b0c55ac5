use crate::areas::repository::Repository;
use std::io::Write;

impl Repository {
    /// Print the staging snapshot, one entry per line in the shape of
    /// `ls-files --stage`: octal mode, blob id, merge stage, and path.
    pub fn cat_index(&self) -> anyhow::Result<()> {
        let mut index = self.index();
        index.rehydrate()?;

        for entry in index.entries() {
            writeln!(
                self.writer(),
                "{:0>6o} {} {}\t{}",
                entry.metadata.mode.as_u32(),
                entry.oid,
                entry.stage(),
                entry.name.display()
            )?;
        }

        Ok(())
    }
}
