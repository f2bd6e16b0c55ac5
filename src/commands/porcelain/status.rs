use crate::areas::repository::Repository;
use std::io::Write;

impl Repository {
    /// Compare the staging snapshot against the working tree and print the
    /// result in short format: ` M <path>` for tracked files whose stat
    /// diverges (deleted ones included) and `?? <path>` for untracked files.
    pub fn status(&self) -> anyhow::Result<()> {
        let (modified, untracked) = {
            let mut index = self.index();
            index.rehydrate()?;
            index.compare_worktree(self.workspace())?
        };

        for path in &modified {
            writeln!(self.writer(), " M {}", path.display())?;
        }
        for path in &untracked {
            writeln!(self.writer(), "?? {}", path.display())?;
        }

        Ok(())
    }
}
