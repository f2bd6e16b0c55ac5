use crate::areas::refs::RefNode;
use crate::areas::repository::Repository;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

impl Repository {
    /// Without a name, list existing tag names. With one, create a tag
    /// pointing at `target`: a plain ref by default, or a stored tag object
    /// when `annotated` is set.
    pub fn tag(
        &self,
        name: Option<&str>,
        target: &str,
        annotated: bool,
        message: Option<&str>,
    ) -> anyhow::Result<()> {
        match name {
            None => {
                let refs = self.refs().find_all()?;
                if let Some(RefNode::Dir(tags)) = refs.get("tags") {
                    self.print_tag_names(tags, Path::new(""))?;
                }
            }
            Some(name) => {
                let target = self.refs().resolve(target, self.database())?;
                self.refs()
                    .create_tag(name, &target, annotated, message, self.database())?;
            }
        }

        Ok(())
    }

    fn print_tag_names(
        &self,
        nodes: &BTreeMap<String, RefNode>,
        prefix: &Path,
    ) -> anyhow::Result<()> {
        for (name, node) in nodes {
            let path = prefix.join(name);
            match node {
                RefNode::Leaf(_) => writeln!(self.writer(), "{}", path.display())?,
                RefNode::Dir(children) => self.print_tag_names(children, &path)?,
            }
        }

        Ok(())
    }
}
