use crate::areas::refs::RefNode;
use crate::areas::repository::Repository;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::Path;

impl Repository {
    /// Print every reference under `refs/` as `<oid> <path>`, in path order.
    pub fn show_ref(&self) -> anyhow::Result<()> {
        let refs = self.refs().find_all()?;
        self.print_ref_nodes(&refs, Path::new("refs"))
    }

    fn print_ref_nodes(
        &self,
        nodes: &BTreeMap<String, RefNode>,
        prefix: &Path,
    ) -> anyhow::Result<()> {
        for (name, node) in nodes {
            let path = prefix.join(name);
            match node {
                RefNode::Leaf(oid) => writeln!(self.writer(), "{oid} {}", path.display())?,
                RefNode::Dir(children) => self.print_ref_nodes(children, &path)?,
            }
        }

        Ok(())
    }
}
