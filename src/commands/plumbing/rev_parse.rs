use crate::areas::repository::Repository;
use crate::artifacts::objects::object_type::ObjectType;
use std::io::Write;

impl Repository {
    /// Resolve a name (`HEAD`, a ref, a full or abbreviated hash) to its
    /// object id, optionally constrained to a type by peeling.
    pub fn rev_parse(&self, name: &str, kind: Option<ObjectType>) -> anyhow::Result<()> {
        let oid = match kind {
            Some(object_type) => self.refs().resolve_as(name, object_type, self.database())?,
            None => self.refs().resolve(name, self.database())?,
        };

        writeln!(self.writer(), "{oid}")?;

        Ok(())
    }
}
