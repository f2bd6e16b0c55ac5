use crate::areas::repository::Repository;
use crate::artifacts::objects::object_type::ObjectType;
use std::io::Write;

impl Repository {
    /// Print the raw payload of the object `name` resolves to, constrained
    /// to the requested type (annotated tags are peeled as needed). Payload
    /// bytes are written verbatim, without the framing header.
    pub fn cat_file(&self, object_type: ObjectType, name: &str) -> anyhow::Result<()> {
        let oid = self.refs().resolve_as(name, object_type, self.database())?;
        let (_, payload) = self.database().load_payload(&oid)?;

        self.writer().write_all(&payload)?;

        Ok(())
    }
}
