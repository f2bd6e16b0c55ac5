//! Annotated tag object
//!
//! Same header/message grammar as commits, with required keys `object`,
//! `type`, `tag` and `tagger`. Lightweight tags are plain refs and never
//! produce one of these.

use crate::artifacts::objects::commit::Author;
use crate::artifacts::objects::headers::HeaderRecord;
use crate::artifacts::objects::object::Unpackable;
use crate::artifacts::objects::object::{Object, Packable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::CoreError;
use bytes::Bytes;
use std::io::{BufRead, Write};

const REQUIRED_KEYS: [&str; 4] = ["object", "type", "tag", "tagger"];

#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Tag {
    record: HeaderRecord,
}

impl Tag {
    /// Build an annotated tag pointing at `target` of `target_type`.
    pub fn new(
        name: &str,
        target: &ObjectId,
        target_type: ObjectType,
        tagger: Author,
        message: String,
    ) -> Self {
        let fields = vec![
            ("object".to_string(), target.as_ref().to_string()),
            ("type".to_string(), target_type.as_str().to_string()),
            ("tag".to_string(), name.to_string()),
            ("tagger".to_string(), tagger.display()),
        ];

        Tag {
            record: HeaderRecord::new(fields, message),
        }
    }

    /// The tagged object's id (one tag may point at another tag).
    pub fn object_oid(&self) -> anyhow::Result<ObjectId> {
        // presence is validated at deserialization
        let object = self
            .record
            .first("object")
            .ok_or_else(|| CoreError::MalformedObject("tag without object header".to_string()))?;
        ObjectId::try_parse(object.to_string())
    }

    pub fn target_type(&self) -> anyhow::Result<ObjectType> {
        let target_type = self
            .record
            .first("type")
            .ok_or_else(|| CoreError::MalformedObject("tag without type header".to_string()))?;
        ObjectType::try_from(target_type)
    }

    pub fn name(&self) -> &str {
        self.record.first("tag").unwrap_or("")
    }

    pub fn message(&self) -> &str {
        self.record.message()
    }
}

impl Packable for Tag {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let content_bytes = self.record.serialize()?;

        let mut tag_bytes = Vec::new();
        let header = format!("{} {}\0", self.object_type().as_str(), content_bytes.len());
        tag_bytes.write_all(header.as_bytes())?;
        tag_bytes.write_all(&content_bytes)?;

        Ok(Bytes::from(tag_bytes))
    }
}

impl Unpackable for Tag {
    fn deserialize(reader: impl BufRead) -> anyhow::Result<Self> {
        let payload = reader
            .bytes()
            .collect::<Result<Vec<u8>, std::io::Error>>()?;
        let record = HeaderRecord::parse(&payload)?;

        for key in REQUIRED_KEYS {
            if record.first(key).is_none() {
                return Err(
                    CoreError::MalformedObject(format!("tag without {key} header")).into(),
                );
            }
        }

        Ok(Tag { record })
    }
}

impl Object for Tag {
    fn object_type(&self) -> ObjectType {
        ObjectType::Tag
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use std::io::Cursor;

    fn tagger() -> Author {
        Author::try_from("T <t@example.com> 1700000000 +0000").unwrap()
    }

    #[rstest]
    fn round_trip() {
        let target = ObjectId::try_parse("e".repeat(40)).unwrap();
        let tag = Tag::new(
            "v1.0",
            &target,
            ObjectType::Commit,
            tagger(),
            "release\n".to_string(),
        );

        let bytes = tag.serialize().unwrap();
        let mut reader = Cursor::new(bytes);
        ObjectType::parse_header(&mut reader).unwrap();
        let back = Tag::deserialize(reader).unwrap();

        assert_eq!(back, tag);
        assert_eq!(back.object_oid().unwrap(), target);
        assert_eq!(back.target_type().unwrap(), ObjectType::Commit);
        assert_eq!(back.name(), "v1.0");
        assert_eq!(back.message(), "release\n");
    }

    #[rstest]
    #[case(b"type commit\ntag v1\ntagger T <t@t> 0 +0000\n\nm".to_vec())]
    #[case(b"object 1111111111111111111111111111111111111111\ntag v1\ntagger T <t@t> 0 +0000\n\nm".to_vec())]
    fn missing_required_keys_are_malformed(#[case] payload: Vec<u8>) {
        assert!(Tag::deserialize(Cursor::new(payload)).is_err());
    }
}
