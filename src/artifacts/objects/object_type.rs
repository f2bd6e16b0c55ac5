use crate::errors::CoreError;
use std::io::BufRead;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectType {
    Blob,
    Tree,
    Commit,
    Tag,
}

impl ObjectType {
    pub fn as_str(&self) -> &str {
        match self {
            ObjectType::Blob => "blob",
            ObjectType::Tree => "tree",
            ObjectType::Commit => "commit",
            ObjectType::Tag => "tag",
        }
    }

    /// Parse the `<type> <size>\0` framing header, leaving the reader
    /// positioned at the payload. Returns the type and the declared payload
    /// length so the caller can check it against the actual byte count.
    pub fn parse_header(data_reader: &mut impl BufRead) -> anyhow::Result<(ObjectType, usize)> {
        let mut type_bytes = Vec::new();
        data_reader.read_until(b' ', &mut type_bytes)?;
        if type_bytes.pop() != Some(b' ') {
            return Err(CoreError::MalformedObject("missing type delimiter".to_string()).into());
        }

        let object_type = std::str::from_utf8(&type_bytes)
            .map_err(|_| CoreError::MalformedObject("non-ascii object type".to_string()))?;
        let object_type = ObjectType::try_from(object_type)?;

        let mut size_bytes = Vec::new();
        data_reader.read_until(b'\0', &mut size_bytes)?;
        if size_bytes.pop() != Some(b'\0') {
            return Err(CoreError::MalformedObject("missing size delimiter".to_string()).into());
        }

        let size = std::str::from_utf8(&size_bytes)
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .ok_or_else(|| CoreError::MalformedObject("invalid declared size".to_string()))?;

        Ok((object_type, size))
    }
}

impl TryFrom<&str> for ObjectType {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> anyhow::Result<Self> {
        match value {
            "blob" => Ok(ObjectType::Blob),
            "tree" => Ok(ObjectType::Tree),
            "commit" => Ok(ObjectType::Commit),
            "tag" => Ok(ObjectType::Tag),
            other => {
                Err(CoreError::MalformedObject(format!("unknown object type {other}")).into())
            }
        }
    }
}

impl std::fmt::Display for ObjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    #[test]
    fn parses_type_and_declared_size() {
        let mut reader = Cursor::new(b"blob 11\0hello world".to_vec());
        let (object_type, size) = ObjectType::parse_header(&mut reader).unwrap();

        assert_eq!(object_type, ObjectType::Blob);
        assert_eq!(size, 11);
    }

    #[test]
    fn rejects_unknown_type_and_bad_size() {
        let mut reader = Cursor::new(b"sock 3\0abc".to_vec());
        assert!(ObjectType::parse_header(&mut reader).is_err());

        let mut reader = Cursor::new(b"blob x\0abc".to_vec());
        assert!(ObjectType::parse_header(&mut reader).is_err());
    }

    #[test]
    fn rejects_truncated_header() {
        let mut reader = Cursor::new(b"blob 3".to_vec());
        assert!(ObjectType::parse_header(&mut reader).is_err());
    }
}
