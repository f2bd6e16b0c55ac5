//! Object identifier (SHA-1 hash)
//!
//! Object ids are 40-character lowercase hexadecimal strings. On disk they are
//! split as `objects/<first-2-chars>/<remaining-38-chars>` to bound directory
//! fan-out.

use crate::artifacts::objects::{MIN_PREFIX_LENGTH, OBJECT_ID_LENGTH};
use crate::errors::CoreError;
use std::io;
use std::path::PathBuf;

/// A validated 40-hex-character object id
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct ObjectId(String);

impl ObjectId {
    /// Parse and validate an object id, normalizing to lowercase.
    pub fn try_parse(id: String) -> anyhow::Result<Self> {
        if id.len() != OBJECT_ID_LENGTH {
            return Err(CoreError::MalformedObject(format!(
                "invalid object id length: {}",
                id.len()
            ))
            .into());
        }
        if !id.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(CoreError::MalformedObject(format!("invalid object id: {id}")).into());
        }
        Ok(Self(id.to_ascii_lowercase()))
    }

    /// True when `candidate` could be an abbreviated hash (4 to 40 hex chars).
    pub fn is_prefix_candidate(candidate: &str) -> bool {
        (MIN_PREFIX_LENGTH..=OBJECT_ID_LENGTH).contains(&candidate.len())
            && candidate.chars().all(|c| c.is_ascii_hexdigit())
    }

    /// Write the id in binary form (20 bytes), as used inside tree entries
    /// and index records.
    pub fn write_raw_to<W: io::Write>(&self, writer: &mut W) -> anyhow::Result<()> {
        for i in (0..OBJECT_ID_LENGTH).step_by(2) {
            let byte = u8::from_str_radix(&self.0[i..i + 2], 16)
                .map_err(|_| io::Error::new(io::ErrorKind::InvalidInput, "invalid hex digit"))?;
            writer.write_all(&[byte])?;
        }

        Ok(())
    }

    /// Read an id from its 20-byte binary form.
    pub fn read_raw_from<R: io::Read + ?Sized>(reader: &mut R) -> anyhow::Result<Self> {
        let mut raw = [0u8; OBJECT_ID_LENGTH / 2];
        reader.read_exact(&mut raw)?;

        let mut hex = String::with_capacity(OBJECT_ID_LENGTH);
        for byte in raw {
            hex.push_str(&format!("{byte:02x}"));
        }

        Self::try_parse(hex)
    }

    /// Relative storage path: `XX/YYYY...` with the first two chars as the
    /// directory name.
    pub fn to_path(&self) -> PathBuf {
        let (dir, file) = self.0.split_at(2);
        PathBuf::from(dir).join(file)
    }
}

impl AsRef<str> for ObjectId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}
