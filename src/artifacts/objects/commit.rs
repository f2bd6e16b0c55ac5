//! Commit object
//!
//! A commit records a tree snapshot plus metadata. Its payload is a header
//! record (`tree`, zero or more `parent`, `author`, `committer`, optionally
//! `gpgsig` and others) followed by a blank line and the message; see
//! [`crate::artifacts::objects::headers`] for the grammar.

use crate::artifacts::objects::headers::HeaderRecord;
use crate::artifacts::objects::object::Unpackable;
use crate::artifacts::objects::object::{Object, Packable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::errors::CoreError;
use bytes::Bytes;
use std::io::{BufRead, Write};

/// Author or committer identity with timestamp
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Author {
    name: String,
    email: String,
    timestamp: chrono::DateTime<chrono::FixedOffset>,
}

impl Author {
    pub fn new(name: String, email: String) -> Self {
        Author {
            name,
            email,
            timestamp: chrono::Local::now().fixed_offset(),
        }
    }

    pub fn new_with_timestamp(
        name: String,
        email: String,
        timestamp: chrono::DateTime<chrono::FixedOffset>,
    ) -> Self {
        Author {
            name,
            email,
            timestamp,
        }
    }

    /// Identity as stored in commit and tag headers:
    /// `Name <email> <unix-seconds> <tz-offset>`
    pub fn display(&self) -> String {
        format!(
            "{} <{}> {} {}",
            self.name,
            self.email,
            self.timestamp.timestamp(),
            self.timestamp.format("%z")
        )
    }

    /// Human-readable form for `log` output, e.g. `Mon Jan 1 12:34:56 2024 +0000`.
    pub fn readable_timestamp(&self) -> String {
        self.timestamp
            .format("%a %b %-d %H:%M:%S %Y %z")
            .to_string()
    }

    pub fn display_name(&self) -> String {
        format!("{} <{}>", self.name, self.email)
    }

    /// Identity from GIT_AUTHOR_NAME / GIT_AUTHOR_EMAIL, falling back to a
    /// fixed placeholder so read-only commands never fail on a bare
    /// environment.
    pub fn load_from_env() -> Self {
        let name = std::env::var("GIT_AUTHOR_NAME").unwrap_or_else(|_| "grit".to_string());
        let email =
            std::env::var("GIT_AUTHOR_EMAIL").unwrap_or_else(|_| "grit@localhost".to_string());
        Author::new(name, email)
    }
}

impl TryFrom<&str> for Author {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        // "Name <email> timestamp timezone", split from the right so names
        // may contain spaces
        let parts: Vec<&str> = value.rsplitn(3, ' ').collect();
        if parts.len() < 3 {
            return Err(CoreError::MalformedObject(format!("invalid author: {value}")).into());
        }

        let timezone = parts[0];
        let timestamp = parts[1]
            .parse::<i64>()
            .map_err(|_| CoreError::MalformedObject(format!("invalid author timestamp: {value}")))?;
        let name_email = parts[2];

        let email_start = name_email.find('<');
        let email_end = name_email.find('>');
        let (Some(email_start), Some(email_end)) = (email_start, email_end) else {
            return Err(CoreError::MalformedObject(format!("invalid author: {value}")).into());
        };

        let name = name_email[..email_start].trim().to_string();
        let email = name_email[email_start + 1..email_end].to_string();

        let offset = parse_tz_offset(timezone)
            .ok_or_else(|| CoreError::MalformedObject(format!("invalid timezone: {timezone}")))?;
        let datetime = chrono::DateTime::from_timestamp(timestamp, 0)
            .ok_or_else(|| CoreError::MalformedObject(format!("invalid timestamp: {timestamp}")))?
            .with_timezone(&offset);

        Ok(Author {
            name,
            email,
            timestamp: datetime,
        })
    }
}

/// Parse a `+HHMM` / `-HHMM` timezone suffix.
fn parse_tz_offset(tz: &str) -> Option<chrono::FixedOffset> {
    let (sign, digits) = tz.split_at_checked(1)?;
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    let seconds = hours * 3600 + minutes * 60;

    match sign {
        "+" => chrono::FixedOffset::east_opt(seconds),
        "-" => chrono::FixedOffset::west_opt(seconds),
        _ => None,
    }
}

/// Commit object wrapping its header record
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Commit {
    record: HeaderRecord,
}

impl Commit {
    /// Build a commit with the canonical header layout.
    pub fn new(
        parents: Vec<ObjectId>,
        tree_oid: ObjectId,
        author: Author,
        message: String,
    ) -> Self {
        let mut fields = vec![("tree".to_string(), tree_oid.as_ref().to_string())];
        for parent in &parents {
            fields.push(("parent".to_string(), parent.as_ref().to_string()));
        }
        fields.push(("author".to_string(), author.display()));
        fields.push(("committer".to_string(), author.display()));

        Commit {
            record: HeaderRecord::new(fields, message),
        }
    }

    pub fn tree_oid(&self) -> anyhow::Result<ObjectId> {
        let tree = self
            .record
            .first("tree")
            .ok_or_else(|| CoreError::MalformedObject("commit without tree header".to_string()))?;
        ObjectId::try_parse(tree.to_string())
    }

    pub fn parents(&self) -> anyhow::Result<Vec<ObjectId>> {
        self.record
            .values("parent")
            .map(|parent| ObjectId::try_parse(parent.to_string()))
            .collect()
    }

    pub fn author(&self) -> anyhow::Result<Author> {
        let author = self
            .record
            .first("author")
            .ok_or_else(|| CoreError::MalformedObject("commit without author header".to_string()))?;
        Author::try_from(author)
    }

    pub fn message(&self) -> &str {
        self.record.message()
    }

    pub fn short_message(&self) -> String {
        self.record.message().lines().next().unwrap_or("").to_string()
    }
}

impl Packable for Commit {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let content_bytes = self.record.serialize()?;

        let mut commit_bytes = Vec::new();
        let header = format!("{} {}\0", self.object_type().as_str(), content_bytes.len());
        commit_bytes.write_all(header.as_bytes())?;
        commit_bytes.write_all(&content_bytes)?;

        Ok(Bytes::from(commit_bytes))
    }
}

impl Unpackable for Commit {
    fn deserialize(reader: impl BufRead) -> anyhow::Result<Self> {
        let payload = reader
            .bytes()
            .collect::<Result<Vec<u8>, std::io::Error>>()?;
        let record = HeaderRecord::parse(&payload)?;

        if record.first("tree").is_none() {
            return Err(CoreError::MalformedObject("commit without tree header".to_string()).into());
        }

        Ok(Commit { record })
    }
}

impl Object for Commit {
    fn object_type(&self) -> ObjectType {
        ObjectType::Commit
    }
}
