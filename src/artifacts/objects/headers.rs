//! Header/message grammar shared by commits and tags
//!
//! The payload of a commit or tag is a sequence of `key value` lines followed
//! by a blank line and a free-text message. A value may span multiple lines:
//! every following line that starts with a space is a continuation of the
//! previous value (this is how `gpgsig` blocks are stored). The same key may
//! appear more than once (`parent` in merge commits).
//!
//! Modeled as an ordered list of key/value pairs plus the message, so
//! serialization is the exact inverse of parsing.

use crate::errors::CoreError;
use bytes::Bytes;
use std::io::Write;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeaderRecord {
    fields: Vec<(String, String)>,
    message: String,
}

impl HeaderRecord {
    pub fn new(fields: Vec<(String, String)>, message: String) -> Self {
        HeaderRecord { fields, message }
    }

    pub fn parse(payload: &[u8]) -> anyhow::Result<Self> {
        let text = std::str::from_utf8(payload)
            .map_err(|_| CoreError::MalformedObject("header record is not utf-8".to_string()))?;

        let mut fields: Vec<(String, String)> = Vec::new();
        let mut rest = text;

        loop {
            let Some(newline) = rest.find('\n') else {
                return Err(CoreError::MalformedObject(
                    "missing blank line before message".to_string(),
                )
                .into());
            };
            let line = &rest[..newline];
            rest = &rest[newline + 1..];

            if line.is_empty() {
                break;
            }

            if let Some(continuation) = line.strip_prefix(' ') {
                let Some(last) = fields.last_mut() else {
                    return Err(CoreError::MalformedObject(
                        "continuation line without a preceding header".to_string(),
                    )
                    .into());
                };
                last.1.push('\n');
                last.1.push_str(continuation);
            } else {
                let Some((key, value)) = line.split_once(' ') else {
                    return Err(CoreError::MalformedObject(format!(
                        "header line without value: {line}"
                    ))
                    .into());
                };
                fields.push((key.to_string(), value.to_string()));
            }
        }

        Ok(HeaderRecord {
            fields,
            message: rest.to_string(),
        })
    }

    /// Exact inverse of [`HeaderRecord::parse`].
    pub fn serialize(&self) -> anyhow::Result<Bytes> {
        let mut bytes = Vec::new();

        for (key, value) in &self.fields {
            let value = value.replace('\n', "\n ");
            writeln!(bytes, "{key} {value}")?;
        }
        writeln!(bytes)?;
        bytes.write_all(self.message.as_bytes())?;

        Ok(Bytes::from(bytes))
    }

    /// First value recorded under `key`, if any.
    pub fn first(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// All values recorded under `key`, in file order.
    pub fn values<'r>(&'r self, key: &'r str) -> impl Iterator<Item = &'r str> {
        self.fields
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}
