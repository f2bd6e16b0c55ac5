//! Staging snapshot (index) binary format, version 2
//!
//! ```text
//! Header (12 bytes):
//!   - Signature: "DIRC" (4 bytes)
//!   - Version: 2 (4 bytes)
//!   - Entry count (4 bytes)
//!
//! Entries (variable length, 8-byte aligned):
//!   - 62 bytes of stat metadata, object id and flags
//!   - NUL-terminated path, padded with NULs
//!
//! Extensions (optional):
//!   - 4-byte uppercase signature (e.g. "TREE"), 4-byte length, payload
//!
//! Checksum (20 bytes):
//!   - SHA-1 over every preceding byte
//! ```
//!
//! This core only reads the index; it is rewritten by the staging operation,
//! which is an external collaborator. The serializers exist for fixtures and
//! round-trip tests.

pub mod checksum;
pub mod entry_mode;
pub mod index_entry;
pub mod index_header;

/// Size of the trailing SHA-1 checksum in bytes
pub const CHECKSUM_SIZE: usize = 20;

/// Size of the index header in bytes
pub const HEADER_SIZE: usize = 12;

/// Size of an extension block header (signature + length) in bytes
pub const EXTENSION_HEADER_SIZE: usize = 8;

/// Magic signature identifying index files
pub const SIGNATURE: &str = "DIRC";

/// Supported index format version
pub const VERSION: u32 = 2;
