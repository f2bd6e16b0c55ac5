//! Object types and their codecs
//!
//! Everything the store holds is one of four object kinds, each framed on disk
//! as `<type> <size>\0<payload>` and identified by the SHA-1 of those exact
//! bytes:
//!
//! - **Blob**: opaque file content
//! - **Tree**: directory listing (mode, name, object id per entry)
//! - **Commit**: header record plus message
//! - **Tag**: annotated pointer at another object, same grammar as commits

pub mod blob;
pub mod commit;
pub mod headers;
pub mod object;
pub mod object_id;
pub mod object_type;
pub mod tag;
pub mod tree;

/// Length of a SHA-1 hash in hexadecimal format
pub const OBJECT_ID_LENGTH: usize = 40;

/// Shortest accepted abbreviated hash
pub const MIN_PREFIX_LENGTH: usize = 4;
