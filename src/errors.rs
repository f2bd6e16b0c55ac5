//! Error taxonomy for the object store core
//!
//! Every failure the core can produce is one of these variants. Functions keep
//! `anyhow::Result` signatures and raise `CoreError` values through them, so
//! callers (and tests) can downcast to the concrete variant while command code
//! still enjoys `.context(...)` at I/O boundaries. The core never prints or
//! logs; turning errors into messages and exit codes is the CLI's job.

use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    /// The name or hash has no referent in the repository.
    #[error("not found: {0}")]
    NotFound(String),

    /// A short hash prefix matched more than one stored object.
    #[error("short hash {prefix} is ambiguous ({count} objects match)")]
    AmbiguousHash { prefix: String, count: usize },

    /// A name resolved to more than one distinct object through the ref
    /// candidate paths.
    #[error("reference {name} is ambiguous: {}", candidates.join(", "))]
    AmbiguousReference {
        name: String,
        candidates: Vec<String>,
    },

    /// The object's bytes violate the expected grammar (bad header, length
    /// mismatch, malformed tree entry or commit record).
    #[error("malformed object: {0}")]
    MalformedObject(String),

    /// The object file could not be inflated.
    #[error("corrupt object: {0}")]
    CorruptObject(String),

    /// The index file violates its binary layout or checksum.
    #[error("corrupt index: {0}")]
    CorruptIndex(String),

    /// The resolved object's type disagrees with what the caller required,
    /// even after peeling tags.
    #[error("object {oid} is a {actual}, expected {expected}")]
    TypeMismatch {
        oid: String,
        expected: String,
        actual: String,
    },

    /// Symbolic reference indirection exceeded its depth bound.
    #[error("symbolic reference chain exceeds {0} hops")]
    RefCycle(usize),

    /// Checkout destination exists but already has entries.
    #[error("destination {} is not empty", .0.display())]
    DestinationNotEmpty(PathBuf),

    /// Checkout destination exists and is not a directory.
    #[error("destination {} is not a directory", .0.display())]
    DestinationNotDirectory(PathBuf),

    /// Underlying filesystem failure; never retried.
    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),
}
