//! Command implementations
//!
//! Every command is an `impl Repository` block that writes its output to the
//! repository's writer, split into two categories following git's
//! architecture:
//!
//! - `plumbing`: low-level object manipulation (cat-file, hash-object,
//!   ls-tree, rev-parse, cat-index)
//! - `porcelain`: user-facing workflows (log, checkout, show-ref, tag,
//!   status)

pub mod plumbing;
pub mod porcelain;
