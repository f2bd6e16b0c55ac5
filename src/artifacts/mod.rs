//! Data structures and algorithms
//!
//! - `objects`: the four object kinds and their codecs
//! - `index`: staging snapshot binary format
//! - `log`: commit graph traversal

pub mod index;
pub mod log;
pub mod objects;
