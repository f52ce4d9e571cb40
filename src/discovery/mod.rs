//! Dual-source discovery of contract files.
//!
//! Files are discovered in an embedded resource tree bundled into the binary
//! and, optionally, in a directory on the host filesystem. The embedded tree
//! is always walked first.

mod discover;
mod extension_filter;
mod file_record;

pub use discover::{DiscoveryError, discover};
pub use extension_filter::ExtensionFilter;
pub use file_record::{FileRecord, Origin, strip_extension};
