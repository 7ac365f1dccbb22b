//! vfs2-rs: codec and tree-builder for the VFS2 archive container format
//!
//! A VFS2 archive packs a directory hierarchy into a single byte stream:
//! fixed-size folder and file records, a data region of (optionally
//! DEFLATE-compressed) payloads, and a trailing name table. This library
//! provides:
//! - Archive parsing and extraction ([`ArchiveReader`], [`extract_to`])
//! - Directory import and archive writing ([`import_tree`], [`ArchiveWriter`])
//! - Name-hash identities and hash carry-forward across repacks
//!   ([`hash_name`], [`carry_forward_hashes`])
//!
//! # Example
//!
//! ```no_run
//! use vfs2_rs::{extract_to, import_tree, ArchiveReader, ArchiveWriter};
//!
//! // Pack a directory into an archive
//! let mut tree = import_tree("data".as_ref())?;
//! ArchiveWriter::create("data.vfs")?.write_tree(&mut tree, "data".as_ref())?;
//!
//! // Unpack it again
//! let mut reader = ArchiveReader::open("data.vfs")?;
//! extract_to(&mut reader, "unpacked".as_ref())?;
//! # Ok::<(), vfs2_rs::VfsError>(())
//! ```

// Core modules
pub mod archive;
pub mod error;
pub mod export;
pub mod hash;
pub mod import;
pub mod reconcile;
pub mod tree;

// Re-export commonly used types
pub use archive::{
    ArchiveReader, ArchiveWriter, CompressType, FILE_RECORD_SIZE, FOLDER_RECORD_SIZE, MAGIC,
};
pub use error::{Result, VfsError};
pub use export::extract_to;
pub use hash::hash_name;
pub use import::import_tree;
pub use reconcile::carry_forward_hashes;
pub use tree::{ChildRef, FileEntry, FolderEntry, VfsTree, NO_PARENT};
