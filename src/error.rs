use std::io;
use thiserror::Error;

/// Result type for VFS2 operations
pub type Result<T> = std::result::Result<T, VfsError>;

/// Unified error type for all VFS2 operations
#[derive(Debug, Error)]
pub enum VfsError {
    // Format errors
    #[error("input is not a VFS2 archive")]
    InvalidMagic,

    #[error("invalid archive format: {0}")]
    InvalidFormat(String),

    #[error("number of {kind}s and {kind} names do not match: {records} records, {names} names")]
    NameCountMismatch {
        kind: &'static str,
        records: i32,
        names: i32,
    },

    #[error("unknown compression type {0}")]
    UnknownCompression(i32),

    #[error("decompressed size does not match: expected {expected}, got {actual}")]
    DecompressedSizeMismatch { expected: usize, actual: usize },

    #[error("compression failed: {0}")]
    CompressionFailed(String),

    #[error("decompression failed: {0}")]
    DecompressionFailed(String),

    // Relation errors
    #[error("\"{name}\" has mismatched parent id: expected {expected}, but got {actual}")]
    ParentIdMismatch {
        name: String,
        expected: i32,
        actual: i32,
    },

    #[error("\"{child}\" references nonexistent parent folder {parent}")]
    DanglingParent { child: String, parent: i32 },

    #[error("\"{0}\" does not have a parent folder")]
    MissingParent(String),

    #[error("no root folder initialised")]
    MissingRoot,

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("path error: {0}")]
    Path(String),
}
