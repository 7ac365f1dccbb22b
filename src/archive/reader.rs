use crate::archive::format::{self, CompressType, MAGIC};
use crate::error::{Result, VfsError};
use crate::tree::{FileEntry, FolderEntry, VfsTree};
use flate2::read::ZlibDecoder;
use std::fs::File;
use std::io::{Read, Seek, SeekFrom};
use std::path::Path;
use tracing::debug;

/// Archive reader: parses a VFS2 byte stream into an entry tree and decodes
/// file payloads from the data region on demand.
#[derive(Debug)]
pub struct ArchiveReader {
    file: File,
    tree: VfsTree,
    data_offset: u64,
}

impl ArchiveReader {
    /// Open an archive and parse its records, name table, and relations.
    ///
    /// The protocol is strict: magic, folder records, file records, name
    /// table offset, then the name table itself. Any count mismatch or
    /// unresolved parent aborts the parse.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut file = File::open(path)?;

        let mut magic = [0u8; 4];
        file.read_exact(&mut magic)?;
        if magic != MAGIC {
            return Err(VfsError::InvalidMagic);
        }

        let mut tree = VfsTree::default();

        let num_folders = format::read_i32(&mut file)?;
        if num_folders < 0 {
            return Err(VfsError::InvalidFormat(format!(
                "negative folder count {num_folders}"
            )));
        }
        for _ in 0..num_folders {
            tree.folders.push(FolderEntry::read_from(&mut file)?);
        }
        // record order on disk is not guaranteed to be id order
        tree.folders.sort_by_key(|f| f.id);

        let num_files = format::read_i32(&mut file)?;
        if num_files < 0 {
            return Err(VfsError::InvalidFormat(format!(
                "negative file count {num_files}"
            )));
        }
        for _ in 0..num_files {
            tree.files.push(FileEntry::read_from(&mut file)?);
        }
        tree.files.sort_by_key(|f| f.id);

        let name_table_offset = format::read_i32(&mut file)?;
        let data_offset = file.stream_position()?;

        file.seek(SeekFrom::Start(name_table_offset as u64))?;

        let num_file_names = format::read_i32(&mut file)?;
        if num_file_names != num_files {
            return Err(VfsError::NameCountMismatch {
                kind: "file",
                records: num_files,
                names: num_file_names,
            });
        }
        for entry in &mut tree.files {
            entry.name = format::read_string(&mut file)?;
        }

        let num_folder_names = format::read_i32(&mut file)?;
        if num_folder_names != num_folders {
            return Err(VfsError::NameCountMismatch {
                kind: "folder",
                records: num_folders,
                names: num_folder_names,
            });
        }
        for entry in &mut tree.folders {
            entry.name = format::read_string(&mut file)?;
        }

        tree.resolve_relations()?;
        debug!(
            folders = tree.folders.len(),
            files = tree.files.len(),
            data_offset,
            "parsed archive"
        );

        Ok(Self {
            file,
            tree,
            data_offset,
        })
    }

    /// The parsed entry tree
    pub fn tree(&self) -> &VfsTree {
        &self.tree
    }

    /// Consume the reader, keeping only the entry tree
    pub fn into_tree(self) -> VfsTree {
        self.tree
    }

    /// Base offset of the data region; all file offsets are relative to it
    pub fn data_offset(&self) -> u64 {
        self.data_offset
    }

    /// Read and decode one file's payload from the data region.
    ///
    /// Deflate payloads carry an i32 decompressed-size prefix; the inflated
    /// length must match it exactly.
    pub fn read_file_data(&mut self, file_id: usize) -> Result<Vec<u8>> {
        let entry = &self.tree.files[file_id];
        if entry.offset < 0 || entry.size < 0 {
            return Err(VfsError::InvalidFormat(format!(
                "\"{}\" has invalid payload location (offset {}, size {})",
                entry.name, entry.offset, entry.size
            )));
        }

        self.file
            .seek(SeekFrom::Start(self.data_offset + entry.offset as u64))?;

        match entry.compression {
            CompressType::Stored => {
                let mut data = vec![0u8; entry.size as usize];
                self.file.read_exact(&mut data)?;
                Ok(data)
            }
            CompressType::Deflate => {
                let decompressed_size = format::read_i32(&mut self.file)?;
                if decompressed_size < 0 {
                    return Err(VfsError::InvalidFormat(format!(
                        "\"{}\" has negative decompressed size {decompressed_size}",
                        entry.name
                    )));
                }
                let mut data = vec![0u8; entry.size as usize];
                self.file.read_exact(&mut data)?;
                inflate(&data, decompressed_size as usize)
            }
        }
    }
}

/// Inflate a zlib stream, verifying the exact decompressed length
fn inflate(data: &[u8], expected_size: usize) -> Result<Vec<u8>> {
    let mut decoder = ZlibDecoder::new(data);
    let mut out = Vec::with_capacity(expected_size);
    decoder
        .read_to_end(&mut out)
        .map_err(|e| VfsError::DecompressionFailed(e.to_string()))?;

    if out.len() != expected_size {
        return Err(VfsError::DecompressedSizeMismatch {
            expected: expected_size,
            actual: out.len(),
        });
    }

    Ok(out)
}
