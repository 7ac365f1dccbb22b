use crate::archive::format::{self, CompressType, MAGIC};
use crate::error::{Result, VfsError};
use crate::tree::VfsTree;
use flate2::write::ZlibEncoder;
use std::fs::{self, File};
use std::io::{BufWriter, Seek, Write};
use std::path::Path;
use tracing::debug;

/// Archive writer: serializes an entry tree and its file contents into a
/// VFS2 byte stream.
///
/// Writing is two-pass. Pass 1 packs every payload into a scratch buffer,
/// assigning each file's `offset`/`size` and each folder's `file_id_start`.
/// Pass 2 assembles the stream: magic, records, name table offset, data
/// region, name table.
pub struct ArchiveWriter {
    writer: BufWriter<File>,
}

impl ArchiveWriter {
    /// Create the archive file
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::create(path)?;
        Ok(Self {
            writer: BufWriter::new(file),
        })
    }

    /// Serialize the whole tree, reading file contents from `source_root`.
    ///
    /// Payloads are packed depth-first: each folder's files before its
    /// sub-folders, in child order. Deflate entries are preceded by an i32
    /// uncompressed-size prefix; `size` excludes the prefix.
    pub fn write_tree(mut self, tree: &mut VfsTree, source_root: &Path) -> Result<()> {
        let root = tree.root_id()?;

        let mut payload: Vec<u8> = Vec::new();
        pack_folder(tree, root, source_root, &mut payload)?;

        self.writer.write_all(&MAGIC)?;

        format::write_i32(&mut self.writer, tree.folders.len() as i32)?;
        for folder in &tree.folders {
            folder.write_to(&mut self.writer)?;
        }

        format::write_i32(&mut self.writer, tree.files.len() as i32)?;
        for file in &tree.files {
            file.write_to(&mut self.writer)?;
        }

        // the data region starts right after this field
        let name_table_offset = self.writer.stream_position()? + 4 + payload.len() as u64;
        format::write_i32(&mut self.writer, name_table_offset as i32)?;
        self.writer.write_all(&payload)?;

        format::write_i32(&mut self.writer, tree.files.len() as i32)?;
        for file in &tree.files {
            format::write_string(&mut self.writer, &file.name)?;
        }

        format::write_i32(&mut self.writer, tree.folders.len() as i32)?;
        for folder in &tree.folders {
            format::write_string(&mut self.writer, &folder.name)?;
        }

        self.writer.flush()?;
        debug!(
            folders = tree.folders.len(),
            files = tree.files.len(),
            data_bytes = payload.len(),
            "wrote archive"
        );

        Ok(())
    }
}

/// Pass 1: pack one folder's files, then recurse into its sub-folders
fn pack_folder(
    tree: &mut VfsTree,
    folder: usize,
    source_root: &Path,
    payload: &mut Vec<u8>,
) -> Result<()> {
    let file_ids: Vec<usize> = tree.folder_files(folder).collect();
    for file_id in file_ids {
        if tree.folders[folder].file_id_start < 0 {
            tree.folders[folder].file_id_start = tree.files[file_id].id;
        }

        let offset = payload.len() as i32;
        let disk_path = source_root.join(tree.file_path(file_id));
        let data = fs::read(&disk_path)?;

        let written = match tree.files[file_id].compression {
            CompressType::Stored => {
                payload.extend_from_slice(&data);
                data.len()
            }
            CompressType::Deflate => {
                format::write_i32(&mut *payload, data.len() as i32)?;
                let compressed = deflate(&data)?;
                payload.extend_from_slice(&compressed);
                compressed.len()
            }
        };

        let entry = &mut tree.files[file_id];
        entry.offset = offset;
        entry.size = written as i32;
    }

    let sub_ids: Vec<usize> = tree.subfolders(folder).collect();
    for sub in sub_ids {
        pack_folder(tree, sub, source_root, payload)?;
    }

    Ok(())
}

/// Deflate into a zlib stream at the fast compression level
fn deflate(data: &[u8]) -> Result<Vec<u8>> {
    let mut encoder = ZlibEncoder::new(Vec::new(), flate2::Compression::fast());
    encoder
        .write_all(data)
        .map_err(|e| VfsError::CompressionFailed(e.to_string()))?;
    encoder
        .finish()
        .map_err(|e| VfsError::CompressionFailed(e.to_string()))
}
