//! Materializes an archive's entry tree back into a directory structure.

use crate::archive::ArchiveReader;
use crate::error::Result;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Extract every folder and file under `dest`.
///
/// Depth-first from the root: the directory is created, its files written
/// in child order, then its sub-folders follow. The destination root is an
/// explicit parameter; entry names are never rewritten. Failures abort
/// without cleaning up partial output.
pub fn extract_to(reader: &mut ArchiveReader, dest: &Path) -> Result<()> {
    let root = reader.tree().root_id()?;
    extract_folder(reader, root, dest)?;
    debug!(dest = %dest.display(), "extracted archive");
    Ok(())
}

fn extract_folder(reader: &mut ArchiveReader, folder: usize, dir_path: &Path) -> Result<()> {
    fs::create_dir_all(dir_path)?;

    let file_ids: Vec<usize> = reader.tree().folder_files(folder).collect();
    for file_id in file_ids {
        let data = reader.read_file_data(file_id)?;
        let name = reader.tree().files[file_id].name.clone();
        fs::write(dir_path.join(name), data)?;
    }

    let sub_ids: Vec<usize> = reader.tree().subfolders(folder).collect();
    for sub in sub_ids {
        let name = reader.tree().folders[sub].name.clone();
        extract_folder(reader, sub, &dir_path.join(name))?;
    }

    Ok(())
}
