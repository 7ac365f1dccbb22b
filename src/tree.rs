//! In-memory entry model for a VFS2 archive.
//!
//! Folders and files are held in two flat vectors indexed by their dense
//! ids; parent/child links are plain indices into those vectors, so the
//! tree carries no ownership cycles. A tree is built either by the archive
//! reader or by the directory importer, then consumed once by the extractor
//! or the writer.

use crate::archive::format::{self, CompressType};
use crate::error::{Result, VfsError};
use std::io::{Read, Write};

/// Sentinel `parent_id` carried by the root folder
pub const NO_PARENT: i32 = -1;

/// Index reference to a child entry, in insertion order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildRef {
    Folder(usize),
    File(usize),
}

/// A directory entry
#[derive(Debug, Clone)]
pub struct FolderEntry {
    pub name_hash: u32,
    pub id: i32,
    pub parent_id: i32,
    /// Opaque classification value: 1 for the root, 9 for a folder literally
    /// named `ui`, -1 otherwise. Preserved verbatim on round-trip.
    pub unk1: i32,
    /// Id of the first file packed under this folder, or -1 if it owns none
    pub file_id_start: i32,
    /// Own path segment; empty for the root, filled from the name table when
    /// parsing an archive
    pub name: String,
    pub children: Vec<ChildRef>,
}

/// A file entry
#[derive(Debug, Clone)]
pub struct FileEntry {
    pub name_hash: u32,
    pub id: i32,
    pub compression: CompressType,
    pub parent_id: i32,
    /// Byte offset of the payload within the archive's data region
    pub offset: i32,
    /// On-disk payload size (compressed size for Deflate entries)
    pub size: i32,
    pub name: String,
}

impl FolderEntry {
    /// Read one 20-byte folder record
    pub fn read_from<R: Read>(mut reader: R) -> Result<Self> {
        Ok(Self {
            name_hash: format::read_i32(&mut reader)? as u32,
            id: format::read_i32(&mut reader)?,
            parent_id: format::read_i32(&mut reader)?,
            unk1: format::read_i32(&mut reader)?,
            file_id_start: format::read_i32(&mut reader)?,
            name: String::new(),
            children: Vec::new(),
        })
    }

    /// Write one 20-byte folder record
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        format::write_i32(&mut writer, self.name_hash as i32)?;
        format::write_i32(&mut writer, self.id)?;
        format::write_i32(&mut writer, self.parent_id)?;
        format::write_i32(&mut writer, self.unk1)?;
        format::write_i32(&mut writer, self.file_id_start)
    }
}

impl FileEntry {
    /// Read one 24-byte file record
    pub fn read_from<R: Read>(mut reader: R) -> Result<Self> {
        Ok(Self {
            name_hash: format::read_i32(&mut reader)? as u32,
            id: format::read_i32(&mut reader)?,
            compression: CompressType::from_i32(format::read_i32(&mut reader)?)?,
            parent_id: format::read_i32(&mut reader)?,
            offset: format::read_i32(&mut reader)?,
            size: format::read_i32(&mut reader)?,
            name: String::new(),
        })
    }

    /// Write one 24-byte file record
    pub fn write_to<W: Write>(&self, mut writer: W) -> Result<()> {
        format::write_i32(&mut writer, self.name_hash as i32)?;
        format::write_i32(&mut writer, self.id)?;
        format::write_i32(&mut writer, self.compression as i32)?;
        format::write_i32(&mut writer, self.parent_id)?;
        format::write_i32(&mut writer, self.offset)?;
        format::write_i32(&mut writer, self.size)
    }
}

/// The full entry tree of one archive
#[derive(Debug, Default)]
pub struct VfsTree {
    pub folders: Vec<FolderEntry>,
    pub files: Vec<FileEntry>,
    root_id: Option<usize>,
}

impl VfsTree {
    /// Index of the root folder
    pub fn root_id(&self) -> Result<usize> {
        self.root_id.ok_or(VfsError::MissingRoot)
    }

    /// Append a folder, assigning the next dense id
    pub fn add_folder(&mut self, name: &str, parent_id: i32, name_hash: u32) -> i32 {
        let id = self.folders.len() as i32;
        let unk1 = match name {
            "" => 1,
            "ui" => 9,
            _ => -1,
        };

        self.folders.push(FolderEntry {
            name_hash,
            id,
            parent_id,
            unk1,
            file_id_start: -1,
            name: name.to_owned(),
            children: Vec::new(),
        });

        id
    }

    /// Append a file, assigning the next dense id
    pub fn add_file(&mut self, name: &str, parent_id: i32, name_hash: u32) -> i32 {
        let id = self.files.len() as i32;

        self.files.push(FileEntry {
            name_hash,
            id,
            compression: CompressType::for_file_name(name),
            parent_id,
            offset: -1,
            size: -1,
            name: name.to_owned(),
        });

        id
    }

    /// Attach every entry to its parent folder and record the root.
    ///
    /// Entries must already be in id order. Each `parent_id` must index a
    /// folder whose own id equals it; a file without a parent is fatal.
    pub fn resolve_relations(&mut self) -> Result<()> {
        for folder in &mut self.folders {
            folder.children.clear();
        }
        self.root_id = None;

        for idx in 0..self.folders.len() {
            let parent_id = self.folders[idx].parent_id;
            if parent_id < 0 {
                self.root_id = Some(idx);
                continue;
            }

            let parent_idx = self.parent_index(&self.folders[idx].name, parent_id)?;
            self.folders[parent_idx].children.push(ChildRef::Folder(idx));
        }

        for idx in 0..self.files.len() {
            let parent_id = self.files[idx].parent_id;
            if parent_id < 0 {
                return Err(VfsError::MissingParent(self.files[idx].name.clone()));
            }

            let parent_idx = self.parent_index(&self.files[idx].name, parent_id)?;
            self.folders[parent_idx].children.push(ChildRef::File(idx));
        }

        Ok(())
    }

    /// Index of the folder a `parent_id` points at, verifying the folder's
    /// own id equals it
    fn parent_index(&self, child_name: &str, parent_id: i32) -> Result<usize> {
        let parent_idx = parent_id as usize;
        let parent = self
            .folders
            .get(parent_idx)
            .ok_or_else(|| VfsError::DanglingParent {
                child: child_name.to_owned(),
                parent: parent_id,
            })?;

        if parent.id != parent_id {
            return Err(VfsError::ParentIdMismatch {
                name: child_name.to_owned(),
                expected: parent_id,
                actual: parent.id,
            });
        }

        Ok(parent_idx)
    }

    /// Path of a folder relative to the root, `/`-joined.
    ///
    /// The root's empty name contributes nothing, so the root itself maps to
    /// the empty path. Valid only after [`resolve_relations`](Self::resolve_relations).
    pub fn folder_path(&self, folder: usize) -> String {
        let mut segments = Vec::new();
        let mut current = Some(folder);

        while let Some(idx) = current {
            let entry = &self.folders[idx];
            if !entry.name.is_empty() {
                segments.push(entry.name.as_str());
            }
            current = (entry.parent_id >= 0).then_some(entry.parent_id as usize);
        }

        segments.reverse();
        segments.join("/")
    }

    /// Path of a file relative to the root, `/`-joined
    pub fn file_path(&self, file: usize) -> String {
        let entry = &self.files[file];
        let dir = self.folder_path(entry.parent_id as usize);
        if dir.is_empty() {
            entry.name.clone()
        } else {
            format!("{dir}/{}", entry.name)
        }
    }

    /// Sub-folders of a folder, in insertion order
    pub fn subfolders(&self, folder: usize) -> impl Iterator<Item = usize> + '_ {
        self.folders[folder].children.iter().filter_map(|c| match c {
            ChildRef::Folder(idx) => Some(*idx),
            ChildRef::File(_) => None,
        })
    }

    /// Files owned by a folder, in insertion order
    pub fn folder_files(&self, folder: usize) -> impl Iterator<Item = usize> + '_ {
        self.folders[folder].children.iter().filter_map(|c| match c {
            ChildRef::File(idx) => Some(*idx),
            ChildRef::Folder(_) => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hash::hash_name;

    fn sample_tree() -> VfsTree {
        let mut tree = VfsTree::default();
        let root = tree.add_folder("", NO_PARENT, hash_name(""));
        let ui = tree.add_folder("ui", root, hash_name("ui"));
        tree.add_file("menu.json", ui, hash_name("ui/menu.json"));
        tree.add_file("bgm.at9", root, hash_name("bgm.at9"));
        tree.resolve_relations().unwrap();
        tree
    }

    #[test]
    fn test_unk1_assignment() {
        let tree = sample_tree();
        assert_eq!(tree.folders[0].unk1, 1);
        assert_eq!(tree.folders[1].unk1, 9);

        let mut other = VfsTree::default();
        let root = other.add_folder("", NO_PARENT, hash_name(""));
        other.add_folder("sound", root, hash_name("sound"));
        assert_eq!(other.folders[1].unk1, -1);
    }

    #[test]
    fn test_paths() {
        let tree = sample_tree();
        assert_eq!(tree.folder_path(0), "");
        assert_eq!(tree.folder_path(1), "ui");
        assert_eq!(tree.file_path(0), "ui/menu.json");
        assert_eq!(tree.file_path(1), "bgm.at9");
    }

    #[test]
    fn test_children_order() {
        let tree = sample_tree();
        let root = tree.root_id().unwrap();
        assert_eq!(tree.subfolders(root).collect::<Vec<_>>(), vec![1]);
        assert_eq!(tree.folder_files(root).collect::<Vec<_>>(), vec![1]);
        assert_eq!(tree.folder_files(1).collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn test_file_without_parent_is_fatal() {
        let mut tree = VfsTree::default();
        tree.add_folder("", NO_PARENT, hash_name(""));
        tree.add_file("orphan.bin", NO_PARENT, hash_name("orphan.bin"));
        assert!(matches!(
            tree.resolve_relations(),
            Err(VfsError::MissingParent(name)) if name == "orphan.bin"
        ));
    }

    #[test]
    fn test_dangling_parent_is_fatal() {
        let mut tree = VfsTree::default();
        let root = tree.add_folder("", NO_PARENT, hash_name(""));
        tree.add_file("stray.bin", root + 7, hash_name("stray.bin"));
        assert!(matches!(
            tree.resolve_relations(),
            Err(VfsError::DanglingParent { parent: 7, .. })
        ));
    }

    #[test]
    fn test_mismatched_parent_id_is_fatal() {
        let mut tree = VfsTree::default();
        tree.add_folder("", NO_PARENT, hash_name(""));
        // corrupt the id so position and id disagree
        tree.folders[0].id = 5;
        tree.files.push(FileEntry {
            name_hash: hash_name("a.bin"),
            id: 0,
            compression: CompressType::Stored,
            parent_id: 0,
            offset: -1,
            size: -1,
            name: "a.bin".to_owned(),
        });
        assert!(matches!(
            tree.resolve_relations(),
            Err(VfsError::ParentIdMismatch { expected: 0, actual: 5, .. })
        ));
    }

    #[test]
    fn test_folder_record_roundtrip() {
        let folder = FolderEntry {
            name_hash: 0x4002_B5D4,
            id: 3,
            parent_id: 0,
            unk1: -1,
            file_id_start: 12,
            name: "sound".to_owned(),
            children: Vec::new(),
        };

        let mut buf = Vec::new();
        folder.write_to(&mut buf).unwrap();
        assert_eq!(buf.len(), format::FOLDER_RECORD_SIZE);

        let parsed = FolderEntry::read_from(&buf[..]).unwrap();
        assert_eq!(parsed.name_hash, folder.name_hash);
        assert_eq!(parsed.id, folder.id);
        assert_eq!(parsed.parent_id, folder.parent_id);
        assert_eq!(parsed.unk1, folder.unk1);
        assert_eq!(parsed.file_id_start, folder.file_id_start);
    }

    #[test]
    fn test_file_record_roundtrip() {
        let file = FileEntry {
            name_hash: 0x5F00_1234,
            id: 7,
            compression: CompressType::Deflate,
            parent_id: 2,
            offset: 4096,
            size: 512,
            name: "config.json".to_owned(),
        };

        let mut buf = Vec::new();
        file.write_to(&mut buf).unwrap();
        assert_eq!(buf.len(), format::FILE_RECORD_SIZE);

        let parsed = FileEntry::read_from(&buf[..]).unwrap();
        assert_eq!(parsed.name_hash, file.name_hash);
        assert_eq!(parsed.id, file.id);
        assert_eq!(parsed.compression, file.compression);
        assert_eq!(parsed.parent_id, file.parent_id);
        assert_eq!(parsed.offset, file.offset);
        assert_eq!(parsed.size, file.size);
    }

    #[test]
    fn test_file_record_rejects_unknown_compression() {
        let mut buf = Vec::new();
        for value in [0x4ABC_i32, 1, 5, 0, 0, 0] {
            format::write_i32(&mut buf, value).unwrap();
        }
        assert!(matches!(
            FileEntry::read_from(&buf[..]),
            Err(VfsError::UnknownCompression(5))
        ));
    }
}
