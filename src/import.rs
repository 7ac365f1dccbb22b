//! Builds an entry tree from an on-disk directory structure.

use crate::error::{Result, VfsError};
use crate::hash::hash_name;
use crate::tree::{VfsTree, NO_PARENT};
use std::collections::VecDeque;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Import a directory tree rooted at `source_root`.
///
/// Folders are created in increasing depth order (parents before children)
/// and siblings in lexicographic order, so ids are reproducible across
/// runs. Name hashes are computed from each entry's path relative to the
/// walked root. Filesystem metadata artifacts (`.DS_Store`) are skipped.
pub fn import_tree(source_root: &Path) -> Result<VfsTree> {
    let mut tree = VfsTree::default();
    let root_id = tree.add_folder("", NO_PARENT, hash_name(""));

    let mut pending: VecDeque<(PathBuf, String, i32)> = VecDeque::new();
    pending.push_back((source_root.to_path_buf(), String::new(), root_id));

    while let Some((dir_path, rel_path, folder_id)) = pending.pop_front() {
        let (mut subdirs, mut files) = list_children(&dir_path)?;
        subdirs.sort();
        files.sort();

        for name in subdirs {
            let child_rel = join_rel(&rel_path, &name);
            let child_id = tree.add_folder(&name, folder_id, hash_name(&child_rel));
            pending.push_back((dir_path.join(&name), child_rel, child_id));
        }

        for name in files {
            if name == ".DS_Store" {
                continue;
            }
            let child_rel = join_rel(&rel_path, &name);
            tree.add_file(&name, folder_id, hash_name(&child_rel));
        }
    }

    tree.resolve_relations()?;
    debug!(
        folders = tree.folders.len(),
        files = tree.files.len(),
        root = %source_root.display(),
        "imported directory tree"
    );

    Ok(tree)
}

/// List a directory's immediate children, split into sub-directories and
/// files, in no particular order
fn list_children(dir: &Path) -> Result<(Vec<String>, Vec<String>)> {
    let mut subdirs = Vec::new();
    let mut files = Vec::new();

    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let name = entry.file_name().into_string().map_err(|name| {
            VfsError::Path(format!(
                "non-unicode name {:?} under {}",
                name,
                dir.display()
            ))
        })?;

        if entry.file_type()?.is_dir() {
            subdirs.push(name);
        } else {
            files.push(name);
        }
    }

    Ok((subdirs, files))
}

fn join_rel(rel: &str, name: &str) -> String {
    if rel.is_empty() {
        name.to_owned()
    } else {
        format!("{rel}/{name}")
    }
}
