//! Path resolution over the directory tree.
//!
//! Non-destructive: resolution iterates borrowed slices of the input
//! path instead of mutating a scratch copy while tokenizing.

use crate::block::PartitionFile;
use crate::dir::DirEntry;
use crate::error::{FsError, FsResult};
use crate::geometry::{CLUSTER_SIZE, DIR_ENTRIES_PER_CLUSTER, ROOT_DIR_CLUSTER};

/// The outcome of resolving an absolute path, mirroring `path_search_result_t`.
#[derive(Debug, Clone)]
pub struct PathSearchResult {
    /// The last path component searched for (or the whole path for `/`).
    pub name: String,
    pub found: bool,
    /// Cluster of the directory that was searched for `name`.
    pub parent_cluster: u16,
    /// `entry.first_block` of the match, if found.
    pub entry_cluster: u16,
    /// Slot index (0..32) within `parent_cluster`, if found.
    pub entry_index: usize,
    /// A copy of the matched entry, if found.
    pub entry: Option<DirEntry>,
}

pub(crate) fn read_dir_cluster(disk: &mut PartitionFile, cluster: u16) -> FsResult<[u8; CLUSTER_SIZE]> {
    let mut buf = [0u8; CLUSTER_SIZE];
    disk.read_cluster(cluster, &mut buf)?;
    Ok(buf)
}

/// Scans `cluster`'s 32 slots for a live entry named exactly `name`
/// (case-sensitive, first match wins).
fn scan_for_name(
    disk: &mut PartitionFile,
    cluster: u16,
    name: &str,
) -> FsResult<Option<(usize, DirEntry)>> {
    let buf = read_dir_cluster(disk, cluster)?;
    for i in 0..DIR_ENTRIES_PER_CLUSTER {
        let slot = &buf[i * 32..(i + 1) * 32];
        if let Some(entry) = DirEntry::parse(slot)? {
            if entry.name == name {
                return Ok(Some((i, entry)));
            }
        }
    }
    Ok(None)
}

/// Resolves an absolute, `/`-separated path starting at the root
/// directory. Non-destructive: iterates borrowed slices of `path`, never
/// a mutated copy.
///
/// `"/"` is special-cased to the synthetic root entry. Empty path
/// components (as arise from a leading or doubled `/`) are ignored.
///
/// Only I/O failures reading a directory cluster are errors; a path that
/// does not resolve is a normal `found: false` result.
pub fn find_entry_by_path(disk: &mut PartitionFile, path: &str) -> FsResult<PathSearchResult> {
    if path == "/" {
        return Ok(PathSearchResult {
            name: "/".to_string(),
            found: true,
            parent_cluster: ROOT_DIR_CLUSTER,
            entry_cluster: ROOT_DIR_CLUSTER,
            entry_index: 0,
            entry: Some(DirEntry::synthetic_root()),
        });
    }

    let mut current_cluster = ROOT_DIR_CLUSTER;
    let mut last_name = String::new();

    let components: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    if components.is_empty() {
        return Ok(PathSearchResult {
            name: String::new(),
            found: false,
            parent_cluster: ROOT_DIR_CLUSTER,
            entry_cluster: 0,
            entry_index: 0,
            entry: None,
        });
    }

    for (idx, token) in components.iter().enumerate() {
        last_name = token.to_string();
        let searched_cluster = current_cluster;

        match scan_for_name(disk, searched_cluster, token)? {
            Some((slot, entry)) => {
                let is_last = idx == components.len() - 1;
                if is_last {
                    return Ok(PathSearchResult {
                        name: last_name,
                        found: true,
                        parent_cluster: searched_cluster,
                        entry_cluster: entry.first_block,
                        entry_index: slot,
                        entry: Some(entry),
                    });
                }
                current_cluster = entry.first_block;
            }
            None => {
                return Ok(PathSearchResult {
                    name: last_name,
                    found: false,
                    parent_cluster: searched_cluster,
                    entry_cluster: 0,
                    entry_index: 0,
                    entry: None,
                });
            }
        }
    }

    unreachable!("components is non-empty, loop always returns")
}

/// Finds the first empty slot (0..32) in `dir_cluster`, or `None` if the
/// directory is full.
pub fn find_free_dir_entry(disk: &mut PartitionFile, dir_cluster: u16) -> FsResult<Option<usize>> {
    let buf = read_dir_cluster(disk, dir_cluster)?;
    for i in 0..DIR_ENTRIES_PER_CLUSTER {
        if buf[i * 32] == 0 {
            return Ok(Some(i));
        }
    }
    Ok(None)
}

/// Splits `"/a/b/c"` into (`"/a/b"`, `"c"`); `"/newdir"` into (`"/"`,
/// `"newdir"`). Returns [`FsError::InvalidPath`] if `path` has no `/`
/// separator, is empty after trimming, or names the root itself.
pub fn split_parent(path: &str) -> FsResult<(&str, &str)> {
    let trimmed = path.trim_end_matches('/');
    if trimmed.is_empty() {
        return Err(FsError::InvalidPath(path.to_string()));
    }

    let idx = trimmed
        .rfind('/')
        .ok_or_else(|| FsError::InvalidPath(path.to_string()))?;

    let parent = if idx == 0 { "/" } else { &trimmed[..idx] };
    let name = &trimmed[idx + 1..];

    if name.is_empty() {
        return Err(FsError::InvalidPath(path.to_string()));
    }

    Ok((parent, name))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn split_parent_at_root() {
        assert_eq!(split_parent("/newdir").unwrap(), ("/", "newdir"));
    }

    #[test]
    fn split_parent_nested() {
        assert_eq!(split_parent("/a/b/c").unwrap(), ("/a/b", "c"));
    }

    #[test]
    fn split_parent_rejects_bare_name() {
        assert!(split_parent("noslash").is_err());
    }
}
