//! File operations: the layer that composes the block device, the FAT
//! manager, and the directory/path resolver into the nine commands the
//! shell exposes (`format`, `mount`, `ls`, `mkdir`, `create`, `unlink`,
//! `read`, `write`, `append`).
//!
//! Every mutating operation follows the same durability order: mutate the
//! in-memory FAT, write any newly allocated data cluster(s), write the
//! parent directory cluster, then persist the full FAT. That order is
//! never reordered — a crash between steps must leave either the prior
//! consistent state or a state recoverable by a later FAT repersist.

use std::io::Write;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::block::PartitionFile;
use crate::dir::{self, Attribute, DirEntry};
use crate::error::{FsError, FsResult};
use crate::fat::{FatEntry, FatTable};
use crate::geometry::{
    BOOT_BLOCK_CLUSTER, BOOT_BLOCK_FILL, CLUSTER_SIZE, DIR_ENTRIES_PER_CLUSTER, ROOT_DIR_CLUSTER,
};
use crate::path::{find_entry_by_path, find_free_dir_entry, read_dir_cluster, split_parent};

/// The filesystem engine: an open partition file plus its in-memory FAT,
/// or neither if the engine has not been formatted/mounted yet.
///
/// Owns both the host file handle and the FAT array exclusively for the
/// engine's lifetime — the only piece of state shared across operations.
pub struct Engine {
    dir: PathBuf,
    disk: Option<PartitionFile>,
    fat: Option<FatTable>,
}

/// What `ls` found at a path.
#[derive(Debug)]
pub enum Listing {
    /// The path names a file: just its name.
    File(String),
    /// The path names a directory: every live entry within it.
    Dir(Vec<DirEntry>),
}

impl Engine {
    /// Creates an unmounted engine rooted at `dir` (the directory the
    /// partition image `fat.part` lives, or will live, in).
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            disk: None,
            fat: None,
        }
    }

    pub fn is_mounted(&self) -> bool {
        self.fat.is_some()
    }

    fn require_mounted(&mut self) -> FsResult<(&mut PartitionFile, &mut FatTable)> {
        match (self.disk.as_mut(), self.fat.as_mut()) {
            (Some(d), Some(f)) => Ok((d, f)),
            _ => Err(FsError::NotMounted),
        }
    }

    /// `init`: (re)creates the partition image, writes the boot block, an
    /// explicitly-classified FAT, and an empty root directory, then
    /// extends the file to the full partition size.
    ///
    /// Always permitted, and always leaves the engine un-mounted — the
    /// caller must run [`Engine::mount`] (the shell's `load`) before any
    /// other operation is permitted.
    pub fn format(&mut self) -> FsResult<()> {
        let mut disk = PartitionFile::create(&self.dir)?;
        let fat = FatTable::format_in_memory();

        let boot = [BOOT_BLOCK_FILL; CLUSTER_SIZE];
        disk.write_cluster(BOOT_BLOCK_CLUSTER, &boot)?;

        fat.persist(&mut disk)?;

        let root = [0u8; CLUSTER_SIZE];
        disk.write_cluster(ROOT_DIR_CLUSTER, &root)?;

        disk.extend_to_partition_size()?;

        self.disk = Some(disk);
        self.fat = None;
        info!("formatted partition at {}", self.dir.display());
        Ok(())
    }

    /// `load`: opens the partition image (if not already open) and loads
    /// the FAT into memory. After this, every other operation is
    /// permitted.
    pub fn mount(&mut self) -> FsResult<()> {
        if self.disk.is_none() {
            self.disk = Some(PartitionFile::open(&self.dir)?);
        }
        let disk = self.disk.as_mut().expect("just set");
        let fat = FatTable::load_from_disk(disk)?;
        self.fat = Some(fat);
        info!("mounted partition at {}", self.dir.display());
        Ok(())
    }

    /// `ls path`: resolves `path` and either names the single file it
    /// points to, or lists every live entry of the directory it points to.
    pub fn ls(&mut self, path: &str) -> FsResult<Listing> {
        let (disk, _fat) = self.require_mounted()?;
        let result = find_entry_by_path(disk, path)?;
        if !result.found {
            return Err(FsError::PathNotFound(path.to_string()));
        }
        let entry = result.entry.expect("found implies entry");

        if entry.is_file() {
            return Ok(Listing::File(entry.name));
        }

        let buf = read_dir_cluster(disk, entry.first_block)?;
        let mut entries = Vec::new();
        for i in 0..DIR_ENTRIES_PER_CLUSTER {
            if let Some(e) = DirEntry::parse(&buf[i * 32..(i + 1) * 32])? {
                entries.push(e);
            }
        }
        Ok(Listing::Dir(entries))
    }

    /// Shared shape of `mkdir` and `create`: resolve the parent, reject an
    /// already-existing target, find a
    /// free parent slot and a free data cluster, write the new entry.
    fn create_entry(&mut self, path: &str, attributes: Attribute) -> FsResult<()> {
        let (parent_path, name) = split_parent(path)?;

        let (disk, fat) = self.require_mounted()?;

        let parent = find_entry_by_path(disk, parent_path)?;
        if !parent.found {
            return Err(FsError::PathNotFound(parent_path.to_string()));
        }
        let parent_entry = parent.entry.expect("found implies entry");
        if !parent_entry.is_dir() {
            return Err(FsError::NotADirectory(parent_path.to_string()));
        }
        let parent_cluster = parent_entry.first_block;

        if find_entry_by_path(disk, path)?.found {
            return Err(FsError::AlreadyExists(path.to_string()));
        }

        if dir::name_would_truncate(name) {
            warn!("name '{name}' truncated to 17 bytes");
        }

        let slot = find_free_dir_entry(disk, parent_cluster)?.ok_or(FsError::DirFull)?;

        let new_cluster = fat.find_free().ok_or(FsError::NoSpace)?;
        fat.set(new_cluster, FatEntry::Eoc);

        if attributes == Attribute::Directory {
            let empty = [0u8; CLUSTER_SIZE];
            disk.write_cluster(new_cluster, &empty)?;
        }

        let entry = DirEntry {
            name: name.to_string(),
            attributes,
            first_block: new_cluster,
            size: 0,
        };
        write_dir_slot(disk, parent_cluster, slot, &entry.encode())?;

        fat.persist(disk)?;
        info!("created {path}");
        Ok(())
    }

    /// `mkdir path`. Does not create `.`/`..` entries.
    pub fn mkdir(&mut self, path: &str) -> FsResult<()> {
        self.create_entry(path, Attribute::Directory)
    }

    /// `create path`: an empty file. No data cluster content is written —
    /// only the pre-allocated chain head and a zero `size`.
    pub fn create(&mut self, path: &str) -> FsResult<()> {
        self.create_entry(path, Attribute::File)
    }

    /// `unlink path`: removes a file, or an empty directory. The root is
    /// never removable (it has no parent slot to clear).
    pub fn unlink(&mut self, path: &str) -> FsResult<()> {
        if path == "/" {
            return Err(FsError::InvalidPath(path.to_string()));
        }

        let (disk, fat) = self.require_mounted()?;
        let result = find_entry_by_path(disk, path)?;
        if !result.found {
            return Err(FsError::PathNotFound(path.to_string()));
        }
        let entry = result.entry.expect("found implies entry");

        if entry.is_dir() {
            let buf = read_dir_cluster(disk, entry.first_block)?;
            let has_live_entry = (0..DIR_ENTRIES_PER_CLUSTER).any(|i| buf[i * 32] != 0);
            if has_live_entry {
                return Err(FsError::NotEmpty(path.to_string()));
            }
        }

        fat.free_chain(entry.first_block)?;
        write_dir_slot(disk, result.parent_cluster, result.entry_index, &dir::empty_slot())?;
        fat.persist(disk)?;
        info!("removed {path}");
        Ok(())
    }

    /// `read path`: writes the file's content to `out`, followed by a
    /// trailing newline.
    pub fn read(&mut self, path: &str, out: &mut impl Write) -> FsResult<()> {
        let (disk, fat) = self.require_mounted()?;
        let result = find_entry_by_path(disk, path)?;
        if !result.found {
            return Err(FsError::PathNotFound(path.to_string()));
        }
        let entry = result.entry.expect("found implies entry");
        if !entry.is_file() {
            return Err(FsError::NotAFile(path.to_string()));
        }

        let chain = fat.chain_walk(entry.first_block)?;
        let mut remaining = entry.size as usize;
        for cluster in chain {
            if remaining == 0 {
                break;
            }
            let mut buf = [0u8; CLUSTER_SIZE];
            disk.read_cluster(cluster, &mut buf)?;
            let take = remaining.min(CLUSTER_SIZE);
            out.write_all(&buf[..take])?;
            remaining -= take;
        }
        writeln!(out)?;
        Ok(())
    }

    /// `write path content`: replaces the file's entire content.
    ///
    /// Frees the existing chain, then allocates a fresh chain of
    /// `max(1, ceil(len / CLUSTER_SIZE))` clusters. If allocation runs out
    /// of space partway through, every cluster allocated during this call
    /// is freed again before returning [`FsError::NoSpace`] — this
    /// operation rolls back, unlike `append`.
    pub fn write(&mut self, path: &str, content: &[u8]) -> FsResult<()> {
        let (disk, fat) = self.require_mounted()?;
        let result = find_entry_by_path(disk, path)?;
        if !result.found {
            return Err(FsError::PathNotFound(path.to_string()));
        }
        let entry = result.entry.clone().expect("found implies entry");
        if !entry.is_file() {
            return Err(FsError::NotAFile(path.to_string()));
        }

        fat.free_chain(entry.first_block)?;

        let needed = content.len().div_ceil(CLUSTER_SIZE).max(1);
        let chain = allocate_chain(fat, needed)?;

        for (i, &cluster) in chain.iter().enumerate() {
            let start = i * CLUSTER_SIZE;
            let end = (start + CLUSTER_SIZE).min(content.len());
            let mut buf = [0u8; CLUSTER_SIZE];
            if start < content.len() {
                buf[..end - start].copy_from_slice(&content[start..end]);
            }
            disk.write_cluster(cluster, &buf)?;
        }

        let new_entry = DirEntry {
            name: entry.name,
            attributes: Attribute::File,
            first_block: chain[0],
            size: content.len() as u32,
        };
        write_dir_slot(disk, result.parent_cluster, result.entry_index, &new_entry.encode())?;
        fat.persist(disk)?;
        info!("wrote {} bytes to {path}", content.len());
        Ok(())
    }

    /// `append path content`: extends the file's existing chain.
    ///
    /// No-op (and successful) for empty `content`. Does **not** roll back
    /// on mid-append `NO_SPACE` — the caller may observe a partially
    /// extended chain and a stale directory `size`, exactly as
    /// a caller must tolerate.
    pub fn append(&mut self, path: &str, content: &[u8]) -> FsResult<()> {
        if content.is_empty() {
            // still validate the target, matching `write`'s precondition
            // checks even though no mutation happens.
            let (disk, _fat) = self.require_mounted()?;
            let result = find_entry_by_path(disk, path)?;
            if !result.found {
                return Err(FsError::PathNotFound(path.to_string()));
            }
            if !result.entry.expect("found implies entry").is_file() {
                return Err(FsError::NotAFile(path.to_string()));
            }
            return Ok(());
        }

        let (disk, fat) = self.require_mounted()?;
        let result = find_entry_by_path(disk, path)?;
        if !result.found {
            return Err(FsError::PathNotFound(path.to_string()));
        }
        let entry = result.entry.clone().expect("found implies entry");
        if !entry.is_file() {
            return Err(FsError::NotAFile(path.to_string()));
        }

        let size = entry.size as usize;
        let mut current = fat.chain_tail(entry.first_block)?;
        let mut offset = size % CLUSTER_SIZE;
        let mut buffer = [0u8; CLUSTER_SIZE];

        if offset == 0 && size > 0 {
            let new_cluster = fat.find_free().ok_or(FsError::NoSpace)?;
            fat.set(current, FatEntry::Next(new_cluster));
            current = new_cluster;
            fat.set(current, FatEntry::Eoc);
        } else if size > 0 {
            disk.read_cluster(current, &mut buffer)?;
        }
        // else: size == 0, offset == 0, buffer stays zero-filled.

        let mut pos = 0usize;
        while pos < content.len() {
            let space = CLUSTER_SIZE - offset;
            let take = space.min(content.len() - pos);
            buffer[offset..offset + take].copy_from_slice(&content[pos..pos + take]);
            disk.write_cluster(current, &buffer)?;
            pos += take;

            if pos < content.len() {
                let new_cluster = fat.find_free().ok_or(FsError::NoSpace)?;
                fat.set(current, FatEntry::Next(new_cluster));
                current = new_cluster;
                fat.set(current, FatEntry::Eoc);
                offset = 0;
                buffer = [0u8; CLUSTER_SIZE];
            }
        }

        let new_entry = DirEntry {
            name: entry.name,
            attributes: Attribute::File,
            first_block: entry.first_block,
            size: size as u32 + content.len() as u32,
        };
        write_dir_slot(disk, result.parent_cluster, result.entry_index, &new_entry.encode())?;
        fat.persist(disk)?;
        info!("appended {} bytes to {path}", content.len());
        Ok(())
    }
}

/// Allocates `needed` (>= 1) free clusters one at a time, chaining them in
/// discovery order with the last marked end-of-chain. On mid-stream
/// exhaustion, frees everything allocated during this call and returns
/// [`FsError::NoSpace`] — the rollback `write` relies on.
fn allocate_chain(fat: &mut FatTable, needed: usize) -> FsResult<Vec<u16>> {
    let mut allocated = Vec::with_capacity(needed);
    for _ in 0..needed {
        match fat.find_free() {
            Some(cluster) => {
                fat.set(cluster, FatEntry::Eoc);
                allocated.push(cluster);
            }
            None => {
                for cluster in &allocated {
                    fat.set(*cluster, FatEntry::Free);
                }
                return Err(FsError::NoSpace);
            }
        }
    }
    for i in 0..allocated.len().saturating_sub(1) {
        fat.set(allocated[i], FatEntry::Next(allocated[i + 1]));
    }
    Ok(allocated)
}

fn write_dir_slot(
    disk: &mut PartitionFile,
    dir_cluster: u16,
    index: usize,
    slot_bytes: &[u8; 32],
) -> FsResult<()> {
    let mut buf = read_dir_cluster(disk, dir_cluster)?;
    buf[index * 32..(index + 1) * 32].copy_from_slice(slot_bytes);
    disk.write_cluster(dir_cluster, &buf)
}

/// Convenience used by the shell to know whether `dir/fat.part` already
/// exists before deciding to warn the user that `mount` will fail.
pub fn partition_exists(dir: impl AsRef<Path>) -> bool {
    dir.as_ref().join(crate::geometry::PARTITION_FILE_NAME).exists()
}
