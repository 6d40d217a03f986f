//! Fixed partition geometry.
//!
//! None of these constants are meant to ever become configurable —
//! resizing the partition is out of scope for this simulator.

/// Bytes in one cluster.
pub const CLUSTER_SIZE: usize = 1024;
/// Total clusters in the partition.
pub const CLUSTER_COUNT: usize = 4096;
/// Total partition size in bytes: `CLUSTER_SIZE * CLUSTER_COUNT`.
pub const PARTITION_SIZE: u64 = (CLUSTER_SIZE * CLUSTER_COUNT) as u64;

/// Cluster holding the boot block.
pub const BOOT_BLOCK_CLUSTER: u16 = 0;
/// First cluster occupied by the FAT itself.
pub const FAT_CLUSTER_START: u16 = 1;
/// Number of clusters the FAT occupies.
pub const FAT_CLUSTER_COUNT: u16 = 8;
/// Cluster holding the root directory.
pub const ROOT_DIR_CLUSTER: u16 = 9;
/// First cluster available for file/directory content.
pub const DATA_CLUSTER_START: u16 = 10;

/// Size in bytes of one directory entry.
pub const DIR_ENTRY_SIZE: usize = 32;
/// Directory entries that fit in one cluster.
pub const DIR_ENTRIES_PER_CLUSTER: usize = CLUSTER_SIZE / DIR_ENTRY_SIZE;

/// Byte pattern the boot block is filled with by `format`.
pub const BOOT_BLOCK_FILL: u8 = 0xBB;

/// Fixed name of the partition image file, always resolved relative to
/// whatever directory the engine was opened in.
pub const PARTITION_FILE_NAME: &str = "fat.part";
