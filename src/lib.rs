//! `fatsim`: a single-user, single-threaded FAT-style partition simulator.
//!
//! The simulated partition lives in one host file, `fat.part`, with fixed
//! geometry: 1024-byte clusters, 4096 clusters, an 8-cluster FAT starting
//! at cluster 1, and a single-cluster root directory at cluster 9. See
//! [`geometry`] for the exact layout and [`engine::Engine`] for the nine
//! operations built on top of it (`format`, `mount`, `ls`, `mkdir`,
//! `create`, `unlink`, `read`, `write`, `append`).
//!
//! This crate has no concept of users, permissions, or concurrent access —
//! a single [`engine::Engine`] owns the partition file exclusively for as
//! long as it is mounted.

pub mod block;
pub mod dir;
pub mod engine;
pub mod error;
pub mod fat;
pub mod geometry;
pub mod path;

pub use engine::{Engine, Listing};
pub use error::{FsError, FsResult};
