//! FAT emulation (core library)
//!
//! A logical file is a directory entry plus a singly linked chain of small
//! fixed-capacity blocks, every entry and block being an independent record
//! in a [`record_store::RecordStore`]. See `layout.rs` for record names and
//! formats.
//!
//! [`FileService`] is the whole public API: create, list, read, rewrite,
//! trash and restore files. Block chains are never exposed to callers.
//!
//! The engine is single-threaded and synchronous. There is no transaction
//! log: the order in which records are written (blocks tail first; on
//! rewrite, the old chain freed before the new one is written) is the only
//! thing keeping the store consistent if an operation is interrupted.
//!
//! See src/tests.rs for usage examples.

mod block;
mod chain;
mod config;
mod directory;
mod entry;
mod error;
mod layout;
mod service;


pub use config::*;
pub use entry::DirectoryEntry;
pub use error::*;
pub use layout::{BLOCK_SUFFIX, BlockRef, ENTRY_SUFFIX, MAX_BLOCK, Timestamp};
pub use service::FileService;
