//! # Storage Layer
//!
//! Everything tabdesk persists goes through one [`backend::StorageBackend`]. Three
//! stores sit on top of it, one per kind of data:
//!
//! - [`records::RecordStore`]: named collections of id-keyed records (chapters).
//! - [`kv::KvStore`]: small JSON key/value namespaces (layout, preferences, widgets).
//! - [`crate::media::MediaVault`]: the two wallpaper slots.
//!
//! ## Backends
//!
//! - [`fs_backend::FsBackend`]: Production backend, one directory per data root.
//! - [`mem_backend::MemBackend`]: For testing logic without filesystem I/O. Can be
//!   told to fail writes to exercise degraded mode.
//!
//! ## Replace-on-Write
//!
//! Collections and namespaces are read whole and written whole. Backends must make
//! each write atomic, so a crash leaves either the old file or the new one. This is
//! also how a batch insert is all-or-nothing.
//!
//! ## Degraded Mode
//!
//! If the medium refuses a write, the store keeps the state it meant to write in
//! memory and serves reads from it until a later write succeeds. The failing call
//! still returns [`crate::error::DeskError::StorageUnavailable`] so callers can warn.
//!
//! ## Storage Layout
//!
//! ```text
//! <data-dir>/
//! ├── collections/
//! │   └── chapters.json      # {schema_version, next_id, records}
//! ├── kv/
//! │   ├── layout.json        # widget positions and sizes
//! │   ├── preferences.json   # generalSettings
//! │   └── widgets.json       # todoListData
//! └── media/
//!     ├── current-video.bin
//!     └── current-image.bin  # base64 data URL, as text
//! ```

pub mod backend;
pub mod fs_backend;
pub mod kv;
pub mod mem_backend;
pub mod records;

pub use backend::StorageBackend;
pub use fs_backend::FsBackend;
pub use kv::KvStore;
pub use mem_backend::MemBackend;
pub use records::{Collection, CollectionFile, Record, RecordStore};
