//! clubsync-core - Core library for clubsync
//!
//! This crate contains the local-first data synchronization client shared by
//! the club mini-apps: typed records, the SQLite-backed local store, the HTTP
//! remote client, the last-write-wins merge, and the offline sync queue.

pub mod config;
pub mod db;
pub mod error;
pub mod identity;
pub mod models;
pub mod remote;
pub mod services;
pub mod sync;
pub mod util;

pub use error::{Error, Result};
pub use models::{EntityKind, Record, RecordId};
pub use services::{EntityFacade, SyncEngine};
