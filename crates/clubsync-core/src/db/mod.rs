//! Database layer for clubsync

mod connection;
mod local_store;
mod migrations;

pub use connection::Database;
pub use local_store::{LocalStore, IDENTITY_KEY, QUEUE_KEY};
