pub mod common;
pub mod config;
pub mod delete;
pub mod list;
pub mod queue;
pub mod save;
pub mod sync;
pub mod whoami;
