//! Sync engine and per-entity facades used by every client.

mod engine;
mod facade;
#[cfg(test)]
mod testing;

pub use engine::SyncEngine;
pub use facade::EntityFacade;
