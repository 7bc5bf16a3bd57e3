//! Local-first synchronization: merge, offline queue and connectivity.

mod connectivity;
mod merge;
mod queue;

pub use connectivity::{Connectivity, ConnectivityMonitor, Transition};
pub use merge::{merge_records, MergeOutcome};
pub use queue::{DrainReport, SkipReason, SyncQueue};
