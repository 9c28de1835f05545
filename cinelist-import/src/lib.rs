//! Export the whole dataset as a versioned snapshot and merge snapshots back
//! into a database that may already hold some of the same data.
//!
//! Import remaps identities pass by pass (users, movies, lists, entries) so
//! nothing is duplicated and no reference dangles, and runs as a single
//! transaction.

pub mod progress;
pub mod reconcile;
pub mod snapshot;

pub use progress::{ImportProgress, LogProgress, SilentProgress};
pub use reconcile::{ImportError, ImportStats, import_snapshot};
pub use snapshot::{
    SNAPSHOT_VERSION, Snapshot, SnapshotEntry, SnapshotList, SnapshotMovie, SnapshotUser,
    export_snapshot, read_snapshot, write_snapshot,
};
