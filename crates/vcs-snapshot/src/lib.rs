//! Machine state snapshots for the VCS emulator.
//!
//! A snapshot is `[header literal][identity tag][body]`, written through a [`StateStore`]
//! (file or memory) with the fixed primitive encoding in [`io`]. The body is produced by the
//! root component of the machine, which hands the same store to its children in a fixed order
//! (see [`Serializable`]). There are no per-component length prefixes or field tags, so the
//! save and load traversals must match exactly.

mod error;
mod format;
pub mod io;
mod manager;
mod serializable;
mod store;

pub use crate::error::{Result, StateError};
pub use crate::format::{SnapshotKind, FALSE_PATTERN, MOVIE_HEADER, STATE_HEADER, TRUE_PATTERN};
pub use crate::manager::{
    read_header, write_header, SnapshotInfo, StateConfig, StateManager, DEFAULT_SLOT_COUNT,
};
pub use crate::serializable::{expect_tag, load_all, save_all, write_tag, Serializable, StateRoot};
pub use crate::store::{StateStore, StoreMode};
