//! Tiers that answer when the record store cannot: static demo data, the
//! in-process completion map and the day-scoped local mirror.

pub mod completion_cache;
pub mod defaults;
pub mod history_overlay;
pub mod local_mirror;
pub mod merge;

pub use completion_cache::{CompletionCache, CompletionEntry};
pub use history_overlay::HistoryOverlay;
pub use local_mirror::{LocalMirror, mirror_key};
pub use merge::{CompletionFlags, merge_completion};
