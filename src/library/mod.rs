//! Per-principal libraries: derived, lazily rebuilt listings of the resources each
//! principal can access, filtered per viewer at read time.

pub mod entry;
pub mod paging;
pub mod index;
pub mod rebuild;
pub mod hooks;
pub mod service;
pub mod lifecycle;

// Re-exports for thin public surface
pub use entry::{IndexKey, LibraryEntry, LibraryPage};
pub use index::{IndexState, LibraryIndex, OwnerIndex};
pub use rebuild::{rebuild_entries, RebuildOutcome};
pub use hooks::{HookRegistry, JsonLinesSink, LibraryEvent, LibraryListener};
pub use service::LibraryService;
pub use lifecycle::{MemberChange, ResourceLifecycle};
