pub mod error;
pub mod ident;
pub mod identity;
pub mod config;
pub mod visibility;
pub mod storage;
pub mod library;

pub use error::{LibraryError, LibraryResult};
pub use library::{LibraryService, ResourceLifecycle, LibraryPage, LibraryEntry, IndexState};
