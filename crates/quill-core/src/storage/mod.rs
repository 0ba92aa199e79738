//! Storage I/O collaborator
//!
//! File reads/writes, native dialogs and reveal-in-files live outside the
//! core; this trait is the seam they plug into. Dialog cancellation is not
//! an error (`Ok(None)` / empty list), every other failure is reportable.

mod memory;
mod traits;

pub use memory::MemoryStorage;
pub use traits::{StorageError, StorageIo, StorageResult, StoredFile};
