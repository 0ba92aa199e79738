//! In-memory document tree and the selection/tab state machine

mod document;
mod io;
mod selection;
mod snapshot;
mod tree;

pub use document::{Document, DocumentKind};
pub use io::WorkspaceIo;
pub use selection::{ClickModifiers, SelectionController};
pub use snapshot::{WorkspaceSnapshot, WorkspaceStore};
pub use tree::{DocumentTree, TreeError, TreeResult};
