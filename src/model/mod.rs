pub mod cascade;
pub mod entities;
pub mod error;
pub mod history;
pub mod loader;
pub mod resolver;
pub mod session;
pub mod tree;

pub use entities::{Instance, MetadataRow, Series, Study};
pub use session::StudySession;
pub use tree::{SidebarMode, TreeNodeKey};

#[cfg(test)]
pub(crate) mod fixtures;
