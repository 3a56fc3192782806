//! Document parsing and structural analysis module
//!
//! This module turns a Word (.docx) official document into an ordered
//! paragraph sequence, classifies each paragraph's structural role, and
//! folds the classified sequence into a nested node tree.

pub mod classify;
pub mod context;
pub(crate) mod io;
pub mod loader;
pub mod models;
pub mod tree;

// Re-export the types and entry points callers actually use
pub use classify::{HybridClassifier, RuleClassifier};
pub use context::{context_window, node_details};
pub use loader::{load_paragraphs, parse_document};
pub use models::*;
pub use tree::{build_tree, DocumentTree, Node, TreeBuilder};
