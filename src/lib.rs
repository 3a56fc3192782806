//! gwcheck: structure-aware format checker for Chinese official documents
//!
//! This library parses .docx official documents (公文) into a tree of
//! structural nodes — title, addressee, headings, body paragraphs, closing,
//! signature, attachments — and submits each node with its surrounding
//! context to a remote language model for format-compliance review.
//!
//! Classification is rule-based and deterministic; an optional remote
//! oracle can be layered on top and every oracle failure falls back to the
//! rules, so parsing never depends on the network.

pub mod ai;
pub mod config;
pub mod document;
pub mod units;

// Re-export commonly used types
pub use ai::{DeepSeekClient, DocumentAnalyzer, OracleError};
pub use config::CheckConfig;
pub use document::{DocumentTree, HybridClassifier, Node, RuleClassifier, StructuralRole};
