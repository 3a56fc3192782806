//! Remote model integration
//!
//! The remote chat-completion model serves two purposes: an optional
//! classification oracle consulted ahead of the rule table, and the
//! compliance analyzer that reviews each node against the formatting
//! standard. Both are optional capabilities; the structural pipeline never
//! depends on them succeeding.

pub mod analysis;
pub mod client;

pub use analysis::{CheckReport, DocumentAnalyzer, NodeAnalysis, DEFAULT_FORMAT_REQUIREMENTS};
pub use client::DeepSeekClient;

use thiserror::Error;

use crate::document::models::{ParagraphAttributes, StructuralRole};

/// Failures of the remote oracle. All of them are non-fatal to
/// classification: the caller degrades to the rule-based path.
#[derive(Debug, Error)]
pub enum OracleError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("api returned status {status}: {body}")]
    Api { status: u16, body: String },

    #[error("response contained no choices")]
    EmptyResponse,

    #[error("model answered with an unlisted role '{answer}'")]
    InvalidRole { answer: String },
}

/// An injected classification capability.
///
/// `preceding` is the already-processed paragraph window in document order;
/// implementations decide how much of it to include in their prompt.
#[allow(async_fn_in_trait)]
pub trait ClassificationOracle {
    async fn classify(
        &self,
        attrs: &ParagraphAttributes,
        preceding: &[ParagraphAttributes],
    ) -> Result<StructuralRole, OracleError>;
}
