//! Per-node compliance analysis
//!
//! Walks the finished tree in document order and submits each node, with its
//! neighbor context, to the remote model for review against the formatting
//! standard. A failed request degrades to an error note on that node; the
//! run itself always completes.

use serde::Serialize;
use std::time::Duration;
use tracing::{info, warn};

use crate::config::{CheckConfig, ContextConfig};
use crate::document::context::{context_window, node_details};
use crate::document::models::StructuralRole;
use crate::document::tree::DocumentTree;

use super::client::DeepSeekClient;

/// Default formatting requirements: the drafting-unit and date rules
pub const DEFAULT_FORMAT_REQUIREMENTS: &str = "拟稿部门或单位：没有附件时，则正文下空一行，右空四字；有附件时，则附件下空二行，右空四字。日期：用阿拉伯数字将年、月、日标全，年份应标全称，月、日不编虚位（即1不编为01），另起一行，位于拟稿部门或单位下方正中间。";

/// The model's verdict on one node
#[derive(Debug, Clone, Serialize)]
pub struct NodeAnalysis {
    pub index: usize,
    pub role: Option<StructuralRole>,
    pub content: String,
    pub analysis: String,
}

/// Runs the per-node review pass
pub struct DocumentAnalyzer<'a> {
    client: &'a DeepSeekClient,
    context: ContextConfig,
    delay: Duration,
    requirements: String,
}

impl<'a> DocumentAnalyzer<'a> {
    pub fn new(client: &'a DeepSeekClient, config: &CheckConfig) -> Self {
        DocumentAnalyzer {
            client,
            context: config.context.clone(),
            delay: Duration::from_millis(config.oracle.request_delay_ms),
            requirements: DEFAULT_FORMAT_REQUIREMENTS.to_string(),
        }
    }

    /// Replace the default formatting requirements
    pub fn with_requirements(mut self, requirements: impl Into<String>) -> Self {
        self.requirements = requirements.into();
        self
    }

    /// Review every node in document order.
    pub async fn analyze_tree(&self, tree: &DocumentTree) -> Vec<NodeAnalysis> {
        let nodes = tree.nodes();
        let total = nodes.len();
        let mut results = Vec::with_capacity(total);

        for (index, node) in nodes.iter().enumerate() {
            let preview: String = node.attributes.text.chars().take(50).collect();
            info!("analyzing node {}/{total}: {preview}", index + 1);

            let context = context_window(&nodes, index, self.context.before, self.context.after);
            let node_info = node_details(node, "");

            let analysis = match self
                .client
                .analyze_node(&node_info, &context, &self.requirements)
                .await
            {
                Ok(analysis) => analysis,
                Err(err) => {
                    warn!("analysis request failed for node {}: {err}", index + 1);
                    format!("分析失败: {err}")
                }
            };

            results.push(NodeAnalysis {
                index,
                role: node.role,
                content: node.attributes.text.clone(),
                analysis,
            });

            // Stay under the provider's rate limits
            if index + 1 < total && !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
        }

        results
    }
}

/// Full report for one checking run
#[derive(Debug, Serialize)]
pub struct CheckReport {
    pub source: String,
    pub node_count: usize,
    pub results: Vec<NodeAnalysis>,
}

impl CheckReport {
    pub fn new(tree: &DocumentTree, results: Vec<NodeAnalysis>) -> Self {
        CheckReport {
            source: tree.source.clone(),
            node_count: results.len(),
            results,
        }
    }

    /// Render the report for terminal reading
    pub fn render(&self) -> String {
        let mut out = String::new();
        for result in &self.results {
            out.push_str(&format!(
                "\n节点 {}: {}\n{}\n{}\n{}\n",
                result.index + 1,
                result.content,
                "=".repeat(80),
                result.analysis,
                "=".repeat(80),
            ));
        }
        out
    }
}
