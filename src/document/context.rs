//! Per-node field dumps and neighbor context windows
//!
//! Downstream analysis reasons about a node together with its document-order
//! neighbors, not its tree position. This module renders the human-readable
//! field dump for one node and the N-before/M-after context block the
//! analyzer embeds in its prompts.

use crate::units::{font_size_name, format_chars, pt_to_chars};

use super::tree::Node;

/// Render one node's attributes as the labeled field dump used in prompts
pub fn node_details(node: &Node, prefix: &str) -> String {
    let attrs = &node.attributes;
    let role = node.role.map(|r| r.label()).unwrap_or("root");
    let content = if attrs.text.trim().is_empty() {
        "[空行]"
    } else {
        attrs.text.as_str()
    };

    let mut details = String::new();
    details.push_str(&format!("{prefix}节点内容: {content}\n"));
    details.push_str(&format!("{prefix}节点类型: {role}\n"));
    details.push_str(&format!("{prefix}字体: {}\n", attrs.font));
    details.push_str(&format!(
        "{prefix}字号: {} ({}pt)\n",
        font_size_name(attrs.size),
        attrs.size
    ));
    details.push_str(&format!("{prefix}加粗: {}\n", attrs.bold));
    details.push_str(&format!("{prefix}行距: {}\n", attrs.line_spacing.describe()));
    details.push_str(&format!("{prefix}段前间距: {}磅\n", attrs.space_before));
    details.push_str(&format!("{prefix}段后间距: {}磅\n", attrs.space_after));
    details.push_str(&format!(
        "{prefix}对齐方式: {}\n",
        attrs.alignment.describe()
    ));
    details.push_str(&format!(
        "{prefix}大纲级别: {}\n",
        attrs.outline_level.describe()
    ));

    let indent = &attrs.indentation;
    details.push_str(&format!(
        "{prefix}首行缩进: {}\n",
        format_chars(pt_to_chars(indent.first_line, &attrs.font, attrs.size))
    ));
    if indent.hanging > 0.0 {
        details.push_str(&format!(
            "{prefix}悬挂缩进: {}\n",
            format_chars(pt_to_chars(indent.hanging, &attrs.font, attrs.size))
        ));
    }
    details.push_str(&format!(
        "{prefix}左缩进: {}\n",
        format_chars(pt_to_chars(indent.left, &attrs.font, attrs.size))
    ));
    details.push_str(&format!(
        "{prefix}右缩进: {}\n",
        format_chars(pt_to_chars(indent.right, &attrs.font, attrs.size))
    ));

    details
}

/// Build the 上下文信息 block for the node at `index`: up to `before`
/// preceding and `after` following nodes in document order, clamped at the
/// document edges.
pub fn context_window(nodes: &[&Node], index: usize, before: usize, after: usize) -> String {
    let mut context = String::from("=== 上下文信息 ===\n");

    let start = index.saturating_sub(before);
    let preceding = &nodes[start..index];
    if preceding.is_empty() {
        context.push_str("\n前节点: 无\n");
    } else {
        context.push_str(&format!("\n前{before}个节点:\n"));
        for (i, node) in preceding.iter().enumerate() {
            context.push_str(&format!("\n前节点{}:\n", i + 1));
            context.push_str(&node_details(node, "  "));
        }
    }

    context.push_str("\n当前节点:\n");
    context.push_str(&node_details(nodes[index], "  "));

    let end = (index + 1 + after).min(nodes.len());
    let following = &nodes[index + 1..end];
    if following.is_empty() {
        context.push_str("\n后节点: 无\n");
    } else {
        context.push_str(&format!("\n后{after}个节点:\n"));
        for (i, node) in following.iter().enumerate() {
            context.push_str(&format!("\n后节点{}:\n", i + 1));
            context.push_str(&node_details(node, "  "));
        }
    }

    context
}
