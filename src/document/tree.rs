//! Tree construction from classified paragraphs
//!
//! A single linear pass folds the classified paragraph sequence into a
//! nested tree by comparing each new node's rank against a stack of open
//! nodes. Equal rank closes siblings at the same level rather than nesting
//! them, so two consecutive Heading1 paragraphs become siblings.

use serde::{Deserialize, Serialize};

use super::models::{ParagraphAttributes, StructuralRole};

/// Rank of the synthetic root, below every enumerated role.
const ROOT_RANK: i8 = -1;

/// One tree element: a classified paragraph and its children in document
/// order. The root node is synthetic and carries no role.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Node {
    #[serde(rename = "type")]
    pub role: Option<StructuralRole>,
    pub attributes: ParagraphAttributes,
    pub children: Vec<Node>,
}

impl Node {
    pub fn new(role: StructuralRole, attributes: ParagraphAttributes) -> Self {
        Node {
            role: Some(role),
            attributes,
            children: Vec::new(),
        }
    }

    fn root() -> Self {
        Node {
            role: None,
            attributes: ParagraphAttributes::default(),
            children: Vec::new(),
        }
    }

    /// Nesting rank; the synthetic root compares below all real roles
    pub fn rank(&self) -> i8 {
        match self.role {
            Some(role) => role.rank() as i8,
            None => ROOT_RANK,
        }
    }

    pub fn is_root(&self) -> bool {
        self.role.is_none()
    }

    /// Total number of nodes in this subtree, root excluded
    pub fn count(&self) -> usize {
        let own = usize::from(!self.is_root());
        own + self.children.iter().map(Node::count).sum::<usize>()
    }

    /// All non-root nodes in document order (preorder walk)
    pub fn flatten(&self) -> Vec<&Node> {
        let mut nodes = Vec::new();
        self.collect(&mut nodes);
        nodes
    }

    fn collect<'a>(&'a self, nodes: &mut Vec<&'a Node>) {
        if !self.is_root() {
            nodes.push(self);
        }
        for child in &self.children {
            child.collect(nodes);
        }
    }
}

/// A fully built document tree plus source metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentTree {
    pub source: String,
    pub paragraph_count: usize,
    pub root: Node,
}

impl DocumentTree {
    /// All paragraph nodes in document order
    pub fn nodes(&self) -> Vec<&Node> {
        self.root.flatten()
    }

    /// Render the tree as an indented listing for terminal inspection
    pub fn render_outline(&self) -> String {
        let mut out = String::new();
        for child in &self.root.children {
            render_node(child, 0, &mut out);
        }
        out
    }
}

fn render_node(node: &Node, depth: usize, out: &mut String) {
    let role = node
        .role
        .map(|r| r.label())
        .unwrap_or("root");
    let attrs = &node.attributes;
    let content = if attrs.text.trim().is_empty() {
        "[空行]"
    } else {
        attrs.text.as_str()
    };
    out.push_str(&"  ".repeat(depth));
    out.push_str(&format!(
        "{role}: {content} (font={}, size={}pt, bold={})\n",
        attrs.font, attrs.size, attrs.bold
    ));
    for child in &node.children {
        render_node(child, depth + 1, out);
    }
}

/// Stack-based builder for the node tree.
///
/// The stack holds the chain of currently-open nodes, seeded with the
/// synthetic root. Pushing a node pops everything of equal or lower
/// precedence (rank >= the new node's), attaching each popped node to its
/// parent, then appends and opens the new node. Stack depth is bounded by
/// the number of distinct ranks.
#[derive(Debug)]
pub struct TreeBuilder {
    stack: Vec<Node>,
}

impl TreeBuilder {
    pub fn new() -> Self {
        TreeBuilder {
            stack: vec![Node::root()],
        }
    }

    /// Append the next classified paragraph in document order.
    pub fn push(&mut self, role: StructuralRole, attributes: ParagraphAttributes) {
        let node = Node::new(role, attributes);
        self.close_down_to(node.rank());
        self.stack.push(node);
    }

    /// Finish the pass and return the root node.
    pub fn finish(mut self) -> Node {
        self.close_down_to(ROOT_RANK + 1);
        // Only the root remains open
        self.stack.pop().unwrap_or_else(Node::root)
    }

    /// Pop open nodes until the top of the stack outranks `rank`, folding
    /// each popped node into its parent. The root is never popped.
    fn close_down_to(&mut self, rank: i8) {
        while self.stack.len() > 1 {
            let top_rank = self.stack[self.stack.len() - 1].rank();
            if rank > top_rank {
                break;
            }
            if let Some(closed) = self.stack.pop() {
                if let Some(parent) = self.stack.last_mut() {
                    parent.children.push(closed);
                }
            }
        }
    }
}

impl Default for TreeBuilder {
    fn default() -> Self {
        TreeBuilder::new()
    }
}

/// Build a tree from an already-classified paragraph sequence.
pub fn build_tree(
    classified: impl IntoIterator<Item = (StructuralRole, ParagraphAttributes)>,
) -> Node {
    let mut builder = TreeBuilder::new();
    for (role, attributes) in classified {
        builder.push(role, attributes);
    }
    builder.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::models::ParagraphAttributes;

    fn para(text: &str) -> ParagraphAttributes {
        ParagraphAttributes::with_text(text)
    }

    fn assert_ancestor_ranks(node: &Node) {
        for child in &node.children {
            assert!(
                node.rank() < child.rank(),
                "ancestor rank {} must be below child rank {}",
                node.rank(),
                child.rank()
            );
            assert_ancestor_ranks(child);
        }
    }

    #[test]
    fn test_headings_nest_under_title() {
        let root = build_tree([
            (StructuralRole::DocumentTitle, para("关于项目的报告")),
            (StructuralRole::Heading1, para("一、概述")),
            (StructuralRole::BodyParagraph, para("正文内容。")),
        ]);

        assert_eq!(root.children.len(), 1);
        let title = &root.children[0];
        assert_eq!(title.role, Some(StructuralRole::DocumentTitle));
        let heading = &title.children[0];
        assert_eq!(heading.role, Some(StructuralRole::Heading1));
        assert_eq!(heading.children[0].role, Some(StructuralRole::BodyParagraph));
        assert_ancestor_ranks(&root);
    }

    #[test]
    fn test_equal_rank_closes_siblings() {
        let root = build_tree([
            (StructuralRole::Heading1, para("一、第一部分")),
            (StructuralRole::Heading1, para("二、第二部分")),
        ]);

        assert_eq!(root.children.len(), 2, "equal ranks must not nest");
        assert_eq!(root.children[0].children.len(), 0);
    }

    #[test]
    fn test_deep_pop_back_to_root_level() {
        // [Heading1, Heading2, BodyParagraph, Heading1]: the second Heading1
        // pops the body paragraph and Heading2 and lands beside the first.
        let root = build_tree([
            (StructuralRole::Heading1, para("一、第一部分")),
            (StructuralRole::Heading2, para("（一）小节")),
            (StructuralRole::BodyParagraph, para("内容。")),
            (StructuralRole::Heading1, para("二、第二部分")),
        ]);

        assert_eq!(root.children.len(), 2);
        let first = &root.children[0];
        assert_eq!(first.children.len(), 1);
        assert_eq!(first.children[0].role, Some(StructuralRole::Heading2));
        assert_eq!(first.children[0].children.len(), 1);
        assert_eq!(root.children[1].role, Some(StructuralRole::Heading1));
        assert_eq!(root.children[1].children.len(), 0);
        assert_ancestor_ranks(&root);
    }

    #[test]
    fn test_blank_line_never_acquires_children() {
        let root = build_tree([
            (StructuralRole::Heading1, para("一、第一部分")),
            (StructuralRole::BlankLine, para("")),
            (StructuralRole::BodyParagraph, para("内容。")),
            (StructuralRole::BlankLine, para("")),
            (StructuralRole::Separator, para("————————")),
        ]);

        for node in root.flatten() {
            if node.role == Some(StructuralRole::BlankLine) {
                assert!(node.children.is_empty(), "blank lines are always leaves");
            }
        }
        assert_ancestor_ranks(&root);
    }

    #[test]
    fn test_first_paragraph_with_low_precedence_attaches_to_root() {
        let root = build_tree([(StructuralRole::BodyParagraph, para("开头就是正文。"))]);
        assert_eq!(root.children.len(), 1);
        assert_eq!(root.children[0].role, Some(StructuralRole::BodyParagraph));
    }

    #[test]
    fn test_flatten_preserves_document_order() {
        let texts = ["标题", "一、甲", "内容一", "二、乙", "内容二"];
        let root = build_tree([
            (StructuralRole::DocumentTitle, para(texts[0])),
            (StructuralRole::Heading1, para(texts[1])),
            (StructuralRole::BodyParagraph, para(texts[2])),
            (StructuralRole::Heading1, para(texts[3])),
            (StructuralRole::BodyParagraph, para(texts[4])),
        ]);

        let flat: Vec<&str> = root
            .flatten()
            .iter()
            .map(|n| n.attributes.text.as_str())
            .collect();
        assert_eq!(flat, texts);
        assert_eq!(root.count(), texts.len());
    }

    #[test]
    fn test_every_role_sequence_builds_without_panic() {
        // Tree construction has no error path: any role order must fold.
        let all_then_reversed = StructuralRole::ALL
            .into_iter()
            .chain(StructuralRole::ALL.into_iter().rev())
            .map(|role| (role, para("x")));
        let root = build_tree(all_then_reversed);
        assert_eq!(root.count(), StructuralRole::ALL.len() * 2);
        assert_ancestor_ranks(&root);
    }
}
