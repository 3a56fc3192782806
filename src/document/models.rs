//! Core data structures for document representation
//!
//! This module defines the public types used to represent a parsed official
//! document: paragraph-level formatting attributes, the closed set of
//! structural roles, and the rank table that drives tree nesting.

use serde::{Deserialize, Serialize};

/// Paragraph alignment category from the source document.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum Alignment {
    Start,
    Center,
    End,
    Justify,
    Distribute,
    #[default]
    Unspecified,
}

impl Alignment {
    /// Chinese description as shown in Word's paragraph dialog
    pub fn describe(&self) -> &'static str {
        match self {
            Alignment::Start => "左对齐",
            Alignment::Center => "居中",
            Alignment::End => "右对齐",
            Alignment::Justify => "两端对齐",
            Alignment::Distribute => "分散对齐",
            Alignment::Unspecified => "未指定",
        }
    }
}

/// Author-declared outline depth, independent of visual formatting.
///
/// Word stores `w:outlineLvl` as 0-8; we carry it as 1-9 so that
/// `Heading(1)` reads as 标题1, matching the dialog.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum OutlineLevel {
    Heading(u8),
    #[default]
    BodyText,
}

impl OutlineLevel {
    pub fn describe(&self) -> String {
        match self {
            OutlineLevel::Heading(level) => format!("标题{level}"),
            OutlineLevel::BodyText => "正文文本".to_string(),
        }
    }
}

/// Line spacing rule from the paragraph dialog.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum LineSpacingRule {
    #[default]
    Single,
    OnePointFive,
    Double,
    Multiple,
    AtLeast,
    Exactly,
    Auto,
}

/// Line spacing as (rule, value). For the multiple-based rules the value is
/// a factor; for AtLeast/Exactly it is points.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct LineSpacing {
    pub rule: LineSpacingRule,
    pub value: f32,
}

impl Default for LineSpacing {
    fn default() -> Self {
        LineSpacing {
            rule: LineSpacingRule::Single,
            value: 1.0,
        }
    }
}

impl LineSpacing {
    /// Chinese description as shown in Word's paragraph dialog
    pub fn describe(&self) -> String {
        match self.rule {
            LineSpacingRule::Single => "单倍行距".to_string(),
            LineSpacingRule::OnePointFive => "1.5倍行距".to_string(),
            LineSpacingRule::Double => "2倍行距".to_string(),
            LineSpacingRule::Multiple => format!("{}倍行距", self.value),
            LineSpacingRule::AtLeast => format!("最小值 {}磅", self.value),
            LineSpacingRule::Exactly => format!("固定值 {}磅", self.value),
            LineSpacingRule::Auto => "自动".to_string(),
        }
    }
}

/// Indent amounts in points. Word encodes first-line and hanging indents in
/// the same attribute with opposite signs; the loader splits them.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
pub struct Indentation {
    pub left: f32,
    pub right: f32,
    pub first_line: f32,
    pub hanging: f32,
}

/// Everything the classifier sees about one paragraph.
///
/// Produced by the loader; treated as a read-only value from then on.
/// Missing source attributes are filled with the documented defaults so the
/// classifier is total over its input domain.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ParagraphAttributes {
    pub text: String,
    pub font: String,
    /// Nominal size in points
    pub size: f32,
    pub bold: bool,
    pub alignment: Alignment,
    pub outline_level: OutlineLevel,
    /// Spacing before the paragraph, in points
    pub space_before: f32,
    /// Spacing after the paragraph, in points
    pub space_after: f32,
    pub line_spacing: LineSpacing,
    pub indentation: Indentation,
}

impl Default for ParagraphAttributes {
    fn default() -> Self {
        ParagraphAttributes {
            text: String::new(),
            font: "Default".to_string(),
            size: 12.0,
            bold: false,
            alignment: Alignment::default(),
            outline_level: OutlineLevel::default(),
            space_before: 0.0,
            space_after: 0.0,
            line_spacing: LineSpacing::default(),
            indentation: Indentation::default(),
        }
    }
}

impl ParagraphAttributes {
    /// Convenience constructor for the common case of plain text
    pub fn with_text(text: impl Into<String>) -> Self {
        ParagraphAttributes {
            text: text.into(),
            ..ParagraphAttributes::default()
        }
    }
}

/// The semantic category assigned to one paragraph.
///
/// Discriminants double as nesting ranks: lower rank = coarser/outer. The
/// serialized labels are the vocabulary the remote oracle speaks.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum StructuralRole {
    #[serde(rename = "发文标题")]
    DocumentTitle = 0,
    #[serde(rename = "主送机关")]
    Addressee = 1,
    #[serde(rename = "一级标题")]
    Heading1 = 2,
    #[serde(rename = "二级标题")]
    Heading2 = 3,
    #[serde(rename = "三级标题")]
    Heading3 = 4,
    #[serde(rename = "四级标题")]
    Heading4 = 5,
    #[serde(rename = "列表项")]
    ListItem = 6,
    #[serde(rename = "普通段落")]
    BodyParagraph = 7,
    #[serde(rename = "结尾")]
    Closing = 8,
    #[serde(rename = "落款")]
    Signature = 9,
    #[serde(rename = "附件")]
    Attachment = 10,
    #[serde(rename = "分隔符")]
    Separator = 11,
    #[serde(rename = "空行")]
    BlankLine = 12,
}

impl StructuralRole {
    /// All roles in rank order; `ALL[role.rank() as usize] == role`
    pub const ALL: [StructuralRole; 13] = [
        StructuralRole::DocumentTitle,
        StructuralRole::Addressee,
        StructuralRole::Heading1,
        StructuralRole::Heading2,
        StructuralRole::Heading3,
        StructuralRole::Heading4,
        StructuralRole::ListItem,
        StructuralRole::BodyParagraph,
        StructuralRole::Closing,
        StructuralRole::Signature,
        StructuralRole::Attachment,
        StructuralRole::Separator,
        StructuralRole::BlankLine,
    ];

    /// Nesting rank; ancestors always have strictly smaller ranks than
    /// descendants.
    pub const fn rank(self) -> u8 {
        self as u8
    }

    /// Wire label used in prompts, JSON output, and oracle responses
    pub const fn label(self) -> &'static str {
        match self {
            StructuralRole::DocumentTitle => "发文标题",
            StructuralRole::Addressee => "主送机关",
            StructuralRole::Heading1 => "一级标题",
            StructuralRole::Heading2 => "二级标题",
            StructuralRole::Heading3 => "三级标题",
            StructuralRole::Heading4 => "四级标题",
            StructuralRole::ListItem => "列表项",
            StructuralRole::BodyParagraph => "普通段落",
            StructuralRole::Closing => "结尾",
            StructuralRole::Signature => "落款",
            StructuralRole::Attachment => "附件",
            StructuralRole::Separator => "分隔符",
            StructuralRole::BlankLine => "空行",
        }
    }

    /// Heading role for an author-declared outline depth (1-4)
    pub const fn from_heading_level(level: u8) -> Option<StructuralRole> {
        match level {
            1 => Some(StructuralRole::Heading1),
            2 => Some(StructuralRole::Heading2),
            3 => Some(StructuralRole::Heading3),
            4 => Some(StructuralRole::Heading4),
            _ => None,
        }
    }
}

impl std::fmt::Display for StructuralRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

impl std::str::FromStr for StructuralRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StructuralRole::ALL
            .into_iter()
            .find(|role| role.label() == s.trim())
            .ok_or_else(|| format!("unknown structural role '{s}'"))
    }
}
