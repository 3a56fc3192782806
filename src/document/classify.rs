//! Paragraph classification
//!
//! This module assigns a structural role to each paragraph from its text and
//! paragraph-level formatting. The rule table is layered: pattern matches
//! first, then keyword matches, then style heuristics, then the body-text
//! default. An optional remote oracle can be consulted ahead of the rules;
//! every oracle failure degrades to the deterministic rule path, so the
//! classifier is total and never blocks tree construction.

use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;
use unicode_segmentation::UnicodeSegmentation;

use crate::ai::ClassificationOracle;
use crate::config::ClassifierConfig;

use super::models::{Alignment, OutlineLevel, ParagraphAttributes, StructuralRole};

/// Signature lines carry a fully written date (年份标全称, 月日不编虚位)
static DATE_PATTERN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"\d{4}年\d{1,2}月\d{1,2}日").expect("date pattern is compile-time constant")
});

const CHINESE_NUMERALS: &str = "一二三四五六七八九十";
const BULLET_PREFIXES: [&str; 6] = ["•", "·", "▪", "▫", "-", "—"];

/// Deterministic rule-based classifier.
///
/// Pure over its inputs: the same attributes always yield the same role.
#[derive(Debug, Clone)]
pub struct RuleClassifier {
    config: ClassifierConfig,
}

impl RuleClassifier {
    pub fn new(config: ClassifierConfig) -> Self {
        RuleClassifier { config }
    }

    pub fn config(&self) -> &ClassifierConfig {
        &self.config
    }

    /// Assign a structural role; first matching rule wins.
    pub fn classify(&self, attrs: &ParagraphAttributes) -> StructuralRole {
        let text = attrs.text.trim();

        if text.is_empty() {
            return StructuralRole::BlankLine;
        }

        if self.is_separator(text) {
            return StructuralRole::Separator;
        }

        if text.starts_with("附件：") || text.starts_with("附件:") {
            return StructuralRole::Attachment;
        }

        if self
            .config
            .closing_phrases
            .iter()
            .any(|phrase| text.contains(phrase.as_str()))
        {
            return StructuralRole::Closing;
        }

        if (text.ends_with('：') || text.ends_with(':'))
            && self
                .config
                .organization_keywords
                .iter()
                .any(|keyword| text.contains(keyword.as_str()))
        {
            return StructuralRole::Addressee;
        }

        if DATE_PATTERN.is_match(text) {
            return StructuralRole::Signature;
        }

        if attrs.alignment == Alignment::Center
            && attrs.size >= self.config.title_size_pt
            && self
                .config
                .document_type_keywords
                .iter()
                .any(|keyword| text.contains(keyword.as_str()))
        {
            return StructuralRole::DocumentTitle;
        }

        if self.is_list_item(text) {
            return StructuralRole::ListItem;
        }

        if let Some(role) = heading_from_numbering(text) {
            return role;
        }

        if let OutlineLevel::Heading(level) = attrs.outline_level {
            if let Some(role) = StructuralRole::from_heading_level(level) {
                return role;
            }
        }

        if attrs.bold {
            if attrs.size >= self.config.heading1_size_pt {
                return StructuralRole::Heading1;
            }
            if attrs.size >= self.config.heading2_size_pt {
                return StructuralRole::Heading2;
            }
            if attrs.size >= self.config.heading3_size_pt {
                return StructuralRole::Heading3;
            }
        }

        StructuralRole::BodyParagraph
    }

    /// A rule line: dominated by separator glyphs, or one glyph repeated
    /// past its threshold.
    fn is_separator(&self, text: &str) -> bool {
        let glyphs: Vec<char> = self.config.separator_glyphs.chars().collect();
        let distinct: Vec<char> = {
            let mut seen = Vec::new();
            for c in text.chars() {
                if !seen.contains(&c) {
                    seen.push(c);
                }
            }
            seen
        };

        if !distinct.is_empty() && text.chars().count() >= self.config.separator_min_len {
            let matching = distinct.iter().filter(|c| glyphs.contains(c)).count();
            let ratio = matching as f32 / distinct.len() as f32;
            if ratio >= self.config.separator_ratio {
                return true;
            }
        }

        for glyph in &glyphs {
            let threshold = if self.config.separator_narrow_glyphs.contains(*glyph) {
                self.config.separator_narrow_min_repeat
            } else {
                self.config.separator_min_repeat
            };
            if text.chars().filter(|c| c == glyph).count() >= threshold {
                return true;
            }
        }

        false
    }

    /// Bullet-led text is always a list item; numbered text only when
    /// substantial content follows the marker, otherwise the numbering
    /// rules read it as a heading.
    fn is_list_item(&self, text: &str) -> bool {
        if text.graphemes(true).count() >= self.config.list_item_max_chars {
            return false;
        }

        if BULLET_PREFIXES
            .iter()
            .any(|prefix| text.starts_with(prefix))
        {
            return true;
        }

        if let Some(body) = strip_numbered_marker(text) {
            return body.graphemes(true).count() > self.config.list_marker_body_min_chars;
        }

        false
    }
}

/// Content after a leading numbering marker (digit+`.`, Latin letter+`.`,
/// or Chinese numeral+`、`), or None when the text is not marker-led.
fn strip_numbered_marker(text: &str) -> Option<&str> {
    let first = text.chars().next()?;

    if first.is_ascii_digit() || first.is_ascii_alphabetic() {
        let prefix: String = text.chars().take(3).collect();
        if let Some(dot) = prefix.find('.') {
            return Some(text[dot + '.'.len_utf8()..].trim_start());
        }
        return None;
    }

    if CHINESE_NUMERALS.contains(first) {
        let prefix: String = text.chars().take(3).collect();
        if let Some(comma) = prefix.find('、') {
            return Some(text[comma + '、'.len_utf8()..].trim_start());
        }
    }

    None
}

/// Heading level from the leading numbering convention:
/// 一、 → level 1, （一） → level 2, 1. → level 3, （1） → level 4.
fn heading_from_numbering(text: &str) -> Option<StructuralRole> {
    let mut chars = text.chars();
    let first = chars.next()?;

    if CHINESE_NUMERALS.contains(first) && text.chars().take(3).any(|c| c == '、') {
        return Some(StructuralRole::Heading1);
    }

    if first == '（' {
        let second = chars.next()?;
        if text.contains('）') {
            if CHINESE_NUMERALS.contains(second) {
                return Some(StructuralRole::Heading2);
            }
            if second.is_ascii_digit() {
                return Some(StructuralRole::Heading4);
            }
        }
        return None;
    }

    if first.is_ascii_digit() && text.chars().take(3).any(|c| c == '.') {
        return Some(StructuralRole::Heading3);
    }

    None
}

/// Oracle-first classifier with the rule table as fallback.
///
/// The oracle is an injected capability; when it is absent, disabled, or
/// failing, classification is exactly the deterministic rule path.
#[derive(Debug)]
pub struct HybridClassifier<O> {
    rules: RuleClassifier,
    oracle: Option<O>,
}

impl<O: ClassificationOracle> HybridClassifier<O> {
    pub fn new(rules: RuleClassifier, oracle: Option<O>) -> Self {
        HybridClassifier { rules, oracle }
    }

    pub fn rules(&self) -> &RuleClassifier {
        &self.rules
    }

    /// Classify one paragraph, consulting the oracle first when present.
    ///
    /// `preceding` is the already-seen paragraph window in document order;
    /// the oracle implementation decides how much of it to use.
    pub async fn classify(
        &self,
        attrs: &ParagraphAttributes,
        preceding: &[ParagraphAttributes],
    ) -> StructuralRole {
        if let Some(oracle) = &self.oracle {
            match oracle.classify(attrs, preceding).await {
                Ok(role) => return role,
                Err(err) => {
                    warn!("oracle classification failed, using rule fallback: {err}");
                }
            }
        }
        self.rules.classify(attrs)
    }
}
