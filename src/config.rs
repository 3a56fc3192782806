//! Configuration for the classifier, context windows, and the remote oracle
//!
//! All tuning knobs live here rather than in process-wide state: thresholds
//! map to a point-size convention, not universal constants, and the keyword
//! lists have been revised across document-standard editions. The `Default`
//! impl carries the canonical values; a TOML file in the user config
//! directory overrides them.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Top-level configuration for a checking run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckConfig {
    pub classifier: ClassifierConfig,
    pub context: ContextConfig,
    pub oracle: OracleConfig,
}

/// Thresholds and keyword lists for the rule-based classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    /// Minimum point size for a centered title candidate
    pub title_size_pt: f32,
    /// Bold text at or above this size infers a first-level heading
    pub heading1_size_pt: f32,
    /// Bold text at or above this size infers a second-level heading
    pub heading2_size_pt: f32,
    /// Bold text at or above this size infers a third-level heading
    pub heading3_size_pt: f32,
    /// List items are short; anything at or above this length is not one
    pub list_item_max_chars: usize,
    /// Numbered text is a list item only when more than this many characters
    /// follow the marker; shorter numbered text is a heading
    pub list_marker_body_min_chars: usize,
    /// Fixed closing phrases (特此报告 and friends)
    pub closing_phrases: Vec<String>,
    /// Organizational-entity words that mark an addressee line
    pub organization_keywords: Vec<String>,
    /// Document-type words (文种) that mark a title
    pub document_type_keywords: Vec<String>,
    /// Characters that make up rule lines
    pub separator_glyphs: String,
    /// Glyphs needing the higher repetition threshold (hyphen, underscore)
    pub separator_narrow_glyphs: String,
    /// Repetition count that makes a glyph a separator
    pub separator_min_repeat: usize,
    /// Repetition count for the narrow glyphs
    pub separator_narrow_min_repeat: usize,
    /// Minimum trimmed length for the distinct-character ratio test
    pub separator_min_len: usize,
    /// Share of distinct characters that must be separator glyphs
    pub separator_ratio: f32,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        ClassifierConfig {
            title_size_pt: 16.0,
            heading1_size_pt: 16.0,
            heading2_size_pt: 14.0,
            heading3_size_pt: 12.0,
            list_item_max_chars: 100,
            list_marker_body_min_chars: 20,
            closing_phrases: to_strings(&[
                "特此报告",
                "特此请示",
                "特此申请",
                "特此函告",
                "特此通知",
                "特此通报",
            ]),
            organization_keywords: to_strings(&[
                "政府",
                "委员会",
                "局",
                "厅",
                "部",
                "院",
                "处",
                "科",
                "司",
                "公司",
                "单位",
            ]),
            document_type_keywords: to_strings(&[
                "报告",
                "请示",
                "申请",
                "通知",
                "通报",
                "函",
                "意见",
                "决定",
                "通告",
                "公告",
                "令",
            ]),
            separator_glyphs: "—―-_*＊×※＝=".to_string(),
            separator_narrow_glyphs: "-_".to_string(),
            separator_min_repeat: 3,
            separator_narrow_min_repeat: 5,
            separator_min_len: 3,
            separator_ratio: 0.8,
        }
    }
}

/// Neighbor-window sizes for downstream analysis prompts
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ContextConfig {
    /// Preceding paragraphs included in each node's context
    pub before: usize,
    /// Following paragraphs included in each node's context
    pub after: usize,
}

impl Default for ContextConfig {
    fn default() -> Self {
        ContextConfig { before: 3, after: 2 }
    }
}

/// Remote chat-completion oracle settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OracleConfig {
    /// Consult the remote model for classification before the rule table
    pub enabled: bool,
    pub api_url: String,
    pub model: String,
    /// Per-request timeout; a timed-out classification falls back to rules
    pub timeout_secs: u64,
    /// Pause between analysis requests to stay under rate limits
    pub request_delay_ms: u64,
    /// Preceding paragraphs sent to the oracle as classification context
    pub context_paragraphs: usize,
}

impl Default for OracleConfig {
    fn default() -> Self {
        OracleConfig {
            enabled: false,
            api_url: "https://api.deepseek.com/v1/chat/completions".to_string(),
            model: "deepseek-chat".to_string(),
            timeout_secs: 30,
            request_delay_ms: 1000,
            context_paragraphs: 3,
        }
    }
}

fn to_strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

impl CheckConfig {
    /// Load configuration from the user config directory, falling back to
    /// the built-in defaults when no file exists
    pub fn load() -> Result<Self> {
        if let Some(config_path) = Self::get_config_path() {
            if config_path.exists() {
                return Self::load_from(&config_path);
            }
        }
        Ok(CheckConfig::default())
    }

    /// Load configuration from an explicit TOML file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: CheckConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to the user config directory
    pub fn save(&self) -> Result<()> {
        if let Some(config_path) = Self::get_config_path() {
            if let Some(parent) = config_path.parent() {
                fs::create_dir_all(parent)?;
            }
            let content = toml::to_string_pretty(self)?;
            fs::write(&config_path, content)?;
        }
        Ok(())
    }

    /// Path to the config file
    pub fn get_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("gwcheck").join("config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_carry_canonical_thresholds() {
        let config = ClassifierConfig::default();
        assert_eq!(config.title_size_pt, 16.0);
        assert_eq!(config.heading2_size_pt, 14.0);
        assert_eq!(config.heading3_size_pt, 12.0);
        assert_eq!(config.closing_phrases.len(), 6);
        assert!(config.separator_glyphs.contains('—'));
    }

    #[test]
    fn test_partial_toml_fills_in_defaults() {
        let config: CheckConfig = toml::from_str(
            "[classifier]\ntitle_size_pt = 18.0\n\n[oracle]\nenabled = true\n",
        )
        .expect("partial config should parse");
        assert_eq!(config.classifier.title_size_pt, 18.0);
        assert_eq!(config.classifier.heading2_size_pt, 14.0);
        assert!(config.oracle.enabled);
        assert_eq!(config.oracle.model, "deepseek-chat");
        assert_eq!(config.context.before, 3);
        assert_eq!(config.context.after, 2);
    }

    #[test]
    fn test_config_round_trips_through_toml() {
        let config = CheckConfig::default();
        let serialized = toml::to_string_pretty(&config).expect("serialize");
        let reparsed: CheckConfig = toml::from_str(&serialized).expect("reparse");
        assert_eq!(
            reparsed.classifier.organization_keywords,
            config.classifier.organization_keywords
        );
        assert_eq!(reparsed.oracle.timeout_secs, config.oracle.timeout_secs);
    }
}
