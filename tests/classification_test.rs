use gwcheck::config::ClassifierConfig;
use gwcheck::document::{Alignment, OutlineLevel, ParagraphAttributes, RuleClassifier, StructuralRole};

fn classifier() -> RuleClassifier {
    RuleClassifier::new(ClassifierConfig::default())
}

fn para(text: &str) -> ParagraphAttributes {
    ParagraphAttributes::with_text(text)
}

#[cfg(test)]
mod scenario_tests {
    use super::*;

    #[test]
    fn test_numbered_heading_beats_emphasis() {
        let mut attrs = para("一、项目概述");
        attrs.size = 14.0;
        attrs.bold = false;
        assert_eq!(classifier().classify(&attrs), StructuralRole::Heading1);
    }

    #[test]
    fn test_parenthesized_chinese_numeral_is_second_level() {
        assert_eq!(
            classifier().classify(&para("（一）项目背景")),
            StructuralRole::Heading2
        );
    }

    #[test]
    fn test_em_dash_run_is_separator() {
        assert_eq!(
            classifier().classify(&para(&"—".repeat(20))),
            StructuralRole::Separator
        );
    }

    #[test]
    fn test_attachment_marker() {
        assert_eq!(
            classifier().classify(&para("附件：1.项目实施方案")),
            StructuralRole::Attachment
        );
    }

    #[test]
    fn test_closing_phrase() {
        assert_eq!(classifier().classify(&para("特此报告")), StructuralRole::Closing);
    }

    #[test]
    fn test_whitespace_only_is_blank_line() {
        assert_eq!(classifier().classify(&para("")), StructuralRole::BlankLine);
        assert_eq!(classifier().classify(&para(" \u{3000}\t ")), StructuralRole::BlankLine);
    }

    #[test]
    fn test_document_title_from_center_size_and_keyword() {
        let mut attrs = para("关于加强项目管理工作的报告");
        attrs.alignment = Alignment::Center;
        attrs.size = 22.0;
        attrs.font = "方正小标宋简体".to_string();
        assert_eq!(classifier().classify(&attrs), StructuralRole::DocumentTitle);
    }

    #[test]
    fn test_addressee_line() {
        let mut attrs = para("XX市人民政府：");
        attrs.size = 14.0;
        attrs.font = "仿宋_GB2312".to_string();
        assert_eq!(classifier().classify(&attrs), StructuralRole::Addressee);
    }

    #[test]
    fn test_signature_with_date() {
        assert_eq!(
            classifier().classify(&para("XX单位 2024年1月15日")),
            StructuralRole::Signature
        );
    }

    #[test]
    fn test_bullet_item() {
        assert_eq!(
            classifier().classify(&para("• 系统架构设计")),
            StructuralRole::ListItem
        );
    }
}

#[cfg(test)]
mod property_tests {
    use super::*;

    #[test]
    fn test_totality_over_awkward_inputs() {
        let c = classifier();
        let inputs = [
            "",
            " ",
            "、",
            "（",
            "（）",
            "1",
            ".",
            "一",
            "——",
            "附件",
            "：",
            "a",
            "2024年",
            "特此",
            "\u{FEFF}",
            "普通的一句话。",
        ];
        for text in inputs {
            let role = c.classify(&para(text));
            assert!(
                StructuralRole::ALL.contains(&role),
                "'{text}' must classify into the closed role set"
            );
        }
    }

    #[test]
    fn test_idempotence_without_oracle() {
        let c = classifier();
        for text in ["一、项目概述", "特此报告", "", "普通段落内容。"] {
            let attrs = para(text);
            let first = c.classify(&attrs);
            let second = c.classify(&attrs);
            assert_eq!(first, second, "rule-based classification is deterministic");
        }
    }

    #[test]
    fn test_rank_order_matches_role_table() {
        // DocumentTitle outranks everything; BlankLine ranks below everything
        let ranks: Vec<u8> = StructuralRole::ALL.iter().map(|r| r.rank()).collect();
        let mut sorted = ranks.clone();
        sorted.sort_unstable();
        assert_eq!(ranks, sorted);
        assert_eq!(StructuralRole::DocumentTitle.rank(), 0);
        assert_eq!(StructuralRole::BlankLine.rank(), 12);
    }

    #[test]
    fn test_missing_attributes_use_defaults() {
        // A paragraph with nothing but text classifies from defaults:
        // Default font, 12pt, not bold, body text outline
        let attrs = para("没有任何格式信息的段落");
        assert_eq!(classifier().classify(&attrs), StructuralRole::BodyParagraph);
    }

    #[test]
    fn test_outline_level_maps_directly() {
        let c = classifier();
        for (level, expected) in [
            (1, StructuralRole::Heading1),
            (2, StructuralRole::Heading2),
            (3, StructuralRole::Heading3),
            (4, StructuralRole::Heading4),
        ] {
            let mut attrs = para("未编号的标题文字");
            attrs.outline_level = OutlineLevel::Heading(level);
            assert_eq!(c.classify(&attrs), expected);
        }
    }

    #[test]
    fn test_thresholds_are_configuration_not_constants() {
        let mut config = ClassifierConfig::default();
        config.heading2_size_pt = 15.0;
        let c = RuleClassifier::new(config);

        let mut attrs = para("加粗的标题文字");
        attrs.bold = true;
        attrs.size = 14.0;
        // 14pt no longer reaches the raised second-level threshold
        assert_eq!(c.classify(&attrs), StructuralRole::Heading3);
    }
}
