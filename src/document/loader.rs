//! Document loading and orchestration
//!
//! Reads the WordprocessingML parts of a .docx archive and produces the
//! ordered paragraph-attribute sequence the classifier consumes, then
//! orchestrates classification and tree construction. Empty paragraphs are
//! kept: they become blank-line nodes so context windows can see document
//! whitespace.
//!
//! The reader goes straight to `word/document.xml` and `word/styles.xml`
//! because run-level sizes, alignment, and indents live in attributes that
//! higher-level docx crates do not expose.

use anyhow::{Context, Result};
use roxmltree::Node as XmlNode;
use std::collections::HashMap;
use std::io::Read;
use std::path::Path;
use tracing::debug;
use zip::ZipArchive;

use crate::ai::ClassificationOracle;

use super::classify::HybridClassifier;
use super::io::validate_docx_file;
use super::models::{
    Alignment, Indentation, LineSpacing, LineSpacingRule, OutlineLevel, ParagraphAttributes,
    StructuralRole,
};
use super::tree::{DocumentTree, TreeBuilder};

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const TWIPS_PER_POINT: f32 = 20.0;
const LINE_UNITS_PER_MULTIPLE: f32 = 240.0;

/// Run- and paragraph-level properties a style can contribute
#[derive(Debug, Clone, Default)]
struct StyleProperties {
    size_half_points: Option<u32>,
    east_asia: Option<String>,
    ascii: Option<String>,
    bold: Option<bool>,
}

impl StyleProperties {
    fn merge_missing_from(&mut self, other: &StyleProperties) {
        if self.size_half_points.is_none() {
            self.size_half_points = other.size_half_points;
        }
        if self.east_asia.is_none() {
            self.east_asia = other.east_asia.clone();
        }
        if self.ascii.is_none() {
            self.ascii = other.ascii.clone();
        }
        if self.bold.is_none() {
            self.bold = other.bold;
        }
    }
}

#[derive(Debug, Clone, Default)]
struct StyleDefinition {
    based_on: Option<String>,
    props: StyleProperties,
}

/// Parsed word/styles.xml with basedOn resolution
#[derive(Debug, Default)]
struct StyleSheet {
    styles: HashMap<String, StyleDefinition>,
}

impl StyleSheet {
    fn parse(xml: &str) -> Result<Self> {
        let doc = roxmltree::Document::parse(xml)?;
        let mut styles = HashMap::new();

        for style_node in doc
            .root_element()
            .children()
            .filter(|n| n.tag_name().name() == "style")
        {
            let Some(style_id) = style_node.attribute((W_NS, "styleId")) else {
                continue;
            };

            let based_on = style_node
                .children()
                .find(|n| n.tag_name().name() == "basedOn")
                .and_then(|n| n.attribute((W_NS, "val")))
                .map(|s| s.to_string());

            let props = style_node
                .children()
                .find(|n| n.tag_name().name() == "rPr")
                .map(|rpr| read_run_properties(&rpr))
                .unwrap_or_default();

            styles.insert(style_id.to_string(), StyleDefinition { based_on, props });
        }

        Ok(StyleSheet { styles })
    }

    /// Follow the basedOn chain; nearest definition of each property wins.
    /// Visited tracking breaks inheritance cycles.
    fn resolve(&self, style_id: &str) -> StyleProperties {
        let mut resolved = StyleProperties::default();
        let mut visited: Vec<&str> = Vec::new();
        let mut current = style_id;

        while let Some(style) = self.styles.get(current) {
            if visited.contains(&current) {
                break;
            }
            visited.push(current);
            resolved.merge_missing_from(&style.props);
            match &style.based_on {
                Some(base) => current = base.as_str(),
                None => break,
            }
        }

        resolved
    }
}

/// Read sz / rFonts / b out of an rPr element
fn read_run_properties(rpr: &XmlNode) -> StyleProperties {
    let mut props = StyleProperties::default();

    for child in rpr.children() {
        match child.tag_name().name() {
            "sz" => {
                props.size_half_points = child
                    .attribute((W_NS, "val"))
                    .and_then(|v| v.parse::<u32>().ok());
            }
            "rFonts" => {
                props.east_asia = child.attribute((W_NS, "eastAsia")).map(|s| s.to_string());
                props.ascii = child.attribute((W_NS, "ascii")).map(|s| s.to_string());
            }
            "b" => {
                // Presence means bold unless explicitly switched off
                props.bold = Some(!matches!(
                    child.attribute((W_NS, "val")),
                    Some("0") | Some("false")
                ));
            }
            _ => {}
        }
    }

    props
}

/// Load the ordered paragraph sequence from a .docx file.
pub fn load_paragraphs(path: &Path) -> Result<Vec<ParagraphAttributes>> {
    validate_docx_file(path)?;

    let file = std::fs::File::open(path)?;
    let mut archive = ZipArchive::new(file)?;

    let stylesheet = match archive.by_name("word/styles.xml") {
        Ok(mut part) => {
            let mut xml = String::new();
            part.read_to_string(&mut xml)?;
            StyleSheet::parse(&xml)?
        }
        Err(_) => StyleSheet::default(),
    };

    let mut document_xml = String::new();
    archive
        .by_name("word/document.xml")
        .context("missing word/document.xml")?
        .read_to_string(&mut document_xml)?;

    let doc = roxmltree::Document::parse(&document_xml)?;
    let body = doc
        .root_element()
        .children()
        .find(|n| n.tag_name().name() == "body")
        .context("document has no body element")?;

    let paragraphs: Vec<ParagraphAttributes> = body
        .children()
        .filter(|n| n.tag_name().name() == "p")
        .map(|p| read_paragraph(&p, &stylesheet))
        .collect();

    debug!("loaded {} paragraphs from {}", paragraphs.len(), path.display());
    Ok(paragraphs)
}

/// Extract one paragraph's text and formatting, applying style inheritance
/// and the documented defaults for anything missing
fn read_paragraph(para: &XmlNode, stylesheet: &StyleSheet) -> ParagraphAttributes {
    let mut attrs = ParagraphAttributes::default();

    let mut text = String::new();
    for node in para.descendants().filter(|n| n.tag_name().name() == "t") {
        if let Some(content) = node.text() {
            text.push_str(content);
        }
    }
    attrs.text = text.replace(['\r', '\n'], "");

    let ppr = para.children().find(|n| n.tag_name().name() == "pPr");

    let style_id = ppr
        .and_then(|ppr| {
            ppr.children()
                .find(|n| n.tag_name().name() == "pStyle")
                .and_then(|ps| ps.attribute((W_NS, "val")))
        })
        .unwrap_or("Normal");
    let style_props = stylesheet.resolve(style_id);

    if let Some(ppr) = ppr {
        for child in ppr.children() {
            match child.tag_name().name() {
                "jc" => {
                    attrs.alignment = match child.attribute((W_NS, "val")) {
                        Some("center") => Alignment::Center,
                        Some("left") | Some("start") => Alignment::Start,
                        Some("right") | Some("end") => Alignment::End,
                        Some("both") => Alignment::Justify,
                        Some("distribute") => Alignment::Distribute,
                        _ => Alignment::Unspecified,
                    };
                }
                "outlineLvl" => {
                    // Stored 0-8; carried as 1-9
                    if let Some(level) = child
                        .attribute((W_NS, "val"))
                        .and_then(|v| v.parse::<u8>().ok())
                    {
                        if level <= 8 {
                            attrs.outline_level = OutlineLevel::Heading(level + 1);
                        }
                    }
                }
                "spacing" => {
                    if let Some(before) = parse_twips(child.attribute((W_NS, "before"))) {
                        attrs.space_before = before;
                    }
                    if let Some(after) = parse_twips(child.attribute((W_NS, "after"))) {
                        attrs.space_after = after;
                    }
                    attrs.line_spacing = read_line_spacing(&child);
                }
                "ind" => {
                    attrs.indentation = read_indentation(&child);
                }
                _ => {}
            }
        }
    }

    // First run's properties win; the style chain fills the gaps
    let mut run_props = StyleProperties::default();
    for run in para.descendants().filter(|n| n.tag_name().name() == "r") {
        if let Some(rpr) = run.children().find(|n| n.tag_name().name() == "rPr") {
            run_props.merge_missing_from(&read_run_properties(&rpr));
        }
        if run_props.size_half_points.is_some()
            && (run_props.east_asia.is_some() || run_props.ascii.is_some())
            && run_props.bold.is_some()
        {
            break;
        }
    }
    run_props.merge_missing_from(&style_props);

    if let Some(half_points) = run_props.size_half_points {
        attrs.size = half_points as f32 / 2.0;
    }
    if let Some(font) = run_props.east_asia.or(run_props.ascii) {
        attrs.font = font;
    }
    attrs.bold = run_props.bold.unwrap_or(false);

    attrs
}

fn parse_twips(value: Option<&str>) -> Option<f32> {
    value
        .and_then(|v| v.parse::<f32>().ok())
        .map(|twips| twips / TWIPS_PER_POINT)
}

fn read_line_spacing(spacing: &XmlNode) -> LineSpacing {
    let Some(line) = spacing
        .attribute((W_NS, "line"))
        .and_then(|v| v.parse::<f32>().ok())
    else {
        return LineSpacing::default();
    };

    match spacing.attribute((W_NS, "lineRule")) {
        Some("exact") => LineSpacing {
            rule: LineSpacingRule::Exactly,
            value: line / TWIPS_PER_POINT,
        },
        Some("atLeast") => LineSpacing {
            rule: LineSpacingRule::AtLeast,
            value: line / TWIPS_PER_POINT,
        },
        // "auto" and anything else: the value is a multiple of single spacing
        _ => {
            let factor = line / LINE_UNITS_PER_MULTIPLE;
            let rule = if (factor - 1.0).abs() < f32::EPSILON {
                LineSpacingRule::Single
            } else if (factor - 1.5).abs() < f32::EPSILON {
                LineSpacingRule::OnePointFive
            } else if (factor - 2.0).abs() < f32::EPSILON {
                LineSpacingRule::Double
            } else {
                LineSpacingRule::Multiple
            };
            LineSpacing {
                rule,
                value: factor,
            }
        }
    }
}

fn read_indentation(ind: &XmlNode) -> Indentation {
    let left = parse_twips(
        ind.attribute((W_NS, "left"))
            .or_else(|| ind.attribute((W_NS, "start"))),
    )
    .unwrap_or(0.0);
    let right = parse_twips(
        ind.attribute((W_NS, "right"))
            .or_else(|| ind.attribute((W_NS, "end"))),
    )
    .unwrap_or(0.0);
    let first_line = parse_twips(ind.attribute((W_NS, "firstLine"))).unwrap_or(0.0);
    let hanging = parse_twips(ind.attribute((W_NS, "hanging"))).unwrap_or(0.0);

    Indentation {
        left,
        right,
        first_line,
        hanging,
    }
}

/// Parse a document into its structural node tree.
///
/// Classification is strictly sequential in document order: each
/// paragraph's classification may consult the already-seen preceding
/// paragraphs, never later ones. Blank paragraphs skip the oracle — their
/// role is unambiguous.
pub async fn parse_document<O: ClassificationOracle>(
    path: &Path,
    classifier: &HybridClassifier<O>,
) -> Result<DocumentTree> {
    let paragraphs = load_paragraphs(path)?;
    let paragraph_count = paragraphs.len();

    let mut builder = TreeBuilder::new();
    let mut seen: Vec<ParagraphAttributes> = Vec::new();

    for attrs in paragraphs {
        let role = if attrs.text.trim().is_empty() {
            StructuralRole::BlankLine
        } else {
            let role = classifier.classify(&attrs, &seen).await;
            seen.push(attrs.clone());
            role
        };
        builder.push(role, attrs);
    }

    Ok(DocumentTree {
        source: path.display().to_string(),
        paragraph_count,
        root: builder.finish(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClassifierConfig;
    use crate::document::classify::RuleClassifier;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    const DOCUMENT_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p>
      <w:pPr><w:jc w:val="center"/></w:pPr>
      <w:r>
        <w:rPr><w:sz w:val="44"/><w:rFonts w:eastAsia="方正小标宋简体"/></w:rPr>
        <w:t>关于加强项目管理工作的报告</w:t>
      </w:r>
    </w:p>
    <w:p>
      <w:r><w:rPr><w:sz w:val="28"/></w:rPr><w:t>XX市人民政府：</w:t></w:r>
    </w:p>
    <w:p>
      <w:pPr><w:outlineLvl w:val="0"/></w:pPr>
      <w:r><w:rPr><w:b/></w:rPr><w:t>一、项目概述</w:t></w:r>
    </w:p>
    <w:p>
      <w:pPr>
        <w:ind w:firstLine="442" w:left="200"/>
        <w:spacing w:before="100" w:after="160" w:line="360" w:lineRule="auto"/>
      </w:pPr>
      <w:r><w:t>这是一个普通的段落内容，</w:t></w:r>
      <w:r><w:t>分成两个文本块。</w:t></w:r>
    </w:p>
    <w:p/>
    <w:p>
      <w:r><w:t>2024年1月15日</w:t></w:r>
    </w:p>
  </w:body>
</w:document>"#;

    const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:style w:styleId="Normal">
    <w:rPr><w:sz w:val="24"/><w:rFonts w:eastAsia="仿宋_GB2312"/></w:rPr>
  </w:style>
  <w:style w:styleId="Heading1">
    <w:basedOn w:val="Normal"/>
    <w:rPr><w:sz w:val="32"/><w:b/></w:rPr>
  </w:style>
</w:styles>"#;

    fn write_fixture(name: &str, document_xml: &str, styles_xml: Option<&str>) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(name);
        let file = std::fs::File::create(&path).expect("create fixture");
        let mut writer = zip::ZipWriter::new(file);
        let options = SimpleFileOptions::default();
        writer
            .start_file("word/document.xml", options)
            .expect("start document.xml");
        writer
            .write_all(document_xml.as_bytes())
            .expect("write document.xml");
        if let Some(styles) = styles_xml {
            writer
                .start_file("word/styles.xml", options)
                .expect("start styles.xml");
            writer.write_all(styles.as_bytes()).expect("write styles.xml");
        }
        writer.finish().expect("finish zip");
        path
    }

    #[test]
    fn test_load_paragraphs_extracts_attributes() {
        let path = write_fixture("gwcheck_loader_attributes.docx", DOCUMENT_XML, None);
        let paragraphs = load_paragraphs(&path).expect("load");

        assert_eq!(paragraphs.len(), 6);

        let title = &paragraphs[0];
        assert_eq!(title.text, "关于加强项目管理工作的报告");
        assert_eq!(title.alignment, Alignment::Center);
        assert_eq!(title.size, 22.0);
        assert_eq!(title.font, "方正小标宋简体");

        let heading = &paragraphs[2];
        assert!(heading.bold);
        assert_eq!(heading.outline_level, OutlineLevel::Heading(1));

        let body = &paragraphs[3];
        assert_eq!(body.text, "这是一个普通的段落内容，分成两个文本块。");
        assert!((body.indentation.first_line - 22.1).abs() < 0.01);
        assert!((body.indentation.left - 10.0).abs() < 0.01);
        assert!((body.space_before - 5.0).abs() < 0.01);
        assert!((body.space_after - 8.0).abs() < 0.01);
        assert_eq!(body.line_spacing.rule, LineSpacingRule::OnePointFive);

        let blank = &paragraphs[4];
        assert!(blank.text.is_empty());
        assert_eq!(blank.font, "Default");
        assert_eq!(blank.size, 12.0);
    }

    #[test]
    fn test_styles_fill_missing_run_properties() {
        let document = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main">
  <w:body>
    <w:p>
      <w:pPr><w:pStyle w:val="Heading1"/></w:pPr>
      <w:r><w:t>样式继承的标题</w:t></w:r>
    </w:p>
    <w:p>
      <w:r><w:t>默认样式的正文</w:t></w:r>
    </w:p>
  </w:body>
</w:document>"#;
        let path = write_fixture("gwcheck_loader_styles.docx", document, Some(STYLES_XML));
        let paragraphs = load_paragraphs(&path).expect("load");

        // Heading1 carries its own size and bold, inherits the font
        let heading = &paragraphs[0];
        assert_eq!(heading.size, 16.0);
        assert!(heading.bold);
        assert_eq!(heading.font, "仿宋_GB2312");

        // The second paragraph falls back to the Normal style
        let body = &paragraphs[1];
        assert_eq!(body.size, 12.0);
        assert!(!body.bold);
        assert_eq!(body.font, "仿宋_GB2312");
    }

    #[test]
    fn test_rejects_wrong_extension() {
        let path = std::env::temp_dir().join("gwcheck_loader_not_docx.txt");
        std::fs::write(&path, "not a document").expect("write");
        assert!(load_paragraphs(&path).is_err());
    }

    #[tokio::test]
    async fn test_parse_document_builds_nested_tree() {
        let path = write_fixture("gwcheck_loader_tree.docx", DOCUMENT_XML, None);
        let classifier: HybridClassifier<crate::ai::DeepSeekClient> = HybridClassifier::new(
            RuleClassifier::new(ClassifierConfig::default()),
            None,
        );
        let tree = parse_document(&path, &classifier).await.expect("parse");

        assert_eq!(tree.paragraph_count, 6);
        assert_eq!(tree.root.count(), 6);

        // Title at the root, with the rest of the document nested below
        assert_eq!(tree.root.children.len(), 1);
        let title = &tree.root.children[0];
        assert_eq!(title.role, Some(StructuralRole::DocumentTitle));
        let addressee = &title.children[0];
        assert_eq!(addressee.role, Some(StructuralRole::Addressee));
        let heading = &addressee.children[0];
        assert_eq!(heading.role, Some(StructuralRole::Heading1));

        // Document order survives flattening
        let roles: Vec<_> = tree.nodes().iter().filter_map(|n| n.role).collect();
        assert_eq!(
            roles,
            vec![
                StructuralRole::DocumentTitle,
                StructuralRole::Addressee,
                StructuralRole::Heading1,
                StructuralRole::BodyParagraph,
                StructuralRole::BlankLine,
                StructuralRole::Signature,
            ]
        );
    }
}
