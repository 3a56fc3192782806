//! DeepSeek chat-completions client
//!
//! Thin HTTP client over the chat-completions endpoint. Classification uses
//! a low temperature and a tight token budget so the model answers with a
//! bare role label; compliance analysis runs warmer with room for prose.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::config::OracleConfig;
use crate::document::models::{ParagraphAttributes, StructuralRole};

use super::{ClassificationOracle, OracleError};

/// Chat completion request
#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f64,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct Message {
    role: String,
    content: String,
}

/// Chat completion response
#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    content: String,
}

/// HTTP client for the DeepSeek API
#[derive(Debug, Clone)]
pub struct DeepSeekClient {
    client: Client,
    api_key: String,
    config: OracleConfig,
}

impl DeepSeekClient {
    pub fn new(api_key: String, config: OracleConfig) -> Self {
        DeepSeekClient {
            client: Client::new(),
            api_key,
            config,
        }
    }

    pub fn config(&self) -> &OracleConfig {
        &self.config
    }

    /// One chat-completion round trip, returning the first choice's text
    async fn chat(
        &self,
        prompt: String,
        temperature: f64,
        max_tokens: u32,
    ) -> Result<String, OracleError> {
        let request = ChatRequest {
            model: self.config.model.clone(),
            messages: vec![Message {
                role: "user".to_string(),
                content: prompt,
            }],
            temperature,
            max_tokens,
        };

        let response = self
            .client
            .post(&self.config.api_url)
            .bearer_auth(&self.api_key)
            .timeout(Duration::from_secs(self.config.timeout_secs))
            .json(&request)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(OracleError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let chat: ChatResponse = response.json().await?;
        chat.choices
            .into_iter()
            .next()
            .map(|choice| choice.message.content)
            .ok_or(OracleError::EmptyResponse)
    }

    /// Ask the model for the structural role of one paragraph.
    ///
    /// Only an answer that parses as one of the 13 role labels is accepted;
    /// anything else surfaces as `InvalidRole` so the caller can fall back.
    pub async fn classify_paragraph(
        &self,
        attrs: &ParagraphAttributes,
        preceding: &[ParagraphAttributes],
    ) -> Result<StructuralRole, OracleError> {
        let prompt = classification_prompt(attrs, preceding, self.config.context_paragraphs);
        let answer = self.chat(prompt, 0.1, 50).await?;
        answer
            .trim()
            .parse()
            .map_err(|_| OracleError::InvalidRole {
                answer: answer.trim().to_string(),
            })
    }

    /// Ask the model whether one node complies with the format requirements
    pub async fn analyze_node(
        &self,
        node_info: &str,
        context: &str,
        requirements: &str,
    ) -> Result<String, OracleError> {
        let prompt = analysis_prompt(node_info, context, requirements);
        self.chat(prompt, 0.3, 2000).await
    }
}

impl ClassificationOracle for DeepSeekClient {
    async fn classify(
        &self,
        attrs: &ParagraphAttributes,
        preceding: &[ParagraphAttributes],
    ) -> Result<StructuralRole, OracleError> {
        self.classify_paragraph(attrs, preceding).await
    }
}

fn classification_prompt(
    attrs: &ParagraphAttributes,
    preceding: &[ParagraphAttributes],
    window: usize,
) -> String {
    let mut context_block = String::new();
    if !preceding.is_empty() && window > 0 {
        context_block.push_str("\n上下文节点:\n");
        let start = preceding.len().saturating_sub(window);
        for (i, paragraph) in preceding[start..].iter().enumerate() {
            let content: String = paragraph.text.chars().take(50).collect();
            context_block.push_str(&format!("  节点{}: {}...\n", i + 1, content));
        }
    }

    format!(
        "你是一个专业的公文文档结构分析专家。请分析以下文档节点的类型。\n\n\
         节点信息：\n\
         - 内容: {content}\n\
         - 字体: {font}\n\
         - 字号: {size}pt\n\
         - 加粗: {bold}\n\
         - 对齐: {alignment}\n\
         - 大纲级别: {outline}\n\
         {context_block}\n\
         请从以下类型中选择最合适的一个：\n\
         1. 发文标题 - 由单位名称、事由和文种组成，通常居中，字体较大\n\
         2. 主送机关 - 如：\"XX市人民政府：\"\n\
         3. 一级标题 - 如：一、二、三、等\n\
         4. 二级标题 - 如：（一）（二）等\n\
         5. 三级标题 - 如：1. 2. 3. 等\n\
         6. 四级标题 - 如：（1）（2）等\n\
         7. 普通段落 - 正文内容\n\
         8. 列表项 - 注意：不要将列表项误判为标题\n\
         9. 结尾 - 如：\"特此报告\"、\"特此请示\"、\"特此申请\"等\n\
         10. 落款 - 发文单位名称和日期\n\
         11. 附件 - 附件说明，如：\"附件：1.XXXX\"\n\
         12. 分隔符 - 如：\"———\"、\"＊＊＊\"等\n\
         13. 空行 - 空行\n\n\
         判断标准：\n\
         - 发文标题：通常位于文档开头，居中对齐，包含事由和文种\n\
         - 主送机关：通常在标题下方，以机关名称开头，以冒号结尾\n\
         - 标题有明确的编号格式和层级关系\n\
         - 普通段落是正文内容，通常首行缩进2字\n\
         - 列表项：以项目符号或编号开头，但内容相对简短\n\
         - 分隔符：主要由符号组成的分割线\n\n\
         请只返回类型名称，不要包含其他内容。",
        content = attrs.text,
        font = attrs.font,
        size = attrs.size,
        bold = attrs.bold,
        alignment = attrs.alignment.describe(),
        outline = attrs.outline_level.describe(),
    )
}

fn analysis_prompt(node_info: &str, context: &str, requirements: &str) -> String {
    format!(
        "你是一个专业的文档格式检查专家。请分析以下文档节点的格式是否符合要求。\n\n\
         文档格式要求：\n{requirements}\n\n\
         当前节点信息：\n{node_info}\n\n\
         上下文信息：\n{context}\n\n\
         请从以下几个方面进行分析：\n\
         1. 节点类型识别（是否为拟稿部门、日期等）\n\
         2. 格式合规性检查（字体、字号、对齐、缩进等）\n\
         3. 位置关系检查（是否符合文档结构要求）\n\
         4. 具体问题描述和建议\n\n\
         请用中文回答，格式要清晰易读。"
    )
}
