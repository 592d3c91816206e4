//! 查词网关
//!
//! LookupGateway 是释义服务的抽象：一次调用 = 一次外部请求，不重试、不退避；空列表是成功结果（查无此词），
//! 与错误区分开。LlmLookupGateway 用聊天模型实现，解析其 JSON 回复。

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::core::LookupError;
use crate::dictionary::prompt::{build_lookup_prompt, SYSTEM_PROMPT};
use crate::dictionary::{CandidateSense, Language, LookupResult, WordQuery};
use crate::llm::{LlmClient, Message};

#[async_trait]
pub trait LookupGateway: Send + Sync {
    async fn lookup(&self, query: &WordQuery) -> Result<LookupResult, LookupError>;
}

/// 基于 LLM 的查词网关
pub struct LlmLookupGateway {
    llm: Arc<dyn LlmClient>,
}

impl LlmLookupGateway {
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl LookupGateway for LlmLookupGateway {
    async fn lookup(&self, query: &WordQuery) -> Result<LookupResult, LookupError> {
        let messages = vec![
            Message::system(SYSTEM_PROMPT),
            Message::user(build_lookup_prompt(query)),
        ];
        tracing::debug!(
            word = query.word(),
            language = %query.language(),
            context = ?query.context(),
            "Looking up word"
        );
        let raw = self.llm.complete(&messages).await?;
        let result = parse_lookup_response(&raw, query)?;
        tracing::debug!(
            word = %result.word,
            senses = result.senses.len(),
            "Lookup finished"
        );
        Ok(result)
    }
}

/// 模型回复的原始结构；西语与英语两套字段名都接受
#[derive(Debug, Deserialize)]
struct RawLookup {
    #[serde(default)]
    word: Option<String>,
    #[serde(default)]
    meanings: Vec<RawMeaning>,
}

#[derive(Debug, Deserialize)]
struct RawMeaning {
    #[serde(default)]
    definition: String,
    #[serde(default)]
    part_of_speech: String,
    // 两套字段名可能同时出现，分别接收，再按查询语言取其一
    #[serde(default)]
    example: Option<String>,
    #[serde(default)]
    example_spanish: Option<String>,
    #[serde(default)]
    example_blanked: Option<String>,
    #[serde(default)]
    example_spanish_blanked: Option<String>,
    #[serde(default)]
    example_english: Option<String>,
    #[serde(default)]
    sensitive: bool,
}

/// 取第一个非空的候选字段
fn first_filled(preferred: Option<String>, fallback: Option<String>) -> String {
    [preferred, fallback]
        .into_iter()
        .flatten()
        .map(|s| s.trim().to_string())
        .find(|s| !s.is_empty())
        .unwrap_or_default()
}

impl RawMeaning {
    fn into_sense(self, language: Language) -> CandidateSense {
        let (example, blanked, translation) = match language {
            Language::Es => (
                first_filled(self.example_spanish, self.example),
                first_filled(self.example_spanish_blanked, self.example_blanked),
                Some(first_filled(self.example_english, None)),
            ),
            Language::En => (
                first_filled(self.example, self.example_spanish),
                first_filled(self.example_blanked, self.example_spanish_blanked),
                None,
            ),
        };
        CandidateSense {
            part_of_speech: self.part_of_speech.trim().to_string(),
            gloss: self.definition.trim().to_string(),
            example,
            translation,
            blanked,
            sensitive: self.sensitive,
        }
    }
}

/// 从回复中取出 JSON：```json 代码块、或首个 '{' 到最后一个 '}'
fn extract_json(output: &str) -> Option<&str> {
    let trimmed = output.trim();
    if let Some(start) = trimmed.find("```json") {
        let rest = &trimmed[start + 7..];
        return Some(rest.find("```").map(|end| rest[..end].trim()).unwrap_or(rest.trim()));
    }
    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    (start < end).then(|| &trimmed[start..=end])
}

/// 解析查词回复：缺失 word 时回退为查询词；空 meanings 返回空列表（不是错误）
pub fn parse_lookup_response(
    output: &str,
    query: &WordQuery,
) -> Result<LookupResult, LookupError> {
    let json = extract_json(output)
        .ok_or_else(|| LookupError::InvalidResponse(format!("no JSON object in: {output}")))?;
    let raw: RawLookup = serde_json::from_str(json)
        .map_err(|e| LookupError::InvalidResponse(format!("{e}: {json}")))?;

    let word = raw
        .word
        .map(|w| w.trim().to_string())
        .filter(|w| !w.is_empty())
        .unwrap_or_else(|| query.word().to_string());

    let senses = raw
        .meanings
        .into_iter()
        .map(|m| m.into_sense(query.language()))
        .collect();

    Ok(LookupResult { word, senses })
}
