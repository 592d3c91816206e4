//! 查词数据模型：语言、WordQuery、候选释义、查词结果

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::core::QueryError;

/// 学习语言：西语卡片带英文翻译，英语卡片不带
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    #[default]
    Es,
    En,
}

impl Language {
    pub fn code(&self) -> &'static str {
        match self {
            Language::Es => "es",
            Language::En => "en",
        }
    }

    pub fn display_name(&self) -> &'static str {
        match self {
            Language::Es => "Spanish",
            Language::En => "English",
        }
    }
}

impl fmt::Display for Language {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for Language {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "es" => Ok(Language::Es),
            "en" => Ok(Language::En),
            other => Err(QueryError::UnknownLanguage(other.to_string())),
        }
    }
}

/// 一次消歧会话的查询
///
/// `word` 与 `language` 创建后不变；`hints` 每次查词追加一条（首条为初始提示，无提示时为空串），
/// 只追加不删除。实际发给模型的上下文是所有非空提示以 `"; "` 连接。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WordQuery {
    word: String,
    language: Language,
    hints: Vec<String>,
}

impl WordQuery {
    pub fn new(
        word: impl AsRef<str>,
        language: Language,
        hint: Option<&str>,
    ) -> Result<Self, QueryError> {
        let word = word.as_ref().trim();
        if word.is_empty() {
            return Err(QueryError::EmptyWord);
        }
        Ok(Self {
            word: word.to_string(),
            language,
            hints: vec![hint.map(str::trim).unwrap_or_default().to_string()],
        })
    }

    pub fn word(&self) -> &str {
        &self.word
    }

    pub fn language(&self) -> Language {
        self.language
    }

    /// 初始提示（首条非空时）
    pub fn hint(&self) -> Option<&str> {
        self.hints.first().map(String::as_str).filter(|h| !h.is_empty())
    }

    /// 全部提示历史，长度 = 已发起（或即将发起）的查词次数
    pub fn hint_history(&self) -> &[String] {
        &self.hints
    }

    /// 重试时追加提示；空串表示「原样重查」
    pub fn push_hint(&mut self, hint: &str) {
        self.hints.push(hint.trim().to_string());
    }

    /// 累计上下文：所有非空提示依次以 "; " 连接
    pub fn context(&self) -> Option<String> {
        let parts: Vec<&str> = self
            .hints
            .iter()
            .map(String::as_str)
            .filter(|h| !h.is_empty())
            .collect();
        if parts.is_empty() {
            None
        } else {
            Some(parts.join("; "))
        }
    }
}

/// 一个候选释义（网关每次查询都重新生成，重试时整体替换）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateSense {
    pub part_of_speech: String,
    /// 简短释义（英文）
    pub gloss: String,
    /// 源语言例句
    pub example: String,
    /// 例句英译；英语模式为 None
    pub translation: Option<String>,
    /// 目标词挖空后的例句
    pub blanked: String,
    /// 俚语 / 粗俗义项：释义照常直白，配图需要净化
    #[serde(default)]
    pub sensitive: bool,
}

impl fmt::Display for CandidateSense {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.part_of_speech.is_empty() {
            write!(f, "{}", self.gloss)
        } else {
            write!(f, "{} ({})", self.gloss, self.part_of_speech)
        }
    }
}

/// 查词结果：模型纠正后的词形 + 候选释义（可能为空）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupResult {
    pub word: String,
    pub senses: Vec<CandidateSense>,
}

impl LookupResult {
    /// 模型是否纠正了拼写 / 重音
    pub fn is_corrected(&self, original: &str) -> bool {
        self.word != original.trim()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_language_parse() {
        assert_eq!("es".parse::<Language>().unwrap(), Language::Es);
        assert_eq!(" EN ".parse::<Language>().unwrap(), Language::En);
        assert!(matches!(
            "fr".parse::<Language>(),
            Err(QueryError::UnknownLanguage(_))
        ));
    }

    #[test]
    fn test_query_rejects_blank_word() {
        assert_eq!(
            WordQuery::new("   ", Language::Es, None),
            Err(QueryError::EmptyWord)
        );
    }

    #[test]
    fn test_query_trims_and_starts_history() {
        let q = WordQuery::new("  banco ", Language::Es, None).unwrap();
        assert_eq!(q.word(), "banco");
        assert_eq!(q.hint(), None);
        assert_eq!(q.hint_history().len(), 1);
        assert_eq!(q.context(), None);
    }

    #[test]
    fn test_context_accumulates_non_empty_hints() {
        let mut q = WordQuery::new("coger", Language::Es, Some("slang")).unwrap();
        q.push_hint("");
        q.push_hint(" Mexico ");
        assert_eq!(q.hint_history(), &["slang", "", "Mexico"]);
        assert_eq!(q.context().as_deref(), Some("slang; Mexico"));
    }

    #[test]
    fn test_sense_display() {
        let sense = CandidateSense {
            part_of_speech: "noun".into(),
            gloss: "bench".into(),
            example: "Me senté en el banco.".into(),
            translation: Some("I sat on the bench.".into()),
            blanked: "Me senté en el ___.".into(),
            sensitive: false,
        };
        assert_eq!(sense.to_string(), "bench (noun)");
    }
}
