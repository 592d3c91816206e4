//! 错误类型
//!
//! 查词（LlmError / LookupError）、输入（QueryError / DecisionError）、会话失败原因（FailureReason）、
//! 卡片与媒体（CardError / MediaError）、批量词表（WorkListError）。
//! 只有 FailureReason 会作为会话结果上报；DecisionError 由调用方就地重新提示。

use thiserror::Error;

/// LLM 后端调用失败
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LlmError {
    #[error("LLM request timed out after {0}s")]
    Timeout(u64),

    #[error("LLM request failed: {0}")]
    Request(String),

    #[error("LLM returned no content")]
    EmptyResponse,
}

/// 查词网关错误：传输失败或回复无法解析。网关内部不做重试，直接上抛。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    #[error(transparent)]
    Llm(#[from] LlmError),

    #[error("invalid lookup response: {0}")]
    InvalidResponse(String),
}

/// 构造 WordQuery 时的输入校验
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("word is empty")]
    EmptyWord,

    #[error("unsupported language '{0}' (expected es or en)")]
    UnknownLanguage(String),
}

/// 用户决策不合法：不触发状态转移，也不消耗尝试次数
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecisionError {
    #[error("choice {choice} is out of range 1-{len}")]
    OutOfRange { choice: usize, len: usize },

    #[error("skip is only available in batch mode")]
    SkipNotOffered,
}

/// 会话以失败告终的原因
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FailureReason {
    #[error("no meanings found")]
    NoMeaningsFound,

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error("gave up after {0} lookup attempts")]
    AttemptsExhausted(u32),

    #[error(transparent)]
    InvalidQuery(#[from] QueryError),
}

/// 图片 / 语音生成失败（只作为警告，不阻止建卡）
#[derive(Error, Debug)]
pub enum MediaError {
    #[error("media request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("media service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("media service returned no data")]
    EmptyPayload,

    #[error("media payload could not be decoded: {0}")]
    Decode(String),
}

/// 写入卡片库失败
#[derive(Error, Debug)]
pub enum CardError {
    #[error("cannot connect to Anki; make sure Anki is running and AnkiConnect is installed")]
    Unavailable,

    #[error("AnkiConnect request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("AnkiConnect error: {0}")]
    Anki(String),

    #[error("unexpected AnkiConnect response: {0}")]
    UnexpectedResponse(String),
}

/// 批量词表文件读写
#[derive(Error, Debug)]
pub enum WorkListError {
    #[error("word list not found: {0}")]
    NotFound(String),

    #[error("word list I/O failed: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_meanings_message() {
        assert_eq!(FailureReason::NoMeaningsFound.to_string(), "no meanings found");
    }

    #[test]
    fn test_lookup_error_is_transparent_in_failure() {
        let reason = FailureReason::from(LookupError::Llm(LlmError::Timeout(60)));
        assert_eq!(reason.to_string(), "LLM request timed out after 60s");
    }

    #[test]
    fn test_out_of_range_message() {
        let err = DecisionError::OutOfRange { choice: 4, len: 3 };
        assert!(err.to_string().contains("1-3"));
    }
}
