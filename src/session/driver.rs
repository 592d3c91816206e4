//! 会话驱动：一个词的完整解析
//!
//! 拆分行内提示（`word | hint`），构造 WordQuery 与 SessionState，驱动消歧状态机直到终态；
//! Resolved 时把释义交给 CardSink（建卡），其它结果原样上报给调用方（CLI / 批量处理）。

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::cards::{CardSink, NoteId};
use crate::core::CardError;
use crate::dictionary::{Language, LookupGateway, WordQuery};
use crate::session::{
    DecisionProvider, DisambiguationMachine, ResolutionOutcome, SessionMode, SessionState,
};

/// 行内提示分隔符
pub const HINT_SEPARATOR: char = '|';

/// "coger | vulgar Mexican slang" → ("coger", Some("vulgar Mexican slang"))；只按第一个分隔符拆分
pub fn split_inline_hint(raw: &str) -> (String, Option<String>) {
    match raw.split_once(HINT_SEPARATOR) {
        Some((word, hint)) => {
            let hint = hint.trim();
            (
                word.trim().to_string(),
                (!hint.is_empty()).then(|| hint.to_string()),
            )
        }
        None => (raw.trim().to_string(), None),
    }
}

/// 命令行提示与行内提示合并为 "cli; inline"
pub fn merge_hints(extra: Option<&str>, inline: Option<&str>) -> Option<String> {
    let extra = extra.map(str::trim).filter(|h| !h.is_empty());
    let inline = inline.map(str::trim).filter(|h| !h.is_empty());
    match (extra, inline) {
        (Some(a), Some(b)) => Some(format!("{a}; {b}")),
        (Some(a), None) => Some(a.to_string()),
        (None, Some(b)) => Some(b.to_string()),
        (None, None) => None,
    }
}

/// 一个会话的汇总
#[derive(Debug)]
pub struct SessionReport {
    /// 拆掉行内提示后的原始词
    pub word: String,
    pub attempts: u32,
    pub hint_history: Vec<String>,
    pub outcome: ResolutionOutcome,
    /// 仅在 Resolved 且配置了 CardSink 时存在
    pub card: Option<Result<NoteId, CardError>>,
}

impl SessionReport {
    /// Resolved 且卡片（若需要）已写入
    pub fn is_complete(&self) -> bool {
        self.outcome.is_resolved() && !matches!(self.card, Some(Err(_)))
    }
}

pub struct SessionDriver {
    machine: DisambiguationMachine,
    max_attempts: Option<u32>,
    sink: Option<Arc<dyn CardSink>>,
    cancel: CancellationToken,
}

impl SessionDriver {
    pub fn new(
        gateway: Arc<dyn LookupGateway>,
        mode: SessionMode,
        max_attempts: Option<u32>,
    ) -> Self {
        Self {
            machine: DisambiguationMachine::new(gateway, mode),
            max_attempts,
            sink: None,
            cancel: CancellationToken::new(),
        }
    }

    /// 令牌触发时放弃正在进行的查词、等待中的决策与建卡，会话以 Cancelled 结束
    pub fn with_cancel_token(mut self, cancel: CancellationToken) -> Self {
        self.machine = self.machine.with_cancel_token(cancel.clone());
        self.cancel = cancel;
        self
    }

    pub fn with_card_sink(mut self, sink: Arc<dyn CardSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    pub fn mode(&self) -> SessionMode {
        self.machine.mode()
    }

    /// 解析一个词：`raw_word` 可带行内提示，`hint` 为额外提示（如命令行 -c）
    pub async fn resolve(
        &self,
        raw_word: &str,
        language: Language,
        hint: Option<&str>,
        provider: &mut dyn DecisionProvider,
    ) -> SessionReport {
        let (word, inline) = split_inline_hint(raw_word);
        let hint = merge_hints(hint, inline.as_deref());

        let query = match WordQuery::new(&word, language, hint.as_deref()) {
            Ok(query) => query,
            Err(err) => {
                tracing::warn!("Rejected word {:?}: {}", raw_word, err);
                return SessionReport {
                    word,
                    attempts: 0,
                    hint_history: Vec::new(),
                    outcome: ResolutionOutcome::Failed(err.into()),
                    card: None,
                };
            }
        };

        let mut session = SessionState::new(query, self.max_attempts);
        let mut outcome = self.machine.run(&mut session, provider).await;

        let mut card = None;
        let mut interrupted = false;
        if let (ResolutionOutcome::Resolved { sense, word }, Some(sink)) = (&outcome, &self.sink) {
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => interrupted = true,
                delivered = sink.deliver(session.query(), sense, word) => card = Some(delivered),
            }
        }
        if interrupted {
            tracing::warn!(word = %word, "Card creation cancelled");
            outcome = ResolutionOutcome::Cancelled;
        }

        SessionReport {
            word,
            attempts: session.attempts(),
            hint_history: session.query().hint_history().to_vec(),
            outcome,
            card,
        }
    }
}
