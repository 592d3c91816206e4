//! 会话状态：模式、尝试计数、最终结果
//!
//! SessionState 由 SessionDriver 独占；消歧状态机每次调用只借用它，自身不跨调用保存任何状态。

use crate::core::FailureReason;
use crate::dictionary::{CandidateSense, WordQuery};

/// 单词模式不提供 skip；批量模式可以跳过当前词
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionMode {
    Single,
    Batch,
}

impl SessionMode {
    pub fn allows_skip(&self) -> bool {
        matches!(self, SessionMode::Batch)
    }
}

/// 会话终态，每个会话恰好产生一次
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolutionOutcome {
    /// 选中的释义 + 最终词形（模型纠正后的拼写）
    Resolved { sense: CandidateSense, word: String },
    Skipped,
    Cancelled,
    Failed(FailureReason),
}

impl ResolutionOutcome {
    pub fn is_resolved(&self) -> bool {
        matches!(self, ResolutionOutcome::Resolved { .. })
    }

    pub fn label(&self) -> &'static str {
        match self {
            ResolutionOutcome::Resolved { .. } => "resolved",
            ResolutionOutcome::Skipped => "skipped",
            ResolutionOutcome::Cancelled => "cancelled",
            ResolutionOutcome::Failed(_) => "failed",
        }
    }
}

#[derive(Debug, Clone)]
pub struct SessionState {
    query: WordQuery,
    attempts: u32,
    max_attempts: Option<u32>,
    outcome: Option<ResolutionOutcome>,
}

impl SessionState {
    pub fn new(query: WordQuery, max_attempts: Option<u32>) -> Self {
        Self {
            query,
            attempts: 0,
            max_attempts,
            outcome: None,
        }
    }

    pub fn query(&self) -> &WordQuery {
        &self.query
    }

    pub(crate) fn query_mut(&mut self) -> &mut WordQuery {
        &mut self.query
    }

    /// 已发起的查词次数
    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn max_attempts(&self) -> Option<u32> {
        self.max_attempts
    }

    pub fn outcome(&self) -> Option<&ResolutionOutcome> {
        self.outcome.as_ref()
    }

    /// 申请一次查词；到达上限时返回 AttemptsExhausted，计数不变
    pub fn begin_attempt(&mut self) -> Result<u32, FailureReason> {
        if let Some(max) = self.max_attempts {
            if self.attempts >= max {
                return Err(FailureReason::AttemptsExhausted(max));
            }
        }
        self.attempts += 1;
        Ok(self.attempts)
    }

    /// 记录终态；已有终态时保留第一次的结果
    pub fn finish(&mut self, outcome: ResolutionOutcome) -> ResolutionOutcome {
        match &self.outcome {
            Some(existing) => {
                tracing::warn!(
                    word = self.query.word(),
                    "Session already finished as {}, ignoring {}",
                    existing.label(),
                    outcome.label()
                );
                existing.clone()
            }
            None => {
                self.outcome = Some(outcome.clone());
                outcome
            }
        }
    }
}
