//! 消歧状态机
//!
//! Querying → Presenting → {Accepted, Retrying, Skipped, Cancelled, NotFound, Failed}，Retrying 回到 Querying。
//! `transition` 是纯函数：给定当前状态与事件返回下一状态；查词、展示、等待决策等副作用由 `DisambiguationMachine::run` 执行。
//! 非法决策（序号越界、单词模式下 skip）返回 DecisionError，状态不变、不消耗尝试次数。
//! 取消令牌触发时（Ctrl-C），正在进行的查词或等待中的决策被放弃，任一非终态都转为 Cancelled。

use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::core::{DecisionError, FailureReason, LookupError};
use crate::dictionary::{normalize, CandidateSense, LookupGateway, LookupResult};
use crate::session::{
    Decision, DecisionOptions, DecisionProvider, ResolutionOutcome, SessionMode, SessionState,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisambiguationState {
    Querying,
    /// 候选已去重且非空
    Presenting { result: LookupResult },
    Retrying { hint: String },
    Accepted { sense: CandidateSense, word: String },
    Skipped,
    Cancelled,
    NotFound,
    Failed(FailureReason),
}

impl DisambiguationState {
    pub fn name(&self) -> &'static str {
        match self {
            DisambiguationState::Querying => "querying",
            DisambiguationState::Presenting { .. } => "presenting",
            DisambiguationState::Retrying { .. } => "retrying",
            DisambiguationState::Accepted { .. } => "accepted",
            DisambiguationState::Skipped => "skipped",
            DisambiguationState::Cancelled => "cancelled",
            DisambiguationState::NotFound => "not_found",
            DisambiguationState::Failed(_) => "failed",
        }
    }

    /// 终态转换为会话结果；非终态返回 None
    pub fn outcome(&self) -> Option<ResolutionOutcome> {
        match self {
            DisambiguationState::Accepted { sense, word } => Some(ResolutionOutcome::Resolved {
                sense: sense.clone(),
                word: word.clone(),
            }),
            DisambiguationState::Skipped => Some(ResolutionOutcome::Skipped),
            DisambiguationState::Cancelled => Some(ResolutionOutcome::Cancelled),
            DisambiguationState::NotFound => {
                Some(ResolutionOutcome::Failed(FailureReason::NoMeaningsFound))
            }
            DisambiguationState::Failed(reason) => Some(ResolutionOutcome::Failed(reason.clone())),
            DisambiguationState::Querying
            | DisambiguationState::Presenting { .. }
            | DisambiguationState::Retrying { .. } => None,
        }
    }
}

#[derive(Debug, Clone)]
pub enum MachineEvent {
    LookupSucceeded(LookupResult),
    LookupFailed(LookupError),
    Decided(Decision),
    /// 用户中断（取消令牌触发）
    Interrupted,
}

/// 纯状态转移
pub fn transition(
    state: &DisambiguationState,
    event: MachineEvent,
    mode: SessionMode,
) -> Result<DisambiguationState, DecisionError> {
    use DisambiguationState as S;

    match (state, event) {
        (S::Querying, MachineEvent::LookupSucceeded(result)) => {
            let senses = normalize(result.senses);
            if senses.is_empty() {
                Ok(S::NotFound)
            } else {
                Ok(S::Presenting {
                    result: LookupResult {
                        word: result.word,
                        senses,
                    },
                })
            }
        }
        (S::Querying, MachineEvent::LookupFailed(err)) => Ok(S::Failed(FailureReason::Lookup(err))),

        (S::Presenting { result }, MachineEvent::Decided(decision)) => match decision {
            Decision::Select(choice) => {
                let len = result.senses.len();
                if choice == 0 || choice > len {
                    return Err(DecisionError::OutOfRange { choice, len });
                }
                Ok(S::Accepted {
                    sense: result.senses[choice - 1].clone(),
                    word: result.word.clone(),
                })
            }
            Decision::Retry(hint) => Ok(S::Retrying { hint }),
            Decision::Skip if mode.allows_skip() => Ok(S::Skipped),
            Decision::Skip => Err(DecisionError::SkipNotOffered),
            Decision::Cancel => Ok(S::Cancelled),
        },

        (
            S::Querying | S::Presenting { .. } | S::Retrying { .. },
            MachineEvent::Interrupted,
        ) => Ok(S::Cancelled),

        (state, event) => {
            tracing::warn!(
                "Ignoring event {:?} in state {}",
                event,
                state.name()
            );
            Ok(state.clone())
        }
    }
}

/// 消歧状态机运行器：持有查词网关，不持有会话状态
pub struct DisambiguationMachine {
    gateway: Arc<dyn LookupGateway>,
    mode: SessionMode,
    cancel: CancellationToken,
}

impl DisambiguationMachine {
    pub fn new(gateway: Arc<dyn LookupGateway>, mode: SessionMode) -> Self {
        Self {
            gateway,
            mode,
            cancel: CancellationToken::new(),
        }
    }

    pub fn with_cancel_token(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn mode(&self) -> SessionMode {
        self.mode
    }

    /// 跑到终态并把结果写入 session。每次进入 Querying 之前向 session 申请一次尝试次数。
    pub async fn run(
        &self,
        session: &mut SessionState,
        provider: &mut dyn DecisionProvider,
    ) -> ResolutionOutcome {
        use DisambiguationState as S;

        let mut state = match session.begin_attempt() {
            Ok(_) => S::Querying,
            Err(reason) => S::Failed(reason),
        };
        let mut presented = false;

        let outcome = loop {
            let event = match &state {
                S::Querying => {
                    tracing::info!(
                        word = session.query().word(),
                        attempt = session.attempts(),
                        context = ?session.query().context(),
                        "Looking up"
                    );
                    tokio::select! {
                        biased;
                        _ = self.cancel.cancelled() => MachineEvent::Interrupted,
                        looked_up = self.gateway.lookup(session.query()) => match looked_up {
                            Ok(result) => MachineEvent::LookupSucceeded(result),
                            Err(err) => MachineEvent::LookupFailed(err),
                        },
                    }
                }
                S::Presenting { result } => {
                    if self.cancel.is_cancelled() {
                        MachineEvent::Interrupted
                    } else {
                        if !presented {
                            provider.present(session.query(), result).await;
                            presented = true;
                        }
                        let options = DecisionOptions {
                            candidates: result.senses.len(),
                            allow_skip: self.mode.allows_skip(),
                        };
                        tokio::select! {
                            biased;
                            _ = self.cancel.cancelled() => MachineEvent::Interrupted,
                            decision = provider.decide(options) => MachineEvent::Decided(decision),
                        }
                    }
                }
                S::Retrying { hint } => {
                    let hint = hint.clone();
                    state = if self.cancel.is_cancelled() {
                        S::Cancelled
                    } else {
                        match session.begin_attempt() {
                            Ok(_) => {
                                session.query_mut().push_hint(&hint);
                                S::Querying
                            }
                            Err(reason) => S::Failed(reason),
                        }
                    };
                    continue;
                }
                S::Accepted { sense, word } => break ResolutionOutcome::Resolved {
                    sense: sense.clone(),
                    word: word.clone(),
                },
                S::Skipped => break ResolutionOutcome::Skipped,
                S::Cancelled => break ResolutionOutcome::Cancelled,
                S::NotFound => break ResolutionOutcome::Failed(FailureReason::NoMeaningsFound),
                S::Failed(reason) => break ResolutionOutcome::Failed(reason.clone()),
            };

            match transition(&state, event, self.mode) {
                Ok(next) => {
                    tracing::debug!("Transition {} -> {}", state.name(), next.name());
                    if next != state {
                        presented = false;
                    }
                    state = next;
                }
                Err(err) => {
                    tracing::debug!("Rejected decision: {}", err);
                    provider.reject(&err).await;
                }
            }
        };

        tracing::info!(
            word = session.query().word(),
            attempts = session.attempts(),
            "Session finished: {}",
            outcome.label()
        );
        session.finish(outcome)
    }
}
