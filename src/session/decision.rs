//! 人工决策接口
//!
//! 状态机在 Presenting 阶段通过 DecisionProvider 展示候选并等待决策；终端交互与测试脚本都实现这一接口。

use std::collections::VecDeque;

use async_trait::async_trait;

use crate::core::DecisionError;
use crate::dictionary::{CandidateSense, LookupResult, WordQuery};

/// 用户决策；Select 为 1 起始的序号
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    Select(usize),
    /// 带新提示重查；空串表示原样重查
    Retry(String),
    Skip,
    Cancel,
}

/// 本次可用的选项
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecisionOptions {
    pub candidates: usize,
    pub allow_skip: bool,
}

#[async_trait]
pub trait DecisionProvider: Send {
    /// 展示一组（已去重的、非空的）候选
    async fn present(&mut self, query: &WordQuery, result: &LookupResult);

    async fn decide(&mut self, options: DecisionOptions) -> Decision;

    /// 上一个决策不合法，需要重新提示（不消耗尝试次数）
    async fn reject(&mut self, error: &DecisionError);
}

/// 按脚本给出决策的 provider（测试用）；脚本耗尽时返回 Cancel
#[derive(Debug, Default)]
pub struct ScriptedDecisions {
    script: VecDeque<Decision>,
    /// 每次 present 收到的候选列表
    pub presented: Vec<Vec<CandidateSense>>,
    pub rejections: Vec<DecisionError>,
    pub options_seen: Vec<DecisionOptions>,
}

impl ScriptedDecisions {
    pub fn new(script: impl IntoIterator<Item = Decision>) -> Self {
        Self {
            script: script.into_iter().collect(),
            ..Self::default()
        }
    }

    pub fn remaining(&self) -> usize {
        self.script.len()
    }
}

#[async_trait]
impl DecisionProvider for ScriptedDecisions {
    async fn present(&mut self, _query: &WordQuery, result: &LookupResult) {
        self.presented.push(result.senses.clone());
    }

    async fn decide(&mut self, options: DecisionOptions) -> Decision {
        self.options_seen.push(options);
        self.script.pop_front().unwrap_or(Decision::Cancel)
    }

    async fn reject(&mut self, error: &DecisionError) {
        self.rejections.push(error.clone());
    }
}
