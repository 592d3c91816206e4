//! 批量建卡
//!
//! 按文件顺序逐词跑会话（严格串行）。只有 Resolved 且卡片写入成功的词才从文件删除，并立即保存；
//! 失败与跳过的词留在文件里，下次再处理。Cancel 结束整个批次。

pub mod worklist;

pub use worklist::{WorkItem, WorkList};

use crate::core::WorkListError;
use crate::dictionary::Language;
use crate::session::{DecisionProvider, ResolutionOutcome, SessionDriver, SessionReport};

/// 一个批次的结果
#[derive(Debug, Default)]
pub struct BatchSummary {
    /// 按处理顺序排列
    pub reports: Vec<SessionReport>,
    /// 是否被用户中途取消
    pub cancelled: bool,
    /// 开始时文件中的词数
    pub total: usize,
}

impl BatchSummary {
    /// 已建卡（并已从文件删除）的词
    pub fn created(&self) -> Vec<&SessionReport> {
        self.reports.iter().filter(|r| r.is_complete()).collect()
    }

    pub fn skipped(&self) -> Vec<&SessionReport> {
        self.reports
            .iter()
            .filter(|r| matches!(r.outcome, ResolutionOutcome::Skipped))
            .collect()
    }

    /// 查词失败，或选中了释义但建卡失败
    pub fn failed(&self) -> Vec<&SessionReport> {
        self.reports
            .iter()
            .filter(|r| match &r.outcome {
                ResolutionOutcome::Failed(_) => true,
                ResolutionOutcome::Resolved { .. } => !r.is_complete(),
                _ => false,
            })
            .collect()
    }

    /// 未处理到的词数（取消时）
    pub fn unprocessed(&self) -> usize {
        self.total.saturating_sub(self.reports.len())
    }
}

pub struct BatchRunner<'a> {
    driver: &'a SessionDriver,
    language: Language,
}

impl<'a> BatchRunner<'a> {
    pub fn new(driver: &'a SessionDriver, language: Language) -> Self {
        Self { driver, language }
    }

    pub async fn run(
        &self,
        list: &mut WorkList,
        provider: &mut dyn DecisionProvider,
    ) -> Result<BatchSummary, WorkListError> {
        let items = list.items();
        let mut summary = BatchSummary {
            total: items.len(),
            ..Default::default()
        };
        tracing::info!(
            path = %list.path().display(),
            words = items.len(),
            "Starting batch"
        );

        for (idx, item) in items.iter().enumerate() {
            tracing::info!("[{}/{}] {}", idx + 1, items.len(), item.word);
            let report = self
                .driver
                .resolve(&item.line, self.language, None, provider)
                .await;

            if report.is_complete() {
                list.remove(item);
                list.save()?;
            } else {
                tracing::info!(
                    word = %item.word,
                    outcome = report.outcome.label(),
                    "Word kept in list"
                );
            }

            let cancelled = matches!(report.outcome, ResolutionOutcome::Cancelled);
            summary.reports.push(report);
            if cancelled {
                summary.cancelled = true;
                tracing::info!("Batch cancelled, {} word(s) left unprocessed", summary.unprocessed());
                break;
            }
        }

        Ok(summary)
    }
}
