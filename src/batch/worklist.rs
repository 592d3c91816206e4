//! 批量词表文件
//!
//! 每行一个词，可带 `| 提示`；`#` 注释与空行跳过但重写时保留。
//! 保存走临时文件 + rename，中途被打断时文件要么是旧内容要么是新内容。
//! 重写时沿用原文件的换行符（CRLF 或 LF）以及末尾是否有换行。

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use crate::core::WorkListError;
use crate::session::split_inline_hint;

/// 词表中的一个待处理词
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkItem {
    /// 原始行（去掉首尾空白），删除时按它匹配
    pub line: String,
    pub word: String,
    pub hint: Option<String>,
}

impl WorkItem {
    fn parse(line: &str) -> Option<Self> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return None;
        }
        let (word, hint) = split_inline_hint(trimmed);
        if word.is_empty() {
            return None;
        }
        Some(Self {
            line: trimmed.to_string(),
            word,
            hint,
        })
    }
}

#[derive(Debug)]
pub struct WorkList {
    path: PathBuf,
    lines: Vec<String>,
    line_ending: &'static str,
    trailing_newline: bool,
}

impl WorkList {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, WorkListError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(WorkListError::NotFound(path.display().to_string()));
        }
        let content = fs::read_to_string(path)?;
        let line_ending = if content.contains("\r\n") { "\r\n" } else { "\n" };
        Ok(Self {
            path: path.to_path_buf(),
            // lines() 同时去掉 "\n" 与 "\r\n"
            lines: content.lines().map(str::to_string).collect(),
            line_ending,
            trailing_newline: content.is_empty() || content.ends_with('\n'),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// 当前仍待处理的词，按文件顺序
    pub fn items(&self) -> Vec<WorkItem> {
        self.lines.iter().filter_map(|l| WorkItem::parse(l)).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.items().is_empty()
    }

    /// 删除第一条匹配的行；返回是否删除
    pub fn remove(&mut self, item: &WorkItem) -> bool {
        let position = self.lines.iter().position(|l| {
            let trimmed = l.trim();
            !trimmed.starts_with('#') && trimmed == item.line
        });
        match position {
            Some(idx) => {
                self.lines.remove(idx);
                true
            }
            None => false,
        }
    }

    /// 原子重写文件
    pub fn save(&self) -> Result<(), WorkListError> {
        let mut content = self.lines.join(self.line_ending);
        if !content.is_empty() && self.trailing_newline {
            content.push_str(self.line_ending);
        }

        let file_name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "worklist".to_string());
        let tmp_path = self.path.with_file_name(format!(".{file_name}.tmp"));

        {
            let mut tmp = fs::File::create(&tmp_path)?;
            tmp.write_all(content.as_bytes())?;
            tmp.sync_all()?;
        }
        fs::rename(&tmp_path, &self.path)?;
        tracing::debug!(path = %self.path.display(), "Work list saved");
        Ok(())
    }
}
