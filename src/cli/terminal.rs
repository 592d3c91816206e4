//! 终端交互：展示候选、读取选择
//!
//! stdin 关闭（EOF）视为 Cancel；Ctrl-C 由进程级取消令牌处理，会话在等待输入时同样会被中断。

use std::io::Write;

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::core::DecisionError;
use crate::dictionary::{LookupResult, WordQuery};
use crate::session::{Decision, DecisionOptions, DecisionProvider};

/// 一行输入的解析结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Choice {
    Decided(Decision),
    /// 单独输入 `r`，需要再读一行提示
    AskHint,
}

/// 解析用户输入；无法识别时返回 None
///
/// 序号是否越界、能否跳过交给状态机判断，这里只做语法解析。
pub fn parse_choice(input: &str, options: DecisionOptions) -> Option<Choice> {
    let input = input.trim();
    if input.is_empty() {
        return (options.candidates == 1).then_some(Choice::Decided(Decision::Select(1)));
    }
    if let Ok(n) = input.parse::<usize>() {
        return Some(Choice::Decided(Decision::Select(n)));
    }

    let lower = input.to_lowercase();
    match lower.as_str() {
        "r" | "retry" => Some(Choice::AskHint),
        "s" | "skip" => Some(Choice::Decided(Decision::Skip)),
        "q" | "quit" | "exit" => Some(Choice::Decided(Decision::Cancel)),
        _ => {
            // "r <hint>" 一步给出提示
            let (cmd, rest) = input.split_once(char::is_whitespace)?;
            cmd.eq_ignore_ascii_case("r")
                .then(|| Choice::Decided(Decision::Retry(rest.trim().to_string())))
        }
    }
}

fn menu(options: DecisionOptions) -> String {
    let range = if options.candidates == 1 {
        "Enter/1".to_string()
    } else {
        format!("1-{}", options.candidates)
    };
    let skip = if options.allow_skip { ", s=skip" } else { "" };
    format!("Choose [{range}], r=retry with hint{skip}, q=quit: ")
}

fn prompt(text: &str) {
    print!("{text}");
    let _ = std::io::stdout().flush();
}

/// 基于 stdin/stdout 的 DecisionProvider
pub struct TerminalPresenter {
    lines: Lines<BufReader<Stdin>>,
}

impl Default for TerminalPresenter {
    fn default() -> Self {
        Self::new()
    }
}

impl TerminalPresenter {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    /// 读一行；EOF 或读取错误时返回 None
    async fn read_line(&mut self) -> Option<String> {
        match self.lines.next_line().await {
            Ok(line) => line,
            Err(e) => {
                tracing::warn!("Failed to read stdin: {}", e);
                None
            }
        }
    }
}

#[async_trait]
impl DecisionProvider for TerminalPresenter {
    async fn present(&mut self, query: &WordQuery, result: &LookupResult) {
        println!();
        if result.is_corrected(query.word()) {
            println!("Normalized: {} → {}", query.word(), result.word);
        }
        println!("Meanings for \"{}\" ({}):", result.word, query.language().display_name());
        for (idx, sense) in result.senses.iter().enumerate() {
            println!("  {}. {}", idx + 1, sense);
            if !sense.example.is_empty() {
                println!("     {}", sense.example);
            }
            if let Some(translation) = sense.translation.as_deref().filter(|t| !t.is_empty()) {
                println!("     {}", translation);
            }
        }
    }

    async fn decide(&mut self, options: DecisionOptions) -> Decision {
        loop {
            prompt(&menu(options));
            let Some(line) = self.read_line().await else {
                return Decision::Cancel;
            };
            match parse_choice(&line, options) {
                Some(Choice::Decided(decision)) => return decision,
                Some(Choice::AskHint) => {
                    prompt("Hint (empty to look up again): ");
                    return match self.read_line().await {
                        Some(hint) => Decision::Retry(hint.trim().to_string()),
                        None => Decision::Cancel,
                    };
                }
                None => println!("Unrecognized input: {:?}", line.trim()),
            }
        }
    }

    async fn reject(&mut self, error: &DecisionError) {
        println!("Invalid choice: {error}");
    }
}
