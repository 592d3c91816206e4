//! chispa - 单词 → 消歧 → Anki 卡片
//!
//! 模块划分：
//! - **batch**: 词表文件与批量处理
//! - **cards**: AnkiConnect 客户端、卡片字段、配图与发音
//! - **cli**: 终端交互与 add / batch 子命令
//! - **config**: 应用配置加载（TOML + 环境变量）
//! - **core**: 错误类型
//! - **dictionary**: 查询模型、提示词、LLM 查词网关、候选去重
//! - **llm**: LLM 客户端抽象与实现（OpenAI 兼容 / Mock）
//! - **observability**: 日志
//! - **session**: 消歧状态机与会话驱动

pub mod batch;
pub mod cards;
pub mod cli;
pub mod config;
pub mod core;
pub mod dictionary;
pub mod llm;
pub mod observability;
pub mod session;
