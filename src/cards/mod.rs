//! 建卡：AnkiConnect 客户端、卡片字段拼装、配图与发音
//!
//! 会话 Resolved 后由 CardSink 接手；CardAssembler 是默认实现：生成媒体 → 上传到 Anki 媒体库 → addNote。
//! 图片 / 语音失败只记警告，卡片照常写入。

pub mod anki;
pub mod assembler;
pub mod audio;
pub mod image;
pub mod note;

use async_trait::async_trait;

use crate::core::CardError;
use crate::dictionary::{CandidateSense, WordQuery};

pub use anki::{AnkiClient, NoteRequest};
pub use assembler::CardAssembler;
pub use audio::{ElevenLabsSynthesizer, SpeechSynthesizer};
pub use image::{ImageGenerator, ImageRequest, OpenAiImageGenerator};
pub use note::{build_card, has_blanks, CardContent};

/// Anki 笔记 ID
pub type NoteId = i64;

/// 接收已消歧的释义并建卡
#[async_trait]
pub trait CardSink: Send + Sync {
    /// `word` 为最终词形（模型纠正后），`query` 为原始查询
    async fn deliver(
        &self,
        query: &WordQuery,
        sense: &CandidateSense,
        word: &str,
    ) -> Result<NoteId, CardError>;
}

/// 卡片库：媒体上传与笔记写入
#[async_trait]
pub trait FlashcardStore: Send + Sync {
    /// 上传媒体文件，返回库内文件名
    async fn store_media(&self, filename: &str, data: &[u8]) -> Result<String, CardError>;

    async fn add_note(&self, note: &NoteRequest) -> Result<NoteId, CardError>;
}
