//! CardAssembler：默认的 CardSink
//!
//! 流程：配图（可选）→ 例句发音（可选，句子含空格时跳过）→ 拼字段 → addNote。
//! 媒体生成或上传失败只降级为空字段。

use std::sync::Arc;

use async_trait::async_trait;

use crate::cards::note::{audio_reference, image_reference, media_filename};
use crate::cards::{
    build_card, has_blanks, CardSink, FlashcardStore, ImageGenerator, ImageRequest, NoteId,
    NoteRequest, SpeechSynthesizer,
};
use crate::config::AnkiSection;
use crate::core::CardError;
use crate::dictionary::{CandidateSense, Language, WordQuery};

pub struct CardAssembler {
    store: Arc<dyn FlashcardStore>,
    images: Option<Arc<dyn ImageGenerator>>,
    speech: Option<Arc<dyn SpeechSynthesizer>>,
    anki: AnkiSection,
}

impl CardAssembler {
    pub fn new(store: Arc<dyn FlashcardStore>, anki: AnkiSection) -> Self {
        Self {
            store,
            images: None,
            speech: None,
            anki,
        }
    }

    pub fn with_images(mut self, images: Arc<dyn ImageGenerator>) -> Self {
        self.images = Some(images);
        self
    }

    pub fn with_speech(mut self, speech: Arc<dyn SpeechSynthesizer>) -> Self {
        self.speech = Some(speech);
        self
    }

    /// 英语卡片直接描绘例句；西语卡片描绘英译，没有英译时退回原句
    fn image_request(sense: &CandidateSense, language: Language) -> ImageRequest {
        let prompt = match (language, sense.translation.as_deref()) {
            (Language::Es, Some(t)) if !t.is_empty() => t.to_string(),
            _ => sense.example.clone(),
        };
        ImageRequest {
            prompt,
            sanitize: sense.sensitive,
        }
    }

    async fn attach_image(&self, word: &str, sense: &CandidateSense, language: Language) -> String {
        let Some(images) = &self.images else {
            return String::new();
        };
        let request = Self::image_request(sense, language);
        let bytes = match images.generate(&request).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(word, "Image generation failed: {}", e);
                return String::new();
            }
        };
        match self
            .store
            .store_media(&media_filename(word, "png"), &bytes)
            .await
        {
            Ok(stored) => image_reference(&stored),
            Err(e) => {
                tracing::warn!(word, "Image upload failed: {}", e);
                String::new()
            }
        }
    }

    async fn attach_audio(&self, word: &str, sentence: &str, language: Language) -> String {
        let Some(speech) = &self.speech else {
            return String::new();
        };
        if sentence.trim().is_empty() || has_blanks(sentence) {
            tracing::debug!(word, "Skipping audio for sentence with blanks");
            return String::new();
        }
        let bytes = match speech.synthesize(sentence, language).await {
            Ok(bytes) => bytes,
            Err(e) => {
                tracing::warn!(word, "Speech synthesis failed: {}", e);
                return String::new();
            }
        };
        match self
            .store
            .store_media(&media_filename(word, "mp3"), &bytes)
            .await
        {
            Ok(stored) => audio_reference(&stored),
            Err(e) => {
                tracing::warn!(word, "Audio upload failed: {}", e);
                String::new()
            }
        }
    }
}

#[async_trait]
impl CardSink for CardAssembler {
    async fn deliver(
        &self,
        query: &WordQuery,
        sense: &CandidateSense,
        word: &str,
    ) -> Result<NoteId, CardError> {
        let language = query.language();
        let image_ref = self.attach_image(word, sense, language).await;
        let audio_ref = self.attach_audio(word, &sense.example, language).await;

        let card = build_card(word, sense, language, &image_ref, &audio_ref);
        let note = NoteRequest {
            deck: self.anki.deck_for(language).to_string(),
            model: self.anki.note_type.clone(),
            fields: card.to_fields(&self.anki.fields),
            tags: self.anki.tags.clone(),
        };

        let id = self.store.add_note(&note).await?;
        tracing::info!(word, deck = %note.deck, note_id = id, "Card created");
        Ok(id)
    }
}
