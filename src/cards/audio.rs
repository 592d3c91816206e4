//! 例句发音（ElevenLabs text-to-speech，返回 MP3 字节）

use async_trait::async_trait;
use reqwest::Client;
use serde_json::json;

use crate::config::AudioSection;
use crate::core::MediaError;
use crate::dictionary::Language;

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, text: &str, language: Language) -> Result<Vec<u8>, MediaError>;
}

pub struct ElevenLabsSynthesizer {
    client: Client,
    base_url: String,
    api_key: String,
    voice_id: String,
    model_id: String,
}

impl ElevenLabsSynthesizer {
    pub fn from_config(section: &AudioSection) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(section.timeout_secs))
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: section.base_url.trim_end_matches('/').to_string(),
            api_key: section.api_key.clone().unwrap_or_default(),
            voice_id: section.voice_id.clone(),
            model_id: section.model_id.clone(),
        }
    }

    fn endpoint(&self) -> String {
        format!("{}/v1/text-to-speech/{}", self.base_url, self.voice_id)
    }
}

#[async_trait]
impl SpeechSynthesizer for ElevenLabsSynthesizer {
    async fn synthesize(&self, text: &str, language: Language) -> Result<Vec<u8>, MediaError> {
        // 多语种模型按文本自动识别语言
        tracing::debug!(language = %language, voice = %self.voice_id, "Synthesizing speech");
        let resp = self
            .client
            .post(self.endpoint())
            .header("xi-api-key", &self.api_key)
            .header(reqwest::header::ACCEPT, "audio/mpeg")
            .json(&json!({ "text": text, "model_id": self.model_id }))
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(MediaError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = resp.bytes().await?;
        if bytes.is_empty() {
            return Err(MediaError::EmptyPayload);
        }
        Ok(bytes.to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_endpoint_uses_voice_id() {
        let mut section = AudioSection::default();
        section.base_url = "https://api.elevenlabs.io/".into();
        let synth = ElevenLabsSynthesizer::from_config(&section);
        assert_eq!(
            synth.endpoint(),
            "https://api.elevenlabs.io/v1/text-to-speech/iLNdboCfbjKNDLRgl0GZ"
        );
    }
}
