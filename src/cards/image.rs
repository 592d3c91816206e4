//! 配图生成
//!
//! 请求 {英文场景描述, 是否净化}；OpenAI /images/generations 返回 b64_json 或 URL，统一转成 PNG 字节。

use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;

use crate::config::{ImageSection, LlmSection};
use crate::core::MediaError;

const OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    /// 用英文描述的场景（英语卡片用例句，西语卡片用英译）
    pub prompt: String,
    /// 释义被标记为敏感时只描绘场景与情绪
    pub sanitize: bool,
}

#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(&self, request: &ImageRequest) -> Result<Vec<u8>, MediaError>;
}

/// 最终发给图片模型的提示词
pub fn illustration_prompt(request: &ImageRequest) -> String {
    let scene = if request.sanitize {
        format!(
            "the setting and emotions around this sentence, with nothing explicit shown: \"{}\"",
            request.prompt
        )
    } else {
        request.prompt.clone()
    };
    format!(
        "Create a clear, simple illustration that depicts: {scene}. \
         Style: clean, educational, suitable for a flashcard. No text in the image."
    )
}

#[derive(Debug, Deserialize)]
struct ImagesResponse {
    #[serde(default)]
    data: Vec<ImageDatum>,
}

#[derive(Debug, Deserialize)]
struct ImageDatum {
    #[serde(default)]
    b64_json: Option<String>,
    #[serde(default)]
    url: Option<String>,
}

pub struct OpenAiImageGenerator {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
    size: String,
}

impl OpenAiImageGenerator {
    pub fn new(
        base_url: Option<&str>,
        api_key: &str,
        model: &str,
        size: &str,
        timeout_secs: u64,
    ) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: base_url
                .unwrap_or(OPENAI_BASE_URL)
                .trim_end_matches('/')
                .to_string(),
            api_key: api_key.to_string(),
            model: model.to_string(),
            size: size.to_string(),
        }
    }

    /// 与查词共用 OpenAI Key；base_url 未单独配置时沿用 [llm].base_url
    pub fn from_config(image: &ImageSection, llm: &LlmSection) -> Self {
        let base_url = image.base_url.as_deref().or(llm.base_url.as_deref());
        Self::new(
            base_url,
            llm.api_key.as_deref().unwrap_or_default(),
            &image.model,
            &image.size,
            image.timeout_secs,
        )
    }

    async fn download(&self, url: &str) -> Result<Vec<u8>, MediaError> {
        let resp = self.client.get(url).send().await?;
        if !resp.status().is_success() {
            return Err(MediaError::Status {
                status: resp.status().as_u16(),
                body: String::new(),
            });
        }
        Ok(resp.bytes().await?.to_vec())
    }
}

#[async_trait]
impl ImageGenerator for OpenAiImageGenerator {
    async fn generate(&self, request: &ImageRequest) -> Result<Vec<u8>, MediaError> {
        let body = json!({
            "model": self.model,
            "prompt": illustration_prompt(request),
            "size": self.size,
            "n": 1,
        });
        let resp = self
            .client
            .post(format!("{}/images/generations", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
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

        let parsed: ImagesResponse = resp.json().await?;
        let datum = parsed.data.into_iter().next().ok_or(MediaError::EmptyPayload)?;

        if let Some(b64) = datum.b64_json.filter(|s| !s.is_empty()) {
            return base64::engine::general_purpose::STANDARD
                .decode(b64)
                .map_err(|e| MediaError::Decode(e.to_string()));
        }
        match datum.url {
            Some(url) => self.download(&url).await,
            None => Err(MediaError::EmptyPayload),
        }
    }
}
