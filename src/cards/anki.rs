//! AnkiConnect 客户端（JSON 协议 version 6）
//!
//! POST {"action", "version": 6, "params"}，响应 {"result", "error"}；error 非空即失败。
//! 连接失败映射为 CardError::Unavailable（Anki 未启动或未装插件）。

use std::collections::BTreeMap;

use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::cards::{FlashcardStore, NoteId};
use crate::config::AnkiSection;
use crate::core::CardError;

const ANKI_CONNECT_VERSION: u32 = 6;

/// 待写入的笔记
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteRequest {
    pub deck: String,
    pub model: String,
    /// 字段名 → 内容（字段名来自配置）
    pub fields: BTreeMap<String, String>,
    pub tags: Vec<String>,
}

impl NoteRequest {
    /// addNote 的 note 参数；不允许重复卡片
    pub fn to_payload(&self) -> Value {
        json!({
            "deckName": self.deck,
            "modelName": self.model,
            "fields": self.fields,
            "options": { "allowDuplicate": false },
            "tags": self.tags,
        })
    }
}

#[derive(Debug, Deserialize)]
struct AnkiResponse {
    #[serde(default)]
    result: Value,
    #[serde(default)]
    error: Option<String>,
}

impl AnkiResponse {
    fn into_result(self) -> Result<Value, CardError> {
        match self.error {
            Some(err) => Err(CardError::Anki(err)),
            None => Ok(self.result),
        }
    }
}

fn request_body(action: &str, params: Option<Value>) -> Value {
    let mut body = json!({ "action": action, "version": ANKI_CONNECT_VERSION });
    if let Some(params) = params {
        body["params"] = params;
    }
    body
}

pub struct AnkiClient {
    client: Client,
    url: String,
}

impl AnkiClient {
    pub fn new(url: impl Into<String>, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(std::time::Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_default();
        Self {
            client,
            url: url.into(),
        }
    }

    pub fn from_config(section: &AnkiSection) -> Self {
        Self::new(section.url.clone(), section.timeout_secs)
    }

    async fn request(&self, action: &str, params: Option<Value>) -> Result<Value, CardError> {
        tracing::debug!(action, "AnkiConnect request");
        let resp = self
            .client
            .post(&self.url)
            .json(&request_body(action, params))
            .send()
            .await
            .map_err(|e| {
                if e.is_connect() {
                    CardError::Unavailable
                } else {
                    CardError::Http(e)
                }
            })?
            .error_for_status()?;
        let body: AnkiResponse = resp.json().await?;
        body.into_result()
    }

    /// Anki 是否在运行且装了 AnkiConnect
    pub async fn is_available(&self) -> bool {
        match self.request("version", None).await {
            Ok(_) => true,
            Err(e) => {
                tracing::debug!("AnkiConnect unavailable: {}", e);
                false
            }
        }
    }

    pub async fn deck_names(&self) -> Result<Vec<String>, CardError> {
        let value = self.request("deckNames", None).await?;
        serde_json::from_value(value).map_err(|e| CardError::UnexpectedResponse(e.to_string()))
    }

    pub async fn model_names(&self) -> Result<Vec<String>, CardError> {
        let value = self.request("modelNames", None).await?;
        serde_json::from_value(value).map_err(|e| CardError::UnexpectedResponse(e.to_string()))
    }
}

#[async_trait]
impl FlashcardStore for AnkiClient {
    async fn store_media(&self, filename: &str, data: &[u8]) -> Result<String, CardError> {
        let encoded = base64::engine::general_purpose::STANDARD.encode(data);
        let value = self
            .request(
                "storeMediaFile",
                Some(json!({ "filename": filename, "data": encoded })),
            )
            .await?;
        Ok(value.as_str().unwrap_or(filename).to_string())
    }

    async fn add_note(&self, note: &NoteRequest) -> Result<NoteId, CardError> {
        let value = self
            .request("addNote", Some(json!({ "note": note.to_payload() })))
            .await?;
        value
            .as_i64()
            .ok_or_else(|| CardError::UnexpectedResponse(format!("addNote returned {value}")))
    }
}
