//! 应用配置：从 config/default.toml 与环境变量加载
//!
//! 加载顺序：先读 TOML 文件，再用环境变量 `CHISPA__*` 覆盖（双下划线表示嵌套，如 `CHISPA__ANKI__URL=...`）。
//! API Key 额外兼容 `OPENAI_API_KEY` / `ELEVENLABS_API_KEY`。加载结果以结构体形式传给各组件构造函数，
//! 查词与会话逻辑本身不读取环境变量。

use std::path::PathBuf;

use serde::Deserialize;

use crate::dictionary::Language;

/// 应用配置根（对应 config/default.toml 的顶层）
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub llm: LlmSection,
    pub image: ImageSection,
    pub audio: AudioSection,
    pub anki: AnkiSection,
    pub session: SessionSection,
}

/// [llm] 段：查词模型
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LlmSection {
    pub model: String,
    pub base_url: Option<String>,
    pub api_key: Option<String>,
    pub temperature: f32,
    /// 单次查词超时（秒）
    pub timeout_secs: u64,
}

impl Default for LlmSection {
    fn default() -> Self {
        Self {
            model: "gpt-4o".to_string(),
            base_url: None,
            api_key: None,
            temperature: 0.3,
            timeout_secs: 60,
        }
    }
}

/// [image] 段：配图生成
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ImageSection {
    pub enabled: bool,
    /// gpt-image-1 或 dall-e-3
    pub model: String,
    pub size: String,
    /// 未设置时复用 [llm].base_url
    pub base_url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ImageSection {
    fn default() -> Self {
        Self {
            enabled: true,
            model: "gpt-image-1".to_string(),
            size: "1024x1024".to_string(),
            base_url: None,
            timeout_secs: 120,
        }
    }
}

/// [audio] 段：ElevenLabs 发音
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioSection {
    pub enabled: bool,
    pub api_key: Option<String>,
    pub voice_id: String,
    pub model_id: String,
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for AudioSection {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: None,
            voice_id: "iLNdboCfbjKNDLRgl0GZ".to_string(),
            model_id: "eleven_multilingual_v2".to_string(),
            base_url: "https://api.elevenlabs.io".to_string(),
            timeout_secs: 60,
        }
    }
}

/// [anki] 段：AnkiConnect 地址、牌组、笔记类型与字段映射
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnkiSection {
    pub url: String,
    pub deck_spanish: String,
    pub deck_english: String,
    pub note_type: String,
    pub tags: Vec<String>,
    pub timeout_secs: u64,
    pub fields: AnkiFieldsSection,
}

impl AnkiSection {
    pub fn deck_for(&self, language: Language) -> &str {
        match language {
            Language::Es => &self.deck_spanish,
            Language::En => &self.deck_english,
        }
    }
}

impl Default for AnkiSection {
    fn default() -> Self {
        Self {
            url: "http://localhost:8765".to_string(),
            deck_spanish: "esp".to_string(),
            deck_english: "en".to_string(),
            note_type: "All-Purpose".to_string(),
            tags: vec!["chispa".to_string()],
            timeout_secs: 10,
            fields: AnkiFieldsSection::default(),
        }
    }
}

/// [anki.fields] 段：笔记类型中的字段名（与用户的 Anki 模板一致）
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AnkiFieldsSection {
    pub front_blank: String,
    pub front_picture: String,
    pub front_definition: String,
    pub back_word: String,
    pub full_sentence: String,
    pub extra_info: String,
}

impl Default for AnkiFieldsSection {
    fn default() -> Self {
        Self {
            front_blank: "Front (Example with word blanked out or missing)".to_string(),
            front_picture: "Front (Picture)".to_string(),
            front_definition: "Front (Definitions, base word, etc.)".to_string(),
            back_word: "Back (a single word/phrase, no context)".to_string(),
            full_sentence: "- The full sentence (no words blanked out)".to_string(),
            extra_info:
                "- Extra Info (Pronunciation, personal connections, conjugations, etc)".to_string(),
        }
    }
}

/// [session] 段：每个词的查词次数上限（首查 + 重试）
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SessionSection {
    /// 单词模式上限；None 表示不限（交互式由用户自己决定何时停）
    pub single_max_attempts: Option<u32>,
    /// 批量模式上限，避免坏词无限重试
    pub batch_max_attempts: u32,
}

impl Default for SessionSection {
    fn default() -> Self {
        Self {
            single_max_attempts: None,
            batch_max_attempts: 5,
        }
    }
}

impl AppConfig {
    /// 环境变量中的标准 Key 名补齐未配置的 api_key
    fn fill_api_keys_from_env(&mut self) {
        if self.llm.api_key.is_none() {
            self.llm.api_key = std::env::var("OPENAI_API_KEY").ok();
        }
        if self.audio.api_key.is_none() {
            self.audio.api_key = std::env::var("ELEVENLABS_API_KEY").ok();
        }
    }

    /// 检查必需配置，返回错误描述列表（空表示可用）
    pub fn validate(&self) -> Vec<String> {
        let mut errors = Vec::new();
        if self.llm.api_key.as_deref().map_or(true, str::is_empty) {
            errors.push("OPENAI_API_KEY not set in environment".to_string());
        }
        if self.audio.enabled && self.audio.api_key.as_deref().map_or(true, str::is_empty) {
            errors.push("ELEVENLABS_API_KEY not set in environment".to_string());
        }
        if self.session.batch_max_attempts == 0 {
            errors.push("session.batch_max_attempts must be at least 1".to_string());
        }
        errors
    }
}

/// 从 config 目录加载配置，环境变量 CHISPA__* 可覆盖
///
/// 1. 按顺序查找 config/default.toml、../config/default.toml、default.toml，找到则作为第一源
/// 2. 若传入 config_path 且文件存在，则追加该文件（可覆盖前面的键）
/// 3. 最后叠加环境变量 CHISPA__*（双下划线表示嵌套键）
pub fn load_config(config_path: Option<PathBuf>) -> Result<AppConfig, config::ConfigError> {
    let mut builder = config::Config::builder();

    let default_names = ["config/default", "../config/default", "default"];
    for name in default_names {
        let path = format!("{}.toml", name);
        if std::path::Path::new(&path).exists() {
            builder = builder.add_source(config::File::with_name(name).required(false));
            break;
        }
    }

    if let Some(ref path) = config_path {
        if path.exists() {
            builder = builder.add_source(config::File::from(path.clone()).required(false));
        } else {
            tracing::warn!("Config file {} not found, ignoring", path.display());
        }
    }

    builder = builder.add_source(
        config::Environment::with_prefix("CHISPA")
            .separator("__")
            .try_parsing(true),
    );

    let mut cfg: AppConfig = builder.build()?.try_deserialize()?;
    cfg.fill_api_keys_from_env();
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_anki_template() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.anki.url, "http://localhost:8765");
        assert_eq!(cfg.anki.deck_for(Language::Es), "esp");
        assert_eq!(cfg.anki.deck_for(Language::En), "en");
        assert_eq!(cfg.anki.note_type, "All-Purpose");
        assert_eq!(cfg.llm.model, "gpt-4o");
        assert_eq!(cfg.session.batch_max_attempts, 5);
        assert!(cfg.session.single_max_attempts.is_none());
    }

    #[test]
    fn test_validate_reports_missing_keys() {
        let cfg = AppConfig::default();
        let errors = cfg.validate();
        assert!(errors.iter().any(|e| e.contains("OPENAI_API_KEY")));
        assert!(errors.iter().any(|e| e.contains("ELEVENLABS_API_KEY")));
    }

    #[test]
    fn test_validate_skips_audio_key_when_disabled() {
        let mut cfg = AppConfig::default();
        cfg.llm.api_key = Some("sk-test".into());
        cfg.audio.enabled = false;
        assert!(cfg.validate().is_empty());
    }

    #[test]
    fn test_load_explicit_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("chispa.toml");
        std::fs::write(
            &path,
            "[anki]\ndeck_spanish = \"vocab::es\"\n\n[session]\nbatch_max_attempts = 2\n",
        )
        .unwrap();

        let cfg = load_config(Some(path)).unwrap();
        assert_eq!(cfg.anki.deck_spanish, "vocab::es");
        assert_eq!(cfg.anki.deck_english, "en");
        assert_eq!(cfg.session.batch_max_attempts, 2);
    }
}
