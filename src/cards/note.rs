//! 卡片内容拼装
//!
//! 挖空句优先用模型给的模板（能处理动词变位）；模板缺失时按词数生成空格并做大小写不敏感替换。
//! 西语卡片在句子后追加 `<br>` + 英译，英语卡片不追加。

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::{NoExpand, Regex, RegexBuilder};

use crate::config::AnkiFieldsSection;
use crate::dictionary::prompt::blank_pattern;
use crate::dictionary::{CandidateSense, Language};

/// 写入笔记的字段值
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardContent {
    pub word: String,
    pub definition: String,
    pub sentence_blank: String,
    pub sentence_full: String,
    pub image_ref: String,
    pub audio_ref: String,
}

impl CardContent {
    /// 按配置的字段名映射为 Anki 字段
    pub fn to_fields(&self, names: &AnkiFieldsSection) -> BTreeMap<String, String> {
        BTreeMap::from([
            (names.front_blank.clone(), self.sentence_blank.clone()),
            (names.front_picture.clone(), self.image_ref.clone()),
            (names.front_definition.clone(), self.definition.clone()),
            (names.back_word.clone(), self.word.clone()),
            (names.full_sentence.clone(), self.sentence_full.clone()),
            (names.extra_info.clone(), self.audio_ref.clone()),
        ])
    }
}

fn blank_regex() -> &'static Regex {
    static BLANK: OnceLock<Regex> = OnceLock::new();
    BLANK.get_or_init(|| Regex::new(r"_{2,}").expect("valid blank pattern"))
}

/// 文本中是否还有空格占位（两个及以上下划线）；有则不生成语音
pub fn has_blanks(text: &str) -> bool {
    blank_regex().is_match(text)
}

/// 大小写不敏感地把 word 替换为 blank
pub fn replace_with_blank(sentence: &str, word: &str, blank: &str) -> String {
    match RegexBuilder::new(&regex::escape(word))
        .case_insensitive(true)
        .build()
    {
        Ok(re) => re.replace_all(sentence, NoExpand(blank)).into_owned(),
        Err(e) => {
            tracing::warn!("Cannot build blank pattern for {:?}: {}", word, e);
            sentence.to_string()
        }
    }
}

pub fn media_filename(word: &str, extension: &str) -> String {
    format!("chispa_{word}.{extension}")
}

pub fn image_reference(filename: &str) -> String {
    format!("<img src=\"{filename}\">")
}

pub fn audio_reference(filename: &str) -> String {
    format!("[sound:{filename}]")
}

pub fn build_card(
    word: &str,
    sense: &CandidateSense,
    language: Language,
    image_ref: &str,
    audio_ref: &str,
) -> CardContent {
    let blanked = if sense.blanked.is_empty() {
        replace_with_blank(&sense.example, word, &blank_pattern(word))
    } else {
        sense.blanked.clone()
    };

    let (sentence_blank, sentence_full) = match (language, sense.translation.as_deref()) {
        (Language::Es, Some(translation)) if !translation.is_empty() => (
            format!("{blanked}<br>{translation}"),
            format!("{}<br>{translation}", sense.example),
        ),
        _ => (blanked, sense.example.clone()),
    };

    CardContent {
        word: word.to_string(),
        definition: sense.gloss.clone(),
        sentence_blank,
        sentence_full,
        image_ref: image_ref.to_string(),
        audio_ref: audio_ref.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn spanish_sense(blanked: &str) -> CandidateSense {
        CandidateSense {
            part_of_speech: "noun".into(),
            gloss: "bench".into(),
            example: "Banco de madera: me senté en el banco.".into(),
            translation: Some("Wooden bench: I sat on the bench.".into()),
            blanked: blanked.into(),
            sensitive: false,
        }
    }

    #[test]
    fn test_spanish_card_appends_translation() {
        let sense = spanish_sense("___ de madera: me senté en el ___.");
        let card = build_card("banco", &sense, Language::Es, "<img src=\"x.png\">", "");
        assert_eq!(
            card.sentence_blank,
            "___ de madera: me senté en el ___.<br>Wooden bench: I sat on the bench."
        );
        assert_eq!(
            card.sentence_full,
            "Banco de madera: me senté en el banco.<br>Wooden bench: I sat on the bench."
        );
        assert_eq!(card.definition, "bench");
        assert_eq!(card.word, "banco");
    }

    #[test]
    fn test_missing_template_falls_back_to_case_insensitive_blanking() {
        let card = build_card("banco", &spanish_sense(""), Language::Es, "", "");
        assert!(card
            .sentence_blank
            .starts_with("___ de madera: me senté en el ___.<br>"));
    }

    #[test]
    fn test_english_card_has_no_translation_line() {
        let sense = CandidateSense {
            part_of_speech: "phrase".into(),
            gloss: "finally, after everything".into(),
            example: "In the end, we stayed home.".into(),
            translation: None,
            blanked: String::new(),
            sensitive: false,
        };
        let card = build_card("in the end", &sense, Language::En, "", "");
        assert_eq!(card.sentence_blank, "___ ___ ___, we stayed home.");
        assert_eq!(card.sentence_full, "In the end, we stayed home.");
    }

    #[test]
    fn test_has_blanks() {
        assert!(has_blanks("Me senté en el ___."));
        assert!(has_blanks("a __ b"));
        assert!(!has_blanks("snake_case only"));
    }

    #[test]
    fn test_replace_escapes_regex_characters() {
        assert_eq!(replace_with_blank("¿Qué? (sí)", "(sí)", "___"), "¿Qué? ___");
    }

    #[test]
    fn test_media_references() {
        assert_eq!(image_reference(&media_filename("banco", "png")), "<img src=\"chispa_banco.png\">");
        assert_eq!(audio_reference(&media_filename("banco", "mp3")), "[sound:chispa_banco.mp3]");
    }

    #[test]
    fn test_fields_use_configured_names() {
        let card = build_card("banco", &spanish_sense("x ___"), Language::Es, "img", "snd");
        let fields = card.to_fields(&AnkiFieldsSection::default());
        assert_eq!(fields.len(), 6);
        assert_eq!(fields["Back (a single word/phrase, no context)"], "banco");
        assert_eq!(fields["Front (Picture)"], "img");
    }
}
