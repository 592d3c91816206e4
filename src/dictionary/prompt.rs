//! 查词提示词
//!
//! 一次请求同时完成：拼写 / 重音纠正、按上下文排序义项、例句与挖空模板、敏感义项标记。

use crate::dictionary::{Language, WordQuery};

pub const SYSTEM_PROMPT: &str =
    "You are a bilingual Spanish-English learner's dictionary. Reply with a single JSON object and nothing else.";

/// 按词数生成挖空模板："banco" → "___"，"echar de menos" → "___ ___ ___"
pub fn blank_pattern(word: &str) -> String {
    let count = word.split_whitespace().count().max(1);
    vec!["___"; count].join(" ")
}

fn context_instruction(context: Option<&str>) -> String {
    match context {
        Some(ctx) => format!(
            "The learner met this word in this context (hints accumulate, later ones refine earlier ones): \"{ctx}\".\n\
             Put the meanings that fit this context first. If the context clearly points to one meaning, return only that one."
        ),
        None => "Return the most common and useful meanings (at most 5, fewer if the word has few), most frequent first."
            .to_string(),
    }
}

fn sense_schema(language: Language) -> &'static str {
    match language {
        Language::Es => {
            r#"{
  "word": "the correctly spelled word with proper accents",
  "meanings": [
    {
      "definition": "English translation",
      "part_of_speech": "noun",
      "example_spanish": "Spanish example sentence",
      "example_spanish_blanked": "the same sentence with the word blanked",
      "example_english": "English translation of the example",
      "sensitive": false
    }
  ]
}"#
        }
        Language::En => {
            r#"{
  "word": "the correctly spelled word",
  "meanings": [
    {
      "definition": "clear explanation of the meaning",
      "part_of_speech": "noun",
      "example": "English example sentence",
      "example_blanked": "the same sentence with the word blanked",
      "sensitive": false
    }
  ]
}"#
        }
    }
}

/// 构造 user 提示词
pub fn build_lookup_prompt(query: &WordQuery) -> String {
    let word = query.word();
    let language = query.language();
    let word_count = word.split_whitespace().count();
    let blank = blank_pattern(word);
    let context = query.context();

    let spelling = match language {
        Language::Es => "Fix typos and missing accents using proper Spanish orthography (e.g. \"vispera\" -> \"víspera\", \"cafe\" -> \"café\").",
        Language::En => "Fix typos and missing diacritics in borrowed words (e.g. \"naive\" -> \"naïve\").",
    };

    let definition_rule = match language {
        Language::Es => "Definitions are English translations: 1-2 words for simple nouns (\"bench\", \"bank\"), a short phrase for verbs, idioms and nuanced words.",
        Language::En => "Definitions explain the meaning clearly instead of giving a bare synonym.",
    };

    format!(
        "Look up the {lang} word or phrase \"{word}\".\n\n\
         {context}\n\n\
         Reply with JSON in exactly this shape:\n{schema}\n\n\
         Spelling: the \"word\" field must hold the corrected form. {spelling}\n\n\
         Blanking: the phrase \"{word}\" has {word_count} word(s) and must be blanked as \"{blank}\". \
         Blank the whole phrase; for verbs blank the conjugated form used in the sentence; leave no part of it visible.\n\n\
         Content:\n\
         - {definition_rule}\n\
         - Include slang, vulgar and colloquial meanings when they are common. Be direct: name the thing plainly, never euphemise or censor translations.\n\
         - Set \"sensitive\" to true for vulgar, sexual or otherwise explicit meanings.\n\
         - Match sentence sophistication to the word: simple sentences for basic vocabulary, rich authentic ones for advanced words and idioms.\n\
         - Handle idioms, phrasal verbs and multi-word expressions naturally.",
        lang = language.display_name(),
        context = context_instruction(context.as_deref()),
        schema = sense_schema(language),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_pattern_counts_words() {
        assert_eq!(blank_pattern("banco"), "___");
        assert_eq!(blank_pattern("echar de menos"), "___ ___ ___");
        assert_eq!(blank_pattern("  si   puedo "), "___ ___");
    }

    #[test]
    fn test_prompt_without_context_asks_for_common_meanings() {
        let q = WordQuery::new("banco", Language::Es, None).unwrap();
        let prompt = build_lookup_prompt(&q);
        assert!(prompt.contains("Spanish word or phrase \"banco\""));
        assert!(prompt.contains("at most 5"));
        assert!(prompt.contains("example_english"));
    }

    #[test]
    fn test_prompt_carries_accumulated_context() {
        let mut q = WordQuery::new("coger", Language::Es, Some("vulgar")).unwrap();
        q.push_hint("Mexican slang");
        let prompt = build_lookup_prompt(&q);
        assert!(prompt.contains("\"vulgar; Mexican slang\""));
    }

    #[test]
    fn test_english_prompt_has_no_translation_field() {
        let q = WordQuery::new("serendipity", Language::En, None).unwrap();
        let prompt = build_lookup_prompt(&q);
        assert!(prompt.contains("English word or phrase"));
        assert!(!prompt.contains("example_english"));
    }
}
