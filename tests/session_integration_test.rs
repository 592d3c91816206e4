//! 会话集成测试：Mock LLM → 查词网关 → 消歧 → 建卡

#[cfg(test)]
mod tests {
    use std::fs;
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use chispa::batch::{BatchRunner, WorkList};
    use chispa::cards::{CardAssembler, FlashcardStore, NoteId, NoteRequest};
    use chispa::config::AnkiSection;
    use chispa::core::{CardError, FailureReason};
    use chispa::dictionary::{Language, LlmLookupGateway};
    use chispa::llm::MockLlmClient;
    use chispa::session::{
        Decision, ResolutionOutcome, ScriptedDecisions, SessionDriver, SessionMode,
    };

    const BANCO: &str = r#"{"word": "banco", "meanings": [
        {"definition": "bank (financial institution)", "part_of_speech": "noun",
         "example_spanish": "Fui al banco a sacar dinero.",
         "example_spanish_blanked": "Fui al ___ a sacar dinero.",
         "example_english": "I went to the bank to withdraw money."},
        {"definition": "bench", "part_of_speech": "noun",
         "example_spanish": "Me senté en el banco del parque.",
         "example_spanish_blanked": "Me senté en el ___ del parque.",
         "example_english": "I sat on the park bench."},
        {"definition": "bench", "part_of_speech": "noun",
         "example_spanish": "El banco estaba mojado.",
         "example_spanish_blanked": "El ___ estaba mojado.",
         "example_english": "The bench was wet."},
        {"definition": "school (of fish)", "part_of_speech": "noun",
         "example_spanish": "Vimos un banco de peces.",
         "example_spanish_blanked": "Vimos un ___ de peces.",
         "example_english": "We saw a school of fish."}]}"#;

    const BANCO_FINANCE: &str = r#"{"word": "banco", "meanings": [
        {"definition": "bank (financial institution)", "part_of_speech": "noun",
         "example_spanish": "El banco cerró a las tres.",
         "example_spanish_blanked": "El ___ cerró a las tres.",
         "example_english": "The bank closed at three."}]}"#;

    const VISPERA: &str = r#"{"word": "víspera", "meanings": [
        {"definition": "eve, the day before", "part_of_speech": "noun",
         "example_spanish": "La víspera del examen no dormí.",
         "example_spanish_blanked": "La ___ del examen no dormí.",
         "example_english": "The night before the exam I didn't sleep."}]}"#;

    const COGER: &str = r#"{"word": "coger", "meanings": [
        {"definition": "to have sex (vulgar, Mexico)", "part_of_speech": "verb",
         "example_spanish": "No digas coger en México.",
         "example_spanish_blanked": "No digas ___ en México.",
         "example_english": "Don't say coger in Mexico.", "sensitive": true}]}"#;

    const NOT_FOUND: &str = r#"{"word": "xyzzynotaword", "meanings": []}"#;

    #[derive(Default)]
    struct MemoryStore {
        notes: Mutex<Vec<NoteRequest>>,
    }

    #[async_trait]
    impl FlashcardStore for MemoryStore {
        async fn store_media(&self, filename: &str, _data: &[u8]) -> Result<String, CardError> {
            Ok(filename.to_string())
        }

        async fn add_note(&self, note: &NoteRequest) -> Result<NoteId, CardError> {
            let mut notes = self.notes.lock().unwrap();
            notes.push(note.clone());
            Ok(notes.len() as NoteId)
        }
    }

    fn driver(
        llm: Arc<MockLlmClient>,
        store: Arc<MemoryStore>,
        mode: SessionMode,
        max_attempts: Option<u32>,
    ) -> SessionDriver {
        let assembler = CardAssembler::new(store, AnkiSection::default());
        SessionDriver::new(Arc::new(LlmLookupGateway::new(llm)), mode, max_attempts)
            .with_card_sink(Arc::new(assembler))
    }

    #[tokio::test]
    async fn test_banco_retry_with_hint_then_select() {
        let llm = Arc::new(MockLlmClient::with_replies([BANCO, BANCO_FINANCE]));
        let store = Arc::new(MemoryStore::default());
        let driver = driver(llm.clone(), store.clone(), SessionMode::Single, None);
        let mut decisions = ScriptedDecisions::new([
            Decision::Retry("money".into()),
            Decision::Select(1),
        ]);

        let report = driver
            .resolve("banco", Language::Es, None, &mut decisions)
            .await;

        // 重复的 (noun, bench) 被去重，顺序保持
        let glosses: Vec<_> = decisions.presented[0].iter().map(|s| s.gloss.as_str()).collect();
        assert_eq!(
            glosses,
            ["bank (financial institution)", "bench", "school (of fish)"]
        );
        assert_eq!(report.attempts, 2);
        assert_eq!(report.hint_history, vec![String::new(), "money".to_string()]);
        assert!(llm.user_prompts()[1].contains("money"));
        assert!(report.is_complete());

        let notes = store.notes.lock().unwrap();
        let fields = &AnkiSection::default().fields;
        assert_eq!(notes[0].deck, "esp");
        assert_eq!(
            notes[0].fields[&fields.front_blank],
            "El ___ cerró a las tres.<br>The bank closed at three."
        );
    }

    #[tokio::test]
    async fn test_vispera_card_uses_corrected_spelling() {
        let llm = Arc::new(MockLlmClient::with_replies([VISPERA]));
        let store = Arc::new(MemoryStore::default());
        let driver = driver(llm, store.clone(), SessionMode::Single, None);
        let mut decisions = ScriptedDecisions::new([Decision::Select(1)]);

        let report = driver
            .resolve("vispera", Language::Es, None, &mut decisions)
            .await;

        match &report.outcome {
            ResolutionOutcome::Resolved { word, sense } => {
                assert_eq!(word, "víspera");
                assert!(sense.example.contains("víspera"));
            }
            other => panic!("unexpected outcome {other:?}"),
        }
        assert_eq!(report.word, "vispera");
        let notes = store.notes.lock().unwrap();
        assert_eq!(
            notes[0].fields[&AnkiSection::default().fields.back_word],
            "víspera"
        );
    }

    #[tokio::test]
    async fn test_unknown_word_fails_without_prompting() {
        let llm = Arc::new(MockLlmClient::with_replies([NOT_FOUND]));
        let store = Arc::new(MemoryStore::default());
        let driver = driver(llm, store.clone(), SessionMode::Single, None);
        let mut decisions = ScriptedDecisions::default();

        let report = driver
            .resolve("xyzzynotaword", Language::Es, None, &mut decisions)
            .await;

        assert_eq!(
            report.outcome,
            ResolutionOutcome::Failed(FailureReason::NoMeaningsFound)
        );
        assert!(decisions.presented.is_empty());
        assert!(store.notes.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_inline_hint_is_sent_on_first_lookup() {
        let llm = Arc::new(MockLlmClient::with_replies([COGER]));
        let store = Arc::new(MemoryStore::default());
        let driver = driver(llm.clone(), store, SessionMode::Single, None);
        let mut decisions = ScriptedDecisions::new([Decision::Select(1)]);

        let report = driver
            .resolve("coger | vulgar Mexican slang", Language::Es, None, &mut decisions)
            .await;

        assert_eq!(report.word, "coger");
        assert_eq!(report.attempts, 1);
        let prompt = &llm.user_prompts()[0];
        assert!(prompt.contains("\"coger\""));
        assert!(prompt.contains("vulgar Mexican slang"));
        match report.outcome {
            ResolutionOutcome::Resolved { sense, .. } => assert!(sense.sensitive),
            other => panic!("unexpected outcome {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_batch_file_keeps_unresolved_words() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("palabras.txt");
        fs::write(
            &path,
            "# semana 12\nvispera\nxyzzynotaword\nbanco | park furniture\n",
        )
        .unwrap();

        let llm = Arc::new(MockLlmClient::with_replies([VISPERA, NOT_FOUND, BANCO]));
        let store = Arc::new(MemoryStore::default());
        let driver = driver(llm, store.clone(), SessionMode::Batch, Some(5));
        let mut list = WorkList::load(&path).unwrap();
        let mut decisions = ScriptedDecisions::new([Decision::Select(1), Decision::Skip]);

        let summary = BatchRunner::new(&driver, Language::Es)
            .run(&mut list, &mut decisions)
            .await
            .unwrap();

        assert_eq!(summary.created().len(), 1);
        assert_eq!(summary.failed().len(), 1);
        assert_eq!(summary.skipped().len(), 1);
        assert_eq!(store.notes.lock().unwrap().len(), 1);
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "# semana 12\nxyzzynotaword\nbanco | park furniture\n"
        );
    }
}
