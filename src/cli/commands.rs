//! 子命令实现：add（单词）与 batch（词表文件）

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use tokio_util::sync::CancellationToken;

use crate::batch::{BatchRunner, BatchSummary, WorkList};
use crate::cards::{AnkiClient, CardAssembler, ElevenLabsSynthesizer, OpenAiImageGenerator};
use crate::cli::TerminalPresenter;
use crate::config::AppConfig;
use crate::core::FailureReason;
use crate::dictionary::{Language, LlmLookupGateway};
use crate::llm::{LlmClient, OpenAiClient};
use crate::session::{ResolutionOutcome, SessionDriver, SessionMode, SessionReport};

/// 按配置组装会话驱动：LLM 网关 + Anki 建卡（含可选的配图与发音）
async fn build_driver(
    config: &AppConfig,
    mode: SessionMode,
    cancel: &CancellationToken,
) -> Result<(SessionDriver, Arc<dyn LlmClient>)> {
    let anki = Arc::new(AnkiClient::from_config(&config.anki));
    if !anki.is_available().await {
        bail!(
            "AnkiConnect not reachable at {}. Start Anki with the AnkiConnect add-on installed.",
            config.anki.url
        );
    }
    // 只警告：另一种语言的牌组本次可能用不到
    if let Ok(decks) = anki.deck_names().await {
        for deck in [&config.anki.deck_spanish, &config.anki.deck_english] {
            if !decks.contains(deck) {
                tracing::warn!("Anki deck {:?} not found", deck);
            }
        }
    }
    if let Ok(models) = anki.model_names().await {
        if !models.contains(&config.anki.note_type) {
            bail!("Anki note type {:?} not found", config.anki.note_type);
        }
    }

    let llm: Arc<dyn LlmClient> = Arc::new(OpenAiClient::from_config(&config.llm));
    let gateway = Arc::new(LlmLookupGateway::new(llm.clone()));

    let mut assembler = CardAssembler::new(anki, config.anki.clone());
    if config.image.enabled {
        assembler = assembler.with_images(Arc::new(OpenAiImageGenerator::from_config(
            &config.image,
            &config.llm,
        )));
    }
    if config.audio.enabled {
        assembler = assembler.with_speech(Arc::new(ElevenLabsSynthesizer::from_config(
            &config.audio,
        )));
    }

    let max_attempts = match mode {
        SessionMode::Single => config.session.single_max_attempts,
        SessionMode::Batch => Some(config.session.batch_max_attempts),
    };

    let driver = SessionDriver::new(gateway, mode, max_attempts)
        .with_card_sink(Arc::new(assembler))
        .with_cancel_token(cancel.clone());
    Ok((driver, llm))
}

/// Anki 检查期间也响应 Ctrl-C
async fn build_driver_cancellable(
    config: &AppConfig,
    mode: SessionMode,
    cancel: &CancellationToken,
) -> Result<(SessionDriver, Arc<dyn LlmClient>)> {
    tokio::select! {
        biased;
        _ = cancel.cancelled() => bail!("Cancelled"),
        built = build_driver(config, mode, cancel) => built,
    }
}

fn log_token_usage(llm: &dyn LlmClient) {
    let (prompt, completion, total) = llm.token_usage();
    tracing::info!(prompt, completion, total, "Token usage");
}

fn describe_failure(report: &SessionReport) -> String {
    match (&report.outcome, &report.card) {
        (ResolutionOutcome::Failed(FailureReason::NoMeaningsFound), _) => {
            format!("No meanings found for \"{}\"", report.word)
        }
        (ResolutionOutcome::Failed(reason), _) => format!("{}: {}", report.word, reason),
        (_, Some(Err(e))) => format!("{}: card not created: {}", report.word, e),
        _ => report.word.clone(),
    }
}

/// `chispa add "<word>[| hint]" [-c hint] [-l es|en]`
pub async fn run_add(
    config: &AppConfig,
    word: &str,
    context: Option<&str>,
    language: Language,
    cancel: CancellationToken,
) -> Result<()> {
    let (driver, llm) = build_driver_cancellable(config, SessionMode::Single, &cancel).await?;
    let mut presenter = TerminalPresenter::new();

    let report = driver.resolve(word, language, context, &mut presenter).await;
    log_token_usage(llm.as_ref());
    tracing::debug!(
        word = %report.word,
        attempts = report.attempts,
        hints = ?report.hint_history,
        outcome = report.outcome.label(),
        "Session finished"
    );

    match &report.outcome {
        ResolutionOutcome::Resolved { word: final_word, sense } => match &report.card {
            Some(Ok(id)) => {
                println!("Created card for \"{}\" ({}) [note {}]", final_word, sense.gloss, id);
                Ok(())
            }
            Some(Err(e)) => bail!("Card for \"{}\" not created: {}", final_word, e),
            None => Ok(()),
        },
        ResolutionOutcome::Cancelled => {
            println!("Cancelled.");
            Ok(())
        }
        ResolutionOutcome::Skipped => {
            println!("Skipped.");
            Ok(())
        }
        ResolutionOutcome::Failed(_) => bail!(describe_failure(&report)),
    }
}

fn print_summary(summary: &BatchSummary, path: &Path) {
    println!();
    println!("Batch finished: {} of {} word(s) processed", summary.reports.len(), summary.total);

    let created = summary.created();
    println!("Created {} card(s)", created.len());
    for report in created {
        if let ResolutionOutcome::Resolved { word, .. } = &report.outcome {
            if word != &report.word {
                println!("  {} → {}", report.word, word);
            } else {
                println!("  {}", word);
            }
        }
    }

    let skipped = summary.skipped();
    if !skipped.is_empty() {
        println!("Skipped {}:", skipped.len());
        for report in skipped {
            println!("  {}", report.word);
        }
    }

    let failed = summary.failed();
    if !failed.is_empty() {
        println!("Failed {}:", failed.len());
        for report in failed {
            println!("  {}", describe_failure(report));
        }
    }

    if summary.cancelled {
        println!("Cancelled with {} word(s) not reached.", summary.unprocessed());
    }
    if summary.created().len() < summary.total {
        println!("Remaining words are kept in {}", path.display());
    }
}

/// `chispa batch <file> [-l es|en]`
pub async fn run_batch(
    config: &AppConfig,
    file: &Path,
    language: Language,
    cancel: CancellationToken,
) -> Result<()> {
    let mut list = WorkList::load(file)
        .with_context(|| format!("Failed to load word list {}", file.display()))?;
    if list.is_empty() {
        println!("No words to process in {}", file.display());
        return Ok(());
    }

    let (driver, llm) = build_driver_cancellable(config, SessionMode::Batch, &cancel).await?;
    let mut presenter = TerminalPresenter::new();

    let summary = BatchRunner::new(&driver, language)
        .run(&mut list, &mut presenter)
        .await
        .with_context(|| format!("Failed to update word list {}", file.display()))?;

    log_token_usage(llm.as_ref());
    print_summary(&summary, file);
    Ok(())
}
