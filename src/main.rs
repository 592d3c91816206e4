//! chispa - 从单词生成 Anki 卡片
//!
//! 入口：加载 .env 与配置、初始化日志，分派 add / batch 子命令。

use std::path::PathBuf;

use anyhow::Context;
use chispa::{
    cli::{run_add, run_batch},
    config::load_config,
    core::{install_ctrl_c_handler, INTERRUPTED_EXIT_CODE},
    dictionary::Language,
    observability,
};
use clap::{Parser, Subcommand};

/// Create Anki flashcards from Spanish or English words.
#[derive(Parser, Debug)]
#[command(name = "chispa", version, about, long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Extra TOML config file (overrides config/default.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Look up one word and create a card.
    ///
    /// A hint may follow the word after `|`, e.g. "coger | vulgar Mexican slang".
    Add {
        word: String,

        /// Context hint for the lookup
        #[arg(short = 'c', long)]
        context: Option<String>,

        /// Word language: es or en
        #[arg(short, long, default_value = "es")]
        lang: Language,
    },

    /// Process a word list file, removing words once their card is created.
    Batch {
        file: PathBuf,

        /// Word language: es or en
        #[arg(short, long, default_value = "es")]
        lang: Language,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    observability::init(cli.verbose);

    let config = load_config(cli.config.clone()).context("Failed to load configuration")?;
    let errors = config.validate();
    if !errors.is_empty() {
        eprintln!("Configuration errors:");
        for error in &errors {
            eprintln!("  - {error}");
        }
        std::process::exit(1);
    }

    let cancel = install_ctrl_c_handler();

    let result = match cli.command {
        Commands::Add {
            word,
            context,
            lang,
        } => run_add(&config, &word, context.as_deref(), lang, cancel.clone()).await,
        Commands::Batch { file, lang } => run_batch(&config, &file, lang, cancel.clone()).await,
    };

    // 被中断时 stdin 上可能还挂着一个无法取消的阻塞读，直接退出而不是等运行时关闭
    if cancel.is_cancelled() {
        if let Err(e) = &result {
            eprintln!("Error: {e:#}");
        }
        std::process::exit(INTERRUPTED_EXIT_CODE);
    }
    result
}
