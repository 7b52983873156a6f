//! Command-line entry point of the picture frame.

use std::io::{BufRead, Write};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use frame_db::LogKind;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "ai-image-frame", version, about = "AI picture frame for a seven-colour e-ink panel")]
struct Cli {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate images for a prompt and choose one to display.
    New {
        /// The prompt; asked for interactively when omitted.
        prompt: Vec<String>,
    },
    /// Choose again among the most recently generated images.
    Repeat,
    /// Choose among the most recently displayed images.
    History,
    /// Blank the display.
    Clear,
    /// Forget all generated and displayed images.
    ClearHistory,
    /// Print recent history entries as JSON.
    List {
        /// List displayed images instead of generated ones.
        #[arg(long)]
        chosen: bool,

        #[arg(long, default_value_t = 4)]
        limit: usize,
    },
    /// Import a `file_name,prompt` text log into the history.
    Import {
        log: PathBuf,

        /// Import into the displayed-images log.
        #[arg(long)]
        chosen: bool,
    },
}

fn log_kind(chosen: bool) -> LogKind {
    if chosen { LogKind::Chosen } else { LogKind::Generated }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let (db, config) = ai_image_frame_lib::init_foundation()?;
    let mut app = ai_image_frame_lib::build_app(db, config)?;

    let stdin = std::io::stdin();
    let mut input = stdin.lock();
    let mut output = std::io::stdout();

    match cli.cmd {
        Command::New { prompt } => {
            let mut prompt = prompt.join(" ");
            if prompt.trim().is_empty() {
                write!(output, "Please enter a prompt: ")?;
                output.flush()?;
                input.read_line(&mut prompt)?;
            }
            app.new_prompt(&prompt, &mut input, &mut output).await?;
        }
        Command::Repeat => {
            app.repeat(&mut input, &mut output)?;
        }
        Command::History => {
            app.history(&mut input, &mut output)?;
        }
        Command::Clear => app.clear()?,
        Command::ClearHistory => {
            let removed = app.clear_history()?;
            tracing::info!(removed, "History cleared");
        }
        Command::List { chosen, limit } => {
            println!("{}", app.list(log_kind(chosen), limit)?);
        }
        Command::Import { log, chosen } => {
            let count = app.import(log_kind(chosen), &log)?;
            tracing::info!(count, "History imported");
        }
    }
    Ok(())
}
