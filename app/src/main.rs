#![deny(
    clippy::all,
    clippy::nursery,
    clippy::pedantic,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::correctness,
    clippy::suspicious,
    clippy::unwrap_used,
    clippy::expect_used
)]
#![allow(
    clippy::similar_names,
    clippy::missing_safety_doc,
    clippy::missing_panics_doc,
    clippy::missing_errors_doc
)]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::{EnvFilter, FmtSubscriber};
use uuid::Uuid;

mod command;

use command::{
    ChatInput, ChatStrategy, CommandStrategy, ExtractInput, ExtractStrategy, InfoStrategy,
    InitStrategy, VersionStrategy,
};

#[derive(Parser)]
#[command(name = "parley")]
#[command(about = "parley conversational assistant", long_about = None)]
struct Cli {
    /// Log filter, e.g. "info" or "parley_conversation=debug" (overrides `RUST_LOG`)
    #[arg(long, global = true)]
    log: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Chat with the assistant, keeping history across turns
    Chat {
        /// Single message to send (non-interactive mode)
        #[arg(short = 'm', long)]
        message: Option<String>,

        /// Model to use
        #[arg(short = 'M', long)]
        model: Option<String>,

        /// Steering context for the session
        #[arg(short = 'c', long)]
        context: Option<String>,

        /// Answer every question as free text
        #[arg(long)]
        free_text: bool,

        /// Session id (a new one is generated when omitted)
        #[arg(long)]
        session_id: Option<Uuid>,
    },
    /// Split a model reply into display text and structured data
    Extract {
        /// File holding the raw reply (stdin when omitted)
        file: Option<PathBuf>,
    },
    /// Initialize configuration
    Init,
    /// Show configuration
    Info,
    /// Show version
    Version,
}

fn init_tracing(filter: Option<&str>) -> anyhow::Result<()> {
    let filter = filter
        .map(EnvFilter::try_new)
        .transpose()?
        .or_else(|| EnvFilter::try_from_default_env().ok())
        .unwrap_or_else(|| EnvFilter::new("warn"));

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.log.as_deref())?;

    match cli.command {
        Commands::Chat {
            message,
            model,
            context,
            free_text,
            session_id,
        } => {
            ChatStrategy
                .execute(ChatInput {
                    session_id,
                    message,
                    model,
                    context,
                    free_text,
                })
                .await
        }
        Commands::Extract { file } => ExtractStrategy.execute(ExtractInput { file }).await,
        Commands::Init => InitStrategy.execute(()).await,
        Commands::Info => InfoStrategy.execute(()).await,
        Commands::Version => VersionStrategy.execute(()).await,
    }
}
