use anyhow::Result;
use clap::Parser;

mod app;
mod commands;
mod render;

#[derive(Parser)]
#[command(name = "pollenchat")]
#[command(about = "pollenchat - chat with Pollinations text models from the terminal")]
#[command(version)]
struct Cli {
    /// Send a single prompt and exit
    #[arg(short, long)]
    prompt: Option<String>,

    /// Model to use (openai, claude, mistral, llama, qwen, deepseek)
    #[arg(short, long)]
    model: Option<String>,

    /// Override the text endpoint base URL
    #[arg(long)]
    base_url: Option<String>,

    /// Keep the conversation in memory only
    #[arg(long)]
    no_persist: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();

    let cli = Cli::parse();

    let mut settings = pollenchat_core::Settings::load();

    if let Some(ref model) = cli.model {
        settings.chat.model = model.clone();
    }
    if let Some(ref base_url) = cli.base_url {
        settings.api.base_url = base_url.clone();
    }
    if cli.no_persist {
        settings.storage.persist = false;
    }
    tracing::debug!(model = %settings.chat.model, persist = settings.storage.persist, "settings loaded");

    if let Some(prompt) = cli.prompt {
        app::run_single_prompt(&settings, &prompt).await?;
    } else {
        app::run_repl(settings).await?;
    }

    Ok(())
}
