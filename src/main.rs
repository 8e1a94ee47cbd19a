mod chat;
mod cli;
mod gemini;
mod markdown;

pub const USER_AGENT: &str = concat!("groundchat/", env!("CARGO_PKG_VERSION"));

use std::time::Duration;

use clap::Parser;
use reqwest::Client;
use tokio::io::BufReader;
use tracing::info;

use chat::{ChatSession, WriterSink};
use cli::Args;
use gemini::client::GeminiClient;

/// TCP connection establishment timeout.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(10);
/// Global HTTP client timeout; grounded generations can take a while.
const HTTP_TIMEOUT: Duration = Duration::from_secs(60);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let dotenv = dotenvy::dotenv();
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(args.log_directive().parse()?),
        )
        .init();

    if let Ok(path) = dotenv {
        info!(path = %path.display(), "loaded environment file");
    }

    let http = Client::builder()
        .connect_timeout(CONNECT_TIMEOUT)
        .timeout(HTTP_TIMEOUT)
        .build()?;
    let gemini = GeminiClient::from_env(http, args.model.clone())
        .inspect_err(|e| tracing::error!("Gemini client not available: {e}"))?;

    let mut session = ChatSession::new(gemini, WriterSink(tokio::io::stdout()));

    match args.prompt() {
        Some(prompt) => session.on_message(&prompt).await?,
        None => {
            info!("starting interactive chat");
            session
                .run(BufReader::new(tokio::io::stdin()), tokio::io::stderr())
                .await?
        }
    }

    Ok(())
}
