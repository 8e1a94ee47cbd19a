//! Chat session: greeting, per-message handling, and the terminal loop.

use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{error, info, warn};

use crate::gemini::client::{GeminiError, GenerateClient};
use crate::gemini::grounding::add_citations;
use crate::markdown::{format_answer, greeting, render_sources};

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error(transparent)]
    Gemini(#[from] GeminiError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Destination for rendered chat messages.
pub trait MessageSink {
    async fn send(&mut self, content: &str) -> std::io::Result<()>;
}

/// Writes each message followed by a newline and flushes.
pub struct WriterSink<W>(pub W);

impl<W: AsyncWrite + Unpin> MessageSink for WriterSink<W> {
    async fn send(&mut self, content: &str) -> std::io::Result<()> {
        self.0.write_all(content.as_bytes()).await?;
        self.0.write_all(b"\n").await?;
        self.0.flush().await
    }
}

/// Handles each inbound message on its own; no history is kept between messages.
pub struct ChatSession<C, S> {
    client: C,
    sink: S,
}

impl<C: GenerateClient, S: MessageSink> ChatSession<C, S> {
    pub fn new(client: C, sink: S) -> Self {
        Self { client, sink }
    }

    pub async fn start(&mut self) -> Result<(), ChatError> {
        let text = greeting(self.client.model());
        self.sink.send(&text).await?;
        Ok(())
    }

    /// One grounded call, then the cited answer and, if any, its sources.
    pub async fn on_message(&mut self, message: &str) -> Result<(), ChatError> {
        info!(model = %self.client.model(), chars = message.chars().count(), "chat:message");

        let response = self.client.generate(message).await?;

        let answer = format_answer(&add_citations(&response));
        self.sink.send(&answer).await?;

        if let Some(sources) = render_sources(&response) {
            self.sink.send(&sources).await?;
        }
        Ok(())
    }

    /// Reads one message per line until EOF or `/quit`. API failures and
    /// non-UTF-8 lines are reported and the session carries on; sink failures end it.
    pub async fn run<R, E>(&mut self, input: R, mut errors: E) -> Result<(), ChatError>
    where
        R: AsyncBufRead + Unpin,
        E: AsyncWrite + Unpin,
    {
        self.start().await?;

        let mut lines = input.lines();
        loop {
            let line = match lines.next_line().await {
                Ok(Some(line)) => line,
                Ok(None) => break,
                Err(e) if e.kind() == std::io::ErrorKind::InvalidData => {
                    warn!(error = %e, "skipping unreadable input line");
                    errors
                        .write_all("❌ Error: input is not valid UTF-8, line skipped\n".as_bytes())
                        .await?;
                    errors.flush().await?;
                    continue;
                }
                Err(e) => return Err(e.into()),
            };
            let message = line.trim();
            if message.is_empty() {
                continue;
            }
            if matches!(message, "/quit" | "/exit") {
                break;
            }
            match self.on_message(message).await {
                Ok(()) => {}
                Err(ChatError::Gemini(e)) => {
                    error!(error = %e, "generation failed");
                    errors.write_all(format!("❌ Error: {e}\n").as_bytes()).await?;
                    errors.flush().await?;
                }
                Err(e) => return Err(e),
            }
        }

        info!("chat session ended");
        Ok(())
    }
}
