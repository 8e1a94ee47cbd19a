use clap::Parser;

#[derive(Parser, Debug)]
#[command(name = "groundchat", version)]
#[command(about = "Chat with Gemini, grounded in Google Search, with inline citations")]
#[command(long_about = "Chat with Gemini, grounded in Google Search, with inline citations.\n\n\
Run without a prompt for an interactive session (type /quit or press Ctrl+D to leave), \
or pass a prompt to ask a single question.\n\n\
Environment Variables:\n\
  GEMINI_API_KEY    Your Gemini API key (required; also read from .env)\n\
  GEMINI_MODEL      Model to use (optional, defaults to gemini-2.5-flash)\n\
  RUST_LOG          Log filter (optional, overrides -v)")]
pub struct Args {
    /// Ask a single question and exit
    #[arg(trailing_var_arg = true)]
    pub prompt: Vec<String>,

    /// Model to use (overrides GEMINI_MODEL)
    #[arg(short = 'm', long, value_name = "MODEL")]
    pub model: Option<String>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short = 'v', long, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Args {
    /// The one-shot prompt, if any words were given.
    pub fn prompt(&self) -> Option<String> {
        let prompt = self.prompt.join(" ");
        let prompt = prompt.trim();
        (!prompt.is_empty()).then(|| prompt.to_string())
    }

    pub fn log_directive(&self) -> &'static str {
        match self.verbose {
            0 => "groundchat=warn",
            1 => "groundchat=info",
            _ => "groundchat=debug",
        }
    }
}
