use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "transcript-article",
    about = "Transcript Article - Turn a YouTube video's captions into a written article",
    version,
    long_about = "Downloads the caption track of a YouTube video, restructures it into a dialogue and writes a news-style article from it using an OpenAI-compatible text-generation service (Groq by default)."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Disable progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate an article from a video's captions
    Article {
        /// YouTube URL or video id (prompted for when omitted)
        #[arg(value_name = "URL")]
        url: Option<String>,

        /// API key for the generation service
        #[arg(long, env = "GROQ_API_KEY", hide_env_values = true)]
        api_key: Option<String>,
    },

    /// Show or locate the configuration file
    Config {
        /// Show current configuration
        #[arg(short, long)]
        show: bool,
    },
}
