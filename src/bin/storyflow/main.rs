//! Storyflow CLI
//!
//! Browses the catalogs, edits storyboard files and runs generation requests
//! against the Gemini / Veo API.
//!
//! Usage:
//!   storyflow init story.json
//!   storyflow narrate story.json
//!   storyflow compile story.json -o story.mp4

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "storyflow",
    about = "Storyboard editing and narrated video generation",
    version
)]
struct Args {
    /// Generation config file (JSON); defaults apply to missing fields
    #[arg(short = 'c', long, global = true)]
    config: Option<PathBuf>,

    /// API key (or set GEMINI_API_KEY env var)
    #[arg(long, env = "GEMINI_API_KEY", hide_env_values = true, global = true)]
    api_key: Option<String>,

    /// Enable verbose output
    #[arg(short = 'v', long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// List voice personas, optionally ranked for a script
    Voices {
        /// Script to suggest voices for
        #[arg(short = 's', long)]
        script: Option<String>,
    },

    /// List the stock video catalog
    Stock,

    /// Write the starter two-scene storyboard to a file
    Init {
        /// Storyboard file to create
        file: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Synthesize narration for a script into a WAV file
    Tts {
        /// Script text
        text: String,

        /// Voice persona id
        #[arg(long, default_value = storyflow::storyboard::model::DEFAULT_VOICE_ID)]
        voice: String,

        /// Output WAV file
        #[arg(short = 'o', long, default_value = "narration.wav")]
        output: PathBuf,
    },

    /// Generate a video clip from a prompt
    Generate {
        /// Prompt describing the clip
        prompt: String,

        /// Requested length in seconds (capped by config)
        #[arg(short = 'd', long)]
        duration: Option<u32>,

        /// Output video file
        #[arg(short = 'o', long, default_value = "clip.mp4")]
        output: PathBuf,
    },

    /// Narrate scenes of a storyboard file and save the audio back into it
    Narrate {
        /// Storyboard file
        file: PathBuf,

        /// Only this scene (default: every scene missing audio)
        #[arg(long)]
        scene: Option<String>,
    },

    /// Compile a fully narrated storyboard file into one video
    Compile {
        /// Storyboard file
        file: PathBuf,

        /// Output video file
        #[arg(short = 'o', long, default_value = "storyboard.mp4")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "storyflow=debug" } else { "storyflow=info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = match &args.config {
        Some(path) => storyflow::GenerationConfig::from_path(path)?,
        None => storyflow::GenerationConfig::default(),
    };
    let ctx = commands::Context {
        config,
        api_key: args.api_key,
    };

    match args.command {
        Command::Voices { script } => commands::voices(script.as_deref()),
        Command::Stock => commands::stock(),
        Command::Init { file, force } => commands::init(&file, force),
        Command::Tts {
            text,
            voice,
            output,
        } => commands::tts(&ctx, &text, &voice, &output).await,
        Command::Generate {
            prompt,
            duration,
            output,
        } => commands::generate(&ctx, &prompt, duration, &output).await,
        Command::Narrate { file, scene } => commands::narrate(&ctx, &file, scene.as_deref()).await,
        Command::Compile { file, output } => commands::compile(&ctx, &file, &output).await,
    }
}
