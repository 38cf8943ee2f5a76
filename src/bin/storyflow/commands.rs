//! Subcommand implementations.

use std::future::Future;
use std::path::Path;
use std::time::Duration;

use anyhow::Context as _;
use indicatif::{ProgressBar, ProgressStyle};
use storyflow::generation::actions;
use storyflow::generation::media::parse_data_uri;
use storyflow::storyboard::catalog;
use storyflow::{
    CancellationToken, GeminiProvider, GenerationClient, GenerationConfig, StoryboardStore,
    Visual, STOCK_VIDEOS, VOICE_PERSONAS,
};

/// Settings shared by the networked commands.
pub struct Context {
    pub config: GenerationConfig,
    pub api_key: Option<String>,
}

impl Context {
    fn client(&self) -> anyhow::Result<GenerationClient<GeminiProvider>> {
        let key = self.api_key.as_deref().unwrap_or_default();
        let provider = GeminiProvider::new(key, &self.config)?;
        Ok(GenerationClient::new(provider, self.config.clone()))
    }
}

fn spinner(message: &str) -> anyhow::Result<ProgressBar> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} [{elapsed_precise}] {msg}")?);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(120));
    Ok(pb)
}

/// Token that fires on Ctrl-C.
fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupted, abandoning the request");
            trigger.cancel();
        }
    });
    cancel
}

/// Runs a request under a spinner.
async fn with_spinner<T, F>(message: &str, fut: F) -> anyhow::Result<T>
where
    F: Future<Output = T>,
{
    let pb = spinner(message)?;
    let out = fut.await;
    pb.finish_and_clear();
    Ok(out)
}

fn write_data_uri(uri: &str, output: &Path) -> anyhow::Result<()> {
    let media = parse_data_uri(uri)?;
    std::fs::write(output, &media.bytes)
        .with_context(|| format!("failed to write {}", output.display()))?;
    println!(
        "Wrote {} ({}, {} bytes)",
        output.display(),
        media.mime_type,
        media.bytes.len()
    );
    Ok(())
}

fn load_store(file: &Path) -> anyhow::Result<StoryboardStore> {
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("failed to read {}", file.display()))?;
    Ok(StoryboardStore::from_json(&raw)?)
}

fn save_store(store: &StoryboardStore, file: &Path) -> anyhow::Result<()> {
    std::fs::write(file, store.to_json()?)
        .with_context(|| format!("failed to write {}", file.display()))?;
    Ok(())
}

// =============================================================================
// CATALOG
// =============================================================================

pub fn voices(script: Option<&str>) -> anyhow::Result<()> {
    let suggested = script.map(catalog::suggest_voices).unwrap_or_default();
    for voice in VOICE_PERSONAS {
        let marker = if suggested.first() == Some(&voice.id) {
            "*"
        } else if suggested.contains(&voice.id) {
            "+"
        } else {
            " "
        };
        let backend = voice.api_voice_name.unwrap_or("(not available)");
        println!(
            "{} {:<18} {:<16} {:<16} {}",
            marker, voice.id, voice.name, backend, voice.description
        );
    }
    Ok(())
}

pub fn stock() -> anyhow::Result<()> {
    for video in STOCK_VIDEOS {
        println!("{:<16} {}", video.id, video.description);
        println!("{:<16} {}", "", video.url);
    }
    Ok(())
}

// =============================================================================
// STORYBOARD FILES
// =============================================================================

pub fn init(file: &Path, force: bool) -> anyhow::Result<()> {
    if file.exists() && !force {
        anyhow::bail!("{} already exists. Use --force to overwrite.", file.display());
    }
    let store = StoryboardStore::with_initial_scenes();
    save_store(&store, file)?;
    println!("Created {} with {} scenes", file.display(), store.len());
    Ok(())
}

// =============================================================================
// GENERATION
// =============================================================================

pub async fn tts(ctx: &Context, text: &str, voice: &str, output: &Path) -> anyhow::Result<()> {
    let client = ctx.client()?;
    let uri = with_spinner("Synthesizing speech...", client.synthesize_speech(text, voice)).await??;
    write_data_uri(&uri, output)
}

pub async fn generate(
    ctx: &Context,
    prompt: &str,
    duration: Option<u32>,
    output: &Path,
) -> anyhow::Result<()> {
    let client = ctx.client()?;
    let cancel = cancel_on_ctrl_c();
    let seconds = duration.unwrap_or(ctx.config.clip_duration_seconds);
    let uri = with_spinner(
        "Generating video...",
        client.generate_video_with_duration(prompt, seconds, &cancel),
    )
    .await??;
    write_data_uri(&uri, output)
}

pub async fn narrate(ctx: &Context, file: &Path, scene: Option<&str>) -> anyhow::Result<()> {
    let client = ctx.client()?;
    let mut store = load_store(file)?;

    let outcome = match scene {
        Some(id) => {
            with_spinner("Synthesizing speech...", actions::narrate_scene(&client, &mut store, id))
                .await?
        }
        None => with_spinner("Synthesizing speech...", actions::narrate_all(&client, &mut store)).await?,
    };

    // Partial progress is still worth keeping.
    save_store(&store, file)?;
    if !outcome.success {
        anyhow::bail!("{}", outcome.message);
    }
    println!("{}", outcome.message);
    Ok(())
}

pub async fn compile(ctx: &Context, file: &Path, output: &Path) -> anyhow::Result<()> {
    let store = load_store(file)?;
    store.check_compilable()?;

    for scene in store.scenes() {
        let visual = match &scene.visual {
            Visual::Empty => "(no visual)",
            other => other.type_name(),
        };
        tracing::info!(scene = %scene.id, duration = scene.duration, visual, "queued");
    }

    let client = ctx.client()?;
    let cancel = cancel_on_ctrl_c();
    let outcome = with_spinner(
        "Compiling storyboard...",
        actions::compile(&client, &store, &cancel),
    )
    .await?;

    match outcome.data_uri {
        Some(uri) if outcome.success => write_data_uri(&uri, output),
        _ => anyhow::bail!("{}", outcome.message),
    }
}
