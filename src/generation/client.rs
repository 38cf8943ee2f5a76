//! GenerationClient: speech synthesis, single-prompt video and storyboard
//! compilation on top of a `MediaProvider`.

use tokio_util::sync::CancellationToken;
use tracing::instrument;

use crate::config::GenerationConfig;
use crate::error::{GenerationError, GenerationResult};
use crate::generation::job::{until_cancelled, JobPoller, PollPolicy};
use crate::generation::media::{to_data_uri, wav_wrap, PcmFormat};
use crate::generation::provider::{MediaProvider, SpeechRequest, VideoJobRequest};
use crate::storyboard::catalog;
use crate::storyboard::model::{Scene, Visual};
use crate::storyboard::store::{check_compilable, total_duration};

/// Visual intent used when a scene has nothing describable.
pub const NEUTRAL_VISUAL: &str = "A neutral, visually fitting shot that supports the narration";

const DEFAULT_VIDEO_MIME: &str = "video/mp4";

/// Uniform entry point for generation requests. Results are `data:` URIs
/// ready to be written into the store.
pub struct GenerationClient<P> {
    provider: P,
    config: GenerationConfig,
}

impl<P> std::fmt::Debug for GenerationClient<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationClient")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<P: MediaProvider> GenerationClient<P> {
    pub fn new(provider: P, config: GenerationConfig) -> Self {
        Self { provider, config }
    }

    pub fn config(&self) -> &GenerationConfig {
        &self.config
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }

    /// Synthesizes narration for a script with a catalog voice persona.
    ///
    /// Returns a `data:audio/wav;base64,...` reference.
    #[instrument(skip(self, script_text), fields(chars = script_text.len()))]
    pub async fn synthesize_speech(&self, script_text: &str, voice_id: &str) -> GenerationResult<String> {
        if script_text.trim().is_empty() {
            return Err(GenerationError::empty_input("Script text"));
        }
        let persona = catalog::voice_persona(voice_id)
            .ok_or_else(|| GenerationError::UnknownVoice(voice_id.to_string()))?;
        let voice_name = persona
            .api_voice_name
            .ok_or_else(|| GenerationError::VoiceNotConfigured(voice_id.to_string()))?;

        let request = SpeechRequest {
            text: script_text.to_string(),
            voice_name: voice_name.to_string(),
        };
        let pcm = self.provider.synthesize_speech(&request).await?;
        if pcm.is_empty() {
            return Err(GenerationError::NoMedia);
        }

        tracing::info!(bytes = pcm.len(), voice = voice_name, "speech synthesized");
        Ok(to_data_uri("audio/wav", &wav_wrap(&pcm, PcmFormat::TTS)))
    }

    /// Generates a short clip from a prompt at the configured clip length.
    pub async fn generate_video(&self, prompt: &str, cancel: &CancellationToken) -> GenerationResult<String> {
        self.generate_video_with_duration(prompt, self.config.clip_duration_seconds, cancel)
            .await
    }

    /// Generates a clip from a prompt; the duration is capped at `max_video_seconds`.
    #[instrument(skip(self, prompt, cancel))]
    pub async fn generate_video_with_duration(
        &self,
        prompt: &str,
        duration_seconds: u32,
        cancel: &CancellationToken,
    ) -> GenerationResult<String> {
        if prompt.trim().is_empty() {
            return Err(GenerationError::empty_input("Prompt"));
        }
        let request = self.video_request(prompt.to_string(), duration_seconds);
        self.run_video_job(request, cancel).await
    }

    /// Compiles the ordered scene list into one video.
    ///
    /// Refused up front if the list is empty or any scene lacks synthesized audio.
    #[instrument(skip(self, scenes, cancel), fields(scenes = scenes.len()))]
    pub async fn compile_storyboard(
        &self,
        scenes: &[Scene],
        cancel: &CancellationToken,
    ) -> GenerationResult<String> {
        check_compilable(scenes)?;
        let duration = compile_duration(scenes, self.config.max_video_seconds);
        let request = self.video_request(compile_directive(scenes), duration);
        self.run_video_job(request, cancel).await
    }

    fn video_request(&self, prompt: String, duration_seconds: u32) -> VideoJobRequest {
        VideoJobRequest {
            prompt,
            duration_seconds: self.config.cap_duration(duration_seconds),
            aspect_ratio: self.config.aspect_ratio.clone(),
        }
    }

    /// submit -> poll -> fetch -> encode. Nothing is cached between attempts.
    async fn run_video_job(
        &self,
        request: VideoJobRequest,
        cancel: &CancellationToken,
    ) -> GenerationResult<String> {
        tracing::info!(
            duration = request.duration_seconds,
            aspect_ratio = %request.aspect_ratio,
            "submitting video job"
        );
        let handle = until_cancelled(cancel, self.provider.submit_video_job(&request))
            .await?
            .ok_or(GenerationError::MissingOperation)?;

        let poller = JobPoller::new(&self.provider, PollPolicy::from(&self.config), cancel.clone());
        let media = poller.run(handle).await?;

        let fetched = until_cancelled(cancel, self.provider.fetch_media(&media)).await?;
        if fetched.bytes.is_empty() {
            return Err(GenerationError::MissingBody);
        }
        let mime = fetched
            .content_type
            .as_deref()
            .or(media.content_type.as_deref())
            .filter(|m| m.starts_with("video/"))
            .unwrap_or(DEFAULT_VIDEO_MIME);

        tracing::info!(bytes = fetched.bytes.len(), mime, "video downloaded");
        Ok(to_data_uri(mime, &fetched.bytes))
    }
}

/// Requested length for a compiled storyboard: total scene time, capped.
pub fn compile_duration(scenes: &[Scene], max_seconds: u32) -> u32 {
    total_duration(scenes).min(max_seconds)
}

/// Describes a scene's visual intent for the compile directive.
pub fn visual_intent(visual: &Visual) -> String {
    let described = match visual {
        Visual::Stock { stock_id, url, .. } => stock_id
            .as_deref()
            .and_then(catalog::stock_video)
            .or_else(|| catalog::stock_video_by_url(url))
            .map(|video| video.description.to_string()),
        Visual::Generated { prompt, .. } => Some(prompt.trim().to_string()),
        Visual::Empty | Visual::Upload => None,
    };
    described
        .filter(|d| !d.is_empty())
        .unwrap_or_else(|| NEUTRAL_VISUAL.to_string())
}

/// Builds the single directive sent to the video model for a whole storyboard.
pub fn compile_directive(scenes: &[Scene]) -> String {
    let mut directive = String::from(
        "Generate one continuous video that tells the following story scene by scene. \
         Keep the tone, color palette and visual style consistent across all scenes.\n",
    );
    for (i, scene) in scenes.iter().enumerate() {
        let script = scene.audio.script_text().trim();
        directive.push_str(&format!(
            "\nScene {} ({}s)\nVisual: {}\nNarration: \"{}\"\n",
            i + 1,
            scene.duration,
            visual_intent(&scene.visual),
            script
        ));
    }
    directive
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::media::parse_data_uri;
    use crate::generation::provider::{FetchedMedia, JobHandle, MediaReference};
    use crate::generation::testing::ScriptedProvider;
    use crate::storyboard::model::{Audio, AudioPatch};
    use crate::storyboard::store::StoryboardStore;

    fn client(provider: ScriptedProvider) -> GenerationClient<ScriptedProvider> {
        GenerationClient::new(provider, GenerationConfig::default())
    }

    fn narrated(id: &str, duration: u32, script: &str) -> Scene {
        let mut scene = Scene::new(id, 0)
            .with_duration(duration)
            .with_audio(Audio::tts(script, "male-narrator"));
        scene.audio.merge(AudioPatch::new().with_url("data:audio/wav;base64,AA=="));
        scene
    }

    fn finished() -> JobHandle {
        JobHandle::pending("operations/test")
            .with_media(MediaReference::new("https://example.com/v.mp4"))
    }

    #[tokio::test]
    async fn test_speech_is_wav_wrapped() {
        let client = client(ScriptedProvider::new().with_speech(Ok(vec![1, 2, 3, 4])));

        let uri = client.synthesize_speech("Hello world", "male-deep").await.unwrap();

        let decoded = parse_data_uri(&uri).unwrap();
        assert_eq!(decoded.mime_type, "audio/wav");
        assert_eq!(&decoded.bytes[0..4], b"RIFF");
        assert_eq!(&decoded.bytes[44..], &[1, 2, 3, 4]);
        let requests = client.provider().speech_requests();
        assert_eq!(requests[0].voice_name, "Algenib");
    }

    #[tokio::test]
    async fn test_speech_validation_before_network() {
        let client = client(ScriptedProvider::new());

        assert_eq!(
            client.synthesize_speech("   ", "male-deep").await,
            Err(GenerationError::empty_input("Script text"))
        );
        assert_eq!(
            client.synthesize_speech("Hi", "nobody").await,
            Err(GenerationError::UnknownVoice("nobody".into()))
        );
        assert_eq!(
            client.synthesize_speech("Hi", "neutral-robot").await,
            Err(GenerationError::VoiceNotConfigured("neutral-robot".into()))
        );
        assert!(client.provider().speech_requests().is_empty());
    }

    #[tokio::test]
    async fn test_empty_speech_output() {
        let client = client(ScriptedProvider::new().with_speech(Ok(Vec::new())));
        assert_eq!(
            client.synthesize_speech("Hi", "male-deep").await,
            Err(GenerationError::NoMedia)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_generate_video_returns_data_uri() {
        let provider = ScriptedProvider::new().with_polls(vec![Ok(finished())]);
        let client = client(provider);

        let uri = client
            .generate_video("A fox in the snow", &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(uri, to_data_uri("video/mp4", b"fake-mp4"));
        let requests = client.provider().video_requests();
        assert_eq!(requests[0].duration_seconds, 5);
        assert_eq!(requests[0].aspect_ratio, "16:9");
        assert_eq!(client.provider().fetch_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_video_duration_capped() {
        let client = client(ScriptedProvider::new().with_polls(vec![Ok(finished())]));

        client
            .generate_video_with_duration("Waves", 300, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(client.provider().video_requests()[0].duration_seconds, 59);
    }

    #[tokio::test(start_paused = true)]
    async fn test_video_duration_capped_with_raised_maximum() {
        let config = GenerationConfig {
            max_video_seconds: 120,
            ..Default::default()
        };
        let client = GenerationClient::new(
            ScriptedProvider::new().with_polls(vec![Ok(finished())]),
            config,
        );

        client
            .generate_video_with_duration("A fox", 100, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(client.provider().video_requests()[0].duration_seconds, 59);
    }

    #[tokio::test]
    async fn test_empty_prompt_rejected() {
        let client = client(ScriptedProvider::new());
        assert_eq!(
            client.generate_video("", &CancellationToken::new()).await,
            Err(GenerationError::empty_input("Prompt"))
        );
        assert!(client.provider().video_requests().is_empty());
    }

    #[tokio::test]
    async fn test_missing_operation() {
        let client = client(ScriptedProvider::new().with_submission(Ok(None)));
        assert_eq!(
            client.generate_video("A fox", &CancellationToken::new()).await,
            Err(GenerationError::MissingOperation)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_download_failures() {
        let client = client(
            ScriptedProvider::new()
                .with_polls(vec![Ok(finished())])
                .with_download(Err(GenerationError::Download { status: 403 })),
        );
        assert_eq!(
            client.generate_video("A fox", &CancellationToken::new()).await,
            Err(GenerationError::Download { status: 403 })
        );

        let client = self::client(
            ScriptedProvider::new()
                .with_polls(vec![Ok(finished())])
                .with_download(Ok(FetchedMedia {
                    bytes: Vec::new(),
                    content_type: None,
                })),
        );
        assert_eq!(
            client.generate_video("A fox", &CancellationToken::new()).await,
            Err(GenerationError::MissingBody)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_job_error_never_downloads() {
        let client = client(ScriptedProvider::new().with_polls(vec![Ok(
            JobHandle::pending("operations/test").with_error("safety filter triggered"),
        )]));

        let err = client
            .generate_video("A fox", &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(err.to_string().contains("safety filter triggered"));
        assert_eq!(client.provider().fetch_count(), 0);
    }

    #[tokio::test]
    async fn test_cancelled_before_submit() {
        let client = client(ScriptedProvider::new());
        let cancel = CancellationToken::new();
        cancel.cancel();

        assert_eq!(
            client.generate_video("A fox", &cancel).await,
            Err(GenerationError::Cancelled)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_compile_requests_summed_duration() {
        let client = client(ScriptedProvider::new().with_polls(vec![Ok(finished())]));
        let scenes = vec![narrated("a", 5, "First."), narrated("b", 8, "Second.")];

        client
            .compile_storyboard(&scenes, &CancellationToken::new())
            .await
            .unwrap();

        let request = &client.provider().video_requests()[0];
        assert_eq!(request.duration_seconds, 13);
        assert!(request.prompt.contains("Narration: \"First.\""));
        assert!(request.prompt.contains("Narration: \"Second.\""));
    }

    #[tokio::test(start_paused = true)]
    async fn test_compile_duration_capped() {
        let client = client(ScriptedProvider::new().with_polls(vec![Ok(finished())]));
        let scenes = vec![narrated("a", 40, "One."), narrated("b", 40, "Two.")];

        client
            .compile_storyboard(&scenes, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(client.provider().video_requests()[0].duration_seconds, 59);
    }

    #[tokio::test]
    async fn test_compile_refused_without_audio() {
        let client = client(ScriptedProvider::new());
        let store = StoryboardStore::with_initial_scenes();

        let err = client
            .compile_storyboard(store.scenes(), &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, GenerationError::AudioMissing { .. }));
        assert!(client.provider().video_requests().is_empty());
    }

    #[test]
    fn test_compile_duration() {
        let scenes = vec![narrated("a", 5, ""), narrated("b", 8, "")];
        assert_eq!(compile_duration(&scenes, 59), 13);
        let scenes = vec![narrated("a", 40, ""), narrated("b", 40, "")];
        assert_eq!(compile_duration(&scenes, 59), 59);
        let scenes = vec![narrated("a", u32::MAX, ""), narrated("b", 2, "")];
        assert_eq!(compile_duration(&scenes, 59), 59);
    }

    #[test]
    fn test_visual_intent() {
        let stock = &catalog::STOCK_VIDEOS[2];
        assert_eq!(visual_intent(&Visual::stock(stock)), stock.description);

        let by_url = Visual::Stock {
            stock_id: None,
            url: stock.url.to_string(),
            thumbnail_url: String::new(),
        };
        assert_eq!(visual_intent(&by_url), stock.description);

        assert_eq!(visual_intent(&Visual::generated(" a red kite ", "x")), "a red kite");
        assert_eq!(visual_intent(&Visual::generated("", "x")), NEUTRAL_VISUAL);
        assert_eq!(visual_intent(&Visual::Empty), NEUTRAL_VISUAL);
        assert_eq!(visual_intent(&Visual::Upload), NEUTRAL_VISUAL);
    }

    #[test]
    fn test_compile_directive_lists_scenes_in_order() {
        let scenes = vec![
            narrated("a", 5, "Opening line."),
            narrated("b", 8, "Closing line.").with_visual(Visual::generated("city lights", "x")),
        ];
        let directive = compile_directive(&scenes);

        let first = directive.find("Scene 1 (5s)").unwrap();
        let second = directive.find("Scene 2 (8s)").unwrap();
        assert!(first < second);
        assert!(directive.contains(&format!("Visual: {}", NEUTRAL_VISUAL)));
        assert!(directive.contains("Visual: city lights"));
        assert!(directive.contains("Narration: \"Closing line.\""));
    }
}
