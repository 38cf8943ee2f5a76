//! HTTP provider for the Gemini / Veo REST API.

use async_trait::async_trait;
use reqwest::{header, Client, Response};
use serde::Deserialize;
use serde_json::json;

use crate::config::{GenerationConfig, API_KEY_ENV};
use crate::error::{GenerationError, GenerationResult};
use crate::generation::media::decode_base64;
use crate::generation::provider::*;

const API_KEY_HEADER: &str = "x-goog-api-key";

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        Self::Transport(err.to_string())
    }
}

impl From<header::InvalidHeaderValue> for GenerationError {
    fn from(err: header::InvalidHeaderValue) -> Self {
        Self::missing_credential(format!("{} ({})", API_KEY_ENV, err))
    }
}

// =============================================================================
// RESPONSE TYPES
// =============================================================================

/// `generateContent` response, reduced to the inline audio parts.
#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<Content>,
}

#[derive(Debug, Deserialize)]
struct Content {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Part {
    inline_data: Option<InlineData>,
}

#[derive(Debug, Deserialize)]
struct InlineData {
    data: String,
}

/// Long-running operation, as returned by submission and status checks.
#[derive(Debug, Default, Deserialize)]
struct Operation {
    name: Option<String>,
    #[serde(default)]
    done: bool,
    error: Option<OperationError>,
    response: Option<OperationResponse>,
}

#[derive(Debug, Deserialize)]
struct OperationError {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct OperationResponse {
    generate_video_response: Option<GenerateVideoResponse>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateVideoResponse {
    #[serde(default)]
    generated_samples: Vec<GeneratedSample>,
}

#[derive(Debug, Deserialize)]
struct GeneratedSample {
    video: Option<VideoFile>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct VideoFile {
    uri: Option<String>,
    mime_type: Option<String>,
}

impl Operation {
    /// Converts to a status snapshot, keeping `fallback_name` if the payload omits one.
    fn into_handle(self, fallback_name: &str) -> JobHandle {
        let media = self
            .response
            .and_then(|r| r.generate_video_response)
            .map(|r| r.generated_samples)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|sample| sample.video)
            .filter_map(|video| {
                let uri = video.uri?;
                Some(MediaReference {
                    url: uri,
                    content_type: video.mime_type,
                })
            })
            .collect();
        JobHandle {
            name: self.name.unwrap_or_else(|| fallback_name.to_string()),
            done: self.done,
            error: self.error.map(|e| {
                e.message
                    .unwrap_or_else(|| "the job reported an unspecified error".to_string())
            }),
            media,
        }
    }
}

fn parse_operation(raw: &str, fallback_name: &str) -> GenerationResult<JobHandle> {
    let op: Operation =
        serde_json::from_str(raw).map_err(|e| GenerationError::decode(e.to_string()))?;
    Ok(op.into_handle(fallback_name))
}

/// Concatenates every inline audio part into one PCM buffer.
fn extract_audio(response: GenerateContentResponse) -> GenerationResult<Vec<u8>> {
    let mut pcm = Vec::new();
    for part in response
        .candidates
        .into_iter()
        .take(1)
        .filter_map(|c| c.content)
        .flat_map(|c| c.parts)
    {
        if let Some(inline) = part.inline_data {
            pcm.extend(decode_base64(&inline.data)?);
        }
    }
    Ok(pcm)
}

// =============================================================================
// CLIENT
// =============================================================================

/// Provider backed by the Generative Language API.
pub struct GeminiProvider {
    client: Client,
    base_url: String,
    tts_model: String,
    video_model: String,
}

impl GeminiProvider {
    /// Creates a provider authenticated with the given API key.
    pub fn new(api_key: &str, config: &GenerationConfig) -> GenerationResult<Self> {
        if api_key.trim().is_empty() {
            return Err(GenerationError::missing_credential(API_KEY_ENV));
        }
        let mut headers = header::HeaderMap::new();
        let mut key = header::HeaderValue::from_str(api_key.trim())?;
        key.set_sensitive(true);
        headers.insert(API_KEY_HEADER, key);

        let client = Client::builder().default_headers(headers).build()?;

        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            tts_model: config.tts_model.clone(),
            video_model: config.video_model.clone(),
        })
    }

    /// Creates a provider from the `GEMINI_API_KEY` environment variable.
    pub fn from_env(config: &GenerationConfig) -> GenerationResult<Self> {
        let key = std::env::var(API_KEY_ENV)
            .map_err(|_| GenerationError::missing_credential(API_KEY_ENV))?;
        Self::new(&key, config)
    }

    async fn check(resp: Response) -> GenerationResult<Response> {
        if !resp.status().is_success() {
            let status = resp.status().as_u16();
            let message = resp.text().await.unwrap_or_default();
            return Err(GenerationError::Api { status, message });
        }
        Ok(resp)
    }
}

impl std::fmt::Debug for GeminiProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeminiProvider")
            .field("base_url", &self.base_url)
            .field("tts_model", &self.tts_model)
            .field("video_model", &self.video_model)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl MediaProvider for GeminiProvider {
    /// POST /models/{tts}:generateContent
    async fn synthesize_speech(&self, request: &SpeechRequest) -> GenerationResult<Vec<u8>> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.tts_model);
        let body = json!({
            "contents": [{ "parts": [{ "text": request.text }] }],
            "generationConfig": {
                "responseModalities": ["AUDIO"],
                "speechConfig": {
                    "voiceConfig": {
                        "prebuiltVoiceConfig": { "voiceName": request.voice_name }
                    }
                }
            }
        });
        let resp = Self::check(self.client.post(&url).json(&body).send().await?).await?;
        let parsed: GenerateContentResponse = resp.json().await?;
        extract_audio(parsed)
    }

    /// POST /models/{video}:predictLongRunning
    async fn submit_video_job(
        &self,
        request: &VideoJobRequest,
    ) -> GenerationResult<Option<JobHandle>> {
        let url = format!(
            "{}/models/{}:predictLongRunning",
            self.base_url, self.video_model
        );
        let body = json!({
            "instances": [{ "prompt": request.prompt }],
            "parameters": {
                "aspectRatio": request.aspect_ratio,
                "durationSeconds": request.duration_seconds,
                "sampleCount": 1
            }
        });
        let resp = Self::check(self.client.post(&url).json(&body).send().await?).await?;
        let raw = resp.text().await?;
        if raw.trim().is_empty() {
            return Ok(None);
        }
        let op: Operation =
            serde_json::from_str(&raw).map_err(|e| GenerationError::decode(e.to_string()))?;
        match op.name.clone() {
            Some(name) if !name.is_empty() => Ok(Some(op.into_handle(&name))),
            _ => Ok(None),
        }
    }

    /// GET /{operation name}
    async fn poll_video_job(&self, handle: &JobHandle) -> GenerationResult<JobHandle> {
        let url = format!("{}/{}", self.base_url, handle.name);
        let resp = Self::check(self.client.get(&url).send().await?).await?;
        parse_operation(&resp.text().await?, &handle.name)
    }

    async fn fetch_media(&self, media: &MediaReference) -> GenerationResult<FetchedMedia> {
        let resp = self.client.get(&media.url).send().await?;
        if !resp.status().is_success() {
            return Err(GenerationError::Download {
                status: resp.status().as_u16(),
            });
        }
        let content_type = resp
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_string());
        let bytes = resp.bytes().await?.to_vec();
        if bytes.is_empty() {
            return Err(GenerationError::MissingBody);
        }
        Ok(FetchedMedia {
            bytes,
            content_type,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_operation() {
        let handle = parse_operation(
            r#"{"name": "models/veo-2.0-generate-001/operations/abc"}"#,
            "fallback",
        )
        .unwrap();
        assert_eq!(handle, JobHandle::pending("models/veo-2.0-generate-001/operations/abc"));
    }

    #[test]
    fn test_finished_operation_media() {
        let raw = r#"{
            "name": "operations/abc",
            "done": true,
            "response": {
                "@type": "type.googleapis.com/google.ai.generativelanguage.v1beta.PredictLongRunningResponse",
                "generateVideoResponse": {
                    "generatedSamples": [
                        {"video": {"uri": "https://example.com/files/1:download?alt=media"}}
                    ]
                }
            }
        }"#;
        let handle = parse_operation(raw, "operations/abc").unwrap();
        assert!(handle.done);
        assert_eq!(handle.error, None);
        assert_eq!(handle.media[0].url, "https://example.com/files/1:download?alt=media");
    }

    #[test]
    fn test_failed_operation_message() {
        let raw = r#"{"name": "operations/abc", "done": true,
                      "error": {"code": 3, "message": "prompt was blocked"}}"#;
        let handle = parse_operation(raw, "operations/abc").unwrap();
        assert_eq!(handle.error.as_deref(), Some("prompt was blocked"));
        assert!(handle.media.is_empty());
    }

    #[test]
    fn test_missing_name_keeps_fallback() {
        let handle = parse_operation(r#"{"done": false}"#, "operations/abc").unwrap();
        assert_eq!(handle.name, "operations/abc");
    }

    #[test]
    fn test_extract_audio_concatenates_parts() {
        let response: GenerateContentResponse = serde_json::from_str(
            r#"{"candidates": [{"content": {"parts": [
                {"inlineData": {"mimeType": "audio/L16;rate=24000", "data": "AQI="}},
                {"inlineData": {"data": "AwQ="}}
            ]}}]}"#,
        )
        .unwrap();
        assert_eq!(extract_audio(response).unwrap(), vec![1, 2, 3, 4]);
    }

    #[test]
    fn test_extract_audio_without_candidates() {
        let response: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(extract_audio(response).unwrap().is_empty());
    }

    #[test]
    fn test_empty_key_is_missing_credential() {
        let err = GeminiProvider::new("  ", &GenerationConfig::default()).unwrap_err();
        assert_eq!(err, GenerationError::missing_credential(API_KEY_ENV));
    }
}
