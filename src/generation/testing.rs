//! Scripted in-memory provider for tests.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::error::{GenerationError, GenerationResult};
use crate::generation::provider::*;

/// Provider whose responses are queued up front. Records every request.
pub(crate) struct ScriptedProvider {
    speech: GenerationResult<Vec<u8>>,
    submission: GenerationResult<Option<JobHandle>>,
    polls: Mutex<VecDeque<GenerationResult<JobHandle>>>,
    download: GenerationResult<FetchedMedia>,
    speech_requests: Mutex<Vec<SpeechRequest>>,
    video_requests: Mutex<Vec<VideoJobRequest>>,
    poll_count: Mutex<u32>,
    fetch_count: Mutex<u32>,
}

impl ScriptedProvider {
    pub fn new() -> Self {
        Self {
            speech: Ok(vec![0x01, 0x00, 0xff, 0x7f]),
            submission: Ok(Some(JobHandle::pending("operations/test"))),
            polls: Mutex::new(VecDeque::new()),
            download: Ok(FetchedMedia {
                bytes: b"fake-mp4".to_vec(),
                content_type: Some("video/mp4".to_string()),
            }),
            speech_requests: Mutex::new(Vec::new()),
            video_requests: Mutex::new(Vec::new()),
            poll_count: Mutex::new(0),
            fetch_count: Mutex::new(0),
        }
    }

    pub fn with_speech(mut self, speech: GenerationResult<Vec<u8>>) -> Self {
        self.speech = speech;
        self
    }

    pub fn with_submission(mut self, submission: GenerationResult<Option<JobHandle>>) -> Self {
        self.submission = submission;
        self
    }

    pub fn with_polls(self, polls: Vec<GenerationResult<JobHandle>>) -> Self {
        *self.polls.lock().unwrap() = polls.into();
        self
    }

    pub fn with_download(mut self, download: GenerationResult<FetchedMedia>) -> Self {
        self.download = download;
        self
    }

    pub fn poll_count(&self) -> u32 {
        *self.poll_count.lock().unwrap()
    }

    pub fn fetch_count(&self) -> u32 {
        *self.fetch_count.lock().unwrap()
    }

    pub fn speech_requests(&self) -> Vec<SpeechRequest> {
        self.speech_requests.lock().unwrap().clone()
    }

    pub fn video_requests(&self) -> Vec<VideoJobRequest> {
        self.video_requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl MediaProvider for ScriptedProvider {
    async fn synthesize_speech(&self, request: &SpeechRequest) -> GenerationResult<Vec<u8>> {
        self.speech_requests.lock().unwrap().push(request.clone());
        self.speech.clone()
    }

    async fn submit_video_job(
        &self,
        request: &VideoJobRequest,
    ) -> GenerationResult<Option<JobHandle>> {
        self.video_requests.lock().unwrap().push(request.clone());
        self.submission.clone()
    }

    async fn poll_video_job(&self, _handle: &JobHandle) -> GenerationResult<JobHandle> {
        *self.poll_count.lock().unwrap() += 1;
        self.polls
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(GenerationError::invalid_response("no scripted poll left")))
    }

    async fn fetch_media(&self, _media: &MediaReference) -> GenerationResult<FetchedMedia> {
        *self.fetch_count.lock().unwrap() += 1;
        self.download.clone()
    }
}
