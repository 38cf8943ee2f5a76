//! Poll-until-done state machine for asynchronous generation jobs.
//!
//! `Submitted -> Polling -> ... -> Succeeded | Failed`. The poller sleeps
//! before every status check, stops at the attempt budget or wall-clock
//! deadline, and abandons the job as soon as its cancellation token fires.

use std::future::Future;
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::config::GenerationConfig;
use crate::error::{GenerationError, GenerationResult};
use crate::generation::provider::{JobHandle, MediaProvider, MediaReference};

/// Limits for one poll loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: Option<u32>,
    pub deadline: Option<Duration>,
}

impl PollPolicy {
    /// Fixed interval with no attempt or time limit.
    pub fn unbounded(interval: Duration) -> Self {
        Self {
            interval,
            max_attempts: None,
            deadline: None,
        }
    }

    /// Builder: Set attempt budget.
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = Some(max_attempts);
        self
    }

    /// Builder: Set wall-clock deadline.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::from(&GenerationConfig::default())
    }
}

impl From<&GenerationConfig> for PollPolicy {
    fn from(config: &GenerationConfig) -> Self {
        Self {
            interval: config.poll_interval(),
            max_attempts: config.max_poll_attempts,
            deadline: config.deadline(),
        }
    }
}

/// Where a job is in its lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobState {
    /// Handle returned by submission, not yet inspected.
    Submitted(JobHandle),
    /// Unfinished; `attempts` status checks done so far.
    Polling { handle: JobHandle, attempts: u32 },
    /// Finished with a media artifact.
    Succeeded(MediaReference),
    /// Finished with an error, or abandoned.
    Failed(GenerationError),
}

impl JobState {
    /// Classifies a status snapshot.
    fn inspect(handle: JobHandle, attempts: u32) -> Self {
        if !handle.done {
            return Self::Polling { handle, attempts };
        }
        if let Some(message) = handle.error {
            return Self::Failed(GenerationError::job_failed(message));
        }
        match handle.media.into_iter().next() {
            Some(media) => Self::Succeeded(media),
            None => Self::Failed(GenerationError::NoMedia),
        }
    }
}

/// Drives one job from submission to a terminal state.
pub struct JobPoller<'a, P: ?Sized> {
    provider: &'a P,
    policy: PollPolicy,
    cancel: CancellationToken,
}

impl<'a, P> JobPoller<'a, P>
where
    P: MediaProvider + ?Sized,
{
    pub fn new(provider: &'a P, policy: PollPolicy, cancel: CancellationToken) -> Self {
        Self {
            provider,
            policy,
            cancel,
        }
    }

    /// Polls until the job reaches a terminal state and returns its media.
    pub async fn run(&self, handle: JobHandle) -> GenerationResult<MediaReference> {
        let started = Instant::now();
        let name = handle.name.clone();
        let mut state = JobState::Submitted(handle);

        loop {
            state = match state {
                JobState::Submitted(handle) => JobState::inspect(handle, 0),
                JobState::Polling { handle, attempts } => {
                    self.step(handle, attempts, started).await
                }
                JobState::Succeeded(media) => {
                    tracing::info!(job = %name, elapsed = ?started.elapsed(), "job finished");
                    return Ok(media);
                }
                JobState::Failed(err) => {
                    tracing::warn!(job = %name, error = %err, "job failed");
                    return Err(err);
                }
            };
        }
    }

    /// One wait + status check.
    async fn step(&self, handle: JobHandle, attempts: u32, started: Instant) -> JobState {
        let elapsed = started.elapsed();
        let out_of_attempts = self.policy.max_attempts.is_some_and(|max| attempts >= max);
        let out_of_time = self
            .policy
            .deadline
            .is_some_and(|deadline| elapsed + self.policy.interval > deadline);
        if out_of_attempts || out_of_time {
            return JobState::Failed(GenerationError::Timeout { attempts, elapsed });
        }

        let waited = until_cancelled(&self.cancel, async {
            tokio::time::sleep(self.policy.interval).await;
            Ok(())
        })
        .await;
        if let Err(err) = waited {
            return JobState::Failed(err);
        }

        tracing::debug!(job = %handle.name, attempt = attempts + 1, "checking job status");
        match until_cancelled(&self.cancel, self.provider.poll_video_job(&handle)).await {
            Ok(next) => JobState::inspect(next, attempts + 1),
            Err(err) => JobState::Failed(err),
        }
    }
}

/// Runs `fut` unless `cancel` fires first; a cancelled token always wins.
pub(crate) async fn until_cancelled<T, F>(cancel: &CancellationToken, fut: F) -> GenerationResult<T>
where
    F: Future<Output = GenerationResult<T>>,
{
    if cancel.is_cancelled() {
        return Err(GenerationError::Cancelled);
    }
    let result = tokio::select! {
        biased;
        _ = cancel.cancelled() => return Err(GenerationError::Cancelled),
        result = fut => result,
    };
    if cancel.is_cancelled() {
        return Err(GenerationError::Cancelled);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::testing::ScriptedProvider;

    const INTERVAL: Duration = Duration::from_secs(5);

    fn media() -> MediaReference {
        MediaReference::new("https://example.com/video.mp4").with_content_type("video/mp4")
    }

    #[tokio::test(start_paused = true)]
    async fn test_two_waits_before_success() {
        let provider = ScriptedProvider::new().with_polls(vec![
            Ok(JobHandle::pending("op-1")),
            Ok(JobHandle::pending("op-1").with_media(media())),
        ]);
        let poller = JobPoller::new(&provider, PollPolicy::unbounded(INTERVAL), CancellationToken::new());

        let started = Instant::now();
        let result = poller.run(JobHandle::pending("op-1")).await;

        assert_eq!(result, Ok(media()));
        assert_eq!(provider.poll_count(), 2);
        assert_eq!(started.elapsed(), INTERVAL * 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_already_done_needs_no_wait() {
        let provider = ScriptedProvider::new();
        let poller = JobPoller::new(&provider, PollPolicy::unbounded(INTERVAL), CancellationToken::new());

        let started = Instant::now();
        let result = poller.run(JobHandle::pending("op-1").with_media(media())).await;

        assert_eq!(result, Ok(media()));
        assert_eq!(provider.poll_count(), 0);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_job_error_is_surfaced() {
        let provider = ScriptedProvider::new().with_polls(vec![Ok(JobHandle::pending("op-1")
            .with_error("content policy violation"))]);
        let poller = JobPoller::new(&provider, PollPolicy::unbounded(INTERVAL), CancellationToken::new());

        let err = poller.run(JobHandle::pending("op-1")).await.unwrap_err();

        assert_eq!(err, GenerationError::job_failed("content policy violation"));
        assert!(err.to_string().contains("content policy violation"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_done_without_media() {
        let provider = ScriptedProvider::new().with_polls(vec![Ok(JobHandle {
            name: "op-1".into(),
            done: true,
            ..Default::default()
        })]);
        let poller = JobPoller::new(&provider, PollPolicy::unbounded(INTERVAL), CancellationToken::new());

        assert_eq!(
            poller.run(JobHandle::pending("op-1")).await,
            Err(GenerationError::NoMedia)
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_attempt_budget() {
        let provider = ScriptedProvider::new()
            .with_polls((0..10).map(|_| Ok(JobHandle::pending("op-1"))).collect());
        let policy = PollPolicy::unbounded(INTERVAL).with_max_attempts(3);
        let poller = JobPoller::new(&provider, policy, CancellationToken::new());

        let err = poller.run(JobHandle::pending("op-1")).await.unwrap_err();

        assert_eq!(
            err,
            GenerationError::Timeout {
                attempts: 3,
                elapsed: INTERVAL * 3
            }
        );
        assert_eq!(provider.poll_count(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deadline() {
        let provider = ScriptedProvider::new()
            .with_polls((0..10).map(|_| Ok(JobHandle::pending("op-1"))).collect());
        let policy = PollPolicy::unbounded(INTERVAL).with_deadline(Duration::from_secs(12));
        let poller = JobPoller::new(&provider, policy, CancellationToken::new());

        let err = poller.run(JobHandle::pending("op-1")).await.unwrap_err();

        assert!(matches!(err, GenerationError::Timeout { attempts: 2, .. }));
        assert_eq!(provider.poll_count(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_stops_polling() {
        let provider = ScriptedProvider::new()
            .with_polls((0..10).map(|_| Ok(JobHandle::pending("op-1"))).collect());
        let cancel = CancellationToken::new();
        let poller = JobPoller::new(&provider, PollPolicy::unbounded(INTERVAL), cancel.clone());

        let trigger = async {
            tokio::time::sleep(Duration::from_secs(7)).await;
            cancel.cancel();
        };
        let (result, ()) = tokio::join!(poller.run(JobHandle::pending("op-1")), trigger);

        assert_eq!(result, Err(GenerationError::Cancelled));
        assert_eq!(provider.poll_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_transport_error_is_terminal() {
        let provider = ScriptedProvider::new().with_polls(vec![
            Err(GenerationError::transport("connection reset")),
            Ok(JobHandle::pending("op-1").with_media(media())),
        ]);
        let poller = JobPoller::new(&provider, PollPolicy::unbounded(INTERVAL), CancellationToken::new());

        assert_eq!(
            poller.run(JobHandle::pending("op-1")).await,
            Err(GenerationError::transport("connection reset"))
        );
        assert_eq!(provider.poll_count(), 1);
    }

    #[test]
    fn test_policy_from_config() {
        let policy = PollPolicy::default();
        assert_eq!(policy.interval, Duration::from_secs(5));
        assert_eq!(policy.max_attempts, Some(120));
        assert_eq!(policy.deadline, Some(Duration::from_secs(900)));
    }
}
