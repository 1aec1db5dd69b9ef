use std::time::Duration;

use ic_core::config::ScanConfig;
use ic_core::ports::{ScanApiError, ScanApiPort, ScanStatus};
use ic_core::ScanId;
use tokio_util::sync::CancellationToken;
use tracing::debug;

/// Poll timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    /// Fixed delay between two status requests. No backoff.
    pub interval: Duration,
    /// Stop after this many requests. `None` polls until done, error or cancel.
    /// `Some(0)` issues no request at all.
    pub max_attempts: Option<u32>,
}

impl PollPolicy {
    pub fn from_config(config: &ScanConfig) -> Self {
        Self {
            interval: config.poll_interval(),
            max_attempts: config.max_poll_attempts,
        }
    }
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self::from_config(&ScanConfig::default())
    }
}

/// How a poll loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The backend reported `done` with an analysis result.
    Completed { attempts: u32 },
    /// Cancelled by the owner. Not an error.
    Cancelled { attempts: u32 },
    /// A status request failed. Terminal, never retried.
    Failed { attempts: u32, error: ScanApiError },
    /// `max_attempts` requests were made without completion.
    LimitReached { attempts: u32 },
}

impl PollOutcome {
    pub fn attempts(&self) -> u32 {
        match self {
            PollOutcome::Completed { attempts }
            | PollOutcome::Cancelled { attempts }
            | PollOutcome::Failed { attempts, .. }
            | PollOutcome::LimitReached { attempts } => *attempts,
        }
    }
}

/// Poll `scan_id` until the job is complete, a request fails, the attempt
/// limit is hit, or `cancel` fires.
///
/// `on_status` sees every successful response, the completing one included.
/// Cancellation is checked before each request, raced against the request
/// and the sleep, and checked again once a response arrives, so no request
/// is issued and no response is applied after cancellation.
pub async fn poll_until_done<F>(
    api: &dyn ScanApiPort,
    scan_id: &ScanId,
    policy: PollPolicy,
    cancel: &CancellationToken,
    mut on_status: F,
) -> PollOutcome
where
    F: FnMut(&ScanStatus) + Send,
{
    let mut attempts = 0u32;

    loop {
        if cancel.is_cancelled() {
            return PollOutcome::Cancelled { attempts };
        }
        if limit_reached(policy, attempts) {
            return PollOutcome::LimitReached { attempts };
        }

        attempts += 1;
        let result = tokio::select! {
            biased;
            _ = cancel.cancelled() => return PollOutcome::Cancelled { attempts },
            result = api.get_scan(scan_id) => result,
        };

        if cancel.is_cancelled() {
            return PollOutcome::Cancelled { attempts };
        }

        let status = match result {
            Ok(status) => status,
            Err(error) => return PollOutcome::Failed { attempts, error },
        };

        debug!(
            scan_id = %scan_id,
            attempt = attempts,
            state = %status.state,
            has_result = status.recommendations.is_some(),
            "scan status polled"
        );
        on_status(&status);

        if status.is_complete() {
            return PollOutcome::Completed { attempts };
        }
        // Checked here too so the last request is not followed by a sleep.
        if limit_reached(policy, attempts) {
            return PollOutcome::LimitReached { attempts };
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => return PollOutcome::Cancelled { attempts },
            _ = tokio::time::sleep(policy.interval) => {}
        }
    }
}

fn limit_reached(policy: PollPolicy, attempts: u32) -> bool {
    policy.max_attempts.is_some_and(|max| attempts >= max)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use ic_core::ports::SubmitReceipt;
    use ic_core::{Barcode, ProductAnalysis};
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    struct ScriptedStatusApi {
        calls: AtomicUsize,
        script: Mutex<VecDeque<Result<ScanStatus, ScanApiError>>>,
    }

    impl ScriptedStatusApi {
        fn new(script: Vec<Result<ScanStatus, ScanApiError>>) -> Self {
            Self {
                calls: AtomicUsize::new(0),
                script: Mutex::new(script.into()),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ScanApiPort for ScriptedStatusApi {
        async fn submit_image(
            &self,
            _scan_id: &ScanId,
            _image: Vec<u8>,
        ) -> Result<SubmitReceipt, ScanApiError> {
            unreachable!()
        }

        async fn get_scan(&self, _scan_id: &ScanId) -> Result<ScanStatus, ScanApiError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.script
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Ok(processing()))
        }

        async fn fetch_product(&self, _barcode: &Barcode) -> Result<ProductAnalysis, ScanApiError> {
            unreachable!()
        }
    }

    fn processing() -> ScanStatus {
        ScanStatus {
            state: "processing".to_string(),
            ..Default::default()
        }
    }

    fn done() -> ScanStatus {
        ScanStatus {
            state: "done".to_string(),
            recommendations: Some(Vec::new()),
            ..Default::default()
        }
    }

    fn policy() -> PollPolicy {
        PollPolicy {
            interval: Duration::from_secs(2),
            max_attempts: None,
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_n_pending_then_done_makes_n_plus_one_calls() {
        let api = ScriptedStatusApi::new(vec![
            Ok(processing()),
            Ok(processing()),
            Ok(processing()),
            Ok(done()),
        ]);
        let mut seen = 0;

        let outcome = poll_until_done(&api, &ScanId::from("s"), policy(), &CancellationToken::new(), |_| {
            seen += 1
        })
        .await;

        assert_eq!(outcome, PollOutcome::Completed { attempts: 4 });
        assert_eq!(api.calls(), 4);
        assert_eq!(seen, 4);
    }

    #[tokio::test(start_paused = true)]
    async fn test_done_without_result_keeps_polling() {
        let done_without_result = ScanStatus {
            state: "done".to_string(),
            ..Default::default()
        };
        let api = ScriptedStatusApi::new(vec![Ok(done_without_result), Ok(done())]);

        let outcome =
            poll_until_done(&api, &ScanId::from("s"), policy(), &CancellationToken::new(), |_| {})
                .await;

        assert_eq!(outcome, PollOutcome::Completed { attempts: 2 });
    }

    #[tokio::test(start_paused = true)]
    async fn test_error_on_call_k_stops_after_k_calls() {
        let api = ScriptedStatusApi::new(vec![
            Ok(processing()),
            Err(ScanApiError::Transport("timeout".to_string())),
            Ok(done()),
        ]);

        let outcome =
            poll_until_done(&api, &ScanId::from("s"), policy(), &CancellationToken::new(), |_| {})
                .await;

        assert_eq!(
            outcome,
            PollOutcome::Failed {
                attempts: 2,
                error: ScanApiError::Transport("timeout".to_string()),
            }
        );
        assert_eq!(api.calls(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_already_cancelled_issues_no_request() {
        let api = ScriptedStatusApi::new(vec![]);
        let cancel = CancellationToken::new();
        cancel.cancel();

        let outcome = poll_until_done(&api, &ScanId::from("s"), policy(), &cancel, |_| {}).await;

        assert_eq!(outcome, PollOutcome::Cancelled { attempts: 0 });
        assert_eq!(api.calls(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_limit_reached_after_max_attempts() {
        let api = ScriptedStatusApi::new(vec![]);
        let policy = PollPolicy {
            interval: Duration::from_secs(2),
            max_attempts: Some(3),
        };

        let outcome =
            poll_until_done(&api, &ScanId::from("s"), policy, &CancellationToken::new(), |_| {})
                .await;

        assert_eq!(outcome, PollOutcome::LimitReached { attempts: 3 });
        assert_eq!(api.calls(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_zero_attempt_limit_issues_no_request() {
        let api = ScriptedStatusApi::new(vec![Ok(done())]);
        let policy = PollPolicy {
            interval: Duration::from_secs(2),
            max_attempts: Some(0),
        };
        let started = tokio::time::Instant::now();

        let outcome =
            poll_until_done(&api, &ScanId::from("s"), policy, &CancellationToken::new(), |_| {})
                .await;

        assert_eq!(outcome, PollOutcome::LimitReached { attempts: 0 });
        assert_eq!(api.calls(), 0);
        assert_eq!(started.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_limit_returns_without_trailing_sleep() {
        let api = ScriptedStatusApi::new(vec![]);
        let policy = PollPolicy {
            interval: Duration::from_secs(2),
            max_attempts: Some(2),
        };
        let started = tokio::time::Instant::now();

        poll_until_done(&api, &ScanId::from("s"), policy, &CancellationToken::new(), |_| {}).await;

        assert_eq!(started.elapsed(), Duration::from_secs(2));
    }

    #[tokio::test(start_paused = true)]
    async fn test_fixed_interval_between_requests() {
        let api = ScriptedStatusApi::new(vec![Ok(processing()), Ok(processing()), Ok(done())]);
        let started = tokio::time::Instant::now();

        poll_until_done(&api, &ScanId::from("s"), policy(), &CancellationToken::new(), |_| {}).await;

        assert_eq!(started.elapsed(), Duration::from_secs(4));
    }
}
