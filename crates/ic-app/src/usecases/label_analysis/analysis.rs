use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use ic_core::ports::{ClockPort, ScanApiError, ScanApiPort, ScanStatus, SubmitReceipt};
use ic_core::{ScanEvent, ScanFailure, ScanId, ScanSession, ScanState};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, info_span, warn, Instrument};

use super::error::LabelAnalysisError;
use super::poll::{poll_until_done, PollOutcome, PollPolicy};

struct PollTask {
    /// Cancelled by `cancel()` or by the loop itself when it ends.
    cancel: CancellationToken,
    /// Taken by `wait()`.
    handle: Option<JoinHandle<PollOutcome>>,
}

/// Photo-based ingredient analysis for one scan session.
///
/// ## Behavior / 行为
/// - `submit_image` uploads label photos; the first accepted photo moves the
///   session to `Analyzing`
/// - `analyze` polls the backend every interval until the job is done
/// - `cancel` stops polling silently
/// - a failed request is recorded on the session and ends it; the user has
///   to start a new scan (new `scan_id`)
///
/// At most one poll loop runs per instance: `analyze` replaces the previous
/// one. Dropping the instance cancels polling.
pub struct LabelAnalysis {
    api: Arc<dyn ScanApiPort>,
    clock: Arc<dyn ClockPort>,
    policy: PollPolicy,
    session_tx: Arc<watch::Sender<ScanSession>>,
    poll: Mutex<Option<PollTask>>,
}

impl LabelAnalysis {
    /// Open a capture session with a fresh scan id.
    pub fn new(api: Arc<dyn ScanApiPort>, clock: Arc<dyn ClockPort>, policy: PollPolicy) -> Self {
        let mut session = ScanSession::for_photo(ScanId::new());
        if let Err(err) = session.apply(ScanEvent::CaptureStarted) {
            warn!(error = %err, "label session could not enter capturing");
        }
        Self::with_session(api, clock, policy, session)
    }

    /// Attach to a scan the backend already knows, e.g. after the app was
    /// restarted, so it can be polled without uploading again.
    pub fn resume(
        api: Arc<dyn ScanApiPort>,
        clock: Arc<dyn ClockPort>,
        policy: PollPolicy,
        scan_id: ScanId,
    ) -> Self {
        let mut session = ScanSession::for_photo(scan_id);
        if let Err(err) = session.apply(ScanEvent::AnalysisStarted) {
            warn!(error = %err, "resumed label session could not enter analyzing");
        }
        Self::with_session(api, clock, policy, session)
    }

    fn with_session(
        api: Arc<dyn ScanApiPort>,
        clock: Arc<dyn ClockPort>,
        policy: PollPolicy,
        session: ScanSession,
    ) -> Self {
        let (session_tx, _) = watch::channel(session);
        Self {
            api,
            clock,
            policy,
            session_tx: Arc::new(session_tx),
            poll: Mutex::new(None),
        }
    }

    fn poll_task(&self) -> MutexGuard<'_, Option<PollTask>> {
        self.poll.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn scan_id(&self) -> ScanId {
        self.session_tx.borrow().scan_id.clone()
    }

    pub fn session(&self) -> ScanSession {
        self.session_tx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<ScanSession> {
        self.session_tx.subscribe()
    }

    pub fn is_polling(&self) -> bool {
        self.poll_task()
            .as_ref()
            .is_some_and(|task| !task.cancel.is_cancelled())
    }

    /// Upload one label photo.
    pub async fn submit_image(&self, image: Vec<u8>) -> Result<SubmitReceipt, LabelAnalysisError> {
        if image.is_empty() {
            return Err(LabelAnalysisError::EmptyImage);
        }
        let scan_id = self.ensure_open()?;
        let span = info_span!(
            "usecase.label_analysis.submit_image",
            scan_id = %scan_id,
            bytes = image.len()
        );

        async {
            match self.api.submit_image(&scan_id, image).await {
                Ok(receipt) => {
                    info!(
                        queued = receipt.queued,
                        queue_position = receipt.queue_position,
                        "label image submitted"
                    );
                    self.session_tx.send_modify(|session| {
                        if let Err(err) = session.apply(ScanEvent::AnalysisStarted) {
                            warn!(error = %err, "label session could not enter analyzing");
                        }
                    });
                    Ok(receipt)
                }
                Err(err) => {
                    warn!(error = %err, "label image upload failed");
                    self.record_failure(failure_for(&err));
                    Err(LabelAnalysisError::Api(err))
                }
            }
        }
        .instrument(span)
        .await
    }

    /// Start polling the scan job. Replaces any running poll loop.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn analyze(&self) -> Result<(), LabelAnalysisError> {
        let scan_id = self.ensure_open()?;
        if self.session_tx.borrow().state != ScanState::Analyzing {
            return Err(LabelAnalysisError::NothingSubmitted(scan_id));
        }

        let mut poll = self.poll_task();
        if let Some(previous) = poll.take() {
            debug!(scan_id = %scan_id, "replacing running poll loop");
            // Under the session lock: a loop checks its token under the same
            // lock before writing, so the old one cannot write after this.
            self.session_tx.send_if_modified(|_| {
                previous.cancel.cancel();
                false
            });
        }

        let cancel = CancellationToken::new();
        let span = info_span!("usecase.label_analysis.poll", scan_id = %scan_id);
        let future = Self::run_poll(
            self.api.clone(),
            self.clock.clone(),
            self.policy,
            self.session_tx.clone(),
            scan_id,
            cancel.clone(),
        );
        *poll = Some(PollTask {
            cancel,
            handle: Some(tokio::spawn(future.instrument(span))),
        });
        Ok(())
    }

    /// Stop polling. Silent: no error is recorded.
    pub fn cancel(&self) {
        if let Some(task) = self.poll_task().as_ref() {
            task.cancel.cancel();
        }
    }

    /// Wait for the current poll loop and return how it ended.
    ///
    /// Only the first caller gets the outcome. Dropping the future early
    /// leaves the loop running and still stoppable through `cancel`.
    pub async fn wait(&self) -> Option<PollOutcome> {
        let handle = self.poll_task().as_mut()?.handle.take()?;
        match handle.await {
            Ok(outcome) => Some(outcome),
            Err(err) => {
                warn!(error = %err, "poll task did not finish");
                None
            }
        }
    }

    fn ensure_open(&self) -> Result<ScanId, LabelAnalysisError> {
        let session = self.session_tx.borrow();
        if session.state.is_terminal() {
            return Err(LabelAnalysisError::SessionClosed(session.scan_id.clone()));
        }
        Ok(session.scan_id.clone())
    }

    fn record_failure(&self, failure: ScanFailure) {
        self.session_tx.send_modify(|session| {
            if let Err(err) = session.fail(failure) {
                warn!(error = %err, "label session rejected failure");
            }
        });
    }

    async fn run_poll(
        api: Arc<dyn ScanApiPort>,
        clock: Arc<dyn ClockPort>,
        policy: PollPolicy,
        session_tx: Arc<watch::Sender<ScanSession>>,
        scan_id: ScanId,
        cancel: CancellationToken,
    ) -> PollOutcome {
        let _stopped = cancel.clone().drop_guard();
        let started_ms = clock.now_ms();
        let outcome = poll_until_done(api.as_ref(), &scan_id, policy, &cancel, |status| {
            session_tx.send_if_modified(|session| {
                if cancel.is_cancelled() {
                    return false;
                }
                apply_status(session, status);
                true
            });
        })
        .await;
        let elapsed_ms = clock.now_ms() - started_ms;

        match &outcome {
            PollOutcome::Completed { attempts } => {
                info!(attempts, elapsed_ms, "label analysis completed");
            }
            PollOutcome::Cancelled { attempts } => {
                debug!(attempts, elapsed_ms, "label analysis polling cancelled");
            }
            PollOutcome::Failed { attempts, error } => {
                warn!(attempts, elapsed_ms, error = %error, "label analysis polling failed");
                fail_unless_cancelled(&session_tx, &cancel, failure_for(error));
            }
            PollOutcome::LimitReached { attempts } => {
                warn!(attempts, elapsed_ms, "label analysis polling gave up");
                fail_unless_cancelled(
                    &session_tx,
                    &cancel,
                    ScanFailure::TimedOut {
                        attempts: *attempts,
                    },
                );
            }
        }
        outcome
    }
}

impl Drop for LabelAnalysis {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl std::fmt::Debug for LabelAnalysis {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let session = self.session_tx.borrow();
        f.debug_struct("LabelAnalysis")
            .field("scan_id", &session.scan_id)
            .field("state", &session.state)
            .field("policy", &self.policy)
            .finish()
    }
}

/// Fold one status response into the session.
fn apply_status(session: &mut ScanSession, status: &ScanStatus) {
    if let Some(product) = &status.product {
        session.product = Some(product.clone());
    }
    if status.guidance.is_some() {
        session.guidance = status.guidance.clone();
    }
    if status.is_complete() {
        let recommendations = status.recommendations.clone().unwrap_or_default();
        if let Err(err) = session.complete(recommendations) {
            warn!(error = %err, "label session rejected completion");
        }
    }
}

/// Record a poll failure, unless the loop was cancelled or replaced in the
/// meantime.
fn fail_unless_cancelled(
    session_tx: &watch::Sender<ScanSession>,
    cancel: &CancellationToken,
    failure: ScanFailure,
) {
    session_tx.send_if_modified(|session| {
        if cancel.is_cancelled() {
            debug!("poll loop was cancelled, dropping its failure");
            return false;
        }
        match session.fail(failure) {
            Ok(()) => true,
            Err(err) => {
                warn!(error = %err, "label session rejected failure");
                false
            }
        }
    });
}

fn failure_for(error: &ScanApiError) -> ScanFailure {
    match error {
        ScanApiError::NotFound => ScanFailure::NotFound,
        other => ScanFailure::transport(other.to_string()),
    }
}
