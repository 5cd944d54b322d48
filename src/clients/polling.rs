//! Long-running operation tracking.
//!
//! Resource Manager answers slow mutations before they finish. The response
//! carries a `Location` or `Azure-AsyncOperation` header naming a URL that
//! reports progress; the operation is complete once that URL reports a
//! terminal state.
//!
//! # Overview
//!
//! - [`OperationHandle`]: The poll target of one operation and its last known status
//! - [`PollMachine`]: Pure state machine interpreting poll responses (no I/O)
//! - [`AsyncOperationTracker`]: Drives a [`PollMachine`] over HTTP until a terminal state
//! - [`PollControl`]: Caller-supplied deadline and [`CancelToken`]
//!
//! # State machine
//!
//! ```text
//! Initial ──observe──▶ Polling ──observe──▶ Succeeded
//!                        │  ▲
//!                        └──┘ 202 / InProgress / transient
//!                        │
//!                        └──────observe──▶ Failed
//! ```
//!
//! - HTTP 202 keeps polling after the poll interval.
//! - An empty body ends in success with an empty result.
//! - With the `Azure-AsyncOperation` header, a `status` field decides:
//!   `InProgress` keeps polling, `Succeeded` ends in success, anything else
//!   fails with the payload.
//! - Otherwise the payload is the result, unless it carries an `error` field.
//!
//! Cancelling or exceeding the deadline abandons the operation client-side
//! only; the remote operation keeps running and its poll URL is returned in
//! the error so it can be observed later.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::watch;

use crate::clients::decode::{decode_response, has_error_field, parse_body};
use crate::clients::errors::ArmError;
use crate::clients::http_client::HttpClient;
use crate::clients::http_response::HttpResponse;

/// Which response header named the poll target.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PollSource {
    /// The generic `Location` header.
    Location,
    /// The `Azure-AsyncOperation` header.
    AsyncOperation,
}

/// Last known status of a tracked operation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OperationStatus {
    /// Not polled yet.
    Pending,
    /// At least one poll reported the operation as running.
    InProgress,
    /// The operation finished successfully.
    Succeeded,
    /// The operation finished unsuccessfully.
    Failed,
}

/// The poll target of a long-running operation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OperationHandle {
    poll_url: String,
    source: PollSource,
    status: OperationStatus,
}

impl OperationHandle {
    /// Detects whether a response starts a long-running operation.
    ///
    /// Polling starts when a `Location` header is present, or when an
    /// `Azure-AsyncOperation` header is present and the status is not 200.
    /// The `Azure-AsyncOperation` URL, when present, is the poll target.
    ///
    /// # Example
    ///
    /// ```rust
    /// use azure_arm::clients::{HttpResponse, OperationHandle, PollSource};
    /// use std::collections::HashMap;
    ///
    /// let mut headers = HashMap::new();
    /// headers.insert("location".to_string(), vec!["https://x/l".to_string()]);
    /// headers.insert("azure-asyncoperation".to_string(), vec!["https://x/a".to_string()]);
    /// let response = HttpResponse::new(202, headers, "");
    ///
    /// let handle = OperationHandle::detect(&response).unwrap();
    /// assert_eq!(handle.poll_url(), "https://x/a");
    /// assert_eq!(handle.source(), PollSource::AsyncOperation);
    /// ```
    #[must_use]
    pub fn detect(response: &HttpResponse) -> Option<Self> {
        let location = response.location();
        let async_operation = response.async_operation();

        if location.is_none() && (async_operation.is_none() || response.code == 200) {
            return None;
        }

        let (poll_url, source) = match async_operation {
            Some(url) => (url, PollSource::AsyncOperation),
            None => (location?, PollSource::Location),
        };
        Some(Self {
            poll_url: poll_url.to_string(),
            source,
            status: OperationStatus::Pending,
        })
    }

    /// Creates a handle for an operation observed elsewhere (resumption).
    #[must_use]
    pub fn resume(poll_url: impl Into<String>, source: PollSource) -> Self {
        Self {
            poll_url: poll_url.into(),
            source,
            status: OperationStatus::Pending,
        }
    }

    /// Returns the URL polled for progress.
    #[must_use]
    pub fn poll_url(&self) -> &str {
        &self.poll_url
    }

    /// Returns which header named the poll target.
    #[must_use]
    pub const fn source(&self) -> PollSource {
        self.source
    }

    /// Returns the last known status.
    #[must_use]
    pub const fn status(&self) -> OperationStatus {
        self.status
    }
}

/// State of a [`PollMachine`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PollState {
    /// Created, nothing observed yet.
    Initial,
    /// Waiting for a terminal poll response.
    Polling,
    /// Terminal success.
    Succeeded,
    /// Terminal failure.
    Failed,
}

/// What to do after one poll response.
#[derive(Clone, Debug, PartialEq)]
pub enum PollOutcome {
    /// The operation is still running; poll again after the interval.
    Pending,
    /// The poll failed transiently (429 or 5xx); retry, honoring the hint.
    Transient {
        /// HTTP status of the failed poll.
        status: u16,
        /// Wait requested by `Retry-After`.
        retry_after: Option<Duration>,
    },
    /// The operation succeeded.
    ///
    /// `None` means the status monitor reported success without a result;
    /// the initial response body is the result.
    Succeeded(Option<Value>),
    /// The operation failed.
    Failed {
        /// HTTP status of the last poll response.
        status: u16,
        /// The last poll payload.
        payload: Value,
    },
}

/// Pure state machine interpreting poll responses.
///
/// # Example
///
/// ```rust
/// use azure_arm::clients::{HttpResponse, OperationHandle, PollMachine, PollOutcome, PollSource, PollState};
/// use std::collections::HashMap;
///
/// let handle = OperationHandle::resume("https://x/op", PollSource::AsyncOperation);
/// let mut machine = PollMachine::new(handle);
///
/// let running = HttpResponse::new(200, HashMap::new(), r#"{"status":"InProgress"}"#);
/// assert_eq!(machine.observe(&running).unwrap(), PollOutcome::Pending);
/// assert_eq!(machine.state(), PollState::Polling);
///
/// let done = HttpResponse::new(200, HashMap::new(), r#"{"status":"Succeeded"}"#);
/// assert_eq!(machine.observe(&done).unwrap(), PollOutcome::Succeeded(None));
/// assert_eq!(machine.state(), PollState::Succeeded);
/// ```
#[derive(Clone, Debug)]
pub struct PollMachine {
    handle: OperationHandle,
    state: PollState,
    history: Vec<PollState>,
    polls: u32,
}

impl PollMachine {
    /// Creates a machine in the [`PollState::Initial`] state.
    #[must_use]
    pub fn new(handle: OperationHandle) -> Self {
        Self {
            handle,
            state: PollState::Initial,
            history: vec![PollState::Initial],
            polls: 0,
        }
    }

    /// Returns the current state.
    #[must_use]
    pub const fn state(&self) -> PollState {
        self.state
    }

    /// Returns every state entered so far, starting with `Initial`.
    #[must_use]
    pub fn history(&self) -> &[PollState] {
        &self.history
    }

    /// Returns the number of poll responses observed.
    #[must_use]
    pub const fn polls(&self) -> u32 {
        self.polls
    }

    /// Returns the operation handle.
    #[must_use]
    pub const fn handle(&self) -> &OperationHandle {
        &self.handle
    }

    /// Returns `true` once a terminal state is reached.
    #[must_use]
    pub const fn is_terminal(&self) -> bool {
        matches!(self.state, PollState::Succeeded | PollState::Failed)
    }

    /// Interprets one poll response.
    ///
    /// # Errors
    ///
    /// Returns [`ArmError::Decode`] if a non-empty poll body is not JSON.
    /// The machine is then in the [`PollState::Failed`] state.
    pub fn observe(&mut self, response: &HttpResponse) -> Result<PollOutcome, ArmError> {
        self.polls += 1;

        if response.code == 202 {
            self.enter(PollState::Polling, OperationStatus::InProgress);
            return Ok(PollOutcome::Pending);
        }

        if response.is_transient() {
            self.enter(PollState::Polling, self.handle.status);
            return Ok(PollOutcome::Transient {
                status: response.code,
                retry_after: response.retry_after(),
            });
        }

        if response.body.replace('\r', "").trim().is_empty() && response.is_ok() {
            self.enter(PollState::Succeeded, OperationStatus::Succeeded);
            return Ok(PollOutcome::Succeeded(Some(Value::Object(
                serde_json::Map::new(),
            ))));
        }

        let payload = match parse_body(response.code, &response.body) {
            Ok(payload) => payload,
            Err(e) if response.is_ok() => {
                self.enter(PollState::Failed, OperationStatus::Failed);
                return Err(e);
            }
            Err(_) => Value::String(response.body.clone()),
        };

        if !response.is_ok() {
            return Ok(self.fail(response.code, payload));
        }

        if self.handle.source == PollSource::AsyncOperation {
            if let Some(status) = payload.get("status") {
                return Ok(match status.as_str() {
                    Some("InProgress") => {
                        self.enter(PollState::Polling, OperationStatus::InProgress);
                        PollOutcome::Pending
                    }
                    Some("Succeeded") => {
                        self.enter(PollState::Succeeded, OperationStatus::Succeeded);
                        PollOutcome::Succeeded(None)
                    }
                    _ => self.fail(response.code, payload),
                });
            }
        }

        if has_error_field(&payload) {
            return Ok(self.fail(response.code, payload));
        }

        self.enter(PollState::Succeeded, OperationStatus::Succeeded);
        Ok(PollOutcome::Succeeded(Some(payload)))
    }

    fn fail(&mut self, status: u16, payload: Value) -> PollOutcome {
        self.enter(PollState::Failed, OperationStatus::Failed);
        PollOutcome::Failed { status, payload }
    }

    fn enter(&mut self, state: PollState, status: OperationStatus) {
        self.state = state;
        self.handle.status = status;
        self.history.push(state);
    }
}

/// A cloneable cancellation signal.
///
/// All clones observe the same signal. Cancelling is idempotent.
///
/// # Example
///
/// ```rust
/// use azure_arm::clients::CancelToken;
///
/// let token = CancelToken::new();
/// let observer = token.clone();
/// token.cancel();
/// assert!(observer.is_cancelled());
/// ```
#[derive(Clone, Debug)]
pub struct CancelToken {
    sender: Arc<watch::Sender<bool>>,
}

impl CancelToken {
    /// Creates a token that is not cancelled.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
        }
    }

    /// Signals cancellation to every clone.
    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }

    /// Returns `true` once [`cancel`](Self::cancel) has been called.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        *self.sender.borrow()
    }

    /// Completes once the token is cancelled.
    pub async fn cancelled(&self) {
        let mut receiver = self.sender.subscribe();
        loop {
            if *receiver.borrow_and_update() {
                return;
            }
            if receiver.changed().await.is_err() {
                std::future::pending::<()>().await;
            }
        }
    }
}

impl Default for CancelToken {
    fn default() -> Self {
        Self::new()
    }
}

/// Caller-supplied limits for polling.
#[derive(Clone, Debug, Default)]
pub struct PollControl {
    deadline: Option<Duration>,
    cancel: Option<CancelToken>,
}

impl PollControl {
    /// Creates a control with no deadline and no cancellation.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Limits polling to `deadline`, measured from the first poll.
    #[must_use]
    pub const fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    /// Abandons polling when `token` is cancelled.
    #[must_use]
    pub fn with_cancel(mut self, token: CancelToken) -> Self {
        self.cancel = Some(token);
        self
    }

    /// Returns the deadline, if any.
    #[must_use]
    pub const fn deadline(&self) -> Option<Duration> {
        self.deadline
    }

    /// Returns the cancellation token, if any.
    #[must_use]
    pub const fn cancel_token(&self) -> Option<&CancelToken> {
        self.cancel.as_ref()
    }
}

/// Drives long-running operations to a terminal state over HTTP.
#[derive(Debug)]
pub struct AsyncOperationTracker<'a> {
    client: &'a HttpClient,
    interval: Duration,
    transport_retries: u32,
}

impl<'a> AsyncOperationTracker<'a> {
    /// Creates a tracker polling through `client`.
    #[must_use]
    pub const fn new(client: &'a HttpClient, interval: Duration, transport_retries: u32) -> Self {
        Self {
            client,
            interval,
            transport_retries,
        }
    }

    /// Turns the response of an initial request into the final result.
    ///
    /// A 404 short-circuits to [`ArmError::NotFound`]. A successful response
    /// carrying a polling indicator is polled to completion; anything else
    /// is decoded directly.
    ///
    /// # Errors
    ///
    /// Returns the decoding errors of
    /// [`decode_response`](crate::clients::decode_response), plus
    /// [`ArmError::AsyncFailed`], [`ArmError::Cancelled`] and
    /// [`ArmError::DeadlineExceeded`] for tracked operations.
    pub async fn complete(
        &self,
        url: &str,
        initial: HttpResponse,
        control: &PollControl,
    ) -> Result<Value, ArmError> {
        if !initial.is_ok() {
            return decode_response(url, &initial);
        }

        let Some(handle) = OperationHandle::detect(&initial) else {
            return decode_response(url, &initial);
        };

        let mut machine = PollMachine::new(handle);
        match self.run(&mut machine, control).await? {
            Some(result) => Ok(result),
            None => decode_response(url, &initial),
        }
    }

    /// Polls until a terminal state, honoring `control`.
    ///
    /// Returns `Ok(None)` when the status monitor reported success without
    /// a result.
    ///
    /// # Errors
    ///
    /// See [`complete`](Self::complete).
    pub async fn run(
        &self,
        machine: &mut PollMachine,
        control: &PollControl,
    ) -> Result<Option<Value>, ArmError> {
        let poll_url = machine.handle().poll_url().to_string();

        let bounded = async {
            match control.deadline() {
                Some(deadline) => tokio::time::timeout(deadline, self.drive(machine))
                    .await
                    .unwrap_or_else(|_| {
                        tracing::warn!(poll_url = %poll_url, ?deadline, "Polling deadline exceeded");
                        Err(ArmError::DeadlineExceeded {
                            poll_url: poll_url.clone(),
                        })
                    }),
                None => self.drive(machine).await,
            }
        };

        match control.cancel_token() {
            Some(token) => {
                tokio::select! {
                    result = bounded => result,
                    () = token.cancelled() => {
                        tracing::debug!(poll_url = %poll_url, "Polling cancelled");
                        Err(ArmError::Cancelled { poll_url: poll_url.clone() })
                    }
                }
            }
            None => bounded.await,
        }
    }

    async fn drive(&self, machine: &mut PollMachine) -> Result<Option<Value>, ArmError> {
        let poll_url = machine.handle().poll_url().to_string();
        let mut failures: u32 = 0;

        loop {
            tracing::debug!(poll_url = %poll_url, attempt = machine.polls() + 1, "Polling operation");

            let response = match self.client.get(&poll_url).await {
                Ok(response) => response,
                Err(ArmError::Transport(e)) if failures < self.transport_retries => {
                    failures += 1;
                    tracing::warn!(
                        poll_url = %poll_url,
                        failures,
                        error = %e,
                        "Transient transport error while polling; retrying"
                    );
                    tokio::time::sleep(self.interval).await;
                    continue;
                }
                Err(e) => return Err(e),
            };

            match machine.observe(&response)? {
                PollOutcome::Pending => {
                    failures = 0;
                    tokio::time::sleep(self.interval).await;
                }
                PollOutcome::Transient {
                    status,
                    retry_after,
                } => {
                    if failures >= self.transport_retries {
                        let payload = parse_body(status, &response.body)
                            .unwrap_or_else(|_| Value::String(response.body.clone()));
                        return Err(ArmError::Application { status, payload });
                    }
                    failures += 1;
                    tracing::warn!(
                        poll_url = %poll_url,
                        status,
                        failures,
                        "Transient status while polling; retrying"
                    );
                    tokio::time::sleep(retry_after.unwrap_or(self.interval)).await;
                }
                PollOutcome::Succeeded(result) => return Ok(result),
                PollOutcome::Failed { status, payload } => {
                    return Err(ArmError::AsyncFailed { status, payload });
                }
            }
        }
    }
}

// Verify polling types are Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<PollMachine>();
    assert_send_sync::<PollControl>();
    assert_send_sync::<CancelToken>();
};

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    fn response(code: u16, headers: &[(&str, &str)], body: &str) -> HttpResponse {
        let headers = headers
            .iter()
            .map(|(k, v)| ((*k).to_string(), vec![(*v).to_string()]))
            .collect::<HashMap<_, _>>();
        HttpResponse::new(code, headers, body)
    }

    fn async_machine() -> PollMachine {
        PollMachine::new(OperationHandle::resume("https://x/op", PollSource::AsyncOperation))
    }

    // ========================================================================
    // Detection
    // ========================================================================

    #[test]
    fn test_no_headers_means_no_polling() {
        assert!(OperationHandle::detect(&response(200, &[], "{}")).is_none());
    }

    #[test]
    fn test_location_header_always_polls() {
        let handle = OperationHandle::detect(&response(200, &[("Location", "https://x/l")], ""))
            .unwrap();
        assert_eq!(handle.poll_url(), "https://x/l");
        assert_eq!(handle.source(), PollSource::Location);
        assert_eq!(handle.status(), OperationStatus::Pending);
    }

    #[test]
    fn test_async_header_with_200_does_not_poll() {
        let initial = response(200, &[("Azure-AsyncOperation", "https://x/a")], "{}");
        assert!(OperationHandle::detect(&initial).is_none());
    }

    #[test]
    fn test_async_header_with_201_polls() {
        let initial = response(201, &[("Azure-AsyncOperation", "https://x/a")], "{}");
        let handle = OperationHandle::detect(&initial).unwrap();
        assert_eq!(handle.source(), PollSource::AsyncOperation);
    }

    // ========================================================================
    // State machine
    // ========================================================================

    #[test]
    fn test_202_202_in_progress_succeeded_sequence() {
        let mut machine = async_machine();
        assert_eq!(machine.observe(&response(202, &[], "")).unwrap(), PollOutcome::Pending);
        assert_eq!(machine.observe(&response(202, &[], "")).unwrap(), PollOutcome::Pending);
        assert_eq!(
            machine
                .observe(&response(200, &[], r#"{"status":"InProgress"}"#))
                .unwrap(),
            PollOutcome::Pending
        );
        assert_eq!(
            machine
                .observe(&response(200, &[], r#"{"status":"Succeeded"}"#))
                .unwrap(),
            PollOutcome::Succeeded(None)
        );

        assert_eq!(machine.polls(), 4);
        assert_eq!(
            machine.history(),
            &[
                PollState::Initial,
                PollState::Polling,
                PollState::Polling,
                PollState::Polling,
                PollState::Succeeded
            ]
        );
        assert!(machine.is_terminal());
        assert_eq!(machine.handle().status(), OperationStatus::Succeeded);
    }

    #[test]
    fn test_failed_status_carries_payload() {
        let mut machine = async_machine();
        let outcome = machine
            .observe(&response(
                200,
                &[],
                r#"{"status":"Failed","detail":"quota exceeded"}"#,
            ))
            .unwrap();
        match outcome {
            PollOutcome::Failed { status, payload } => {
                assert_eq!(status, 200);
                assert_eq!(payload["detail"], "quota exceeded");
            }
            other => panic!("unexpected outcome: {other:?}"),
        }
        assert_eq!(machine.state(), PollState::Failed);
    }

    #[test]
    fn test_empty_body_is_empty_success() {
        let mut machine = async_machine();
        assert_eq!(
            machine.observe(&response(200, &[], "")).unwrap(),
            PollOutcome::Succeeded(Some(json!({})))
        );
    }

    #[test]
    fn test_location_payload_is_the_result() {
        let mut machine =
            PollMachine::new(OperationHandle::resume("https://x/l", PollSource::Location));
        assert_eq!(
            machine
                .observe(&response(200, &[], r#"{"status":"Whatever","id":"d1"}"#))
                .unwrap(),
            PollOutcome::Succeeded(Some(json!({"status": "Whatever", "id": "d1"})))
        );
    }

    #[test]
    fn test_location_payload_with_error_fails() {
        let mut machine =
            PollMachine::new(OperationHandle::resume("https://x/l", PollSource::Location));
        let outcome = machine
            .observe(&response(200, &[], r#"{"error":{"code":"Conflict"}}"#))
            .unwrap();
        assert!(matches!(outcome, PollOutcome::Failed { .. }));
    }

    #[test]
    fn test_transient_status_keeps_polling_state() {
        let mut machine = async_machine();
        let outcome = machine
            .observe(&response(503, &[("Retry-After", "1")], "busy"))
            .unwrap();
        assert_eq!(
            outcome,
            PollOutcome::Transient {
                status: 503,
                retry_after: Some(Duration::from_secs(1))
            }
        );
        assert_eq!(machine.state(), PollState::Polling);
        assert!(!machine.is_terminal());
    }

    #[test]
    fn test_client_error_status_fails() {
        let mut machine = async_machine();
        let outcome = machine.observe(&response(400, &[], "bad request")).unwrap();
        assert_eq!(
            outcome,
            PollOutcome::Failed {
                status: 400,
                payload: json!("bad request")
            }
        );
    }

    #[test]
    fn test_malformed_poll_body_is_decode_error() {
        let mut machine = async_machine();
        let error = machine.observe(&response(200, &[], "{oops")).unwrap_err();
        assert!(matches!(error, ArmError::Decode { .. }));
        assert_eq!(machine.state(), PollState::Failed);
    }

    // ========================================================================
    // Cancellation
    // ========================================================================

    #[tokio::test]
    async fn test_cancelled_completes_after_cancel() {
        let token = CancelToken::new();
        let waiter = token.clone();
        let handle = tokio::spawn(async move { waiter.cancelled().await });
        token.cancel();
        handle.await.unwrap();
        assert!(token.is_cancelled());
    }

    #[tokio::test]
    async fn test_cancelled_returns_immediately_when_already_cancelled() {
        let token = CancelToken::new();
        token.cancel();
        tokio::time::timeout(Duration::from_secs(1), token.cancelled())
            .await
            .unwrap();
    }

    #[test]
    fn test_poll_control_defaults() {
        let control = PollControl::new();
        assert!(control.deadline().is_none());
        assert!(control.cancel_token().is_none());
        let control = control.with_deadline(Duration::from_secs(3));
        assert_eq!(control.deadline(), Some(Duration::from_secs(3)));
    }
}
