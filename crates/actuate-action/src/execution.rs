//! The execution engine.
//!
//! An [`Execution`] owns a private clone of one action and drives it through
//! `init -> will -> do -> finally` to exactly one outcome. Synchronous and
//! asynchronous actions share one phase sequence; the only difference is
//! whether a pending [`Completion`] may be awaited.

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::task::Context;

use actuate_core::config::{EngineConfig, LogLevel};
use chrono::{DateTime, Utc};
use futures::task::noop_waker_ref;
use futures::FutureExt;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tokio::runtime::Handle;
use tracing::{debug, error, info, trace, warn};
use uuid::Uuid;

use crate::action::{Action, ActionKind};
use crate::completion::Completion;
use crate::error::ActionError;
use crate::executor::Executor;
use crate::promise::{Promise, Resolver, Settlement};
use crate::reason::{Reason, Rejection};
use crate::state::State;

/// Opaque object an action is executed against.
pub type Target = Arc<dyn Any + Send + Sync>;

/// Wrap a value as an execution target.
pub fn target<T: Any + Send + Sync>(value: T) -> Target {
    Arc::new(value)
}

/// Point-in-time view of an execution, for reporting.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecutionSnapshot {
    pub id: Uuid,
    pub label: String,
    pub description: String,
    pub state: State,
    pub result: Option<Value>,
    pub error: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub finished_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    Sync,
    Async,
}

enum Dispatch {
    Sync,
    Async(Handle),
}

/// Why a run could not start.
enum Preflight {
    /// The execution cannot start at all; always returned to the caller.
    State(ActionError),
    /// Missing target or failed validation.
    Invalid(ActionError),
}

impl Preflight {
    fn into_error(self) -> ActionError {
        match self {
            Preflight::State(err) | Preflight::Invalid(err) => err,
        }
    }
}

/// Call a hook, turning a panic into a runtime error.
fn guard<F>(hook: &'static str, call: F) -> Result<(), ActionError>
where
    F: FnOnce() -> Result<(), ActionError>,
{
    panic::catch_unwind(AssertUnwindSafe(call))
        .unwrap_or_else(|payload| Err(panicked(hook, payload)))
}

fn panicked(hook: &str, payload: Box<dyn Any + Send>) -> ActionError {
    let detail = payload
        .downcast_ref::<&str>()
        .map(|message| message.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "opaque panic payload".to_string());
    ActionError::runtime(format!("{} hook panicked: {}", hook, detail))
}

/// Stateful engine bound to one action clone, one target and an optional
/// executor.
pub struct Execution {
    id: Uuid,
    config: EngineConfig,
    inner: Mutex<Inner>,
}

struct Inner {
    /// The private clone. Its state is the state of the run.
    action: Action,
    target: Option<Target>,
    executor: Option<Arc<dyn Executor>>,
    result: Option<Value>,
    rejection: Option<Rejection>,
    started_at: Option<DateTime<Utc>>,
    finished_at: Option<DateTime<Utc>>,
    promise: Option<Promise>,
    resolver: Option<Resolver>,
}

impl Inner {
    fn state(&self) -> State {
        self.action.state()
    }

    fn settlement(&self) -> Settlement {
        match &self.rejection {
            Some(rejection) => Err(rejection.clone()),
            None => Ok(self.result.clone()),
        }
    }
}

impl Execution {
    /// Bind a fresh execution to a clone of `action`.
    pub fn new(action: &Action) -> Arc<Self> {
        Self::with_config(action, EngineConfig::default())
    }

    pub fn with_config(action: &Action, config: EngineConfig) -> Arc<Self> {
        Arc::new(Self {
            id: Uuid::new_v4(),
            config,
            inner: Mutex::new(Inner {
                action: action.clone(),
                target: None,
                executor: None,
                result: None,
                rejection: None,
                started_at: None,
                finished_at: None,
                promise: None,
                resolver: None,
            }),
        })
    }

    // Hooks never run while this lock is held, so poisoning can only come
    // from a panic inside the engine's own bookkeeping.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    // =========================================================================
    // Entry points
    // =========================================================================

    /// Validate, bind `target` and start the run.
    ///
    /// Synchronous actions have finished by the time this returns.
    /// Asynchronous actions are spawned on the current tokio runtime; use
    /// [`Execution::promise`] to wait for them.
    pub fn execute(
        self: &Arc<Self>,
        target: Option<Target>,
        executor: Option<Arc<dyn Executor>>,
    ) -> Result<Arc<Self>, ActionError> {
        let dispatch = self.begin(target, executor).map_err(Preflight::into_error)?;
        self.dispatch(dispatch);
        Ok(Arc::clone(self))
    }

    /// Like [`Execution::execute`], but a missing target or failed validation
    /// comes back as a rejected promise, classified like any other rejection. Calling it on an execution that has
    /// already started is still an immediate error.
    pub fn execute_async(
        self: &Arc<Self>,
        target: Option<Target>,
        executor: Option<Arc<dyn Executor>>,
    ) -> Result<Promise, ActionError> {
        match self.begin(target, executor) {
            Ok(dispatch) => {
                let promise = self.promise();
                self.dispatch(dispatch);
                Ok(promise)
            }
            Err(Preflight::State(err)) => Err(err),
            Err(Preflight::Invalid(err)) => Ok(Promise::rejected(err)),
        }
    }

    /// Consume the candidate state and enter `init`, all under one lock.
    fn begin(
        &self,
        target: Option<Target>,
        executor: Option<Arc<dyn Executor>>,
    ) -> Result<Dispatch, Preflight> {
        let mut inner = self.lock();

        let state = inner.state();
        if !state.is_candidate() {
            return Err(Preflight::State(ActionError::InvalidOperation(format!(
                "execution of '{}' has already started (state {})",
                inner.action.label(),
                state
            ))));
        }

        let Some(target) = target else {
            debug!(execution_id = %self.id, "Execution rejected: no target");
            return Err(Preflight::Invalid(ActionError::MissingTarget));
        };

        if let Some(first) = inner.action.validate().into_iter().next() {
            debug!(execution_id = %self.id, error = %first, "Execution rejected: invalid action");
            return Err(Preflight::Invalid(first));
        }

        let dispatch = if inner.action.is_sync() {
            Dispatch::Sync
        } else {
            match Handle::try_current() {
                Ok(handle) => Dispatch::Async(handle),
                Err(_) => {
                    return Err(Preflight::State(ActionError::InvalidOperation(format!(
                        "asynchronous action '{}' needs a tokio runtime",
                        inner.action.label()
                    ))))
                }
            }
        };

        inner.target = Some(target);
        inner.executor = executor;
        inner.started_at = Some(Utc::now());
        self.transition(&mut inner, State::Init);
        Ok(dispatch)
    }

    fn dispatch(self: &Arc<Self>, dispatch: Dispatch) {
        match dispatch {
            Dispatch::Sync => {
                // Sync mode never awaits a pending completion, so the run
                // finishes on its first poll.
                if Arc::clone(self).drive(Mode::Sync).now_or_never().is_none() {
                    error!(execution_id = %self.id, "Synchronous run suspended before finishing");
                }
            }
            Dispatch::Async(handle) => {
                // The first poll runs init, will and the do hook inline. Only
                // a run that is waiting on a pending completion is spawned;
                // the runtime polls it again with a real waker.
                let mut run = Arc::clone(self).drive(Mode::Async).boxed();
                let mut cx = Context::from_waker(noop_waker_ref());
                if run.poll_unpin(&mut cx).is_pending() {
                    trace!(execution_id = %self.id, "Execution suspended on pending completion");
                    handle.spawn(run);
                }
            }
        }
    }

    // =========================================================================
    // Phase sequence
    // =========================================================================

    async fn drive(self: Arc<Self>, mode: Mode) {
        let executor = self.executor();

        if let Some(executor) = &executor {
            if let Err(err) = guard("init", || executor.init(&self)) {
                self.fold(err);
            }
        }

        if self.advance(State::Will) {
            if let Some(executor) = &executor {
                if let Err(err) = guard("will", || executor.will(&self)) {
                    self.fold(err);
                }
            }
        }

        if self.advance(State::Do) {
            if let Some(executor) = &executor {
                if let Err(err) = Self::complete("do", mode, || executor.perform(&self)).await {
                    self.fold(err);
                }
            }
            if self.is_executing() {
                let kind = self.kind();
                if let Err(err) = Self::complete("default", mode, || kind.perform(&self)).await {
                    self.fold(err);
                }
            }
        }

        self.finish(executor, mode).await;
    }

    async fn finish(self: &Arc<Self>, executor: Option<Arc<dyn Executor>>, mode: Mode) {
        self.fulfill_if_executing();

        if let Some(executor) = executor {
            if let Err(err) = Self::complete("finally", mode, || executor.finally(self)).await {
                self.report_finally_error(&err);
            }
        }

        self.release();
    }

    /// Call a hook that yields a [`Completion`] and settle it. A panic while
    /// producing or awaiting the completion becomes a runtime error.
    async fn complete<F>(hook: &'static str, mode: Mode, call: F) -> Result<(), ActionError>
    where
        F: FnOnce() -> Completion,
    {
        let completion = match panic::catch_unwind(AssertUnwindSafe(call)) {
            Ok(completion) => completion,
            Err(payload) => return Err(panicked(hook, payload)),
        };
        match (completion, mode) {
            (Completion::Ready(result), _) => result,
            (Completion::Pending(future), Mode::Async) => AssertUnwindSafe(future)
                .catch_unwind()
                .await
                .unwrap_or_else(|payload| Err(panicked(hook, payload))),
            (Completion::Pending(_), Mode::Sync) => Err(ActionError::InvalidOperation(
                "synchronous action returned a pending completion".to_string(),
            )),
        }
    }

    /// Route an error raised by a hook into the outcome. A rejection that is
    /// itself refused (late cancellation, bad argument) is folded once more,
    /// which makes it a failure.
    fn fold(&self, err: ActionError) {
        let Err(refused) = self.reject(err) else {
            return;
        };
        if let Err(ignored) = self.reject(refused) {
            debug!(
                execution_id = %self.id,
                error = %ignored,
                "Hook error after the outcome was decided ignored"
            );
        }
    }

    fn advance(&self, next: State) -> bool {
        let mut inner = self.lock();
        if !inner.state().is_executing() {
            return false;
        }
        self.transition(&mut inner, next);
        true
    }

    fn fulfill_if_executing(&self) {
        let mut inner = self.lock();
        if inner.state().is_executing() {
            inner.result = None;
            self.transition(&mut inner, State::Did);
        }
    }

    fn transition(&self, inner: &mut Inner, next: State) {
        let previous = inner.state();
        inner.action.set_state(next);
        if next.is_finished() {
            inner.finished_at = Some(Utc::now());
        }
        if self.config.trace_phases {
            debug!(
                execution_id = %self.id,
                label = %inner.action.label(),
                from = %previous,
                to = %next,
                "Execution state changed"
            );
        }
    }

    /// Drop the executor and settle the promise, if one was handed out.
    fn release(&self) {
        let (resolver, settlement, state) = {
            let mut inner = self.lock();
            inner.executor = None;
            (inner.resolver.take(), inner.settlement(), inner.state())
        };
        info!(execution_id = %self.id, state = %state, "Execution settled");
        if let Some(resolver) = resolver {
            resolver.settle(settlement);
        }
    }

    fn report_finally_error(&self, err: &ActionError) {
        let id = self.id;
        let message = "Error raised by finally hook ignored";
        match self.config.finally_error_level {
            LogLevel::Error => error!(execution_id = %id, error = %err, "{}", message),
            LogLevel::Warn => warn!(execution_id = %id, error = %err, "{}", message),
            LogLevel::Info => info!(execution_id = %id, error = %err, "{}", message),
            LogLevel::Debug => debug!(execution_id = %id, error = %err, "{}", message),
            LogLevel::Trace => trace!(execution_id = %id, error = %err, "{}", message),
        }
    }

    // =========================================================================
    // Completion operations
    // =========================================================================

    /// Fulfil the run. Only valid during `do`.
    pub fn done(&self, result: Option<Value>) -> Result<(), ActionError> {
        let mut inner = self.lock();
        let state = inner.state();
        if state != State::Do {
            return Err(ActionError::InvalidOperation(format!(
                "done() is only valid in state do, not {}",
                state
            )));
        }
        inner.result = result;
        self.transition(&mut inner, State::Did);
        Ok(())
    }

    /// Cancel or fail the run, depending on how `reason` classifies.
    ///
    /// Cancellation is accepted only during `init` and `will`; failure during
    /// any executing state. A reason that is neither a message nor an error
    /// is refused whatever the state.
    pub fn reject(&self, reason: impl Into<Reason>) -> Result<(), ActionError> {
        let rejection = reason.into().classify()?;

        let mut inner = self.lock();
        let state = inner.state();
        if !state.is_executing() {
            return Err(ActionError::InvalidOperation(format!(
                "reject() is only valid while executing, not in state {}",
                state
            )));
        }
        if rejection.is_canceled() && !state.is_cancelable() {
            return Err(ActionError::InvalidOperation(format!(
                "'{}' can no longer be canceled (state {})",
                inner.action.label(),
                state
            )));
        }

        let next = rejection.state();
        inner.result = None;
        inner.rejection = Some(rejection);
        self.transition(&mut inner, next);
        Ok(())
    }

    // =========================================================================
    // Promise
    // =========================================================================

    /// The memoized outcome. Every call returns the same promise; if the run
    /// has already finished it comes back settled.
    pub fn promise(&self) -> Promise {
        let mut inner = self.lock();
        if let Some(promise) = &inner.promise {
            return promise.clone();
        }
        let promise = if inner.state().is_finished() {
            Promise::settled(inner.settlement())
        } else {
            let (promise, resolver) = Promise::pending();
            inner.resolver = Some(resolver);
            promise
        };
        inner.promise = Some(promise.clone());
        promise
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> State {
        self.lock().state()
    }

    /// Detached copy of the action as it currently stands.
    pub fn action(&self) -> Action {
        self.lock().action.clone()
    }

    fn kind(&self) -> Arc<dyn ActionKind> {
        Arc::clone(self.lock().action.kind())
    }

    fn executor(&self) -> Option<Arc<dyn Executor>> {
        self.lock().executor.clone()
    }

    pub fn has_executor(&self) -> bool {
        self.lock().executor.is_some()
    }

    pub fn label(&self) -> String {
        self.lock().action.label().to_string()
    }

    pub fn description(&self) -> String {
        self.lock().action.description().to_string()
    }

    pub fn set_label(&self, label: impl Into<String>) -> Result<(), ActionError> {
        self.lock().action.set_label(label)
    }

    pub fn set_description(&self, description: impl Into<String>) -> Result<(), ActionError> {
        self.lock().action.set_description(description)
    }

    pub fn is_sync(&self) -> bool {
        self.lock().action.is_sync()
    }

    pub fn target(&self) -> Option<Target> {
        self.lock().target.clone()
    }

    /// The target, if it is a `T`.
    pub fn target_as<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        self.target()?.downcast::<T>().ok()
    }

    /// Result of a run that reached `did`.
    pub fn result(&self) -> Option<Value> {
        self.lock().result.clone()
    }

    /// Error of a rejected run. A cancellation may carry none.
    pub fn error(&self) -> Option<ActionError> {
        self.lock()
            .rejection
            .as_ref()
            .and_then(Rejection::error)
            .cloned()
    }

    pub fn rejection(&self) -> Option<Rejection> {
        self.lock().rejection.clone()
    }

    pub fn started_at(&self) -> Option<DateTime<Utc>> {
        self.lock().started_at
    }

    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.lock().finished_at
    }

    pub fn is_candidate(&self) -> bool {
        self.state().is_candidate()
    }

    pub fn is_editable(&self) -> bool {
        self.state().is_editable()
    }

    pub fn is_executing(&self) -> bool {
        self.state().is_executing()
    }

    pub fn is_done(&self) -> bool {
        self.state() == State::Did
    }

    pub fn is_rejected(&self) -> bool {
        self.state().is_rejected()
    }

    pub fn is_canceled(&self) -> bool {
        self.state() == State::Canceled
    }

    pub fn is_failed(&self) -> bool {
        self.state() == State::Failed
    }

    pub fn is_finished(&self) -> bool {
        self.state().is_finished()
    }

    pub fn snapshot(&self) -> ExecutionSnapshot {
        let inner = self.lock();
        ExecutionSnapshot {
            id: self.id,
            label: inner.action.label().to_string(),
            description: inner.action.description().to_string(),
            state: inner.state(),
            result: inner.result.clone(),
            error: inner
                .rejection
                .as_ref()
                .and_then(Rejection::error)
                .map(ToString::to_string),
            started_at: inner.started_at,
            finished_at: inner.finished_at,
        }
    }
}

impl std::fmt::Debug for Execution {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let inner = self.lock();
        f.debug_struct("Execution")
            .field("id", &self.id)
            .field("label", &inner.action.label())
            .field("state", &inner.state())
            .finish()
    }
}
