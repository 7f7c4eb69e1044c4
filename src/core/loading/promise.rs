// ─── Promise Adapter ───
// Drives a ResultState from an async producer, re-invoking it whenever the
// argument tuple or the producer itself changes.

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use futures_util::future::{BoxFuture, FutureExt};
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use super::gate::publish_if_changed;
use super::state::{IntoResultState, ResultState};
use crate::core::error::ApplicationError;

/// Type-erased async producer. Identity is the `Arc` pointer.
pub type Producer<A, T> = Arc<dyn Fn(A) -> BoxFuture<'static, ResultState<T>> + Send + Sync>;

/// Converts a failed settle into a ready value.
pub type ErrorFallback<A, T> = Arc<dyn Fn(&ApplicationError, &A) -> T + Send + Sync>;

/// Which settle is allowed to overwrite the state when invocations race.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SettlePolicy {
    /// Only the most recently *issued* invocation may publish. Older settles
    /// are dropped.
    #[default]
    LatestIssued,
    /// Whatever settles last wins, even if it was started first.
    LastSettled,
}

/// Wrap a plain async closure into a [`Producer`], normalizing its output.
pub fn producer<A, T, F, Fut, R>(f: F) -> Producer<A, T>
where
    A: Send + 'static,
    T: Send + 'static,
    F: Fn(A) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = R> + Send + 'static,
    R: IntoResultState<T> + 'static,
{
    Arc::new(move |args: A| {
        let pending = f(args);
        async move { pending.await.into_result_state() }.boxed()
    })
}

pub struct PromiseAdapter<A, T> {
    producer: Producer<A, T>,
    state: Arc<watch::Sender<ResultState<T>>>,
    last_args: Option<A>,
    issued: Arc<AtomicU64>,
    default_value: Option<T>,
    on_error: Option<ErrorFallback<A, T>>,
    policy: SettlePolicy,
}

impl<A, T> PromiseAdapter<A, T>
where
    A: Clone + PartialEq + Send + Sync + 'static,
    T: Clone + PartialEq + Send + Sync + 'static,
{
    pub fn new(producer: Producer<A, T>) -> Self {
        let (state, _) = watch::channel(ResultState::Loading);
        Self {
            producer,
            state: Arc::new(state),
            last_args: None,
            issued: Arc::new(AtomicU64::new(0)),
            default_value: None,
            on_error: None,
            policy: SettlePolicy::default(),
        }
    }

    /// Report `Ready(value)` instead of `Loading` while a call is in flight.
    pub fn with_default(mut self, value: T) -> Self {
        publish_if_changed(&self.state, ResultState::ready(value.clone()));
        self.default_value = Some(value);
        self
    }

    /// Turn failed settles into `Ready(fallback(error, args))`.
    pub fn with_fallback(
        mut self,
        fallback: impl Fn(&ApplicationError, &A) -> T + Send + Sync + 'static,
    ) -> Self {
        self.on_error = Some(Arc::new(fallback));
        self
    }

    pub fn with_policy(mut self, policy: SettlePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn subscribe(&self) -> watch::Receiver<ResultState<T>> {
        self.state.subscribe()
    }

    pub fn current(&self) -> ResultState<T> {
        self.state.borrow().clone()
    }

    /// Invoke the producer unless `args` equals the previous tuple.
    pub fn request(&mut self, args: A) -> Option<JoinHandle<()>> {
        if self.last_args.as_ref() == Some(&args) {
            return None;
        }
        Some(self.invoke(args))
    }

    /// Swap the producer; a different producer re-runs with the last arguments.
    pub fn set_producer(&mut self, producer: Producer<A, T>) -> Option<JoinHandle<()>> {
        if Arc::ptr_eq(&self.producer, &producer) {
            return None;
        }
        self.producer = producer;
        self.refresh()
    }

    /// Re-invoke with the last arguments even though they are unchanged.
    pub fn refresh(&mut self) -> Option<JoinHandle<()>> {
        let args = self.last_args.clone()?;
        Some(self.invoke(args))
    }

    fn invoke(&mut self, args: A) -> JoinHandle<()> {
        let ticket = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
        self.last_args = Some(args.clone());

        let pending = match &self.default_value {
            Some(value) => ResultState::ready(value.clone()),
            None => ResultState::Loading,
        };
        publish_if_changed(&self.state, pending);

        debug!(ticket, "invoking producer");
        let call = (self.producer)(args.clone());
        let state = Arc::clone(&self.state);
        let issued = Arc::clone(&self.issued);
        let on_error = self.on_error.clone();
        let policy = self.policy;

        tokio::spawn(async move {
            let settled = match (call.await, on_error) {
                (ResultState::Failed { error }, Some(fallback)) => {
                    debug!(ticket, %error, "producer failed, using fallback");
                    ResultState::ready(fallback(&error, &args))
                }
                (settled, _) => settled,
            };

            if policy == SettlePolicy::LatestIssued && issued.load(Ordering::SeqCst) != ticket {
                debug!(ticket, "discarding settle from superseded call");
                return;
            }

            publish_if_changed(&state, settled);
        })
    }

    /// Feed the adapter from an upstream watch channel until either side goes away.
    ///
    /// The upstream value is mapped into an argument tuple on every change;
    /// equal tuples do not re-invoke the producer.
    pub fn drive<U>(
        mut self,
        mut upstream: watch::Receiver<U>,
        to_args: impl Fn(&U) -> A + Send + 'static,
    ) -> watch::Receiver<ResultState<T>>
    where
        U: Send + Sync + 'static,
    {
        let output = self.subscribe();
        let state = Arc::clone(&self.state);

        tokio::spawn(async move {
            loop {
                let args = to_args(&upstream.borrow_and_update());
                self.request(args);

                tokio::select! {
                    changed = upstream.changed() => {
                        if changed.is_err() {
                            break;
                        }
                    }
                    _ = state.closed() => break,
                }
            }
            debug!("promise driver stopped");
        });

        output
    }
}
