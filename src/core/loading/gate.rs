// ─── Equality-Gated Projection ───
// Suppresses re-emission when a derived value is structurally unchanged.

use tokio::sync::watch;

/// Remembers the last emitted projection and lets a new one through only
/// when it differs.
#[derive(Debug, Clone)]
pub struct EqualityGate<P> {
    last: Option<P>,
}

impl<P> Default for EqualityGate<P> {
    fn default() -> Self {
        Self { last: None }
    }
}

impl<P: PartialEq> EqualityGate<P> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with `initial` already considered emitted.
    pub fn seeded(initial: P) -> Self {
        Self {
            last: Some(initial),
        }
    }

    /// Returns the candidate when it differs from the last emission.
    pub fn offer(&mut self, candidate: P) -> Option<&P> {
        if self.last.as_ref() == Some(&candidate) {
            return None;
        }
        self.last = Some(candidate);
        self.last.as_ref()
    }

    pub fn current(&self) -> Option<&P> {
        self.last.as_ref()
    }
}

/// Recomputes a projection of some source and emits it only on change.
pub struct Projection<S, P, F>
where
    F: Fn(&S) -> P,
{
    gate: EqualityGate<P>,
    project: F,
    _source: std::marker::PhantomData<fn(&S)>,
}

impl<S, P, F> Projection<S, P, F>
where
    P: PartialEq,
    F: Fn(&S) -> P,
{
    pub fn new(project: F) -> Self {
        Self {
            gate: EqualityGate::new(),
            project,
            _source: std::marker::PhantomData,
        }
    }

    pub fn update(&mut self, source: &S) -> Option<&P> {
        let candidate = (self.project)(source);
        self.gate.offer(candidate)
    }

    pub fn current(&self) -> Option<&P> {
        self.gate.current()
    }
}

/// Replace the watched value only if it is not equal to the current one.
///
/// Receivers are woken only for real changes. Returns whether a change was
/// published.
pub fn publish_if_changed<T: PartialEq>(sender: &watch::Sender<T>, next: T) -> bool {
    sender.send_if_modified(|current| {
        if *current == next {
            false
        } else {
            *current = next;
            true
        }
    })
}
