//! Invoke effect doubles
//!
//! `ScriptedInvoker` returns queued outcomes in order, falling back to a
//! default once the queue is empty, and records every call together with the
//! executed flag the callee could observe while it ran.

use std::collections::VecDeque;
use tandem_core::{Address, Amount, ExecutedView, Fingerprint, InvokeCall, InvokeEffects};

/// One recorded invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordedCall {
    /// Transaction being executed
    pub fingerprint: Fingerprint,
    /// Target account
    pub destination: Address,
    /// Value sent
    pub value: Amount,
    /// Call data
    pub payload: Vec<u8>,
    /// Budget granted
    pub stipend: u64,
    /// Executed flag as seen through the view during the call.
    pub observed_executed: bool,
}

/// Invoker with a queue of scripted outcomes.
#[derive(Debug, Clone)]
pub struct ScriptedInvoker {
    outcomes: VecDeque<bool>,
    default_outcome: bool,
    calls: Vec<RecordedCall>,
}

impl ScriptedInvoker {
    /// Empty queue with the given fallback outcome
    pub fn new(default_outcome: bool) -> Self {
        Self {
            outcomes: VecDeque::new(),
            default_outcome,
            calls: Vec::new(),
        }
    }

    /// Succeeds unless scripted otherwise
    pub fn succeeding() -> Self {
        Self::new(true)
    }

    /// Fails unless scripted otherwise
    pub fn failing() -> Self {
        Self::new(false)
    }

    /// Queue outcomes returned before falling back to the default.
    pub fn with_outcomes(mut self, outcomes: impl IntoIterator<Item = bool>) -> Self {
        self.outcomes.extend(outcomes);
        self
    }

    /// Queue one more outcome
    pub fn push_outcome(&mut self, outcome: bool) {
        self.outcomes.push_back(outcome);
    }

    /// Change the fallback outcome
    pub fn set_default(&mut self, outcome: bool) {
        self.default_outcome = outcome;
    }

    /// Every call so far, in order
    pub fn calls(&self) -> &[RecordedCall] {
        &self.calls
    }

    /// Number of calls so far
    pub fn call_count(&self) -> usize {
        self.calls.len()
    }

    /// Most recent call
    pub fn last_call(&self) -> Option<&RecordedCall> {
        self.calls.last()
    }
}

impl Default for ScriptedInvoker {
    fn default() -> Self {
        Self::succeeding()
    }
}

impl InvokeEffects for ScriptedInvoker {
    fn invoke(&mut self, call: &InvokeCall<'_>, view: &dyn ExecutedView) -> bool {
        self.calls.push(RecordedCall {
            fingerprint: call.fingerprint,
            destination: call.destination,
            value: call.value,
            payload: call.payload.to_vec(),
            stipend: call.stipend,
            observed_executed: view.is_executed(&call.fingerprint),
        });
        self.outcomes.pop_front().unwrap_or(self.default_outcome)
    }
}

/// Every invocation succeeds.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysSucceeds;

impl InvokeEffects for AlwaysSucceeds {
    fn invoke(&mut self, _call: &InvokeCall<'_>, _view: &dyn ExecutedView) -> bool {
        true
    }
}

/// Every invocation fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct AlwaysFails;

impl InvokeEffects for AlwaysFails {
    fn invoke(&mut self, _call: &InvokeCall<'_>, _view: &dyn ExecutedView) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Nothing;

    impl ExecutedView for Nothing {
        fn is_executed(&self, _fingerprint: &Fingerprint) -> bool {
            false
        }
    }

    #[test]
    fn test_queue_then_default() {
        let mut invoker = ScriptedInvoker::succeeding().with_outcomes([false]);
        let call = InvokeCall {
            fingerprint: Fingerprint([1; 32]),
            destination: Address([2; 20]),
            value: Amount(3),
            payload: &[4],
            stipend: 5,
        };
        assert!(!invoker.invoke(&call, &Nothing));
        assert!(invoker.invoke(&call, &Nothing));
        assert_eq!(invoker.call_count(), 2);
        assert_eq!(invoker.last_call().unwrap().payload, vec![4]);
    }
}
