//! External invocation effect interface
//!
//! **Effect Classification**: Infrastructure Effect
//! - Implemented by the hosting ledger runtime (and by `tandem-testkit` doubles)
//! - Used by the multisig execution path only
//!
//! The wallet treats invocation as an opaque primitive: it hands over a
//! destination, value, payload and a bounded stipend and learns only whether
//! the call succeeded. The stipend is always smaller than the caller's own
//! budget so the wallet can finish its bookkeeping whatever the payload does.

use crate::identifiers::{Address, Amount, Fingerprint};

/// One invocation handed to [`InvokeEffects`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvokeCall<'a> {
    /// Transaction being executed.
    pub fingerprint: Fingerprint,
    /// Target account.
    pub destination: Address,
    /// Value transferred with the call.
    pub value: Amount,
    /// Opaque call data.
    pub payload: &'a [u8],
    /// Resource budget granted to the callee.
    pub stipend: u64,
}

/// Read-only view of execution state available to invoked code.
///
/// Invoked payloads may call back into the wallet to read state, but never to
/// mutate it while an invocation is in flight. The executed flag is already set
/// when the view is handed out.
pub trait ExecutedView {
    /// Returns `true` if `fingerprint` is currently marked executed.
    fn is_executed(&self, fingerprint: &Fingerprint) -> bool;
}

/// Bounded external invocation.
pub trait InvokeEffects {
    /// Invoke `call`; returns `true` on success.
    ///
    /// Implementations must not consume more than `call.stipend` and must not
    /// panic on payload failure; failure is reported by returning `false`.
    fn invoke(&mut self, call: &InvokeCall<'_>, view: &dyn ExecutedView) -> bool;
}

impl<T: InvokeEffects + ?Sized> InvokeEffects for &mut T {
    fn invoke(&mut self, call: &InvokeCall<'_>, view: &dyn ExecutedView) -> bool {
        (**self).invoke(call, view)
    }
}

impl<T: InvokeEffects + ?Sized> InvokeEffects for Box<T> {
    fn invoke(&mut self, call: &InvokeCall<'_>, view: &dyn ExecutedView) -> bool {
        (**self).invoke(call, view)
    }
}
