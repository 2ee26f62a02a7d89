//! Precondition guards
//!
//! Each guard checks one precondition against read-only state and returns a
//! typed error. Operations chain them with `?` before mutating anything.

use crate::owners::{ConfirmationMatrix, OwnerSet};
use crate::registry::TransactionRegistry;
use tandem_core::{Address, Fingerprint, Origin, Result, WalletError};

/// Caller must be a current owner.
pub fn require_owner(owners: &OwnerSet, caller: &Address) -> Result<()> {
    if owners.contains(caller) {
        Ok(())
    } else {
        Err(WalletError::unauthorized(format!("{caller} is not an owner")))
    }
}

/// Caller must be the wallet itself.
pub fn require_self(caller: &Address, wallet: &Address) -> Result<()> {
    if caller == wallet {
        Ok(())
    } else {
        Err(WalletError::unauthorized(format!(
            "{caller} is not the wallet; owner management requires self-invocation"
        )))
    }
}

/// Caller must be the relay identity designated for `origin`.
pub fn require_relay(caller: &Address, relay: &Address, origin: Origin) -> Result<()> {
    if caller == relay {
        Ok(())
    } else {
        Err(WalletError::unauthorized(format!(
            "{caller} may not deliver {origin}-origin requests"
        )))
    }
}

/// Exit replay of an ownership change must name a real, non-null owner.
pub fn require_exit_requestor(owners: &OwnerSet, requestor: &Address) -> Result<()> {
    if requestor.is_zero() {
        return Err(WalletError::unauthorized("exit request from the null requestor"));
    }
    require_owner(owners, requestor)
}

/// Transaction must be known (`NotFound`).
pub fn require_exists(registry: &TransactionRegistry, fingerprint: &Fingerprint) -> Result<()> {
    registry.require(fingerprint).map(|_| ())
}

/// Confirmation state is frozen once executed.
pub fn require_not_executed(registry: &TransactionRegistry, fingerprint: &Fingerprint) -> Result<()> {
    if registry.is_executed(fingerprint) {
        Err(WalletError::mirror_violation(format!("{fingerprint} is already executed")))
    } else {
        Ok(())
    }
}

/// Placeholders mirrored into existence are never executed.
pub fn require_not_placeholder(registry: &TransactionRegistry, fingerprint: &Fingerprint) -> Result<()> {
    if registry.is_empty(fingerprint) {
        Err(WalletError::mirror_violation(format!(
            "{fingerprint} is an empty placeholder"
        )))
    } else {
        Ok(())
    }
}

/// Execution needs somewhere to send the call.
pub fn require_destination(registry: &TransactionRegistry, fingerprint: &Fingerprint) -> Result<()> {
    if registry.has_destination(fingerprint) {
        Ok(())
    } else {
        Err(WalletError::InvalidDestination)
    }
}

/// `owner` must have confirmed.
pub fn require_confirmed(
    confirmations: &ConfirmationMatrix,
    fingerprint: &Fingerprint,
    owner: &Address,
) -> Result<()> {
    if confirmations.is_confirmed_by(fingerprint, owner) {
        Ok(())
    } else {
        Err(WalletError::mirror_violation(format!(
            "{owner} has not confirmed {fingerprint}"
        )))
    }
}

/// `owner` must not have confirmed yet.
pub fn require_not_confirmed(
    confirmations: &ConfirmationMatrix,
    fingerprint: &Fingerprint,
    owner: &Address,
) -> Result<()> {
    if confirmations.is_confirmed_by(fingerprint, owner) {
        Err(WalletError::mirror_violation(format!(
            "{owner} already confirmed {fingerprint}"
        )))
    } else {
        Ok(())
    }
}
