//! Local multisig lifecycle: submit, confirm, revoke, execute, deposit
//!
//! Execution marks the transaction executed before invoking anything and rolls
//! the flag back only when the invocation reports failure. A failed invocation
//! is not an error: the attempt itself succeeded and is reported through an
//! `ExecutionFailure` notification.

use crate::admin::AdminCall;
use crate::guards;
use crate::registry::TransactionData;
use crate::state::WalletState;
use tandem_core::{Address, Amount, Fingerprint, InvokeCall, InvokeEffects, Notification, Result, WalletError};

/// Everything execution needs beyond wallet state.
pub(crate) struct ExecEnv<'a> {
    /// The wallet's own address; transactions sent here are admin self-calls.
    pub wallet: Address,
    /// Budget handed to invoked payloads.
    pub stipend: u64,
    pub invoker: &'a mut dyn InvokeEffects,
}

impl WalletState {
    pub(crate) fn submit(
        &mut self,
        env: &mut ExecEnv<'_>,
        caller: &Address,
        data: TransactionData,
    ) -> Result<Fingerprint> {
        if data.destination.is_zero() {
            return Err(WalletError::InvalidDestination);
        }
        guards::require_owner(&self.owners, caller)?;

        let (fingerprint, _) = self.registry.get_or_create(data);
        if self.registry.mark_submitted(&fingerprint)? {
            tracing::debug!(%fingerprint, "transaction submitted");
            self.emit(Notification::Submission { fingerprint });
        }
        self.confirm(env, caller, &fingerprint)?;
        Ok(fingerprint)
    }

    pub(crate) fn confirm(
        &mut self,
        env: &mut ExecEnv<'_>,
        caller: &Address,
        fingerprint: &Fingerprint,
    ) -> Result<()> {
        guards::require_owner(&self.owners, caller)?;
        guards::require_exists(&self.registry, fingerprint)?;
        guards::require_not_confirmed(&self.confirmations, fingerprint, caller)?;

        self.confirmations.set(*fingerprint, *caller);
        tracing::debug!(%fingerprint, owner = %caller, "confirmation recorded");
        self.emit(Notification::Confirmation {
            owner: *caller,
            fingerprint: *fingerprint,
        });

        if self.registry.has_destination(fingerprint) {
            self.execute(env, caller, fingerprint)?;
        }
        Ok(())
    }

    pub(crate) fn revoke(&mut self, caller: &Address, fingerprint: &Fingerprint) -> Result<()> {
        guards::require_owner(&self.owners, caller)?;
        guards::require_confirmed(&self.confirmations, fingerprint, caller)?;
        guards::require_not_executed(&self.registry, fingerprint)?;

        self.confirmations.clear(fingerprint, caller);
        tracing::debug!(%fingerprint, owner = %caller, "confirmation revoked");
        self.emit(Notification::Revocation {
            owner: *caller,
            fingerprint: *fingerprint,
        });
        Ok(())
    }

    /// Execute once the threshold is reached; a no-op while confirmations are missing.
    pub(crate) fn execute(
        &mut self,
        env: &mut ExecEnv<'_>,
        caller: &Address,
        fingerprint: &Fingerprint,
    ) -> Result<()> {
        guards::require_owner(&self.owners, caller)?;
        guards::require_exists(&self.registry, fingerprint)?;
        guards::require_confirmed(&self.confirmations, fingerprint, caller)?;
        guards::require_not_executed(&self.registry, fingerprint)?;
        guards::require_not_placeholder(&self.registry, fingerprint)?;
        guards::require_destination(&self.registry, fingerprint)?;

        if !self.is_confirmed(fingerprint) {
            tracing::debug!(
                %fingerprint,
                confirmations = self.confirmation_count(fingerprint),
                threshold = self.threshold(),
                "awaiting confirmations"
            );
            return Ok(());
        }

        // Set before invoking so a reentrant call sees it executed.
        self.registry.mark_executed(*fingerprint);
        if self.invoke(env, fingerprint)? {
            tracing::info!(%fingerprint, "transaction executed");
            self.emit(Notification::Execution {
                fingerprint: *fingerprint,
            });
        } else {
            self.registry.unmark_executed(fingerprint);
            tracing::warn!(%fingerprint, "invocation failed; executed flag rolled back");
            self.emit(Notification::ExecutionFailure {
                fingerprint: *fingerprint,
            });
        }
        Ok(())
    }

    fn invoke(&mut self, env: &mut ExecEnv<'_>, fingerprint: &Fingerprint) -> Result<bool> {
        let record = self.registry.require(fingerprint)?;

        if record.data.destination == env.wallet {
            let outcome = AdminCall::decode(&record.data.payload)
                .and_then(|call| self.apply_admin(&env.wallet, call));
            if let Err(err) = &outcome {
                tracing::warn!(%fingerprint, error = %err, "self-invocation rejected");
            }
            return Ok(outcome.is_ok());
        }

        let call = InvokeCall {
            fingerprint: *fingerprint,
            destination: record.data.destination,
            value: record.data.value,
            payload: &record.data.payload,
            stipend: env.stipend,
        };
        Ok(env.invoker.invoke(&call, &self.registry))
    }

    pub(crate) fn deposit(&mut self, sender: &Address, amount: Amount) {
        if amount.is_zero() {
            return;
        }
        tracing::debug!(%sender, %amount, "deposit received");
        self.emit(Notification::Deposit {
            sender: *sender,
            amount,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::owners::OwnerSet;
    use tandem_core::{ErrorKind, ExecutedView};

    struct Fixed(bool);

    impl InvokeEffects for Fixed {
        fn invoke(&mut self, call: &InvokeCall<'_>, view: &dyn ExecutedView) -> bool {
            assert!(view.is_executed(&call.fingerprint));
            self.0
        }
    }

    fn addr(seed: u8) -> Address {
        Address([seed; 20])
    }

    fn state() -> WalletState {
        WalletState::new(OwnerSet::new(vec![addr(1), addr(2), addr(3)], 2).unwrap())
    }

    fn env(invoker: &mut Fixed) -> ExecEnv<'_> {
        ExecEnv {
            wallet: addr(0xee),
            stipend: 1_000,
            invoker,
        }
    }

    fn tx() -> TransactionData {
        TransactionData::new(addr(0xd0), Amount::ZERO, Vec::new())
    }

    #[test]
    fn test_execute_after_threshold() {
        let mut s = state();
        let mut invoker = Fixed(true);
        let mut env = env(&mut invoker);
        let fp = s.submit(&mut env, &addr(1), tx()).unwrap();
        assert!(!s.is_executed(&fp));
        s.confirm(&mut env, &addr(2), &fp).unwrap();
        assert!(s.is_executed(&fp));
        assert_eq!(
            s.notifications().last(),
            Some(&Notification::Execution { fingerprint: fp })
        );
    }

    #[test]
    fn test_failed_invoke_rolls_back() {
        let mut s = state();
        let mut invoker = Fixed(false);
        let mut env = env(&mut invoker);
        let fp = s.submit(&mut env, &addr(1), tx()).unwrap();
        s.confirm(&mut env, &addr(2), &fp).unwrap();
        assert!(!s.is_executed(&fp));
        assert_eq!(
            s.notifications().last(),
            Some(&Notification::ExecutionFailure { fingerprint: fp })
        );
    }

    #[test]
    fn test_submit_rejects_null_destination() {
        let mut s = state();
        let mut invoker = Fixed(true);
        let mut env = env(&mut invoker);
        let data = TransactionData::new(Address::ZERO, Amount(1), Vec::new());
        assert_eq!(s.submit(&mut env, &addr(1), data), Err(WalletError::InvalidDestination));
    }

    #[test]
    fn test_revoke_requires_prior_confirmation() {
        let mut s = state();
        let mut invoker = Fixed(true);
        let mut env = env(&mut invoker);
        let fp = s.submit(&mut env, &addr(1), tx()).unwrap();
        assert_eq!(
            s.revoke(&addr(2), &fp).unwrap_err().kind(),
            ErrorKind::MirrorInvariantViolation
        );
        s.revoke(&addr(1), &fp).unwrap();
        assert!(!s.is_confirmed_by(&fp, &addr(1)));
    }

    #[test]
    fn test_zero_deposit_is_silent() {
        let mut s = state();
        s.deposit(&addr(9), Amount::ZERO);
        assert!(s.notifications().is_empty());
        s.deposit(&addr(9), Amount(10));
        assert_eq!(s.notifications().len(), 1);
    }
}
