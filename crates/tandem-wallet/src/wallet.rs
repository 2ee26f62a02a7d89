//! Wallet facade
//!
//! Every mutating entry point runs as one transition: the state is
//! snapshotted first and restored if the operation fails, so a rejected call
//! leaves neither state nor notifications behind.
//!
//! The snapshot is a full clone of the registry, confirmation matrix, owner
//! set and applied-request set, so each transition costs time and memory
//! linear in the state size. The notification log is only checkpointed, but
//! it grows until the host calls [`Wallet::drain_notifications`].

use crate::codec::{CanonicalDecoder, TransactionDecoder};
use crate::multisig::ExecEnv;
use crate::owners::OwnerSet;
use crate::registry::TransactionData;
use crate::state::WalletState;
use tandem_core::{
    Address, Amount, Fingerprint, GenesisConfig, InvokeEffects, Notification, Origin, Request,
    RequestId, Result, WalletConfig,
};

/// One ledger's copy of the mirrored multisig wallet.
#[derive(Debug)]
pub struct Wallet {
    config: WalletConfig,
    state: WalletState,
    decoder: Box<dyn TransactionDecoder>,
}

impl Wallet {
    /// Create a wallet from validated configuration and its genesis owners.
    pub fn new(config: WalletConfig, genesis: GenesisConfig) -> Result<Self> {
        config.validate()?;
        let owners = OwnerSet::new(genesis.owners, genesis.threshold)?;
        tracing::info!(
            wallet = %config.wallet_address,
            owners = owners.len(),
            threshold = owners.threshold(),
            "wallet created"
        );
        Ok(Self {
            config,
            state: WalletState::new(owners),
            decoder: Box::new(CanonicalDecoder),
        })
    }

    /// Replace the decoder used for transaction-record requests.
    pub fn with_decoder(mut self, decoder: impl TransactionDecoder + 'static) -> Self {
        self.decoder = Box::new(decoder);
        self
    }

    /// Validated configuration.
    pub fn config(&self) -> &WalletConfig {
        &self.config
    }

    /// Read access to the full state.
    pub fn state(&self) -> &WalletState {
        &self.state
    }

    /// Digest of the current state.
    pub fn commitment(&self) -> [u8; 32] {
        self.state.commitment()
    }

    /// Notifications emitted and not yet drained.
    pub fn notifications(&self) -> &[Notification] {
        self.state.notifications()
    }

    /// Take all notifications emitted so far.
    pub fn drain_notifications(&mut self) -> Vec<Notification> {
        self.state.notifications.drain()
    }

    fn transition<T>(
        &mut self,
        operation: &'static str,
        f: impl FnOnce(&mut WalletState, &WalletConfig, &dyn TransactionDecoder) -> Result<T>,
    ) -> Result<T> {
        let snapshot = self.state.snapshot();
        match f(&mut self.state, &self.config, self.decoder.as_ref()) {
            Ok(value) => Ok(value),
            Err(err) => {
                self.state.restore(snapshot);
                tracing::warn!(operation, kind = %err.kind(), error = %err, "rejected; state restored");
                Err(err)
            }
        }
    }

    /// Submit a transaction and confirm it as `caller`.
    pub fn submit_transaction(
        &mut self,
        caller: &Address,
        destination: Address,
        value: Amount,
        payload: Vec<u8>,
        invoker: &mut dyn InvokeEffects,
    ) -> Result<Fingerprint> {
        let data = TransactionData::new(destination, value, payload);
        self.transition("submit", |state, config, _| {
            let mut env = exec_env(config, invoker);
            state.submit(&mut env, caller, data)
        })
    }

    /// Confirm as `caller`, executing if the threshold is reached.
    pub fn confirm_transaction(
        &mut self,
        caller: &Address,
        fingerprint: &Fingerprint,
        invoker: &mut dyn InvokeEffects,
    ) -> Result<()> {
        self.transition("confirm", |state, config, _| {
            let mut env = exec_env(config, invoker);
            state.confirm(&mut env, caller, fingerprint)
        })
    }

    /// Withdraw the caller's confirmation of a pending transaction.
    pub fn revoke_confirmation(&mut self, caller: &Address, fingerprint: &Fingerprint) -> Result<()> {
        self.transition("revoke", |state, _, _| state.revoke(caller, fingerprint))
    }

    /// Execute a confirmed transaction. Succeeds even when the invocation
    /// fails; the outcome is reported through notifications.
    pub fn execute_transaction(
        &mut self,
        caller: &Address,
        fingerprint: &Fingerprint,
        invoker: &mut dyn InvokeEffects,
    ) -> Result<()> {
        self.transition("execute", |state, config, _| {
            let mut env = exec_env(config, invoker);
            state.execute(&mut env, caller, fingerprint)
        })
    }

    /// Accept a plain value transfer.
    pub fn deposit(&mut self, sender: &Address, amount: Amount) {
        self.state.deposit(sender, amount);
    }

    /// Add an owner. Only the wallet itself may call this.
    pub fn add_owner(&mut self, caller: &Address, owner: Address) -> Result<()> {
        self.transition("add_owner", |state, config, _| {
            state.add_owner(&config.wallet_address, caller, owner)
        })
    }

    /// Remove an owner, clamping the threshold if needed. Wallet only.
    pub fn remove_owner(&mut self, caller: &Address, owner: &Address) -> Result<()> {
        self.transition("remove_owner", |state, config, _| {
            state.remove_owner(&config.wallet_address, caller, owner)
        })
    }

    /// Swap `old` for `new` in place. Wallet only.
    pub fn replace_owner(&mut self, caller: &Address, old: &Address, new: Address) -> Result<()> {
        self.transition("replace_owner", |state, config, _| {
            state.replace_owner(&config.wallet_address, caller, old, new)
        })
    }

    /// Set the confirmation threshold. Wallet only.
    pub fn change_threshold(&mut self, caller: &Address, threshold: u64) -> Result<()> {
        self.transition("change_threshold", |state, config, _| {
            state.change_threshold(&config.wallet_address, caller, threshold)
        })
    }

    /// Replay a root-ledger change. `caller` must be the root relay.
    pub fn apply_from_root_ledger(
        &mut self,
        caller: &Address,
        is_exit: bool,
        request_id: RequestId,
        requestor: Address,
        key: u8,
        value: &[u8],
    ) -> Result<()> {
        self.apply(
            caller,
            Request {
                origin: Origin::Root,
                is_exit,
                request_id,
                requestor,
                key,
                value: value.to_vec(),
            },
        )
    }

    /// Replay a child-ledger change. `caller` must be the system sender.
    pub fn apply_from_child_ledger(
        &mut self,
        caller: &Address,
        is_exit: bool,
        request_id: RequestId,
        requestor: Address,
        key: u8,
        value: &[u8],
    ) -> Result<()> {
        self.apply(
            caller,
            Request {
                origin: Origin::Child,
                is_exit,
                request_id,
                requestor,
                key,
                value: value.to_vec(),
            },
        )
    }

    /// Route a replay request.
    pub fn apply(&mut self, caller: &Address, request: Request) -> Result<()> {
        let span = tracing::debug_span!(
            "apply_request",
            origin = %request.origin,
            request_id = %request.request_id,
            key = request.key
        );
        let _guard = span.enter();
        self.transition("apply_request", |state, config, decoder| {
            state.apply_request(config, decoder, caller, request)
        })
    }
}

fn exec_env<'a>(config: &WalletConfig, invoker: &'a mut dyn InvokeEffects) -> ExecEnv<'a> {
    ExecEnv {
        wallet: config.wallet_address,
        stipend: config.stipend(),
        invoker,
    }
}
