//! Cross-ledger request routing
//!
//! Checks run in a fixed order: relay authorization, duplicate detection, key
//! decoding, value decoding, then the mirroring handler. The request id is
//! recorded only after the handler succeeds.

use crate::codec::{MirroredChange, TransactionDecoder};
use crate::guards;
use crate::state::WalletState;
use std::collections::BTreeSet;
use tandem_core::{Address, Direction, Origin, Request, RequestId, RequestKey, Result, WalletConfig, WalletError};

/// Requests already applied, per origin ledger. Only ever grows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppliedRequests {
    applied: BTreeSet<(Origin, RequestId)>,
}

impl AppliedRequests {
    /// No requests applied
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `request_id` from `origin` was applied
    pub fn contains(&self, origin: Origin, request_id: RequestId) -> bool {
        self.applied.contains(&(origin, request_id))
    }

    /// Returns `true` if the id was not yet recorded.
    pub(crate) fn insert(&mut self, origin: Origin, request_id: RequestId) -> bool {
        self.applied.insert((origin, request_id))
    }

    /// Number of applied requests
    pub fn len(&self) -> usize {
        self.applied.len()
    }

    /// Nothing applied yet
    pub fn is_empty(&self) -> bool {
        self.applied.is_empty()
    }

    /// Applied ids in `(origin, id)` order
    pub fn iter(&self) -> impl Iterator<Item = &(Origin, RequestId)> {
        self.applied.iter()
    }
}

/// Relay identity allowed to deliver requests from `origin`.
pub fn relay_for(config: &WalletConfig, origin: Origin) -> Address {
    match origin {
        Origin::Root => config.root_relay,
        Origin::Child => config.system_sender,
    }
}

impl WalletState {
    pub(crate) fn apply_request(
        &mut self,
        config: &WalletConfig,
        decoder: &dyn TransactionDecoder,
        caller: &Address,
        request: Request,
    ) -> Result<()> {
        let Request {
            origin,
            is_exit,
            request_id,
            requestor,
            key,
            value,
        } = request;

        guards::require_relay(caller, &relay_for(config, origin), origin)?;
        if self.applied.contains(origin, request_id) {
            return Err(WalletError::DuplicateRequest { origin, request_id });
        }
        let key = RequestKey::from_code(key)?;
        let change = MirroredChange::decode(key, &value, decoder)?;

        let direction = Direction::of(origin, is_exit);
        self.apply_mirrored(change, direction, is_exit, &requestor)?;

        self.applied.insert(origin, request_id);
        tracing::debug!(%origin, %request_id, %key, ?direction, "request applied");
        Ok(())
    }
}
