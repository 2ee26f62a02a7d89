//! Cross-ledger replay request vocabulary

use crate::errors::{Result, WalletError};
use crate::identifiers::{Address, RequestId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Ledger a replay request originates from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// The root ledger; requests arrive through the configured relay.
    Root,
    /// The child ledger; requests arrive from the system sender.
    Child,
}

impl Origin {
    /// Stable byte tag used in commitments.
    pub fn tag(&self) -> u8 {
        match self {
            Origin::Root => 0,
            Origin::Child => 1,
        }
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Origin::Root => write!(f, "root"),
            Origin::Child => write!(f, "child"),
        }
    }
}

/// Mirroring direction derived from `(origin, is_exit)`.
///
/// Forward requests describe state the other ledger already committed and this
/// ledger is catching up to; backward requests push new state outward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Root enter or child exit.
    Forward,
    /// Root exit or child enter.
    Backward,
}

impl Direction {
    /// Classify a request.
    pub fn of(origin: Origin, is_exit: bool) -> Self {
        match (origin, is_exit) {
            (Origin::Root, false) | (Origin::Child, true) => Direction::Forward,
            (Origin::Root, true) | (Origin::Child, false) => Direction::Backward,
        }
    }

    /// Returns `true` for the forward direction.
    pub fn is_forward(&self) -> bool {
        matches!(self, Direction::Forward)
    }
}

/// State category addressed by a request (wire codes `0x00..=0x07`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u8)]
pub enum RequestKey {
    /// Structured transaction record.
    Transaction = 0x00,
    /// Fingerprint of a locally submitted transaction.
    TransactionId = 0x01,
    /// Fingerprint of an executed transaction.
    Executed = 0x02,
    /// Fingerprint confirmed by the requestor.
    NewConfirmation = 0x03,
    /// Fingerprint whose confirmation the requestor revoked.
    RevokedConfirmation = 0x04,
    /// Owner added.
    NewOwner = 0x05,
    /// Owner removed.
    RemovedOwner = 0x06,
    /// Confirmation threshold changed.
    Threshold = 0x07,
}

impl RequestKey {
    /// All categories in code order.
    pub const ALL: [RequestKey; 8] = [
        RequestKey::Transaction,
        RequestKey::TransactionId,
        RequestKey::Executed,
        RequestKey::NewConfirmation,
        RequestKey::RevokedConfirmation,
        RequestKey::NewOwner,
        RequestKey::RemovedOwner,
        RequestKey::Threshold,
    ];

    /// Wire code.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Decode a wire code, rejecting anything outside the reserved range.
    pub fn from_code(code: u8) -> Result<Self> {
        Self::ALL
            .get(usize::from(code))
            .copied()
            .ok_or(WalletError::InvalidKey { code })
    }
}

impl TryFrom<u8> for RequestKey {
    type Error = WalletError;

    fn try_from(code: u8) -> Result<Self> {
        Self::from_code(code)
    }
}

impl fmt::Display for RequestKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RequestKey::Transaction => "transaction",
            RequestKey::TransactionId => "transaction_id",
            RequestKey::Executed => "executed",
            RequestKey::NewConfirmation => "new_confirmation",
            RequestKey::RevokedConfirmation => "revoked_confirmation",
            RequestKey::NewOwner => "new_owner",
            RequestKey::RemovedOwner => "removed_owner",
            RequestKey::Threshold => "threshold",
        };
        write!(f, "{name}")
    }
}

/// A replay request as delivered by a relay.
///
/// `key` stays a raw code until routing so unknown categories can be rejected
/// with a typed error instead of failing to construct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Request {
    /// Ledger the request originates from.
    pub origin: Origin,
    /// Exit (withdraw back) rather than enter.
    pub is_exit: bool,
    /// Relay-assigned identifier.
    pub request_id: RequestId,
    /// Account that caused the change on the originating ledger.
    pub requestor: Address,
    /// Raw category code.
    pub key: u8,
    /// Opaque category-specific value.
    pub value: Vec<u8>,
}

impl Request {
    /// Mirroring direction of this request.
    pub fn direction(&self) -> Direction {
        Direction::of(self.origin, self.is_exit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_matrix() {
        assert_eq!(Direction::of(Origin::Root, false), Direction::Forward);
        assert_eq!(Direction::of(Origin::Child, true), Direction::Forward);
        assert_eq!(Direction::of(Origin::Root, true), Direction::Backward);
        assert_eq!(Direction::of(Origin::Child, false), Direction::Backward);
    }

    #[test]
    fn test_key_codes_roundtrip() {
        for key in RequestKey::ALL {
            assert_eq!(RequestKey::from_code(key.code()).unwrap(), key);
        }
    }

    #[test]
    fn test_unknown_key_rejected() {
        for code in 8u8..=255 {
            assert_eq!(
                RequestKey::from_code(code),
                Err(WalletError::InvalidKey { code })
            );
        }
    }
}
