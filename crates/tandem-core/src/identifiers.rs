//! Core identifier types shared by both ledgers
//!
//! Addresses and fingerprints are fixed-width byte strings. They serialize as
//! `0x`-prefixed hex in human-readable formats (TOML, JSON) and as raw byte
//! arrays in binary formats so canonical encodings stay compact.

use crate::hash;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::str::FromStr;

/// Error returned when parsing a hex identifier fails.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {kind}: {reason}")]
pub struct ParseIdentifierError {
    kind: &'static str,
    reason: String,
}

fn parse_fixed_hex<const N: usize>(kind: &'static str, s: &str) -> Result<[u8; N], ParseIdentifierError> {
    let digits = s.strip_prefix("0x").unwrap_or(s);
    let bytes = hex::decode(digits).map_err(|e| ParseIdentifierError {
        kind,
        reason: e.to_string(),
    })?;
    bytes.try_into().map_err(|bytes: Vec<u8>| ParseIdentifierError {
        kind,
        reason: format!("expected {N} bytes, got {}", bytes.len()),
    })
}

macro_rules! hex_serde {
    ($ty:ident, $len:expr, $kind:expr) => {
        impl Serialize for $ty {
            fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
                if serializer.is_human_readable() {
                    serializer.serialize_str(&self.to_string())
                } else {
                    self.0.serialize(serializer)
                }
            }
        }

        impl<'de> Deserialize<'de> for $ty {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                if deserializer.is_human_readable() {
                    let s = String::deserialize(deserializer)?;
                    s.parse().map_err(serde::de::Error::custom)
                } else {
                    <[u8; $len]>::deserialize(deserializer).map(Self)
                }
            }
        }

        impl FromStr for $ty {
            type Err = ParseIdentifierError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                parse_fixed_hex::<$len>($kind, s).map(Self)
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "0x{}", hex::encode(self.0))
            }
        }

        impl fmt::Debug for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}({})", stringify!($ty), self)
            }
        }
    };
}

/// Ledger account address (20 bytes).
///
/// The all-zero address is the null address: it is never a valid owner or
/// transaction destination, and on the child ledger it marks replay performed
/// by the system itself.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Address(pub [u8; 20]);

impl Address {
    /// Byte length of an address.
    pub const LEN: usize = 20;

    /// The null address.
    pub const ZERO: Address = Address([0u8; 20]);

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 20]) -> Self {
        Self(bytes)
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; 20] {
        &self.0
    }

    /// Returns `true` for the null address.
    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; 20]
    }
}

hex_serde!(Address, 20, "address");

/// Content fingerprint of a transaction record (32 bytes).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Fingerprint(pub [u8; 32]);

impl Fingerprint {
    /// Byte length of a fingerprint.
    pub const LEN: usize = 32;

    /// Domain separator mixed into every transaction fingerprint.
    pub const DOMAIN: &'static [u8] = b"tandem/tx/v1";

    /// Create from raw bytes.
    pub const fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Raw bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Fingerprint of `(destination, value, payload)`.
    ///
    /// Fields are length-delimited so no two distinct triples share an encoding.
    pub fn of(destination: &Address, value: Amount, payload: &[u8]) -> Self {
        let mut h = hash::hasher();
        h.update(Self::DOMAIN);
        h.update(destination.as_bytes());
        h.update(&value.0.to_be_bytes());
        h.update(&(payload.len() as u64).to_be_bytes());
        h.update(payload);
        Self(h.finalize())
    }
}

hex_serde!(Fingerprint, 32, "fingerprint");

/// Value transferred with a transaction, in ledger base units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Amount(pub u128);

impl Amount {
    /// Zero value.
    pub const ZERO: Amount = Amount(0);

    /// Returns `true` if no value is transferred.
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl From<u128> for Amount {
    fn from(value: u128) -> Self {
        Self(value)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier of a cross-ledger replay request.
///
/// Ids are assigned by the originating ledger's relay and are unique per origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestId(pub u64);

impl RequestId {
    /// Create a new request id.
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    /// Numeric value.
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl From<u64> for RequestId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "request-{}", self.0)
    }
}
