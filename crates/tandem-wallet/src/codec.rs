//! Request value codec
//!
//! Category `0x00` carries a structured transaction record decoded by a
//! [`TransactionDecoder`]; every other category carries a single 32-byte word.
//! Admin self-call payloads share the bincode configuration used for records.

use crate::registry::TransactionData;
use bincode::Options;
use serde::{de::DeserializeOwned, Serialize};
use std::fmt;
use tandem_core::{Address, Fingerprint, RequestKey, Result, WalletError};

/// Width of a scalar request value.
pub const WORD_LEN: usize = 32;

const ADDRESS_PADDING: usize = WORD_LEN - Address::LEN;
const THRESHOLD_PADDING: usize = WORD_LEN - 8;

fn options() -> impl Options {
    bincode::DefaultOptions::new()
        .with_fixint_encoding()
        .reject_trailing_bytes()
}

/// Serialize with the canonical bincode configuration.
pub fn to_vec<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    options()
        .serialize(value)
        .map_err(|e| WalletError::malformed(format!("Failed to encode: {e}")))
}

/// Deserialize with the canonical bincode configuration.
pub fn from_slice<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    options()
        .deserialize(bytes)
        .map_err(|e| WalletError::malformed(format!("Failed to decode: {e}")))
}

/// Turns a category `0x00` value into transaction content.
pub trait TransactionDecoder: fmt::Debug + Send + Sync {
    /// Decode `value`, failing with `MalformedValue` on bad input.
    fn decode(&self, value: &[u8]) -> Result<TransactionData>;
}

/// Bincode decoder for [`TransactionData`].
#[derive(Debug, Clone, Copy, Default)]
pub struct CanonicalDecoder;

impl TransactionDecoder for CanonicalDecoder {
    fn decode(&self, value: &[u8]) -> Result<TransactionData> {
        from_slice(value)
    }
}

/// Encode a transaction record for category `0x00`.
pub fn encode_transaction(data: &TransactionData) -> Result<Vec<u8>> {
    to_vec(data)
}

fn word(value: &[u8]) -> Result<&[u8; WORD_LEN]> {
    value.try_into().map_err(|_| {
        WalletError::malformed(format!(
            "expected {WORD_LEN}-byte word, got {} bytes",
            value.len()
        ))
    })
}

/// Fingerprints are already a word.
pub fn encode_fingerprint(fingerprint: &Fingerprint) -> Vec<u8> {
    fingerprint.as_bytes().to_vec()
}

/// Exactly one word.
pub fn decode_fingerprint(value: &[u8]) -> Result<Fingerprint> {
    Ok(Fingerprint(*word(value)?))
}

/// Left-pad an address to a word.
pub fn encode_address(address: &Address) -> Vec<u8> {
    let mut out = vec![0u8; ADDRESS_PADDING];
    out.extend_from_slice(address.as_bytes());
    out
}

/// One word with 12 zero bytes of padding.
pub fn decode_address(value: &[u8]) -> Result<Address> {
    let word = word(value)?;
    let (padding, body) = word.split_at(ADDRESS_PADDING);
    if padding.iter().any(|b| *b != 0) {
        return Err(WalletError::malformed("address word has non-zero padding"));
    }
    let mut bytes = [0u8; Address::LEN];
    bytes.copy_from_slice(body);
    Ok(Address(bytes))
}

/// Big-endian word.
pub fn encode_threshold(threshold: u64) -> Vec<u8> {
    let mut out = vec![0u8; THRESHOLD_PADDING];
    out.extend_from_slice(&threshold.to_be_bytes());
    out
}

/// Thresholds that do not fit `u64` can never be valid and are reported as
/// `InvalidRequirement`.
pub fn decode_threshold(value: &[u8]) -> Result<u64> {
    let word = word(value)?;
    let (high, low) = word.split_at(THRESHOLD_PADDING);
    if high.iter().any(|b| *b != 0) {
        return Err(WalletError::invalid_requirement("threshold exceeds u64"));
    }
    let mut bytes = [0u8; 8];
    bytes.copy_from_slice(low);
    Ok(u64::from_be_bytes(bytes))
}

/// A request value decoded into the category it addresses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MirroredChange {
    /// Key `0x00`: structured record.
    Transaction(TransactionData),
    /// Key `0x01`.
    TransactionId(Fingerprint),
    /// Key `0x02`.
    Executed(Fingerprint),
    /// Key `0x03`.
    NewConfirmation(Fingerprint),
    /// Key `0x04`.
    RevokedConfirmation(Fingerprint),
    /// Key `0x05`.
    NewOwner(Address),
    /// Key `0x06`.
    RemovedOwner(Address),
    /// Key `0x07`.
    Threshold(u64),
}

impl MirroredChange {
    /// Decode `value` according to `key`.
    pub fn decode(key: RequestKey, value: &[u8], decoder: &dyn TransactionDecoder) -> Result<Self> {
        Ok(match key {
            RequestKey::Transaction => Self::Transaction(decoder.decode(value)?),
            RequestKey::TransactionId => Self::TransactionId(decode_fingerprint(value)?),
            RequestKey::Executed => Self::Executed(decode_fingerprint(value)?),
            RequestKey::NewConfirmation => Self::NewConfirmation(decode_fingerprint(value)?),
            RequestKey::RevokedConfirmation => Self::RevokedConfirmation(decode_fingerprint(value)?),
            RequestKey::NewOwner => Self::NewOwner(decode_address(value)?),
            RequestKey::RemovedOwner => Self::RemovedOwner(decode_address(value)?),
            RequestKey::Threshold => Self::Threshold(decode_threshold(value)?),
        })
    }

    /// Category this change addresses.
    pub fn key(&self) -> RequestKey {
        match self {
            Self::Transaction(_) => RequestKey::Transaction,
            Self::TransactionId(_) => RequestKey::TransactionId,
            Self::Executed(_) => RequestKey::Executed,
            Self::NewConfirmation(_) => RequestKey::NewConfirmation,
            Self::RevokedConfirmation(_) => RequestKey::RevokedConfirmation,
            Self::NewOwner(_) => RequestKey::NewOwner,
            Self::RemovedOwner(_) => RequestKey::RemovedOwner,
            Self::Threshold(_) => RequestKey::Threshold,
        }
    }

    /// Encode back into a request value.
    pub fn encode(&self) -> Result<Vec<u8>> {
        Ok(match self {
            Self::Transaction(data) => encode_transaction(data)?,
            Self::TransactionId(fp)
            | Self::Executed(fp)
            | Self::NewConfirmation(fp)
            | Self::RevokedConfirmation(fp) => encode_fingerprint(fp),
            Self::NewOwner(address) | Self::RemovedOwner(address) => encode_address(address),
            Self::Threshold(threshold) => encode_threshold(*threshold),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tandem_core::{Amount, ErrorKind};

    #[test]
    fn test_address_word_layout() {
        let address = Address([0xab; 20]);
        let encoded = encode_address(&address);
        assert_eq!(encoded.len(), WORD_LEN);
        assert!(encoded[..12].iter().all(|b| *b == 0));
        assert_eq!(decode_address(&encoded).unwrap(), address);
    }

    #[test]
    fn test_address_padding_must_be_zero() {
        let mut encoded = encode_address(&Address([1; 20]));
        encoded[0] = 1;
        assert_eq!(decode_address(&encoded).unwrap_err().kind(), ErrorKind::MalformedValue);
    }

    #[test]
    fn test_wrong_length_is_malformed() {
        assert_eq!(decode_fingerprint(&[0u8; 31]).unwrap_err().kind(), ErrorKind::MalformedValue);
        assert_eq!(decode_threshold(&[0u8; 33]).unwrap_err().kind(), ErrorKind::MalformedValue);
    }

    #[test]
    fn test_oversized_threshold_is_invalid_requirement() {
        let mut encoded = encode_threshold(1);
        encoded[0] = 1;
        assert_eq!(decode_threshold(&encoded).unwrap_err().kind(), ErrorKind::InvalidRequirement);
        assert_eq!(decode_threshold(&encode_threshold(u64::MAX)).unwrap(), u64::MAX);
    }

    #[test]
    fn test_canonical_decoder_rejects_trailing_bytes() {
        let data = TransactionData::new(Address([3; 20]), Amount(5), vec![1, 2, 3]);
        let mut encoded = encode_transaction(&data).unwrap();
        assert_eq!(CanonicalDecoder.decode(&encoded).unwrap(), data);
        encoded.push(0);
        assert_eq!(CanonicalDecoder.decode(&encoded).unwrap_err().kind(), ErrorKind::MalformedValue);
    }

    #[test]
    fn test_change_key_matches_decode_key() {
        let fp = Fingerprint([9; 32]);
        for key in RequestKey::ALL {
            let value = match key {
                RequestKey::Transaction => {
                    encode_transaction(&TransactionData::new(Address([1; 20]), Amount(0), Vec::new()))
                        .unwrap()
                }
                RequestKey::NewOwner | RequestKey::RemovedOwner => encode_address(&Address([2; 20])),
                RequestKey::Threshold => encode_threshold(2),
                _ => encode_fingerprint(&fp),
            };
            let change = MirroredChange::decode(key, &value, &CanonicalDecoder).unwrap();
            assert_eq!(change.key(), key);
            assert_eq!(change.encode().unwrap(), value);
        }
    }
}
