//! Request builders

use tandem_core::{Address, Fingerprint, Origin, Request, RequestId, RequestKey};
use tandem_wallet::codec;
use tandem_wallet::{MirroredChange, TransactionData};

/// Canonical encoding of a transaction record (key `0x00`).
pub fn transaction_value(data: &TransactionData) -> Vec<u8> {
    codec::encode_transaction(data).expect("transaction data always encodes")
}

/// Fingerprint word (keys `0x01..=0x04`).
pub fn fingerprint_value(fingerprint: &Fingerprint) -> Vec<u8> {
    codec::encode_fingerprint(fingerprint)
}

/// Padded address word (keys `0x05`, `0x06`).
pub fn address_value(address: &Address) -> Vec<u8> {
    codec::encode_address(address)
}

/// Big-endian threshold word (key `0x07`).
pub fn threshold_value(threshold: u64) -> Vec<u8> {
    codec::encode_threshold(threshold)
}

/// Build a request carrying `change`.
pub fn request(
    origin: Origin,
    is_exit: bool,
    request_id: u64,
    requestor: Address,
    change: &MirroredChange,
) -> Request {
    Request {
        origin,
        is_exit,
        request_id: RequestId(request_id),
        requestor,
        key: change.key().code(),
        value: change.encode().expect("mirrored change always encodes"),
    }
}

/// Build a request with a raw key and value.
pub fn raw_request(origin: Origin, is_exit: bool, request_id: u64, key: u8, value: Vec<u8>) -> Request {
    Request {
        origin,
        is_exit,
        request_id: RequestId(request_id),
        requestor: Address::ZERO,
        key,
        value,
    }
}

/// A well-formed value for `key`, referring to `data` or `address`.
pub fn sample_value(key: RequestKey, data: &TransactionData, address: &Address) -> Vec<u8> {
    match key {
        RequestKey::Transaction => transaction_value(data),
        RequestKey::TransactionId
        | RequestKey::Executed
        | RequestKey::NewConfirmation
        | RequestKey::RevokedConfirmation => fingerprint_value(&data.fingerprint()),
        RequestKey::NewOwner | RequestKey::RemovedOwner => address_value(address),
        RequestKey::Threshold => threshold_value(1),
    }
}
