//! Property test strategies for Tandem types

use proptest::prelude::*;

pub use proptest;

use crate::fixtures::address;
use tandem_core::{Address, Amount, Origin, RequestKey};
use tandem_wallet::TransactionData;

/// Deterministic non-null addresses drawn from a small seed space so
/// generated values collide often enough to exercise duplicates.
pub fn arb_address() -> impl Strategy<Value = Address> {
    (0u64..64).prop_map(address)
}

/// Zero or a small positive amount.
pub fn arb_amount() -> impl Strategy<Value = Amount> {
    prop_oneof![Just(Amount::ZERO), (1u128..1_000_000).prop_map(Amount)]
}

/// Non-placeholder transaction content.
pub fn arb_transaction_data() -> impl Strategy<Value = TransactionData> {
    (arb_address(), arb_amount(), prop::collection::vec(any::<u8>(), 0..16))
        .prop_map(|(destination, value, payload)| TransactionData::new(destination, value, payload))
}

/// Either ledger.
pub fn arb_origin() -> impl Strategy<Value = Origin> {
    prop_oneof![Just(Origin::Root), Just(Origin::Child)]
}

/// Any of the eight reserved categories.
pub fn arb_request_key() -> impl Strategy<Value = RequestKey> {
    prop::sample::select(RequestKey::ALL.to_vec())
}
