//! Property tests: idempotency, confirmation counting and atomicity.

#![allow(clippy::expect_used, clippy::unwrap_used, missing_docs)]

use proptest::prelude::*;
use tandem_core::{Address, ErrorKind, Origin, RequestId, RequestKey};
use tandem_testkit::{
    address, arb_origin, arb_request_key, arb_transaction_data, raw_request, request, sample_value,
    WalletFixture,
};
use tandem_wallet::{MirroredChange, TransactionData};

/// A change for `key` that applies cleanly to a fresh 2-of-3 fixture, together
/// with the `is_exit` flag that gives it the direction it needs. Setup
/// requests use id 0, which the generated ids never hit.
fn clean_change(fx: &mut WalletFixture, key: RequestKey, origin: Origin, data: &TransactionData) -> (MirroredChange, bool) {
    let fp = data.fingerprint();
    let backward = origin == Origin::Root;
    let forward = origin == Origin::Child;
    match key {
        RequestKey::Transaction => (MirroredChange::Transaction(data.clone()), backward),
        RequestKey::TransactionId => {
            let setup = MirroredChange::Transaction(data.clone());
            fx.apply(request(Origin::Child, false, 0, Address::ZERO, &setup)).unwrap();
            (MirroredChange::TransactionId(fp), false)
        }
        RequestKey::Executed => (MirroredChange::Executed(fp), false),
        RequestKey::NewConfirmation => (MirroredChange::NewConfirmation(fp), backward),
        RequestKey::RevokedConfirmation => (MirroredChange::RevokedConfirmation(fp), forward),
        RequestKey::NewOwner => (MirroredChange::NewOwner(address(900)), false),
        RequestKey::RemovedOwner => (MirroredChange::RemovedOwner(address(901)), false),
        RequestKey::Threshold => (MirroredChange::Threshold(1), false),
    }
}

proptest! {
    #[test]
    fn second_application_is_duplicate(
        key in arb_request_key(),
        origin in arb_origin(),
        id in 1u64..1_000_000,
        data in arb_transaction_data(),
    ) {
        let mut fx = WalletFixture::new(3, 2);
        let (change, is_exit) = clean_change(&mut fx, key, origin, &data);
        let requestor = fx.owner(0);
        let req = request(origin, is_exit, id, requestor, &change);

        fx.apply(req.clone()).unwrap();
        prop_assert!(fx.state().is_applied(origin, RequestId(id)));

        let commitment = fx.commitment();
        let logged = fx.wallet.notifications().len();
        let err = fx.apply(req).unwrap_err();
        prop_assert_eq!(err.kind(), ErrorKind::DuplicateRequest);
        prop_assert_eq!(fx.commitment(), commitment);
        prop_assert_eq!(fx.wallet.notifications().len(), logged);
    }

    #[test]
    fn confirmed_iff_threshold_reached(
        threshold in 1u64..=5,
        mask in 0u8..32,
        strangers in 0u64..3,
    ) {
        let mut fx = WalletFixture::builder().owners(5).threshold(threshold).build();
        let fp = TransactionData::new(address(300), Default::default(), Vec::new()).fingerprint();

        for index in 0..5usize {
            if mask & (1 << index) != 0 {
                let owner = fx.owner(index);
                fx.replay(Origin::Child, false, owner, &MirroredChange::NewConfirmation(fp)).unwrap();
            }
        }
        // former owners keep stale confirmations that must not count
        for seed in 0..strangers {
            let stranger = address(700 + seed);
            let requestor = fx.owner(0);
            fx.replay(Origin::Child, true, requestor, &MirroredChange::NewOwner(stranger)).unwrap();
            fx.replay(Origin::Child, false, stranger, &MirroredChange::NewConfirmation(fp)).unwrap();
            fx.replay(Origin::Child, false, Address::ZERO, &MirroredChange::RemovedOwner(stranger)).unwrap();
        }

        let count = u64::from(mask.count_ones());
        prop_assert_eq!(fx.state().confirmation_count(&fp) as u64, count);
        prop_assert_eq!(fx.state().is_confirmed(&fp), count >= threshold);
    }

    #[test]
    fn rejected_requests_leave_no_trace(
        steps in prop::collection::vec(
            (arb_origin(), any::<bool>(), 0u64..8, 0u8..10, arb_transaction_data(), any::<bool>()),
            1..24,
        ),
    ) {
        let mut fx = WalletFixture::new(3, 2);
        for (origin, is_exit, id, code, data, garble) in steps {
            let value = match RequestKey::from_code(code) {
                Ok(key) if !garble => sample_value(key, &data, &data.destination),
                _ => vec![0xab; 5],
            };
            let mut req = raw_request(origin, is_exit, id, code, value);
            req.requestor = fx.owner(usize::from(code % 3));

            let commitment = fx.commitment();
            let logged = fx.wallet.notifications().len();
            if fx.apply(req).is_err() {
                prop_assert_eq!(fx.commitment(), commitment);
                prop_assert_eq!(fx.wallet.notifications().len(), logged);
            } else {
                prop_assert!(fx.state().is_applied(origin, RequestId(id)));
            }
            let owners = fx.state().owners().len() as u64;
            prop_assert!((1..=16).contains(&owners));
            prop_assert!((1..=owners).contains(&fx.state().threshold()));
        }
    }

    #[test]
    fn submissions_are_content_addressed(data in arb_transaction_data()) {
        let mut fx = WalletFixture::new(3, 3);
        let first = fx.submit_data(0, data.clone()).unwrap();
        let second = fx.submit_data(1, data.clone()).unwrap();
        prop_assert_eq!(first, second);
        prop_assert_eq!(first, data.fingerprint());
        prop_assert_eq!(fx.state().transaction_count(true, true), 1);
        prop_assert_eq!(fx.state().confirmation_count(&first), 2);
    }
}
