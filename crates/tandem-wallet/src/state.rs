//! Wallet state and read accessors
//!
//! `WalletState` is the single state object owned by one ledger's wallet. The
//! operations that mutate it live next to their concern (`multisig`, `mirror`,
//! `router`, `admin`) as further `impl WalletState` blocks.

use crate::owners::{ConfirmationMatrix, OwnerSet};
use crate::registry::{TransactionRecord, TransactionRegistry};
use crate::router::AppliedRequests;
use tandem_core::hash::{self, Hasher};
use tandem_core::{Address, Fingerprint, LogCheckpoint, Notification, NotificationLog, Origin, RequestId};

const COMMITMENT_DOMAIN: &[u8] = b"tandem/state/v1";

/// Complete wallet state on one ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WalletState {
    pub(crate) registry: TransactionRegistry,
    pub(crate) confirmations: ConfirmationMatrix,
    pub(crate) owners: OwnerSet,
    pub(crate) applied: AppliedRequests,
    pub(crate) notifications: NotificationLog,
}

/// Saved state for restoring after an aborted transition.
#[derive(Debug)]
pub(crate) struct Snapshot {
    registry: TransactionRegistry,
    confirmations: ConfirmationMatrix,
    owners: OwnerSet,
    applied: AppliedRequests,
    log: LogCheckpoint,
}

impl WalletState {
    pub(crate) fn new(owners: OwnerSet) -> Self {
        Self {
            registry: TransactionRegistry::new(),
            confirmations: ConfirmationMatrix::new(),
            owners,
            applied: AppliedRequests::new(),
            notifications: NotificationLog::new(),
        }
    }

    pub(crate) fn snapshot(&self) -> Snapshot {
        Snapshot {
            registry: self.registry.clone(),
            confirmations: self.confirmations.clone(),
            owners: self.owners.clone(),
            applied: self.applied.clone(),
            log: self.notifications.checkpoint(),
        }
    }

    pub(crate) fn restore(&mut self, snapshot: Snapshot) {
        self.registry = snapshot.registry;
        self.confirmations = snapshot.confirmations;
        self.owners = snapshot.owners;
        self.applied = snapshot.applied;
        self.notifications.rollback(snapshot.log);
    }

    pub(crate) fn emit(&mut self, notification: Notification) {
        self.notifications.emit(notification);
    }

    /// Whether `address` is a current owner.
    pub fn is_owner(&self, address: &Address) -> bool {
        self.owners.contains(address)
    }

    /// Owners in set order.
    pub fn owners(&self) -> &[Address] {
        self.owners.owners()
    }

    /// Current confirmation threshold.
    pub fn threshold(&self) -> u64 {
        self.owners.threshold()
    }

    /// Transaction records, history and executed set.
    pub fn registry(&self) -> &TransactionRegistry {
        &self.registry
    }

    /// True once at least `threshold` current owners have confirmed.
    ///
    /// Owners are walked in set order and counting stops at the first match
    /// that reaches the threshold.
    pub fn is_confirmed(&self, fingerprint: &Fingerprint) -> bool {
        let threshold = self.owners.threshold();
        let mut count = 0u64;
        for owner in self.owners.owners() {
            if self.confirmations.is_confirmed_by(fingerprint, owner) {
                count += 1;
            }
            if count == threshold {
                return true;
            }
        }
        false
    }

    /// Confirmations from current owners.
    pub fn confirmation_count(&self, fingerprint: &Fingerprint) -> usize {
        self.owners
            .owners()
            .iter()
            .filter(|owner| self.confirmations.is_confirmed_by(fingerprint, owner))
            .count()
    }

    /// Current owners that confirmed, in set order.
    pub fn confirmations(&self, fingerprint: &Fingerprint) -> Vec<Address> {
        self.owners
            .owners()
            .iter()
            .filter(|owner| self.confirmations.is_confirmed_by(fingerprint, owner))
            .copied()
            .collect()
    }

    /// Raw matrix entry, including stale entries of removed owners.
    pub fn is_confirmed_by(&self, fingerprint: &Fingerprint, owner: &Address) -> bool {
        self.confirmations.is_confirmed_by(fingerprint, owner)
    }

    /// Whether `fingerprint` is marked executed.
    pub fn is_executed(&self, fingerprint: &Fingerprint) -> bool {
        self.registry.is_executed(fingerprint)
    }

    /// Stored record, if any.
    pub fn transaction(&self, fingerprint: &Fingerprint) -> Option<&TransactionRecord> {
        self.registry.get(fingerprint)
    }

    fn history_filtered(
        &self,
        include_pending: bool,
        include_executed: bool,
    ) -> impl Iterator<Item = &Fingerprint> {
        self.registry.history().iter().filter(move |fp| {
            let executed = self.registry.is_executed(fp);
            (include_pending && !executed) || (include_executed && executed)
        })
    }

    /// Submitted transactions matching the filters.
    pub fn transaction_count(&self, include_pending: bool, include_executed: bool) -> usize {
        self.history_filtered(include_pending, include_executed).count()
    }

    /// Submitted transactions matching the filters, positions `from..to` of the
    /// filtered history. Out-of-range bounds are clamped.
    pub fn transaction_ids(
        &self,
        from: usize,
        to: usize,
        include_pending: bool,
        include_executed: bool,
    ) -> Vec<Fingerprint> {
        let take = to.saturating_sub(from);
        self.history_filtered(include_pending, include_executed)
            .skip(from)
            .take(take)
            .copied()
            .collect()
    }

    /// Whether a request from `origin` with this id succeeded.
    pub fn is_applied(&self, origin: Origin, request_id: RequestId) -> bool {
        self.applied.contains(origin, request_id)
    }

    /// Notifications emitted and not yet drained.
    pub fn notifications(&self) -> &[Notification] {
        self.notifications.entries()
    }

    /// Deterministic digest of the whole state, excluding notifications.
    pub fn commitment(&self) -> [u8; 32] {
        let mut hasher = hash::hasher();
        hasher.update(COMMITMENT_DOMAIN);

        update_len(&mut *hasher, self.registry.record_count());
        for (fingerprint, record) in self.registry.records() {
            hasher.update(fingerprint.as_bytes());
            hasher.update(record.data.destination.as_bytes());
            hasher.update(&record.data.value.0.to_be_bytes());
            update_len(&mut *hasher, record.data.payload.len());
            hasher.update(&record.data.payload);
            hasher.update(&[u8::from(record.submitted)]);
        }

        update_len(&mut *hasher, self.registry.history().len());
        for fingerprint in self.registry.history() {
            hasher.update(fingerprint.as_bytes());
        }

        let executed: Vec<_> = self.registry.executed().collect();
        update_len(&mut *hasher, executed.len());
        for fingerprint in executed {
            hasher.update(fingerprint.as_bytes());
        }

        for (fingerprint, owners) in self.confirmations.iter() {
            hasher.update(fingerprint.as_bytes());
            update_len(&mut *hasher, owners.len());
            for owner in owners {
                hasher.update(owner.as_bytes());
            }
        }

        update_len(&mut *hasher, self.owners.len());
        for owner in self.owners.owners() {
            hasher.update(owner.as_bytes());
        }
        hasher.update(&self.owners.threshold().to_be_bytes());

        for (origin, request_id) in self.applied.iter() {
            hasher.update(&[origin.tag()]);
            hasher.update(&request_id.0.to_be_bytes());
        }

        hasher.finalize()
    }
}

fn update_len(hasher: &mut dyn Hasher, len: usize) {
    hasher.update(&(len as u64).to_be_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::TransactionData;
    use tandem_core::Amount;

    fn addr(seed: u8) -> Address {
        Address([seed; 20])
    }

    fn state(threshold: u64) -> WalletState {
        WalletState::new(OwnerSet::new(vec![addr(1), addr(2), addr(3)], threshold).unwrap())
    }

    #[test]
    fn test_is_confirmed_counts_current_owners_only() {
        let mut s = state(2);
        let fp = Fingerprint([1; 32]);
        s.confirmations.set(fp, addr(1));
        s.confirmations.set(fp, addr(9));
        assert!(!s.is_confirmed(&fp));
        assert_eq!(s.confirmation_count(&fp), 1);
        s.confirmations.set(fp, addr(3));
        assert!(s.is_confirmed(&fp));
        assert_eq!(s.confirmations(&fp), vec![addr(1), addr(3)]);
    }

    #[test]
    fn test_transaction_ids_filters_and_clamps() {
        let mut s = state(1);
        let mut fps = Vec::new();
        for seed in 1..=3u8 {
            let (fp, _) = s
                .registry
                .get_or_create(TransactionData::new(addr(seed), Amount::ZERO, Vec::new()));
            s.registry.mark_submitted(&fp).unwrap();
            fps.push(fp);
        }
        s.registry.mark_executed(fps[1]);

        assert_eq!(s.transaction_count(true, false), 2);
        assert_eq!(s.transaction_count(false, true), 1);
        assert_eq!(s.transaction_ids(0, 10, true, true), fps);
        assert_eq!(s.transaction_ids(1, 2, true, false), vec![fps[2]]);
        assert!(s.transaction_ids(5, 2, true, true).is_empty());
    }

    #[test]
    fn test_commitment_ignores_notifications() {
        let mut s = state(2);
        let before = s.commitment();
        s.emit(Notification::RequirementChange { threshold: 2 });
        assert_eq!(s.commitment(), before);
        s.owners.set_threshold(3).unwrap();
        assert_ne!(s.commitment(), before);
    }

    #[test]
    fn test_snapshot_restore() {
        let mut s = state(2);
        let snapshot = s.snapshot();
        let before = s.clone();
        s.confirmations.set(Fingerprint([2; 32]), addr(1));
        s.emit(Notification::OwnerAddition { owner: addr(4) });
        s.restore(snapshot);
        assert_eq!(s, before);
    }
}
