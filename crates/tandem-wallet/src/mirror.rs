//! Mirroring rules for replayed state changes
//!
//! A forward request (root enter, child exit) means the other ledger already
//! committed the change and this ledger is catching up. A backward request
//! (root exit, child enter) means this ledger pushes the change outward. The
//! two directions have opposite effects on toggled state so replaying a
//! change in both directions leaves both copies identical.
//!
//! | category             | forward                              | backward                          |
//! |----------------------|--------------------------------------|-----------------------------------|
//! | Transaction          | require known                        | require unknown, create           |
//! | TransactionId        | mark submitted (exit: must be new)   | mark submitted                    |
//! | Executed             | mark executed (exit: must be new)    | mark executed                     |
//! | NewConfirmation      | require set, clear                   | require unset, set, notify        |
//! | RevokedConfirmation  | require unset                        | require set, clear, notify        |
//! | NewOwner             | add if absent                        | add if absent                     |
//! | RemovedOwner         | remove if present                    | remove if present                 |
//! | Threshold            | set                                  | set, notify                       |
//!
//! Exit requests for ownership changes must come from a current owner.

use crate::codec::MirroredChange;
use crate::guards;
use crate::registry::TransactionData;
use crate::state::WalletState;
use tandem_core::{Address, Direction, Fingerprint, Notification, Result, WalletError};

impl WalletState {
    /// Apply a decoded change. Fails without mutating when a mirrored
    /// expectation does not hold.
    pub(crate) fn apply_mirrored(
        &mut self,
        change: MirroredChange,
        direction: Direction,
        is_exit: bool,
        requestor: &Address,
    ) -> Result<()> {
        match change {
            MirroredChange::Transaction(data) => self.mirror_transaction(data, direction),
            MirroredChange::TransactionId(fp) => self.mirror_transaction_id(&fp, direction, is_exit),
            MirroredChange::Executed(fp) => self.mirror_executed(fp, direction, is_exit),
            MirroredChange::NewConfirmation(fp) => self.mirror_new_confirmation(fp, direction, requestor),
            MirroredChange::RevokedConfirmation(fp) => {
                self.mirror_revoked_confirmation(&fp, direction, requestor)
            }
            MirroredChange::NewOwner(owner) => self.mirror_new_owner(owner, is_exit, requestor),
            MirroredChange::RemovedOwner(owner) => self.mirror_removed_owner(&owner, is_exit, requestor),
            MirroredChange::Threshold(threshold) => self.mirror_threshold(threshold, direction),
        }
    }

    fn mirror_transaction(&mut self, data: TransactionData, direction: Direction) -> Result<()> {
        let fingerprint = data.fingerprint();
        let known = self.registry.contains(&fingerprint);
        match direction {
            Direction::Forward if !known => Err(WalletError::mirror_violation(format!(
                "{fingerprint} must already be known"
            ))),
            Direction::Forward => Ok(()),
            Direction::Backward if known => Err(WalletError::mirror_violation(format!(
                "{fingerprint} is already known"
            ))),
            Direction::Backward => {
                self.registry.get_or_create(data);
                tracing::debug!(%fingerprint, "transaction record mirrored in");
                Ok(())
            }
        }
    }

    fn mirror_transaction_id(
        &mut self,
        fingerprint: &Fingerprint,
        direction: Direction,
        is_exit: bool,
    ) -> Result<()> {
        if direction.is_forward() && is_exit && self.registry.is_submitted(fingerprint) {
            return Err(WalletError::mirror_violation(format!(
                "{fingerprint} is already submitted"
            )));
        }
        if self.registry.mark_submitted(fingerprint)? {
            tracing::debug!(%fingerprint, "transaction id mirrored in");
            self.emit(Notification::Submission {
                fingerprint: *fingerprint,
            });
        }
        Ok(())
    }

    fn mirror_executed(&mut self, fingerprint: Fingerprint, direction: Direction, is_exit: bool) -> Result<()> {
        if direction.is_forward() && is_exit && self.registry.is_executed(&fingerprint) {
            return Err(WalletError::mirror_violation(format!(
                "{fingerprint} is already executed"
            )));
        }
        if self.registry.mark_executed(fingerprint) {
            tracing::info!(%fingerprint, "execution mirrored in");
            self.emit(Notification::ExecutionAdded { fingerprint });
        }
        Ok(())
    }

    fn mirror_new_confirmation(
        &mut self,
        fingerprint: Fingerprint,
        direction: Direction,
        requestor: &Address,
    ) -> Result<()> {
        guards::require_not_executed(&self.registry, &fingerprint)?;
        match direction {
            Direction::Forward => {
                guards::require_confirmed(&self.confirmations, &fingerprint, requestor)?;
                self.confirmations.clear(&fingerprint, requestor);
                tracing::debug!(%fingerprint, owner = %requestor, "mirrored confirmation cleared");
            }
            Direction::Backward => {
                guards::require_owner(&self.owners, requestor)?;
                guards::require_not_confirmed(&self.confirmations, &fingerprint, requestor)?;
                self.confirmations.set(fingerprint, *requestor);
                tracing::debug!(%fingerprint, owner = %requestor, "confirmation mirrored in");
                self.emit(Notification::Confirmation {
                    owner: *requestor,
                    fingerprint,
                });
            }
        }
        Ok(())
    }

    fn mirror_revoked_confirmation(
        &mut self,
        fingerprint: &Fingerprint,
        direction: Direction,
        requestor: &Address,
    ) -> Result<()> {
        guards::require_not_executed(&self.registry, fingerprint)?;
        match direction {
            Direction::Forward => {
                guards::require_not_confirmed(&self.confirmations, fingerprint, requestor)?;
            }
            Direction::Backward => {
                guards::require_confirmed(&self.confirmations, fingerprint, requestor)?;
                self.confirmations.clear(fingerprint, requestor);
                tracing::debug!(%fingerprint, owner = %requestor, "revocation mirrored in");
                self.emit(Notification::Revocation {
                    owner: *requestor,
                    fingerprint: *fingerprint,
                });
            }
        }
        Ok(())
    }

    fn mirror_new_owner(&mut self, owner: Address, is_exit: bool, requestor: &Address) -> Result<()> {
        if is_exit {
            guards::require_exit_requestor(&self.owners, requestor)?;
        }
        if self.owners.contains(&owner) {
            return Ok(());
        }
        self.owners.add(owner)?;
        tracing::info!(%owner, "owner mirrored in");
        self.emit(Notification::OwnerAddition { owner });
        Ok(())
    }

    fn mirror_removed_owner(&mut self, owner: &Address, is_exit: bool, requestor: &Address) -> Result<()> {
        if is_exit {
            guards::require_exit_requestor(&self.owners, requestor)?;
        }
        if !self.owners.contains(owner) {
            return Ok(());
        }
        self.remove_owner_unchecked(owner)
    }

    fn mirror_threshold(&mut self, threshold: u64, direction: Direction) -> Result<()> {
        self.owners.set_threshold(threshold)?;
        tracing::info!(threshold, ?direction, "threshold mirrored in");
        if !direction.is_forward() {
            self.emit(Notification::RequirementChange { threshold });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::owners::OwnerSet;
    use tandem_core::{Amount, ErrorKind};

    fn addr(seed: u8) -> Address {
        Address([seed; 20])
    }

    fn state() -> WalletState {
        WalletState::new(OwnerSet::new(vec![addr(1), addr(2), addr(3)], 2).unwrap())
    }

    fn data() -> TransactionData {
        TransactionData::new(addr(0xd0), Amount(1), vec![0xca, 0xfe])
    }

    #[test]
    fn test_transaction_backward_then_forward() {
        let mut s = state();
        let change = MirroredChange::Transaction(data());
        assert_eq!(
            s.apply_mirrored(change.clone(), Direction::Forward, false, &addr(1))
                .unwrap_err()
                .kind(),
            ErrorKind::MirrorInvariantViolation
        );
        s.apply_mirrored(change.clone(), Direction::Backward, false, &addr(1))
            .unwrap();
        assert!(s.registry.contains(&data().fingerprint()));
        assert!(!s.registry.is_submitted(&data().fingerprint()));
        s.apply_mirrored(change.clone(), Direction::Forward, false, &addr(1))
            .unwrap();
        assert!(s
            .apply_mirrored(change, Direction::Backward, false, &addr(1))
            .is_err());
    }

    #[test]
    fn test_transaction_id_requires_record() {
        let mut s = state();
        let fp = data().fingerprint();
        assert_eq!(
            s.apply_mirrored(MirroredChange::TransactionId(fp), Direction::Backward, false, &addr(1))
                .unwrap_err()
                .kind(),
            ErrorKind::NotFound
        );
    }

    #[test]
    fn test_executed_exit_forbids_remarking() {
        let mut s = state();
        let fp = data().fingerprint();
        s.apply_mirrored(MirroredChange::Executed(fp), Direction::Forward, true, &addr(1))
            .unwrap();
        assert_eq!(
            s.notifications(),
            &[Notification::ExecutionAdded { fingerprint: fp }]
        );
        assert!(s
            .apply_mirrored(MirroredChange::Executed(fp), Direction::Forward, true, &addr(1))
            .is_err());
        // enter direction stays idempotent
        s.apply_mirrored(MirroredChange::Executed(fp), Direction::Forward, false, &addr(1))
            .unwrap();
        assert_eq!(s.notifications().len(), 1);
    }

    #[test]
    fn test_confirmation_toggle_restores_commitment() {
        let mut s = state();
        let fp = data().fingerprint();
        let before = s.commitment();
        s.apply_mirrored(MirroredChange::NewConfirmation(fp), Direction::Backward, false, &addr(2))
            .unwrap();
        assert!(s.is_confirmed_by(&fp, &addr(2)));
        s.apply_mirrored(MirroredChange::NewConfirmation(fp), Direction::Forward, false, &addr(2))
            .unwrap();
        assert_eq!(s.commitment(), before);
    }

    #[test]
    fn test_backward_confirmation_requires_owner() {
        let mut s = state();
        let fp = data().fingerprint();
        assert_eq!(
            s.apply_mirrored(MirroredChange::NewConfirmation(fp), Direction::Backward, false, &addr(9))
                .unwrap_err()
                .kind(),
            ErrorKind::Unauthorized
        );
    }

    #[test]
    fn test_confirmation_frozen_after_execution() {
        let mut s = state();
        let fp = data().fingerprint();
        s.registry.mark_executed(fp);
        assert!(s
            .apply_mirrored(MirroredChange::NewConfirmation(fp), Direction::Backward, false, &addr(1))
            .is_err());
        assert!(s
            .apply_mirrored(MirroredChange::RevokedConfirmation(fp), Direction::Forward, false, &addr(1))
            .is_err());
    }

    #[test]
    fn test_exit_owner_change_requires_owner_requestor() {
        let mut s = state();
        for direction in [Direction::Forward, Direction::Backward] {
            assert_eq!(
                s.apply_mirrored(MirroredChange::NewOwner(addr(7)), direction, true, &addr(8))
                    .unwrap_err()
                    .kind(),
                ErrorKind::Unauthorized
            );
        }
        s.apply_mirrored(MirroredChange::NewOwner(addr(7)), Direction::Forward, true, &addr(1))
            .unwrap();
        assert!(s.is_owner(&addr(7)));
    }

    #[test]
    fn test_owner_changes_are_idempotent() {
        let mut s = state();
        s.apply_mirrored(MirroredChange::NewOwner(addr(1)), Direction::Backward, false, &addr(9))
            .unwrap();
        s.apply_mirrored(MirroredChange::RemovedOwner(addr(9)), Direction::Forward, false, &addr(9))
            .unwrap();
        assert!(s.notifications().is_empty());
        assert_eq!(s.owners(), &[addr(1), addr(2), addr(3)]);
    }

    #[test]
    fn test_threshold_validated_and_notified_backward_only() {
        let mut s = state();
        assert_eq!(
            s.apply_mirrored(MirroredChange::Threshold(4), Direction::Forward, false, &addr(1))
                .unwrap_err()
                .kind(),
            ErrorKind::InvalidRequirement
        );
        s.apply_mirrored(MirroredChange::Threshold(3), Direction::Forward, false, &addr(1))
            .unwrap();
        assert!(s.notifications().is_empty());
        s.apply_mirrored(MirroredChange::Threshold(1), Direction::Backward, false, &addr(1))
            .unwrap();
        assert_eq!(
            s.notifications(),
            &[Notification::RequirementChange { threshold: 1 }]
        );
    }
}
