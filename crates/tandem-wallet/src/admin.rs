//! Owner and threshold management
//!
//! These mutators only accept the wallet itself as caller. The only way to
//! reach them is an executed multisig transaction addressed to the wallet,
//! whose payload is an encoded [`AdminCall`].

use crate::codec;
use crate::guards;
use crate::state::WalletState;
use serde::{Deserialize, Serialize};
use tandem_core::{Address, Notification, Result};

/// Owner management call carried in a self-addressed transaction payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum AdminCall {
    /// Add an owner; the threshold is unchanged.
    AddOwner {
        /// New owner
        owner: Address,
    },
    /// Remove an owner, clamping the threshold to the new owner count.
    RemoveOwner {
        /// Owner to remove
        owner: Address,
    },
    /// Swap one owner for another in the same slot.
    ReplaceOwner {
        /// Current owner
        old: Address,
        /// Replacement
        new: Address,
    },
    /// Set the confirmation threshold.
    ChangeThreshold {
        /// New threshold
        threshold: u64,
    },
}

impl AdminCall {
    /// Payload bytes for a self-addressed transaction.
    pub fn encode(&self) -> Result<Vec<u8>> {
        codec::to_vec(self)
    }

    /// Decode a self-call payload; trailing bytes are rejected.
    pub fn decode(payload: &[u8]) -> Result<Self> {
        codec::from_slice(payload)
    }
}

impl WalletState {
    pub(crate) fn apply_admin(&mut self, wallet: &Address, call: AdminCall) -> Result<()> {
        match call {
            AdminCall::AddOwner { owner } => self.add_owner(wallet, wallet, owner),
            AdminCall::RemoveOwner { owner } => self.remove_owner(wallet, wallet, &owner),
            AdminCall::ReplaceOwner { old, new } => self.replace_owner(wallet, wallet, &old, new),
            AdminCall::ChangeThreshold { threshold } => {
                self.change_threshold(wallet, wallet, threshold)
            }
        }
    }

    pub(crate) fn add_owner(&mut self, wallet: &Address, caller: &Address, owner: Address) -> Result<()> {
        guards::require_self(caller, wallet)?;
        self.owners.add(owner)?;
        tracing::info!(%owner, owners = self.owners.len(), "owner added");
        self.emit(Notification::OwnerAddition { owner });
        Ok(())
    }

    pub(crate) fn remove_owner(&mut self, wallet: &Address, caller: &Address, owner: &Address) -> Result<()> {
        guards::require_self(caller, wallet)?;
        self.remove_owner_unchecked(owner)
    }

    /// Remove an owner, clamping the threshold to the new owner count.
    pub(crate) fn remove_owner_unchecked(&mut self, owner: &Address) -> Result<()> {
        if let Some(threshold) = self.owners.remove(owner)? {
            tracing::info!(threshold, "threshold clamped to owner count");
            self.emit(Notification::RequirementChange { threshold });
        }
        tracing::info!(%owner, owners = self.owners.len(), "owner removed");
        self.emit(Notification::OwnerRemoval { owner: *owner });
        Ok(())
    }

    pub(crate) fn replace_owner(
        &mut self,
        wallet: &Address,
        caller: &Address,
        old: &Address,
        new: Address,
    ) -> Result<()> {
        guards::require_self(caller, wallet)?;
        self.owners.replace(old, new)?;
        tracing::info!(%old, %new, "owner replaced");
        self.emit(Notification::OwnerRemoval { owner: *old });
        self.emit(Notification::OwnerAddition { owner: new });
        Ok(())
    }

    pub(crate) fn change_threshold(&mut self, wallet: &Address, caller: &Address, threshold: u64) -> Result<()> {
        guards::require_self(caller, wallet)?;
        self.owners.set_threshold(threshold)?;
        tracing::info!(threshold, "threshold changed");
        self.emit(Notification::RequirementChange { threshold });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::owners::OwnerSet;
    use tandem_core::ErrorKind;

    const WALLET: Address = Address([0xee; 20]);

    fn addr(seed: u8) -> Address {
        Address([seed; 20])
    }

    fn state() -> WalletState {
        WalletState::new(OwnerSet::new(vec![addr(1), addr(2), addr(3)], 3).unwrap())
    }

    #[test]
    fn test_only_wallet_may_manage_owners() {
        let mut s = state();
        for caller in [addr(1), addr(9)] {
            assert_eq!(
                s.add_owner(&WALLET, &caller, addr(4)).unwrap_err().kind(),
                ErrorKind::Unauthorized
            );
            assert_eq!(
                s.change_threshold(&WALLET, &caller, 1).unwrap_err().kind(),
                ErrorKind::Unauthorized
            );
        }
        assert!(s.notifications().is_empty());
    }

    #[test]
    fn test_remove_emits_clamp_before_removal() {
        let mut s = state();
        s.apply_admin(&WALLET, AdminCall::RemoveOwner { owner: addr(2) })
            .unwrap();
        assert_eq!(s.threshold(), 2);
        assert_eq!(
            s.notifications(),
            &[
                Notification::RequirementChange { threshold: 2 },
                Notification::OwnerRemoval { owner: addr(2) },
            ]
        );
    }

    #[test]
    fn test_admin_call_encoding() {
        let call = AdminCall::ReplaceOwner {
            old: addr(1),
            new: addr(5),
        };
        let bytes = call.encode().unwrap();
        assert_eq!(AdminCall::decode(&bytes).unwrap(), call);
        assert_eq!(
            AdminCall::decode(&[0xff; 3]).unwrap_err().kind(),
            ErrorKind::MalformedValue
        );
    }
}
