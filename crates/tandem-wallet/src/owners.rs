//! Owner set, confirmation threshold and confirmation matrix
//!
//! Owners are kept in insertion order because confirmation counting walks the
//! set in order and removal swaps the last owner into the vacated slot.

use std::collections::{BTreeMap, BTreeSet};
use tandem_core::{Address, Fingerprint, Result, WalletError, MAX_OWNER_COUNT};

/// Check that `threshold` is valid for `owner_count` owners.
///
/// Valid means `1 <= threshold <= owner_count <= MAX_OWNER_COUNT`.
pub fn check_requirement(owner_count: usize, threshold: u64) -> Result<()> {
    if owner_count == 0 || owner_count > MAX_OWNER_COUNT {
        return Err(WalletError::invalid_requirement(format!(
            "owner count {owner_count} outside 1..={MAX_OWNER_COUNT}"
        )));
    }
    if threshold == 0 || threshold > owner_count as u64 {
        return Err(WalletError::invalid_requirement(format!(
            "threshold {threshold} outside 1..={owner_count}"
        )));
    }
    Ok(())
}

/// Ordered set of distinct non-null owners plus the confirmation threshold.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OwnerSet {
    owners: Vec<Address>,
    threshold: u64,
}

impl OwnerSet {
    /// Build the genesis owner set.
    pub fn new(owners: Vec<Address>, threshold: u64) -> Result<Self> {
        check_requirement(owners.len(), threshold)?;
        let mut seen = BTreeSet::new();
        for owner in &owners {
            if owner.is_zero() {
                return Err(WalletError::invalid_requirement("null address cannot be an owner"));
            }
            if !seen.insert(*owner) {
                return Err(WalletError::invalid_requirement(format!(
                    "duplicate owner {owner}"
                )));
            }
        }
        Ok(Self { owners, threshold })
    }

    /// Membership test.
    pub fn contains(&self, address: &Address) -> bool {
        self.owners.contains(address)
    }

    /// Owners in set order.
    pub fn owners(&self) -> &[Address] {
        &self.owners
    }

    /// Number of owners.
    pub fn len(&self) -> usize {
        self.owners.len()
    }

    /// Never true for a validated set.
    pub fn is_empty(&self) -> bool {
        self.owners.is_empty()
    }

    /// Confirmations required to execute.
    pub fn threshold(&self) -> u64 {
        self.threshold
    }

    /// Validate adding `owner` without mutating.
    pub fn check_add(&self, owner: &Address) -> Result<()> {
        if owner.is_zero() {
            return Err(WalletError::invalid_requirement("null address cannot be an owner"));
        }
        if self.contains(owner) {
            return Err(WalletError::invalid_requirement(format!("{owner} is already an owner")));
        }
        check_requirement(self.owners.len() + 1, self.threshold)
    }

    /// Append `owner`.
    pub fn add(&mut self, owner: Address) -> Result<()> {
        self.check_add(&owner)?;
        self.owners.push(owner);
        Ok(())
    }

    /// Validate removing `owner` without mutating.
    pub fn check_remove(&self, owner: &Address) -> Result<()> {
        if !self.contains(owner) {
            return Err(WalletError::invalid_requirement(format!("{owner} is not an owner")));
        }
        if self.owners.len() == 1 {
            return Err(WalletError::invalid_requirement("cannot remove the last owner"));
        }
        Ok(())
    }

    /// Remove `owner` by swapping the last owner into its slot.
    ///
    /// Returns the new threshold when it had to be clamped to the new owner count.
    pub fn remove(&mut self, owner: &Address) -> Result<Option<u64>> {
        self.check_remove(owner)?;
        if let Some(index) = self.owners.iter().position(|o| o == owner) {
            self.owners.swap_remove(index);
        }
        let remaining = self.owners.len() as u64;
        if self.threshold > remaining {
            self.threshold = remaining;
            return Ok(Some(remaining));
        }
        Ok(None)
    }

    /// Validate replacing `old` with `new` without mutating.
    pub fn check_replace(&self, old: &Address, new: &Address) -> Result<()> {
        if !self.contains(old) {
            return Err(WalletError::invalid_requirement(format!("{old} is not an owner")));
        }
        if new.is_zero() {
            return Err(WalletError::invalid_requirement("null address cannot be an owner"));
        }
        if self.contains(new) {
            return Err(WalletError::invalid_requirement(format!("{new} is already an owner")));
        }
        Ok(())
    }

    /// Replace `old` with `new` in place, preserving set order.
    pub fn replace(&mut self, old: &Address, new: Address) -> Result<()> {
        self.check_replace(old, &new)?;
        if let Some(slot) = self.owners.iter_mut().find(|o| *o == old) {
            *slot = new;
        }
        Ok(())
    }

    /// Set the threshold within `1..=len`.
    pub fn set_threshold(&mut self, threshold: u64) -> Result<()> {
        check_requirement(self.owners.len(), threshold)?;
        self.threshold = threshold;
        Ok(())
    }
}

/// Per-transaction confirmations by owner.
///
/// Entries are not cleared when an owner is removed; counting only looks at
/// current owners, so stale entries are inert.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfirmationMatrix {
    entries: BTreeMap<Fingerprint, BTreeSet<Address>>,
}

impl ConfirmationMatrix {
    /// Empty matrix.
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether `owner` has an entry for `fingerprint`, current owner or not.
    pub fn is_confirmed_by(&self, fingerprint: &Fingerprint, owner: &Address) -> bool {
        self.entries
            .get(fingerprint)
            .is_some_and(|owners| owners.contains(owner))
    }

    /// Returns `true` if the entry was newly set.
    pub fn set(&mut self, fingerprint: Fingerprint, owner: Address) -> bool {
        self.entries.entry(fingerprint).or_default().insert(owner)
    }

    /// Returns `true` if an entry was cleared.
    pub fn clear(&mut self, fingerprint: &Fingerprint, owner: &Address) -> bool {
        let Some(owners) = self.entries.get_mut(fingerprint) else {
            return false;
        };
        let removed = owners.remove(owner);
        if owners.is_empty() {
            self.entries.remove(fingerprint);
        }
        removed
    }

    /// Addresses with a set confirmation, including former owners.
    pub fn confirmers(&self, fingerprint: &Fingerprint) -> impl Iterator<Item = &Address> {
        self.entries.get(fingerprint).into_iter().flatten()
    }

    pub(crate) fn iter(&self) -> impl Iterator<Item = (&Fingerprint, &BTreeSet<Address>)> {
        self.entries.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(seed: u8) -> Address {
        Address([seed; 20])
    }

    #[test]
    fn test_requirement_bounds() {
        assert!(check_requirement(1, 1).is_ok());
        assert!(check_requirement(16, 16).is_ok());
        assert!(check_requirement(0, 0).is_err());
        assert!(check_requirement(3, 0).is_err());
        assert!(check_requirement(3, 4).is_err());
        assert!(check_requirement(17, 1).is_err());
    }

    #[test]
    fn test_genesis_rejects_null_and_duplicates() {
        assert!(OwnerSet::new(vec![addr(1), Address::ZERO], 1).is_err());
        assert!(OwnerSet::new(vec![addr(1), addr(1)], 1).is_err());
        assert!(OwnerSet::new(vec![addr(1), addr(2)], 2).is_ok());
    }

    #[test]
    fn test_add_respects_max_owner_count() {
        let owners: Vec<Address> = (1..=16).map(addr).collect();
        let mut set = OwnerSet::new(owners, 1).unwrap();
        assert!(set.add(addr(17)).is_err());
        assert_eq!(set.len(), 16);
    }

    #[test]
    fn test_remove_swaps_last_into_slot() {
        let mut set = OwnerSet::new(vec![addr(1), addr(2), addr(3), addr(4)], 2).unwrap();
        assert_eq!(set.remove(&addr(2)).unwrap(), None);
        assert_eq!(set.owners(), &[addr(1), addr(4), addr(3)]);
    }

    #[test]
    fn test_remove_clamps_threshold() {
        let mut set = OwnerSet::new(vec![addr(1), addr(2), addr(3)], 3).unwrap();
        assert_eq!(set.remove(&addr(1)).unwrap(), Some(2));
        assert_eq!(set.threshold(), 2);
    }

    #[test]
    fn test_cannot_remove_last_owner() {
        let mut set = OwnerSet::new(vec![addr(1)], 1).unwrap();
        assert!(set.remove(&addr(1)).is_err());
        assert_eq!(set.owners(), &[addr(1)]);
    }

    #[test]
    fn test_replace_preserves_order() {
        let mut set = OwnerSet::new(vec![addr(1), addr(2), addr(3)], 2).unwrap();
        set.replace(&addr(2), addr(9)).unwrap();
        assert_eq!(set.owners(), &[addr(1), addr(9), addr(3)]);
        assert!(set.replace(&addr(1), addr(3)).is_err());
    }

    #[test]
    fn test_confirmation_clear_leaves_no_empty_entries() {
        let fp = Fingerprint([7; 32]);
        let mut matrix = ConfirmationMatrix::new();
        assert!(matrix.set(fp, addr(1)));
        assert!(!matrix.set(fp, addr(1)));
        assert!(matrix.clear(&fp, &addr(1)));
        assert!(!matrix.clear(&fp, &addr(1)));
        assert_eq!(matrix, ConfirmationMatrix::new());
    }
}
