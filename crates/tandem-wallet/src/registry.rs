//! Content-addressed transaction storage
//!
//! Pure data: records keyed by fingerprint, the append-only submission history,
//! and the executed set. No authorization or mirroring decisions are made here.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tandem_core::{Address, Amount, ExecutedView, Fingerprint, Result, WalletError};

/// The content of a proposed transaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TransactionData {
    /// Target account.
    pub destination: Address,
    /// Value transferred.
    pub value: Amount,
    /// Opaque call data.
    pub payload: Vec<u8>,
}

impl TransactionData {
    /// Create transaction content.
    pub fn new(destination: Address, value: Amount, payload: impl Into<Vec<u8>>) -> Self {
        Self {
            destination,
            value,
            payload: payload.into(),
        }
    }

    /// Content fingerprint.
    pub fn fingerprint(&self) -> Fingerprint {
        Fingerprint::of(&self.destination, self.value, &self.payload)
    }

    /// True iff there is no destination, no value and no payload.
    ///
    /// Empty records are placeholders mirrored into existence; they are never
    /// executed automatically.
    pub fn is_empty(&self) -> bool {
        self.destination.is_zero() && self.value.is_zero() && self.payload.is_empty()
    }
}

/// A stored transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Immutable content.
    pub data: TransactionData,
    /// Known as locally submitted (as opposed to only mirrored in).
    pub submitted: bool,
}

/// Transaction records, submission history and executed set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionRegistry {
    records: BTreeMap<Fingerprint, TransactionRecord>,
    history: Vec<Fingerprint>,
    executed: BTreeSet<Fingerprint>,
}

impl TransactionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up the record for `data`, creating an unsubmitted one if absent.
    ///
    /// Returns the fingerprint and whether a record was created.
    pub fn get_or_create(&mut self, data: TransactionData) -> (Fingerprint, bool) {
        let fingerprint = data.fingerprint();
        let mut created = false;
        self.records.entry(fingerprint).or_insert_with(|| {
            created = true;
            TransactionRecord {
                data,
                submitted: false,
            }
        });
        (fingerprint, created)
    }

    /// A record exists, submitted or only mirrored in.
    pub fn contains(&self, fingerprint: &Fingerprint) -> bool {
        self.records.contains_key(fingerprint)
    }

    /// Record for `fingerprint`.
    pub fn get(&self, fingerprint: &Fingerprint) -> Option<&TransactionRecord> {
        self.records.get(fingerprint)
    }

    /// Look up a record or fail with `NotFound`.
    pub fn require(&self, fingerprint: &Fingerprint) -> Result<&TransactionRecord> {
        self.records.get(fingerprint).ok_or(WalletError::NotFound {
            fingerprint: *fingerprint,
        })
    }

    /// Unknown fingerprints are not submitted.
    pub fn is_submitted(&self, fingerprint: &Fingerprint) -> bool {
        self.records
            .get(fingerprint)
            .is_some_and(|record| record.submitted)
    }

    /// Mark a record as submitted, appending it to the history the first time.
    ///
    /// Returns `true` if the flag changed.
    pub fn mark_submitted(&mut self, fingerprint: &Fingerprint) -> Result<bool> {
        let record = self.records.get_mut(fingerprint).ok_or(WalletError::NotFound {
            fingerprint: *fingerprint,
        })?;
        if record.submitted {
            return Ok(false);
        }
        record.submitted = true;
        self.history.push(*fingerprint);
        Ok(true)
    }

    /// Returns `true` if the flag changed.
    pub fn mark_executed(&mut self, fingerprint: Fingerprint) -> bool {
        self.executed.insert(fingerprint)
    }

    /// Returns `true` if the flag changed.
    pub fn unmark_executed(&mut self, fingerprint: &Fingerprint) -> bool {
        self.executed.remove(fingerprint)
    }

    /// Membership in the executed set.
    pub fn is_executed(&self, fingerprint: &Fingerprint) -> bool {
        self.executed.contains(fingerprint)
    }

    /// Unknown fingerprints count as empty.
    pub fn is_empty(&self, fingerprint: &Fingerprint) -> bool {
        self.records
            .get(fingerprint)
            .map_or(true, |record| record.data.is_empty())
    }

    /// Known record with a non-null destination. Only such records are invoked.
    pub fn has_destination(&self, fingerprint: &Fingerprint) -> bool {
        self.records
            .get(fingerprint)
            .is_some_and(|record| !record.data.destination.is_zero())
    }

    /// Fingerprints in submission order.
    pub fn history(&self) -> &[Fingerprint] {
        &self.history
    }

    /// Number of stored records, submitted or not.
    pub fn record_count(&self) -> usize {
        self.records.len()
    }

    pub(crate) fn records(&self) -> impl Iterator<Item = (&Fingerprint, &TransactionRecord)> {
        self.records.iter()
    }

    pub(crate) fn executed(&self) -> impl Iterator<Item = &Fingerprint> {
        self.executed.iter()
    }
}

impl ExecutedView for TransactionRegistry {
    fn is_executed(&self, fingerprint: &Fingerprint) -> bool {
        TransactionRegistry::is_executed(self, fingerprint)
    }
}
