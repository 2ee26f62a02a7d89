//! Observable notifications emitted by wallet transitions
//!
//! Notifications are a log, not state: they never feed back into any decision
//! and are excluded from the state commitment.

use crate::identifiers::{Address, Amount, Fingerprint};
use serde::{Deserialize, Serialize};

/// A single emitted notification.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum Notification {
    /// An owner confirmed a transaction.
    Confirmation {
        /// Confirming owner
        owner: Address,
        /// Confirmed transaction
        fingerprint: Fingerprint,
    },
    /// An owner revoked a confirmation.
    Revocation {
        /// Revoking owner
        owner: Address,
        /// Affected transaction
        fingerprint: Fingerprint,
    },
    /// A transaction was submitted locally.
    Submission {
        /// Submitted transaction
        fingerprint: Fingerprint,
    },
    /// Invocation succeeded.
    Execution {
        /// Executed transaction
        fingerprint: Fingerprint,
    },
    /// Invocation failed and the executed flag was rolled back.
    ExecutionFailure {
        /// Transaction whose invocation failed
        fingerprint: Fingerprint,
    },
    /// Executed flag set by replay from the other ledger.
    ExecutionAdded {
        /// Transaction marked executed
        fingerprint: Fingerprint,
    },
    /// Value deposited into the wallet.
    Deposit {
        /// Depositing account
        sender: Address,
        /// Deposited value
        amount: Amount,
    },
    /// Owner added.
    OwnerAddition {
        /// New owner
        owner: Address,
    },
    /// Owner removed.
    OwnerRemoval {
        /// Former owner
        owner: Address,
    },
    /// Confirmation threshold changed.
    RequirementChange {
        /// New threshold
        threshold: u64,
    },
}

/// Append-only notification log with checkpoint/rollback for aborted transitions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotificationLog {
    entries: Vec<Notification>,
}

/// Position in a [`NotificationLog`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogCheckpoint(usize);

impl NotificationLog {
    /// Create an empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a notification
    pub fn emit(&mut self, notification: Notification) {
        tracing::trace!(?notification, "notification emitted");
        self.entries.push(notification);
    }

    /// Current position
    pub fn checkpoint(&self) -> LogCheckpoint {
        LogCheckpoint(self.entries.len())
    }

    /// Drop everything emitted after `checkpoint`
    pub fn rollback(&mut self, checkpoint: LogCheckpoint) {
        self.entries.truncate(checkpoint.0);
    }

    /// Entries emitted after `checkpoint`
    pub fn since(&self, checkpoint: LogCheckpoint) -> &[Notification] {
        self.entries.get(checkpoint.0..).unwrap_or(&[])
    }

    /// All entries in emission order
    pub fn entries(&self) -> &[Notification] {
        &self.entries
    }

    /// Number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if nothing was emitted
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove and return all entries
    pub fn drain(&mut self) -> Vec<Notification> {
        std::mem::take(&mut self.entries)
    }
}
