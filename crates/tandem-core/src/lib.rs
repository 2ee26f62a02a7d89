//! Tandem Core - foundation types for the mirrored multisig wallet
//!
//! Identifiers, hashing, the unified error type, configuration, the request
//! vocabulary shared by both ledgers, notifications, and the invocation effect
//! interface. No wallet logic lives here.

#![forbid(unsafe_code)]

/// Wallet and genesis configuration
pub mod config;

/// External invocation effect interface
pub mod effects;

/// Unified error handling
pub mod errors;

/// Pure synchronous hashing
pub mod hash;

/// Address, fingerprint, amount and request identifiers
pub mod identifiers;

/// Notification log
pub mod notifications;

/// Replay request vocabulary
pub mod request;

pub use config::{ConfigValidator, GenesisConfig, ValidationError, WalletConfig};
pub use effects::{ExecutedView, InvokeCall, InvokeEffects};
pub use errors::{ErrorKind, Result, WalletError};
pub use identifiers::{Address, Amount, Fingerprint, ParseIdentifierError, RequestId};
pub use notifications::{LogCheckpoint, Notification, NotificationLog};
pub use request::{Direction, Origin, Request, RequestKey};

/// Maximum number of owners a wallet may have.
pub const MAX_OWNER_COUNT: usize = 16;
