//! Tandem Wallet - mirrored multisig state machine
//!
//! One [`Wallet`] holds one ledger's copy of the multisig state. Local owners
//! drive the ordinary lifecycle (submit, confirm, revoke, execute). Relays
//! replay changes committed on the other ledger through
//! [`Wallet::apply_from_root_ledger`] and [`Wallet::apply_from_child_ledger`],
//! and the mirroring rules decide how each replayed change lands locally.

#![forbid(unsafe_code)]

/// Owner management through self-invocation
pub mod admin;

/// Request value encoding and the transaction decoder seam
pub mod codec;

/// Composable precondition checks
pub mod guards;

mod mirror;
mod multisig;

/// Owner set, threshold and confirmation matrix
pub mod owners;

/// Content-addressed transaction storage
pub mod registry;

/// Request routing and the applied-request ledger
pub mod router;

/// Wallet state and read accessors
pub mod state;

mod wallet;

pub use admin::AdminCall;
pub use codec::{CanonicalDecoder, MirroredChange, TransactionDecoder};
pub use owners::{check_requirement, ConfirmationMatrix, OwnerSet};
pub use registry::{TransactionData, TransactionRecord, TransactionRegistry};
pub use router::AppliedRequests;
pub use state::WalletState;
pub use wallet::Wallet;
