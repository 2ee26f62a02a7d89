//! Tandem Testing Infrastructure
//!
//! Deterministic doubles for the invoke effect, address and wallet fixtures,
//! request builders and proptest strategies shared by the workspace's
//! integration tests.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
//!
//! # Usage
//!
//! ```toml
//! [dev-dependencies]
//! tandem-testkit = { path = "../tandem-testkit" }
//! ```
//!
//! ```rust,no_run
//! use tandem_testkit::*;
//!
//! let mut fx = WalletFixture::new(3, 2);
//! let fp = fx.submit(0, address(100)).unwrap();
//! fx.confirm(1, &fp).unwrap();
//! assert!(fx.state().is_executed(&fp));
//! ```

/// Deterministic addresses and wallet fixtures
pub mod fixtures;
/// Invoke effect doubles
pub mod invoker;
/// Request value builders
pub mod requests;
/// Proptest strategies
pub mod strategies;

pub use fixtures::*;
pub use invoker::*;
pub use requests::*;
pub use strategies::*;
