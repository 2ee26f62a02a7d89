//! Wallet configuration and validation
//!
//! Configuration is plain serde data loaded from TOML. Validation accumulates
//! every problem before failing so an operator sees all of them at once.

use crate::errors::{Result, WalletError};
use crate::identifiers::Address;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;

/// Default gas available to an execution.
pub const DEFAULT_INVOKE_GAS_LIMIT: u64 = 2_300_000;

/// Default gas withheld from the invoked payload for post-call bookkeeping.
pub const DEFAULT_BOOKKEEPING_RESERVE: u64 = 34_710;

/// Configuration validation errors
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Address must not be the null address
    NullAddress {
        /// Field name
        field: String,
    },
    /// Two fields that must differ are equal
    Conflict {
        /// Field name
        field: String,
        /// Field it collides with
        other: String,
    },
    /// Value out of its acceptable range
    OutOfRange {
        /// Field name
        field: String,
        /// Inclusive lower bound
        min: u64,
        /// Inclusive upper bound
        max: u64,
        /// Offending value
        actual: u64,
    },
    /// Custom validation failed
    Custom {
        /// Field name
        field: String,
        /// Failure description
        message: String,
    },
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValidationError::NullAddress { field } => {
                write!(f, "Field '{field}' must not be the null address")
            }
            ValidationError::Conflict { field, other } => {
                write!(f, "Field '{field}' must differ from '{other}'")
            }
            ValidationError::OutOfRange {
                field,
                min,
                max,
                actual,
            } => write!(f, "Field '{field}' must be between {min} and {max} (got {actual})"),
            ValidationError::Custom { field, message } => write!(f, "Field '{field}': {message}"),
        }
    }
}

impl std::error::Error for ValidationError {}

/// Accumulates validation errors across fields.
#[derive(Debug, Default)]
pub struct ConfigValidator {
    errors: Vec<ValidationError>,
}

impl ConfigValidator {
    /// Create a new validator
    pub fn new() -> Self {
        Self::default()
    }

    /// Address must be non-null
    pub fn non_null(&mut self, field: &str, value: &Address) -> &mut Self {
        if value.is_zero() {
            self.errors.push(ValidationError::NullAddress {
                field: field.to_string(),
            });
        }
        self
    }

    /// Two addresses must differ
    pub fn distinct(&mut self, field: &str, value: &Address, other: &str, other_value: &Address) -> &mut Self {
        if value == other_value {
            self.errors.push(ValidationError::Conflict {
                field: field.to_string(),
                other: other.to_string(),
            });
        }
        self
    }

    /// Number must lie within `[min, max]`
    pub fn range(&mut self, field: &str, value: u64, min: u64, max: u64) -> &mut Self {
        if value < min || value > max {
            self.errors.push(ValidationError::OutOfRange {
                field: field.to_string(),
                min,
                max,
                actual: value,
            });
        }
        self
    }

    /// Record a custom failure when `ok` is false
    pub fn check(&mut self, field: &str, ok: bool, message: impl Into<String>) -> &mut Self {
        if !ok {
            self.errors.push(ValidationError::Custom {
                field: field.to_string(),
                message: message.into(),
            });
        }
        self
    }

    /// Errors collected so far
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    /// Finish, folding all errors into one configuration error
    pub fn finish(&self) -> Result<()> {
        if self.errors.is_empty() {
            return Ok(());
        }
        let joined = self
            .errors
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; ");
        Err(WalletError::config(joined))
    }
}

fn default_invoke_gas_limit() -> u64 {
    DEFAULT_INVOKE_GAS_LIMIT
}

fn default_bookkeeping_reserve() -> u64 {
    DEFAULT_BOOKKEEPING_RESERVE
}

/// Runtime configuration of one wallet instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalletConfig {
    /// The wallet's own address; the only caller allowed to manage owners.
    pub wallet_address: Address,
    /// Relay identity allowed to deliver root-origin requests.
    pub root_relay: Address,
    /// Identity that marks child-side replay (the null address by default).
    #[serde(default)]
    pub system_sender: Address,
    /// Gas available to an execution.
    #[serde(default = "default_invoke_gas_limit")]
    pub invoke_gas_limit: u64,
    /// Gas withheld from the invoked payload.
    #[serde(default = "default_bookkeeping_reserve")]
    pub bookkeeping_reserve: u64,
}

impl WalletConfig {
    /// Configuration with default gas settings and the null system sender.
    pub fn new(wallet_address: Address, root_relay: Address) -> Self {
        Self {
            wallet_address,
            root_relay,
            system_sender: Address::ZERO,
            invoke_gas_limit: DEFAULT_INVOKE_GAS_LIMIT,
            bookkeeping_reserve: DEFAULT_BOOKKEEPING_RESERVE,
        }
    }

    /// Stipend handed to invoked payloads.
    pub fn stipend(&self) -> u64 {
        self.invoke_gas_limit.saturating_sub(self.bookkeeping_reserve)
    }

    /// Validate all fields.
    pub fn validate(&self) -> Result<()> {
        let mut v = ConfigValidator::new();
        v.non_null("wallet_address", &self.wallet_address)
            .non_null("root_relay", &self.root_relay)
            .distinct("root_relay", &self.root_relay, "system_sender", &self.system_sender)
            .distinct("wallet_address", &self.wallet_address, "root_relay", &self.root_relay)
            .range(
                "bookkeeping_reserve",
                self.bookkeeping_reserve,
                1,
                self.invoke_gas_limit.saturating_sub(1),
            );
        v.finish()
    }

    /// Parse and validate TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            WalletError::config(format!("Failed to read config file {}: {e}", path.display()))
        })?;
        let config = Self::from_toml_str(&text)?;
        tracing::debug!(path = %path.display(), wallet = %config.wallet_address, "wallet config loaded");
        Ok(config)
    }
}

/// Initial owner set and threshold.
///
/// Bounds are checked when the wallet is constructed, using the same rules as
/// runtime owner management.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenesisConfig {
    /// Initial owners, in set order.
    pub owners: Vec<Address>,
    /// Initial confirmation threshold.
    pub threshold: u64,
}

impl GenesisConfig {
    /// Create a genesis configuration.
    pub fn new(owners: Vec<Address>, threshold: u64) -> Self {
        Self { owners, threshold }
    }

    /// Parse TOML text.
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            WalletError::config(format!("Failed to read genesis file {}: {e}", path.display()))
        })?;
        Self::from_toml_str(&text)
    }
}
