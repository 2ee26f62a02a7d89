//! Request log replay
//!
//! Builds a wallet from configuration and genesis files, delivers every entry
//! of a JSON request log through the router, and prints the notifications,
//! rejections and final state commitment as JSON. A rejected entry is reported
//! and replay continues with the next one.

use super::parse_hex;
use anyhow::{Context, Result};
use clap::Args;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tandem_core::{
    Address, ErrorKind, GenesisConfig, Notification, Origin, Request, RequestId, WalletConfig,
};
use tandem_wallet::router::relay_for;
use tandem_wallet::Wallet;
use tracing::{info, warn};

/// Arguments for request log replay
#[derive(Args)]
pub struct ReplayArgs {
    /// Wallet configuration (TOML)
    #[arg(long)]
    config: PathBuf,

    /// Genesis owners and threshold (TOML)
    #[arg(long)]
    genesis: PathBuf,

    /// Request log (JSON array)
    #[arg(long)]
    requests: PathBuf,

    /// Deliver every request as this caller instead of the designated relay
    #[arg(long)]
    caller: Option<Address>,
}

/// One entry of a request log.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogEntry {
    /// Originating ledger
    pub origin: Origin,
    /// Exit rather than enter
    pub is_exit: bool,
    /// Relay-assigned id
    pub request_id: RequestId,
    /// Account that caused the change
    pub requestor: Address,
    /// Raw category code
    pub key: u8,
    /// Hex-encoded value
    pub value: String,
}

impl LogEntry {
    fn into_request(self) -> Result<Request> {
        let value = parse_hex(&self.value)
            .with_context(|| format!("request {} value", self.request_id))?;
        Ok(Request {
            origin: self.origin,
            is_exit: self.is_exit,
            request_id: self.request_id,
            requestor: self.requestor,
            key: self.key,
            value,
        })
    }
}

/// A log entry the wallet rejected.
#[derive(Debug, Clone, Serialize)]
pub struct Rejection {
    /// Position in the log
    pub index: usize,
    /// Originating ledger
    pub origin: Origin,
    /// Relay-assigned id
    pub request_id: RequestId,
    /// Error discriminant
    pub kind: ErrorKind,
    /// Rendered error
    pub error: String,
}

/// Outcome of a replay.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayReport {
    /// Entries applied successfully
    pub applied: usize,
    /// Entries the wallet rejected
    pub rejected: Vec<Rejection>,
    /// Notifications emitted during replay
    pub notifications: Vec<Notification>,
    /// Final state commitment, `0x` hex
    pub commitment: String,
}

/// Replay the log named by `args` and print the report as JSON
pub fn run(args: &ReplayArgs) -> Result<()> {
    let config = WalletConfig::load(&args.config)?;
    let genesis = GenesisConfig::load(&args.genesis)?;
    let entries = load_log(&args.requests)?;

    let report = replay(config, genesis, entries, args.caller)?;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// Read a JSON request log
pub fn load_log(path: &Path) -> Result<Vec<LogEntry>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read request log {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse request log {}", path.display()))
}

/// Apply `entries` in order to a wallet built from `config` and `genesis`.
pub fn replay(
    config: WalletConfig,
    genesis: GenesisConfig,
    entries: Vec<LogEntry>,
    caller: Option<Address>,
) -> Result<ReplayReport> {
    let mut wallet = Wallet::new(config, genesis)?;
    let mut applied = 0;
    let mut rejected = Vec::new();

    for (index, entry) in entries.into_iter().enumerate() {
        let request = entry.into_request()?;
        let origin = request.origin;
        let request_id = request.request_id;
        let sender = caller.unwrap_or_else(|| relay_for(wallet.config(), origin));

        match wallet.apply(&sender, request) {
            Ok(()) => applied += 1,
            Err(err) => {
                warn!(index, %origin, %request_id, error = %err, "request rejected; continuing");
                rejected.push(Rejection {
                    index,
                    origin,
                    request_id,
                    kind: err.kind(),
                    error: err.to_string(),
                });
            }
        }
    }

    info!(applied, rejected = rejected.len(), "replay finished");
    Ok(ReplayReport {
        applied,
        rejected,
        notifications: wallet.drain_notifications(),
        commitment: format!("0x{}", hex::encode(wallet.commitment())),
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use std::io::Write;

    fn addr(seed: u8) -> Address {
        Address([seed; 20])
    }

    fn setup() -> (WalletConfig, GenesisConfig) {
        (
            WalletConfig::new(addr(0xee), addr(0xaa)),
            GenesisConfig::new(vec![addr(1), addr(2), addr(3)], 2),
        )
    }

    fn threshold_word(threshold: u8) -> String {
        let mut word = [0u8; 32];
        word[31] = threshold;
        hex::encode(word)
    }

    fn entry(origin: Origin, request_id: u64, key: u8, value: String) -> LogEntry {
        LogEntry {
            origin,
            is_exit: false,
            request_id: RequestId(request_id),
            requestor: addr(1),
            key,
            value,
        }
    }

    #[test]
    fn test_replay_continues_after_rejection() {
        let (config, genesis) = setup();
        let entries = vec![
            entry(Origin::Root, 1, 0x07, threshold_word(3)),
            entry(Origin::Root, 1, 0x07, threshold_word(1)),
            entry(Origin::Child, 1, 0x09, String::new()),
            entry(Origin::Child, 2, 0x07, threshold_word(1)),
        ];
        let report = replay(config, genesis, entries, None).unwrap();
        assert_eq!(report.applied, 2);
        assert_eq!(report.rejected.len(), 2);
        assert_eq!(report.rejected[0].kind, ErrorKind::DuplicateRequest);
        assert_eq!(report.rejected[1].kind, ErrorKind::InvalidKey);
        assert_eq!(
            report.notifications,
            vec![Notification::RequirementChange { threshold: 1 }]
        );
        assert!(report.commitment.starts_with("0x"));
    }

    #[test]
    fn test_caller_override_is_checked() {
        let (config, genesis) = setup();
        let entries = vec![entry(Origin::Root, 1, 0x07, threshold_word(1))];
        let report = replay(config, genesis, entries, Some(addr(9))).unwrap();
        assert_eq!(report.applied, 0);
        assert_eq!(report.rejected[0].kind, ErrorKind::Unauthorized);
    }

    #[test]
    fn test_load_log_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"origin":"child","is_exit":true,"request_id":4,"requestor":"{}","key":5,"value":"0x{}"}}]"#,
            addr(1),
            threshold_word(2)
        )
        .unwrap();
        let entries = load_log(file.path()).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].origin, Origin::Child);
        assert_eq!(entries[0].request_id, RequestId(4));
        assert_eq!(entries[0].clone().into_request().unwrap().value.len(), 32);
    }
}
