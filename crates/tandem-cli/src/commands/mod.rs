//! CLI command implementations

/// Transaction fingerprint computation
pub mod fingerprint;
/// Request log replay
pub mod replay;

/// Decode hex with an optional `0x` prefix.
pub fn parse_hex(text: &str) -> anyhow::Result<Vec<u8>> {
    let digits = text.strip_prefix("0x").unwrap_or(text);
    hex::decode(digits).map_err(|e| anyhow::anyhow!("invalid hex '{text}': {e}"))
}
