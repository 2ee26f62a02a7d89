//! Fingerprint computation

use super::parse_hex;
use anyhow::Result;
use clap::Args;
use tandem_core::{Address, Amount};
use tandem_wallet::TransactionData;

/// Arguments for fingerprint computation
#[derive(Args)]
pub struct FingerprintArgs {
    /// Destination address (0x-prefixed hex)
    #[arg(short, long)]
    destination: Address,

    /// Value in ledger base units
    #[arg(long, default_value = "0")]
    value: u128,

    /// Call data (hex)
    #[arg(short, long, default_value = "")]
    payload: String,
}

/// Print the fingerprint of the described transaction
pub fn run(args: &FingerprintArgs) -> Result<()> {
    let payload = parse_hex(&args.payload)?;
    let data = TransactionData::new(args.destination, Amount(args.value), payload);
    println!("{}", data.fingerprint());
    Ok(())
}
