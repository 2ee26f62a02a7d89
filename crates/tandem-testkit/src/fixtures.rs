//! Deterministic fixtures
//!
//! Addresses are derived by hashing a seed so fixtures never collide with the
//! null address or with each other. `WalletFixture` bundles a wallet, its
//! owners and a scripted invoker, and routes replay requests through the
//! correct relay identity.

use crate::invoker::ScriptedInvoker;
use crate::requests;
use tandem_core::hash;
use tandem_core::{
    Address, Amount, Fingerprint, GenesisConfig, Origin, Request, Result, WalletConfig,
};
use tandem_wallet::router::relay_for;
use tandem_wallet::{AdminCall, MirroredChange, TransactionData, Wallet, WalletState};

/// Deterministic non-null address for `seed`.
pub fn address(seed: u64) -> Address {
    let digest = hash::hash(format!("tandem-address-{seed}").as_bytes());
    let mut bytes = [0u8; Address::LEN];
    bytes.copy_from_slice(&digest[..Address::LEN]);
    Address(bytes)
}

/// Address of the wallet under test.
pub fn wallet_address() -> Address {
    address(u64::MAX)
}

/// Root-ledger relay used by fixtures.
pub fn root_relay() -> Address {
    address(u64::MAX - 1)
}

/// Builder for [`WalletFixture`].
#[derive(Debug, Clone)]
pub struct WalletFixtureBuilder {
    owner_count: u64,
    threshold: u64,
    config: WalletConfig,
    invoker: ScriptedInvoker,
}

impl Default for WalletFixtureBuilder {
    fn default() -> Self {
        Self {
            owner_count: 3,
            threshold: 2,
            config: WalletConfig::new(wallet_address(), root_relay()),
            invoker: ScriptedInvoker::succeeding(),
        }
    }
}

impl WalletFixtureBuilder {
    /// Builder with the default 2-of-3 setup
    pub fn new() -> Self {
        Self::default()
    }

    /// Owners are `address(1)..=address(count)`.
    pub fn owners(mut self, count: u64) -> Self {
        self.owner_count = count;
        self
    }

    /// Genesis threshold.
    pub fn threshold(mut self, threshold: u64) -> Self {
        self.threshold = threshold;
        self
    }

    /// Replace the default wallet configuration.
    pub fn config(mut self, config: WalletConfig) -> Self {
        self.config = config;
        self
    }

    /// Invoker handed to every execution.
    pub fn invoker(mut self, invoker: ScriptedInvoker) -> Self {
        self.invoker = invoker;
        self
    }

    /// Build the fixture. Panics on an invalid genesis.
    pub fn build(self) -> WalletFixture {
        let owners: Vec<Address> = (1..=self.owner_count).map(address).collect();
        let wallet = Wallet::new(self.config, GenesisConfig::new(owners.clone(), self.threshold))
            .expect("fixture genesis must be valid");
        WalletFixture {
            wallet,
            owners,
            invoker: self.invoker,
            next_request_id: 1,
        }
    }
}

/// A wallet with known owners and a scripted invoker.
#[derive(Debug)]
pub struct WalletFixture {
    /// Wallet under test.
    pub wallet: Wallet,
    /// Genesis owners, in set order.
    pub owners: Vec<Address>,
    /// Invoker used by `submit`, `confirm` and `execute`.
    pub invoker: ScriptedInvoker,
    next_request_id: u64,
}

impl WalletFixture {
    /// `owner_count` owners with the given threshold and default config.
    pub fn new(owner_count: u64, threshold: u64) -> Self {
        WalletFixtureBuilder::new()
            .owners(owner_count)
            .threshold(threshold)
            .build()
    }

    /// Start a customised fixture.
    pub fn builder() -> WalletFixtureBuilder {
        WalletFixtureBuilder::new()
    }

    /// Genesis owner at `index`.
    pub fn owner(&self, index: usize) -> Address {
        self.owners[index]
    }

    /// The wallet's own address.
    pub fn wallet_address(&self) -> Address {
        self.wallet.config().wallet_address
    }

    /// Wallet state.
    pub fn state(&self) -> &WalletState {
        self.wallet.state()
    }

    /// Current state commitment.
    pub fn commitment(&self) -> [u8; 32] {
        self.wallet.commitment()
    }

    /// Submit a zero-value, empty-payload transaction.
    pub fn submit(&mut self, owner: usize, destination: Address) -> Result<Fingerprint> {
        self.submit_data(owner, TransactionData::new(destination, Amount::ZERO, Vec::new()))
    }

    /// Submit arbitrary content as owner `owner`.
    pub fn submit_data(&mut self, owner: usize, data: TransactionData) -> Result<Fingerprint> {
        let caller = self.owner(owner);
        self.wallet
            .submit_transaction(&caller, data.destination, data.value, data.payload, &mut self.invoker)
    }

    /// Submit a self-addressed transaction carrying `call`.
    pub fn submit_admin(&mut self, owner: usize, call: &AdminCall) -> Result<Fingerprint> {
        let payload = call.encode().expect("admin call always encodes");
        let data = TransactionData::new(self.wallet_address(), Amount::ZERO, payload);
        self.submit_data(owner, data)
    }

    /// Confirm as owner `owner`.
    pub fn confirm(&mut self, owner: usize, fingerprint: &Fingerprint) -> Result<()> {
        let caller = self.owner(owner);
        self.wallet
            .confirm_transaction(&caller, fingerprint, &mut self.invoker)
    }

    /// Revoke as owner `owner`.
    pub fn revoke(&mut self, owner: usize, fingerprint: &Fingerprint) -> Result<()> {
        let caller = self.owner(owner);
        self.wallet.revoke_confirmation(&caller, fingerprint)
    }

    /// Execute as owner `owner`.
    pub fn execute(&mut self, owner: usize, fingerprint: &Fingerprint) -> Result<()> {
        let caller = self.owner(owner);
        self.wallet
            .execute_transaction(&caller, fingerprint, &mut self.invoker)
    }

    /// Allocate a fresh request id.
    pub fn next_request_id(&mut self) -> u64 {
        let id = self.next_request_id;
        self.next_request_id += 1;
        id
    }

    /// Deliver `request` from the relay designated for its origin.
    pub fn apply(&mut self, request: Request) -> Result<()> {
        let relay = relay_for(self.wallet.config(), request.origin);
        self.wallet.apply(&relay, request)
    }

    /// Replay `change` from `origin` under a fresh request id.
    pub fn replay(
        &mut self,
        origin: Origin,
        is_exit: bool,
        requestor: Address,
        change: &MirroredChange,
    ) -> Result<()> {
        let id = self.next_request_id();
        self.apply(requests::request(origin, is_exit, id, requestor, change))
    }
}
