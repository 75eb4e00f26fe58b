use cosmwasm_std::CanonicalAddr;
use serde::{Deserialize, Serialize};

/// storage key for the config
pub const CONFIG_KEY: &[u8] = b"config";
/// storage key for this contract's address
pub const MY_ADDRESS_KEY: &[u8] = b"myaddr";

/// splitter state
#[derive(Serialize, Deserialize)]
pub struct Config {
    /// the payees and their running release totals
    pub payees: Vec<StoredPayee>,
    /// sum of all payee shares
    pub total_shares: u128,
    /// total uscrt ever paid out
    pub total_released: u128,
}

/// one payee's fixed share and release history
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct StoredPayee {
    /// payee address
    pub address: CanonicalAddr,
    /// the payee's fixed share count
    pub shares: u64,
    /// uscrt already released to this payee
    pub released: u128,
}
