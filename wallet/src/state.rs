use cosmwasm_std::{CanonicalAddr, HumanAddr};
use serde::{Deserialize, Serialize};

/// storage key for the config
pub const CONFIG_KEY: &[u8] = b"config";
/// prefix for per-signer meta transaction nonces
pub const PREFIX_NONCE: &[u8] = b"nonce";

/// wallet state
#[derive(Serialize, Deserialize)]
pub struct Config {
    /// list of admins
    pub admins: Vec<CanonicalAddr>,
    /// addresses authorized to sign meta transactions for this wallet.  These are
    /// kept in human form because they are compared against addresses derived
    /// from signature pubkeys
    pub signers: Vec<HumanAddr>,
}
