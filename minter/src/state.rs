use cosmwasm_std::{CanonicalAddr, Uint128};
use serde::{Deserialize, Serialize};

use crate::msg::{RarityTier, SaleStatus};

/// storage key for the config
pub const CONFIG_KEY: &[u8] = b"config";
/// storage key for this contract's address
pub const MY_ADDRESS_KEY: &[u8] = b"myaddr";
/// storage key for prng seed
pub const PRNG_SEED_KEY: &[u8] = b"prngseed";
/// prefix for storage of viewing keys
pub const PREFIX_VIEW_KEY: &[u8] = b"viewkeys";
/// prefix for the storage of revoked permits
pub const PREFIX_REVOKED_PERMITS: &str = "revoke";
/// prefix for allowlist phase commitments
pub const PREFIX_ALLOWLIST_COMMIT: &[u8] = b"wlcommit";
/// prefix for public phase commitments
pub const PREFIX_PUBLIC_COMMIT: &[u8] = b"pubcommit";
/// prefix for escrowed public sale payments
pub const PREFIX_ESCROW: &[u8] = b"escrow";
/// prefix for the claimed allowlist indices stored as a boolean map
pub const PREFIX_CLAIMED: &[u8] = b"claimed";
/// prefix for the claimed allowlist indices stored as bitset buckets
pub const PREFIX_CLAIMED_BITS: &[u8] = b"claimbits";
/// prefix for the pool of not-yet-minted token ids
pub const PREFIX_ID_POOL: &[u8] = b"idpool";
/// prefix for minted token records
pub const PREFIX_TOKENS: &[u8] = b"tokens";
/// prefix for the lists of token ids owned by each address
pub const PREFIX_OWNED: &[u8] = b"owned";

/// minter state
#[derive(Serialize, Deserialize)]
pub struct Config {
    /// list of admins
    pub admins: Vec<CanonicalAddr>,
    /// current sale phase
    pub sale_status: SaleStatus,
    /// price in uscrt of a public sale mint
    pub mint_price: Uint128,
    /// number of tokens that can ever be minted
    pub max_supply: u32,
    /// number of blocks that must pass after a commit before it can be revealed
    pub reveal_delay: u64,
    /// number of blocks after the earliest reveal during which a reveal is accepted
    pub reveal_window: u64,
    /// merkle root of the allowlist
    pub merkle_root: [u8; 32],
    /// address of the revenue splitter that receives sale proceeds
    pub splitter: CanonicalAddr,
    /// total number of tokens minted
    pub total_minted: u32,
    /// true if claimed allowlist indices should be recorded in the bitset
    pub claimed_bitset: bool,
    /// mint counts broken down by rarity tier
    pub tier_counts: [u32; 4],
}

/// a pending commitment
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct StoredCommitment {
    /// hash of the secret that must be revealed
    pub hash: [u8; 32],
    /// block height of the commit
    pub block: u64,
}

/// a minted token
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct StoredToken {
    /// rarity tier rolled at mint
    pub tier: RarityTier,
    /// owner of the token
    pub owner: CanonicalAddr,
}
