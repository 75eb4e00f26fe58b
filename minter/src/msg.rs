use std::fmt;

use cosmwasm_std::{Binary, HumanAddr, Uint128};
use schemars::JsonSchema;
use secret_toolkit::permit::Permit;
use serde::{Deserialize, Serialize};

/// Instantiation message
#[derive(Serialize, Deserialize, JsonSchema)]
pub struct InitMsg {
    /// entropy used for prng seed
    pub entropy: String,
    /// merkle root of the allowlist (32 bytes)
    pub merkle_root: Binary,
    /// number of tokens that can ever be minted
    pub max_supply: u32,
    /// price in uscrt of a public sale mint
    pub mint_price: Uint128,
    /// number of blocks that must pass after a commit before it can be revealed
    pub reveal_delay: u64,
    /// number of blocks after the earliest reveal during which a reveal is accepted
    pub reveal_window: u64,
    /// address of the revenue splitter that receives sale proceeds
    pub revenue_splitter: HumanAddr,
    /// optional list of additional admins
    pub admins: Option<Vec<HumanAddr>>,
}

/// Handle messages
#[derive(Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum HandleMsg {
    /// commit to a future reveal.  During the public sale the mint price must
    /// accompany the commit and is escrowed until reveal or cancellation
    Commit {
        /// sha256 hash of the secret that will be revealed
        commitment: Binary,
    },
    /// reveal a previously committed secret and mint a token
    Reveal {
        /// the committed secret
        secret: Binary,
        /// allowlist claim proving the sender may mint, required during the
        /// allowlist sale and ignored during the public sale
        claim: Option<AllowlistClaim>,
    },
    /// cancel a pending commitment and refund any escrowed payment
    Cancel {},
    /// allows an admin to cancel another address' expired commitment, refunding
    /// its escrow to the original committer
    ForceCancel {
        /// address whose expired commitment should be cancelled
        address: HumanAddr,
    },
    /// set the sale phase
    SetSaleStatus {
        /// new sale phase
        status: SaleStatus,
    },
    /// select which representation newly claimed allowlist indices are recorded in
    SetClaimedFormat {
        /// true if claimed indices should be recorded in the compact bitset
        bitset: bool,
    },
    /// change the revenue splitter address
    NewRevenueSplitter {
        /// new revenue splitter address
        address: HumanAddr,
    },
    /// Create a viewing key
    CreateViewingKey { entropy: String },
    /// Set a viewing key
    SetViewingKey {
        key: String,
        // optional padding can be used so message length doesn't betray key length
        padding: Option<String>,
    },
    /// allows an admin to add more admins
    AddAdmins {
        /// list of address to grant admin priveleges
        admins: Vec<HumanAddr>,
    },
    /// allows an admin to remove admin addresses
    RemoveAdmins {
        /// list of address to revoke admin priveleges from
        admins: Vec<HumanAddr>,
    },
    /// disallow the use of a permit
    RevokePermit {
        /// name of the permit that is no longer valid
        permit_name: String,
    },
}

/// Responses from handle functions
#[derive(Serialize, Deserialize, Debug, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum HandleAnswer {
    /// response of committing
    Commit {
        /// block height the commit was recorded at
        committed_block: u64,
        /// first block at which the commitment may be revealed
        earliest_reveal: u64,
        /// last block at which the commitment may be revealed
        expiry: u64,
    },
    /// response of revealing
    Reveal {
        /// id of the minted token
        token_id: u32,
        /// rarity tier rolled for the token
        rarity: RarityTier,
    },
    /// response of cancelling a commitment
    Cancel {
        /// escrowed amount refunded
        refund: Uint128,
    },
    /// response of an admin cancelling an expired commitment
    ForceCancel {
        /// address whose commitment was cancelled
        user: HumanAddr,
        /// escrowed amount refunded to the committer
        refund: Uint128,
    },
    /// response of setting the sale phase
    SetSaleStatus {
        /// current sale phase
        status: SaleStatus,
    },
    /// response of selecting the claimed-index representation
    SetClaimedFormat {
        /// true if claimed indices are recorded in the compact bitset
        using_bitset: bool,
    },
    /// response of setting a new revenue splitter address
    NewRevenueSplitter {
        revenue_splitter: HumanAddr,
    },
    /// response of both AddAdmins and RemoveAdmins
    AdminsList {
        /// current admins
        admins: Vec<HumanAddr>,
    },
    /// response from creating a viewing key
    ViewingKey {
        key: String,
    },
    RevokePermit {
        status: String,
    },
}

/// Queries
#[derive(Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum QueryMsg {
    /// display the sale parameters and progress
    SaleInfo {},
    /// display the mint counts
    MintCounts {},
    /// display whether an allowlist index has been claimed
    IsClaimed {
        /// allowlist index
        index: u32,
    },
    /// display the rarity tier of a minted token
    TokenRarity {
        /// token id
        token_id: u32,
    },
    /// display the querier's pending commitments
    MyCommitments {
        /// optional address and viewing key of the querier
        viewer: Option<ViewerInfo>,
        /// optional permit used to verify the querier's identity.  If both viewer
        /// and permit are provided, the viewer will be ignored
        permit: Option<Permit>,
    },
    /// display the token ids and rarities owned by the querier
    MyTokens {
        /// optional address and viewing key of the querier
        viewer: Option<ViewerInfo>,
        /// optional permit used to verify the querier's identity.  If both viewer
        /// and permit are provided, the viewer will be ignored
        permit: Option<Permit>,
    },
    /// display the admin addresses
    Admins {
        /// optional address and viewing key of an admin
        viewer: Option<ViewerInfo>,
        /// optional permit used to verify admin identity.  If both viewer and permit
        /// are provided, the viewer will be ignored
        permit: Option<Permit>,
    },
}

/// responses to queries
#[derive(Serialize, Deserialize, Debug, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum QueryAnswer {
    /// displays the sale parameters and progress
    SaleInfo {
        /// current sale phase
        status: SaleStatus,
        /// price in uscrt of a public sale mint
        mint_price: Uint128,
        /// number of tokens that can ever be minted
        max_supply: u32,
        /// total number of tokens minted
        total_minted: u32,
        /// number of blocks that must pass after a commit before it can be revealed
        reveal_delay: u64,
        /// number of blocks after the earliest reveal during which a reveal is accepted
        reveal_window: u64,
    },
    /// displays the mint counts
    MintCounts {
        /// total mint count
        total: u32,
        /// mint counts broken down by rarity tier
        by_rarity: Vec<TierCount>,
    },
    /// displays whether an allowlist index has been claimed
    IsClaimed {
        claimed: bool,
    },
    /// displays the rarity tier of a minted token
    TokenRarity {
        rarity: RarityTier,
    },
    /// displays the querier's pending commitments
    MyCommitments {
        /// pending allowlist sale commitment
        allowlist: Option<CommitmentInfo>,
        /// pending public sale commitment
        public: Option<CommitmentInfo>,
    },
    /// displays the token ids and rarities owned by the querier
    MyTokens {
        tokens: Vec<TokenData>,
    },
    /// displays the admins list
    Admins {
        /// current admin list
        admins: Vec<HumanAddr>,
    },
}

/// sale phases
#[derive(Serialize, Deserialize, JsonSchema, Clone, Copy, PartialEq, Debug)]
#[serde(rename_all = "snake_case")]
pub enum SaleStatus {
    /// no commits or reveals are accepted
    Closed,
    /// only allowlisted addresses may mint, free of charge
    Allowlist,
    /// anyone may mint for the mint price
    Public,
    /// the full supply has been minted
    SoldOut,
}

/// rarity tiers
#[derive(Serialize, Deserialize, JsonSchema, Clone, Copy, PartialEq, Debug)]
#[serde(rename_all = "snake_case")]
pub enum RarityTier {
    Common,
    Uncommon,
    Rare,
    Legendary,
}

impl RarityTier {
    /// Returns the index used for this tier in the mint count table
    pub fn to_idx(self) -> usize {
        match self {
            RarityTier::Common => 0,
            RarityTier::Uncommon => 1,
            RarityTier::Rare => 2,
            RarityTier::Legendary => 3,
        }
    }
}

impl fmt::Display for RarityTier {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            RarityTier::Common => "common",
            RarityTier::Uncommon => "uncommon",
            RarityTier::Rare => "rare",
            RarityTier::Legendary => "legendary",
        };
        write!(f, "{}", name)
    }
}

/// proof that an address is on the allowlist
#[derive(Serialize, Deserialize, JsonSchema, Clone, Debug)]
pub struct AllowlistClaim {
    /// the claimant's position in the address list the tree was built from
    pub index: u32,
    /// sibling hashes from the leaf to the root
    pub proof: Vec<Binary>,
}

/// mint count of one rarity tier
#[derive(Serialize, Deserialize, JsonSchema, Clone, PartialEq, Debug)]
pub struct TierCount {
    /// rarity tier
    pub tier: RarityTier,
    /// number of tokens minted with this tier
    pub count: u32,
}

/// a pending commitment as displayed to its owner
#[derive(Serialize, Deserialize, JsonSchema, Clone, PartialEq, Debug)]
pub struct CommitmentInfo {
    /// block height the commit was recorded at
    pub committed_block: u64,
    /// first block at which the commitment may be revealed
    pub earliest_reveal: u64,
    /// last block at which the commitment may be revealed
    pub expiry: u64,
    /// escrowed payment, if this is a public sale commitment
    pub escrow: Option<Uint128>,
}

/// a token as displayed to its owner
#[derive(Serialize, Deserialize, JsonSchema, Clone, PartialEq, Debug)]
pub struct TokenData {
    /// token id
    pub token_id: u32,
    /// rarity tier
    pub rarity: RarityTier,
}

/// the address and viewing key making an authenticated query request
#[derive(Serialize, Deserialize, JsonSchema, Clone, PartialEq, Debug)]
pub struct ViewerInfo {
    /// querying address
    pub address: HumanAddr,
    /// authentication key string
    pub viewing_key: String,
}
