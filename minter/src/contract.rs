use cosmwasm_std::{
    log, to_binary, Api, BankMsg, Binary, CanonicalAddr, Coin, CosmosMsg, Env, Extern,
    HandleResponse, HandleResult, HumanAddr, InitResponse, InitResult, Querier, QueryResult,
    ReadonlyStorage, StdError, StdResult, Storage, Uint128,
};
use cosmwasm_storage::{PrefixedStorage, ReadonlyPrefixedStorage};

use secret_toolkit::{
    permit::{validate, Permit, RevokedPermits},
    utils::{pad_handle_result, pad_query_result},
};

use crate::merkle;
use crate::mint;
use crate::msg::{
    AllowlistClaim, CommitmentInfo, HandleAnswer, HandleMsg, InitMsg, QueryAnswer, QueryMsg,
    SaleStatus, TierCount, TokenData, ViewerInfo,
};
use crate::rand::sha_256;
use crate::state::{
    Config, StoredCommitment, StoredToken, CONFIG_KEY, MY_ADDRESS_KEY, PREFIX_ALLOWLIST_COMMIT,
    PREFIX_CLAIMED, PREFIX_CLAIMED_BITS, PREFIX_ESCROW, PREFIX_OWNED, PREFIX_PUBLIC_COMMIT,
    PREFIX_REVOKED_PERMITS, PREFIX_TOKENS, PREFIX_VIEW_KEY, PRNG_SEED_KEY,
};
use crate::storage::{load, may_load, remove, save};
use crate::viewing_key::{ViewingKey, VIEWING_KEY_SIZE};

pub const BLOCK_SIZE: usize = 256;
/// the only denom the sale accepts
pub const SALE_DENOM: &str = "uscrt";

////////////////////////////////////// Init ///////////////////////////////////////
/// Returns InitResult
///
/// Initializes the minter contract
///
/// # Arguments
///
/// * `deps` - mutable reference to Extern containing all the contract's external dependencies
/// * `env` - Env of contract's environment
/// * `msg` - InitMsg passed in with the instantiation message
pub fn init<S: Storage, A: Api, Q: Querier>(
    deps: &mut Extern<S, A, Q>,
    env: Env,
    msg: InitMsg,
) -> InitResult {
    save(
        &mut deps.storage,
        MY_ADDRESS_KEY,
        &deps.api.canonical_address(&env.contract.address)?,
    )?;
    let sender_raw = deps.api.canonical_address(&env.message.sender)?;
    let prng_seed: Vec<u8> = sha_256(base64::encode(msg.entropy.as_bytes()).as_bytes()).to_vec();
    save(&mut deps.storage, PRNG_SEED_KEY, &prng_seed)?;
    if msg.merkle_root.len() != 32 {
        return Err(StdError::generic_err(
            "The merkle root must be a 32 byte hash",
        ));
    }
    if msg.max_supply == 0 {
        return Err(StdError::generic_err("Max supply must not be zero"));
    }
    let mut merkle_root = [0u8; 32];
    merkle_root.copy_from_slice(msg.merkle_root.as_slice());
    let mut admins = vec![sender_raw];
    if let Some(addrs) = msg.admins {
        add_addrs_to_auth(&deps.api, &addrs, &mut admins)?;
    }
    let config = Config {
        admins,
        sale_status: SaleStatus::Closed,
        mint_price: msg.mint_price,
        max_supply: msg.max_supply,
        reveal_delay: msg.reveal_delay,
        reveal_window: msg.reveal_window,
        merkle_root,
        splitter: deps.api.canonical_address(&msg.revenue_splitter)?,
        total_minted: 0,
        claimed_bitset: false,
        tier_counts: [0; 4],
    };
    save(&mut deps.storage, CONFIG_KEY, &config)?;

    Ok(InitResponse {
        messages: vec![],
        log: vec![],
    })
}

///////////////////////////////////// Handle //////////////////////////////////////
/// Returns HandleResult
///
/// # Arguments
///
/// * `deps` - mutable reference to Extern containing all the contract's external dependencies
/// * `env` - Env of contract's environment
/// * `msg` - HandleMsg passed in with the execute message
pub fn handle<S: Storage, A: Api, Q: Querier>(
    deps: &mut Extern<S, A, Q>,
    env: Env,
    msg: HandleMsg,
) -> HandleResult {
    let response = match msg {
        HandleMsg::Commit { commitment } => try_commit(deps, env, commitment),
        HandleMsg::Reveal { secret, claim } => try_reveal(deps, env, secret, claim),
        HandleMsg::Cancel {} => try_cancel(deps, env),
        HandleMsg::ForceCancel { address } => try_force_cancel(deps, env, address),
        HandleMsg::SetSaleStatus { status } => {
            try_set_sale_status(deps, &env.message.sender, status)
        }
        HandleMsg::SetClaimedFormat { bitset } => {
            try_set_claimed_format(deps, &env.message.sender, bitset)
        }
        HandleMsg::NewRevenueSplitter { address } => {
            try_new_splitter(deps, &env.message.sender, address)
        }
        HandleMsg::CreateViewingKey { entropy } => try_create_key(deps, &env, &entropy),
        HandleMsg::SetViewingKey { key, .. } => try_set_key(deps, &env.message.sender, key),
        HandleMsg::AddAdmins { admins } => try_add_admins(deps, &env.message.sender, &admins),
        HandleMsg::RemoveAdmins { admins } => try_remove_admins(deps, &env.message.sender, &admins),
        HandleMsg::RevokePermit { permit_name } => {
            revoke_permit(&mut deps.storage, &env.message.sender, &permit_name)
        }
    };
    pad_handle_result(response, BLOCK_SIZE)
}

/// Returns HandleResult
///
/// records a commitment for the sender in the current sale phase, escrowing the
/// mint price during the public sale
///
/// # Arguments
///
/// * `deps` - a mutable reference to Extern containing all the contract's external dependencies
/// * `env` - Env of contract's environment
/// * `commitment` - hash of the secret that will be revealed
fn try_commit<S: Storage, A: Api, Q: Querier>(
    deps: &mut Extern<S, A, Q>,
    env: Env,
    commitment: Binary,
) -> HandleResult {
    let config: Config = load(&deps.storage, CONFIG_KEY)?;
    let is_public = assert_open_phase(&config)?;
    if commitment.len() != 32 {
        return Err(StdError::generic_err(
            "The commitment must be a 32 byte hash",
        ));
    }
    let value = if is_public {
        if env.message.sent_funds.len() != 1
            || env.message.sent_funds[0].amount != config.mint_price
            || env.message.sent_funds[0].denom != *SALE_DENOM
        {
            return Err(StdError::generic_err(format!(
                "You must pay exactly {} uscrt to commit during the public sale",
                config.mint_price
            )));
        }
        config.mint_price
    } else {
        if !env.message.sent_funds.is_empty() {
            return Err(StdError::generic_err(
                "The allowlist sale does not accept funds",
            ));
        }
        Uint128(0)
    };
    let sender_raw = deps.api.canonical_address(&env.message.sender)?;
    let prefix = commit_prefix(is_public);
    let mut commit_store = PrefixedStorage::new(prefix, &mut deps.storage);
    if may_load::<StoredCommitment, _>(&commit_store, sender_raw.as_slice())?.is_some() {
        return Err(StdError::generic_err(
            "You already have a pending commitment for this sale phase",
        ));
    }
    let mut hash = [0u8; 32];
    hash.copy_from_slice(commitment.as_slice());
    save(
        &mut commit_store,
        sender_raw.as_slice(),
        &StoredCommitment {
            hash,
            block: env.block.height,
        },
    )?;
    if is_public {
        let mut escrow_store = PrefixedStorage::new(PREFIX_ESCROW, &mut deps.storage);
        save(&mut escrow_store, sender_raw.as_slice(), &value.u128())?;
    }
    let earliest_reveal = env.block.height + config.reveal_delay;

    Ok(HandleResponse {
        messages: vec![],
        log: vec![
            log("user", &env.message.sender),
            log("value", value),
        ],
        data: Some(to_binary(&HandleAnswer::Commit {
            committed_block: env.block.height,
            earliest_reveal,
            expiry: earliest_reveal + config.reveal_window,
        })?),
    })
}

/// Returns HandleResult
///
/// validates a reveal against the sender's pending commitment and mints a token.
/// The commitment, its escrow, and the claimed allowlist index are all finalized
/// before the mint runs and before any funds move
///
/// # Arguments
///
/// * `deps` - a mutable reference to Extern containing all the contract's external dependencies
/// * `env` - Env of contract's environment
/// * `secret` - the committed secret
/// * `claim` - optional allowlist claim, required during the allowlist sale
fn try_reveal<S: Storage, A: Api, Q: Querier>(
    deps: &mut Extern<S, A, Q>,
    env: Env,
    secret: Binary,
    claim: Option<AllowlistClaim>,
) -> HandleResult {
    let mut config: Config = load(&deps.storage, CONFIG_KEY)?;
    let is_public = assert_open_phase(&config)?;
    let sender_raw = deps.api.canonical_address(&env.message.sender)?;
    let prefix = commit_prefix(is_public);
    let commit: StoredCommitment = {
        let commit_store = ReadonlyPrefixedStorage::new(prefix, &deps.storage);
        may_load(&commit_store, sender_raw.as_slice())?
    }
    .ok_or_else(|| {
        StdError::generic_err("You have no pending commitment for this sale phase")
    })?;
    let earliest = commit.block + config.reveal_delay;
    let expiry = earliest + config.reveal_window;
    if env.block.height < earliest {
        return Err(StdError::generic_err(format!(
            "Your commitment can not be revealed until block {}",
            earliest
        )));
    }
    if env.block.height > expiry {
        return Err(StdError::generic_err(format!(
            "Your commitment expired at block {}",
            expiry
        )));
    }
    if sha_256(secret.as_slice()) != commit.hash {
        return Err(StdError::generic_err(
            "The revealed secret does not match the committed hash",
        ));
    }
    if !is_public {
        let clm = claim.ok_or_else(|| {
            StdError::generic_err("Revealing during the allowlist sale requires an allowlist claim")
        })?;
        let leaf = merkle::leaf_hash(clm.index, &sender_raw);
        if !merkle::verify_proof(&config.merkle_root, leaf, &clm.proof) {
            return Err(StdError::generic_err("The provided merkle proof is invalid"));
        }
        if is_claimed(&deps.storage, clm.index)? {
            return Err(StdError::generic_err(format!(
                "Allowlist index {} has already been claimed",
                clm.index
            )));
        }
        set_claimed(&mut deps.storage, clm.index, config.claimed_bitset)?;
    }
    // the commitment and escrow must be dead before the mint runs
    let mut commit_store = PrefixedStorage::new(prefix, &mut deps.storage);
    remove(&mut commit_store, sender_raw.as_slice());
    let mut messages = Vec::new();
    if is_public {
        let escrowed: u128 = {
            let escrow_store = ReadonlyPrefixedStorage::new(PREFIX_ESCROW, &deps.storage);
            may_load(&escrow_store, sender_raw.as_slice())?
        }
        .ok_or_else(|| {
            StdError::generic_err("The escrow record for this commitment is missing or inconsistent")
        })?;
        let mut escrow_store = PrefixedStorage::new(PREFIX_ESCROW, &mut deps.storage);
        remove(&mut escrow_store, sender_raw.as_slice());
        messages.push(CosmosMsg::Bank(BankMsg::Send {
            from_address: env.contract.address.clone(),
            to_address: deps.api.human_address(&config.splitter)?,
            amount: vec![Coin {
                denom: SALE_DENOM.to_string(),
                amount: Uint128(escrowed),
            }],
        }));
    }
    let receipt = mint::mint_token(
        &mut deps.storage,
        &mut config,
        &sender_raw,
        secret.as_slice(),
        &env.block,
    )?;
    save(&mut deps.storage, CONFIG_KEY, &config)?;

    Ok(HandleResponse {
        messages,
        log: vec![
            log("minter", &env.message.sender),
            log("token_id", receipt.token_id),
            log("rarity", receipt.tier),
        ],
        data: Some(to_binary(&HandleAnswer::Reveal {
            token_id: receipt.token_id,
            rarity: receipt.tier,
        })?),
    })
}

/// Returns HandleResult
///
/// cancels the sender's pending commitments and refunds any escrowed payment.
/// Cancellation is allowed at any time while a commitment is live
///
/// # Arguments
///
/// * `deps` - a mutable reference to Extern containing all the contract's external dependencies
/// * `env` - Env of contract's environment
fn try_cancel<S: Storage, A: Api, Q: Querier>(
    deps: &mut Extern<S, A, Q>,
    env: Env,
) -> HandleResult {
    let sender_raw = deps.api.canonical_address(&env.message.sender)?;
    let (cancelled_public, refund) = clear_commitments(&mut deps.storage, &sender_raw, None)?
        .ok_or_else(|| StdError::generic_err("You have no pending commitment to cancel"))?;
    let mut messages = Vec::new();
    if refund > 0 {
        messages.push(CosmosMsg::Bank(BankMsg::Send {
            from_address: env.contract.address,
            to_address: env.message.sender.clone(),
            amount: vec![Coin {
                denom: SALE_DENOM.to_string(),
                amount: Uint128(refund),
            }],
        }));
    }

    Ok(HandleResponse {
        messages,
        log: vec![
            log("user", &env.message.sender),
            log("public_phase", cancelled_public),
            log("refund", refund),
        ],
        data: Some(to_binary(&HandleAnswer::Cancel {
            refund: Uint128(refund),
        })?),
    })
}

/// Returns HandleResult
///
/// allows an admin to cancel another address' expired commitments, refunding any
/// escrow to the original committer.  Unlike Cancel, this only touches
/// commitments whose reveal window has closed
///
/// # Arguments
///
/// * `deps` - a mutable reference to Extern containing all the contract's external dependencies
/// * `env` - Env of contract's environment
/// * `address` - address whose expired commitments should be cancelled
fn try_force_cancel<S: Storage, A: Api, Q: Querier>(
    deps: &mut Extern<S, A, Q>,
    env: Env,
    address: HumanAddr,
) -> HandleResult {
    let config: Config = load(&deps.storage, CONFIG_KEY)?;
    let sender_raw = deps.api.canonical_address(&env.message.sender)?;
    if !config.admins.contains(&sender_raw) {
        return Err(StdError::unauthorized());
    }
    let user_raw = deps.api.canonical_address(&address)?;
    let expiry_cutoff = ExpiryCutoff {
        height: env.block.height,
        reveal_delay: config.reveal_delay,
        reveal_window: config.reveal_window,
    };
    let (cancelled_public, refund) =
        clear_commitments(&mut deps.storage, &user_raw, Some(expiry_cutoff))?.ok_or_else(
            || {
                StdError::generic_err(format!(
                    "Address {} has no expired commitment to cancel",
                    address
                ))
            },
        )?;
    let mut messages = Vec::new();
    if refund > 0 {
        messages.push(CosmosMsg::Bank(BankMsg::Send {
            from_address: env.contract.address,
            to_address: address.clone(),
            amount: vec![Coin {
                denom: SALE_DENOM.to_string(),
                amount: Uint128(refund),
            }],
        }));
    }

    Ok(HandleResponse {
        messages,
        log: vec![
            log("user", &address),
            log("public_phase", cancelled_public),
            log("refund", refund),
        ],
        data: Some(to_binary(&HandleAnswer::ForceCancel {
            user: address,
            refund: Uint128(refund),
        })?),
    })
}

/// Returns HandleResult
///
/// sets the sale phase
///
/// # Arguments
///
/// * `deps` - a mutable reference to Extern containing all the contract's external dependencies
/// * `sender` - a reference to the message sender
/// * `status` - new sale phase
fn try_set_sale_status<S: Storage, A: Api, Q: Querier>(
    deps: &mut Extern<S, A, Q>,
    sender: &HumanAddr,
    status: SaleStatus,
) -> HandleResult {
    // only allow admins to do this
    let mut config: Config = load(&deps.storage, CONFIG_KEY)?;
    let sender_raw = deps.api.canonical_address(sender)?;
    if !config.admins.contains(&sender_raw) {
        return Err(StdError::unauthorized());
    }
    // only save it if the status is different
    if config.sale_status != status {
        config.sale_status = status;
        save(&mut deps.storage, CONFIG_KEY, &config)?;
    }

    Ok(HandleResponse {
        messages: vec![],
        log: vec![],
        data: Some(to_binary(&HandleAnswer::SetSaleStatus { status })?),
    })
}

/// Returns HandleResult
///
/// selects which representation newly claimed allowlist indices are recorded in.
/// Reads always consult both representations, so toggling never forgets a claim
///
/// # Arguments
///
/// * `deps` - a mutable reference to Extern containing all the contract's external dependencies
/// * `sender` - a reference to the message sender
/// * `bitset` - true if claimed indices should be recorded in the compact bitset
fn try_set_claimed_format<S: Storage, A: Api, Q: Querier>(
    deps: &mut Extern<S, A, Q>,
    sender: &HumanAddr,
    bitset: bool,
) -> HandleResult {
    // only allow admins to do this
    let mut config: Config = load(&deps.storage, CONFIG_KEY)?;
    let sender_raw = deps.api.canonical_address(sender)?;
    if !config.admins.contains(&sender_raw) {
        return Err(StdError::unauthorized());
    }
    // only save it if the format is different
    if config.claimed_bitset != bitset {
        config.claimed_bitset = bitset;
        save(&mut deps.storage, CONFIG_KEY, &config)?;
    }

    Ok(HandleResponse {
        messages: vec![],
        log: vec![],
        data: Some(to_binary(&HandleAnswer::SetClaimedFormat {
            using_bitset: bitset,
        })?),
    })
}

/// Returns HandleResult
///
/// changes the revenue splitter address
///
/// # Arguments
///
/// * `deps` - a mutable reference to Extern containing all the contract's external dependencies
/// * `sender` - a reference to the message sender
/// * `address` - new revenue splitter address
fn try_new_splitter<S: Storage, A: Api, Q: Querier>(
    deps: &mut Extern<S, A, Q>,
    sender: &HumanAddr,
    address: HumanAddr,
) -> HandleResult {
    // only allow admins to do this
    let mut config: Config = load(&deps.storage, CONFIG_KEY)?;
    let sender_raw = deps.api.canonical_address(sender)?;
    if !config.admins.contains(&sender_raw) {
        return Err(StdError::unauthorized());
    }
    let splitter_raw = deps.api.canonical_address(&address)?;
    // only save it if the address is different
    if config.splitter != splitter_raw {
        config.splitter = splitter_raw;
        save(&mut deps.storage, CONFIG_KEY, &config)?;
    }

    Ok(HandleResponse {
        messages: vec![],
        log: vec![],
        data: Some(to_binary(&HandleAnswer::NewRevenueSplitter {
            revenue_splitter: address,
        })?),
    })
}

/// Returns HandleResult
///
/// adds to the the admin list
///
/// # Arguments
///
/// * `deps` - a mutable reference to Extern containing all the contract's external dependencies
/// * `sender` - a reference to the message sender
/// * `addrs_to_add` - list of addresses to add
fn try_add_admins<S: Storage, A: Api, Q: Querier>(
    deps: &mut Extern<S, A, Q>,
    sender: &HumanAddr,
    addrs_to_add: &[HumanAddr],
) -> HandleResult {
    // only allow admins to do this
    let mut config: Config = load(&deps.storage, CONFIG_KEY)?;
    let sender_raw = deps.api.canonical_address(sender)?;
    if !config.admins.contains(&sender_raw) {
        return Err(StdError::unauthorized());
    }
    // save list if it changed
    if add_addrs_to_auth(&deps.api, addrs_to_add, &mut config.admins)? {
        save(&mut deps.storage, CONFIG_KEY, &config)?;
    }
    let admins = config
        .admins
        .iter()
        .map(|a| deps.api.human_address(a))
        .collect::<StdResult<Vec<HumanAddr>>>()?;

    Ok(HandleResponse {
        messages: vec![],
        log: vec![],
        data: Some(to_binary(&HandleAnswer::AdminsList { admins })?),
    })
}

/// Returns HandleResult
///
/// removes from the admin list
///
/// # Arguments
///
/// * `deps` - a mutable reference to Extern containing all the contract's external dependencies
/// * `sender` - a reference to the message sender
/// * `addrs_to_remove` - list of addresses to remove
fn try_remove_admins<S: Storage, A: Api, Q: Querier>(
    deps: &mut Extern<S, A, Q>,
    sender: &HumanAddr,
    addrs_to_remove: &[HumanAddr],
) -> HandleResult {
    // only allow admins to do this
    let mut config: Config = load(&deps.storage, CONFIG_KEY)?;
    let sender_raw = deps.api.canonical_address(sender)?;
    if !config.admins.contains(&sender_raw) {
        return Err(StdError::unauthorized());
    }
    let old_len = config.admins.len();
    let rem_list = addrs_to_remove
        .iter()
        .map(|a| deps.api.canonical_address(a))
        .collect::<StdResult<Vec<CanonicalAddr>>>()?;
    config.admins.retain(|a| !rem_list.contains(a));
    // only save if the list changed
    if old_len != config.admins.len() {
        save(&mut deps.storage, CONFIG_KEY, &config)?;
    }
    let admins = config
        .admins
        .iter()
        .map(|a| deps.api.human_address(a))
        .collect::<StdResult<Vec<HumanAddr>>>()?;

    Ok(HandleResponse {
        messages: vec![],
        log: vec![],
        data: Some(to_binary(&HandleAnswer::AdminsList { admins })?),
    })
}

/// Returns HandleResult
///
/// creates a viewing key
///
/// # Arguments
///
/// * `deps` - mutable reference to Extern containing all the contract's external dependencies
/// * `env` - a reference to the Env of contract's environment
/// * `entropy` - string slice of the input String to be used as entropy in randomization
fn try_create_key<S: Storage, A: Api, Q: Querier>(
    deps: &mut Extern<S, A, Q>,
    env: &Env,
    entropy: &str,
) -> HandleResult {
    let prng_seed: Vec<u8> = load(&deps.storage, PRNG_SEED_KEY)?;
    let key = ViewingKey::new(env, &prng_seed, entropy.as_ref());
    let message_sender = &deps.api.canonical_address(&env.message.sender)?;
    let mut key_store = PrefixedStorage::new(PREFIX_VIEW_KEY, &mut deps.storage);
    save(&mut key_store, message_sender.as_slice(), &key.to_hashed())?;
    Ok(HandleResponse {
        messages: vec![],
        log: vec![],
        data: Some(to_binary(&HandleAnswer::ViewingKey { key: key.0 })?),
    })
}

/// Returns HandleResult
///
/// sets the viewing key to the input String
///
/// # Arguments
///
/// * `deps` - mutable reference to Extern containing all the contract's external dependencies
/// * `sender` - a reference to the message sender
/// * `key` - String to be used as the viewing key
fn try_set_key<S: Storage, A: Api, Q: Querier>(
    deps: &mut Extern<S, A, Q>,
    sender: &HumanAddr,
    key: String,
) -> HandleResult {
    let vk = ViewingKey(key.clone());
    let message_sender = &deps.api.canonical_address(sender)?;
    let mut key_store = PrefixedStorage::new(PREFIX_VIEW_KEY, &mut deps.storage);
    save(&mut key_store, message_sender.as_slice(), &vk.to_hashed())?;

    Ok(HandleResponse {
        messages: vec![],
        log: vec![],
        data: Some(to_binary(&HandleAnswer::ViewingKey { key })?),
    })
}

/// Returns HandleResult
///
/// revoke the ability to use a specified permit
///
/// # Arguments
///
/// * `storage` - mutable reference to the contract's storage
/// * `sender` - a reference to the message sender
/// * `permit_name` - string slice of the name of the permit to revoke
fn revoke_permit<S: Storage>(
    storage: &mut S,
    sender: &HumanAddr,
    permit_name: &str,
) -> HandleResult {
    RevokedPermits::revoke_permit(storage, PREFIX_REVOKED_PERMITS, sender, permit_name);

    Ok(HandleResponse {
        messages: vec![],
        log: vec![],
        data: Some(to_binary(&HandleAnswer::RevokePermit {
            status: "success".to_string(),
        })?),
    })
}

/////////////////////////////////////// Query /////////////////////////////////////
/// Returns QueryResult
///
/// # Arguments
///
/// * `deps` - reference to Extern containing all the contract's external dependencies
/// * `msg` - QueryMsg passed in with the query call
pub fn query<S: Storage, A: Api, Q: Querier>(deps: &Extern<S, A, Q>, msg: QueryMsg) -> QueryResult {
    let response = match msg {
        QueryMsg::SaleInfo {} => query_sale_info(&deps.storage),
        QueryMsg::MintCounts {} => query_counts(&deps.storage),
        QueryMsg::IsClaimed { index } => query_is_claimed(&deps.storage, index),
        QueryMsg::TokenRarity { token_id } => query_token_rarity(&deps.storage, token_id),
        QueryMsg::MyCommitments { viewer, permit } => query_my_commitments(deps, viewer, permit),
        QueryMsg::MyTokens { viewer, permit } => query_my_tokens(deps, viewer, permit),
        QueryMsg::Admins { viewer, permit } => query_admins(deps, viewer, permit),
    };
    pad_query_result(response, BLOCK_SIZE)
}

/// Returns QueryResult displaying the sale parameters and progress
///
/// # Arguments
///
/// * `storage` - reference to the contract's storage
fn query_sale_info<S: ReadonlyStorage>(storage: &S) -> QueryResult {
    let config: Config = load(storage, CONFIG_KEY)?;
    to_binary(&QueryAnswer::SaleInfo {
        status: config.sale_status,
        mint_price: config.mint_price,
        max_supply: config.max_supply,
        total_minted: config.total_minted,
        reveal_delay: config.reveal_delay,
        reveal_window: config.reveal_window,
    })
}

/// Returns QueryResult displaying the mint counts
///
/// # Arguments
///
/// * `storage` - reference to the contract's storage
fn query_counts<S: ReadonlyStorage>(storage: &S) -> QueryResult {
    let config: Config = load(storage, CONFIG_KEY)?;
    let tiers = [
        crate::msg::RarityTier::Common,
        crate::msg::RarityTier::Uncommon,
        crate::msg::RarityTier::Rare,
        crate::msg::RarityTier::Legendary,
    ];
    to_binary(&QueryAnswer::MintCounts {
        total: config.total_minted,
        by_rarity: tiers
            .iter()
            .map(|t| TierCount {
                tier: *t,
                count: config.tier_counts[t.to_idx()],
            })
            .collect(),
    })
}

/// Returns QueryResult displaying whether an allowlist index has been claimed
///
/// # Arguments
///
/// * `storage` - reference to the contract's storage
/// * `index` - allowlist index in question
fn query_is_claimed<S: ReadonlyStorage>(storage: &S, index: u32) -> QueryResult {
    to_binary(&QueryAnswer::IsClaimed {
        claimed: is_claimed(storage, index)?,
    })
}

/// Returns QueryResult displaying the rarity tier of a minted token
///
/// # Arguments
///
/// * `storage` - reference to the contract's storage
/// * `token_id` - token id in question
fn query_token_rarity<S: ReadonlyStorage>(storage: &S, token_id: u32) -> QueryResult {
    let token_store = ReadonlyPrefixedStorage::new(PREFIX_TOKENS, storage);
    let token: StoredToken = may_load(&token_store, &token_id.to_be_bytes())?
        .ok_or_else(|| StdError::generic_err(format!("Token {} has not been minted", token_id)))?;
    to_binary(&QueryAnswer::TokenRarity { rarity: token.tier })
}

/// Returns QueryResult displaying the querier's pending commitments
///
/// # Arguments
///
/// * `deps` - reference to Extern containing all the contract's external dependencies
/// * `viewer` - optional address and viewing key of the querier
/// * `permit` - optional permit used to verify the querier's identity
fn query_my_commitments<S: Storage, A: Api, Q: Querier>(
    deps: &Extern<S, A, Q>,
    viewer: Option<ViewerInfo>,
    permit: Option<Permit>,
) -> QueryResult {
    let (querier, _) = get_querier(deps, viewer, permit)?;
    let config: Config = load(&deps.storage, CONFIG_KEY)?;
    let allowlist = load_commitment_info(&deps.storage, &config, &querier, false)?;
    let public = load_commitment_info(&deps.storage, &config, &querier, true)?;
    to_binary(&QueryAnswer::MyCommitments { allowlist, public })
}

/// Returns QueryResult displaying the token ids and rarities owned by the querier
///
/// # Arguments
///
/// * `deps` - reference to Extern containing all the contract's external dependencies
/// * `viewer` - optional address and viewing key of the querier
/// * `permit` - optional permit used to verify the querier's identity
fn query_my_tokens<S: Storage, A: Api, Q: Querier>(
    deps: &Extern<S, A, Q>,
    viewer: Option<ViewerInfo>,
    permit: Option<Permit>,
) -> QueryResult {
    let (querier, _) = get_querier(deps, viewer, permit)?;
    let owned_store = ReadonlyPrefixedStorage::new(PREFIX_OWNED, &deps.storage);
    let owned: Vec<u32> = may_load(&owned_store, querier.as_slice())?.unwrap_or_default();
    let token_store = ReadonlyPrefixedStorage::new(PREFIX_TOKENS, &deps.storage);
    let tokens = owned
        .into_iter()
        .map(|id| {
            let token: StoredToken = load(&token_store, &id.to_be_bytes())?;
            Ok(TokenData {
                token_id: id,
                rarity: token.tier,
            })
        })
        .collect::<StdResult<Vec<TokenData>>>()?;
    to_binary(&QueryAnswer::MyTokens { tokens })
}

/// Returns QueryResult displaying the admin list
///
/// # Arguments
///
/// * `deps` - reference to Extern containing all the contract's external dependencies
/// * `viewer` - optional address and viewing key of an admin
/// * `permit` - optional permit with "owner" permission
fn query_admins<S: Storage, A: Api, Q: Querier>(
    deps: &Extern<S, A, Q>,
    viewer: Option<ViewerInfo>,
    permit: Option<Permit>,
) -> QueryResult {
    // only allow admins to do this
    let (config, _) = check_admin(deps, viewer, permit)?;
    to_binary(&QueryAnswer::Admins {
        admins: config
            .admins
            .iter()
            .map(|a| deps.api.human_address(a))
            .collect::<StdResult<Vec<HumanAddr>>>()?,
    })
}

//////////////////////////////////// Internals ////////////////////////////////////

/// expiry parameters used when force-cancelling
struct ExpiryCutoff {
    /// current block height
    height: u64,
    /// number of blocks that must pass after a commit before it can be revealed
    reveal_delay: u64,
    /// number of blocks after the earliest reveal during which a reveal is accepted
    reveal_window: u64,
}

impl ExpiryCutoff {
    /// Returns bool which is true if the commitment's reveal window has closed
    ///
    /// # Arguments
    ///
    /// * `commit` - a reference to the commitment in question
    fn is_expired(&self, commit: &StoredCommitment) -> bool {
        self.height > commit.block + self.reveal_delay + self.reveal_window
    }
}

/// Returns StdResult<bool> which is true if the sale accepts public commits, and
/// an error if the sale is not open at all
///
/// # Arguments
///
/// * `config` - a reference to the Config
fn assert_open_phase(config: &Config) -> StdResult<bool> {
    match config.sale_status {
        SaleStatus::Allowlist => Ok(false),
        SaleStatus::Public => Ok(true),
        SaleStatus::Closed => Err(StdError::generic_err("The sale is closed")),
        SaleStatus::SoldOut => Err(StdError::generic_err(
            "The sale is sold out.  No new tokens can be minted",
        )),
    }
}

/// Returns the commitment storage prefix of a sale phase
///
/// # Arguments
///
/// * `is_public` - true if this is the public sale phase
fn commit_prefix(is_public: bool) -> &'static [u8] {
    if is_public {
        PREFIX_PUBLIC_COMMIT
    } else {
        PREFIX_ALLOWLIST_COMMIT
    }
}

/// Returns StdResult<Option<(bool, u128)>> from deleting an address' live
/// commitments and escrow.  The bool is true if a public commitment was deleted,
/// and the u128 is the escrow amount that should be refunded.  Returns Ok(None)
/// if no commitment was eligible for deletion
///
/// # Arguments
///
/// * `storage` - a mutable reference to the contract's storage
/// * `user` - a reference to the address whose commitments should be deleted
/// * `cutoff` - if provided, only commitments past this expiry cutoff are deleted
fn clear_commitments<S: Storage>(
    storage: &mut S,
    user: &CanonicalAddr,
    cutoff: Option<ExpiryCutoff>,
) -> StdResult<Option<(bool, u128)>> {
    let mut cancelled_any = false;
    let mut cancelled_public = false;
    let mut refund = 0u128;
    for &is_public in [true, false].iter() {
        let prefix = commit_prefix(is_public);
        let commit: Option<StoredCommitment> = {
            let commit_store = ReadonlyPrefixedStorage::new(prefix, storage);
            may_load(&commit_store, user.as_slice())?
        };
        if let Some(cmt) = commit {
            if let Some(cut) = cutoff.as_ref() {
                if !cut.is_expired(&cmt) {
                    continue;
                }
            }
            let mut commit_store = PrefixedStorage::new(prefix, storage);
            remove(&mut commit_store, user.as_slice());
            cancelled_any = true;
            if is_public {
                cancelled_public = true;
                let escrowed: Option<u128> = {
                    let escrow_store = ReadonlyPrefixedStorage::new(PREFIX_ESCROW, storage);
                    may_load(&escrow_store, user.as_slice())?
                };
                if let Some(amt) = escrowed {
                    let mut escrow_store = PrefixedStorage::new(PREFIX_ESCROW, storage);
                    remove(&mut escrow_store, user.as_slice());
                    refund += amt;
                }
            }
        }
    }
    if cancelled_any {
        Ok(Some((cancelled_public, refund)))
    } else {
        Ok(None)
    }
}

/// Returns StdResult<bool> which is true if an allowlist index has been claimed
/// in either backing representation
///
/// # Arguments
///
/// * `storage` - a reference to the contract's storage
/// * `index` - allowlist index in question
fn is_claimed<S: ReadonlyStorage>(storage: &S, index: u32) -> StdResult<bool> {
    let map_store = ReadonlyPrefixedStorage::new(PREFIX_CLAIMED, storage);
    if may_load::<bool, _>(&map_store, &index.to_be_bytes())?.unwrap_or(false) {
        return Ok(true);
    }
    let bit_store = ReadonlyPrefixedStorage::new(PREFIX_CLAIMED_BITS, storage);
    let bucket: [u8; 32] =
        may_load(&bit_store, &(index >> 8).to_be_bytes())?.unwrap_or([0u8; 32]);
    let bit = (index & 255) as usize;
    Ok(bucket[bit / 8] >> (bit % 8) & 1 == 1)
}

/// Returns StdResult<()> after recording an allowlist index as claimed in the
/// currently selected representation
///
/// # Arguments
///
/// * `storage` - a mutable reference to the contract's storage
/// * `index` - allowlist index being claimed
/// * `use_bitset` - true if claims are currently recorded in the compact bitset
fn set_claimed<S: Storage>(storage: &mut S, index: u32, use_bitset: bool) -> StdResult<()> {
    if use_bitset {
        let key = (index >> 8).to_be_bytes();
        let mut bit_store = PrefixedStorage::new(PREFIX_CLAIMED_BITS, storage);
        let mut bucket: [u8; 32] = may_load(&bit_store, &key)?.unwrap_or([0u8; 32]);
        let bit = (index & 255) as usize;
        bucket[bit / 8] |= 1 << (bit % 8);
        save(&mut bit_store, &key, &bucket)
    } else {
        let mut map_store = PrefixedStorage::new(PREFIX_CLAIMED, storage);
        save(&mut map_store, &index.to_be_bytes(), &true)
    }
}

/// Returns StdResult<Option<CommitmentInfo>> of an address' pending commitment in
/// one phase, with its timing fields computed from the config
///
/// # Arguments
///
/// * `storage` - a reference to the contract's storage
/// * `config` - a reference to the Config
/// * `user` - a reference to the address in question
/// * `is_public` - true if this is the public sale phase
fn load_commitment_info<S: ReadonlyStorage>(
    storage: &S,
    config: &Config,
    user: &CanonicalAddr,
    is_public: bool,
) -> StdResult<Option<CommitmentInfo>> {
    let commit_store = ReadonlyPrefixedStorage::new(commit_prefix(is_public), storage);
    let commit: Option<StoredCommitment> = may_load(&commit_store, user.as_slice())?;
    commit
        .map(|cmt| {
            let earliest_reveal = cmt.block + config.reveal_delay;
            let escrow = if is_public {
                let escrow_store = ReadonlyPrefixedStorage::new(PREFIX_ESCROW, storage);
                may_load::<u128, _>(&escrow_store, user.as_slice())?.map(Uint128)
            } else {
                None
            };
            Ok(CommitmentInfo {
                committed_block: cmt.block,
                earliest_reveal,
                expiry: earliest_reveal + config.reveal_window,
                escrow,
            })
        })
        .transpose()
}

/// Returns StdResult<bool> which is true if the admin list has changed after attempting
/// to add a list of addresses that do not collide
///
/// # Arguments
///
/// * `api` - a reference to the Api used to convert human and canonical addresses
/// * `addrs_to_add` - list of addresses to add
/// * `auth_list` - a mutable reference to the list of authorized addresses
fn add_addrs_to_auth<A: Api>(
    api: &A,
    addrs_to_add: &[HumanAddr],
    auth_list: &mut Vec<CanonicalAddr>,
) -> StdResult<bool> {
    let mut save_it = false;
    for addr in addrs_to_add.iter() {
        let raw = api.canonical_address(addr)?;
        if !auth_list.contains(&raw) {
            auth_list.push(raw);
            save_it = true;
        }
    }
    Ok(save_it)
}

/// Returns StdResult<(CanonicalAddr, Option<CanonicalAddr>)> from determining the querying address
/// (if possible) either from a Permit or a ViewerInfo.  Also returns this contract's address if
/// a permit was supplied
///
/// # Arguments
///
/// * `deps` - a reference to Extern containing all the contract's external dependencies
/// * `viewer` - optional address and viewing key making an authenticated query request
/// * `permit` - optional permit with "owner" permission
fn get_querier<S: Storage, A: Api, Q: Querier>(
    deps: &Extern<S, A, Q>,
    viewer: Option<ViewerInfo>,
    permit: Option<Permit>,
) -> StdResult<(CanonicalAddr, Option<CanonicalAddr>)> {
    if let Some(pmt) = permit {
        // Validate permit content
        let me_raw: CanonicalAddr = may_load(&deps.storage, MY_ADDRESS_KEY)?
            .ok_or_else(|| StdError::generic_err("Minter contract address storage is corrupt"))?;
        let my_address = deps.api.human_address(&me_raw)?;
        let querier = deps.api.canonical_address(&validate(
            deps,
            PREFIX_REVOKED_PERMITS,
            &pmt,
            my_address,
        )?)?;
        if !pmt.check_permission(&secret_toolkit::permit::Permission::Owner) {
            return Err(StdError::generic_err(format!(
                "Owner permission is required for queries, got permissions {:?}",
                pmt.params.permissions
            )));
        }
        return Ok((querier, Some(me_raw)));
    }
    if let Some(vwr) = viewer {
        let raw = deps.api.canonical_address(&vwr.address)?;
        // load the address' key
        let key_store = ReadonlyPrefixedStorage::new(PREFIX_VIEW_KEY, &deps.storage);
        let load_key: [u8; VIEWING_KEY_SIZE] =
            may_load(&key_store, raw.as_slice())?.unwrap_or_else(|| [0u8; VIEWING_KEY_SIZE]);
        let input_key = ViewingKey(vwr.viewing_key);
        // if key matches
        if input_key.check_viewing_key(&load_key) {
            return Ok((raw, None));
        }
    }
    Err(StdError::unauthorized())
}

/// Returns StdResult<(Config, Option<CanonicalAddr>)> which is the Config and this
/// contract's address if it has been retrieved, and checks if the querier is an admin
///
/// # Arguments
///
/// * `deps` - a reference to Extern containing all the contract's external dependencies
/// * `viewer` - optional address and viewing key making an authenticated query request
/// * `permit` - optional permit with "owner" permission
fn check_admin<S: Storage, A: Api, Q: Querier>(
    deps: &Extern<S, A, Q>,
    viewer: Option<ViewerInfo>,
    permit: Option<Permit>,
) -> StdResult<(Config, Option<CanonicalAddr>)> {
    let (admin, my_addr) = get_querier(deps, viewer, permit)?;
    // only allow admins to do this
    let config: Config = load(&deps.storage, CONFIG_KEY)?;
    if !config.admins.contains(&admin) {
        return Err(StdError::unauthorized());
    }
    Ok((config, my_addr))
}
