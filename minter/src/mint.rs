use cosmwasm_std::{BlockInfo, CanonicalAddr, StdError, StdResult, Storage};
use cosmwasm_storage::PrefixedStorage;

use crate::msg::RarityTier;
use crate::rand::sha_256;
use crate::state::{
    Config, StoredToken, PREFIX_ID_POOL, PREFIX_OWNED, PREFIX_TOKENS, PRNG_SEED_KEY,
};
use crate::storage::{load, may_load, remove, save};

/// domain separator for the rarity roll so it is independent of the token id draw
const RARITY_DOMAIN: &[u8] = b"RARITY";

/// out of 10000, rolls below this are legendary
const LEGENDARY_CEILING: u64 = 10;
/// out of 10000, rolls below this (and not legendary) are rare
const RARE_CEILING: u64 = 500;
/// out of 10000, rolls below this (and not rare) are uncommon
const UNCOMMON_CEILING: u64 = 2500;

/// the token minted by a successful reveal
pub struct MintReceipt {
    /// id drawn from the remaining pool
    pub token_id: u32,
    /// rarity tier rolled
    pub tier: RarityTier,
}

/// Returns StdResult<MintReceipt> from minting a token to the recipient
///
/// Draws a token id without replacement from the remaining pool and rolls an
/// independent rarity tier, both seeded by the revealed secret.  The caller is
/// responsible for saving the updated config
///
/// # Arguments
///
/// * `storage` - a mutable reference to the contract's storage
/// * `config` - a mutable reference to the Config
/// * `recipient` - a reference to the recipient's address
/// * `secret` - the revealed secret bytes
/// * `block` - a reference to the current BlockInfo
pub fn mint_token<S: Storage>(
    storage: &mut S,
    config: &mut Config,
    recipient: &CanonicalAddr,
    secret: &[u8],
    block: &BlockInfo,
) -> StdResult<MintReceipt> {
    if config.total_minted >= config.max_supply {
        return Err(StdError::generic_err(format!(
            "All {} tokens have been minted and the sale is sold out",
            config.max_supply
        )));
    }
    let entropy = derive_entropy(storage, config, recipient, secret, block)?;
    let token_id = draw_token_id(storage, config, &entropy)?;
    let tier = rarity_tier(rarity_roll(&entropy));
    let mut token_store = PrefixedStorage::new(PREFIX_TOKENS, storage);
    save(
        &mut token_store,
        &token_id.to_be_bytes(),
        &StoredToken {
            tier,
            owner: recipient.clone(),
        },
    )?;
    let mut owned_store = PrefixedStorage::new(PREFIX_OWNED, storage);
    let mut owned: Vec<u32> = may_load(&owned_store, recipient.as_slice())?.unwrap_or_default();
    owned.push(token_id);
    save(&mut owned_store, recipient.as_slice(), &owned)?;
    config.total_minted += 1;
    config.tier_counts[tier.to_idx()] += 1;
    if config.total_minted == config.max_supply {
        config.sale_status = crate::msg::SaleStatus::SoldOut;
    }

    Ok(MintReceipt { token_id, tier })
}

/// Returns StdResult<[u8; 32]> which is the entropy for this mint
///
/// Hashes the stored prng seed with the reveal block's height and time, the
/// recipient, the running mint count, and the revealed secret, then ratchets the
/// stored seed forward.  The seed is private contract state, so the outcome can
/// not be ground out by the committer when choosing a secret
///
/// # Arguments
///
/// * `storage` - a mutable reference to the contract's storage
/// * `config` - a reference to the Config
/// * `recipient` - a reference to the recipient's address
/// * `secret` - the revealed secret bytes
/// * `block` - a reference to the current BlockInfo
fn derive_entropy<S: Storage>(
    storage: &mut S,
    config: &Config,
    recipient: &CanonicalAddr,
    secret: &[u8],
    block: &BlockInfo,
) -> StdResult<[u8; 32]> {
    let seed: Vec<u8> = load(storage, PRNG_SEED_KEY)?;
    let mut input =
        Vec::with_capacity(seed.len() + 20 + recipient.as_slice().len() + secret.len());
    input.extend_from_slice(&seed);
    input.extend_from_slice(&block.height.to_be_bytes());
    input.extend_from_slice(&block.time.to_be_bytes());
    input.extend_from_slice(recipient.as_slice());
    input.extend_from_slice(&config.total_minted.to_be_bytes());
    input.extend_from_slice(secret);
    let entropy = sha_256(&input);
    let mut next = Vec::with_capacity(seed.len() + entropy.len());
    next.extend_from_slice(&seed);
    next.extend_from_slice(&entropy);
    save(storage, PRNG_SEED_KEY, &sha_256(&next).to_vec())?;

    Ok(entropy)
}

/// Returns StdResult<u32> which is the token id drawn from the remaining pool
///
/// The pool is a virtual permutation of [0, max_supply).  A slot with no stored
/// occupant holds its own index.  Drawing swaps the last live slot's occupant
/// into the drawn slot and shrinks the pool by one, so every draw is O(1) and
/// ids are never repeated
///
/// # Arguments
///
/// * `storage` - a mutable reference to the contract's storage
/// * `config` - a reference to the Config
/// * `entropy` - the entropy for this mint
fn draw_token_id<S: Storage>(
    storage: &mut S,
    config: &Config,
    entropy: &[u8; 32],
) -> StdResult<u32> {
    let remaining = config.max_supply - config.total_minted;
    let slot = (first_u64(entropy) % remaining as u64) as u32;
    let last = remaining - 1;
    let mut pool = PrefixedStorage::new(PREFIX_ID_POOL, storage);
    let drawn: u32 = may_load(&pool, &slot.to_be_bytes())?.unwrap_or(slot);
    if slot != last {
        let last_occupant: u32 = may_load(&pool, &last.to_be_bytes())?.unwrap_or(last);
        save(&mut pool, &slot.to_be_bytes(), &last_occupant)?;
    }
    remove(&mut pool, &last.to_be_bytes());

    Ok(drawn)
}

/// Returns u64 which is this mint's rarity roll out of 10000
///
/// # Arguments
///
/// * `entropy` - the entropy for this mint
pub fn rarity_roll(entropy: &[u8; 32]) -> u64 {
    let mut input = Vec::with_capacity(entropy.len() + RARITY_DOMAIN.len());
    input.extend_from_slice(entropy);
    input.extend_from_slice(RARITY_DOMAIN);
    first_u64(&sha_256(&input)) % 10000
}

/// Returns RarityTier of a rarity roll
///
/// # Arguments
///
/// * `roll` - a rarity roll out of 10000
pub fn rarity_tier(roll: u64) -> RarityTier {
    if roll < LEGENDARY_CEILING {
        RarityTier::Legendary
    } else if roll < RARE_CEILING {
        RarityTier::Rare
    } else if roll < UNCOMMON_CEILING {
        RarityTier::Uncommon
    } else {
        RarityTier::Common
    }
}

/// Returns u64 read big endian from the first 8 bytes of a hash
///
/// # Arguments
///
/// * `hash` - a 32 byte hash
fn first_u64(hash: &[u8; 32]) -> u64 {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(&hash[..8]);
    u64::from_be_bytes(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosmwasm_std::testing::MockStorage;
    use cosmwasm_std::{Binary, Uint128};
    use std::collections::HashSet;

    fn test_config(max_supply: u32) -> Config {
        Config {
            admins: Vec::new(),
            sale_status: crate::msg::SaleStatus::Public,
            mint_price: Uint128(1000000),
            max_supply,
            reveal_delay: 10,
            reveal_window: 50,
            merkle_root: [0u8; 32],
            splitter: CanonicalAddr(Binary(vec![9u8; 20])),
            total_minted: 0,
            claimed_bitset: false,
            tier_counts: [0; 4],
        }
    }

    fn test_block(height: u64) -> BlockInfo {
        BlockInfo {
            height,
            time: height * 6,
            chain_id: "secret-4".to_string(),
        }
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(rarity_tier(0), RarityTier::Legendary);
        assert_eq!(rarity_tier(9), RarityTier::Legendary);
        assert_eq!(rarity_tier(10), RarityTier::Rare);
        assert_eq!(rarity_tier(499), RarityTier::Rare);
        assert_eq!(rarity_tier(500), RarityTier::Uncommon);
        assert_eq!(rarity_tier(2499), RarityTier::Uncommon);
        assert_eq!(rarity_tier(2500), RarityTier::Common);
        assert_eq!(rarity_tier(9999), RarityTier::Common);
    }

    #[test]
    fn test_tier_distribution() {
        let mut counts = [0u32; 4];
        for roll in 0u64..10000 {
            counts[rarity_tier(roll).to_idx()] += 1;
        }
        assert_eq!(counts[RarityTier::Legendary.to_idx()], 10);
        assert_eq!(counts[RarityTier::Rare.to_idx()], 490);
        assert_eq!(counts[RarityTier::Uncommon.to_idx()], 2000);
        assert_eq!(counts[RarityTier::Common.to_idx()], 7500);
    }

    #[test]
    fn test_draw_without_replacement() {
        let mut storage = MockStorage::default();
        let mut config = test_config(8);
        // exercise the pool directly with entropies that hit every slot pattern
        let mut drawn = HashSet::new();
        for i in 0u8..8 {
            let entropy = sha_256(&[i, i.wrapping_mul(37), 5]);
            let id = draw_token_id(&mut storage, &config, &entropy).unwrap();
            config.total_minted += 1;
            assert!(id < 8);
            assert!(drawn.insert(id), "token id {} drawn twice", id);
        }
        assert_eq!(drawn.len(), 8);
    }

    #[test]
    fn test_mint_sequence() {
        let mut storage = MockStorage::default();
        save(&mut storage, PRNG_SEED_KEY, &vec![3u8; 32]).unwrap();
        let mut config = test_config(5);
        let owner = CanonicalAddr(Binary(vec![1u8; 20]));
        let mut ids = HashSet::new();
        for i in 0u64..5 {
            let receipt = mint_token(
                &mut storage,
                &mut config,
                &owner,
                format!("secret {}", i).as_bytes(),
                &test_block(100 + i),
            )
            .unwrap();
            assert!(receipt.token_id < 5);
            assert!(ids.insert(receipt.token_id));
        }
        assert_eq!(config.total_minted, 5);
        assert_eq!(config.sale_status, crate::msg::SaleStatus::SoldOut);
        assert_eq!(config.tier_counts.iter().sum::<u32>(), 5);
        // the pool is spent
        let err = mint_token(
            &mut storage,
            &mut config,
            &owner,
            b"one more",
            &test_block(200),
        )
        .unwrap_err();
        let msg = format!("{}", err);
        assert!(msg.contains("sold out"), "unexpected error: {}", msg);
        // every minted id has a record and the owner holds all five
        let owned_store = PrefixedStorage::new(PREFIX_OWNED, &mut storage);
        let owned: Vec<u32> = may_load(&owned_store, owner.as_slice()).unwrap().unwrap();
        assert_eq!(owned.len(), 5);
    }

    #[test]
    fn test_entropy_ratchets() {
        let mut storage = MockStorage::default();
        save(&mut storage, PRNG_SEED_KEY, &vec![3u8; 32]).unwrap();
        let config = test_config(100);
        let owner = CanonicalAddr(Binary(vec![1u8; 20]));
        let first = derive_entropy(&mut storage, &config, &owner, b"same", &test_block(50)).unwrap();
        let second =
            derive_entropy(&mut storage, &config, &owner, b"same", &test_block(50)).unwrap();
        // identical inputs still diverge because the seed moved
        assert_ne!(first, second);
    }
}
