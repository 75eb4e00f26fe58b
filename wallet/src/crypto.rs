use bech32::{ToBase32, Variant};
use ripemd160::Ripemd160;
use secp256k1::{Message, PublicKey, Secp256k1, Signature};
use sha2::{Digest, Sha256};

use cosmwasm_std::{Binary, HumanAddr, StdError, StdResult, Uint128};
use serde::Serialize;

/// name bound into every sign doc
pub const DOMAIN_NAME: &str = "cryptid-wallet";
/// version bound into every sign doc
pub const DOMAIN_VERSION: &str = "1";
/// bech32 prefix of signer addresses
pub const BECH32_HRP: &str = "secret";

/// Returns [u8; 32] of the sha256 hash of the input data
///
/// # Arguments
///
/// * `data` - a slice of the data to hash
pub fn sha_256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let hash = hasher.finalize();

    let mut result = [0u8; 32];
    result.copy_from_slice(hash.as_slice());
    result
}

/// fields binding a sign doc to one deployed wallet on one chain.  A signature
/// produced for one wallet instance can never be replayed against another
#[derive(Serialize)]
pub struct Domain {
    /// fixed domain name
    pub name: String,
    /// fixed domain version
    pub version: String,
    /// chain id the wallet is deployed on
    pub chain_id: String,
    /// address of the wallet contract
    pub verifying_contract: HumanAddr,
}

/// the typed payload a signer authorizes.  Clients MUST serialize this exact
/// structure (json, fields in declaration order) and sign the sha256 of the
/// bytes, because the wallet rebuilds the digest independently on execution
#[derive(Serialize)]
pub struct MetaTxSignDoc {
    /// domain separation fields
    pub domain: Domain,
    /// address authorizing the call
    pub from: HumanAddr,
    /// the signer's current nonce
    pub nonce: u64,
    /// address of the contract to call
    pub to: HumanAddr,
    /// code hash of the contract to call
    pub code_hash: String,
    /// uscrt forwarded with the call
    pub value: Uint128,
    /// sha256 of the call's message bytes
    pub data_hash: Binary,
}

/// Returns StdResult<[u8; 32]> which is the digest a signer must sign for this
/// sign doc
///
/// # Arguments
///
/// * `doc` - a reference to the sign doc
pub fn sign_doc_digest(doc: &MetaTxSignDoc) -> StdResult<[u8; 32]> {
    let bytes = serde_json_wasm::to_vec(doc)
        .map_err(|e| StdError::serialize_err("MetaTxSignDoc", e))?;
    Ok(sha_256(&bytes))
}

/// Returns StdResult<()> which is Ok only if the signature over the digest was
/// produced by the holder of the pubkey
///
/// # Arguments
///
/// * `digest` - the sign doc digest
/// * `signature` - 64 byte compact signature
/// * `pubkey` - 33 byte compressed secp256k1 pubkey
pub fn verify_signature(digest: &[u8; 32], signature: &[u8], pubkey: &[u8]) -> StdResult<()> {
    let secp = Secp256k1::verification_only();
    let message = Message::from_slice(digest)
        .map_err(|_| StdError::generic_err("The meta transaction signature is invalid"))?;
    let key = PublicKey::from_slice(pubkey)
        .map_err(|_| StdError::generic_err("The meta transaction pubkey is malformed"))?;
    let sig = Signature::from_compact(signature)
        .map_err(|_| StdError::generic_err("The meta transaction signature is malformed"))?;
    secp.verify(&message, &sig, &key)
        .map_err(|_| StdError::generic_err("The meta transaction signature is invalid"))
}

/// Returns StdResult<HumanAddr> of the bech32 address belonging to a pubkey
///
/// # Arguments
///
/// * `pubkey` - 33 byte compressed secp256k1 pubkey
pub fn pubkey_to_address(pubkey: &[u8]) -> StdResult<HumanAddr> {
    if pubkey.len() != 33 {
        return Err(StdError::generic_err(
            "The meta transaction pubkey is malformed",
        ));
    }
    let mut hasher = Ripemd160::new();
    hasher.update(&sha_256(pubkey));
    let hash = hasher.finalize();
    let encoded = bech32::encode(BECH32_HRP, hash.as_slice().to_base32(), Variant::Bech32)
        .map_err(|_| StdError::generic_err("Unable to bech32 encode the signer address"))?;
    Ok(HumanAddr(encoded))
}
