use cosmwasm_std::{
    log, to_binary, Api, Binary, CanonicalAddr, Coin, CosmosMsg, Env, Extern, HandleResponse,
    HandleResult, HumanAddr, InitResponse, InitResult, Querier, QueryResult, ReadonlyStorage,
    StdError, StdResult, Storage, Uint128, WasmMsg,
};
use cosmwasm_storage::{PrefixedStorage, ReadonlyPrefixedStorage};

use secret_toolkit::utils::{pad_handle_result, pad_query_result};

use crate::crypto::{
    pubkey_to_address, sha_256, sign_doc_digest, verify_signature, Domain, MetaTxSignDoc,
    DOMAIN_NAME, DOMAIN_VERSION,
};
use crate::msg::{ContractInfo, HandleAnswer, HandleMsg, InitMsg, QueryAnswer, QueryMsg};
use crate::state::{Config, CONFIG_KEY, PREFIX_NONCE};
use crate::storage::{load, may_load, save};

pub const BLOCK_SIZE: usize = 256;
/// the only denom the wallet forwards
pub const SEND_DENOM: &str = "uscrt";

////////////////////////////////////// Init ///////////////////////////////////////
/// Returns InitResult
///
/// Initializes the wallet contract
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
    let sender_raw = deps.api.canonical_address(&env.message.sender)?;
    let mut admins = vec![sender_raw];
    if let Some(addrs) = msg.admins {
        add_admins(&deps.api, &addrs, &mut admins)?;
    }
    let mut signers = Vec::new();
    for addr in msg.signers.into_iter() {
        if !signers.contains(&addr) {
            signers.push(addr);
        }
    }
    let config = Config { admins, signers };
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
        HandleMsg::ExecuteMetaTransaction {
            from,
            to,
            value,
            data,
            pubkey,
            signature,
        } => try_execute(deps, env, from, to, value, data, pubkey, signature),
        HandleMsg::Deposit {} => try_deposit(&env),
        HandleMsg::AddSigners { signers } => try_add_signers(deps, &env.message.sender, signers),
        HandleMsg::RemoveSigners { signers } => {
            try_remove_signers(deps, &env.message.sender, &signers)
        }
        HandleMsg::AddAdmins { admins } => try_add_admins(deps, &env.message.sender, &admins),
        HandleMsg::RemoveAdmins { admins } => try_remove_admins(deps, &env.message.sender, &admins),
    };
    pad_handle_result(response, BLOCK_SIZE)
}

/// Returns HandleResult
///
/// executes a call one of this wallet's signers authorized offline.  The sign doc
/// digest is rebuilt from the wallet's own domain fields and the signer's stored
/// nonce, so a signature can neither be replayed nor redirected to another wallet.
/// The nonce is consumed before the call is dispatched
///
/// # Arguments
///
/// * `deps` - a mutable reference to Extern containing all the contract's external dependencies
/// * `env` - Env of contract's environment
/// * `from` - address that authorized the call
/// * `to` - code hash and address of the contract to call
/// * `value` - uscrt to forward with the call
/// * `data` - the call's message bytes
/// * `pubkey` - compressed secp256k1 pubkey of the signer
/// * `signature` - signature over the wallet's sign doc
#[allow(clippy::too_many_arguments)]
fn try_execute<S: Storage, A: Api, Q: Querier>(
    deps: &mut Extern<S, A, Q>,
    env: Env,
    from: HumanAddr,
    to: ContractInfo,
    value: Uint128,
    data: Binary,
    pubkey: Binary,
    signature: Binary,
) -> HandleResult {
    let config: Config = load(&deps.storage, CONFIG_KEY)?;
    // the allow-set decides who may act through this wallet, independent of the
    // signature check below
    if !config.signers.contains(&from) {
        return Err(StdError::unauthorized());
    }
    let nonce: u64 = {
        let nonce_store = ReadonlyPrefixedStorage::new(PREFIX_NONCE, &deps.storage);
        may_load(&nonce_store, from.0.as_bytes())?
    }
    .unwrap_or(0);
    let doc = MetaTxSignDoc {
        domain: Domain {
            name: DOMAIN_NAME.to_string(),
            version: DOMAIN_VERSION.to_string(),
            chain_id: env.block.chain_id.clone(),
            verifying_contract: env.contract.address.clone(),
        },
        from: from.clone(),
        nonce,
        to: to.address.clone(),
        code_hash: to.code_hash.clone(),
        value,
        data_hash: Binary(sha_256(data.as_slice()).to_vec()),
    };
    let digest = sign_doc_digest(&doc)?;
    verify_signature(&digest, signature.as_slice(), pubkey.as_slice())?;
    let signer = pubkey_to_address(pubkey.as_slice())?;
    if signer != from {
        return Err(StdError::generic_err(
            "The meta transaction signature was not produced by the from address",
        ));
    }
    // consume the nonce before anything is dispatched
    let mut nonce_store = PrefixedStorage::new(PREFIX_NONCE, &mut deps.storage);
    save(&mut nonce_store, from.0.as_bytes(), &(nonce + 1))?;
    let mut send = Vec::new();
    if value.u128() > 0 {
        send.push(Coin {
            denom: SEND_DENOM.to_string(),
            amount: value,
        });
    }
    let messages = vec![CosmosMsg::Wasm(WasmMsg::Execute {
        contract_addr: to.address.clone(),
        callback_code_hash: to.code_hash,
        msg: data.clone(),
        send,
    })];

    Ok(HandleResponse {
        messages,
        log: vec![
            log("from", &from),
            log("to", &to.address),
            log("value", value),
            log("data", data.to_base64()),
        ],
        data: Some(to_binary(&HandleAnswer::ExecuteMetaTransaction {
            from,
            nonce_used: nonce,
        })?),
    })
}

/// Returns HandleResult
///
/// accepts a deposit the wallet can later forward with meta transactions
///
/// # Arguments
///
/// * `env` - a reference to the Env of contract's environment
fn try_deposit(env: &Env) -> HandleResult {
    let deposited: u128 = env
        .message
        .sent_funds
        .iter()
        .filter(|c| c.denom == *SEND_DENOM)
        .map(|c| c.amount.u128())
        .sum();
    if deposited == 0 {
        return Err(StdError::generic_err("No uscrt was sent to deposit"));
    }

    Ok(HandleResponse {
        messages: vec![],
        log: vec![],
        data: Some(to_binary(&HandleAnswer::Deposit {
            deposited: Uint128(deposited),
        })?),
    })
}

/// Returns HandleResult
///
/// adds authorized signers
///
/// # Arguments
///
/// * `deps` - a mutable reference to Extern containing all the contract's external dependencies
/// * `sender` - a reference to the message sender
/// * `signers_to_add` - list of addresses to authorize
fn try_add_signers<S: Storage, A: Api, Q: Querier>(
    deps: &mut Extern<S, A, Q>,
    sender: &HumanAddr,
    signers_to_add: Vec<HumanAddr>,
) -> HandleResult {
    // only allow admins to do this
    let mut config: Config = load(&deps.storage, CONFIG_KEY)?;
    let sender_raw = deps.api.canonical_address(sender)?;
    if !config.admins.contains(&sender_raw) {
        return Err(StdError::unauthorized());
    }
    let mut save_it = false;
    for addr in signers_to_add.into_iter() {
        if !config.signers.contains(&addr) {
            config.signers.push(addr);
            save_it = true;
        }
    }
    // save list if it changed
    if save_it {
        save(&mut deps.storage, CONFIG_KEY, &config)?;
    }

    Ok(HandleResponse {
        messages: vec![],
        log: vec![],
        data: Some(to_binary(&HandleAnswer::SignersList {
            signers: config.signers,
        })?),
    })
}

/// Returns HandleResult
///
/// removes authorized signers
///
/// # Arguments
///
/// * `deps` - a mutable reference to Extern containing all the contract's external dependencies
/// * `sender` - a reference to the message sender
/// * `signers_to_remove` - list of addresses to revoke signing authority from
fn try_remove_signers<S: Storage, A: Api, Q: Querier>(
    deps: &mut Extern<S, A, Q>,
    sender: &HumanAddr,
    signers_to_remove: &[HumanAddr],
) -> HandleResult {
    // only allow admins to do this
    let mut config: Config = load(&deps.storage, CONFIG_KEY)?;
    let sender_raw = deps.api.canonical_address(sender)?;
    if !config.admins.contains(&sender_raw) {
        return Err(StdError::unauthorized());
    }
    let old_len = config.signers.len();
    config.signers.retain(|s| !signers_to_remove.contains(s));
    // only save if the list changed
    if old_len != config.signers.len() {
        save(&mut deps.storage, CONFIG_KEY, &config)?;
    }

    Ok(HandleResponse {
        messages: vec![],
        log: vec![],
        data: Some(to_binary(&HandleAnswer::SignersList {
            signers: config.signers,
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
    if add_admins(&deps.api, addrs_to_add, &mut config.admins)? {
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

/////////////////////////////////////// Query /////////////////////////////////////
/// Returns QueryResult
///
/// # Arguments
///
/// * `deps` - reference to Extern containing all the contract's external dependencies
/// * `msg` - QueryMsg passed in with the query call
pub fn query<S: Storage, A: Api, Q: Querier>(deps: &Extern<S, A, Q>, msg: QueryMsg) -> QueryResult {
    let response = match msg {
        QueryMsg::Nonce { signer } => query_nonce(&deps.storage, &signer),
        QueryMsg::Signers {} => query_signers(&deps.storage),
    };
    pad_query_result(response, BLOCK_SIZE)
}

/// Returns QueryResult displaying the next nonce expected from a signer
///
/// # Arguments
///
/// * `storage` - reference to the contract's storage
/// * `signer` - a reference to the signer address in question
fn query_nonce<S: ReadonlyStorage>(storage: &S, signer: &HumanAddr) -> QueryResult {
    let nonce_store = ReadonlyPrefixedStorage::new(PREFIX_NONCE, storage);
    let nonce: u64 = may_load(&nonce_store, signer.0.as_bytes())?.unwrap_or(0);
    to_binary(&QueryAnswer::Nonce { nonce })
}

/// Returns QueryResult displaying the authorized signers
///
/// # Arguments
///
/// * `storage` - reference to the contract's storage
fn query_signers<S: ReadonlyStorage>(storage: &S) -> QueryResult {
    let config: Config = load(storage, CONFIG_KEY)?;
    to_binary(&QueryAnswer::Signers {
        signers: config.signers,
    })
}

/// Returns StdResult<bool> which is true if the admin list has changed after attempting
/// to add a list of addresses that do not collide
///
/// # Arguments
///
/// * `api` - a reference to the Api used to convert human and canonical addresses
/// * `addrs_to_add` - list of addresses to add
/// * `admins` - a mutable reference to the list of admins
fn add_admins<A: Api>(
    api: &A,
    addrs_to_add: &[HumanAddr],
    admins: &mut Vec<CanonicalAddr>,
) -> StdResult<bool> {
    let mut save_it = false;
    for addr in addrs_to_add.iter() {
        let raw = api.canonical_address(addr)?;
        if !admins.contains(&raw) {
            admins.push(raw);
            save_it = true;
        }
    }
    Ok(save_it)
}

#[cfg(test)]
mod tests {
    use super::*;
    use cosmwasm_std::testing::{mock_dependencies, mock_env, MockApi, MockQuerier, MockStorage};
    use cosmwasm_std::{coins, from_binary};
    use secp256k1::{PublicKey, Secp256k1, SecretKey};

    fn extract_error<T>(error: StdResult<T>) -> String {
        match error {
            Ok(_) => panic!("Operation unexpectedly succeeded"),
            Err(err) => match err {
                StdError::GenericErr { msg, .. } => msg,
                StdError::Unauthorized { .. } => "unauthorized".to_string(),
                other => panic!("Unexpected error result {:?}", other),
            },
        }
    }

    struct TestSigner {
        sk: SecretKey,
        pubkey: Vec<u8>,
        address: HumanAddr,
    }

    fn test_signer(seed: u8) -> TestSigner {
        let secp = Secp256k1::new();
        let sk = SecretKey::from_slice(&[seed; 32]).unwrap();
        let pubkey = PublicKey::from_secret_key(&secp, &sk).serialize().to_vec();
        let address = pubkey_to_address(&pubkey).unwrap();
        TestSigner {
            sk,
            pubkey,
            address,
        }
    }

    fn init_helper(signers: Vec<HumanAddr>) -> Extern<MockStorage, MockApi, MockQuerier> {
        let mut deps = mock_dependencies(20, &[]);
        init(
            &mut deps,
            mock_env("admin", &[]),
            InitMsg {
                signers,
                admins: None,
            },
        )
        .unwrap();
        deps
    }

    /// signs the doc the wallet will rebuild for these call parameters
    fn sign_meta_tx(
        signer: &TestSigner,
        from: &HumanAddr,
        env: &Env,
        nonce: u64,
        to: &ContractInfo,
        value: Uint128,
        data: &Binary,
    ) -> Binary {
        let doc = MetaTxSignDoc {
            domain: Domain {
                name: DOMAIN_NAME.to_string(),
                version: DOMAIN_VERSION.to_string(),
                chain_id: env.block.chain_id.clone(),
                verifying_contract: env.contract.address.clone(),
            },
            from: from.clone(),
            nonce,
            to: to.address.clone(),
            code_hash: to.code_hash.clone(),
            value,
            data_hash: Binary(sha_256(data.as_slice()).to_vec()),
        };
        let digest = sign_doc_digest(&doc).unwrap();
        let secp = Secp256k1::new();
        let message = secp256k1::Message::from_slice(&digest).unwrap();
        let sig = secp.sign(&message, &signer.sk);
        Binary(sig.serialize_compact().to_vec())
    }

    fn target() -> ContractInfo {
        ContractInfo {
            code_hash: "target hash".to_string(),
            address: HumanAddr("target".to_string()),
        }
    }

    fn nonce_of(deps: &Extern<MockStorage, MockApi, MockQuerier>, signer: &HumanAddr) -> u64 {
        let bin = query(
            deps,
            QueryMsg::Nonce {
                signer: signer.clone(),
            },
        )
        .unwrap();
        match from_binary::<QueryAnswer>(&bin).unwrap() {
            QueryAnswer::Nonce { nonce } => nonce,
            other => panic!("unexpected query answer {:?}", other),
        }
    }

    #[test]
    fn test_execute_and_replay() {
        let signer = test_signer(7);
        let mut deps = init_helper(vec![signer.address.clone()]);
        let env = mock_env("relayer", &[]);
        let to = target();
        let data = Binary(br#"{"do_thing":{}}"#.to_vec());
        let sig = sign_meta_tx(&signer, &signer.address, &env, 0, &to, Uint128(0), &data);
        let execute = HandleMsg::ExecuteMetaTransaction {
            from: signer.address.clone(),
            to: to.clone(),
            value: Uint128(0),
            data: data.clone(),
            pubkey: Binary(signer.pubkey.clone()),
            signature: sig,
        };
        let res = handle(&mut deps, env.clone(), execute).unwrap();
        assert_eq!(res.messages.len(), 1);
        match &res.messages[0] {
            CosmosMsg::Wasm(WasmMsg::Execute {
                contract_addr,
                callback_code_hash,
                msg,
                send,
            }) => {
                assert_eq!(contract_addr, &to.address);
                assert_eq!(callback_code_hash, &to.code_hash);
                assert_eq!(msg, &data);
                assert!(send.is_empty());
            }
            other => panic!("unexpected message {:?}", other),
        }
        match from_binary::<HandleAnswer>(&res.data.unwrap()).unwrap() {
            HandleAnswer::ExecuteMetaTransaction { from, nonce_used } => {
                assert_eq!(from, signer.address);
                assert_eq!(nonce_used, 0);
            }
            other => panic!("unexpected handle answer {:?}", other),
        }
        assert_eq!(nonce_of(&deps, &signer.address), 1);
        // byte for byte resubmission is rejected because the digest now embeds
        // nonce 1
        let sig = sign_meta_tx(&signer, &signer.address, &env, 0, &to, Uint128(0), &data);
        let replay = HandleMsg::ExecuteMetaTransaction {
            from: signer.address.clone(),
            to: to.clone(),
            value: Uint128(0),
            data: data.clone(),
            pubkey: Binary(signer.pubkey.clone()),
            signature: sig,
        };
        let error = extract_error(handle(&mut deps, env.clone(), replay));
        assert!(error.contains("signature is invalid"), "got: {}", error);
        assert_eq!(nonce_of(&deps, &signer.address), 1);
        // a fresh signature over the advanced nonce works
        let sig = sign_meta_tx(&signer, &signer.address, &env, 1, &to, Uint128(0), &data);
        let next = HandleMsg::ExecuteMetaTransaction {
            from: signer.address.clone(),
            to,
            value: Uint128(0),
            data,
            pubkey: Binary(signer.pubkey.clone()),
            signature: sig,
        };
        handle(&mut deps, env, next).unwrap();
        assert_eq!(nonce_of(&deps, &signer.address), 2);
    }

    #[test]
    fn test_value_forwarding() {
        let signer = test_signer(7);
        let mut deps = init_helper(vec![signer.address.clone()]);
        let env = mock_env("relayer", &[]);
        let to = target();
        let data = Binary(br#"{"pay":{}}"#.to_vec());
        let sig = sign_meta_tx(&signer, &signer.address, &env, 0, &to, Uint128(500), &data);
        let res = handle(
            &mut deps,
            env,
            HandleMsg::ExecuteMetaTransaction {
                from: signer.address.clone(),
                to,
                value: Uint128(500),
                data,
                pubkey: Binary(signer.pubkey.clone()),
                signature: sig,
            },
        )
        .unwrap();
        match &res.messages[0] {
            CosmosMsg::Wasm(WasmMsg::Execute { send, .. }) => {
                assert_eq!(send, &coins(500, "uscrt"));
            }
            other => panic!("unexpected message {:?}", other),
        }
    }

    #[test]
    fn test_unauthorized_signer() {
        let signer = test_signer(7);
        let stranger = test_signer(9);
        let mut deps = init_helper(vec![signer.address.clone()]);
        let env = mock_env("relayer", &[]);
        let to = target();
        let data = Binary(br#"{"do_thing":{}}"#.to_vec());
        let sig = sign_meta_tx(&stranger, &stranger.address, &env, 0, &to, Uint128(0), &data);
        let error = extract_error(handle(
            &mut deps,
            env,
            HandleMsg::ExecuteMetaTransaction {
                from: stranger.address.clone(),
                to,
                value: Uint128(0),
                data,
                pubkey: Binary(stranger.pubkey.clone()),
                signature: sig,
            },
        ));
        assert_eq!(error, "unauthorized");
    }

    #[test]
    fn test_impersonation_rejected() {
        let signer = test_signer(7);
        let attacker = test_signer(11);
        let mut deps = init_helper(vec![signer.address.clone()]);
        let env = mock_env("relayer", &[]);
        let to = target();
        let data = Binary(br#"{"drain":{}}"#.to_vec());
        // the attacker signs a doc naming the real signer as from
        let sig = sign_meta_tx(&attacker, &signer.address, &env, 0, &to, Uint128(0), &data);
        let error = extract_error(handle(
            &mut deps,
            env,
            HandleMsg::ExecuteMetaTransaction {
                from: signer.address.clone(),
                to,
                value: Uint128(0),
                data,
                pubkey: Binary(attacker.pubkey.clone()),
                signature: sig,
            },
        ));
        assert!(
            error.contains("not produced by the from address"),
            "got: {}",
            error
        );
        // nothing was consumed
        assert_eq!(nonce_of(&deps, &signer.address), 0);
    }

    #[test]
    fn test_tampered_payload_rejected() {
        let signer = test_signer(7);
        let mut deps = init_helper(vec![signer.address.clone()]);
        let env = mock_env("relayer", &[]);
        let to = target();
        let data = Binary(br#"{"pay":{}}"#.to_vec());
        let sig = sign_meta_tx(&signer, &signer.address, &env, 0, &to, Uint128(1), &data);
        // the relayer bumps value after signing
        let error = extract_error(handle(
            &mut deps,
            env.clone(),
            HandleMsg::ExecuteMetaTransaction {
                from: signer.address.clone(),
                to: to.clone(),
                value: Uint128(1000000),
                data: data.clone(),
                pubkey: Binary(signer.pubkey.clone()),
                signature: sig,
            },
        ));
        assert!(error.contains("signature is invalid"), "got: {}", error);
        // a signature bound to another chain's domain is also rejected
        let mut foreign_env = mock_env("relayer", &[]);
        foreign_env.block.chain_id = "somewhere-else-1".to_string();
        let sig = sign_meta_tx(&signer, &signer.address, &foreign_env, 0, &to, Uint128(1), &data);
        let error = extract_error(handle(
            &mut deps,
            env,
            HandleMsg::ExecuteMetaTransaction {
                from: signer.address.clone(),
                to,
                value: Uint128(1),
                data,
                pubkey: Binary(signer.pubkey.clone()),
                signature: sig,
            },
        ));
        assert!(error.contains("signature is invalid"), "got: {}", error);
    }

    #[test]
    fn test_signer_management() {
        let signer = test_signer(7);
        let newcomer = test_signer(13);
        let mut deps = init_helper(vec![signer.address.clone()]);
        // only admins may change the allow-set
        let error = extract_error(handle(
            &mut deps,
            mock_env("stranger", &[]),
            HandleMsg::AddSigners {
                signers: vec![newcomer.address.clone()],
            },
        ));
        assert_eq!(error, "unauthorized");
        let res = handle(
            &mut deps,
            mock_env("admin", &[]),
            HandleMsg::AddSigners {
                signers: vec![newcomer.address.clone()],
            },
        )
        .unwrap();
        match from_binary::<HandleAnswer>(&res.data.unwrap()).unwrap() {
            HandleAnswer::SignersList { signers } => {
                assert_eq!(signers.len(), 2);
                assert!(signers.contains(&newcomer.address));
            }
            other => panic!("unexpected handle answer {:?}", other),
        }
        // a removed signer can no longer execute
        handle(
            &mut deps,
            mock_env("admin", &[]),
            HandleMsg::RemoveSigners {
                signers: vec![signer.address.clone()],
            },
        )
        .unwrap();
        let env = mock_env("relayer", &[]);
        let to = target();
        let data = Binary(br#"{"do_thing":{}}"#.to_vec());
        let sig = sign_meta_tx(&signer, &signer.address, &env, 0, &to, Uint128(0), &data);
        let error = extract_error(handle(
            &mut deps,
            env,
            HandleMsg::ExecuteMetaTransaction {
                from: signer.address.clone(),
                to,
                value: Uint128(0),
                data,
                pubkey: Binary(signer.pubkey.clone()),
                signature: sig,
            },
        ));
        assert_eq!(error, "unauthorized");
    }

    #[test]
    fn test_deposit() {
        let signer = test_signer(7);
        let mut deps = init_helper(vec![signer.address.clone()]);
        let res = handle(
            &mut deps,
            mock_env("patron", &coins(250000, "uscrt")),
            HandleMsg::Deposit {},
        )
        .unwrap();
        match from_binary::<HandleAnswer>(&res.data.unwrap()).unwrap() {
            HandleAnswer::Deposit { deposited } => assert_eq!(deposited, Uint128(250000)),
            other => panic!("unexpected handle answer {:?}", other),
        }
        let error = extract_error(handle(
            &mut deps,
            mock_env("patron", &[]),
            HandleMsg::Deposit {},
        ));
        assert!(error.contains("No uscrt was sent"), "got: {}", error);
    }
}
