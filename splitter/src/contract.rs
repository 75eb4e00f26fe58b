use cosmwasm_std::{
    log, to_binary, Api, BankMsg, CanonicalAddr, Coin, CosmosMsg, Env, Extern, HandleResponse,
    HandleResult, HumanAddr, InitResponse, InitResult, Querier, QueryResult, StdError, StdResult,
    Storage, Uint128,
};

use secret_toolkit::utils::{pad_handle_result, pad_query_result};

use crate::msg::{HandleAnswer, HandleMsg, InitMsg, PayeeInfo, QueryAnswer, QueryMsg};
use crate::state::{Config, StoredPayee, CONFIG_KEY, MY_ADDRESS_KEY};
use crate::storage::{load, save};

pub const BLOCK_SIZE: usize = 256;
/// the only denom the splitter accounts for
pub const SPLIT_DENOM: &str = "uscrt";

////////////////////////////////////// Init ///////////////////////////////////////
/// Returns InitResult
///
/// Initializes the revenue splitter contract
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
    if msg.payees.is_empty() {
        return Err(StdError::generic_err(
            "The splitter needs at least one payee",
        ));
    }
    let mut payees: Vec<StoredPayee> = Vec::with_capacity(msg.payees.len());
    let mut total_shares = 0u128;
    for payee in msg.payees.into_iter() {
        if payee.shares == 0 {
            return Err(StdError::generic_err(format!(
                "Payee {} must have at least one share",
                payee.address
            )));
        }
        let raw = deps.api.canonical_address(&payee.address)?;
        if payees.iter().any(|p| p.address == raw) {
            return Err(StdError::generic_err(format!(
                "Payee {} is listed more than once",
                payee.address
            )));
        }
        total_shares += payee.shares as u128;
        payees.push(StoredPayee {
            address: raw,
            shares: payee.shares,
            released: 0,
        });
    }
    let config = Config {
        payees,
        total_shares,
        total_released: 0,
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
        HandleMsg::Release { payee } => try_release(deps, env, payee),
    };
    pad_handle_result(response, BLOCK_SIZE)
}

/// Returns HandleResult
///
/// pays out everything currently owed to a payee.  What was ever received is
/// inferred from the current balance plus everything already released, so
/// incoming payments need no bookkeeping of their own.  The ledger is updated
/// before the transfer message is emitted
///
/// # Arguments
///
/// * `deps` - a mutable reference to Extern containing all the contract's external dependencies
/// * `env` - Env of contract's environment
/// * `payee` - payee to release to, defaulting to the message sender
fn try_release<S: Storage, A: Api, Q: Querier>(
    deps: &mut Extern<S, A, Q>,
    env: Env,
    payee: Option<HumanAddr>,
) -> HandleResult {
    let mut config: Config = load(&deps.storage, CONFIG_KEY)?;
    let payee_human = payee.unwrap_or_else(|| env.message.sender.clone());
    let payee_raw = deps.api.canonical_address(&payee_human)?;
    let pos = config
        .payees
        .iter()
        .position(|p| p.address == payee_raw)
        .ok_or_else(|| {
            StdError::generic_err(format!("Address {} has no shares", payee_human))
        })?;
    let balance = deps
        .querier
        .query_balance(env.contract.address.clone(), SPLIT_DENOM)?
        .amount
        .u128();
    let total_received = balance + config.total_released;
    let entitled =
        total_received * (config.payees[pos].shares as u128) / config.total_shares;
    // entitled can never fall below what was already released because
    // total_received only grows
    let pending = entitled - config.payees[pos].released;
    if pending == 0 {
        return Err(StdError::generic_err(format!(
            "There is no payment due to {}",
            payee_human
        )));
    }
    config.payees[pos].released += pending;
    config.total_released += pending;
    save(&mut deps.storage, CONFIG_KEY, &config)?;

    Ok(HandleResponse {
        messages: vec![CosmosMsg::Bank(BankMsg::Send {
            from_address: env.contract.address,
            to_address: payee_human.clone(),
            amount: vec![Coin {
                denom: SPLIT_DENOM.to_string(),
                amount: Uint128(pending),
            }],
        })],
        log: vec![
            log("payee", &payee_human),
            log("amount", pending),
        ],
        data: Some(to_binary(&HandleAnswer::Release {
            payee: payee_human,
            amount: Uint128(pending),
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
        QueryMsg::Payees {} => query_payees(deps),
        QueryMsg::PendingPayment { address } => query_pending(deps, address),
    };
    pad_query_result(response, BLOCK_SIZE)
}

/// Returns QueryResult displaying the payees, their shares, and their release history
///
/// # Arguments
///
/// * `deps` - reference to Extern containing all the contract's external dependencies
fn query_payees<S: Storage, A: Api, Q: Querier>(deps: &Extern<S, A, Q>) -> QueryResult {
    let config: Config = load(&deps.storage, CONFIG_KEY)?;
    to_binary(&QueryAnswer::Payees {
        payees: config
            .payees
            .iter()
            .map(|p| {
                Ok(PayeeInfo {
                    address: deps.api.human_address(&p.address)?,
                    shares: p.shares,
                    released: Uint128(p.released),
                })
            })
            .collect::<StdResult<Vec<PayeeInfo>>>()?,
        total_shares: config.total_shares as u64,
        total_released: Uint128(config.total_released),
    })
}

/// Returns QueryResult displaying what a payee could withdraw right now
///
/// # Arguments
///
/// * `deps` - reference to Extern containing all the contract's external dependencies
/// * `address` - payee address in question
fn query_pending<S: Storage, A: Api, Q: Querier>(
    deps: &Extern<S, A, Q>,
    address: HumanAddr,
) -> QueryResult {
    let config: Config = load(&deps.storage, CONFIG_KEY)?;
    let raw = deps.api.canonical_address(&address)?;
    let payee = config
        .payees
        .iter()
        .find(|p| p.address == raw)
        .ok_or_else(|| StdError::generic_err(format!("Address {} has no shares", address)))?;
    // queries carry no Env, so the contract's own address comes from storage
    let me_raw: CanonicalAddr = load(&deps.storage, MY_ADDRESS_KEY)?;
    let balance = deps
        .querier
        .query_balance(deps.api.human_address(&me_raw)?, SPLIT_DENOM)?
        .amount
        .u128();
    let total_received = balance + config.total_released;
    let entitled = total_received * (payee.shares as u128) / config.total_shares;
    to_binary(&QueryAnswer::PendingPayment {
        amount: Uint128(entitled - payee.released),
    })
}
