use cosmwasm_std::{HumanAddr, Uint128};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Instantiation message
#[derive(Serialize, Deserialize, JsonSchema)]
pub struct InitMsg {
    /// the payees and their fixed shares, immutable after instantiation
    pub payees: Vec<InitPayee>,
}

/// one payee's fixed share
#[derive(Serialize, Deserialize, JsonSchema, Clone, PartialEq, Debug)]
pub struct InitPayee {
    /// payee address
    pub address: HumanAddr,
    /// the payee's share count.  A payee's cut of every uscrt received is
    /// shares / total shares
    pub shares: u64,
}

/// Handle messages
#[derive(Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum HandleMsg {
    /// pay out everything currently owed to a payee.  Anyone may trigger a
    /// release; the funds always go to the payee
    Release {
        /// payee to release to, defaulting to the message sender
        payee: Option<HumanAddr>,
    },
}

/// Responses from handle functions
#[derive(Serialize, Deserialize, Debug, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum HandleAnswer {
    /// response of releasing a payment
    Release {
        /// payee the payment went to
        payee: HumanAddr,
        /// uscrt released
        amount: Uint128,
    },
}

/// Queries
#[derive(Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum QueryMsg {
    /// display the payees, their shares, and their release history
    Payees {},
    /// display what a payee could withdraw right now
    PendingPayment {
        /// payee address in question
        address: HumanAddr,
    },
}

/// responses to queries
#[derive(Serialize, Deserialize, Debug, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum QueryAnswer {
    /// displays the payees, their shares, and their release history
    Payees {
        /// the payees
        payees: Vec<PayeeInfo>,
        /// sum of all payee shares
        total_shares: u64,
        /// total uscrt ever paid out
        total_released: Uint128,
    },
    /// displays what a payee could withdraw right now
    PendingPayment {
        amount: Uint128,
    },
}

/// one payee's share and release history
#[derive(Serialize, Deserialize, JsonSchema, Clone, PartialEq, Debug)]
pub struct PayeeInfo {
    /// payee address
    pub address: HumanAddr,
    /// the payee's fixed share count
    pub shares: u64,
    /// uscrt already released to this payee
    pub released: Uint128,
}
