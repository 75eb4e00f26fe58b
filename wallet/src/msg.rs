use cosmwasm_std::{Binary, HumanAddr, Uint128};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// code hash and address of a contract
#[derive(Serialize, Deserialize, JsonSchema, Clone, PartialEq, Debug)]
pub struct ContractInfo {
    /// contract's code hash string
    pub code_hash: String,
    /// contract's address
    pub address: HumanAddr,
}

/// Instantiation message
#[derive(Serialize, Deserialize, JsonSchema)]
pub struct InitMsg {
    /// addresses authorized to sign meta transactions for this wallet
    pub signers: Vec<HumanAddr>,
    /// optional list of additional admins
    pub admins: Option<Vec<HumanAddr>>,
}

/// Handle messages
#[derive(Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum HandleMsg {
    /// execute a call that one of this wallet's signers authorized offline.  The
    /// submitter pays the gas and may be anyone
    ExecuteMetaTransaction {
        /// address that authorized the call
        from: HumanAddr,
        /// code hash and address of the contract to call
        to: ContractInfo,
        /// uscrt to forward with the call
        value: Uint128,
        /// the call's message bytes, forwarded verbatim
        data: Binary,
        /// compressed secp256k1 pubkey of the signer (33 bytes)
        pubkey: Binary,
        /// signature over the wallet's sign doc (64 byte compact form)
        signature: Binary,
    },
    /// accept a deposit of funds the wallet can later forward
    Deposit {},
    /// allows an admin to add authorized signers
    AddSigners {
        /// list of addresses to authorize
        signers: Vec<HumanAddr>,
    },
    /// allows an admin to remove authorized signers
    RemoveSigners {
        /// list of addresses to revoke signing authority from
        signers: Vec<HumanAddr>,
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
}

/// Responses from handle functions
#[derive(Serialize, Deserialize, Debug, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum HandleAnswer {
    /// response of executing a meta transaction
    ExecuteMetaTransaction {
        /// the signer the call was executed for
        from: HumanAddr,
        /// the nonce consumed by this execution
        nonce_used: u64,
    },
    /// response of depositing funds
    Deposit {
        /// uscrt received
        deposited: Uint128,
    },
    /// response of both AddSigners and RemoveSigners
    SignersList {
        /// current authorized signers
        signers: Vec<HumanAddr>,
    },
    /// response of both AddAdmins and RemoveAdmins
    AdminsList {
        /// current admins
        admins: Vec<HumanAddr>,
    },
}

/// Queries
#[derive(Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum QueryMsg {
    /// display the next nonce expected from a signer
    Nonce {
        /// signer address in question
        signer: HumanAddr,
    },
    /// display the authorized signers
    Signers {},
}

/// responses to queries
#[derive(Serialize, Deserialize, Debug, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum QueryAnswer {
    /// displays the next nonce expected from a signer
    Nonce {
        /// next nonce the signer's sign doc must embed
        nonce: u64,
    },
    /// displays the authorized signers
    Signers {
        /// current authorized signers
        signers: Vec<HumanAddr>,
    },
}
