use anchor_lang::AccountDeserialize;
use anyhow::{format_err, Result};
use solana_client::{rpc_client::RpcClient, rpc_config::RpcSendTransactionConfig};
use solana_sdk::{
    account::Account, commitment_config::CommitmentConfig, pubkey::Pubkey, signature::Signature,
    transaction::Transaction,
};

use super::utils::deserialize_anchor_account;

pub fn send_txn(client: &RpcClient, txn: &Transaction, wait_confirm: bool) -> Result<Signature> {
    Ok(client.send_and_confirm_transaction_with_spinner_and_config(
        txn,
        if wait_confirm {
            CommitmentConfig::confirmed()
        } else {
            CommitmentConfig::processed()
        },
        RpcSendTransactionConfig {
            skip_preflight: true,
            ..RpcSendTransactionConfig::default()
        },
    )?)
}

pub fn get_account(client: &RpcClient, addr: &Pubkey) -> Result<Option<Account>> {
    let response = client.get_account_with_commitment(addr, CommitmentConfig::confirmed())?;
    Ok(response.value)
}

pub fn get_anchor_account<T: AccountDeserialize>(
    client: &RpcClient,
    addr: &Pubkey,
) -> Result<Option<T>> {
    match get_account(client, addr)? {
        Some(account) => Ok(Some(deserialize_anchor_account::<T>(&account)?)),
        None => Ok(None),
    }
}

pub fn get_required_account(client: &RpcClient, addr: &Pubkey) -> Result<Account> {
    get_account(client, addr)?.ok_or_else(|| format_err!("account {} not found", addr))
}

/// Unix time of the latest confirmed slot.
pub fn cluster_time(client: &RpcClient) -> Result<u64> {
    let slot = client.get_slot()?;
    let block_time = client.get_block_time(slot)?;
    u64::try_from(block_time).map_err(|_| format_err!("negative block time {}", block_time))
}
