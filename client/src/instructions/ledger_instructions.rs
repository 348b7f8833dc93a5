use anchor_client::{Client, Cluster, Program};
use anchor_lang::prelude::AccountMeta;
use anyhow::Result;
use solana_sdk::{instruction::Instruction, pubkey::Pubkey, signature::Keypair, system_program};
use spl_associated_token_account::get_associated_token_address_with_program_id;
use std::rc::Rc;

use stake_ledger::accounts as ledger_accounts;
use stake_ledger::instruction as ledger_instructions;

use crate::instructions::utils::{
    get_authority_address, get_escrow_vault_address, get_global_config_address,
    get_reward_vault_address, get_stake_pool_address, get_stake_position_address,
};

use super::super::{read_keypair_file, ClientConfig};

fn ledger_program(config: &ClientConfig) -> Result<Program<Rc<Keypair>>> {
    let payer = read_keypair_file(&config.payer_path)?;
    let url = Cluster::Custom(config.http_url.clone(), config.ws_url.clone());
    let client = Client::new(url, Rc::new(payer));
    Ok(client.program(config.stake_ledger_program)?)
}

#[allow(clippy::too_many_arguments)]
pub fn initialise_ledger_instr(
    config: &ClientConfig,
    owner: Pubkey,
    admin: Pubkey,
    treasury: Pubkey,
    base_mint: Pubkey,
    base_token_program: Pubkey,
    receipt_mint: Pubkey,
    window_duration: u64,
    max_reward_tokens: u64,
    voting_power_divisor: u64,
) -> Result<Vec<Instruction>> {
    let program = ledger_program(config)?;

    let instructions = program
        .request()
        .accounts(ledger_accounts::InitialiseLedger {
            owner,
            authority: get_authority_address(&program.id()),
            global_config: get_global_config_address(&program.id()),
            stake_pool: get_stake_pool_address(&program.id()),
            base_mint,
            receipt_mint,
            escrow_vault: get_escrow_vault_address(&program.id()),
            token_program: base_token_program,
            system_program: system_program::id(),
        })
        .args(ledger_instructions::InitialiseLedger {
            admin,
            treasury,
            window_duration,
            max_reward_tokens,
            voting_power_divisor,
        })
        .instructions()?;
    Ok(instructions)
}

/// `key` is appended as `remaining_accounts[0]` for the admin and treasury selectors.
pub fn update_config_instr(
    config: &ClientConfig,
    owner: Pubkey,
    param: u8,
    value: u64,
    key: Option<Pubkey>,
) -> Result<Vec<Instruction>> {
    let program = ledger_program(config)?;

    let mut ixs = program
        .request()
        .accounts(ledger_accounts::UpdateConfig {
            owner,
            global_config: get_global_config_address(&program.id()),
            system_program: system_program::id(),
        })
        .args(ledger_instructions::UpdateConfig { param, value })
        .instructions()?;

    if let Some(key) = key {
        ixs[0].accounts.push(AccountMeta::new_readonly(key, false));
    }
    Ok(ixs)
}

pub fn update_whitelist_instr(
    config: &ClientConfig,
    owner: Pubkey,
    mint: Pubkey,
    add: bool,
) -> Result<Vec<Instruction>> {
    let program = ledger_program(config)?;

    let ixs = program
        .request()
        .accounts(ledger_accounts::UpdateWhitelist {
            owner,
            global_config: get_global_config_address(&program.id()),
            stake_pool: get_stake_pool_address(&program.id()),
            mint,
        })
        .args(ledger_instructions::UpdateWhitelist { add })
        .instructions()?;
    Ok(ixs)
}

pub fn stake_instr(
    config: &ClientConfig,
    base_mint: Pubkey,
    base_token_program: Pubkey,
    receipt_mint: Pubkey,
    amount: u64,
) -> Result<Vec<Instruction>> {
    let program = ledger_program(config)?;
    let owner = program.payer();

    let ixs = program
        .request()
        .accounts(ledger_accounts::Stake {
            owner,
            global_config: get_global_config_address(&program.id()),
            stake_pool: get_stake_pool_address(&program.id()),
            stake_position: get_stake_position_address(&owner, &program.id()),
            authority: get_authority_address(&program.id()),
            base_mint,
            owner_base_token: get_associated_token_address_with_program_id(
                &owner,
                &base_mint,
                &base_token_program,
            ),
            escrow_vault: get_escrow_vault_address(&program.id()),
            receipt_mint,
            owner_receipt_token: get_associated_token_address_with_program_id(
                &owner,
                &receipt_mint,
                &spl_token_2022::id(),
            ),
            token_program: base_token_program,
            receipt_token_program: spl_token_2022::id(),
            associated_token_program: spl_associated_token_account::id(),
            system_program: system_program::id(),
        })
        .args(ledger_instructions::Stake { amount })
        .instructions()?;
    Ok(ixs)
}

pub fn unstake_instr(
    config: &ClientConfig,
    base_mint: Pubkey,
    base_token_program: Pubkey,
    receipt_mint: Pubkey,
    destination: Option<Pubkey>,
    amount: u64,
) -> Result<Vec<Instruction>> {
    let program = ledger_program(config)?;
    let owner = program.payer();
    let destination = destination.unwrap_or_else(|| {
        get_associated_token_address_with_program_id(&owner, &base_mint, &base_token_program)
    });

    let ixs = program
        .request()
        .accounts(ledger_accounts::Unstake {
            owner,
            global_config: get_global_config_address(&program.id()),
            stake_pool: get_stake_pool_address(&program.id()),
            stake_position: get_stake_position_address(&owner, &program.id()),
            authority: get_authority_address(&program.id()),
            base_mint,
            escrow_vault: get_escrow_vault_address(&program.id()),
            receipt_mint,
            owner_receipt_token: get_associated_token_address_with_program_id(
                &owner,
                &receipt_mint,
                &spl_token_2022::id(),
            ),
            destination,
            token_program: base_token_program,
            receipt_token_program: spl_token_2022::id(),
        })
        .args(ledger_instructions::Unstake { amount })
        .instructions()?;
    Ok(ixs)
}

pub fn credit_rewards_instr(
    config: &ClientConfig,
    reward_mint: Pubkey,
    token_program: Pubkey,
    amount: u64,
) -> Result<Vec<Instruction>> {
    let program = ledger_program(config)?;
    let funder = program.payer();

    let ixs = program
        .request()
        .accounts(ledger_accounts::CreditRewards {
            funder,
            global_config: get_global_config_address(&program.id()),
            stake_pool: get_stake_pool_address(&program.id()),
            authority: get_authority_address(&program.id()),
            reward_mint,
            reward_vault: get_reward_vault_address(&reward_mint, &program.id()),
            funder_token: get_associated_token_address_with_program_id(
                &funder,
                &reward_mint,
                &token_program,
            ),
            token_program,
            system_program: system_program::id(),
        })
        .args(ledger_instructions::CreditRewards { amount })
        .instructions()?;
    Ok(ixs)
}

pub fn sync_rewards_instr(
    config: &ClientConfig,
    reward_mint: Pubkey,
    token_program: Pubkey,
) -> Result<Vec<Instruction>> {
    let program = ledger_program(config)?;

    let ixs = program
        .request()
        .accounts(ledger_accounts::SyncRewards {
            caller: program.payer(),
            global_config: get_global_config_address(&program.id()),
            stake_pool: get_stake_pool_address(&program.id()),
            reward_mint,
            reward_vault: get_reward_vault_address(&reward_mint, &program.id()),
            token_program,
        })
        .args(ledger_instructions::SyncRewards {})
        .instructions()?;
    Ok(ixs)
}

/// Claims every mint in `reward_mints` into the payer's ATAs, creating them when missing.
pub fn claim_rewards_instr(
    config: &ClientConfig,
    reward_mints: &[Pubkey],
    token_program: Pubkey,
) -> Result<Vec<Instruction>> {
    let program = ledger_program(config)?;
    let owner = program.payer();

    let mut ixs = Vec::with_capacity(reward_mints.len() + 1);
    let mut triples = Vec::with_capacity(reward_mints.len() * 3);
    for mint in reward_mints {
        let destination =
            get_associated_token_address_with_program_id(&owner, mint, &token_program);
        ixs.push(
            spl_associated_token_account::instruction::create_associated_token_account_idempotent(
                &owner,
                &owner,
                mint,
                &token_program,
            ),
        );
        triples.push(AccountMeta::new_readonly(*mint, false));
        triples.push(AccountMeta::new(
            get_reward_vault_address(mint, &program.id()),
            false,
        ));
        triples.push(AccountMeta::new(destination, false));
    }

    let mut claim_ixs = program
        .request()
        .accounts(ledger_accounts::ClaimRewards {
            owner,
            global_config: get_global_config_address(&program.id()),
            stake_pool: get_stake_pool_address(&program.id()),
            stake_position: get_stake_position_address(&owner, &program.id()),
            authority: get_authority_address(&program.id()),
            token_program,
        })
        .args(ledger_instructions::ClaimRewards {})
        .instructions()?;
    claim_ixs[0].accounts.extend(triples);
    ixs.extend(claim_ixs);
    Ok(ixs)
}

pub fn remove_reward_stream_instr(
    config: &ClientConfig,
    owner: Pubkey,
    reward_mint: Pubkey,
) -> Result<Vec<Instruction>> {
    let program = ledger_program(config)?;

    let ixs = program
        .request()
        .accounts(ledger_accounts::RemoveRewardStream {
            owner,
            global_config: get_global_config_address(&program.id()),
            stake_pool: get_stake_pool_address(&program.id()),
            reward_mint,
        })
        .args(ledger_instructions::RemoveRewardStream {})
        .instructions()?;
    Ok(ixs)
}
