use anchor_lang::AccountDeserialize;
use anyhow::{format_err, Result};
use solana_sdk::{account::Account, pubkey::Pubkey};
use spl_token_2022::{
    extension::StateWithExtensions,
    state::{Account as TokenAccount, Mint},
};
use stake_ledger::states::{GLOBAL_CONFIG_SEED, STAKE_POOL_SEED, STAKE_POSITION_SEED};

pub fn deserialize_anchor_account<T: AccountDeserialize>(account: &Account) -> Result<T> {
    let mut data: &[u8] = &account.data;
    T::try_deserialize(&mut data).map_err(|e| format_err!("failed to decode account: {}", e))
}

/// Decimals of a legacy SPL or Token-2022 mint.
pub fn mint_decimals(account: &Account) -> Result<u8> {
    let mint = StateWithExtensions::<Mint>::unpack(&account.data)
        .map_err(|e| format_err!("not a mint account: {}", e))?;
    Ok(mint.base.decimals)
}

/// Raw balance of a legacy SPL or Token-2022 token account.
pub fn token_amount(account: &Account) -> Result<u64> {
    let token = StateWithExtensions::<TokenAccount>::unpack(&account.data)
        .map_err(|e| format_err!("not a token account: {}", e))?;
    Ok(token.base.amount)
}

pub fn get_global_config_address(program_id: &Pubkey) -> Pubkey {
    let (global_config, _bump) =
        Pubkey::find_program_address(&[GLOBAL_CONFIG_SEED.as_bytes()], program_id);
    global_config
}

pub fn get_stake_pool_address(program_id: &Pubkey) -> Pubkey {
    let (stake_pool, _bump) =
        Pubkey::find_program_address(&[STAKE_POOL_SEED.as_bytes()], program_id);
    stake_pool
}

pub fn get_stake_position_address(owner: &Pubkey, program_id: &Pubkey) -> Pubkey {
    let (stake_position, _bump) = Pubkey::find_program_address(
        &[STAKE_POSITION_SEED.as_bytes(), owner.as_ref()],
        program_id,
    );
    stake_position
}

pub fn get_authority_address(program_id: &Pubkey) -> Pubkey {
    let (authority, _bump) =
        Pubkey::find_program_address(&[stake_ledger::AUTH_SEED.as_bytes()], program_id);
    authority
}

pub fn get_escrow_vault_address(program_id: &Pubkey) -> Pubkey {
    let (escrow_vault, _bump) =
        Pubkey::find_program_address(&[stake_ledger::ESCROW_VAULT_SEED.as_bytes()], program_id);
    escrow_vault
}

pub fn get_reward_vault_address(mint: &Pubkey, program_id: &Pubkey) -> Pubkey {
    let (reward_vault, _bump) = Pubkey::find_program_address(
        &[stake_ledger::REWARD_VAULT_SEED.as_bytes(), mint.as_ref()],
        program_id,
    );
    reward_vault
}
