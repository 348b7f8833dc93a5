use crate::error::ErrorCode;
use crate::utils::validate_receipt_mint;
use crate::{states::*, ESCROW_VAULT_SEED, MAX_REWARD_STREAMS};
use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};
use std::ops::DerefMut;

/// Accounts context for `initialise_ledger`.
///
/// This handler:
/// - Creates the global configuration and the stake pool.
/// - Creates the escrow vault holding staked principal (base mint, owned by the authority PDA).
/// - Validates the externally created receipt mint.
#[derive(Accounts)]
pub struct InitialiseLedger<'info> {
    /// Deployer signer (must match the program-level admin id). Pays for all new accounts.
    #[account(
        mut,
        address = crate::admin::id() @ ErrorCode::InvalidOwner
    )]
    pub owner: Signer<'info>,

    /// Program authority PDA: owner of every vault and mint authority of the receipt.
    ///
    /// CHECK: PDA derivation enforced via seeds. Not read as an account; used as Pubkey.
    #[account(
        seeds = [crate::AUTH_SEED.as_bytes()],
        bump,
    )]
    pub authority: UncheckedAccount<'info>,

    #[account(
        init,
        seeds = [GLOBAL_CONFIG_SEED.as_bytes()],
        bump,
        payer = owner,
        space = GlobalConfig::LEN
    )]
    pub global_config: Box<Account<'info, GlobalConfig>>,

    #[account(
        init,
        seeds = [STAKE_POOL_SEED.as_bytes()],
        bump,
        payer = owner,
        space = StakePool::LEN
    )]
    pub stake_pool: Box<Account<'info, StakePool>>,

    /// Staked base asset.
    #[account(mint::token_program = token_program)]
    pub base_mint: Box<InterfaceAccount<'info, Mint>>,

    /// Receipt mint (Token-2022, `NonTransferable`).
    ///
    /// CHECK: owner, extensions, authority, supply and decimals are checked in the handler.
    #[account(constraint = receipt_mint.key() != base_mint.key() @ ErrorCode::InvalidReceiptMint)]
    pub receipt_mint: UncheckedAccount<'info>,

    /// Program-owned vault for staked principal.
    #[account(
        init,
        seeds = [ESCROW_VAULT_SEED.as_bytes()],
        bump,
        payer = owner,
        token::mint = base_mint,
        token::authority = authority,
        token::token_program = token_program,
    )]
    pub escrow_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    /// Token program of the base mint.
    pub token_program: Interface<'info, TokenInterface>,

    pub system_program: Program<'info, System>,
}

/// Initializes the ledger.
///
/// Steps:
/// 1. Validate parameters and the receipt mint.
/// 2. Write `global_config`; the base mint becomes the first whitelist entry.
/// 3. Write `stake_pool` with empty totals and an empty stream registry.
pub fn initialise_ledger(
    ctx: Context<InitialiseLedger>,
    admin: Pubkey,
    treasury: Pubkey,
    window_duration: u64,
    max_reward_tokens: u64,
    voting_power_divisor: u64,
) -> Result<()> {
    require_keys_neq!(admin, Pubkey::default(), ErrorCode::InvalidParam);
    require_keys_neq!(treasury, Pubkey::default(), ErrorCode::InvalidParam);
    require_gt!(window_duration, 0, ErrorCode::InvalidParam);
    require_gt!(voting_power_divisor, 0, ErrorCode::InvalidParam);
    require_gte!(
        MAX_REWARD_STREAMS as u64,
        max_reward_tokens,
        ErrorCode::InvalidParam
    );

    validate_receipt_mint(
        &ctx.accounts.receipt_mint.to_account_info(),
        &ctx.accounts.authority.key(),
        ctx.accounts.base_mint.decimals,
    )?;

    // ---------------------------
    // 1) Write global config
    // ---------------------------
    let global_config = ctx.accounts.global_config.deref_mut();
    global_config.bump = ctx.bumps.global_config;
    global_config.admin = admin;
    global_config.treasury = treasury;
    global_config.base_mint = ctx.accounts.base_mint.key();
    global_config.receipt_mint = ctx.accounts.receipt_mint.key();
    global_config.escrow_vault = ctx.accounts.escrow_vault.key();
    global_config.stake_pool = ctx.accounts.stake_pool.key();
    global_config.window_duration = window_duration;
    global_config.max_reward_tokens = max_reward_tokens;
    global_config.voting_power_divisor = voting_power_divisor;
    global_config.removal_dust = 0;
    global_config.add_to_whitelist(ctx.accounts.base_mint.key())?;
    msg!("Global Config initialized");

    // ---------------------------
    // 2) Empty pool
    // ---------------------------
    let stake_pool = ctx.accounts.stake_pool.deref_mut();
    stake_pool.bump = ctx.bumps.stake_pool;
    stake_pool.next_stream_id = 1;
    stake_pool.last_update_timestamp = crate::utils::current_timestamp()?;

    emit!(LedgerInitialized {
        admin,
        treasury,
        base_mint: ctx.accounts.base_mint.key(),
        receipt_mint: ctx.accounts.receipt_mint.key(),
        escrow_vault: ctx.accounts.escrow_vault.key(),
        stake_pool: ctx.accounts.stake_pool.key(),
        window_duration,
        max_reward_tokens,
        voting_power_divisor,
    });
    Ok(())
}
