use crate::error::ErrorCode;
use crate::states::*;
use crate::utils::{current_timestamp, token_burn, transfer_from_pool_vault_to_user};
use anchor_lang::prelude::*;
use anchor_spl::{
    token_2022::Token2022,
    token_interface::{Mint, TokenAccount, TokenInterface},
};

/// Withdraw base tokens from escrow.
///
/// Rewards earned by the withdrawn balance are not paid here; they move into
/// the position's `pending_carry` and stay claimable through `claim_rewards`,
/// including after a full exit.
#[derive(Accounts)]
pub struct Unstake<'info> {
    pub owner: Signer<'info>,

    #[account(
        seeds = [GLOBAL_CONFIG_SEED.as_bytes()],
        bump,
    )]
    pub global_config: Box<Account<'info, GlobalConfig>>,

    #[account(
        mut,
        address = global_config.stake_pool,
    )]
    pub stake_pool: Box<Account<'info, StakePool>>,

    #[account(
        mut,
        seeds = [
            STAKE_POSITION_SEED.as_bytes(),
            owner.key().as_ref()
        ],
        bump = stake_position.bump,
        constraint = stake_position.owner == owner.key() @ ErrorCode::InvalidOwner,
    )]
    pub stake_position: Box<Account<'info, StakePosition>>,

    /// Program authority PDA (escrow vault owner).
    ///
    /// CHECK: PDA derivation enforced by seeds; used only as a signer.
    #[account(
        seeds = [crate::AUTH_SEED.as_bytes()],
        bump,
    )]
    pub authority: UncheckedAccount<'info>,

    #[account(
        address = global_config.base_mint @ ErrorCode::InvalidRewardMint,
        mint::token_program = token_program,
    )]
    pub base_mint: Box<InterfaceAccount<'info, Mint>>,

    #[account(
        mut,
        address = global_config.escrow_vault @ ErrorCode::InvalidVault,
    )]
    pub escrow_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        mut,
        address = global_config.receipt_mint @ ErrorCode::InvalidReceiptMint,
        mint::token_program = receipt_token_program,
    )]
    pub receipt_mint: Box<InterfaceAccount<'info, Mint>>,

    /// Receipt tokens retired by this withdrawal.
    #[account(
        mut,
        token::mint = receipt_mint,
        token::authority = owner,
        token::token_program = receipt_token_program,
    )]
    pub owner_receipt_token: Box<InterfaceAccount<'info, TokenAccount>>,

    /// Base-token account receiving the withdrawal.
    #[account(
        mut,
        token::mint = base_mint,
        token::token_program = token_program,
        constraint = destination.key() != escrow_vault.key() @ ErrorCode::InvalidDestination,
    )]
    pub destination: Box<InterfaceAccount<'info, TokenAccount>>,

    pub token_program: Interface<'info, TokenInterface>,

    pub receipt_token_program: Program<'info, Token2022>,
}

pub fn unstake(ctx: Context<Unstake>, amount: u64) -> Result<()> {
    require_gt!(amount, 0, ErrorCode::ZeroAmount);
    let stake_pool = &mut ctx.accounts.stake_pool;
    let stake_position = &mut ctx.accounts.stake_position;
    require_gte!(
        stake_position.staked_balance,
        amount,
        ErrorCode::InsufficientBalance
    );
    require_gte!(
        stake_pool.escrow_balance,
        amount,
        ErrorCode::InsufficientEscrow
    );
    let now = current_timestamp()?;

    // --- 1) Settle with the pre-unstake total ---
    stake_pool.settle_all(now)?;

    // --- 2) Carry earnings, shrink the position and the pool ---
    let balance_before = stake_position.staked_balance;
    let stake_start_before = stake_position.stake_start_time;
    stake_position.apply_unstake(&stake_pool.reward_streams, amount, now)?;
    stake_pool.record_unstake(amount)?;

    // --- 3) Retire receipts, then release principal ---
    // receipts the holder already burned are not required back
    let receipts_to_burn = amount.min(ctx.accounts.owner_receipt_token.amount);
    token_burn(
        ctx.accounts.owner.to_account_info(),
        ctx.accounts.receipt_token_program.to_account_info(),
        ctx.accounts.receipt_mint.to_account_info(),
        ctx.accounts.owner_receipt_token.to_account_info(),
        receipts_to_burn,
    )?;
    transfer_from_pool_vault_to_user(
        ctx.accounts.authority.to_account_info(),
        ctx.accounts.escrow_vault.to_account_info(),
        ctx.accounts.destination.to_account_info(),
        ctx.accounts.base_mint.to_account_info(),
        ctx.accounts.token_program.to_account_info(),
        amount,
        ctx.accounts.base_mint.decimals,
        &[&[crate::AUTH_SEED.as_bytes(), &[ctx.bumps.authority]]],
    )?;

    ctx.accounts.receipt_mint.reload()?;
    ctx.accounts.escrow_vault.reload()?;
    stake_pool.check_conservation(
        ctx.accounts.receipt_mint.supply,
        ctx.accounts.escrow_vault.amount,
    )?;

    emit!(Unstaked {
        owner: ctx.accounts.owner.key(),
        destination: ctx.accounts.destination.key(),
        amount,
        balance_before,
        balance_after: stake_position.staked_balance,
        stake_start_before,
        stake_start_after: stake_position.stake_start_time,
        total_staked: stake_pool.total_staked,
    });
    Ok(())
}
