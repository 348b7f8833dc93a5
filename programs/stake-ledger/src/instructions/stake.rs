use crate::error::ErrorCode;
use crate::states::*;
use crate::utils::{current_timestamp, token_mint_to, transfer_from_user_to_pool_vault};
use anchor_lang::prelude::*;
use anchor_spl::{
    associated_token::AssociatedToken,
    token_2022::Token2022,
    token_interface::{Mint, TokenAccount, TokenInterface},
};

/// Deposit base tokens into escrow.
///
/// Order of effects:
/// - Every registered reward stream is settled against the pre-stake total.
/// - Streams paused while nobody was staked are shifted past the idle interval.
/// - Base tokens move from the owner into the escrow vault; the measured
///   vault delta is the amount credited to the position.
/// - The position's claim entries absorb the current accumulators as debt, so
///   the deposit earns nothing that vested before it.
/// - Receipt tokens are minted one-for-one to the owner.
#[derive(Accounts)]
pub struct Stake<'info> {
    /// Staker; pays for the position and receipt ATA on first use.
    #[account(mut)]
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

    /// Per-owner position (derived by STAKE_POSITION_SEED + owner).
    #[account(
        init_if_needed,
        seeds = [
            STAKE_POSITION_SEED.as_bytes(),
            owner.key().as_ref()
        ],
        bump,
        payer = owner,
        space = StakePosition::LEN
    )]
    pub stake_position: Box<Account<'info, StakePosition>>,

    /// Program authority PDA (mint authority of the receipt).
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

    /// Owner's base-token account funding the deposit.
    #[account(
        mut,
        token::mint = base_mint,
        token::authority = owner,
        token::token_program = token_program,
    )]
    pub owner_base_token: Box<InterfaceAccount<'info, TokenAccount>>,

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

    /// Owner's receipt ATA; created on demand.
    #[account(
        init_if_needed,
        payer = owner,
        associated_token::mint = receipt_mint,
        associated_token::authority = owner,
        associated_token::token_program = receipt_token_program,
    )]
    pub owner_receipt_token: Box<InterfaceAccount<'info, TokenAccount>>,

    /// Token program of the base mint.
    pub token_program: Interface<'info, TokenInterface>,

    /// Token-2022 program (receipt mint).
    pub receipt_token_program: Program<'info, Token2022>,

    pub associated_token_program: Program<'info, AssociatedToken>,

    pub system_program: Program<'info, System>,
}

pub fn stake(ctx: Context<Stake>, amount: u64) -> Result<()> {
    require_gt!(amount, 0, ErrorCode::ZeroAmount);
    let now = current_timestamp()?;

    // --- 1) Settle with the pre-stake total, then end any idle pause ---
    let stake_pool = &mut ctx.accounts.stake_pool;
    stake_pool.settle_all(now)?;
    stake_pool.resume_streams(now)?;

    // --- 2) Pull base tokens into escrow and measure what arrived ---
    let escrow_before = ctx.accounts.escrow_vault.amount;
    transfer_from_user_to_pool_vault(
        ctx.accounts.owner.to_account_info(),
        ctx.accounts.owner_base_token.to_account_info(),
        ctx.accounts.escrow_vault.to_account_info(),
        ctx.accounts.base_mint.to_account_info(),
        ctx.accounts.token_program.to_account_info(),
        amount,
        ctx.accounts.base_mint.decimals,
    )?;
    ctx.accounts.escrow_vault.reload()?;
    let received = ctx
        .accounts
        .escrow_vault
        .amount
        .checked_sub(escrow_before)
        .ok_or(ErrorCode::MathOverflow)?;
    require_gt!(received, 0, ErrorCode::ZeroAmount);

    // --- 3) Position and pool bookkeeping ---
    let stake_position = &mut ctx.accounts.stake_position;
    if stake_position.owner == Pubkey::default() {
        stake_position.bump = ctx.bumps.stake_position;
        stake_position.owner = ctx.accounts.owner.key();
    }
    let balance_before = stake_position.staked_balance;
    let stake_start_before = stake_position.stake_start_time;
    stake_position.apply_stake(&stake_pool.reward_streams, received, now)?;
    stake_pool.record_stake(received)?;

    // --- 4) Issue receipts ---
    token_mint_to(
        ctx.accounts.authority.to_account_info(),
        ctx.accounts.receipt_token_program.to_account_info(),
        ctx.accounts.receipt_mint.to_account_info(),
        ctx.accounts.owner_receipt_token.to_account_info(),
        received,
        &[&[crate::AUTH_SEED.as_bytes(), &[ctx.bumps.authority]]],
    )?;
    ctx.accounts.receipt_mint.reload()?;
    stake_pool.check_conservation(
        ctx.accounts.receipt_mint.supply,
        ctx.accounts.escrow_vault.amount,
    )?;

    if received != amount {
        msg!("Requested {}, escrow received {}", amount, received);
    }
    emit!(Staked {
        owner: ctx.accounts.owner.key(),
        amount: received,
        balance_before,
        balance_after: stake_position.staked_balance,
        stake_start_before,
        stake_start_after: stake_position.stake_start_time,
        total_staked: stake_pool.total_staked,
    });
    Ok(())
}
