use crate::error::ErrorCode;
use crate::states::*;
use crate::utils::{current_timestamp, transfer_from_user_to_pool_vault};
use crate::REWARD_VAULT_SEED;
use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

/// Push new rewards for one mint.
///
/// The funder (treasury or admin) transfers `amount` into the mint's reward
/// vault; the measured vault delta is folded, together with the unvested
/// remainder of the current window, into a new window starting now. The
/// first credit of a mint registers its stream and creates its vault.
#[derive(Accounts)]
pub struct CreditRewards<'info> {
    #[account(
        mut,
        constraint = (global_config.is_authorized_funder(&funder.key()) || funder.key() == crate::admin::id()) @ ErrorCode::InvalidOwner
    )]
    pub funder: Signer<'info>,

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

    /// CHECK: PDA derivation enforced by seeds; vault token authority.
    #[account(
        seeds = [crate::AUTH_SEED.as_bytes()],
        bump,
    )]
    pub authority: UncheckedAccount<'info>,

    #[account(
        mint::token_program = token_program,
        constraint = reward_mint.key() != global_config.receipt_mint @ ErrorCode::InvalidRewardMint,
    )]
    pub reward_mint: Box<InterfaceAccount<'info, Mint>>,

    /// Reward liquidity for `reward_mint` (derived by REWARD_VAULT_SEED + mint).
    #[account(
        init_if_needed,
        seeds = [
            REWARD_VAULT_SEED.as_bytes(),
            reward_mint.key().as_ref()
        ],
        bump,
        payer = funder,
        token::mint = reward_mint,
        token::authority = authority,
        token::token_program = token_program,
    )]
    pub reward_vault: Box<InterfaceAccount<'info, TokenAccount>>,

    #[account(
        mut,
        token::mint = reward_mint,
        token::authority = funder,
        token::token_program = token_program,
    )]
    pub funder_token: Box<InterfaceAccount<'info, TokenAccount>>,

    pub token_program: Interface<'info, TokenInterface>,

    pub system_program: Program<'info, System>,
}

pub fn credit_rewards(ctx: Context<CreditRewards>, amount: u64) -> Result<()> {
    require_gt!(amount, 0, ErrorCode::ZeroAmount);
    let now = current_timestamp()?;
    ctx.accounts.stake_pool.settle_all(now)?;

    let vault_before = ctx.accounts.reward_vault.amount;
    transfer_from_user_to_pool_vault(
        ctx.accounts.funder.to_account_info(),
        ctx.accounts.funder_token.to_account_info(),
        ctx.accounts.reward_vault.to_account_info(),
        ctx.accounts.reward_mint.to_account_info(),
        ctx.accounts.token_program.to_account_info(),
        amount,
        ctx.accounts.reward_mint.decimals,
    )?;
    ctx.accounts.reward_vault.reload()?;
    let received = ctx
        .accounts
        .reward_vault
        .amount
        .checked_sub(vault_before)
        .ok_or(ErrorCode::MathOverflow)?;

    apply_credit(
        &ctx.accounts.global_config,
        &mut ctx.accounts.stake_pool,
        ctx.accounts.reward_mint.key(),
        ctx.accounts.reward_vault.key(),
        ctx.accounts.reward_vault.amount,
        received,
        ctx.accounts.funder.key(),
        now,
    )
}

/// Credits `amount` already sitting in `vault` and emits the window change.
#[allow(clippy::too_many_arguments)]
pub(crate) fn apply_credit(
    global_config: &GlobalConfig,
    stake_pool: &mut StakePool,
    mint: Pubkey,
    vault: Pubkey,
    vault_balance: u64,
    amount: u64,
    funder: Pubkey,
    now: u64,
) -> Result<()> {
    let outcome = stake_pool.credit(
        mint,
        vault,
        amount,
        vault_balance,
        global_config.is_whitelisted(&mint),
        global_config.max_reward_tokens,
        global_config.window_duration,
        now,
    )?;
    let stream = stake_pool.reward_streams[outcome.index];

    if outcome.newly_registered {
        msg!("Registered reward stream {} in slot {}", stream.stream_id, outcome.index);
        emit!(RewardStreamRegistered {
            mint,
            vault,
            stream_id: stream.stream_id,
            slot: outcome.index as u8,
            whitelisted: stream.whitelisted,
        });
    }

    let reset = outcome.reset;
    emit!(RewardsCredited {
        mint,
        stream_id: stream.stream_id,
        funder,
        amount,
        previous_start: reset.previous_start,
        previous_end: reset.previous_end,
        previous_original: reset.previous_original,
        carried_remainder: reset.carried_remainder,
        new_start: reset.new_start,
        new_end: reset.new_end,
        new_original: reset.new_original,
        available_pool: stream.available_pool,
    });
    Ok(())
}
