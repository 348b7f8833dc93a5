use crate::error::ErrorCode;
use crate::states::*;
use crate::utils::{current_timestamp, transfer_from_pool_vault_to_user};
use anchor_lang::prelude::*;
use anchor_spl::token_interface::{Mint, TokenAccount, TokenInterface};

/// Claim vested rewards for one or more reward mints.
///
/// Remaining accounts come in triples, one per mint:
/// 1. reward mint (owned by `token_program`)
/// 2. the stream's reward vault
/// 3. destination token account for that mint
///
/// All streams are settled first and every claim entry is updated before any
/// token leaves a vault. When a vested pool cannot cover what is owed, the
/// available part is paid and the rest stays in `pending_carry`.
#[derive(Accounts)]
pub struct ClaimRewards<'info> {
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

    /// CHECK: PDA derivation enforced by seeds; signs vault transfers.
    #[account(
        seeds = [crate::AUTH_SEED.as_bytes()],
        bump,
    )]
    pub authority: UncheckedAccount<'info>,

    /// Token program shared by every mint in this claim.
    pub token_program: Interface<'info, TokenInterface>,
}

struct Payout<'info> {
    mint: AccountInfo<'info>,
    vault: AccountInfo<'info>,
    destination: AccountInfo<'info>,
    decimals: u8,
    outcome: ClaimOutcome,
    available_pool: u64,
}

pub fn claim_rewards<'info>(ctx: Context<'_, '_, 'info, 'info, ClaimRewards<'info>>) -> Result<()> {
    let remaining = ctx.remaining_accounts;
    require!(
        !remaining.is_empty() && remaining.len() % 3 == 0,
        ErrorCode::MissingRemainingAccount
    );
    let now = current_timestamp()?;
    let token_program_id = ctx.accounts.token_program.key();

    // --- 1) Settle everything first ---
    let stake_pool = &mut ctx.accounts.stake_pool;
    let stake_position = &mut ctx.accounts.stake_position;
    stake_pool.settle_all(now)?;

    // --- 2) Validate each triple and settle its claim entry ---
    let mut payouts: Vec<Payout<'info>> = Vec::with_capacity(remaining.len() / 3);
    for triple in remaining.chunks(3) {
        let (mint_info, vault_info, destination_info) = (&triple[0], &triple[1], &triple[2]);
        require_keys_eq!(*mint_info.owner, token_program_id, ErrorCode::InvalidRewardMint);

        let index = stake_pool
            .find_stream(mint_info.key)
            .ok_or(ErrorCode::StreamNotRegistered)?;
        require_keys_eq!(
            vault_info.key(),
            stake_pool.reward_streams[index].vault,
            ErrorCode::InvalidVault
        );
        require_keys_neq!(
            destination_info.key(),
            vault_info.key(),
            ErrorCode::InvalidDestination
        );

        let mint = InterfaceAccount::<Mint>::try_from(mint_info)?;
        let destination = InterfaceAccount::<TokenAccount>::try_from(destination_info)?;
        require_keys_eq!(destination.mint, mint.key(), ErrorCode::InvalidDestination);

        let stream = &mut stake_pool.reward_streams[index];
        let outcome = stake_position.claim(index, stream)?;
        payouts.push(Payout {
            mint: mint_info.clone(),
            vault: vault_info.clone(),
            destination: destination_info.clone(),
            decimals: mint.decimals,
            outcome,
            available_pool: stream.available_pool,
        });
    }

    // --- 3) Move tokens; no ledger state changes past this point ---
    let owner = ctx.accounts.owner.key();
    let signer_seeds: &[&[&[u8]]] = &[&[crate::AUTH_SEED.as_bytes(), &[ctx.bumps.authority]]];
    for payout in payouts {
        transfer_from_pool_vault_to_user(
            ctx.accounts.authority.to_account_info(),
            payout.vault,
            payout.destination.clone(),
            payout.mint.clone(),
            ctx.accounts.token_program.to_account_info(),
            payout.outcome.paid,
            payout.decimals,
            signer_seeds,
        )?;

        emit!(RewardsClaimed {
            owner,
            mint: payout.mint.key(),
            destination: payout.destination.key(),
            owed: payout.outcome.owed,
            paid: payout.outcome.paid,
            available_pool: payout.available_pool,
        });
        if payout.outcome.shortfall > 0 {
            msg!(
                "Reward pool short for {}: owed {}, paid {}",
                payout.mint.key(),
                payout.outcome.owed,
                payout.outcome.paid
            );
            emit!(RewardShortfall {
                owner,
                mint: payout.mint.key(),
                owed: payout.outcome.owed,
                paid: payout.outcome.paid,
                carried: payout.outcome.shortfall,
            });
        }
    }
    Ok(())
}
