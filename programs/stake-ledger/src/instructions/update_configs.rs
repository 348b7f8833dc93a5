use crate::error::ErrorCode;
use crate::states::{ConfigUpdated, GlobalConfig, GLOBAL_CONFIG_SEED};
use crate::MAX_REWARD_STREAMS;
use anchor_lang::prelude::*;

/// Accounts context for the `update_config` instruction.
///
/// Only the current `admin` in `global_config` or the program-level admin
/// (`crate::admin::id()`) may update parameters.
#[derive(Accounts)]
pub struct UpdateConfig<'info> {
    /// Authorized signer: must be the stored admin or the hardcoded program admin.
    #[account(
        constraint = (owner.key() == global_config.admin || owner.key() == crate::admin::id()) @ ErrorCode::InvalidOwner
    )]
    pub owner: Signer<'info>,

    #[account(
        mut,
        seeds = [GLOBAL_CONFIG_SEED.as_bytes()],
        bump,
    )]
    pub global_config: Box<Account<'info, GlobalConfig>>,

    pub system_program: Program<'info, System>,
}

/// Updates one field of the global configuration.
///
/// # Param Mapping
/// - `0`: **admin** → new admin Pubkey passed via `remaining_accounts[0]`.
/// - `1`: **treasury** → new treasury Pubkey passed via `remaining_accounts[0]`.
/// - `2`: **window_duration** → seconds, must be non-zero. Applies to windows opened afterwards.
/// - `3`: **max_reward_tokens** → cap on non-whitelisted streams, at most `MAX_REWARD_STREAMS`.
///   Lowering it below the live count only blocks new registrations.
/// - `4`: **voting_power_divisor** → must be non-zero.
/// - `5`: **removal_dust** → unclaimed remainder tolerated by `remove_reward_stream`,
///   at most `MAX_REMOVAL_DUST`.
///
/// Any other `param` value returns `ErrorCode::InvalidParam`.
pub fn update_config(ctx: Context<UpdateConfig>, param: u8, value: u64) -> Result<()> {
    let global_config = &mut ctx.accounts.global_config;
    match param {
        0 | 1 => {
            let new_key = *ctx
                .remaining_accounts
                .iter()
                .next()
                .ok_or(error!(ErrorCode::MissingRemainingAccount))?
                .key;
            require_keys_neq!(new_key, Pubkey::default());
            if param == 0 {
                global_config.admin = new_key;
            } else {
                global_config.treasury = new_key;
            }
        }
        2 => {
            require_gt!(value, 0, ErrorCode::InvalidParam);
            global_config.window_duration = value;
        }
        3 => {
            require_gte!(MAX_REWARD_STREAMS as u64, value, ErrorCode::InvalidParam);
            global_config.max_reward_tokens = value;
        }
        4 => {
            require_gt!(value, 0, ErrorCode::InvalidParam);
            global_config.voting_power_divisor = value;
        }
        5 => {
            global_config.set_removal_dust(value)?;
        }
        _ => return Err(error!(ErrorCode::InvalidParam)),
    }
    msg!("Config param {} updated", param);

    emit!(ConfigUpdated {
        param,
        admin: global_config.admin,
        treasury: global_config.treasury,
        window_duration: global_config.window_duration,
        max_reward_tokens: global_config.max_reward_tokens,
        voting_power_divisor: global_config.voting_power_divisor,
        removal_dust: global_config.removal_dust,
    });
    Ok(())
}
