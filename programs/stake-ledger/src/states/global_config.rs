use crate::error::ErrorCode;
use crate::{MAX_REMOVAL_DUST, MAX_WHITELIST};
use anchor_lang::prelude::*;

//
// ──────────────────────────────────────────────────────────────────────────────
// Global Configuration Account
// ──────────────────────────────────────────────────────────────────────────────
//

/// PDA seed string used to derive the global configuration account.
pub const GLOBAL_CONFIG_SEED: &str = "global_config";

/// Administrative parameters and fixed addresses of the ledger.
///
/// Written only by `initialise_ledger`, `update_config` and `update_whitelist`.
/// Staking, crediting and claiming read it but never modify it.
#[account]
#[derive(Default, Debug)]
pub struct GlobalConfig {
    /// PDA bump for this account (for seed derivation).
    pub bump: u8,

    /// Key allowed to change configuration and the whitelist.
    pub admin: Pubkey,

    /// Key allowed to push rewards through `credit_rewards` (besides the admin).
    pub treasury: Pubkey,

    /// Mint of the staked base asset.
    pub base_mint: Pubkey,

    /// Non-transferable Token-2022 mint issued one-for-one against staked balance.
    pub receipt_mint: Pubkey,

    /// Program-owned vault holding staked principal only.
    pub escrow_vault: Pubkey,

    /// Ledger state account (totals and reward streams).
    pub stake_pool: Pubkey,

    /// Length in seconds of every newly opened vesting window.
    pub window_duration: u64,

    /// Maximum number of live reward streams that are not whitelisted.
    pub max_reward_tokens: u64,

    /// Voting power is `balance * seconds_held / voting_power_divisor`.
    pub voting_power_divisor: u64,

    /// Largest unclaimed pool remainder tolerated when removing a drained stream.
    /// Never above `MAX_REMOVAL_DUST`.
    pub removal_dust: u64,

    /// Mints exempt from `max_reward_tokens`. Slot 0 always holds the base mint.
    pub whitelist: [Pubkey; MAX_WHITELIST],

    /// Number of occupied entries in `whitelist`.
    pub whitelist_len: u8,
}

impl GlobalConfig {
    /// Fixed serialized size of the account (for allocation at initialization).
    ///
    /// Breakdown:
    /// - 8: account discriminator
    /// - 1: bump
    /// - 32 * 6: six Pubkeys
    /// - 8 * 4: four u64 fields
    /// - 32 * MAX_WHITELIST: whitelist
    /// - 1: whitelist_len
    pub const LEN: usize = 8 + 1 + 32 * 6 + 8 * 4 + 32 * MAX_WHITELIST + 1;

    pub fn is_whitelisted(&self, mint: &Pubkey) -> bool {
        self.whitelist_entries().contains(mint)
    }

    pub fn whitelist_entries(&self) -> &[Pubkey] {
        &self.whitelist[..self.whitelist_len as usize]
    }

    pub fn is_authorized_funder(&self, key: &Pubkey) -> bool {
        *key == self.treasury || *key == self.admin
    }

    pub fn set_removal_dust(&mut self, value: u64) -> Result<()> {
        require_gte!(MAX_REMOVAL_DUST, value, ErrorCode::InvalidParam);
        self.removal_dust = value;
        Ok(())
    }

    pub fn add_to_whitelist(&mut self, mint: Pubkey) -> Result<()> {
        require!(!self.is_whitelisted(&mint), ErrorCode::AlreadyWhitelisted);
        let len = self.whitelist_len as usize;
        require!(len < MAX_WHITELIST, ErrorCode::WhitelistFull);
        self.whitelist[len] = mint;
        self.whitelist_len += 1;
        Ok(())
    }

    pub fn remove_from_whitelist(&mut self, mint: Pubkey) -> Result<()> {
        require_keys_neq!(mint, self.base_mint, ErrorCode::BaseAssetWhitelisted);
        let len = self.whitelist_len as usize;
        let index = self
            .whitelist_entries()
            .iter()
            .position(|entry| *entry == mint)
            .ok_or(ErrorCode::NotWhitelisted)?;
        // swap-remove keeps the occupied prefix contiguous; slot 0 (base) never moves
        self.whitelist[index] = self.whitelist[len - 1];
        self.whitelist[len - 1] = Pubkey::default();
        self.whitelist_len -= 1;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::assert_error_code;

    fn config_with_base(base: Pubkey) -> GlobalConfig {
        let mut config = GlobalConfig {
            base_mint: base,
            ..Default::default()
        };
        config.add_to_whitelist(base).unwrap();
        config
    }

    #[test]
    fn base_mint_cannot_be_delisted() {
        let base = Pubkey::new_unique();
        let mut config = config_with_base(base);
        let err = config.remove_from_whitelist(base).unwrap_err();
        assert_error_code(err, ErrorCode::BaseAssetWhitelisted);
        assert!(config.is_whitelisted(&base));
    }

    #[test]
    fn whitelist_add_remove_keeps_entries_contiguous() {
        let base = Pubkey::new_unique();
        let mut config = config_with_base(base);
        let a = Pubkey::new_unique();
        let b = Pubkey::new_unique();
        config.add_to_whitelist(a).unwrap();
        config.add_to_whitelist(b).unwrap();
        assert_error_code(
            config.add_to_whitelist(a).unwrap_err(),
            ErrorCode::AlreadyWhitelisted,
        );

        config.remove_from_whitelist(a).unwrap();
        assert_eq!(config.whitelist_entries(), &[base, b]);
        assert_error_code(
            config.remove_from_whitelist(a).unwrap_err(),
            ErrorCode::NotWhitelisted,
        );
    }

    #[test]
    fn whitelist_is_bounded() {
        let mut config = config_with_base(Pubkey::new_unique());
        for _ in 1..MAX_WHITELIST {
            config.add_to_whitelist(Pubkey::new_unique()).unwrap();
        }
        assert_error_code(
            config.add_to_whitelist(Pubkey::new_unique()).unwrap_err(),
            ErrorCode::WhitelistFull,
        );
    }

    #[test]
    fn removal_dust_is_capped() {
        let mut config = GlobalConfig::default();
        config.set_removal_dust(MAX_REMOVAL_DUST).unwrap();
        assert_error_code(
            config.set_removal_dust(MAX_REMOVAL_DUST + 1).unwrap_err(),
            ErrorCode::InvalidParam,
        );
        assert_eq!(config.removal_dust, MAX_REMOVAL_DUST);
    }

    #[test]
    fn treasury_and_admin_may_fund() {
        let config = GlobalConfig {
            admin: Pubkey::new_unique(),
            treasury: Pubkey::new_unique(),
            ..Default::default()
        };
        assert!(config.is_authorized_funder(&config.admin));
        assert!(config.is_authorized_funder(&config.treasury));
        assert!(!config.is_authorized_funder(&Pubkey::new_unique()));
    }
}
