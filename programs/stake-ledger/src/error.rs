use anchor_lang::prelude::*;

#[error_code]
pub enum ErrorCode {
    #[msg("Amount must be greater than zero")]
    ZeroAmount,

    #[msg("Destination account is invalid")]
    InvalidDestination,

    #[msg("Signer is not authorized for this operation")]
    InvalidOwner,

    #[msg("Unstake amount exceeds the recorded position")]
    InsufficientBalance,

    #[msg("Escrow does not cover the recorded stake")]
    InsufficientEscrow,

    #[msg("Reward vault does not hold enough unaccounted balance for this credit")]
    InsufficientRewardBalance,

    #[msg("Reward registry is full")]
    RegistryFull,

    #[msg("Reward stream has a zero-length window")]
    StreamNotSettleable,

    #[msg("Reward stream is not registered for this mint")]
    StreamNotRegistered,

    #[msg("Reward stream is still vesting or holds unclaimed rewards")]
    StreamStillActive,

    #[msg("No unaccounted reward balance to credit")]
    NothingToCredit,

    #[msg("Reward window is still open; only the treasury or admin may restart it")]
    WindowStillOpen,

    #[msg("Math operation overflowed or underflowed")]
    MathOverflow,

    #[msg("Invalid timestamp conversion")]
    InvalidTimestamp,

    #[msg("Invalid vault account")]
    InvalidVault,

    #[msg("Invalid reward mint")]
    InvalidRewardMint,

    #[msg("Receipt mint must be a non-transferable Token-2022 mint controlled by the ledger")]
    InvalidReceiptMint,

    #[msg("Receipt supply does not match total staked")]
    ReceiptSupplyMismatch,

    #[msg("Missing remaining account")]
    MissingRemainingAccount,

    #[msg("Invalid parameter provided")]
    InvalidParam,

    #[msg("Whitelist is full")]
    WhitelistFull,

    #[msg("Mint is already whitelisted")]
    AlreadyWhitelisted,

    #[msg("Mint is not whitelisted")]
    NotWhitelisted,

    #[msg("The base asset is always whitelisted")]
    BaseAssetWhitelisted,
}

#[cfg(test)]
pub(crate) fn assert_error_code(err: anchor_lang::error::Error, code: ErrorCode) {
    assert_eq!(err, anchor_lang::error::Error::from(code));
}
