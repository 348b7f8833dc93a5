pub mod initialise_ledger;
pub use initialise_ledger::*;

pub mod update_configs;
pub use update_configs::*;

pub mod update_whitelist;
pub use update_whitelist::*;

pub mod stake;
pub use stake::*;

pub mod unstake;
pub use unstake::*;

pub mod credit_rewards;
pub use credit_rewards::*;

pub mod sync_rewards;
pub use sync_rewards::*;

pub mod claim_rewards;
pub use claim_rewards::*;

pub mod remove_reward_stream;
pub use remove_reward_stream::*;

pub mod views;
pub use views::*;
