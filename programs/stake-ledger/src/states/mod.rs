pub mod events;
pub use events::*;

pub mod global_config;
pub use global_config::*;

pub mod reward_stream;
pub use reward_stream::*;

pub mod claim_state;
pub use claim_state::*;

pub mod stake_pool;
pub use stake_pool::*;

pub mod stake_position;
pub use stake_position::*;

pub mod voting_clock;
