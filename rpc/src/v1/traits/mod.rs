mod generate;
mod miner;
mod staking;

pub use self::generate::Generate;
pub use self::miner::Miner;
pub use self::staking::Staking;
