//! Block production: fee-ordered package selection over the memory pool,
//! template assembly for both proof types, the proof-of-work sealer, the
//! background stake miner and the network hash rate estimator.

extern crate chain;
extern crate crypto;
#[macro_use]
extern crate log;
extern crate network;
extern crate parking_lot;
extern crate primitives;
extern crate rand;
extern crate script;
extern crate storage;
extern crate verification;

#[cfg(test)]
extern crate test_data;

mod block_assembler;
mod context;
mod fee;
mod generator;
mod hash_rate;
mod memory_pool;
mod stake_miner;
mod status;
mod time_source;
mod wallet;

#[cfg(test)]
mod test_utils;

pub use primitives::{bytes, compact, hash, uint};

pub use block_assembler::{generate_coinbase_commitment, BlockAssembler, BlockTemplate,
	Error as AssemblerError, TemplateRequest, DEFAULT_BLOCK_MAX_WEIGHT, DEFAULT_BLOCK_MIN_TX_FEE};
pub use context::{MiningContext, TemplateStats};
pub use fee::FeeRate;
pub use generator::{generate_block, generate_blocks, Error as GeneratorError, ExtraNonceCounter,
	PowSeal, DEFAULT_MAX_TRIES};
pub use hash_rate::{network_hash_ps, pos_kernel_ps};
pub use memory_pool::{HashedTransaction, Information as MemoryPoolInformation, MemoryPool, MemoryPoolEntry};
pub use stake_miner::{StakeMiner, StakeMinerDeps, DEFAULT_STAKE_TIMIO};
pub use status::SyncStatus;
pub use time_source::{SystemTimeSource, TimeSource};
pub use wallet::StakingWallet;
