mod generate;
mod miner;
mod staking;

use std::sync::Arc;
use miner::{BlockAssembler, MemoryPool, MiningContext, StakeMiner, StakeMinerDeps, StakingWallet,
	SyncStatus, TimeSource};
use network::ConsensusParams;
use parking_lot::{Mutex, RwLock};
use storage::SharedStore;
use verification::BlockValidator;

pub use self::generate::GenerateClient;
pub use self::miner::MinerClient;
pub use self::staking::StakingClient;

/// Node handles the RPC implementations work with.
#[derive(Clone)]
pub struct ClientCore {
	pub store: SharedStore,
	pub mempool: Arc<RwLock<MemoryPool>>,
	pub consensus: ConsensusParams,
	pub context: Arc<MiningContext>,
	pub validator: Arc<dyn BlockValidator>,
	pub sync_status: Arc<dyn SyncStatus>,
	pub time_source: Arc<dyn TimeSource>,
	pub assembler: Arc<BlockAssembler>,
	pub wallet: Option<Arc<dyn StakingWallet>>,
	pub stake_miner: Arc<Mutex<StakeMiner>>,
	pub stake_timio_base: u64,
}

impl ClientCore {
	/// Dependencies of a staking thread, when a wallet is attached.
	pub fn staking_deps(&self) -> Option<StakeMinerDeps> {
		self.wallet.as_ref().map(|wallet| StakeMinerDeps {
			store: self.store.clone(),
			mempool: self.mempool.clone(),
			consensus: self.consensus.clone(),
			context: self.context.clone(),
			validator: self.validator.clone(),
			wallet: wallet.clone(),
			sync_status: self.sync_status.clone(),
			time_source: self.time_source.clone(),
			assembler: self.assembler.clone(),
			stake_timio_base: self.stake_timio_base,
		})
	}
}
