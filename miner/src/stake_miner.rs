//! Background proof-of-stake miner: gates on wallet, network and sync
//! readiness, drives the assembler in stake mode, signs and submits.

use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;
use chain::Block;
use network::ConsensusParams;
use parking_lot::RwLock;
use rand::{self, Rng};
use storage::SharedStore;
use verification::BlockValidator;
use block_assembler::{BlockAssembler, Error as AssemblerError, TemplateRequest};
use context::MiningContext;
use generator::ExtraNonceCounter;
use memory_pool::MemoryPool;
use status::SyncStatus;
use time_source::TimeSource;
use wallet::StakingWallet;

/// Base of the inter-attempt throttle, in milliseconds.
pub const DEFAULT_STAKE_TIMIO: u64 = 500;

/// The staker only works once verification is essentially caught up.
const MIN_VERIFICATION_PROGRESS: f64 = 0.996;

const WARNING_LOCKED: &'static str = "Info: Staking suspended due to locked wallet.";
const WARNING_SYNCING: &'static str = "Info: Staking suspended while synchronizing wallet.";
const WARNING_BLOCK_CREATION: &'static str = "Info: Staking suspended due to block creation failure.";

/// Everything the stake miner thread works with.
#[derive(Clone)]
pub struct StakeMinerDeps {
	pub store: SharedStore,
	pub mempool: Arc<RwLock<MemoryPool>>,
	pub consensus: ConsensusParams,
	pub context: Arc<MiningContext>,
	pub validator: Arc<dyn BlockValidator>,
	pub wallet: Arc<dyn StakingWallet>,
	pub sync_status: Arc<dyn SyncStatus>,
	pub time_source: Arc<dyn TimeSource>,
	pub assembler: Arc<BlockAssembler>,
	/// `-staketimio`, the base of the throttle.
	pub stake_timio_base: u64,
}

/// Handle of the background staking thread.
pub struct StakeMiner {
	context: Arc<MiningContext>,
	thread: Option<JoinHandle<()>>,
}

impl StakeMiner {
	pub fn new(context: Arc<MiningContext>) -> Self {
		StakeMiner {
			context,
			thread: None,
		}
	}

	pub fn is_running(&self) -> bool {
		self.thread.is_some()
	}

	/// Starts staking unless the worker is already running.
	pub fn start(&mut self, deps: StakeMinerDeps) {
		if self.context.is_staking_enabled() && self.thread.is_some() {
			return;
		}
		self.context.set_staking_enabled(true);
		self.thread = Some(thread::Builder::new()
			.name("stake-miner".into())
			.spawn(move || stake_miner_loop(deps))
			.expect("thread spawning only fails on resource exhaustion at startup; qed"));
	}

	/// Disables staking and waits for the worker to unwind.
	pub fn interrupt(&mut self) {
		info!(target: "miner", "Interrupting stake miner");
		self.context.set_staking_enabled(false);
		self.stop();
	}

	/// Joins the worker without flipping the staking flag.
	pub fn stop(&mut self) {
		if let Some(thread) = self.thread.take() {
			if thread.join().is_err() {
				error!(target: "miner", "Stake miner thread panicked");
			}
		}
	}
}

fn stake_miner_loop(deps: StakeMinerDeps) {
	info!(target: "miner", "Stake miner started");

	// throttle long enough to avoid re-probing every slot, scaled by the
	// number of stakable outputs
	let pos_timio = deps.stake_timio_base
		+ 30 * (deps.wallet.available_coins_count() as f64).sqrt() as u64;
	info!(target: "miner", "Set proof-of-stake timeout: {}ms for {} UTXOs",
		pos_timio, deps.wallet.available_coins_count());

	let context = deps.context.clone();
	let mut extra_nonce = ExtraNonceCounter::default();
	let mut need_to_clear = false;

	while context.is_staking_enabled() {
		if context.is_shutdown_requested() {
			return;
		}

		while deps.wallet.is_locked() {
			if context.is_shutdown_requested() || !context.is_staking_enabled() {
				return;
			}
			if context.set_warning(WARNING_LOCKED) {
				info!(target: "miner", "{}", WARNING_LOCKED);
			}
			need_to_clear = true;
			if !context.interruptible_sleep(Duration::from_secs(2)) {
				return;
			}
		}

		// wait for the network so no time is wasted staking on an obsolete
		// chain; regtest expects to fly solo
		while (deps.sync_status.peers_count() == 0 || deps.sync_status.is_initial_block_download())
			&& !deps.consensus.network.mine_blocks_on_demand()
		{
			if context.is_shutdown_requested() || !context.is_staking_enabled() {
				return;
			}
			if context.set_warning(WARNING_SYNCING) {
				info!(target: "miner", "{}", WARNING_SYNCING);
			}
			need_to_clear = true;
			if !context.interruptible_sleep(Duration::from_secs(10)) {
				return;
			}
		}

		while deps.sync_status.verification_progress() < MIN_VERIFICATION_PROGRESS {
			if context.is_shutdown_requested() || !context.is_staking_enabled() {
				return;
			}
			debug!(target: "miner", "Stake miner sleeps while sync at {}",
				deps.sync_status.verification_progress());
			if context.set_warning(WARNING_SYNCING) {
				info!(target: "miner", "{}", WARNING_SYNCING);
			}
			need_to_clear = true;
			if !context.interruptible_sleep(Duration::from_secs(10)) {
				return;
			}
		}

		if need_to_clear && context.set_warning("") {
			need_to_clear = false;
		}

		let template = {
			let pool = deps.mempool.read();
			deps.assembler.create_new_block(&deps.store, &pool, &deps.consensus, &context,
				&*deps.validator, &*deps.time_source,
				TemplateRequest::ProofOfStake { wallet: &*deps.wallet })
		};

		let mut block = match template {
			Ok(template) => template.block,
			Err(AssemblerError::CoinStakeUnavailable) => {
				// nothing staked this slot; try the next one
				if !context.interruptible_sleep(Duration::from_millis(pos_timio)) {
					return;
				}
				continue;
			},
			Err(error) => {
				if context.set_warning(WARNING_BLOCK_CREATION) {
					warn!(target: "miner", "{}", WARNING_BLOCK_CREATION);
				}
				error!(target: "miner", "Stake miner block creation failed: {}", error);
				if !context.interruptible_sleep(Duration::from_secs(10)) {
					return;
				}
				continue;
			},
		};

		let height = deps.store.best_block()
			.map_or(0, |best| best.number + 1);
		extra_nonce.increment(&mut block, height);

		if !deps.wallet.sign_block(&mut block) {
			warn!(target: "miner", "Stake miner failed to sign the block");
			continue;
		}

		info!(target: "miner", "Stake miner found proof-of-stake block {}",
			block.hash().to_reversed_str());
		process_block_found(&block, &deps);

		// rest after a successful block so the chain breathes
		let cooldown = 60 + rand::thread_rng().gen_range(0..4u64);
		if !context.interruptible_sleep(Duration::from_secs(cooldown)) {
			return;
		}

		if !context.interruptible_sleep(Duration::from_millis(pos_timio)) {
			return;
		}
	}
}

/// Re-verifies the kernel and the parent under the current tip, then feeds
/// the block to the validator. Stale or failing blocks are dropped.
fn process_block_found(block: &Block, deps: &StakeMinerDeps) -> bool {
	let coinstake = &block.transactions[1];
	let stake_time = if coinstake.time != 0 {
		coinstake.time
	} else {
		block.block_header.time
	};

	if !deps.validator.check_proof_of_stake(
		&block.block_header.previous_header_hash,
		coinstake,
		block.block_header.bits,
		stake_time,
	) {
		error!(target: "miner", "Proof-of-stake checking failed for {}", block.hash().to_reversed_str());
		return false;
	}

	match deps.store.best_block() {
		Some(ref best) if best.hash == block.block_header.previous_header_hash => (),
		_ => {
			// dropped silently, the chain moved on
			warn!(target: "miner", "Generated block {} is stale", block.hash().to_reversed_str());
			return false;
		},
	}

	match deps.validator.process_new_block(block, true) {
		Ok(_) => true,
		Err(error) => {
			error!(target: "miner", "Generated block not accepted: {}", error);
			false
		},
	}
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;
	use std::thread;
	use std::time::{Duration, Instant};
	use network::{genesis_block, ConsensusParams, Network};
	use parking_lot::RwLock;
	use storage::{MemoryChain, SharedStore};
	use block_assembler::BlockAssembler;
	use context::MiningContext;
	use memory_pool::MemoryPool;
	use test_utils::{MockSyncStatus, MockValidator, MockWallet};
	use time_source::SystemTimeSource;
	use super::{StakeMiner, StakeMinerDeps};

	fn deps(wallet: Arc<MockWallet>, validator: Arc<MockValidator>, context: Arc<MiningContext>) -> StakeMinerDeps {
		let consensus = ConsensusParams::new(Network::Regtest);
		let store: SharedStore = Arc::new(MemoryChain::new(genesis_block(Network::Regtest)));
		StakeMinerDeps {
			store,
			mempool: Arc::new(RwLock::new(MemoryPool::new())),
			consensus: consensus.clone(),
			context,
			validator,
			wallet,
			sync_status: Arc::new(MockSyncStatus::synced()),
			time_source: Arc::new(SystemTimeSource),
			assembler: Arc::new(BlockAssembler::new(&consensus)),
			stake_timio_base: 10,
		}
	}

	fn wait_until<F>(timeout: Duration, condition: F) -> bool where F: Fn() -> bool {
		let start = Instant::now();
		while start.elapsed() < timeout {
			if condition() {
				return true;
			}
			thread::sleep(Duration::from_millis(20));
		}
		condition()
	}

	#[test]
	fn test_miner_produces_and_submits_a_stake_block() {
		let wallet = Arc::new(MockWallet::with_kernel());
		let validator = Arc::new(MockValidator::default());
		let context = Arc::new(MiningContext::new(Default::default(), 0));
		let mut miner = StakeMiner::new(context.clone());

		miner.start(deps(wallet, validator.clone(), context.clone()));
		assert!(wait_until(Duration::from_secs(5), || !validator.processed_hashes().is_empty()));
		miner.interrupt();
		assert!(!context.is_staking_enabled());
	}

	#[test]
	fn test_locked_wallet_warns_once_and_resumes_on_unlock() {
		let wallet = Arc::new(MockWallet::locked());
		let validator = Arc::new(MockValidator::default());
		let context = Arc::new(MiningContext::new(Default::default(), 0));
		let mut miner = StakeMiner::new(context.clone());

		miner.start(deps(wallet.clone(), validator.clone(), context.clone()));
		assert!(wait_until(Duration::from_secs(2), || !context.warning().is_empty()));
		let warning = context.warning();
		assert!(warning.contains("locked wallet"));
		// no block while locked
		assert!(validator.processed_hashes().is_empty());

		wallet.locked.store(false, ::std::sync::atomic::Ordering::SeqCst);
		assert!(wait_until(Duration::from_secs(10), || !validator.processed_hashes().is_empty()));
		// the warning cleared once the miner got back to work
		assert_eq!(context.warning(), "");
		miner.interrupt();
	}

	#[test]
	fn test_interrupt_wakes_sleeping_miner_quickly() {
		let wallet = Arc::new(MockWallet::without_kernel());
		let validator = Arc::new(MockValidator::default());
		let context = Arc::new(MiningContext::new(Default::default(), 0));
		let mut miner = StakeMiner::new(context.clone());

		miner.start(deps(wallet, validator, context.clone()));
		thread::sleep(Duration::from_millis(100));

		let start = Instant::now();
		miner.interrupt();
		assert!(start.elapsed() < Duration::from_secs(5));
		assert!(!miner.is_running());
	}
}
