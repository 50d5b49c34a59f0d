//! Hybrid PoW/PoS coin client.

extern crate clap;
extern crate env_logger;
#[macro_use]
extern crate log;
extern crate parking_lot;

extern crate miner;
extern crate network;
extern crate rpc;
extern crate storage;
extern crate verification;

mod config;

use std::net::SocketAddr;
use std::sync::Arc;
use miner::{BlockAssembler, MemoryPool, MiningContext, StakeMiner, SyncStatus, SystemTimeSource,
	TimeSource};
use network::{genesis_block, ConsensusParams};
use parking_lot::{Mutex, RwLock};
use rpc::v1::impls::{ClientCore, GenerateClient, MinerClient, StakingClient};
use rpc::v1::traits::{Generate, Miner, Staking};
use rpc::IoHandler;
use storage::{MemoryChain, SharedStore};
use verification::ChainAcceptor;

fn main() {
	env_logger::init();
	if let Err(error) = run() {
		error!(target: "pmint", "{}", error);
		println!("{}", error);
	}
}

/// The node has no p2p layer wired in yet; templates are served to local
/// miners only.
struct LocalNodeStatus;

impl SyncStatus for LocalNodeStatus {
	fn peers_count(&self) -> usize {
		0
	}

	fn is_initial_block_download(&self) -> bool {
		false
	}

	fn verification_progress(&self) -> f64 {
		1.0
	}
}

fn run() -> Result<(), String> {
	let matches = config::commandline().get_matches();
	let config = config::parse(&matches)?;

	let consensus = ConsensusParams::new(config.network);
	let genesis = genesis_block(config.network);
	let genesis_hash = genesis.hash();
	info!(target: "pmint", "Starting on {} with genesis {}",
		config.network.name(), genesis_hash.to_reversed_str());

	let store: SharedStore = Arc::new(MemoryChain::new(genesis));
	let time_source = Arc::new(SystemTimeSource);
	let context = Arc::new(MiningContext::new(genesis_hash, time_source.adjusted_now()));

	let validator = Arc::new(ChainAcceptor::new(store.clone(), consensus.clone()));
	{
		let context = context.clone();
		validator.on_new_best_block(move |hash| context.notify_new_best_block(hash));
	}

	let mut assembler = BlockAssembler::with_options(&consensus, config.block_max_weight,
		config.block_min_fee_rate);
	assembler.set_block_version_override(config.block_version);
	assembler.set_print_priority(config.print_priority);

	let core = ClientCore {
		store,
		mempool: Arc::new(RwLock::new(MemoryPool::new())),
		consensus,
		context: context.clone(),
		validator,
		sync_status: Arc::new(LocalNodeStatus),
		time_source,
		assembler: Arc::new(assembler),
		// the wallet backend attaches through its own process; until then
		// staking RPC calls are inert
		wallet: None,
		stake_miner: Arc::new(Mutex::new(StakeMiner::new(context.clone()))),
		stake_timio_base: config.stake_timio,
	};

	if config.staking && core.wallet.is_none() {
		warn!(target: "pmint", "--staking given but no wallet backend is attached");
	}

	let mut handler = IoHandler::new();
	handler.extend_with(MinerClient::new(core.clone()).to_delegate());
	handler.extend_with(GenerateClient::new(core.clone()).to_delegate());
	handler.extend_with(StakingClient::new(core).to_delegate());

	let address = SocketAddr::from(([127, 0, 0, 1], config.rpc_port));
	let server = rpc::start_http(&address, handler)
		.map_err(|error| format!("Failed to start RPC server: {}", error))?;
	info!(target: "pmint", "JSON-RPC server listening on {}", address);

	server.wait();

	context.request_shutdown();
	Ok(())
}
