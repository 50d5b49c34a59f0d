//! Seals proof-of-work templates: extra nonce management, the nonce search
//! loop and submission through the validator.

use std::fmt;
use bytes::Bytes;
use chain::{Block, Transaction};
use hash::H256;
use network::ConsensusParams;
use parking_lot::RwLock;
use script;
use storage::SharedStore;
use verification::{is_valid_proof_of_work, BlockValidator};
use block_assembler::{BlockAssembler, Error as AssemblerError, TemplateRequest};
use context::MiningContext;
use memory_pool::MemoryPool;
use time_source::TimeSource;

/// Default number of hashes tried before a `generate*` call gives up.
pub const DEFAULT_MAX_TRIES: u64 = 1_000_000;

#[derive(Debug, PartialEq)]
pub enum Error {
	/// The assembler failed to produce a template.
	TemplateCreation(AssemblerError),
	/// A sealed block was rejected by the validator.
	SubmitRejected(::verification::Error),
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match *self {
			Error::TemplateCreation(ref err) => write!(f, "couldn't create new block: {}", err),
			Error::SubmitRejected(ref err) => write!(f, "block not accepted: {}", err),
		}
	}
}

/// Outcome of a single sealing attempt.
#[derive(Debug, PartialEq)]
pub enum PowSeal {
	/// The block satisfied the target and was accepted.
	Found(H256),
	/// The whole nonce range was exhausted; retry with a fresh extra nonce.
	NonceRangeExhausted,
}

/// Monotonic extra nonce written into the coinbase scriptSig; resets when
/// the chain tip moves.
#[derive(Default)]
pub struct ExtraNonceCounter {
	counter: u32,
	previous_header_hash: H256,
}

impl ExtraNonceCounter {
	/// Bumps the counter, rewrites the coinbase scriptSig as
	/// `push(height) || push(extra_nonce)` and recommits the merkle root.
	pub fn increment(&mut self, block: &mut Block, height: u32) {
		if self.previous_header_hash != block.block_header.previous_header_hash {
			self.counter = 0;
			self.previous_header_hash = block.block_header.previous_header_hash;
		}
		self.counter += 1;

		let script_sig = script::Builder::default()
			.push_num(height as i64)
			.push_num(self.counter as i64)
			.into_bytes();
		debug_assert!(script_sig.len() <= 100, "coinbase scriptSig stays far below the 100 byte limit");
		block.transactions[0].inputs[0].script_sig = script_sig;

		let hashes = block.transactions.iter().map(Transaction::hash).collect::<Vec<_>>();
		block.block_header.merkle_root_hash = ::chain::merkle_root(&hashes);
	}

	pub fn value(&self) -> u32 {
		self.counter
	}
}

/// Grinds the header nonce until the proof-of-work target or a limit is
/// reached, then submits. `Ok(None)` means tries were exhausted or shutdown
/// was requested.
pub fn generate_block(
	block: &mut Block,
	height: u32,
	consensus: &ConsensusParams,
	validator: &dyn BlockValidator,
	context: &MiningContext,
	extra_nonce: &mut ExtraNonceCounter,
	max_tries: &mut u64,
) -> Result<Option<PowSeal>, Error> {
	extra_nonce.increment(block, height);

	let max_bits = consensus.network.max_bits().into();
	while *max_tries > 0
		&& block.block_header.nonce < u32::max_value()
		&& !is_valid_proof_of_work(max_bits, block.block_header.bits, &block.hash())
		&& !context.is_shutdown_requested()
	{
		block.block_header.nonce += 1;
		*max_tries -= 1;
	}

	if *max_tries == 0 || context.is_shutdown_requested() {
		return Ok(None);
	}
	if block.block_header.nonce == u32::max_value() {
		return Ok(Some(PowSeal::NonceRangeExhausted));
	}

	validator
		.process_new_block(block, true)
		.map_err(Error::SubmitRejected)?;
	Ok(Some(PowSeal::Found(block.hash())))
}

/// Mines `count` blocks paying to `coinbase_script`, rebuilding the template
/// for every attempt so each block picks up the fresh tip and mempool.
pub fn generate_blocks(
	count: u32,
	mut max_tries: u64,
	coinbase_script: Bytes,
	assembler: &BlockAssembler,
	store: &SharedStore,
	mempool: &RwLock<MemoryPool>,
	consensus: &ConsensusParams,
	context: &MiningContext,
	validator: &dyn BlockValidator,
	time_source: &dyn TimeSource,
) -> Result<Vec<H256>, Error> {
	let mut hashes = Vec::new();
	let start_height = match store.best_block() {
		Some(best) => best.number,
		None => return Ok(hashes),
	};
	let end_height = start_height + count;
	let mut extra_nonce = ExtraNonceCounter::default();

	while store.best_block().map_or(0, |best| best.number) < end_height
		&& !context.is_shutdown_requested()
	{
		let template = {
			let pool = mempool.read();
			assembler.create_new_block(store, &pool, consensus, context, validator, time_source,
				TemplateRequest::ProofOfWork { coinbase_script: coinbase_script.clone() })
		}.map_err(Error::TemplateCreation)?;

		let mut block = template.block;
		match generate_block(&mut block, template.height, consensus, validator, context,
			&mut extra_nonce, &mut max_tries)?
		{
			None => break,
			Some(PowSeal::NonceRangeExhausted) => continue,
			Some(PowSeal::Found(hash)) => hashes.push(hash),
		}
	}

	Ok(hashes)
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;
	use network::{genesis_block, ConsensusParams, Network};
	use parking_lot::RwLock;
	use storage::{MemoryChain, SharedStore};
	use verification::ChainAcceptor;
	use block_assembler::BlockAssembler;
	use context::MiningContext;
	use memory_pool::MemoryPool;
	use test_utils::MockValidator;
	use time_source::FixedTimeSource;
	use super::{generate_blocks, ExtraNonceCounter, DEFAULT_MAX_TRIES};

	#[test]
	fn test_extra_nonce_rewrites_coinbase_and_merkle() {
		let genesis = genesis_block(Network::Regtest);
		let mut block = genesis.clone();
		let mut counter = ExtraNonceCounter::default();

		counter.increment(&mut block, 1);
		assert_eq!(counter.value(), 1);
		let first_script = block.transactions[0].inputs[0].script_sig.clone();
		let first_merkle = block.block_header.merkle_root_hash;
		assert_eq!(block.merkle_root(), first_merkle);

		counter.increment(&mut block, 1);
		assert_eq!(counter.value(), 2);
		assert!(block.transactions[0].inputs[0].script_sig != first_script);
		assert!(block.block_header.merkle_root_hash != first_merkle);
	}

	#[test]
	fn test_extra_nonce_resets_when_parent_changes() {
		let genesis = genesis_block(Network::Regtest);
		let mut block = genesis.clone();
		let mut counter = ExtraNonceCounter::default();
		counter.increment(&mut block, 1);
		counter.increment(&mut block, 1);
		assert_eq!(counter.value(), 2);

		block.block_header.previous_header_hash = 5u8.into();
		counter.increment(&mut block, 2);
		assert_eq!(counter.value(), 1);
	}

	#[test]
	fn test_generate_blocks_extends_the_chain() {
		let consensus = ConsensusParams::new(Network::Regtest);
		let genesis = genesis_block(Network::Regtest);
		let context = MiningContext::new(genesis.hash(), 0);
		let store: SharedStore = Arc::new(MemoryChain::new(genesis));
		let validator = ChainAcceptor::new(store.clone(), consensus.clone());
		let assembler = BlockAssembler::new(&consensus);
		let mempool = RwLock::new(MemoryPool::new());
		let time = FixedTimeSource(2_000_000_000);

		let hashes = generate_blocks(2, DEFAULT_MAX_TRIES, "51".into(), &assembler, &store,
			&mempool, &consensus, &context, &validator, &time).unwrap();

		assert_eq!(hashes.len(), 2);
		assert_eq!(store.best_block().unwrap().number, 2);
		assert_eq!(store.best_block().unwrap().hash, hashes[1]);
	}

	#[test]
	fn test_generate_stops_when_tries_are_exhausted() {
		let consensus = ConsensusParams::new(Network::Regtest);
		let genesis = genesis_block(Network::Regtest);
		let context = MiningContext::new(genesis.hash(), 0);
		let store: SharedStore = Arc::new(MemoryChain::new(genesis));
		let validator = MockValidator::default();
		let assembler = BlockAssembler::new(&consensus);
		let mempool = RwLock::new(MemoryPool::new());
		let time = FixedTimeSource(2_000_000_000);

		// zero tries: the sealer gives up before finding anything
		let hashes = generate_blocks(1, 0, "51".into(), &assembler, &store, &mempool,
			&consensus, &context, &validator, &time).unwrap();
		assert!(hashes.is_empty());
	}
}
