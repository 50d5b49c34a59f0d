use std::collections::HashSet;
use std::sync::Arc;
use chain::constants::WITNESS_SCALE_FACTOR;
use chain::{Block, Transaction};
use compact::Compact;
use hash::H256;
use network::ConsensusParams;
use parking_lot::Mutex;
use storage::SharedStore;
use error::Error;
use sigops::transaction_legacy_sigops;
use timestamp::median_timestamp_inclusive;
use validator::{BlockCheckedListener, BlockStatus, BlockValidator};
use work::is_valid_proof_of_work;

/// Reference validator over a `Store`. Structural block rules only; full
/// transaction and kernel verification against the UTXO set belongs to a
/// complete validation pipeline, which stays external to block production.
pub struct ChainAcceptor {
	store: SharedStore,
	consensus: ConsensusParams,
	invalid: Mutex<HashSet<H256>>,
	listeners: Mutex<Vec<Arc<dyn BlockCheckedListener>>>,
	best_block_listener: Mutex<Option<Box<dyn Fn(H256) + Send + Sync>>>,
}

impl ChainAcceptor {
	pub fn new(store: SharedStore, consensus: ConsensusParams) -> Self {
		ChainAcceptor {
			store,
			consensus,
			invalid: Mutex::new(HashSet::new()),
			listeners: Mutex::new(Vec::new()),
			best_block_listener: Mutex::new(None),
		}
	}

	/// Invoked with the new best block hash after a successful insertion.
	pub fn on_new_best_block<F>(&self, callback: F) where F: Fn(H256) + Send + Sync + 'static {
		*self.best_block_listener.lock() = Some(Box::new(callback));
	}

	fn notify_checked(&self, hash: &H256, result: &Result<(), Error>) {
		for listener in self.listeners.lock().iter() {
			listener.on_block_checked(hash, result);
		}
	}

	fn verify_block(&self, block: &Block, check_pow: bool, check_merkle_root: bool) -> Result<(), Error> {
		if block.transactions.is_empty() {
			return Err(Error::Empty);
		}
		if !block.transactions[0].is_coinbase() {
			return Err(Error::Coinbase);
		}
		for (index, transaction) in block.transactions.iter().enumerate().skip(1) {
			if transaction.is_coinbase() {
				return Err(Error::MisplacedCoinbase(index));
			}
		}

		let best_block = self.store.best_block().ok_or_else(|| Error::Database("empty chain".into()))?;
		if block.block_header.previous_header_hash != best_block.hash {
			return Err(Error::WrongParent);
		}
		let height = best_block.number + 1;

		let weight = block.weight();
		if weight > self.consensus.max_block_weight as usize {
			return Err(Error::Weight(weight));
		}

		let sigops: usize = block.transactions.iter()
			.map(|tx| transaction_legacy_sigops(tx) * WITNESS_SCALE_FACTOR)
			.sum();
		if sigops >= self.consensus.max_block_sigops_cost as usize {
			return Err(Error::MaximumSigops);
		}

		let median_time_past = median_timestamp_inclusive(best_block.hash, self.store.as_block_header_provider());
		for transaction in &block.transactions {
			if !transaction.is_final_in_block(height, median_time_past) {
				return Err(Error::NonFinalBlock);
			}
		}

		if check_merkle_root && block.merkle_root() != block.block_header.merkle_root_hash {
			return Err(Error::MerkleRoot);
		}

		if block.is_proof_of_stake() {
			// the coinstake defines the block time
			let coinstake = &block.transactions[1];
			if coinstake.time != block.block_header.time {
				return Err(Error::BadStakeTime);
			}
			if !self.check_proof_of_stake(
				&block.block_header.previous_header_hash,
				coinstake,
				block.block_header.bits,
				coinstake.time,
			) {
				return Err(Error::ProofOfStake);
			}
		} else if check_pow {
			let max_bits = self.consensus.network.max_bits().into();
			if !is_valid_proof_of_work(max_bits, block.block_header.bits, &block.hash()) {
				return Err(Error::Pow);
			}
		}

		Ok(())
	}
}

impl BlockValidator for ChainAcceptor {
	fn test_block_validity(
		&self,
		block: &Block,
		check_pow: bool,
		check_merkle_root: bool,
		_check_signet: bool,
	) -> Result<(), Error> {
		self.verify_block(block, check_pow, check_merkle_root)
	}

	fn process_new_block(&self, block: &Block, _force_processing: bool) -> Result<bool, Error> {
		let hash = block.hash();
		if self.store.block_number(&hash).is_some() {
			return Ok(false);
		}

		let result = self.verify_block(block, true, true)
			.and_then(|_| self.store.insert_block(block)
				.map_err(|err| Error::Database(format!("{}", err))));
		self.notify_checked(&hash, &result);

		match result {
			Ok(()) => {
				info!(target: "verification", "Switched to new best block {}", hash.to_reversed_str());
				if let Some(ref listener) = *self.best_block_listener.lock() {
					listener(hash);
				}
				Ok(true)
			},
			Err(error) => {
				self.invalid.lock().insert(hash);
				Err(error)
			},
		}
	}

	fn check_proof_of_stake(
		&self,
		previous_header_hash: &H256,
		coinstake: &Transaction,
		bits: Compact,
		stake_time: u32,
	) -> bool {
		if !coinstake.is_coinstake() {
			return false;
		}
		if stake_time & self.consensus.stake_timestamp_mask != 0 {
			return false;
		}
		if bits.to_u256().is_err() {
			return false;
		}

		// the stake must move time forward past the median of the chain it
		// extends; the kernel hash itself is checked by full validation
		let median_time_past = median_timestamp_inclusive(*previous_header_hash, self.store.as_block_header_provider());
		stake_time >= median_time_past + 1
	}

	fn check_kernel(
		&self,
		previous_header_hash: &H256,
		bits: Compact,
		time: u32,
		prev_out: &::chain::OutPoint,
	) -> bool {
		if prev_out.is_null() {
			return false;
		}
		if time & self.consensus.stake_timestamp_mask != 0 {
			return false;
		}
		if bits.to_u256().is_err() {
			return false;
		}
		let median_time_past = median_timestamp_inclusive(*previous_header_hash, self.store.as_block_header_provider());
		time >= median_time_past + 1
	}

	fn block_status(&self, hash: &H256) -> BlockStatus {
		if self.store.block_number(hash).is_some() {
			return BlockStatus::Valid;
		}
		if self.invalid.lock().contains(hash) {
			return BlockStatus::Invalid;
		}
		BlockStatus::Absent
	}

	fn register_listener(&self, listener: Arc<dyn BlockCheckedListener>) {
		self.listeners.lock().push(listener);
	}

	fn unregister_listener(&self, listener: &Arc<dyn BlockCheckedListener>) {
		self.listeners.lock().retain(|known| !Arc::ptr_eq(known, listener));
	}
}
