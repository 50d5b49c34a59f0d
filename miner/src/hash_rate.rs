//! Network rate estimates derived from recent chain work.

use network::ConsensusParams;
use storage::{BlockRef, Store};
use uint::u256_to_f64;

/// Average network hashes per second over the last `lookup` blocks ending
/// at `height` (`-1` for the tip). Nonpositive `lookup` uses the blocks
/// since the last difficulty change.
pub fn network_hash_ps(store: &dyn Store, consensus: &ConsensusParams, lookup: i64, height: i64) -> f64 {
	let best = match store.best_block() {
		Some(best) => best,
		None => return 0.0,
	};

	let mut tip_number = best.number;
	if height >= 0 && (height as u32) < best.number {
		tip_number = height as u32;
	}
	if tip_number == 0 {
		return 0.0;
	}

	let mut lookup = if lookup <= 0 {
		(tip_number % consensus.difficulty_adjustment_interval() + 1) as i64
	} else {
		lookup
	};
	if lookup > tip_number as i64 {
		lookup = tip_number as i64;
	}

	let tip_header = match store.block_header(BlockRef::Number(tip_number)) {
		Some(header) => header,
		None => return 0.0,
	};
	let mut min_time = tip_header.time;
	let mut max_time = min_time;
	for i in 1..=lookup as u32 {
		let header = match store.block_header(BlockRef::Number(tip_number - i)) {
			Some(header) => header,
			None => return 0.0,
		};
		min_time = ::std::cmp::min(min_time, header.time);
		max_time = ::std::cmp::max(max_time, header.time);
	}

	// all timestamps equal: the estimate is undefined
	if min_time == max_time {
		return 0.0;
	}

	let work_diff = match (
		store.chain_work(BlockRef::Number(tip_number)),
		store.chain_work(BlockRef::Number(tip_number - lookup as u32)),
	) {
		(Some(tip_work), Some(base_work)) => tip_work - base_work,
		_ => return 0.0,
	};
	let time_diff = (max_time - min_time) as f64;

	u256_to_f64(&work_diff) / time_diff
}

/// Average kernels tried per second over the last 72 proof-of-stake blocks,
/// the network stake weight estimate.
pub fn pos_kernel_ps(store: &dyn Store, consensus: &ConsensusParams) -> f64 {
	const POS_INTERVAL: u32 = 72;

	let best = match store.best_block() {
		Some(best) => best,
		None => return 0.0,
	};

	let mut kernels_tried_avg = 0f64;
	let mut stakes_time = 0u64;
	let mut stakes_handled = 0u32;
	let mut previous_stake_time: Option<u32> = None;

	let mut number = best.number;
	loop {
		let block = match store.block(BlockRef::Number(number)) {
			Some(block) => block,
			None => break,
		};
		if block.is_proof_of_stake() {
			kernels_tried_avg += block.block_header.bits.to_f64() * 4_294_967_296f64;
			if let Some(previous) = previous_stake_time {
				stakes_time += previous.saturating_sub(block.block_header.time) as u64;
			}
			previous_stake_time = Some(block.block_header.time);
			stakes_handled += 1;
			if stakes_handled >= POS_INTERVAL {
				break;
			}
		}
		if number == 0 {
			break;
		}
		number -= 1;
	}

	if stakes_time == 0 {
		return 0.0;
	}

	(kernels_tried_avg / stakes_time as f64) * (consensus.stake_timestamp_mask + 1) as f64
}

#[cfg(test)]
mod tests {
	use std::sync::Arc;
	use network::{genesis_block, ConsensusParams, Network};
	use storage::{MemoryChain, SharedStore, Store};
	use test_data::BlockBuilder;
	use test_data::TransactionBuilder;
	use super::network_hash_ps;

	fn chain_of(count: u32, spacing: u32) -> SharedStore {
		let genesis = genesis_block(Network::Regtest);
		let start = genesis.block_header.time;
		let store = MemoryChain::new(genesis.clone());
		let mut parent = genesis.hash();
		for i in 1..=count {
			let block = BlockBuilder::with_parent(parent)
				.set_time(start + i * spacing)
				.add_transaction(TransactionBuilder::coinbase().set_time(start + i * spacing).into_transaction())
				.build();
			store.insert_block(&block).unwrap();
			parent = block.hash();
		}
		Arc::new(store)
	}

	#[test]
	fn test_hash_ps_is_positive_for_spaced_blocks() {
		let consensus = ConsensusParams::new(Network::Regtest);
		let store = chain_of(10, 64);
		let estimate = network_hash_ps(&*store, &consensus, 5, -1);
		assert!(estimate > 0.0);
	}

	#[test]
	fn test_hash_ps_zero_window_is_undefined() {
		let consensus = ConsensusParams::new(Network::Regtest);
		// blocks with identical timestamps: min_time == max_time
		let store = chain_of(3, 0);
		assert_eq!(network_hash_ps(&*store, &consensus, 3, -1), 0.0);
	}

	#[test]
	fn test_hash_ps_on_genesis_only_chain_is_zero() {
		let consensus = ConsensusParams::new(Network::Regtest);
		let genesis = genesis_block(Network::Regtest);
		let store = MemoryChain::new(genesis);
		assert_eq!(network_hash_ps(&store, &consensus, 120, -1), 0.0);
	}

	#[test]
	fn test_lookup_is_clamped_to_chain_length() {
		let consensus = ConsensusParams::new(Network::Regtest);
		let store = chain_of(4, 64);
		// lookup far beyond the chain still works
		assert!(network_hash_ps(&*store, &consensus, 1_000, -1) > 0.0);
	}
}
