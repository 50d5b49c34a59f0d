use chain::constants::COIN;
use chain::BlockHeader;
use compact::Compact;
use hash::H256;
use network::ConsensusParams;
use storage::{BlockRef, Store};
use uint::{u256_from_hash, U256};

/// Returns true if the hash is lower or equal than the target represented
/// by compact bits.
pub fn is_valid_proof_of_work_hash(bits: Compact, hash: &H256) -> bool {
	let target = match bits.to_u256() {
		Ok(target) => target,
		_err => return false,
	};

	u256_from_hash(hash) <= target
}

/// Returns true if the hash is lower or equal than the target and the target
/// is lower or equal than the network maximum.
pub fn is_valid_proof_of_work(max_work_bits: Compact, bits: Compact, hash: &H256) -> bool {
	let maximum = match max_work_bits.to_u256() {
		Ok(max) => max,
		_err => return false,
	};

	let target = match bits.to_u256() {
		Ok(target) => target,
		_err => return false,
	};

	target <= maximum && u256_from_hash(hash) <= target
}

/// Proof-of-work subsidy for the given height.
pub fn block_reward(height: u32, consensus: &ConsensusParams) -> u64 {
	let mut reward = 50 * COIN;
	for _ in 0..height / consensus.subsidy_halving_interval {
		reward /= 2;
	}
	reward
}

/// Finds the last block at or before `from` with the requested proof type.
fn last_header_of_type(from: H256, store: &dyn Store, proof_of_stake: bool) -> Option<BlockHeader> {
	let mut cursor = from;
	loop {
		let block = store.block(BlockRef::Hash(cursor))?;
		let header = block.block_header.clone();
		if block.is_proof_of_stake() == proof_of_stake {
			return Some(header);
		}
		if header.previous_header_hash.is_zero() {
			return None;
		}
		cursor = header.previous_header_hash;
	}
}

/// Target required for the block built on `parent_hash`. Retargets after
/// every block, smoothing the last observed spacing of blocks of the same
/// proof type over the configured timespan.
pub fn next_target_required(
	parent_hash: H256,
	time: u32,
	store: &dyn Store,
	consensus: &ConsensusParams,
	proof_of_stake: bool,
) -> Compact {
	let limit = if proof_of_stake {
		consensus.network.max_stake_bits()
	} else {
		consensus.network.max_bits()
	};

	let prev = match last_header_of_type(parent_hash, store, proof_of_stake) {
		Some(header) => header,
		// first block of this proof type starts at the limit
		None => return limit.into(),
	};

	if consensus.allow_min_difficulty_blocks && time > prev.time + consensus.target_spacing * 2 {
		return limit.into();
	}

	let prev_prev = match last_header_of_type(prev.previous_header_hash, store, proof_of_stake) {
		Some(header) => header,
		None => return limit.into(),
	};

	let target_spacing = consensus.target_spacing as i64;
	let mut actual_spacing = prev.time as i64 - prev_prev.time as i64;
	if actual_spacing < 0 {
		actual_spacing = target_spacing;
	}
	if actual_spacing > target_spacing * 10 {
		actual_spacing = target_spacing * 10;
	}

	let interval = (consensus.target_timespan / consensus.target_spacing) as i64;
	let numerator = ((interval - 1) * target_spacing + 2 * actual_spacing) as u64;
	let denominator = ((interval + 1) * target_spacing) as u64;

	let prev_target: U256 = prev.bits.into();
	let new_target = match prev_target.checked_mul(U256::from(numerator)) {
		Some(scaled) => scaled / U256::from(denominator),
		// scaling a near-limit target overflows; it is clamped anyway
		None => limit,
	};

	if new_target.is_zero() || new_target > limit {
		limit.into()
	} else {
		new_target.into()
	}
}

#[cfg(test)]
mod tests {
	use chain::{Block, BlockHeader, Transaction, TransactionInput, TransactionOutput};
	use compact::Compact;
	use hash::H256;
	use network::{ConsensusParams, Network};
	use storage::{MemoryChain, Store};
	use uint::U256;
	use super::{block_reward, is_valid_proof_of_work_hash, next_target_required};

	fn block_with(previous: H256, time: u32, bits: Compact) -> Block {
		let coinbase = Transaction {
			version: 1,
			time,
			inputs: vec![TransactionInput::coinbase(Default::default())],
			outputs: vec![TransactionOutput::default()],
			lock_time: 0,
		};
		Block::new(BlockHeader {
			version: 1,
			previous_header_hash: previous,
			merkle_root_hash: coinbase.hash(),
			time,
			bits,
			nonce: 0,
		}, vec![coinbase])
	}

	fn chain_with_spacing(spacing: u32, bits: Compact) -> (MemoryChain, H256) {
		let genesis = block_with(Default::default(), 1000, bits);
		let chain = MemoryChain::new(genesis.clone());
		let mut tip = genesis;
		for i in 1..3 {
			let block = block_with(tip.hash(), 1000 + i * spacing, bits);
			chain.insert_block(&block).unwrap();
			tip = block;
		}
		let hash = tip.hash();
		(chain, hash)
	}

	#[test]
	fn test_is_valid_proof_of_work_hash() {
		let bits = Compact::new(0x1d00ffff);
		// a hash well below the target
		let low: H256 = "0100000000000000000000000000000000000000000000000000000000000000".into();
		assert!(is_valid_proof_of_work_hash(bits, &low));
		// a hash well above the target
		let high: H256 = "0000000000000000000000000000000000000000000000000000000000000001".into();
		assert!(!is_valid_proof_of_work_hash(bits, &high));
	}

	#[test]
	fn test_block_reward_halves() {
		let consensus = ConsensusParams::new(Network::Mainnet);
		assert_eq!(block_reward(0, &consensus), 5_000_000_000);
		assert_eq!(block_reward(209_999, &consensus), 5_000_000_000);
		assert_eq!(block_reward(210_000, &consensus), 2_500_000_000);
		assert_eq!(block_reward(420_000, &consensus), 1_250_000_000);
	}

	#[test]
	fn test_target_unchanged_at_exact_spacing() {
		let mut consensus = ConsensusParams::new(Network::Testnet);
		consensus.allow_min_difficulty_blocks = false;
		let bits = Compact::new(0x1d00ffff);
		let (chain, tip) = chain_with_spacing(consensus.target_spacing, bits);

		let next = next_target_required(tip, 0, &chain, &consensus, false);
		assert_eq!(next, bits);
	}

	#[test]
	fn test_target_shrinks_when_blocks_are_fast() {
		let mut consensus = ConsensusParams::new(Network::Testnet);
		consensus.allow_min_difficulty_blocks = false;
		let bits = Compact::new(0x1d00ffff);
		let (chain, tip) = chain_with_spacing(consensus.target_spacing / 2, bits);

		let next = next_target_required(tip, 0, &chain, &consensus, false);
		let next: U256 = next.into();
		let previous: U256 = bits.into();
		assert!(next < previous);
	}

	#[test]
	fn test_target_grows_when_blocks_are_slow() {
		let mut consensus = ConsensusParams::new(Network::Testnet);
		consensus.allow_min_difficulty_blocks = false;
		let bits = Compact::new(0x1d00ffff);
		let (chain, tip) = chain_with_spacing(consensus.target_spacing * 2, bits);

		let next = next_target_required(tip, 0, &chain, &consensus, false);
		let next: U256 = next.into();
		let previous: U256 = bits.into();
		assert!(next > previous);
	}

	#[test]
	fn test_min_difficulty_fallback() {
		let consensus = ConsensusParams::new(Network::Testnet);
		assert!(consensus.allow_min_difficulty_blocks);
		let bits = Compact::new(0x1d00ffff);
		let (chain, tip) = chain_with_spacing(consensus.target_spacing, bits);

		// a block long overdue drops to the limit
		let late = 1000 + 3 * consensus.target_spacing + consensus.target_spacing * 2 + 1;
		let next = next_target_required(tip, late, &chain, &consensus, false);
		assert_eq!(next, Compact::from(consensus.network.max_bits()));
	}

	#[test]
	fn test_first_stake_block_starts_at_stake_limit() {
		let consensus = ConsensusParams::new(Network::Mainnet);
		let bits = Compact::new(0x1d00ffff);
		let (chain, tip) = chain_with_spacing(consensus.target_spacing, bits);

		// the chain has no proof-of-stake blocks yet
		let next = next_target_required(tip, 0, &chain, &consensus, true);
		assert_eq!(next, Compact::from(consensus.network.max_stake_bits()));
	}
}
