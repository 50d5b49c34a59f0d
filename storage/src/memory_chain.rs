use std::collections::HashMap;
use chain::{Block, BlockHeader};
use hash::H256;
use parking_lot::RwLock;
use uint::U256;
use block_provider::{BestBlock, BlockHeaderProvider, BlockProvider, BlockRef, Error, Store};

/// Amount of work a block with the given bits contributes to the chain.
pub fn block_proof(bits: ::compact::Compact) -> U256 {
	let target: U256 = bits.into();
	// 2**256 / (target + 1) computed without overflowing 256 bits
	(!target / (target + U256::one())) + U256::one()
}

#[derive(Default)]
struct ChainData {
	blocks: HashMap<H256, Block>,
	numbers: HashMap<H256, u32>,
	canon: Vec<H256>,
	work: Vec<U256>,
}

/// In-memory chain keeping only the best chain. Backs the tests and the
/// reference node wiring; a database-backed store implements the same trait
/// in a full deployment.
pub struct MemoryChain {
	data: RwLock<ChainData>,
}

impl MemoryChain {
	pub fn new(genesis: Block) -> Self {
		let mut data = ChainData::default();
		let hash = genesis.hash();
		data.numbers.insert(hash, 0);
		data.canon.push(hash);
		data.work.push(block_proof(genesis.block_header.bits));
		data.blocks.insert(hash, genesis);

		MemoryChain {
			data: RwLock::new(data),
		}
	}
}

impl BlockHeaderProvider for MemoryChain {
	fn block_header(&self, block_ref: BlockRef) -> Option<BlockHeader> {
		self.block(block_ref).map(|block| block.block_header)
	}
}

impl BlockProvider for MemoryChain {
	fn block(&self, block_ref: BlockRef) -> Option<Block> {
		let data = self.data.read();
		match block_ref {
			BlockRef::Hash(ref hash) => data.blocks.get(hash).cloned(),
			BlockRef::Number(number) => data.canon.get(number as usize)
				.and_then(|hash| data.blocks.get(hash))
				.cloned(),
		}
	}

	fn block_number(&self, hash: &H256) -> Option<u32> {
		self.data.read().numbers.get(hash).cloned()
	}

	fn block_hash(&self, number: u32) -> Option<H256> {
		self.data.read().canon.get(number as usize).cloned()
	}
}

impl Store for MemoryChain {
	fn as_block_header_provider(&self) -> &dyn BlockHeaderProvider {
		self
	}

	fn best_block(&self) -> Option<BestBlock> {
		let data = self.data.read();
		data.canon.last().map(|hash| BestBlock {
			number: (data.canon.len() - 1) as u32,
			hash: *hash,
		})
	}

	fn chain_work(&self, block_ref: BlockRef) -> Option<U256> {
		let data = self.data.read();
		let number = match block_ref {
			BlockRef::Number(number) => number,
			BlockRef::Hash(ref hash) => match data.numbers.get(hash) {
				Some(number) => *number,
				None => return None,
			},
		};
		data.work.get(number as usize).cloned()
	}

	fn insert_block(&self, block: &Block) -> Result<(), Error> {
		let mut data = self.data.write();
		let hash = block.hash();
		if data.blocks.contains_key(&hash) {
			return Err(Error::Duplicate);
		}

		let best_hash = *data.canon.last().expect("the chain always contains genesis; qed");
		if block.block_header.previous_header_hash != best_hash {
			return Err(Error::CannotCanonize);
		}

		let number = data.canon.len() as u32;
		let parent_work = *data.work.last().expect("work is recorded for every canon block; qed");
		data.numbers.insert(hash, number);
		data.canon.push(hash);
		let proof = block_proof(block.block_header.bits);
		data.work.push(parent_work + proof);
		data.blocks.insert(hash, block.clone());
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use chain::{Block, BlockHeader, Transaction, TransactionInput, TransactionOutput};
	use uint::U256;
	use block_provider::{BlockRef, Error, Store, BlockProvider};
	use super::{block_proof, MemoryChain};

	fn test_block(previous: &Block, nonce: u32) -> Block {
		let coinbase = Transaction {
			version: 1,
			time: previous.block_header.time + 64,
			inputs: vec![TransactionInput::coinbase(Default::default())],
			outputs: vec![TransactionOutput::default()],
			lock_time: 0,
		};
		Block::new(BlockHeader {
			version: 1,
			previous_header_hash: previous.hash(),
			merkle_root_hash: coinbase.hash(),
			time: previous.block_header.time + 64,
			bits: 0x207fffff.into(),
			nonce,
		}, vec![coinbase])
	}

	fn genesis() -> Block {
		let coinbase = Transaction {
			version: 1,
			time: 1000,
			inputs: vec![TransactionInput::coinbase(Default::default())],
			outputs: vec![TransactionOutput::default()],
			lock_time: 0,
		};
		Block::new(BlockHeader {
			version: 1,
			previous_header_hash: Default::default(),
			merkle_root_hash: coinbase.hash(),
			time: 1000,
			bits: 0x207fffff.into(),
			nonce: 0,
		}, vec![coinbase])
	}

	#[test]
	fn test_insert_extends_best_chain() {
		let chain = MemoryChain::new(genesis());
		assert_eq!(chain.best_block().unwrap().number, 0);

		let block1 = test_block(&genesis(), 1);
		chain.insert_block(&block1).unwrap();

		let best = chain.best_block().unwrap();
		assert_eq!(best.number, 1);
		assert_eq!(best.hash, block1.hash());
		assert_eq!(chain.block_number(&block1.hash()), Some(1));
		assert_eq!(chain.block(BlockRef::Number(1)), Some(block1));
	}

	#[test]
	fn test_insert_rejects_side_blocks_and_duplicates() {
		let chain = MemoryChain::new(genesis());
		let block1 = test_block(&genesis(), 1);
		let block1b = test_block(&block1, 2);

		assert_eq!(chain.insert_block(&block1b).unwrap_err(), Error::CannotCanonize);
		chain.insert_block(&block1).unwrap();
		assert_eq!(chain.insert_block(&block1).unwrap_err(), Error::Duplicate);
		chain.insert_block(&block1b).unwrap();
	}

	#[test]
	fn test_chain_work_accumulates() {
		let chain = MemoryChain::new(genesis());
		let block1 = test_block(&genesis(), 1);
		chain.insert_block(&block1).unwrap();

		let work0 = chain.chain_work(BlockRef::Number(0)).unwrap();
		let work1 = chain.chain_work(BlockRef::Number(1)).unwrap();
		assert!(work1 > work0);
		assert_eq!(work1 - work0, block_proof(block1.block_header.bits));
		assert_eq!(chain.chain_work(BlockRef::Number(2)), None);
	}

	#[test]
	fn test_block_proof_is_larger_for_harder_targets() {
		let easy: U256 = block_proof(0x207fffff.into());
		let hard: U256 = block_proof(0x1d00ffff.into());
		assert!(hard > easy);
	}
}
