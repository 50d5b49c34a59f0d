use chain::{Block, BlockHeader, Transaction};
use primitives::compact::Compact;
use primitives::hash::H256;

/// Fluent builder of test blocks. The merkle root is derived from the
/// transactions on `build`.
#[derive(Debug, Clone)]
pub struct BlockBuilder {
	version: u32,
	previous_header_hash: H256,
	time: u32,
	bits: Compact,
	nonce: u32,
	transactions: Vec<Transaction>,
}

impl Default for BlockBuilder {
	fn default() -> Self {
		BlockBuilder {
			version: 1,
			previous_header_hash: Default::default(),
			time: 0,
			bits: Compact::new(0x207fffff),
			nonce: 0,
			transactions: Vec::new(),
		}
	}
}

impl BlockBuilder {
	pub fn with_parent(previous_header_hash: H256) -> BlockBuilder {
		let mut builder = BlockBuilder::default();
		builder.previous_header_hash = previous_header_hash;
		builder
	}

	pub fn set_time(mut self, time: u32) -> BlockBuilder {
		self.time = time;
		self
	}

	pub fn set_bits(mut self, bits: Compact) -> BlockBuilder {
		self.bits = bits;
		self
	}

	pub fn set_nonce(mut self, nonce: u32) -> BlockBuilder {
		self.nonce = nonce;
		self
	}

	pub fn add_transaction(mut self, transaction: Transaction) -> BlockBuilder {
		self.transactions.push(transaction);
		self
	}

	pub fn build(self) -> Block {
		let hashes = self.transactions.iter().map(Transaction::hash).collect::<Vec<_>>();
		let header = BlockHeader {
			version: self.version,
			previous_header_hash: self.previous_header_hash,
			merkle_root_hash: ::chain::merkle_root(&hashes),
			time: self.time,
			bits: self.bits,
			nonce: self.nonce,
		};
		Block::new(header, self.transactions)
	}
}
