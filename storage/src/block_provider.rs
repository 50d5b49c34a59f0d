use std::fmt;
use std::sync::Arc;
use chain::{Block, BlockHeader};
use hash::H256;
use uint::U256;

/// Way to locate a block within the chain.
#[derive(Debug, PartialEq, Clone)]
pub enum BlockRef {
	Hash(H256),
	Number(u32),
}

impl From<H256> for BlockRef {
	fn from(hash: H256) -> Self {
		BlockRef::Hash(hash)
	}
}

impl From<u32> for BlockRef {
	fn from(number: u32) -> Self {
		BlockRef::Number(number)
	}
}

/// Best block in the chain.
#[derive(Debug, Default, PartialEq, Clone)]
pub struct BestBlock {
	pub number: u32,
	pub hash: H256,
}

#[derive(Debug, PartialEq)]
pub enum Error {
	/// Parent of the inserted block is not the current best block.
	CannotCanonize,
	/// The block is already stored.
	Duplicate,
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match *self {
			Error::CannotCanonize => "block does not extend the best chain".fmt(f),
			Error::Duplicate => "block is already known".fmt(f),
		}
	}
}

pub trait BlockHeaderProvider: Send + Sync {
	fn block_header(&self, block_ref: BlockRef) -> Option<BlockHeader>;
}

pub trait BlockProvider: BlockHeaderProvider {
	fn block(&self, block_ref: BlockRef) -> Option<Block>;
	fn block_number(&self, hash: &H256) -> Option<u32>;
	fn block_hash(&self, number: u32) -> Option<H256>;
}

/// Full chain view used by the mining subsystem. Writes happen only through
/// the validator.
pub trait Store: BlockProvider {
	/// The same store, narrowed to header lookups.
	fn as_block_header_provider(&self) -> &dyn BlockHeaderProvider;

	/// Current chain tip.
	fn best_block(&self) -> Option<BestBlock>;

	/// Work accumulated up to (and including) the referenced block.
	fn chain_work(&self, block_ref: BlockRef) -> Option<U256>;

	/// Appends a block extending the best chain.
	fn insert_block(&self, block: &Block) -> Result<(), Error>;
}

pub type SharedStore = Arc<dyn Store>;
