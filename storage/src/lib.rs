//! Read side of the chain state as consumed by block assembly: header and
//! block lookups, accumulated work, and an in-memory implementation backing
//! the node binary and the tests.

extern crate chain;
extern crate parking_lot;
extern crate primitives;

mod block_ancestors;
mod block_provider;
mod memory_chain;

pub use primitives::{bytes, compact, hash, uint};

pub use block_ancestors::BlockAncestors;
pub use block_provider::{BestBlock, BlockHeaderProvider, BlockProvider, BlockRef, Error, SharedStore, Store};
pub use memory_chain::{block_proof, MemoryChain};
