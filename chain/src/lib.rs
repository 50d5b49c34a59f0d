//! Chain primitives of the hybrid PoW/PoS coin: transactions carrying a
//! timestamp, signed blocks, merkle trees.

extern crate hex;
extern crate primitives;
extern crate rayon;
extern crate ser;
extern crate crypto;

pub mod constants;

mod block;
mod block_header;
mod merkle_root;
mod transaction;

pub use primitives::{bytes, compact, hash, uint};

pub use block::Block;
pub use block_header::BlockHeader;
pub use merkle_root::{merkle_node_hash, merkle_root};
pub use transaction::{OutPoint, Transaction, TransactionInput, TransactionOutput};
