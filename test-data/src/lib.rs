//! Builders producing chain structures for tests.

extern crate chain;
extern crate primitives;

mod block_builder;
mod transaction_builder;

pub use block_builder::BlockBuilder;
pub use transaction_builder::TransactionBuilder;
