//! Verification primitives consumed by block production: proof-of-work
//! checks, the next-target rule for both proof types, the block subsidy,
//! sigop counting and the validator contract.

extern crate chain;
#[macro_use]
extern crate log;
extern crate network;
extern crate parking_lot;
extern crate primitives;
extern crate script;
extern crate storage;

mod acceptor;
mod error;
mod sigops;
mod timestamp;
mod validator;
mod work;

pub use primitives::{compact, hash, uint};

pub use acceptor::ChainAcceptor;
pub use error::Error;
pub use sigops::transaction_legacy_sigops;
pub use timestamp::{median_timestamp, median_timestamp_inclusive};
pub use validator::{BlockCheckedListener, BlockStatus, BlockValidator};
pub use work::{block_reward, is_valid_proof_of_work, is_valid_proof_of_work_hash,
	next_target_required};
