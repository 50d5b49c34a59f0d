use chain::{Block, OutPoint, Transaction};
use compact::Compact;
use error::Error;
use hash::H256;

/// Status of a block hash within the validator.
#[derive(Debug, PartialEq, Clone, Copy)]
pub enum BlockStatus {
	/// On the chain and fully validated.
	Valid,
	/// Seen before and judged invalid.
	Invalid,
	/// Never seen.
	Absent,
}

/// One-shot observer of validation verdicts, registered around a submission
/// to learn the fate of a specific block.
pub trait BlockCheckedListener: Send + Sync {
	fn on_block_checked(&self, hash: &H256, result: &Result<(), Error>);
}

/// The validator contract consumed by block production. Assembled blocks go
/// through `test_block_validity` before being offered to miners and through
/// `process_new_block` once sealed.
pub trait BlockValidator: Send + Sync {
	/// Checks a candidate built on the current best block without applying
	/// it. `check_signet` is honored only on signet-style chains.
	fn test_block_validity(
		&self,
		block: &Block,
		check_pow: bool,
		check_merkle_root: bool,
		check_signet: bool,
	) -> Result<(), Error>;

	/// Applies a sealed block as if received from the network. Returns
	/// whether the block was new.
	fn process_new_block(&self, block: &Block, force_processing: bool) -> Result<bool, Error>;

	/// Verifies a coinstake kernel against the chain ending at
	/// `previous_header_hash`.
	fn check_proof_of_stake(
		&self,
		previous_header_hash: &H256,
		coinstake: &Transaction,
		bits: Compact,
		stake_time: u32,
	) -> bool;

	/// Probes whether the output would be a valid stake kernel at `time`.
	fn check_kernel(
		&self,
		previous_header_hash: &H256,
		bits: Compact,
		time: u32,
		prev_out: &OutPoint,
	) -> bool;

	/// Looks the hash up in the block index.
	fn block_status(&self, hash: &H256) -> BlockStatus;

	/// Registers a listener notified of every validation verdict.
	fn register_listener(&self, listener: ::std::sync::Arc<dyn BlockCheckedListener>);

	/// Drops a previously registered listener.
	fn unregister_listener(&self, listener: &::std::sync::Arc<dyn BlockCheckedListener>);
}
