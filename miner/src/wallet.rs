use chain::{Block, Transaction};
use compact::Compact;

/// Capabilities block production needs from a staking wallet. The wallet
/// itself (keys, coin selection, signing) is external.
pub trait StakingWallet: Send + Sync {
	/// Whether the wallet is currently locked.
	fn is_locked(&self) -> bool;

	/// Drops coinstakes whose blocks never made it to the chain.
	fn abandon_orphaned_coinstakes(&self);

	/// Searches for a kernel satisfying `bits` at `time` and builds the
	/// coinstake claiming `fees`. `search_interval` is the number of
	/// timestamp slots to probe.
	fn create_coinstake(
		&self,
		bits: Compact,
		search_interval: i64,
		time: u32,
		fees: u64,
	) -> Option<Transaction>;

	/// Signs a proof-of-stake block with the key of the staked output.
	fn sign_block(&self, block: &mut Block) -> bool;

	/// Aggregate weight of the wallet's mature, stakable outputs.
	fn stake_weight(&self) -> u64;

	/// Number of mature outputs available for staking.
	fn available_coins_count(&self) -> usize;
}
