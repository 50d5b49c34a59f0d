/// Node-side readiness signals observed by the miners before they work on
/// a template.
pub trait SyncStatus: Send + Sync {
	/// Number of currently connected peers.
	fn peers_count(&self) -> usize;

	/// Whether the node is still in initial block download.
	fn is_initial_block_download(&self) -> bool;

	/// Estimated share of the chain that has been verified, in `0.0..=1.0`.
	fn verification_progress(&self) -> f64;
}
