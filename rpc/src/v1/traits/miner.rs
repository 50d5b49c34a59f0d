use jsonrpc_core::Result;
use jsonrpc_derive::rpc;

use v1::types::{BlockTemplateRequest, BlockTemplateResponse, Bytes, EstimateFeeResponse, MiningInfo};

/// Mining-side interface: templates, submission and network statistics.
#[rpc(server)]
pub trait Miner {
	/// Returns data needed to construct a block to work on, or judges a
	/// block proposal. BIP22/23/9/145.
	#[rpc(name = "getblocktemplate")]
	fn get_block_template(&self, request: Option<BlockTemplateRequest>) -> Result<BlockTemplateResponse>;

	/// Attempts to submit a new block to the network. Returns null on
	/// acceptance, a BIP22 reject reason otherwise.
	#[rpc(name = "submitblock")]
	fn submit_block(&self, block: Bytes, dummy: Option<String>) -> Result<Option<String>>;

	/// Decodes the given header and submits it as a candidate chain tip.
	#[rpc(name = "submitheader")]
	fn submit_header(&self, header: Bytes) -> Result<()>;

	/// Mining-related information.
	#[rpc(name = "getmininginfo")]
	fn mining_info(&self) -> Result<MiningInfo>;

	/// Estimated network hashes per second over the recent blocks.
	#[rpc(name = "getnetworkhashps")]
	fn network_hash_ps(&self, nblocks: Option<i64>, height: Option<i64>) -> Result<f64>;

	/// Approximate fee per kilobyte needed for a transaction.
	#[rpc(name = "estimatefee")]
	fn estimate_fee(&self) -> Result<EstimateFeeResponse>;
}
