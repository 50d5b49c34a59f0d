use jsonrpc_core::Result;
use jsonrpc_derive::rpc;

use v1::types::{GenerateBlockResponse, H256};

/// Immediate block generation, regtest's bread and butter.
#[rpc(server)]
pub trait Generate {
	/// Mines blocks immediately to a specified address.
	#[rpc(name = "generatetoaddress")]
	fn generate_to_address(&self, nblocks: u32, address: String, maxtries: Option<u64>) -> Result<Vec<H256>>;

	/// Mines blocks immediately to a specified descriptor.
	#[rpc(name = "generatetodescriptor")]
	fn generate_to_descriptor(&self, num_blocks: u32, descriptor: String, maxtries: Option<u64>) -> Result<Vec<H256>>;

	/// Mines a block with an ordered set of transactions immediately to an
	/// address or descriptor.
	#[rpc(name = "generateblock")]
	fn generate_block(&self, output: String, transactions: Vec<String>) -> Result<GenerateBlockResponse>;
}
