//! `getmininginfo`, `generateblock` and `estimatefee` response shapes.

use super::hash::H256;

#[derive(Debug, Default, Serialize, Deserialize, PartialEq, Clone)]
pub struct MiningInfo {
	/// The current block count.
	pub blocks: u32,
	/// Weight of the last assembled block, if a block was ever assembled.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub currentblockweight: Option<u32>,
	/// Transactions of the last assembled block, if a block was ever
	/// assembled.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub currentblocktx: Option<u32>,
	/// The current difficulty.
	pub difficulty: f64,
	/// The network hashes per second.
	pub networkhashps: f64,
	/// The size of the mempool.
	pub pooledtx: u64,
	/// Current network name.
	pub chain: String,
	/// Any network and blockchain warnings.
	pub warnings: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct GenerateBlockResponse {
	/// Hash of the generated block.
	pub hash: H256,
}

#[derive(Debug, Default, Serialize, Deserialize, PartialEq, Clone)]
pub struct EstimateFeeResponse {
	/// Estimated feerate in coin/kvB.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub feerate: Option<f64>,
	/// Errors encountered during processing.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub errors: Option<Vec<String>>,
}
