//! `getstakinginfo` and `staking` response shapes.

#[derive(Debug, Default, Serialize, Deserialize, PartialEq, Clone)]
pub struct StakingInfo {
	/// Whether staking is enabled.
	pub enabled: bool,
	/// Whether the wallet is actually staking: enabled, weighted and
	/// searching.
	pub staking: bool,
	/// The current block count.
	pub blocks: u32,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub currentblockweight: Option<u32>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub currentblocktx: Option<u32>,
	/// The size of the mempool.
	pub pooledtx: u64,
	/// Difficulty of the last proof-of-stake block.
	pub difficulty: f64,
	/// The staker search interval, in seconds.
	#[serde(rename = "search-interval")]
	pub search_interval: u64,
	/// The staker weight.
	pub weight: u64,
	/// Estimated network stake weight.
	pub netstakeweight: u64,
	/// Expected time to earn a reward, in seconds.
	pub expectedtime: u64,
	/// Current network name.
	pub chain: String,
	/// Any network and blockchain warnings.
	pub warnings: String,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct StakingStatus {
	/// Whether staking is active.
	pub generate: bool,
}
