//! `checkkernel` request and response shapes.

use super::bytes::Bytes;
use super::hash::H256;

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct KernelInput {
	/// Transaction id of the candidate kernel output.
	pub txid: H256,
	/// Output index.
	pub vout: u32,
	/// Optional sequence number.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub sequence: Option<u32>,
}

#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct KernelInfo {
	pub txid: H256,
	pub vout: u32,
	/// Masked timestamp the kernel is valid at.
	pub time: u32,
}

#[derive(Debug, Default, Serialize, Deserialize, PartialEq, Clone)]
pub struct CheckKernelResponse {
	pub found: bool,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub kernel: Option<KernelInfo>,
	/// Serialized proof-of-stake block template, when requested.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub blocktemplate: Option<Bytes>,
	#[serde(skip_serializing_if = "Option::is_none")]
	pub blocktemplatefees: Option<u64>,
}
