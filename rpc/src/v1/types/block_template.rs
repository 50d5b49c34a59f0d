//! Block template as described in BIP22/BIP23 with the BIP9 and BIP145
//! extensions.

use std::collections::HashMap;
use super::bytes::Bytes;
use super::hash::H256;

#[derive(Debug, Default, Serialize, Deserialize, PartialEq, Clone)]
pub struct BlockTemplate {
	/// Capabilities the server supports.
	pub capabilities: Vec<String>,
	/// The preferred block version.
	pub version: u32,
	/// Specific block rules that are to be enforced.
	pub rules: Vec<String>,
	/// Set of pending, supported versionbit softfork deployments.
	pub vbavailable: HashMap<String, u32>,
	/// Bit mask of versionbits the server requires set in submissions.
	pub vbrequired: u32,
	/// The hash of the current best block.
	pub previousblockhash: H256,
	/// Contents of non-coinbase transactions that should be included in the
	/// next block.
	pub transactions: Vec<BlockTemplateTransaction>,
	/// Data that should be included in the coinbase's scriptSig content.
	pub coinbaseaux: HashMap<String, String>,
	/// Maximum allowable input to the coinbase transaction.
	pub coinbasevalue: u64,
	/// Id to include with a request to longpoll on an update to this
	/// template.
	pub longpollid: String,
	/// The hash target.
	pub target: String,
	/// The minimum timestamp appropriate for the next block time.
	pub mintime: i64,
	/// List of ways the block template may be changed.
	#[serde(rename = "mutable")]
	pub mutable_fields: Vec<String>,
	/// A range of valid nonces.
	pub noncerange: String,
	/// Limit of sigops in blocks.
	pub sigoplimit: i64,
	/// Limit of block size.
	pub sizelimit: u32,
	/// Limit of block weight, absent before segwit activation.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub weightlimit: Option<u32>,
	/// Current timestamp in seconds since epoch.
	pub curtime: i64,
	/// Compressed target of the next block.
	pub bits: String,
	/// The height of the next block.
	pub height: u32,
	/// A valid witness commitment for the unmodified block template.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub default_witness_commitment: Option<Bytes>,
}

/// Transaction data as included in `BlockTemplate`.
#[derive(Debug, Default, Serialize, Deserialize, PartialEq, Clone)]
pub struct BlockTemplateTransaction {
	/// Transaction data encoded in hexadecimal.
	pub data: Bytes,
	/// Transaction id encoded in little-endian hexadecimal.
	pub txid: H256,
	/// Hash including witness data, in little-endian hexadecimal.
	pub hash: H256,
	/// Transactions before this one (by 1-based index in the transactions
	/// list) that must be present in the final block if this one is.
	pub depends: Vec<u64>,
	/// Difference in value between transaction inputs and outputs in
	/// satoshis.
	pub fee: i64,
	/// Total sigop cost, as counted for purposes of block limits.
	pub sigops: i64,
	/// Total transaction weight.
	pub weight: i64,
}

#[cfg(test)]
mod tests {
	use serde_json;
	use super::BlockTemplateTransaction;

	#[test]
	fn test_block_template_transaction_serialize() {
		let transaction = BlockTemplateTransaction {
			data: vec![0x00, 0x01, 0x02, 0x03].into(),
			fee: 100,
			sigops: 4,
			weight: 400,
			..Default::default()
		};

		let encoded = serde_json::to_string(&transaction).unwrap();
		assert!(encoded.contains(r#""data":"00010203""#));
		assert!(encoded.contains(r#""fee":100"#));
		assert!(encoded.contains(r#""weight":400"#));
	}
}
