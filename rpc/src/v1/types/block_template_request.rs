//! Block template request parameters as described in BIP22/BIP23.

use std::collections::HashSet;
use super::block_template::BlockTemplate;
use super::bytes::Bytes;

/// Block template request mode.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "lowercase")]
pub enum BlockTemplateRequestMode {
	/// Work as described in BIP0022.
	Template,
	/// Block proposal as described in BIP0023.
	Proposal,
}

#[derive(Debug, Default, Serialize, Deserialize, PartialEq, Clone)]
pub struct BlockTemplateRequest {
	/// Request mode.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub mode: Option<BlockTemplateRequestMode>,
	/// Capabilities supported by the client.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub capabilities: Option<HashSet<String>>,
	/// Softfork deployments supported by the client.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub rules: Option<HashSet<String>>,
	/// Longpoll id from a previous template.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub longpollid: Option<String>,
	/// Proposed block data, proposal mode only.
	#[serde(skip_serializing_if = "Option::is_none")]
	pub data: Option<Bytes>,
}

/// `getblocktemplate` responds with a template or, in proposal mode, a
/// BIP22 verdict string (null when the proposal is acceptable).
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(untagged)]
pub enum BlockTemplateResponse {
	Template(BlockTemplate),
	Proposal(Option<String>),
}
