use jsonrpc_core::Result;
use jsonrpc_derive::rpc;

use v1::types::{CheckKernelResponse, KernelInput, StakingInfo, StakingStatus};

/// Proof-of-stake interface: status, the staking switch and kernel probes.
#[rpc(server)]
pub trait Staking {
	/// Staking-related information.
	#[rpc(name = "getstakinginfo")]
	fn staking_info(&self) -> Result<StakingInfo>;

	/// Gets or sets the staking configuration.
	#[rpc(name = "staking")]
	fn staking(&self, generate: Option<bool>) -> Result<StakingStatus>;

	/// Checks whether one of the given inputs is a kernel input at the
	/// moment, optionally building a proof-of-stake block template on it.
	#[rpc(name = "checkkernel")]
	fn check_kernel(&self, inputs: Vec<KernelInput>, create_block_template: Option<bool>) -> Result<CheckKernelResponse>;
}
