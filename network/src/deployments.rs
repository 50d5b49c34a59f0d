use consensus::ConsensusParams;

/// First version bits block version.
pub const VERSIONBITS_TOP_BITS: u32 = 0x2000_0000;

/// Softfork deployment buried at a fixed activation height.
#[derive(Debug, Clone, Copy)]
pub struct Deployment {
	/// Deployment's name.
	pub name: &'static str,
	/// Bit used for versionbits signalling.
	pub bit: u8,
	/// Height at which the deployment rules apply.
	pub activation_height: u32,
	/// Whether getblocktemplate clients may safely ignore the rule.
	pub gbt_force: bool,
}

impl Deployment {
	/// Active for the block following `prev_height`.
	pub fn is_active_after(&self, prev_height: u32) -> bool {
		prev_height.saturating_add(1) >= self.activation_height
	}

	/// Signalled during the confirmation window right before activation.
	pub fn is_signalling_after(&self, prev_height: u32, window: u32) -> bool {
		let next = prev_height.saturating_add(1);
		next < self.activation_height && next.saturating_add(window) >= self.activation_height
	}

	pub fn version_mask(&self) -> u32 {
		1u32 << self.bit
	}
}

/// Block version for the block built on `prev_height`: top bits plus the
/// signal bits of deployments still in their signalling window.
pub fn compute_block_version(prev_height: u32, consensus: &ConsensusParams) -> u32 {
	let window = consensus.miner_confirmation_window;
	consensus.deployments().iter()
		.filter(|d| d.is_signalling_after(prev_height, window))
		.fold(VERSIONBITS_TOP_BITS, |version, d| version | d.version_mask())
}
