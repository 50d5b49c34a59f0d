use deployments::Deployment;
use network::Network;

/// Parameters that influence chain consensus.
#[derive(Debug, Clone)]
pub struct ConsensusParams {
	/// Network.
	pub network: Network,
	/// Expected spacing between blocks, in seconds.
	pub target_spacing: u32,
	/// Smoothing window of the per-block retarget rule, in seconds.
	pub target_timespan: u32,
	/// Granularity of coinstake timestamps; kernel search advances in these steps.
	pub stake_timestamp_mask: u32,
	/// Depth at which generated outputs become spendable (and stakable).
	pub coinbase_maturity: u32,
	/// Height of the last block that may be mined by work. Above it, the
	/// chain is pure proof-of-stake.
	pub last_pow_block: u32,
	/// Blocks between halvings of the proof-of-work subsidy.
	pub subsidy_halving_interval: u32,
	/// Testnet-style chains drop to the minimal difficulty when a block is
	/// long overdue.
	pub allow_min_difficulty_blocks: bool,
	/// Number of blocks in the versionbits signalling window.
	pub miner_confirmation_window: u32,
	/// BIP68, BIP112, BIP113 deployment.
	pub csv_deployment: Deployment,
	/// BIP141, BIP143, BIP147 deployment.
	pub segwit_deployment: Deployment,
	/// Weight limit for assembled blocks.
	pub max_block_weight: u32,
	/// Sigop cost limit for assembled blocks.
	pub max_block_sigops_cost: u32,
	/// Serialized size limit advertised over RPC.
	pub max_block_size: u32,
}

impl ConsensusParams {
	pub fn new(network: Network) -> Self {
		let (csv_height, segwit_height) = match network {
			Network::Mainnet => (495_000, 520_000),
			Network::Testnet => (400, 800),
			Network::Regtest => (0, 0),
		};

		ConsensusParams {
			network,
			target_spacing: 64,
			target_timespan: 16 * 60,
			stake_timestamp_mask: 0x0f,
			coinbase_maturity: match network {
				Network::Mainnet | Network::Testnet => 500,
				Network::Regtest => 10,
			},
			last_pow_block: match network {
				Network::Mainnet => 10_000,
				Network::Testnet => 10_000,
				Network::Regtest => 0x7fff_ffff,
			},
			subsidy_halving_interval: match network {
				Network::Mainnet | Network::Testnet => 210_000,
				Network::Regtest => 150,
			},
			allow_min_difficulty_blocks: network != Network::Mainnet,
			miner_confirmation_window: match network {
				Network::Mainnet | Network::Testnet => 2016,
				Network::Regtest => 144,
			},
			csv_deployment: Deployment {
				name: "csv",
				bit: 0,
				activation_height: csv_height,
				gbt_force: true,
			},
			segwit_deployment: Deployment {
				name: "segwit",
				bit: 1,
				activation_height: segwit_height,
				gbt_force: false,
			},
			max_block_weight: 4_000_000,
			max_block_sigops_cost: 80_000,
			max_block_size: 4_000_000,
		}
	}

	/// Blocks between classic difficulty readjustments; only used as the
	/// default window of the hash rate estimator.
	pub fn difficulty_adjustment_interval(&self) -> u32 {
		self.target_timespan / self.target_spacing
	}

	pub fn deployments(&self) -> [&Deployment; 2] {
		[&self.csv_deployment, &self.segwit_deployment]
	}
}

#[cfg(test)]
mod tests {
	use network::Network;
	use super::ConsensusParams;

	#[test]
	fn test_difficulty_adjustment_interval() {
		assert_eq!(ConsensusParams::new(Network::Mainnet).difficulty_adjustment_interval(), 15);
	}

	#[test]
	fn test_regtest_has_no_pow_ceiling() {
		assert_eq!(ConsensusParams::new(Network::Regtest).last_pow_block, 0x7fff_ffff);
		assert_eq!(ConsensusParams::new(Network::Mainnet).last_pow_block, 10_000);
	}

	#[test]
	fn test_segwit_always_active_on_regtest() {
		let params = ConsensusParams::new(Network::Regtest);
		assert!(params.segwit_deployment.is_active_after(0));

		let params = ConsensusParams::new(Network::Mainnet);
		assert!(!params.segwit_deployment.is_active_after(0));
		assert!(params.segwit_deployment.is_active_after(520_000));
	}
}
