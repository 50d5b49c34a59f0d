use chain::OutPoint;
use jsonrpc_core::Error;
use miner::{self, TemplateRequest};
use primitives::bytes::Bytes as GlobalBytes;
use ser::{serialize_with_flags, SERIALIZE_TRANSACTION_WITNESS};
use storage::BlockRef;
use verification::next_target_required;
use v1::helpers::errors;
use v1::impls::ClientCore;
use v1::traits::Staking;
use v1::types::{CheckKernelResponse, KernelInfo, KernelInput, StakingInfo, StakingStatus};

pub struct StakingClient {
	core: ClientCore,
}

impl StakingClient {
	pub fn new(core: ClientCore) -> Self {
		StakingClient { core }
	}

	/// Difficulty of the most recent proof-of-stake block.
	fn last_stake_difficulty(&self) -> f64 {
		let best = match self.core.store.best_block() {
			Some(best) => best,
			None => return 0.0,
		};
		let mut number = best.number;
		loop {
			match self.core.store.block(BlockRef::Number(number)) {
				Some(ref block) if block.is_proof_of_stake() =>
					return block.block_header.bits.to_f64(),
				_ => (),
			}
			if number == 0 {
				return 0.0;
			}
			number -= 1;
		}
	}

	fn check_readiness(&self) -> Result<(), Error> {
		if !self.core.consensus.network.is_test_chain() {
			if self.core.sync_status.peers_count() == 0 {
				return Err(errors::client_not_connected());
			}
			if self.core.sync_status.is_initial_block_download() {
				return Err(errors::client_in_initial_download());
			}
		}
		Ok(())
	}
}

impl Staking for StakingClient {
	fn staking_info(&self) -> Result<StakingInfo, Error> {
		let best_block = self.core.store.best_block()
			.ok_or_else(|| errors::internal("empty chain"))?;

		let weight = self.core.wallet.as_ref()
			.map_or(0, |wallet| wallet.stake_weight());
		let net_stake_weight =
			1.1429 * miner::pos_kernel_ps(&*self.core.store, &self.core.consensus);
		let search_interval = self.core.context.last_coin_stake_search_interval();
		let staking = search_interval != 0 && weight != 0;
		let expected_time = if staking {
			(1.0455 * self.core.consensus.target_spacing as f64 * net_stake_weight / weight as f64) as u64
		} else {
			0
		};
		let stats = self.core.context.template_stats();

		Ok(StakingInfo {
			enabled: self.core.context.is_staking_enabled(),
			staking,
			blocks: best_block.number,
			currentblockweight: stats.map(|stats| stats.weight),
			currentblocktx: stats.map(|stats| stats.num_txs),
			pooledtx: self.core.mempool.read().len() as u64,
			difficulty: self.last_stake_difficulty(),
			search_interval: search_interval.max(0) as u64,
			weight,
			netstakeweight: net_stake_weight as u64,
			expectedtime: expected_time,
			chain: self.core.consensus.network.name().to_owned(),
			warnings: self.core.context.warning(),
		})
	}

	fn staking(&self, generate: Option<bool>) -> Result<StakingStatus, Error> {
		if let Some(generate) = generate {
			if generate {
				match self.core.staking_deps() {
					Some(deps) => self.core.stake_miner.lock().start(deps),
					None => warn!(target: "rpc", "Staking requested without a wallet; ignored"),
				}
			} else {
				let mut stake_miner = self.core.stake_miner.lock();
				stake_miner.interrupt();
				stake_miner.stop();
				self.core.context.reset_coin_stake_search_interval();
			}
		}

		Ok(StakingStatus {
			generate: generate.unwrap_or_else(|| self.core.context.is_staking_enabled()),
		})
	}

	fn check_kernel(&self, inputs: Vec<KernelInput>, create_block_template: Option<bool>) -> Result<CheckKernelResponse, Error> {
		self.check_readiness()?;

		let best_block = self.core.store.best_block()
			.ok_or_else(|| errors::internal("empty chain"))?;
		let bits = next_target_required(best_block.hash, self.core.time_source.adjusted_now(),
			&*self.core.store, &self.core.consensus, true);
		let time = self.core.time_source.adjusted_now() & !self.core.consensus.stake_timestamp_mask;

		let mut response = CheckKernelResponse::default();
		for input in &inputs {
			let prev_out = OutPoint {
				hash: input.txid.into(),
				index: input.vout,
			};
			if self.core.validator.check_kernel(&best_block.hash, bits, time, &prev_out) {
				response.found = true;
				response.kernel = Some(KernelInfo {
					txid: input.txid,
					vout: input.vout,
					time,
				});
				break;
			}
		}

		if !response.found || !create_block_template.unwrap_or(false) {
			return Ok(response);
		}

		let wallet = match self.core.wallet {
			Some(ref wallet) => wallet.clone(),
			None => return Ok(response),
		};

		let template = {
			let pool = self.core.mempool.read();
			self.core.assembler.create_new_block(
				&self.core.store,
				&pool,
				&self.core.consensus,
				&self.core.context,
				&*self.core.validator,
				&*self.core.time_source,
				TemplateRequest::ProofOfStake { wallet: &*wallet },
			)
		}.map_err(|_| errors::internal("Couldn't create new block"))?;

		response.blocktemplatefees = Some(template.total_fees);
		response.blocktemplate = Some(
			GlobalBytes::from(serialize_with_flags(&template.block, SERIALIZE_TRANSACTION_WITNESS)).into(),
		);
		Ok(response)
	}
}
