use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use chain::constants::{TX_FEE_PER_KB, COIN, WITNESS_SCALE_FACTOR};
use chain::{Block, BlockHeader};
use jsonrpc_core::Error;
use miner::{self, TemplateRequest};
use parking_lot::Mutex;
use primitives::bytes::Bytes as GlobalBytes;
use primitives::hash::H256 as GlobalH256;
use script;
use ser::{deserialize, serialize_with_flags, SERIALIZE_TRANSACTION_WITNESS};
use storage::BlockRef;
use verification::{is_valid_proof_of_work, median_timestamp_inclusive, BlockCheckedListener,
	BlockStatus};
use v1::helpers::errors;
use v1::impls::ClientCore;
use v1::traits::Miner;
use v1::types::{BlockTemplate, BlockTemplateRequest, BlockTemplateRequestMode,
	BlockTemplateResponse, BlockTemplateTransaction, Bytes, EstimateFeeResponse, MiningInfo};

/// Template cache: rebuilt when the tip moves, or when the mempool changed
/// and the cached template is older than this.
const TEMPLATE_CACHE_MAX_AGE: Duration = Duration::from_secs(5);
/// Longpoll deadline before the mempool counter is consulted.
const LONGPOLL_TIMEOUT: Duration = Duration::from_secs(60);
/// Follow-up polling period of a longpoll with an unchanged mempool.
const LONGPOLL_RECHECK: Duration = Duration::from_secs(10);

struct TemplateCache {
	template: miner::BlockTemplate,
	previous_header_hash: GlobalH256,
	transactions_updated: u64,
	created_at: Instant,
}

pub struct MinerClient {
	core: ClientCore,
	template_cache: Mutex<Option<TemplateCache>>,
}

/// One-shot observer capturing the validator's verdict on a submitted
/// block.
struct SubmitStateCatcher {
	hash: GlobalH256,
	state: Mutex<Option<Result<(), ::verification::Error>>>,
}

impl BlockCheckedListener for SubmitStateCatcher {
	fn on_block_checked(&self, hash: &GlobalH256, result: &Result<(), ::verification::Error>) {
		if *hash == self.hash {
			*self.state.lock() = Some(result.clone());
		}
	}
}

impl MinerClient {
	pub fn new(core: ClientCore) -> Self {
		MinerClient {
			core,
			template_cache: Mutex::new(None),
		}
	}

	fn check_proposal(&self, request: &BlockTemplateRequest) -> Result<BlockTemplateResponse, Error> {
		let data = request.data.clone()
			.ok_or_else(|| errors::invalid_params("data", "Missing data String key for proposal"))?;
		let block: Block = deserialize(&*GlobalBytes::from(data))
			.map_err(|_| errors::deserialization("Block decode failed"))?;

		match self.core.validator.block_status(&block.hash()) {
			BlockStatus::Valid => return Ok(BlockTemplateResponse::Proposal(Some("duplicate".into()))),
			BlockStatus::Invalid => return Ok(BlockTemplateResponse::Proposal(Some("duplicate-invalid".into()))),
			BlockStatus::Absent => (),
		}

		let best_block = self.core.store.best_block()
			.ok_or_else(|| errors::internal("empty chain"))?;
		// validity can only be judged for blocks built on the current tip
		if block.block_header.previous_header_hash != best_block.hash {
			return Ok(BlockTemplateResponse::Proposal(Some("inconclusive-not-best-prevblk".into())));
		}

		let verdict = self.core.validator
			.test_block_validity(&block, false, true, true)
			.err()
			.map(|error| error.reject_reason().to_owned());
		Ok(BlockTemplateResponse::Proposal(verdict))
	}

	fn wait_for_longpoll(&self, longpollid: &str) {
		// format: <best block hash><transactions updated counter>
		if longpollid.len() < 64 {
			return;
		}
		let watched: GlobalH256 = match longpollid[..64].parse::<GlobalH256>() {
			Ok(hash) => hash.reversed(),
			Err(_) => return,
		};
		let counter: u64 = longpollid[64..].parse().unwrap_or(0);

		let mut deadline = Instant::now() + LONGPOLL_TIMEOUT;
		loop {
			if self.core.context.best_block() != watched {
				return;
			}
			let remaining = deadline.saturating_duration_since(Instant::now());
			if remaining == Duration::from_secs(0) ||
				!self.core.context.wait_for_best_block_change(&watched, remaining)
			{
				// timeout: only serve a fresh template when the mempool
				// actually changed, otherwise keep polling
				if self.core.mempool.read().transactions_updated() != counter {
					return;
				}
				deadline = Instant::now() + LONGPOLL_RECHECK;
			} else {
				return;
			}
		}
	}

	fn build_template_response(&self) -> Result<BlockTemplateResponse, Error> {
		let best_block = self.core.store.best_block()
			.ok_or_else(|| errors::internal("empty chain"))?;
		let transactions_updated = self.core.mempool.read().transactions_updated();

		let mut cache = self.template_cache.lock();
		let rebuild = match *cache {
			Some(ref cached) =>
				cached.previous_header_hash != best_block.hash ||
					(cached.transactions_updated != transactions_updated &&
						cached.created_at.elapsed() >= TEMPLATE_CACHE_MAX_AGE),
			None => true,
		};
		if rebuild {
			let template = {
				let pool = self.core.mempool.read();
				self.core.assembler.create_new_block(
					&self.core.store,
					&pool,
					&self.core.consensus,
					&self.core.context,
					&*self.core.validator,
					&*self.core.time_source,
					TemplateRequest::ProofOfWork {
						// anyone-can-spend placeholder, miners replace it
						coinbase_script: script::Builder::default()
							.push_opcode(script::OP_1)
							.into_bytes(),
					},
				)
			}.map_err(|_| errors::out_of_memory())?;

			*cache = Some(TemplateCache {
				template,
				previous_header_hash: best_block.hash,
				transactions_updated,
				created_at: Instant::now(),
			});
		}

		let cached = cache.as_ref().expect("the cache is filled right above; qed");
		Ok(BlockTemplateResponse::Template(
			self.template_to_rpc(&cached.template, &best_block.hash, cached.transactions_updated),
		))
	}

	fn template_to_rpc(
		&self,
		template: &miner::BlockTemplate,
		best_block_hash: &GlobalH256,
		transactions_updated: u64,
	) -> BlockTemplate {
		let consensus = &self.core.consensus;
		let block = &template.block;
		let prev_number = template.height - 1;
		let pre_segwit = !consensus.segwit_deployment.is_active_after(prev_number);

		let mut tx_index: HashMap<GlobalH256, u64> = HashMap::new();
		let mut transactions = Vec::new();
		for (index, transaction) in block.transactions.iter().enumerate() {
			tx_index.insert(transaction.hash(), index as u64);
			if transaction.is_coinbase() {
				continue;
			}

			let mut depends: Vec<u64> = transaction.inputs.iter()
				.filter_map(|input| tx_index.get(&input.previous_output.hash).cloned())
				.collect();
			depends.sort();
			depends.dedup();

			let mut sigops = template.tx_sigops_cost[index];
			if pre_segwit {
				sigops /= WITNESS_SCALE_FACTOR as i64;
			}

			transactions.push(BlockTemplateTransaction {
				data: GlobalBytes::from(serialize_with_flags(transaction, SERIALIZE_TRANSACTION_WITNESS)).into(),
				txid: transaction.hash().into(),
				hash: transaction.witness_hash().into(),
				depends,
				fee: template.tx_fees[index],
				sigops,
				weight: transaction.weight() as i64,
			});
		}

		let mut rules = Vec::new();
		let mut vbavailable = HashMap::new();
		for deployment in consensus.deployments().iter() {
			let name = if deployment.gbt_force {
				deployment.name.to_owned()
			} else {
				format!("!{}", deployment.name)
			};
			if deployment.is_active_after(prev_number) {
				rules.push(name);
			} else if deployment.is_signalling_after(prev_number, consensus.miner_confirmation_window) {
				vbavailable.insert(name, deployment.bit as u32);
			}
		}

		let target = {
			let target: ::primitives::uint::U256 = block.block_header.bits.into();
			let mut bytes = [0u8; 32];
			target.to_big_endian(&mut bytes);
			::hex::encode(&bytes)
		};

		let mintime = median_timestamp_inclusive(*best_block_hash, self.core.store.as_block_header_provider()) as i64 + 1;
		let curtime = ::std::cmp::max(mintime, self.core.time_source.adjusted_now() as i64);

		let mut sigoplimit = consensus.max_block_sigops_cost as i64;
		let mut sizelimit = consensus.max_block_size;
		if pre_segwit {
			sigoplimit /= WITNESS_SCALE_FACTOR as i64;
			sizelimit /= WITNESS_SCALE_FACTOR as u32;
		}

		BlockTemplate {
			capabilities: vec!["proposal".to_owned()],
			version: block.block_header.version,
			rules,
			vbavailable,
			vbrequired: 0,
			previousblockhash: (*best_block_hash).into(),
			transactions,
			coinbaseaux: HashMap::new(),
			coinbasevalue: block.transactions[0].outputs[0].value,
			longpollid: format!("{}{}", best_block_hash.to_reversed_str(), transactions_updated),
			target,
			mintime,
			mutable_fields: vec!["time".to_owned(), "transactions".to_owned(), "prevblock".to_owned()],
			noncerange: "00000000ffffffff".to_owned(),
			sigoplimit,
			sizelimit,
			weightlimit: if pre_segwit { None } else { Some(consensus.max_block_weight) },
			curtime,
			bits: format!("{:08x}", u32::from(block.block_header.bits)),
			height: template.height,
			default_witness_commitment: template.witness_commitment.clone().map(Into::into),
		}
	}
}

impl Miner for MinerClient {
	fn get_block_template(&self, request: Option<BlockTemplateRequest>) -> Result<BlockTemplateResponse, Error> {
		let request = request.unwrap_or_default();

		if let Some(BlockTemplateRequestMode::Proposal) = request.mode {
			return self.check_proposal(&request);
		}

		// the client must understand the segwit rules to use the template
		let supports_segwit = request.rules.as_ref()
			.map_or(false, |rules| rules.contains("segwit"));
		if !supports_segwit {
			return Err(errors::invalid_params("rules",
				"getblocktemplate must be called with the segwit rule set (call with {\"rules\": [\"segwit\"]})"));
		}

		if !self.core.consensus.network.is_test_chain() {
			if self.core.sync_status.peers_count() == 0 {
				return Err(errors::client_not_connected());
			}
			if self.core.sync_status.is_initial_block_download() {
				return Err(errors::client_in_initial_download());
			}
		}

		let best_block = self.core.store.best_block()
			.ok_or_else(|| errors::internal("empty chain"))?;
		if best_block.number > self.core.consensus.last_pow_block {
			return Err(errors::misc("No more PoW blocks"));
		}

		if let Some(ref longpollid) = request.longpollid {
			self.wait_for_longpoll(longpollid);
		}

		self.build_template_response()
	}

	fn submit_block(&self, block: Bytes, _dummy: Option<String>) -> Result<Option<String>, Error> {
		let block: Block = deserialize(&*GlobalBytes::from(block))
			.map_err(|_| errors::deserialization("Block decode failed"))?;
		if block.transactions.is_empty() || !block.transactions[0].is_coinbase() {
			return Err(errors::deserialization("Block does not start with a coinbase"));
		}

		let hash = block.hash();
		match self.core.validator.block_status(&hash) {
			BlockStatus::Valid => return Ok(Some("duplicate".into())),
			BlockStatus::Invalid => return Ok(Some("duplicate-invalid".into())),
			BlockStatus::Absent => (),
		}

		let catcher = Arc::new(SubmitStateCatcher {
			hash,
			state: Mutex::new(None),
		});
		let listener: Arc<dyn BlockCheckedListener> = catcher.clone();
		self.core.validator.register_listener(listener.clone());
		let accepted = self.core.validator.process_new_block(&block, true);
		self.core.validator.unregister_listener(&listener);

		if let Ok(false) = accepted {
			return Ok(Some("duplicate".into()));
		}

		let verdict = catcher.state.lock().clone();
		match verdict {
			None => Ok(Some("inconclusive".into())),
			Some(Ok(())) => Ok(None),
			Some(Err(error)) => Ok(Some(error.reject_reason().into())),
		}
	}

	fn submit_header(&self, header: Bytes) -> Result<(), Error> {
		let header: BlockHeader = deserialize(&*GlobalBytes::from(header))
			.map_err(|_| errors::deserialization("Block header decode failed"))?;

		if self.core.store.block_number(&header.previous_header_hash).is_none() {
			return Err(errors::verify(format!(
				"Must submit previous header ({}) first",
				header.previous_header_hash.to_reversed_str()
			)));
		}

		let max_bits = self.core.consensus.network.max_bits().into();
		if !is_valid_proof_of_work(max_bits, header.bits, &header.hash()) {
			return Err(errors::verify("high-hash"));
		}
		Ok(())
	}

	fn mining_info(&self) -> Result<MiningInfo, Error> {
		let best_block = self.core.store.best_block()
			.ok_or_else(|| errors::internal("empty chain"))?;
		let difficulty = self.core.store
			.block_header(BlockRef::Hash(best_block.hash))
			.map_or(0f64, |header| header.bits.to_f64());
		let stats = self.core.context.template_stats();

		Ok(MiningInfo {
			blocks: best_block.number,
			currentblockweight: stats.map(|stats| stats.weight),
			currentblocktx: stats.map(|stats| stats.num_txs),
			difficulty,
			networkhashps: miner::network_hash_ps(&*self.core.store, &self.core.consensus, 120, -1),
			pooledtx: self.core.mempool.read().len() as u64,
			chain: self.core.consensus.network.name().to_owned(),
			warnings: self.core.context.warning(),
		})
	}

	fn network_hash_ps(&self, nblocks: Option<i64>, height: Option<i64>) -> Result<f64, Error> {
		Ok(miner::network_hash_ps(
			&*self.core.store,
			&self.core.consensus,
			nblocks.unwrap_or(120),
			height.unwrap_or(-1),
		))
	}

	fn estimate_fee(&self) -> Result<EstimateFeeResponse, Error> {
		// interim behavior: a flat rate rather than an estimator
		Ok(EstimateFeeResponse {
			feerate: Some(TX_FEE_PER_KB as f64 / COIN as f64),
			errors: None,
		})
	}
}

#[cfg(test)]
mod tests {
	use chain::{Block, Transaction, TransactionInput, TransactionOutput};
	use jsonrpc_core::ErrorCode;
	use primitives::bytes::Bytes as GlobalBytes;
	use ser::serialize;
	use test_data::BlockBuilder;
	use verification::{block_reward, is_valid_proof_of_work_hash};
	use v1::impls::test_core::regtest_core;
	use v1::types::{BlockTemplateRequest, BlockTemplateRequestMode, BlockTemplateResponse};
	use v1::traits::Miner;
	use super::MinerClient;

	fn segwit_request() -> BlockTemplateRequest {
		let mut rules = ::std::collections::HashSet::new();
		rules.insert("segwit".to_owned());
		BlockTemplateRequest {
			rules: Some(rules),
			..Default::default()
		}
	}

	fn mined_child_of_tip(client: &MinerClient) -> Block {
		let best = client.core.store.best_block().unwrap();
		let parent = client.core.store.block(::storage::BlockRef::Hash(best.hash)).unwrap();
		let coinbase = Transaction {
			version: 1,
			time: parent.block_header.time + 64,
			inputs: vec![TransactionInput::coinbase(Default::default())],
			outputs: vec![TransactionOutput::default()],
			lock_time: 0,
		};
		let mut block = BlockBuilder::with_parent(best.hash)
			.set_time(parent.block_header.time + 64)
			.set_bits(parent.block_header.bits)
			.add_transaction(coinbase)
			.build();
		while !is_valid_proof_of_work_hash(block.block_header.bits, &block.hash()) {
			block.block_header.nonce += 1;
		}
		block
	}

	#[test]
	fn test_template_requires_segwit_rule() {
		let client = MinerClient::new(regtest_core());
		let error = client.get_block_template(Some(BlockTemplateRequest::default())).unwrap_err();
		assert_eq!(error.code, ErrorCode::ServerError(-8));
	}

	#[test]
	fn test_template_has_coinbase_value_and_longpollid() {
		let client = MinerClient::new(regtest_core());
		let response = client.get_block_template(Some(segwit_request())).unwrap();
		let template = match response {
			BlockTemplateResponse::Template(template) => template,
			_ => panic!("expected a template"),
		};

		assert_eq!(template.height, 1);
		assert_eq!(template.transactions.len(), 0);
		assert_eq!(template.coinbasevalue, block_reward(1, &client.core.consensus));
		let tip = client.core.store.best_block().unwrap().hash;
		assert!(template.longpollid.starts_with(&tip.to_reversed_str()));
		// segwit active on regtest: the weight limit and commitment appear
		assert!(template.weightlimit.is_some());
		assert!(template.default_witness_commitment.is_some());
		assert!(template.rules.iter().any(|rule| rule == "!segwit"));
	}

	#[test]
	fn test_template_fails_past_pow_ceiling() {
		let mut consensus = ::network::ConsensusParams::new(::network::Network::Regtest);
		consensus.last_pow_block = 0;
		let core = ::v1::impls::test_core::core_with_consensus(consensus);
		let client = MinerClient::new(core);

		let block = mined_child_of_tip(&client);
		client.core.validator.process_new_block(&block, true).unwrap();

		let error = client.get_block_template(Some(segwit_request())).unwrap_err();
		assert_eq!(error.code, ErrorCode::ServerError(-1));
		assert_eq!(error.message, "No more PoW blocks");
	}

	#[test]
	fn test_proposal_with_wrong_parent_is_inconclusive() {
		let client = MinerClient::new(regtest_core());
		let mut block = mined_child_of_tip(&client);
		block.block_header.previous_header_hash = 9u8.into();

		let request = BlockTemplateRequest {
			mode: Some(BlockTemplateRequestMode::Proposal),
			data: Some(GlobalBytes::from(serialize(&block)).into()),
			..Default::default()
		};
		let response = client.get_block_template(Some(request)).unwrap();
		assert_eq!(
			response,
			BlockTemplateResponse::Proposal(Some("inconclusive-not-best-prevblk".into()))
		);
	}

	#[test]
	fn test_proposal_on_tip_is_accepted() {
		let client = MinerClient::new(regtest_core());
		let block = mined_child_of_tip(&client);

		let request = BlockTemplateRequest {
			mode: Some(BlockTemplateRequestMode::Proposal),
			data: Some(GlobalBytes::from(serialize(&block)).into()),
			..Default::default()
		};
		let response = client.get_block_template(Some(request)).unwrap();
		assert_eq!(response, BlockTemplateResponse::Proposal(None));
	}

	#[test]
	fn test_submit_block_roundtrip_and_duplicate() {
		let client = MinerClient::new(regtest_core());
		let block = mined_child_of_tip(&client);
		let data = GlobalBytes::from(serialize(&block));

		assert_eq!(client.submit_block(data.clone().into(), None).unwrap(), None);
		assert_eq!(client.core.store.best_block().unwrap().number, 1);
		assert_eq!(
			client.submit_block(data.into(), None).unwrap(),
			Some("duplicate".into())
		);
	}

	#[test]
	fn test_submit_block_decode_failures() {
		let client = MinerClient::new(regtest_core());
		let error = client.submit_block(vec![0x00, 0x01].into(), None).unwrap_err();
		assert_eq!(error.code, ErrorCode::ServerError(-22));
	}

	#[test]
	fn test_submit_header_unknown_parent() {
		let client = MinerClient::new(regtest_core());
		let mut block = mined_child_of_tip(&client);
		block.block_header.previous_header_hash = 3u8.into();

		let error = client.submit_header(GlobalBytes::from(serialize(&block.block_header)).into()).unwrap_err();
		assert_eq!(error.code, ErrorCode::ServerError(-25));
	}

	#[test]
	fn test_mining_info_counts_pool() {
		let client = MinerClient::new(regtest_core());
		{
			let mut pool = client.core.mempool.write();
			let tx = ::test_data::TransactionBuilder::with_output(1000).into_transaction();
			pool.insert_verified(tx, 100, 4);
		}
		let info = client.mining_info().unwrap();
		assert_eq!(info.blocks, 0);
		assert_eq!(info.pooledtx, 1);
		assert_eq!(info.chain, "regtest");
	}

	#[test]
	fn test_estimate_fee_is_the_flat_rate() {
		let client = MinerClient::new(regtest_core());
		let estimate = client.estimate_fee().unwrap();
		assert_eq!(estimate.feerate, Some(0.0001));
		assert_eq!(estimate.errors, None);
	}
}
