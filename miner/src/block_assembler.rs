//! Assembles fee-maximizing block templates over the memory pool, wiring a
//! coinbase (proof-of-work) or coinstake (proof-of-stake) transaction.

use std::cmp;
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use bytes::Bytes;
use chain::constants::{LOCKTIME_VERIFY_FLAG_MEDIAN_TIME_PAST, STANDARD_LOCKTIME_VERIFY_FLAGS,
	WITNESS_SCALE_FACTOR};
use chain::{Block, BlockHeader, Transaction, TransactionInput, TransactionOutput};
use crypto::dhash256;
use hash::H256;
use network::{compute_block_version, ConsensusParams};
use script;
use storage::SharedStore;
use verification::{block_reward, median_timestamp_inclusive, next_target_required,
	transaction_legacy_sigops, BlockValidator};
use context::MiningContext;
use fee::FeeRate;
use memory_pool::{MemoryPool, MemoryPoolEntry};
use time_source::TimeSource;
use wallet::StakingWallet;

/// Default weight for assembled blocks.
pub const DEFAULT_BLOCK_MAX_WEIGHT: u32 = 4_000_000;
/// Default minimal feerate for pool transactions entering a template.
pub const DEFAULT_BLOCK_MIN_TX_FEE: u64 = 1_000;
/// Weight reserved for the coinbase transaction.
const COINBASE_WEIGHT_RESERVATION: u32 = 4_000;
/// Sigop cost reserved for the coinbase transaction.
const COINBASE_SIGOPS_RESERVATION: u32 = 400;
/// Budget-failed packages tolerated in a row once the block is nearly full.
const MAX_CONSECUTIVE_FAILURES: u32 = 1_000;

/// What the assembled template commits the block reward to.
pub enum TemplateRequest<'a> {
	/// Work block paying to the given script.
	ProofOfWork {
		coinbase_script: Bytes,
	},
	/// Stake block whose coinstake the wallet builds.
	ProofOfStake {
		wallet: &'a dyn StakingWallet,
	},
}

#[derive(Debug, PartialEq)]
pub enum Error {
	/// The chain store is empty.
	NoBestBlock,
	/// Proof-of-stake request and the wallet produced no coinstake this
	/// tick. Transient; the stake miner retries on the next timestamp slot.
	CoinStakeUnavailable,
	/// The finished proof-of-work template failed the validity test.
	Validity(::verification::Error),
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match *self {
			Error::NoBestBlock => "chain store has no best block".fmt(f),
			Error::CoinStakeUnavailable => "no coinstake found for the current timestamp slot".fmt(f),
			Error::Validity(ref err) => write!(f, "created an invalid block template: {}", err),
		}
	}
}

/// Assembled template: the candidate block plus the per-transaction fee and
/// sigop bookkeeping the RPC layer exposes.
#[derive(Debug, PartialEq)]
pub struct BlockTemplate {
	pub block: Block,
	/// Fee of transaction i; index 0 holds the negated sum of the rest.
	pub tx_fees: Vec<i64>,
	/// Sigop cost of transaction i.
	pub tx_sigops_cost: Vec<i64>,
	/// Height the template is valid at.
	pub height: u32,
	/// The coinbase commitment script when segwit is active.
	pub witness_commitment: Option<Bytes>,
	/// Sum of the included transaction fees.
	pub total_fees: u64,
}

/// Ephemeral per-assembly state.
#[derive(Default)]
struct AssemblerState {
	in_block: HashSet<H256>,
	block_weight: u32,
	block_sigops_cost: u32,
	block_tx: u32,
	fees: u64,
	include_witness: bool,
}

/// Growing transaction section of the template under construction.
struct TemplateBody {
	transactions: Vec<Transaction>,
	tx_fees: Vec<i64>,
	tx_sigops_cost: Vec<i64>,
}

/// Package aggregates of an entry, adjusted downwards for ancestors that
/// made it into the block already.
#[derive(Debug, Clone, Copy)]
struct ModifiedValues {
	size: u64,
	fees: i64,
	sigops: u32,
}

impl ModifiedValues {
	fn of(entry: &MemoryPoolEntry) -> Self {
		ModifiedValues {
			size: entry.package_size,
			fees: entry.package_fees,
			sigops: entry.package_sigops,
		}
	}

	fn exclude(&mut self, included: &MemoryPoolEntry) {
		self.size -= included.size as u64;
		self.fees -= included.modified_fee();
		self.sigops -= included.sigop_cost;
	}
}

#[derive(Debug, PartialEq, Eq)]
struct ModifiedOrdered {
	hash: H256,
	size: u64,
	fees: i64,
}

impl PartialOrd for ModifiedOrdered {
	fn partial_cmp(&self, other: &Self) -> Option<cmp::Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for ModifiedOrdered {
	fn cmp(&self, other: &Self) -> cmp::Ordering {
		let left = self.fees as i128 * other.size as i128;
		let right = other.fees as i128 * self.size as i128;
		right.cmp(&left).then_with(|| self.hash.cmp(&other.hash))
	}
}

/// The `modified` working set: entries re-scored because some of their
/// ancestors are already in the block, indexed by adjusted ancestor fee
/// rate.
#[derive(Default)]
struct ModifiedSet {
	by_hash: HashMap<H256, ModifiedValues>,
	by_score: BTreeSet<ModifiedOrdered>,
}

impl ModifiedSet {
	fn contains(&self, hash: &H256) -> bool {
		self.by_hash.contains_key(hash)
	}

	fn best(&self) -> Option<(H256, ModifiedValues)> {
		self.by_score.iter().next().map(|ordered| {
			(ordered.hash, self.by_hash[&ordered.hash])
		})
	}

	fn remove(&mut self, hash: &H256) {
		if let Some(values) = self.by_hash.remove(hash) {
			self.by_score.remove(&ModifiedOrdered {
				hash: *hash,
				size: values.size,
				fees: values.fees,
			});
		}
	}

	/// Adjusts the entry for a newly included ancestor, inserting it with
	/// its pool aggregates first when not tracked yet.
	fn update_for_parent_inclusion(&mut self, entry: &MemoryPoolEntry, included: &MemoryPoolEntry) {
		let mut values = match self.by_hash.remove(&entry.hash) {
			Some(values) => {
				self.by_score.remove(&ModifiedOrdered {
					hash: entry.hash,
					size: values.size,
					fees: values.fees,
				});
				values
			},
			None => ModifiedValues::of(entry),
		};
		values.exclude(included);
		self.by_score.insert(ModifiedOrdered {
			hash: entry.hash,
			size: values.size,
			fees: values.fees,
		});
		self.by_hash.insert(entry.hash, values);
	}
}

/// True when `(a_fees / a_size)` sorts before `(b_fees / b_size)`, with the
/// hash as the total tie break.
fn sorts_before(a_fees: i64, a_size: u64, a_hash: &H256, b_fees: i64, b_size: u64, b_hash: &H256) -> bool {
	let left = a_fees as i128 * b_size as i128;
	let right = b_fees as i128 * a_size as i128;
	if left != right {
		left > right
	} else {
		a_hash < b_hash
	}
}

/// Block assembler.
pub struct BlockAssembler {
	max_block_weight: u32,
	max_block_sigops_cost: u32,
	block_min_fee_rate: FeeRate,
	block_version_override: Option<u32>,
	print_priority: bool,
}

impl BlockAssembler {
	pub fn new(consensus: &ConsensusParams) -> Self {
		BlockAssembler::with_options(consensus, DEFAULT_BLOCK_MAX_WEIGHT,
			FeeRate::from_satoshis_per_kb(DEFAULT_BLOCK_MIN_TX_FEE))
	}

	pub fn with_options(consensus: &ConsensusParams, max_block_weight: u32, block_min_fee_rate: FeeRate) -> Self {
		// limit weight between 4K and max-4K for sanity
		let max_block_weight = cmp::max(COINBASE_WEIGHT_RESERVATION,
			cmp::min(consensus.max_block_weight - COINBASE_WEIGHT_RESERVATION, max_block_weight));
		BlockAssembler {
			max_block_weight,
			max_block_sigops_cost: consensus.max_block_sigops_cost,
			block_min_fee_rate,
			block_version_override: None,
			print_priority: false,
		}
	}

	/// Regtest-only override of the assembled block version.
	pub fn set_block_version_override(&mut self, version: Option<u32>) {
		self.block_version_override = version;
	}

	pub fn set_print_priority(&mut self, print_priority: bool) {
		self.print_priority = print_priority;
	}

	pub fn max_block_weight(&self) -> u32 {
		self.max_block_weight
	}

	/// Builds a new candidate block on the current best block.
	pub fn create_new_block(
		&self,
		store: &SharedStore,
		mempool: &MemoryPool,
		consensus: &ConsensusParams,
		context: &MiningContext,
		validator: &dyn BlockValidator,
		time_source: &dyn TimeSource,
		request: TemplateRequest,
	) -> Result<BlockTemplate, Error> {
		let mut state = AssemblerState {
			block_weight: COINBASE_WEIGHT_RESERVATION,
			block_sigops_cost: COINBASE_SIGOPS_RESERVATION,
			..Default::default()
		};

		let mut block_time = time_source.adjusted_now();

		let best_block = store.best_block().ok_or(Error::NoBestBlock)?;
		let height = best_block.number + 1;
		let median_time_past = median_timestamp_inclusive(best_block.hash, store.as_block_header_provider());

		// placeholder coinbase as transaction 0; fee and sigops are
		// sentinel values updated at the end
		let mut coinbase = Transaction {
			version: 1,
			time: block_time,
			inputs: vec![TransactionInput::coinbase(Bytes::default())],
			outputs: vec![TransactionOutput::default()],
			lock_time: 0,
		};
		let mut body = TemplateBody {
			transactions: Vec::new(),
			tx_fees: vec![-1],
			tx_sigops_cost: vec![-1],
		};

		let mut bits;
		let mut coinstake = None;
		let proof_of_stake = match request {
			TemplateRequest::ProofOfWork { coinbase_script } => {
				bits = next_target_required(best_block.hash, block_time, &**store, consensus, false);
				coinbase.outputs[0] = TransactionOutput {
					value: state.fees + block_reward(height, consensus),
					script_pubkey: coinbase_script,
				};
				false
			},
			TemplateRequest::ProofOfStake { wallet } => {
				// flush coinstakes orphaned by reorgs before probing again
				wallet.abandon_orphaned_coinstakes();

				bits = next_target_required(best_block.hash, block_time, &**store, consensus, true);
				let stake_time = time_source.adjusted_now() & !consensus.stake_timestamp_mask;

				let mut created = None;
				if stake_time as i64 > context.last_coin_stake_search_time() {
					created = wallet.create_coinstake(bits, 1, stake_time, state.fees);
					context.record_coin_stake_search(stake_time as i64);
				}

				match created {
					Some(transaction) if transaction.time >= median_time_past + 1 => {
						// the coinbase carries no value in a stake block
						coinbase.outputs[0] = TransactionOutput::empty();
						block_time = transaction.time;
						coinbase.time = transaction.time;
						coinstake = Some(transaction);
						true
					},
					// no point continuing without a coinstake
					_ => return Err(Error::CoinStakeUnavailable),
				}
			},
		};

		if let Some(coinstake) = coinstake {
			body.tx_fees.push(0);
			body.tx_sigops_cost.push((WITNESS_SCALE_FACTOR * transaction_legacy_sigops(&coinstake)) as i64);
			state.block_weight += coinstake.weight() as u32;
			body.transactions.push(coinstake);
		}

		let mut version = compute_block_version(best_block.number, consensus);
		if consensus.network.mine_blocks_on_demand() {
			if let Some(overridden) = self.block_version_override {
				version = overridden;
			}
		}

		let locktime_cutoff = if STANDARD_LOCKTIME_VERIFY_FLAGS & LOCKTIME_VERIFY_FLAG_MEDIAN_TIME_PAST != 0 {
			median_time_past
		} else {
			block_time
		};

		state.include_witness = consensus.segwit_deployment.is_active_after(best_block.number);

		let (packages_selected, descendants_updated) =
			self.select_transactions(mempool, &mut state, &mut body, height, locktime_cutoff);
		trace!(target: "miner", "assembled {} packages, updated {} descendants", packages_selected, descendants_updated);

		context.record_template_stats(state.block_tx, state.block_weight);

		// final coinbase: height push followed by OP_0, the extra nonce slot
		coinbase.inputs[0].script_sig = script::Builder::default()
			.push_num(height as i64)
			.push_num(0)
			.into_bytes();
		body.tx_fees[0] = -(state.fees as i64);

		let mut transactions = Vec::with_capacity(body.transactions.len() + 1);
		transactions.push(coinbase);
		transactions.extend(body.transactions);

		let witness_commitment = if state.include_witness {
			Some(generate_coinbase_commitment(&mut transactions))
		} else {
			None
		};

		let mut header_time = cmp::max(median_time_past + 1,
			transactions.iter().map(|tx| tx.time).max().unwrap_or(0));
		if !proof_of_stake {
			// move work templates to the present; this may ease the target
			// on min-difficulty chains
			header_time = cmp::max(header_time, time_source.adjusted_now());
			if consensus.allow_min_difficulty_blocks {
				bits = next_target_required(best_block.hash, header_time, &**store, consensus, false);
			}
		}

		body.tx_sigops_cost[0] =
			(WITNESS_SCALE_FACTOR * transaction_legacy_sigops(&transactions[0])) as i64;

		let header = BlockHeader {
			version,
			previous_header_hash: best_block.hash,
			merkle_root_hash: {
				let hashes = transactions.iter().map(Transaction::hash).collect::<Vec<_>>();
				::chain::merkle_root(&hashes)
			},
			time: header_time,
			bits,
			nonce: 0,
		};

		let template = BlockTemplate {
			block: Block::new(header, transactions),
			tx_fees: body.tx_fees,
			tx_sigops_cost: body.tx_sigops_cost,
			height,
			witness_commitment,
			total_fees: state.fees,
		};

		if !proof_of_stake {
			validator
				.test_block_validity(&template.block, false, false, true)
				.map_err(Error::Validity)?;
		}

		Ok(template)
	}

	/// Walks the mempool in ancestor-fee-rate order, maintaining adjusted
	/// scores for entries whose ancestors were already included. Returns
	/// `(packages_selected, descendants_updated)`.
	fn select_transactions(
		&self,
		mempool: &MemoryPool,
		state: &mut AssemblerState,
		body: &mut TemplateBody,
		height: u32,
		locktime_cutoff: u32,
	) -> (u32, u32) {
		let mut modified = ModifiedSet::default();
		let mut failed: HashSet<H256> = HashSet::new();
		let mut packages_selected = 0u32;
		let mut descendants_updated = 0u32;
		let mut consecutive_failed = 0u32;

		let mut cursor = mempool.iter_by_ancestor_score().peekable();

		loop {
			// skip pool entries whose cached scores are stale or that were
			// handled already
			while let Some(entry) = cursor.peek() {
				if state.in_block.contains(&entry.hash)
					|| modified.contains(&entry.hash)
					|| failed.contains(&entry.hash)
				{
					cursor.next();
				} else {
					break;
				}
			}

			// pick the higher-scoring of the pool cursor and the best
			// adjusted entry
			let modified_best = modified.best();
			let (hash, package, using_modified) = {
				let cursor_best = cursor.peek()
					.map(|entry| (entry.hash, ModifiedValues::of(*entry)));
				match (cursor_best, modified_best) {
					(None, None) => break,
					(None, Some((hash, values))) => (hash, values, true),
					(Some((hash, values)), None) => {
						cursor.next();
						(hash, values, false)
					},
					(Some((pool_hash, pool_values)), Some((mod_hash, mod_values))) => {
						if sorts_before(mod_values.fees, mod_values.size, &mod_hash,
							pool_values.fees, pool_values.size, &pool_hash)
						{
							(mod_hash, mod_values, true)
						} else {
							cursor.next();
							(pool_hash, pool_values, false)
						}
					},
				}
			};

			debug_assert!(!state.in_block.contains(&hash));

			// everything else scores lower
			if package.fees < self.block_min_fee_rate.fee(package.size) as i64 {
				break;
			}

			if !self.test_package(state, &package) {
				if using_modified {
					// drop it so the next best adjusted entry surfaces
					modified.remove(&hash);
					failed.insert(hash);
				}

				consecutive_failed += 1;
				if consecutive_failed > MAX_CONSECUTIVE_FAILURES
					&& state.block_weight > self.max_block_weight - COINBASE_WEIGHT_RESERVATION
				{
					// close to full and failing; stop trying
					break;
				}
				continue;
			}

			// expand to the full package: in-pool ancestors not yet in the
			// block, then the entry itself
			let mut package_hashes: Vec<H256> = mempool.ancestors(&hash)
				.map(|ancestors| ancestors.iter()
					.filter(|ancestor| !state.in_block.contains(ancestor))
					.cloned()
					.collect())
				.unwrap_or_default();
			package_hashes.push(hash);

			if !self.test_package_transactions(mempool, &package_hashes, state, height, locktime_cutoff) {
				if using_modified {
					modified.remove(&hash);
					failed.insert(hash);
				}
				continue;
			}

			// the package will make it in
			consecutive_failed = 0;

			// ancestors first: fewer in-pool ancestors sort earlier, the
			// hash keeps the order total
			package_hashes.sort_by_key(|hash| {
				let ancestor_count = mempool.ancestors(hash).map_or(0, |ancestors| ancestors.len());
				(ancestor_count, *hash)
			});

			for package_hash in &package_hashes {
				let entry = mempool.entry(package_hash)
					.expect("package hashes come from the pool indices; qed");
				self.add_to_block(state, body, entry);
				modified.remove(package_hash);
			}

			packages_selected += 1;

			// adjust everything that depends on the included transactions
			let included: HashSet<H256> = package_hashes.iter().cloned().collect();
			for included_hash in &package_hashes {
				let included_entry = mempool.entry(included_hash)
					.expect("included hashes come from the pool indices; qed");
				for descendant in mempool.descendants(included_hash) {
					if included.contains(&descendant) {
						continue;
					}
					let descendant_entry = mempool.entry(&descendant)
						.expect("descendants are pool entries; qed");
					modified.update_for_parent_inclusion(descendant_entry, included_entry);
					descendants_updated += 1;
				}
			}
		}

		(packages_selected, descendants_updated)
	}

	fn test_package(&self, state: &AssemblerState, package: &ModifiedValues) -> bool {
		if state.block_weight as u64 + WITNESS_SCALE_FACTOR as u64 * package.size
			>= self.max_block_weight as u64
		{
			return false;
		}
		if state.block_sigops_cost + package.sigops >= self.max_block_sigops_cost {
			return false;
		}
		true
	}

	/// Package-wide transaction checks: finality at the target height and
	/// witness admissibility.
	fn test_package_transactions(
		&self,
		mempool: &MemoryPool,
		package: &[H256],
		state: &AssemblerState,
		height: u32,
		locktime_cutoff: u32,
	) -> bool {
		package.iter().all(|hash| {
			let entry = mempool.entry(hash)
				.expect("package hashes come from the pool indices; qed");
			entry.transaction.is_final_in_block(height, locktime_cutoff)
				&& (state.include_witness || !entry.transaction.has_witness())
		})
	}

	fn add_to_block(&self, state: &mut AssemblerState, body: &mut TemplateBody, entry: &MemoryPoolEntry) {
		body.transactions.push(entry.transaction.clone());
		body.tx_fees.push(entry.fee as i64);
		body.tx_sigops_cost.push(entry.sigop_cost as i64);
		state.block_weight += entry.weight as u32;
		state.block_sigops_cost += entry.sigop_cost;
		state.block_tx += 1;
		state.fees += entry.fee;
		state.in_block.insert(entry.hash);

		if self.print_priority {
			debug!(target: "miner", "fee {} txid {}",
				FeeRate::from_satoshis_per_kb((entry.modified_fee().max(0) as u64) * 1000 / entry.size as u64),
				entry.hash.to_reversed_str());
		}
	}
}

/// Appends the witness commitment output to the coinbase and installs the
/// witness reserved value. Returns the commitment script.
pub fn generate_coinbase_commitment(transactions: &mut Vec<Transaction>) -> Bytes {
	// witness merkle root with the coinbase slot zeroed
	let witness_root = {
		let mut hashes = vec![H256::default()];
		hashes.extend(transactions.iter().skip(1).map(Transaction::witness_hash));
		::chain::merkle_root(&hashes)
	};

	let witness_reserved = Bytes::from(vec![0u8; 32]);
	let mut preimage = Vec::with_capacity(64);
	preimage.extend_from_slice(&*witness_root);
	preimage.extend_from_slice(&witness_reserved);
	let commitment = dhash256(&preimage);

	let mut payload = Vec::with_capacity(36);
	payload.extend_from_slice(&[0xaa, 0x21, 0xa9, 0xed]);
	payload.extend_from_slice(&*commitment);
	let commitment_script = script::Builder::default()
		.push_opcode(script::OP_RETURN)
		.push_data(&payload)
		.into_bytes();

	let coinbase = &mut transactions[0];
	coinbase.outputs.push(TransactionOutput {
		value: 0,
		script_pubkey: commitment_script.clone(),
	});
	coinbase.inputs[0].script_witness = vec![witness_reserved];

	commitment_script
}
