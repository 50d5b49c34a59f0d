//! Transactions memory pool.
//!
//! `MemoryPool` keeps verified transactions with their fee and sigop cost
//! as computed at admission, and maintains for every entry the aggregates
//! over the entry and all of its in-pool ancestors. The primary index
//! iterates entries in descending ancestor fee rate, the ordering the
//! block assembler consumes. Admission policy itself (validation, RBF,
//! eviction) lives with the node, not here.
//!
//! Invariant relied upon throughout: when a transaction is in the pool,
//! all of its unconfirmed ancestors are too.

use std::collections::{BTreeSet, HashMap, HashSet, VecDeque};
use chain::Transaction;
use hash::H256;

/// Transaction paired with its hash, the unit of pool insertion.
#[derive(Debug, PartialEq, Clone)]
pub struct HashedTransaction {
	pub transaction: Transaction,
	pub hash: H256,
}

impl From<Transaction> for HashedTransaction {
	fn from(transaction: Transaction) -> Self {
		HashedTransaction {
			hash: transaction.hash(),
			transaction,
		}
	}
}

/// Information on the current `MemoryPool` state.
#[derive(Debug)]
pub struct Information {
	/// Number of transactions currently in the pool.
	pub transactions_count: usize,
	/// Total virtual size of the pooled transactions.
	pub transactions_size_in_bytes: usize,
}

/// Single entry with cached per-transaction and per-package values.
/// Fields are read-only outside of the pool.
#[derive(Debug, Clone)]
pub struct MemoryPoolEntry {
	pub transaction: Transaction,
	pub hash: H256,
	/// Virtual size, the unit of feerate accounting.
	pub size: usize,
	/// Weight contributed to an assembled block.
	pub weight: usize,
	pub fee: u64,
	/// Out-of-band priority adjustment.
	pub virtual_fee: i64,
	pub sigop_cost: u32,
	/// Hashes of every in-pool ancestor.
	pub ancestors: HashSet<H256>,
	/// Virtual size of the entry and its in-pool ancestors.
	pub package_size: u64,
	/// Modified fees of the entry and its in-pool ancestors.
	pub package_fees: i64,
	/// Sigop cost of the entry and its in-pool ancestors.
	pub package_sigops: u32,
}

impl MemoryPoolEntry {
	/// Base fee plus the priority adjustment.
	pub fn modified_fee(&self) -> i64 {
		self.fee as i64 + self.virtual_fee
	}
}

/// Lightweight struct maintaining the ancestor-fee-rate ordering. Entries
/// with a higher package fee rate sort first; ties break on the hash so the
/// order is total and identical across nodes.
#[derive(Debug, PartialEq, Eq)]
struct OrderedEntry {
	hash: H256,
	package_size: u64,
	package_fees: i64,
}

impl OrderedEntry {
	fn for_entry(entry: &MemoryPoolEntry) -> Self {
		OrderedEntry {
			hash: entry.hash,
			package_size: entry.package_size,
			package_fees: entry.package_fees,
		}
	}
}

impl PartialOrd for OrderedEntry {
	fn partial_cmp(&self, other: &Self) -> Option<::std::cmp::Ordering> {
		Some(self.cmp(other))
	}
}

impl Ord for OrderedEntry {
	fn cmp(&self, other: &Self) -> ::std::cmp::Ordering {
		let left = self.package_fees as i128 * other.package_size as i128;
		let right = other.package_fees as i128 * self.package_size as i128;
		right.cmp(&left).then_with(|| self.hash.cmp(&other.hash))
	}
}

/// Transactions memory pool.
#[derive(Default)]
pub struct MemoryPool {
	by_hash: HashMap<H256, MemoryPoolEntry>,
	/// Spent txid -> spending in-pool txids.
	by_input: HashMap<H256, HashSet<H256>>,
	by_ancestor_score: BTreeSet<OrderedEntry>,
	transactions_updated: u64,
	transactions_size_in_bytes: usize,
}

impl MemoryPool {
	pub fn new() -> Self {
		MemoryPool::default()
	}

	/// Inserts a verified transaction with the fee and sigop cost computed
	/// at admission.
	pub fn insert_verified(&mut self, transaction: Transaction, fee: u64, sigop_cost: u32) {
		let hashed = HashedTransaction::from(transaction);
		if self.by_hash.contains_key(&hashed.hash) {
			return;
		}

		let hash = hashed.hash;
		let size = hashed.transaction.virtual_size();
		let weight = hashed.transaction.weight();

		let mut ancestors = HashSet::new();
		for input in &hashed.transaction.inputs {
			let parent = &input.previous_output.hash;
			if let Some(parent_entry) = self.by_hash.get(parent) {
				ancestors.insert(*parent);
				ancestors.extend(parent_entry.ancestors.iter().cloned());
			}
		}

		let mut package_size = size as u64;
		let mut package_fees = fee as i64;
		let mut package_sigops = sigop_cost;
		for ancestor in &ancestors {
			let entry = &self.by_hash[ancestor];
			package_size += entry.size as u64;
			package_fees += entry.modified_fee();
			package_sigops += entry.sigop_cost;
		}

		for input in &hashed.transaction.inputs {
			self.by_input
				.entry(input.previous_output.hash)
				.or_insert_with(HashSet::new)
				.insert(hash);
		}

		let entry = MemoryPoolEntry {
			transaction: hashed.transaction,
			hash,
			size,
			weight,
			fee,
			virtual_fee: 0,
			sigop_cost,
			ancestors,
			package_size,
			package_fees,
			package_sigops,
		};

		self.by_ancestor_score.insert(OrderedEntry::for_entry(&entry));
		self.transactions_size_in_bytes += size;
		self.by_hash.insert(hash, entry);

		// a parent inserted after its descendants propagates into their
		// ancestor sets and package aggregates
		let (size, modified_fee, sigops, ancestors) = {
			let entry = &self.by_hash[&hash];
			(entry.size, entry.modified_fee(), entry.sigop_cost, entry.ancestors.clone())
		};
		for descendant in self.descendants(&hash) {
			let entry = self.by_hash.get_mut(&descendant)
				.expect("descendants are read from by_input; every spender is in by_hash; qed");
			if entry.ancestors.insert(hash) {
				entry.ancestors.extend(ancestors.iter().cloned());
				let ordered = OrderedEntry::for_entry(entry);
				entry.package_size += size as u64;
				entry.package_fees += modified_fee;
				entry.package_sigops += sigops;
				let updated = OrderedEntry::for_entry(entry);
				self.by_ancestor_score.remove(&ordered);
				self.by_ancestor_score.insert(updated);
			}
		}

		self.transactions_updated += 1;
	}

	/// Removes a single transaction by its hash. Descendants remain in the
	/// pool with their aggregates adjusted.
	pub fn remove_by_hash(&mut self, hash: &H256) -> Option<Transaction> {
		let entry = match self.by_hash.remove(hash) {
			Some(entry) => entry,
			None => return None,
		};

		self.by_ancestor_score.remove(&OrderedEntry::for_entry(&entry));
		self.transactions_size_in_bytes -= entry.size;

		for input in &entry.transaction.inputs {
			let remove_key = {
				match self.by_input.get_mut(&input.previous_output.hash) {
					Some(spenders) => {
						spenders.remove(hash);
						spenders.is_empty()
					},
					None => false,
				}
			};
			if remove_key {
				self.by_input.remove(&input.previous_output.hash);
			}
		}

		for descendant in self.descendants(hash) {
			if let Some(descendant_entry) = self.by_hash.get_mut(&descendant) {
				if descendant_entry.ancestors.remove(hash) {
					let ordered = OrderedEntry::for_entry(descendant_entry);
					descendant_entry.package_size -= entry.size as u64;
					descendant_entry.package_fees -= entry.modified_fee();
					descendant_entry.package_sigops -= entry.sigop_cost;
					let updated = OrderedEntry::for_entry(descendant_entry);
					self.by_ancestor_score.remove(&ordered);
					self.by_ancestor_score.insert(updated);
				}
			}
		}

		self.transactions_updated += 1;
		Some(entry.transaction)
	}

	/// Adjusts the priority of a transaction; the delta propagates into the
	/// package fees of every descendant.
	pub fn set_virtual_fee(&mut self, hash: &H256, virtual_fee: i64) {
		let delta = match self.by_hash.get_mut(hash) {
			Some(entry) => {
				let delta = virtual_fee - entry.virtual_fee;
				let ordered = OrderedEntry::for_entry(entry);
				entry.virtual_fee = virtual_fee;
				entry.package_fees += delta;
				let updated = OrderedEntry::for_entry(entry);
				self.by_ancestor_score.remove(&ordered);
				self.by_ancestor_score.insert(updated);
				delta
			},
			None => return,
		};

		for descendant in self.descendants(hash) {
			if let Some(entry) = self.by_hash.get_mut(&descendant) {
				let ordered = OrderedEntry::for_entry(entry);
				entry.package_fees += delta;
				let updated = OrderedEntry::for_entry(entry);
				self.by_ancestor_score.remove(&ordered);
				self.by_ancestor_score.insert(updated);
			}
		}

		self.transactions_updated += 1;
	}

	/// All in-pool transactions spending from the given one, transitively.
	pub fn descendants(&self, hash: &H256) -> HashSet<H256> {
		let mut result = HashSet::new();
		let mut queue = VecDeque::new();
		queue.push_back(*hash);
		while let Some(current) = queue.pop_front() {
			if let Some(spenders) = self.by_input.get(&current) {
				for spender in spenders {
					if self.by_hash.contains_key(spender) && result.insert(*spender) {
						queue.push_back(*spender);
					}
				}
			}
		}
		result
	}

	/// In-pool ancestors of the given transaction.
	pub fn ancestors(&self, hash: &H256) -> Option<&HashSet<H256>> {
		self.by_hash.get(hash).map(|entry| &entry.ancestors)
	}

	pub fn get(&self, hash: &H256) -> Option<&Transaction> {
		self.by_hash.get(hash).map(|entry| &entry.transaction)
	}

	pub fn entry(&self, hash: &H256) -> Option<&MemoryPoolEntry> {
		self.by_hash.get(hash)
	}

	pub fn contains(&self, hash: &H256) -> bool {
		self.by_hash.contains_key(hash)
	}

	/// Entries in descending ancestor fee rate order.
	pub fn iter_by_ancestor_score<'a>(&'a self) -> impl Iterator<Item = &'a MemoryPoolEntry> + 'a {
		self.by_ancestor_score.iter().map(move |ordered| {
			self.by_hash.get(&ordered.hash)
				.expect("ordering is kept in sync with by_hash; qed")
		})
	}

	/// Monotonic counter bumped on every pool mutation; the longpoll key.
	pub fn transactions_updated(&self) -> u64 {
		self.transactions_updated
	}

	pub fn information(&self) -> Information {
		Information {
			transactions_count: self.by_hash.len(),
			transactions_size_in_bytes: self.transactions_size_in_bytes,
		}
	}

	pub fn len(&self) -> usize {
		self.by_hash.len()
	}

	pub fn is_empty(&self) -> bool {
		self.by_hash.is_empty()
	}

	pub fn transaction_hashes(&self) -> Vec<H256> {
		self.by_hash.keys().cloned().collect()
	}
}

#[cfg(test)]
mod tests {
	use test_data::TransactionBuilder;
	use super::MemoryPool;

	#[test]
	fn test_ordering_is_by_fee_rate() {
		// three independent transactions of equal size, different fees
		let tx_low = TransactionBuilder::with_output(1000).set_time(1).into_transaction();
		let tx_mid = TransactionBuilder::with_output(1000).set_time(2).into_transaction();
		let tx_high = TransactionBuilder::with_output(1000).set_time(3).into_transaction();

		let mut pool = MemoryPool::new();
		pool.insert_verified(tx_low.clone(), 100, 4);
		pool.insert_verified(tx_high.clone(), 900, 4);
		pool.insert_verified(tx_mid.clone(), 500, 4);

		let order: Vec<_> = pool.iter_by_ancestor_score().map(|entry| entry.hash).collect();
		assert_eq!(order, vec![tx_high.hash(), tx_mid.hash(), tx_low.hash()]);
	}

	#[test]
	fn test_child_package_includes_parent() {
		let parent = TransactionBuilder::with_output(10_000).into_transaction();
		let child = TransactionBuilder::with_input(&parent, 0).add_output(9_000).into_transaction();

		let mut pool = MemoryPool::new();
		pool.insert_verified(parent.clone(), 100, 4);
		pool.insert_verified(child.clone(), 900, 8);

		let child_entry = pool.entry(&child.hash()).unwrap();
		assert_eq!(child_entry.ancestors.len(), 1);
		assert_eq!(child_entry.package_fees, 1000);
		assert_eq!(child_entry.package_sigops, 12);
		assert_eq!(
			child_entry.package_size,
			(parent.virtual_size() + child.virtual_size()) as u64
		);
	}

	#[test]
	fn test_parent_inserted_after_child() {
		let parent = TransactionBuilder::with_output(10_000).into_transaction();
		let child = TransactionBuilder::with_input(&parent, 0).add_output(9_000).into_transaction();
		let grandchild = TransactionBuilder::with_input(&child, 0).add_output(8_000).into_transaction();

		let mut pool = MemoryPool::new();
		pool.insert_verified(child.clone(), 500, 4);
		pool.insert_verified(grandchild.clone(), 500, 4);
		pool.insert_verified(parent.clone(), 100, 4);

		let grandchild_entry = pool.entry(&grandchild.hash()).unwrap();
		assert_eq!(grandchild_entry.ancestors.len(), 2);
		assert_eq!(grandchild_entry.package_fees, 1100);
	}

	#[test]
	fn test_remove_adjusts_descendant_packages() {
		let parent = TransactionBuilder::with_output(10_000).into_transaction();
		let child = TransactionBuilder::with_input(&parent, 0).add_output(9_000).into_transaction();

		let mut pool = MemoryPool::new();
		pool.insert_verified(parent.clone(), 100, 4);
		pool.insert_verified(child.clone(), 900, 8);

		let updated_before = pool.transactions_updated();
		assert!(pool.remove_by_hash(&parent.hash()).is_some());
		assert!(pool.transactions_updated() > updated_before);

		let child_entry = pool.entry(&child.hash()).unwrap();
		assert!(child_entry.ancestors.is_empty());
		assert_eq!(child_entry.package_fees, 900);
		assert_eq!(child_entry.package_sigops, 8);
		assert_eq!(child_entry.package_size, child.virtual_size() as u64);
	}

	#[test]
	fn test_virtual_fee_reorders_pool() {
		let tx_first = TransactionBuilder::with_output(1000).set_time(1).into_transaction();
		let tx_second = TransactionBuilder::with_output(1000).set_time(2).into_transaction();

		let mut pool = MemoryPool::new();
		pool.insert_verified(tx_first.clone(), 100, 4);
		pool.insert_verified(tx_second.clone(), 900, 4);

		pool.set_virtual_fee(&tx_first.hash(), 10_000);
		let order: Vec<_> = pool.iter_by_ancestor_score().map(|entry| entry.hash).collect();
		assert_eq!(order, vec![tx_first.hash(), tx_second.hash()]);
	}

	#[test]
	fn test_descendants_are_transitive() {
		let parent = TransactionBuilder::with_output(10_000).into_transaction();
		let child = TransactionBuilder::with_input(&parent, 0).add_output(9_000).into_transaction();
		let grandchild = TransactionBuilder::with_input(&child, 0).add_output(8_000).into_transaction();

		let mut pool = MemoryPool::new();
		pool.insert_verified(parent.clone(), 100, 4);
		pool.insert_verified(child.clone(), 100, 4);
		pool.insert_verified(grandchild.clone(), 100, 4);

		let descendants = pool.descendants(&parent.hash());
		assert_eq!(descendants.len(), 2);
		assert!(descendants.contains(&child.hash()));
		assert!(descendants.contains(&grandchild.hash()));
	}
}
