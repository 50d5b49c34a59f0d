//! Mock collaborators shared by the miner tests.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use chain::{Block, OutPoint, Transaction, TransactionInput, TransactionOutput};
use compact::Compact;
use hash::H256;
use parking_lot::Mutex;
use verification::{BlockCheckedListener, BlockStatus, BlockValidator, Error};
use status::SyncStatus;
use wallet::StakingWallet;

#[derive(Default)]
pub struct MockValidator {
	pub processed: Mutex<Vec<H256>>,
	pub reject_submissions: bool,
	pub reject_kernels: bool,
}

impl MockValidator {
	pub fn rejecting() -> Self {
		MockValidator {
			reject_submissions: true,
			..Default::default()
		}
	}

	pub fn processed_hashes(&self) -> Vec<H256> {
		self.processed.lock().clone()
	}
}

impl BlockValidator for MockValidator {
	fn test_block_validity(&self, _block: &Block, _check_pow: bool, _check_merkle_root: bool, _check_signet: bool) -> Result<(), Error> {
		Ok(())
	}

	fn process_new_block(&self, block: &Block, _force_processing: bool) -> Result<bool, Error> {
		if self.reject_submissions {
			return Err(Error::Pow);
		}
		self.processed.lock().push(block.hash());
		Ok(true)
	}

	fn check_proof_of_stake(&self, _previous_header_hash: &H256, _coinstake: &Transaction, _bits: Compact, _stake_time: u32) -> bool {
		!self.reject_kernels
	}

	fn check_kernel(&self, _previous_header_hash: &H256, _bits: Compact, _time: u32, _prev_out: &OutPoint) -> bool {
		!self.reject_kernels
	}

	fn block_status(&self, _hash: &H256) -> BlockStatus {
		BlockStatus::Absent
	}

	fn register_listener(&self, _listener: Arc<dyn BlockCheckedListener>) {
	}

	fn unregister_listener(&self, _listener: &Arc<dyn BlockCheckedListener>) {
	}
}

pub struct MockWallet {
	pub locked: AtomicBool,
	pub has_kernel: AtomicBool,
	pub sign_ok: AtomicBool,
	pub abandon_calls: AtomicUsize,
}

impl MockWallet {
	pub fn with_kernel() -> Self {
		MockWallet {
			locked: AtomicBool::new(false),
			has_kernel: AtomicBool::new(true),
			sign_ok: AtomicBool::new(true),
			abandon_calls: AtomicUsize::new(0),
		}
	}

	pub fn without_kernel() -> Self {
		let wallet = MockWallet::with_kernel();
		wallet.has_kernel.store(false, Ordering::SeqCst);
		wallet
	}

	pub fn locked() -> Self {
		let wallet = MockWallet::with_kernel();
		wallet.locked.store(true, Ordering::SeqCst);
		wallet
	}
}

impl StakingWallet for MockWallet {
	fn is_locked(&self) -> bool {
		self.locked.load(Ordering::SeqCst)
	}

	fn abandon_orphaned_coinstakes(&self) {
		self.abandon_calls.fetch_add(1, Ordering::SeqCst);
	}

	fn create_coinstake(&self, _bits: Compact, _search_interval: i64, time: u32, _fees: u64) -> Option<Transaction> {
		if !self.has_kernel.load(Ordering::SeqCst) {
			return None;
		}
		Some(Transaction {
			version: 1,
			time,
			inputs: vec![TransactionInput {
				previous_output: OutPoint { hash: 9u8.into(), index: 0 },
				script_sig: Default::default(),
				sequence: 0xffff_ffff,
				script_witness: vec![],
			}],
			outputs: vec![
				TransactionOutput::empty(),
				TransactionOutput { value: 60_0000_0000, script_pubkey: Default::default() },
			],
			lock_time: 0,
		})
	}

	fn sign_block(&self, block: &mut Block) -> bool {
		if !self.sign_ok.load(Ordering::SeqCst) {
			return false;
		}
		block.signature = vec![0xaa].into();
		true
	}

	fn stake_weight(&self) -> u64 {
		if self.has_kernel.load(Ordering::SeqCst) { 1_000 } else { 0 }
	}

	fn available_coins_count(&self) -> usize {
		4
	}
}

pub struct MockSyncStatus {
	pub peers: AtomicUsize,
	pub ibd: AtomicBool,
	pub progress: Mutex<f64>,
}

impl MockSyncStatus {
	pub fn synced() -> Self {
		MockSyncStatus {
			peers: AtomicUsize::new(1),
			ibd: AtomicBool::new(false),
			progress: Mutex::new(1.0),
		}
	}
}

impl SyncStatus for MockSyncStatus {
	fn peers_count(&self) -> usize {
		self.peers.load(Ordering::SeqCst)
	}

	fn is_initial_block_download(&self) -> bool {
		self.ibd.load(Ordering::SeqCst)
	}

	fn verification_progress(&self) -> f64 {
		*self.progress.lock()
	}
}
