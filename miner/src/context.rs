use std::sync::atomic::{AtomicBool, AtomicI64, Ordering};
use std::time::Duration;
use hash::H256;
use parking_lot::{Condvar, Mutex};

/// Template statistics of the most recent assembly.
#[derive(Debug, Default, PartialEq, Clone, Copy)]
pub struct TemplateStats {
	pub num_txs: u32,
	pub weight: u32,
}

/// Process-wide mining state shared between the assembler, the miners and
/// the RPC façade: staking switches, readiness warnings, the longpoll
/// wakeup and the coinstake search bookkeeping.
pub struct MiningContext {
	enable_staking: AtomicBool,
	shutdown: AtomicBool,
	last_coin_stake_search_time: AtomicI64,
	last_coin_stake_search_interval: AtomicI64,
	last_template_stats: Mutex<Option<TemplateStats>>,
	warning: Mutex<String>,
	best_block: Mutex<H256>,
	best_block_changed: Condvar,
	sleep_lock: Mutex<()>,
	sleep_wakeup: Condvar,
}

impl MiningContext {
	pub fn new(best_block: H256, startup_time: u32) -> Self {
		MiningContext {
			enable_staking: AtomicBool::new(false),
			shutdown: AtomicBool::new(false),
			last_coin_stake_search_time: AtomicI64::new(startup_time as i64),
			last_coin_stake_search_interval: AtomicI64::new(0),
			last_template_stats: Mutex::new(None),
			warning: Mutex::new(String::new()),
			best_block: Mutex::new(best_block),
			best_block_changed: Condvar::new(),
			sleep_lock: Mutex::new(()),
			sleep_wakeup: Condvar::new(),
		}
	}

	pub fn is_staking_enabled(&self) -> bool {
		self.enable_staking.load(Ordering::SeqCst)
	}

	pub fn set_staking_enabled(&self, enabled: bool) {
		self.enable_staking.store(enabled, Ordering::SeqCst);
		if !enabled {
			self.wake_sleepers();
		}
	}

	pub fn is_shutdown_requested(&self) -> bool {
		self.shutdown.load(Ordering::SeqCst)
	}

	pub fn request_shutdown(&self) {
		self.shutdown.store(true, Ordering::SeqCst);
		self.wake_sleepers();
	}

	/// Sleeps unless woken by shutdown or a staking switch. Returns false
	/// when the caller should stop working.
	pub fn interruptible_sleep(&self, duration: Duration) -> bool {
		{
			let mut guard = self.sleep_lock.lock();
			self.sleep_wakeup.wait_for(&mut guard, duration);
		}
		!self.is_shutdown_requested()
	}

	fn wake_sleepers(&self) {
		let _guard = self.sleep_lock.lock();
		self.sleep_wakeup.notify_all();
	}

	/// Coinstake search bookkeeping, in seconds.
	pub fn last_coin_stake_search_time(&self) -> i64 {
		self.last_coin_stake_search_time.load(Ordering::SeqCst)
	}

	pub fn record_coin_stake_search(&self, search_time: i64) {
		let last = self.last_coin_stake_search_time.swap(search_time, Ordering::SeqCst);
		self.last_coin_stake_search_interval.store(search_time - last, Ordering::SeqCst);
	}

	pub fn last_coin_stake_search_interval(&self) -> i64 {
		self.last_coin_stake_search_interval.load(Ordering::SeqCst)
	}

	pub fn reset_coin_stake_search_interval(&self) {
		self.last_coin_stake_search_interval.store(0, Ordering::SeqCst);
	}

	pub fn record_template_stats(&self, num_txs: u32, weight: u32) {
		*self.last_template_stats.lock() = Some(TemplateStats { num_txs, weight });
	}

	pub fn template_stats(&self) -> Option<TemplateStats> {
		*self.last_template_stats.lock()
	}

	/// Updates the process-wide readiness warning. Returns true when the
	/// message actually changed, so callers notify the UI exactly once.
	pub fn set_warning(&self, message: &str) -> bool {
		let mut warning = self.warning.lock();
		if *warning == message {
			return false;
		}
		*warning = message.to_owned();
		true
	}

	pub fn warning(&self) -> String {
		self.warning.lock().clone()
	}

	/// Records a new best block and wakes longpolling clients.
	pub fn notify_new_best_block(&self, hash: H256) {
		let mut best_block = self.best_block.lock();
		*best_block = hash;
		self.best_block_changed.notify_all();
	}

	pub fn best_block(&self) -> H256 {
		*self.best_block.lock()
	}

	/// Blocks until the best block hash differs from `current` or the
	/// timeout elapses. Returns true when the tip changed.
	pub fn wait_for_best_block_change(&self, current: &H256, timeout: Duration) -> bool {
		let mut best_block = self.best_block.lock();
		if *best_block != *current {
			return true;
		}
		self.best_block_changed.wait_for(&mut best_block, timeout);
		*best_block != *current
	}
}
