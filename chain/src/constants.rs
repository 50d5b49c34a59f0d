//! Consensus-critical constants shared by assembly and verification.

/// Sequence number that disables all time locks of an input.
pub const SEQUENCE_FINAL: u32 = 0xffff_ffff;

/// Below this threshold `lock_time` is interpreted as a block number,
/// otherwise as a unix timestamp.
pub const LOCKTIME_THRESHOLD: u32 = 500_000_000;

/// Lock time constraints are measured against median time past.
pub const LOCKTIME_VERIFY_FLAG_MEDIAN_TIME_PAST: u32 = 1 << 0;

/// Standard locktime flags applied to every assembled block.
pub const STANDARD_LOCKTIME_VERIFY_FLAGS: u32 = LOCKTIME_VERIFY_FLAG_MEDIAN_TIME_PAST;

/// Factor by which witness data is discounted in block weight.
pub const WITNESS_SCALE_FACTOR: usize = 4;

/// One coin in its smallest unit.
pub const COIN: u64 = 100_000_000;

/// Interim static feerate reported by the `estimatefee` RPC.
pub const TX_FEE_PER_KB: u64 = 10_000;
