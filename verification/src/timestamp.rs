use std::collections::BTreeSet;
use chain::BlockHeader;
use hash::H256;
use storage::{BlockAncestors, BlockHeaderProvider};

/// Median timestamp of the eleven blocks preceding the given header.
pub fn median_timestamp(header: &BlockHeader, store: &dyn BlockHeaderProvider) -> u32 {
	median_timestamp_inclusive(header.previous_header_hash, store)
}

/// Median timestamp of the eleven blocks ending at the given one.
pub fn median_timestamp_inclusive(previous_header_hash: H256, store: &dyn BlockHeaderProvider) -> u32 {
	let timestamps: BTreeSet<_> = BlockAncestors::new(previous_header_hash.into(), store)
		.take(11)
		.map(|header| header.time)
		.collect();

	if timestamps.is_empty() {
		return 0;
	}

	let timestamps = timestamps.into_iter().collect::<Vec<_>>();
	timestamps[timestamps.len() / 2]
}
