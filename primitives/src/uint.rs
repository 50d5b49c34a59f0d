//! Big unsigned integers used for difficulty targets and chain work.

pub use primitive_types::U256;

use hash::H256;

/// Interprets a block hash as a 256-bit little-endian number.
pub fn u256_from_hash(hash: &H256) -> U256 {
	U256::from_little_endian(&**hash)
}

/// Lowers a 256-bit number into hash representation (little-endian).
pub fn hash_from_u256(value: &U256) -> H256 {
	let mut bytes = [0u8; 32];
	value.to_little_endian(&mut bytes);
	bytes.into()
}

/// Lossy conversion for estimates and display.
pub fn u256_to_f64(value: &U256) -> f64 {
	value.0.iter().rev().fold(0f64, |acc, &limb| acc * 18_446_744_073_709_551_616f64 + limb as f64)
}
