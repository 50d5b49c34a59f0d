//! Hash functions used by the chain: SHA-256 and the double SHA-256
//! applied to headers, transactions and checksums.

extern crate primitives;
extern crate sha2;

use primitives::hash::H256;
use sha2::{Digest, Sha256};

pub fn sha256(input: &[u8]) -> H256 {
	let mut result = H256::default();
	result.copy_from_slice(&Sha256::digest(input));
	result
}

pub fn dhash256(input: &[u8]) -> H256 {
	sha256(&*sha256(input))
}

/// Base58check checksum: first four bytes of `dhash256`.
pub fn checksum(data: &[u8]) -> [u8; 4] {
	let hash = dhash256(data);
	let mut result = [0u8; 4];
	result.copy_from_slice(&hash[0..4]);
	result
}

#[cfg(test)]
mod tests {
	use super::{dhash256, sha256};

	#[test]
	fn test_sha256() {
		let expected = "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855".into();
		assert_eq!(sha256(b""), expected);
	}

	#[test]
	fn test_dhash256() {
		let expected = "5df6e0e2761359d30a8275058e299fcc0381534545f55cf43e41983f5d4c9456".into();
		assert_eq!(dhash256(b""), expected);
	}
}
