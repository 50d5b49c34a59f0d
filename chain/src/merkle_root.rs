use crypto::dhash256;
use hash::{H256, H512};
use rayon::prelude::{IntoParallelRefIterator, ParallelIterator};

#[inline]
fn concat<T>(a: T, b: T) -> H512 where T: AsRef<H256> {
	let mut result = H512::default();
	result[0..32].copy_from_slice(&**a.as_ref());
	result[32..64].copy_from_slice(&**b.as_ref());
	result
}

/// Calculates the root of the merkle tree.
pub fn merkle_root<T: AsRef<H256> + Sync>(hashes: &[T]) -> H256 {
	if hashes.is_empty() {
		return H256::default();
	}
	if hashes.len() == 1 {
		return *hashes[0].as_ref();
	}

	let mut row = Vec::with_capacity(hashes.len() / 2 + 1);
	let mut i = 0;
	while i + 1 < hashes.len() {
		row.push((&hashes[i], &hashes[i + 1]));
		i += 2;
	}

	// duplicate the last element if len is not even
	if hashes.len() % 2 == 1 {
		let last = &hashes[hashes.len() - 1];
		row.push((last, last));
	}

	// only compute in parallel if there is enough work to benefit from it
	let res: Vec<H256> = if row.len() > 250 {
		row.par_iter().map(|x| merkle_node_hash(x.0, x.1)).collect()
	} else {
		row.iter().map(|x| merkle_node_hash(x.0, x.1)).collect()
	};

	merkle_root(&res)
}

/// Calculates a merkle tree node hash.
pub fn merkle_node_hash<T>(left: T, right: T) -> H256 where T: AsRef<H256> {
	dhash256(&*concat(left, right))
}

#[cfg(test)]
mod tests {
	use hash::H256;
	use super::{merkle_node_hash, merkle_root};

	#[test]
	fn test_merkle_root_of_single_hash_is_identity() {
		let hash = H256::from(3u8);
		assert_eq!(merkle_root(&[hash]), hash);
	}

	#[test]
	fn test_merkle_root_duplicates_odd_tail() {
		// an odd list hashes its tail against itself
		let a = H256::from(1u8);
		let b = H256::from(2u8);
		let c = H256::from(3u8);

		let ab = merkle_node_hash(&a, &b);
		let cc = merkle_node_hash(&c, &c);
		let expected = merkle_node_hash(&ab, &cc);
		assert_eq!(merkle_root(&[a, b, c]), expected);
	}

	#[test]
	fn test_merkle_root_order_matters() {
		let a = H256::from(1u8);
		let b = H256::from(2u8);
		assert!(merkle_root(&[a, b]) != merkle_root(&[b, a]));
	}
}
