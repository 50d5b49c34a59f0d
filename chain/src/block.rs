use hex;
use bytes::Bytes;
use hash::H256;
use merkle_root::merkle_root;
use ser::{deserialize, Deserializable, Error as ReaderError, Reader, Serializable, Stream};
use {BlockHeader, Transaction};

/// Block of the hybrid chain. Proof-of-stake blocks additionally carry a
/// signature made with the key of the staked output.
#[derive(Debug, PartialEq, Clone)]
pub struct Block {
	pub block_header: BlockHeader,
	pub transactions: Vec<Transaction>,
	pub signature: Bytes,
}

impl From<&'static str> for Block {
	fn from(s: &'static str) -> Self {
		deserialize(&hex::decode(s).unwrap() as &[u8]).unwrap()
	}
}

impl Block {
	pub fn new(header: BlockHeader, transactions: Vec<Transaction>) -> Self {
		Block {
			block_header: header,
			transactions,
			signature: Bytes::default(),
		}
	}

	/// Returns block's merkle root.
	pub fn merkle_root(&self) -> H256 {
		let hashes = self.transactions.iter().map(Transaction::hash).collect::<Vec<H256>>();
		merkle_root(&hashes)
	}

	/// Returns block's witness merkle root: the coinbase slot is zeroed.
	pub fn witness_merkle_root(&self) -> H256 {
		let hashes = match self.transactions.split_first() {
			None => vec![],
			Some((_, rest)) => {
				let mut hashes = vec![H256::default()];
				hashes.extend(rest.iter().map(Transaction::witness_hash));
				hashes
			},
		};
		merkle_root(&hashes)
	}

	pub fn transactions(&self) -> &[Transaction] {
		&self.transactions
	}

	pub fn header(&self) -> &BlockHeader {
		&self.block_header
	}

	pub fn hash(&self) -> H256 {
		self.block_header.hash()
	}

	/// A block is proof-of-stake when its second transaction is a coinstake.
	pub fn is_proof_of_stake(&self) -> bool {
		self.transactions.len() > 1 && self.transactions[1].is_coinstake()
	}

	pub fn block_time(&self) -> u32 {
		self.block_header.time
	}

	/// The latest transaction timestamp in the block.
	pub fn max_transaction_time(&self) -> u32 {
		self.transactions.iter().map(|tx| tx.time).max().unwrap_or(0)
	}

	/// Total block weight with witness discounting.
	pub fn weight(&self) -> usize {
		self.transactions.iter().map(Transaction::weight).sum()
	}
}

impl Serializable for Block {
	fn serialize(&self, stream: &mut Stream) {
		stream
			.append(&self.block_header)
			.append_list(&self.transactions)
			.append(&self.signature);
	}

	fn serialized_size(&self) -> usize {
		self.block_header.serialized_size() +
			::ser::serialized_list_size(&self.transactions) +
			self.signature.serialized_size()
	}
}

impl Deserializable for Block {
	fn deserialize(reader: &mut Reader) -> Result<Self, ReaderError> {
		Ok(Block {
			block_header: reader.read()?,
			transactions: reader.read_list()?,
			signature: reader.read()?,
		})
	}
}

#[cfg(test)]
mod tests {
	use bytes::Bytes;
	use ser::{deserialize, serialize};
	use transaction::{OutPoint, Transaction, TransactionInput, TransactionOutput};
	use BlockHeader;
	use super::Block;

	fn coinbase() -> Transaction {
		Transaction {
			version: 1,
			time: 10,
			inputs: vec![TransactionInput::coinbase(Bytes::default())],
			outputs: vec![TransactionOutput { value: 50, script_pubkey: "51".into() }],
			lock_time: 0,
		}
	}

	fn coinstake() -> Transaction {
		Transaction {
			version: 1,
			time: 12,
			inputs: vec![TransactionInput {
				previous_output: OutPoint { hash: 7u8.into(), index: 0 },
				script_sig: Bytes::default(),
				sequence: 0xffffffff,
				script_witness: vec![],
			}],
			outputs: vec![TransactionOutput::empty(), TransactionOutput { value: 60, script_pubkey: "51".into() }],
			lock_time: 0,
		}
	}

	fn header() -> BlockHeader {
		BlockHeader {
			version: 1,
			previous_header_hash: Default::default(),
			merkle_root_hash: Default::default(),
			time: 12,
			bits: 0x207fffff.into(),
			nonce: 0,
		}
	}

	#[test]
	fn test_block_serialization_roundtrip() {
		let block = Block::new(header(), vec![coinbase()]);
		let serialized = serialize(&block);
		let parsed: Block = deserialize(&serialized).unwrap();
		assert_eq!(parsed, block);
	}

	#[test]
	fn test_proof_of_stake_detection() {
		let pow_block = Block::new(header(), vec![coinbase()]);
		assert!(!pow_block.is_proof_of_stake());

		let pos_block = Block::new(header(), vec![coinbase(), coinstake()]);
		assert!(pos_block.is_proof_of_stake());
	}

	#[test]
	fn test_max_transaction_time() {
		let block = Block::new(header(), vec![coinbase(), coinstake()]);
		assert_eq!(block.max_transaction_time(), 12);
	}

	#[test]
	fn test_merkle_root_of_single_transaction() {
		let block = Block::new(header(), vec![coinbase()]);
		assert_eq!(block.merkle_root(), block.transactions[0].hash());
	}
}
