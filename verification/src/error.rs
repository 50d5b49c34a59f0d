use std::fmt;

/// Reasons a produced or submitted block is judged invalid.
#[derive(Debug, PartialEq, Clone)]
pub enum Error {
	/// Block hash does not satisfy `bits`.
	Pow,
	/// No transactions in the block.
	Empty,
	/// First transaction is not a coinbase.
	Coinbase,
	/// A coinbase at a position other than 0.
	MisplacedCoinbase(usize),
	/// Merkle root does not commit to the transactions.
	MerkleRoot,
	/// A transaction is not final at the block's height and time.
	NonFinalBlock,
	/// Block weight over the consensus limit.
	Weight(usize),
	/// Too many signature operations.
	MaximumSigops,
	/// Parent is not the current best block.
	WrongParent,
	/// Coinstake timestamp violates the stake rules.
	BadStakeTime,
	/// Proof-of-stake kernel check failed.
	ProofOfStake,
	/// The chain store refused the block.
	Database(String),
}

impl Error {
	/// Short reject reason in the BIP22 convention.
	pub fn reject_reason(&self) -> &'static str {
		match *self {
			Error::Pow => "high-hash",
			Error::Empty => "bad-blk-length",
			Error::Coinbase => "bad-cb-missing",
			Error::MisplacedCoinbase(_) => "bad-cb-multiple",
			Error::MerkleRoot => "bad-txnmrklroot",
			Error::NonFinalBlock => "bad-txns-nonfinal",
			Error::Weight(_) => "bad-blk-weight",
			Error::MaximumSigops => "bad-blk-sigops",
			Error::WrongParent => "inconclusive-not-best-prevblk",
			Error::BadStakeTime => "bad-stake-time",
			Error::ProofOfStake => "bad-stake-kernel",
			Error::Database(_) => "rejected",
		}
	}
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match *self {
			Error::MisplacedCoinbase(index) => write!(f, "coinbase at transaction index {}", index),
			Error::Weight(weight) => write!(f, "block weight {} over the limit", weight),
			Error::Database(ref error) => write!(f, "chain store rejected the block: {}", error),
			ref error => error.reject_reason().fmt(f),
		}
	}
}
