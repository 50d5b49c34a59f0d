//! Supported chains and their invariant parameters.

use chain::{Block, BlockHeader, Transaction, TransactionInput, TransactionOutput};
use primitives::bytes::Bytes;
use uint::U256;

const MAGIC_MAINNET: u32 = 0x4d4e5450; // "PTNM"
const MAGIC_TESTNET: u32 = 0x544e5450; // "PTNT"
const MAGIC_REGTEST: u32 = 0x524e5450; // "PTNR"

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Network {
	Mainnet,
	Testnet,
	Regtest,
}

impl Network {
	pub fn magic(&self) -> u32 {
		match *self {
			Network::Mainnet => MAGIC_MAINNET,
			Network::Testnet => MAGIC_TESTNET,
			Network::Regtest => MAGIC_REGTEST,
		}
	}

	pub fn name(&self) -> &'static str {
		match *self {
			Network::Mainnet => "main",
			Network::Testnet => "test",
			Network::Regtest => "regtest",
		}
	}

	/// Proof-of-work target limit.
	pub fn max_bits(&self) -> U256 {
		match *self {
			Network::Mainnet => U256::MAX >> 20,
			Network::Testnet => U256::MAX >> 16,
			Network::Regtest => U256::MAX >> 1,
		}
	}

	/// Proof-of-stake target limit.
	pub fn max_stake_bits(&self) -> U256 {
		match *self {
			Network::Mainnet => U256::MAX >> 24,
			Network::Testnet => U256::MAX >> 16,
			Network::Regtest => U256::MAX >> 1,
		}
	}

	/// Test chains skip connectivity and sync preconditions when mining.
	pub fn is_test_chain(&self) -> bool {
		match *self {
			Network::Mainnet => false,
			Network::Testnet | Network::Regtest => true,
		}
	}

	/// Only regtest allows overriding the block version and mining at will.
	pub fn mine_blocks_on_demand(&self) -> bool {
		*self == Network::Regtest
	}

	pub fn p2pkh_address_version(&self) -> u8 {
		match *self {
			Network::Mainnet => 55,
			Network::Testnet | Network::Regtest => 111,
		}
	}

	pub fn p2sh_address_version(&self) -> u8 {
		match *self {
			Network::Mainnet => 117,
			Network::Testnet | Network::Regtest => 196,
		}
	}

	fn genesis_time(&self) -> u32 {
		match *self {
			Network::Mainnet => 1_393_221_600,
			Network::Testnet => 1_393_221_600,
			Network::Regtest => 1_393_221_600,
		}
	}
}

/// Deterministically built first block of the chain.
pub fn genesis_block(network: Network) -> Block {
	let coinbase = Transaction {
		version: 1,
		time: network.genesis_time(),
		inputs: vec![TransactionInput::coinbase(
			// arbitrary data, conventionally the launch headline
			Bytes::from(&b"pmint genesis"[..]),
		)],
		outputs: vec![TransactionOutput::default()],
		lock_time: 0,
	};

	let header = BlockHeader {
		version: 1,
		previous_header_hash: Default::default(),
		merkle_root_hash: coinbase.hash(),
		time: network.genesis_time(),
		bits: network.max_bits().into(),
		nonce: 0,
	};

	Block::new(header, vec![coinbase])
}
