use hex;
use chain::{Block, Transaction};
use jsonrpc_core::Error;
use keys::{script_from_descriptor, Address, DescriptorError};
use miner::{self, ExtraNonceCounter, GeneratorError, MemoryPool, PowSeal, TemplateRequest,
	DEFAULT_MAX_TRIES};
use primitives::bytes::Bytes as GlobalBytes;
use primitives::hash::H256 as GlobalH256;
use script::Script;
use ser::deserialize;
use v1::helpers::errors;
use v1::impls::ClientCore;
use v1::traits::Generate;
use v1::types::{GenerateBlockResponse, H256};

pub struct GenerateClient {
	core: ClientCore,
}

impl GenerateClient {
	pub fn new(core: ClientCore) -> Self {
		GenerateClient { core }
	}

	fn coinbase_script_from_address(&self, address: &str) -> Result<GlobalBytes, Error> {
		Address::from_base58(address, self.core.consensus.network)
			.map(|address| address.to_script().to_bytes())
			.map_err(|_| errors::invalid_address_or_key("Error: Invalid address"))
	}

	/// An address or a descriptor, the `generateblock` way.
	fn coinbase_script_from_output(&self, output: &str) -> Result<GlobalBytes, Error> {
		match script_from_descriptor(output, self.core.consensus.network) {
			Ok(script) => Ok(script),
			Err(DescriptorError::Ranged) =>
				Err(errors::invalid_params("output", DescriptorError::Ranged)),
			Err(_) => Address::from_base58(output, self.core.consensus.network)
				.map(|address| address.to_script().to_bytes())
				.map_err(|_| errors::invalid_address_or_key("Error: Invalid address or descriptor")),
		}
	}

	fn generate(&self, count: u32, max_tries: u64, coinbase_script: GlobalBytes) -> Result<Vec<H256>, Error> {
		miner::generate_blocks(
			count,
			max_tries,
			coinbase_script,
			&self.core.assembler,
			&self.core.store,
			&self.core.mempool,
			&self.core.consensus,
			&self.core.context,
			&*self.core.validator,
			&*self.core.time_source,
		)
		.map(|hashes| hashes.into_iter().map(Into::into).collect())
		.map_err(|error| match error {
			GeneratorError::TemplateCreation(_) => errors::internal("Couldn't create new block"),
			GeneratorError::SubmitRejected(_) => errors::internal("ProcessNewBlock, block not accepted"),
		})
	}

	fn resolve_transaction(&self, raw_or_txid: &str) -> Result<Transaction, Error> {
		// a 64 character hex string is a txid referencing the mempool
		if raw_or_txid.len() == 64 {
			if let Ok(hash) = raw_or_txid.parse::<GlobalH256>() {
				let hash = hash.reversed();
				return self.core.mempool.read().get(&hash)
					.cloned()
					.ok_or_else(|| errors::invalid_address_or_key(
						format!("Transaction {} not in mempool.", raw_or_txid)));
			}
		}

		hex::decode(raw_or_txid).ok()
			.and_then(|bytes| deserialize::<Transaction>(&bytes as &[u8]).ok())
			.ok_or_else(|| errors::deserialization(format!(
				"Transaction decode failed for {}. Make sure the tx has at least one input.", raw_or_txid)))
	}

	/// Refreshes the coinbase witness commitment after the transaction set
	/// changed underneath it.
	fn regenerate_commitments(&self, block: &mut Block) {
		{
			let coinbase = &mut block.transactions[0];
			coinbase.outputs.retain(|output| {
				let script: Script = output.script_pubkey.clone().into();
				!script.is_witness_commitment()
			});
			coinbase.inputs[0].script_witness.clear();
		}

		let best_number = self.core.store.best_block().map_or(0, |best| best.number);
		if self.core.consensus.segwit_deployment.is_active_after(best_number) {
			miner::generate_coinbase_commitment(&mut block.transactions);
		}

		let hashes = block.transactions.iter().map(Transaction::hash).collect::<Vec<_>>();
		block.block_header.merkle_root_hash = ::chain::merkle_root(&hashes);
	}
}

impl Generate for GenerateClient {
	fn generate_to_address(&self, nblocks: u32, address: String, maxtries: Option<u64>) -> Result<Vec<H256>, Error> {
		let script = self.coinbase_script_from_address(&address)?;
		self.generate(nblocks, maxtries.unwrap_or(DEFAULT_MAX_TRIES), script)
	}

	fn generate_to_descriptor(&self, num_blocks: u32, descriptor: String, maxtries: Option<u64>) -> Result<Vec<H256>, Error> {
		let script = match script_from_descriptor(&descriptor, self.core.consensus.network) {
			Ok(script) => script,
			Err(DescriptorError::Ranged) =>
				return Err(errors::invalid_params("descriptor", DescriptorError::Ranged)),
			Err(error) => return Err(errors::invalid_address_or_key(error)),
		};
		self.generate(num_blocks, maxtries.unwrap_or(DEFAULT_MAX_TRIES), script)
	}

	fn generate_block(&self, output: String, transactions: Vec<String>) -> Result<GenerateBlockResponse, Error> {
		let coinbase_script = self.coinbase_script_from_output(&output)?;

		let mut included = Vec::with_capacity(transactions.len());
		for raw_or_txid in &transactions {
			included.push(self.resolve_transaction(raw_or_txid)?);
		}

		// an empty pool: only the requested transactions enter the block
		let template = {
			let empty_pool = MemoryPool::new();
			self.core.assembler.create_new_block(
				&self.core.store,
				&empty_pool,
				&self.core.consensus,
				&self.core.context,
				&*self.core.validator,
				&*self.core.time_source,
				TemplateRequest::ProofOfWork { coinbase_script },
			)
		}.map_err(|_| errors::internal("Couldn't create new block"))?;

		let mut block = template.block;
		if block.transactions.len() != 1 {
			return Err(errors::internal("fresh template has more than a coinbase"));
		}

		block.transactions.extend(included);
		self.regenerate_commitments(&mut block);

		self.core.validator
			.test_block_validity(&block, false, false, true)
			.map_err(|error| errors::verify(format!("TestBlockValidity failed: {}", error)))?;

		let mut max_tries = DEFAULT_MAX_TRIES;
		let mut extra_nonce = ExtraNonceCounter::default();
		let sealed = miner::generate_block(
			&mut block,
			template.height,
			&self.core.consensus,
			&*self.core.validator,
			&self.core.context,
			&mut extra_nonce,
			&mut max_tries,
		).map_err(|error| errors::misc(format!("Failed to make block: {}", error)))?;

		match sealed {
			Some(PowSeal::Found(hash)) => Ok(GenerateBlockResponse { hash: hash.into() }),
			_ => Err(errors::misc("Failed to make block.")),
		}
	}
}

#[cfg(test)]
mod tests {
	use jsonrpc_core::ErrorCode;
	use keys::{Address, Type};
	use network::Network;
	use test_data::TransactionBuilder;
	use ser::serialize;
	use v1::impls::test_core::regtest_core;
	use v1::traits::Generate;
	use super::GenerateClient;

	fn regtest_address() -> String {
		Address {
			kind: Type::P2PKH,
			network: Network::Regtest,
			hash: [3u8; 20].into(),
		}.to_string()
	}

	#[test]
	fn test_generate_to_address_extends_chain() {
		let client = GenerateClient::new(regtest_core());
		let hashes = client.generate_to_address(2, regtest_address(), None).unwrap();
		assert_eq!(hashes.len(), 2);
		assert_eq!(client.core.store.best_block().unwrap().number, 2);
	}

	#[test]
	fn test_generate_to_invalid_address_fails() {
		let client = GenerateClient::new(regtest_core());
		let error = client.generate_to_address(1, "definitely not an address".into(), None).unwrap_err();
		assert_eq!(error.code, ErrorCode::ServerError(-5));
	}

	#[test]
	fn test_generate_to_ranged_descriptor_fails_with_invalid_parameter() {
		let client = GenerateClient::new(regtest_core());
		let error = client.generate_to_descriptor(1, "wpkh(xpub/0/*)".into(), None).unwrap_err();
		assert_eq!(error.code, ErrorCode::ServerError(-8));
	}

	#[test]
	fn test_generate_to_key_descriptor_fails_with_invalid_key() {
		let client = GenerateClient::new(regtest_core());
		let error = client.generate_to_descriptor(1, "pkh(02aabb)".into(), None).unwrap_err();
		assert_eq!(error.code, ErrorCode::ServerError(-5));
	}

	#[test]
	fn test_generate_block_includes_raw_transaction() {
		let client = GenerateClient::new(regtest_core());
		let parent = TransactionBuilder::with_output(10_000).into_transaction();
		let spend = TransactionBuilder::with_input(&parent, 0).add_output(9_000).into_transaction();
		let raw = format!("{}", serialize(&spend));

		let descriptor = format!("addr({})", regtest_address());
		let response = client.generate_block(descriptor, vec![raw]).unwrap();

		let best = client.core.store.best_block().unwrap();
		assert_eq!(best.number, 1);
		assert_eq!(best.hash, response.hash.into());
		let block = client.core.store.block(::storage::BlockRef::Number(1)).unwrap();
		assert_eq!(block.transactions.len(), 2);
		assert_eq!(block.transactions[1].hash(), spend.hash());
	}

	#[test]
	fn test_generate_block_with_mempool_txid() {
		let client = GenerateClient::new(regtest_core());
		let tx = TransactionBuilder::with_output(10_000).into_transaction();
		client.core.mempool.write().insert_verified(tx.clone(), 1_000, 4);

		let txid = tx.hash().to_reversed_str();
		let response = client.generate_block(regtest_address(), vec![txid]).unwrap();
		let block = client.core.store.block(::storage::BlockRef::Hash(response.hash.into())).unwrap();
		assert_eq!(block.transactions[1].hash(), tx.hash());
	}

	#[test]
	fn test_generate_block_with_unknown_txid_fails() {
		let client = GenerateClient::new(regtest_core());
		let txid = "00".repeat(32);
		let error = client.generate_block(regtest_address(), vec![txid]).unwrap_err();
		assert_eq!(error.code, ErrorCode::ServerError(-5));
	}
}
