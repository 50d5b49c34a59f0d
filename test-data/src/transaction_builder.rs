use chain::{OutPoint, Transaction, TransactionInput, TransactionOutput};
use primitives::bytes::Bytes;

/// Fluent builder of test transactions.
#[derive(Debug, Default, Clone)]
pub struct TransactionBuilder {
	transaction: Transaction,
}

impl TransactionBuilder {
	pub fn with_version(version: i32) -> TransactionBuilder {
		TransactionBuilder::default().set_version(version)
	}

	pub fn with_output(value: u64) -> TransactionBuilder {
		TransactionBuilder::default().add_output(value)
	}

	pub fn with_input(transaction: &Transaction, output_index: u32) -> TransactionBuilder {
		TransactionBuilder::default().add_input(transaction, output_index)
	}

	/// A coinbase-shaped transaction.
	pub fn coinbase() -> TransactionBuilder {
		let mut builder = TransactionBuilder::default();
		builder.transaction.inputs.push(TransactionInput::coinbase(Bytes::default()));
		builder.add_output(0)
	}

	pub fn set_version(mut self, version: i32) -> TransactionBuilder {
		self.transaction.version = version;
		self
	}

	pub fn set_time(mut self, time: u32) -> TransactionBuilder {
		self.transaction.time = time;
		self
	}

	pub fn set_lock_time(mut self, lock_time: u32) -> TransactionBuilder {
		self.transaction.lock_time = lock_time;
		self
	}

	pub fn add_output(mut self, value: u64) -> TransactionBuilder {
		self.transaction.outputs.push(TransactionOutput {
			value,
			script_pubkey: Bytes::default(),
		});
		self
	}

	pub fn add_input(mut self, transaction: &Transaction, output_index: u32) -> TransactionBuilder {
		self.transaction.inputs.push(TransactionInput {
			previous_output: OutPoint {
				hash: transaction.hash(),
				index: output_index,
			},
			script_sig: Bytes::default(),
			sequence: 0xffff_ffff,
			script_witness: vec![],
		});
		self
	}

	pub fn add_input_with_sequence(mut self, transaction: &Transaction, output_index: u32, sequence: u32) -> TransactionBuilder {
		self.transaction.inputs.push(TransactionInput {
			previous_output: OutPoint {
				hash: transaction.hash(),
				index: output_index,
			},
			script_sig: Bytes::default(),
			sequence,
			script_witness: vec![],
		});
		self
	}

	pub fn add_witness(mut self, witness: Vec<Bytes>) -> TransactionBuilder {
		let input = self.transaction.inputs.last_mut()
			.expect("add_witness follows add_input in builders");
		input.script_witness = witness;
		self
	}

	pub fn into_transaction(self) -> Transaction {
		self.transaction
	}

	pub fn hash(&self) -> ::primitives::hash::H256 {
		self.transaction.hash()
	}
}

impl Into<Transaction> for TransactionBuilder {
	fn into(self) -> Transaction {
		self.transaction
	}
}
