//! Transaction with a creation timestamp, as used by the Peercoin family
//! of chains. The timestamp participates in the PoS kernel.

use hex;
use bytes::Bytes;
use constants::{LOCKTIME_THRESHOLD, SEQUENCE_FINAL, WITNESS_SCALE_FACTOR};
use crypto::dhash256;
use hash::H256;
use ser::{deserialize, serialize, serialize_with_flags, CompactInteger, Deserializable,
	Error as ReaderError, Reader, Serializable, Stream, SERIALIZE_TRANSACTION_WITNESS};

#[derive(Debug, PartialEq, Eq, Clone, Default, Hash)]
pub struct OutPoint {
	pub hash: H256,
	pub index: u32,
}

impl OutPoint {
	pub fn null() -> Self {
		OutPoint {
			hash: H256::default(),
			index: u32::max_value(),
		}
	}

	pub fn is_null(&self) -> bool {
		self.hash.is_zero() && self.index == u32::max_value()
	}
}

impl Serializable for OutPoint {
	fn serialize(&self, stream: &mut Stream) {
		stream
			.append(&self.hash)
			.append(&self.index);
	}

	fn serialized_size(&self) -> usize {
		36
	}
}

impl Deserializable for OutPoint {
	fn deserialize(reader: &mut Reader) -> Result<Self, ReaderError> {
		Ok(OutPoint {
			hash: reader.read()?,
			index: reader.read()?,
		})
	}
}

#[derive(Debug, PartialEq, Default, Clone)]
pub struct TransactionInput {
	pub previous_output: OutPoint,
	pub script_sig: Bytes,
	pub sequence: u32,
	pub script_witness: Vec<Bytes>,
}

impl TransactionInput {
	pub fn coinbase(script_sig: Bytes) -> Self {
		TransactionInput {
			previous_output: OutPoint::null(),
			script_sig,
			sequence: SEQUENCE_FINAL,
			script_witness: vec![],
		}
	}

	pub fn is_final(&self) -> bool {
		self.sequence == SEQUENCE_FINAL
	}

	pub fn has_witness(&self) -> bool {
		!self.script_witness.is_empty()
	}
}

impl Serializable for TransactionInput {
	fn serialize(&self, stream: &mut Stream) {
		stream
			.append(&self.previous_output)
			.append(&self.script_sig)
			.append(&self.sequence);
	}

	fn serialized_size(&self) -> usize {
		self.previous_output.serialized_size() +
			self.script_sig.serialized_size() +
			4
	}
}

impl Deserializable for TransactionInput {
	fn deserialize(reader: &mut Reader) -> Result<Self, ReaderError> {
		Ok(TransactionInput {
			previous_output: reader.read()?,
			script_sig: reader.read()?,
			sequence: reader.read()?,
			script_witness: vec![],
		})
	}
}

#[derive(Debug, PartialEq, Clone)]
pub struct TransactionOutput {
	pub value: u64,
	pub script_pubkey: Bytes,
}

impl Default for TransactionOutput {
	fn default() -> Self {
		TransactionOutput {
			value: 0,
			script_pubkey: Bytes::default(),
		}
	}
}

impl TransactionOutput {
	/// The empty output marking a coinstake transaction.
	pub fn empty() -> Self {
		TransactionOutput::default()
	}

	pub fn is_empty(&self) -> bool {
		self.value == 0 && self.script_pubkey.is_empty()
	}
}

impl Serializable for TransactionOutput {
	fn serialize(&self, stream: &mut Stream) {
		stream
			.append(&self.value)
			.append(&self.script_pubkey);
	}

	fn serialized_size(&self) -> usize {
		8 + self.script_pubkey.serialized_size()
	}
}

impl Deserializable for TransactionOutput {
	fn deserialize(reader: &mut Reader) -> Result<Self, ReaderError> {
		Ok(TransactionOutput {
			value: reader.read()?,
			script_pubkey: reader.read()?,
		})
	}
}

#[derive(Debug, PartialEq, Default, Clone)]
pub struct Transaction {
	pub version: i32,
	/// Creation time. Masked by the stake timestamp mask for coinstakes.
	pub time: u32,
	pub inputs: Vec<TransactionInput>,
	pub outputs: Vec<TransactionOutput>,
	pub lock_time: u32,
}

impl From<&'static str> for Transaction {
	fn from(s: &'static str) -> Self {
		deserialize(&hex::decode(s).unwrap() as &[u8]).unwrap()
	}
}

impl Transaction {
	/// Transaction id: the hash of the serialization without witness data.
	pub fn hash(&self) -> H256 {
		dhash256(&serialize(self))
	}

	/// Hash of the serialization including witness data.
	pub fn witness_hash(&self) -> H256 {
		dhash256(&serialize_with_flags(self, SERIALIZE_TRANSACTION_WITNESS))
	}

	pub fn has_witness(&self) -> bool {
		self.inputs.iter().any(TransactionInput::has_witness)
	}

	pub fn is_empty(&self) -> bool {
		self.inputs.is_empty() || self.outputs.is_empty()
	}

	pub fn is_coinbase(&self) -> bool {
		self.inputs.len() == 1 && self.inputs[0].previous_output.is_null()
	}

	/// A coinstake spends a real previous output into a first empty output.
	pub fn is_coinstake(&self) -> bool {
		!self.inputs.is_empty() &&
			!self.inputs[0].previous_output.is_null() &&
			self.outputs.len() >= 2 &&
			self.outputs[0].is_empty()
	}

	pub fn is_final_in_block(&self, block_height: u32, block_time: u32) -> bool {
		if self.lock_time == 0 {
			return true;
		}

		let max_lock_time = if self.lock_time < LOCKTIME_THRESHOLD {
			block_height
		} else {
			block_time
		};

		if self.lock_time < max_lock_time {
			return true;
		}

		self.inputs.iter().all(TransactionInput::is_final)
	}

	pub fn total_spends(&self) -> u64 {
		self.outputs.iter().fold(0u64, |acc, output| acc.saturating_add(output.value))
	}

	/// Serialized size without witness data.
	pub fn base_size(&self) -> usize {
		serialize(self).len()
	}

	/// Serialized size including witness data.
	pub fn total_size(&self) -> usize {
		serialize_with_flags(self, SERIALIZE_TRANSACTION_WITNESS).len()
	}

	/// Block weight contributed by this transaction.
	pub fn weight(&self) -> usize {
		self.base_size() * (WITNESS_SCALE_FACTOR - 1) + self.total_size()
	}

	/// Virtual size used for feerate accounting.
	pub fn virtual_size(&self) -> usize {
		(self.weight() + WITNESS_SCALE_FACTOR - 1) / WITNESS_SCALE_FACTOR
	}
}

impl Serializable for Transaction {
	fn serialize(&self, stream: &mut Stream) {
		let include_witness = stream.include_transaction_witness() && self.has_witness();
		stream
			.append(&self.version)
			.append(&self.time);

		if include_witness {
			// segwit marker + flag
			stream
				.append(&0u8)
				.append(&1u8);
		}

		stream
			.append_list(&self.inputs)
			.append_list(&self.outputs);

		if include_witness {
			for input in &self.inputs {
				stream.append_list(&input.script_witness);
			}
		}

		stream.append(&self.lock_time);
	}

	fn serialized_size(&self) -> usize {
		serialize(self).len()
	}
}

impl Deserializable for Transaction {
	fn deserialize(reader: &mut Reader) -> Result<Self, ReaderError> {
		let version = reader.read()?;
		let time = reader.read()?;

		let mut inputs: Vec<TransactionInput> = Vec::new();
		let mut read_witness = false;
		if reader.peek_u8()? == 0 {
			// segwit marker, the flag byte must follow
			let _marker: u8 = reader.read()?;
			let flag: u8 = reader.read()?;
			if flag != 1 {
				return Err(ReaderError::MalformedData);
			}
			read_witness = true;
		}

		let input_count: usize = reader.read::<CompactInteger>()?.into();
		for _ in 0..input_count {
			inputs.push(reader.read()?);
		}
		let outputs = reader.read_list()?;

		if read_witness {
			for input in inputs.iter_mut() {
				input.script_witness = reader.read_list()?;
			}
		}

		Ok(Transaction {
			version,
			time,
			inputs,
			outputs,
			lock_time: reader.read()?,
		})
	}
}
