use bytes::Bytes;
use opcode::*;
use primitives::hash::H160;
use script::Script;

/// Script builder.
#[derive(Default)]
pub struct Builder {
	data: Bytes,
}

impl Builder {
	/// Appends a minimally encoded script number push. Used for the block
	/// height and extra nonce in coinbase scriptSigs.
	pub fn push_num(mut self, value: i64) -> Self {
		if value == 0 {
			self.data.push(OP_0);
			return self;
		}
		if value == -1 {
			self.data.push(OP_1NEGATE);
			return self;
		}
		if value >= 1 && value <= 16 {
			self.data.push(OP_1 + (value as u8 - 1));
			return self;
		}

		// little-endian magnitude with a sign bit in the top byte
		let negative = value < 0;
		let mut absolute = value.unsigned_abs();
		let mut payload: Vec<u8> = Vec::new();
		while absolute > 0 {
			payload.push((absolute & 0xff) as u8);
			absolute >>= 8;
		}
		if payload.last().map_or(false, |last| last & 0x80 != 0) {
			payload.push(if negative { 0x80 } else { 0x00 });
		} else if negative {
			let last = payload.len() - 1;
			payload[last] |= 0x80;
		}

		self.push_data(&payload)
	}

	/// Appends a data push with the shortest possible push opcode.
	pub fn push_data(mut self, data: &[u8]) -> Self {
		let len = data.len();
		if len < OP_PUSHDATA1 as usize {
			self.data.push(len as u8);
		} else if len <= 0xff {
			self.data.push(OP_PUSHDATA1);
			self.data.push(len as u8);
		} else if len <= 0xffff {
			self.data.push(OP_PUSHDATA2);
			self.data.push((len & 0xff) as u8);
			self.data.push((len >> 8) as u8);
		} else {
			self.data.push(OP_PUSHDATA4);
			self.data.push((len & 0xff) as u8);
			self.data.push(((len >> 8) & 0xff) as u8);
			self.data.push(((len >> 16) & 0xff) as u8);
			self.data.push((len >> 24) as u8);
		}
		self.data.extend_from_slice(data);
		self
	}

	pub fn push_opcode(mut self, opcode: u8) -> Self {
		self.data.push(opcode);
		self
	}

	pub fn into_script(self) -> Script {
		self.data.into()
	}

	pub fn into_bytes(self) -> Bytes {
		self.data
	}

	/// Standard pay-to-pubkey-hash output script.
	pub fn build_p2pkh(address_hash: &H160) -> Script {
		Builder::default()
			.push_opcode(OP_DUP)
			.push_opcode(OP_HASH160)
			.push_data(&**address_hash)
			.push_opcode(OP_EQUALVERIFY)
			.push_opcode(OP_CHECKSIG)
			.into_script()
	}

	/// Standard pay-to-script-hash output script.
	pub fn build_p2sh(script_hash: &H160) -> Script {
		Builder::default()
			.push_opcode(OP_HASH160)
			.push_data(&**script_hash)
			.push_opcode(OP_EQUAL)
			.into_script()
	}
}
