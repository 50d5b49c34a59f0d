//! Stream used for serialization.

use std::io::{self, Write};
use compact_integer::CompactInteger;
use bytes::Bytes;

/// Transaction serialization should include the witness payload.
pub const SERIALIZE_TRANSACTION_WITNESS: u32 = 0x4000_0000;

pub fn serialize<T>(t: &T) -> Bytes where T: Serializable {
	let mut stream = Stream::default();
	stream.append(t);
	stream.out()
}

pub fn serialize_with_flags<T>(t: &T, flags: u32) -> Bytes where T: Serializable {
	let mut stream = Stream::with_flags(flags);
	stream.append(t);
	stream.out()
}

pub fn serialized_list_size<T>(t: &[T]) -> usize where T: Serializable {
	CompactInteger::from(t.len()).serialized_size() +
		t.iter().map(Serializable::serialized_size).sum::<usize>()
}

pub trait Serializable {
	/// Serialize the struct and append it to the end of the stream.
	fn serialize(&self, s: &mut Stream);

	/// Size of the value on the wire.
	fn serialized_size(&self) -> usize;
}

/// Stream used for serialization of Bitcoin structures.
#[derive(Default)]
pub struct Stream {
	buffer: Vec<u8>,
	flags: u32,
}

impl Stream {
	pub fn new() -> Self {
		Stream::default()
	}

	pub fn with_flags(flags: u32) -> Self {
		Stream {
			buffer: Vec::new(),
			flags,
		}
	}

	/// Are transactions written to this stream with witness data?
	pub fn include_transaction_witness(&self) -> bool {
		(self.flags & SERIALIZE_TRANSACTION_WITNESS) != 0
	}

	/// Serializes the struct and appends it to the end of the stream.
	pub fn append<T>(&mut self, t: &T) -> &mut Self where T: Serializable {
		t.serialize(self);
		self
	}

	/// Appends raw bytes to the end of the stream.
	pub fn append_slice(&mut self, bytes: &[u8]) -> &mut Self {
		// discard the error, writing to a plain vector cannot fail
		self.buffer.write(bytes).unwrap();
		self
	}

	/// Appends a list of serializable structs to the end of the stream.
	pub fn append_list<T>(&mut self, t: &[T]) -> &mut Self where T: Serializable {
		CompactInteger::from(t.len()).serialize(self);
		for i in t {
			i.serialize(self);
		}
		self
	}

	/// Full stream.
	pub fn out(self) -> Bytes {
		self.buffer.into()
	}
}

impl Write for Stream {
	#[inline]
	fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
		self.buffer.write(buf)
	}

	#[inline]
	fn flush(&mut self) -> io::Result<()> {
		self.buffer.flush()
	}
}
