use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use bytes::Bytes;
use compact::Compact;
use compact_integer::CompactInteger;
use hash::{H160, H256, H512};
use {Deserializable, Error, Reader, Serializable, Stream};

macro_rules! impl_ser_for_int {
	($int: ty, $size: expr, $write_fn: ident, $read_fn: ident) => {
		impl Serializable for $int {
			#[inline]
			fn serialize(&self, s: &mut Stream) {
				s.$write_fn::<LittleEndian>(*self).unwrap();
			}

			#[inline]
			fn serialized_size(&self) -> usize {
				$size
			}
		}

		impl Deserializable for $int {
			#[inline]
			fn deserialize(reader: &mut Reader) -> Result<Self, Error> {
				Ok(reader.$read_fn::<LittleEndian>()?)
			}
		}
	}
}

impl Serializable for bool {
	#[inline]
	fn serialize(&self, s: &mut Stream) {
		s.write_u8(*self as u8).unwrap();
	}

	#[inline]
	fn serialized_size(&self) -> usize {
		1
	}
}

impl Deserializable for bool {
	#[inline]
	fn deserialize(reader: &mut Reader) -> Result<Self, Error> {
		Ok(reader.read_u8()? != 0)
	}
}

impl Serializable for u8 {
	#[inline]
	fn serialize(&self, s: &mut Stream) {
		s.write_u8(*self).unwrap();
	}

	#[inline]
	fn serialized_size(&self) -> usize {
		1
	}
}

impl Deserializable for u8 {
	#[inline]
	fn deserialize(reader: &mut Reader) -> Result<Self, Error> {
		Ok(reader.read_u8()?)
	}
}

impl_ser_for_int!(u16, 2, write_u16, read_u16);
impl_ser_for_int!(u32, 4, write_u32, read_u32);
impl_ser_for_int!(u64, 8, write_u64, read_u64);
impl_ser_for_int!(i32, 4, write_i32, read_i32);
impl_ser_for_int!(i64, 8, write_i64, read_i64);

macro_rules! impl_ser_for_hash {
	($name: ident, $size: expr) => {
		impl Serializable for $name {
			fn serialize(&self, stream: &mut Stream) {
				stream.append_slice(&**self);
			}

			#[inline]
			fn serialized_size(&self) -> usize {
				$size
			}
		}

		impl Deserializable for $name {
			fn deserialize(reader: &mut Reader) -> Result<Self, Error> {
				let slice = reader.read_slice($size)?;
				Ok(slice.into())
			}
		}
	}
}

impl_ser_for_hash!(H160, 20);
impl_ser_for_hash!(H256, 32);
impl_ser_for_hash!(H512, 64);

impl Serializable for Bytes {
	fn serialize(&self, stream: &mut Stream) {
		stream
			.append(&CompactInteger::from(self.len()))
			.append_slice(self);
	}

	#[inline]
	fn serialized_size(&self) -> usize {
		CompactInteger::from(self.len()).serialized_size() + self.len()
	}
}

impl Deserializable for Bytes {
	fn deserialize(reader: &mut Reader) -> Result<Self, Error> {
		let len: usize = reader.read::<CompactInteger>()?.into();
		reader.read_slice(len).map(Into::into)
	}
}

impl Serializable for Compact {
	#[inline]
	fn serialize(&self, stream: &mut Stream) {
		stream.append(&u32::from(*self));
	}

	#[inline]
	fn serialized_size(&self) -> usize {
		4
	}
}

impl Deserializable for Compact {
	#[inline]
	fn deserialize(reader: &mut Reader) -> Result<Self, Error> {
		reader.read::<u32>().map(Compact::new)
	}
}

impl Serializable for String {
	fn serialize(&self, stream: &mut Stream) {
		let bytes = self.as_bytes();
		stream
			.append(&CompactInteger::from(bytes.len()))
			.append_slice(bytes);
	}

	fn serialized_size(&self) -> usize {
		CompactInteger::from(self.len()).serialized_size() + self.len()
	}
}

impl Deserializable for String {
	fn deserialize(reader: &mut Reader) -> Result<Self, Error> {
		let len: usize = reader.read::<CompactInteger>()?.into();
		let slice = reader.read_slice(len)?;
		String::from_utf8(slice.to_vec()).map_err(|_| Error::MalformedData)
	}
}

#[cfg(test)]
mod tests {
	use bytes::Bytes;
	use hash::H256;
	use {deserialize, serialize};

	#[test]
	fn test_bytes_roundtrip() {
		let bytes: Bytes = "0102".into();
		let serialized = serialize(&bytes);
		assert_eq!(serialized, "020102".into());
		assert_eq!(deserialize::<Bytes>(&serialized).unwrap(), bytes);
	}

	#[test]
	fn test_hash_serialize_is_raw() {
		let hash = H256::from(7u8);
		let serialized = serialize(&hash);
		assert_eq!(serialized.len(), 32);
		assert_eq!(serialized[0], 7);
	}
}
