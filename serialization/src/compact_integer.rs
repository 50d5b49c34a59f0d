//! Variable-length integer used to prefix lists and byte vectors.

use std::{fmt, io};
use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};
use {Deserializable, Error as ReaderError, Reader, Serializable, Stream};

#[derive(Default, Debug, Clone, Copy, PartialEq)]
pub struct CompactInteger(u64);

impl fmt::Display for CompactInteger {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		self.0.fmt(f)
	}
}

impl From<CompactInteger> for usize {
	fn from(i: CompactInteger) -> Self {
		i.0 as usize
	}
}

impl From<CompactInteger> for u64 {
	fn from(i: CompactInteger) -> Self {
		i.0
	}
}

impl From<u8> for CompactInteger {
	fn from(i: u8) -> Self {
		CompactInteger(i as u64)
	}
}

impl From<u16> for CompactInteger {
	fn from(i: u16) -> Self {
		CompactInteger(i as u64)
	}
}

impl From<u32> for CompactInteger {
	fn from(i: u32) -> Self {
		CompactInteger(i as u64)
	}
}

impl From<u64> for CompactInteger {
	fn from(i: u64) -> Self {
		CompactInteger(i)
	}
}

impl From<usize> for CompactInteger {
	fn from(i: usize) -> Self {
		CompactInteger(i as u64)
	}
}

impl Serializable for CompactInteger {
	fn serialize(&self, stream: &mut Stream) {
		match self.0 {
			0..=0xfc => {
				stream.write_u8(self.0 as u8).unwrap();
			},
			0xfd..=0xffff => {
				stream.write_u8(0xfd).unwrap();
				stream.write_u16::<LittleEndian>(self.0 as u16).unwrap();
			},
			0x10000..=0xffff_ffff => {
				stream.write_u8(0xfe).unwrap();
				stream.write_u32::<LittleEndian>(self.0 as u32).unwrap();
			},
			_ => {
				stream.write_u8(0xff).unwrap();
				stream.write_u64::<LittleEndian>(self.0).unwrap();
			},
		}
	}

	fn serialized_size(&self) -> usize {
		match self.0 {
			0..=0xfc => 1,
			0xfd..=0xffff => 3,
			0x10000..=0xffff_ffff => 5,
			_ => 9,
		}
	}
}

impl Deserializable for CompactInteger {
	fn deserialize(reader: &mut Reader) -> Result<Self, ReaderError> {
		let result = match reader.read_u8()? {
			i @ 0..=0xfc => i.into(),
			0xfd => reader.read_u16::<LittleEndian>()?.into(),
			0xfe => reader.read_u32::<LittleEndian>()?.into(),
			_ => reader.read_u64::<LittleEndian>()?.into(),
		};

		Ok(result)
	}
}

#[cfg(test)]
mod tests {
	use super::CompactInteger;
	use {deserialize, serialize, Error};

	#[test]
	fn test_compact_integer_stream() {
		assert_eq!(serialize(&CompactInteger::from(0u64)), vec![0x00].into());
		assert_eq!(serialize(&CompactInteger::from(0xfcu64)), vec![0xfc].into());
		assert_eq!(serialize(&CompactInteger::from(0xfdu64)), vec![0xfd, 0xfd, 0x00].into());
		assert_eq!(serialize(&CompactInteger::from(0xffffu64)), vec![0xfd, 0xff, 0xff].into());
		assert_eq!(serialize(&CompactInteger::from(0x10000u64)), vec![0xfe, 0x00, 0x00, 0x01, 0x00].into());
		assert_eq!(
			serialize(&CompactInteger::from(0x1_0000_0000u64)),
			vec![0xff, 0x00, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00].into()
		);
	}

	#[test]
	fn test_compact_integer_reader() {
		let buffer = vec![0xfd, 0xfd, 0x00];
		assert_eq!(deserialize::<CompactInteger>(&buffer).unwrap(), 0xfdu64.into());
		assert_eq!(deserialize::<CompactInteger>(&[][..]).unwrap_err(), Error::UnexpectedEnd);
	}
}
