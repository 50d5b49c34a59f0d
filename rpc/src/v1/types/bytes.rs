//! Hex-encoded binary payloads.

use std::fmt;
use hex;
use serde;
use primitives::bytes::Bytes as GlobalBytes;

#[derive(Debug, Default, PartialEq, Eq, Clone)]
pub struct Bytes(GlobalBytes);

impl From<GlobalBytes> for Bytes {
	fn from(bytes: GlobalBytes) -> Self {
		Bytes(bytes)
	}
}

impl From<Bytes> for GlobalBytes {
	fn from(bytes: Bytes) -> Self {
		bytes.0
	}
}

impl From<Vec<u8>> for Bytes {
	fn from(bytes: Vec<u8>) -> Self {
		Bytes(bytes.into())
	}
}

impl serde::Serialize for Bytes {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error> where S: serde::Serializer {
		serializer.serialize_str(&hex::encode(&*self.0))
	}
}

impl<'de> serde::Deserialize<'de> for Bytes {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error> where D: serde::Deserializer<'de> {
		struct BytesVisitor;

		impl<'v> serde::de::Visitor<'v> for BytesVisitor {
			type Value = Bytes;

			fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
				formatter.write_str("a hex-encoded string")
			}

			fn visit_str<E>(self, value: &str) -> Result<Self::Value, E> where E: serde::de::Error {
				hex::decode(value)
					.map(|bytes| Bytes(bytes.into()))
					.map_err(|_| E::invalid_value(serde::de::Unexpected::Str(value), &self))
			}
		}

		deserializer.deserialize_str(BytesVisitor)
	}
}
