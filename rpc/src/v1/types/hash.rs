//! Hashes cross the RPC boundary in the conventional reversed hex order.

use std::fmt;
use std::str::FromStr;
use serde;
use primitives::hash::H256 as GlobalH256;

#[derive(Debug, Default, PartialEq, Eq, PartialOrd, Ord, Clone, Copy, Hash)]
pub struct H256(GlobalH256);

impl From<GlobalH256> for H256 {
	fn from(hash: GlobalH256) -> Self {
		H256(hash)
	}
}

impl From<H256> for GlobalH256 {
	fn from(hash: H256) -> Self {
		hash.0
	}
}

impl fmt::Display for H256 {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		f.write_str(&self.0.to_reversed_str())
	}
}

impl FromStr for H256 {
	type Err = <GlobalH256 as FromStr>::Err;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		s.parse::<GlobalH256>().map(|hash| H256(hash.reversed()))
	}
}

impl serde::Serialize for H256 {
	fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error> where S: serde::Serializer {
		serializer.serialize_str(&self.0.to_reversed_str())
	}
}

impl<'de> serde::Deserialize<'de> for H256 {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error> where D: serde::Deserializer<'de> {
		struct HashVisitor;

		impl<'v> serde::de::Visitor<'v> for HashVisitor {
			type Value = H256;

			fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
				formatter.write_str("a 32 byte hash in reversed hex")
			}

			fn visit_str<E>(self, value: &str) -> Result<Self::Value, E> where E: serde::de::Error {
				value.parse().map_err(|_| E::invalid_value(serde::de::Unexpected::Str(value), &self))
			}
		}

		deserializer.deserialize_str(HashVisitor)
	}
}
