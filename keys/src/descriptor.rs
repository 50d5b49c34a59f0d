//! Minimal output descriptor parsing: enough to turn `addr(…)` and
//! `raw(…)` descriptors into output scripts. Descriptors needing key
//! derivation belong to the wallet and are reported as such.

use std::fmt;
use hex;
use address::Address;
use bytes::Bytes;
use network::Network;

#[derive(Debug, PartialEq)]
pub enum Error {
	/// Ranged descriptors cannot name a single output script.
	Ranged,
	/// The descriptor needs private keys to derive a script.
	CannotDerive,
	/// Malformed descriptor or inner address.
	Invalid,
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match *self {
			Error::Ranged => "Ranged descriptor not accepted. Maybe pass through deriveaddresses first?".fmt(f),
			Error::CannotDerive => "Cannot derive script without private keys".fmt(f),
			Error::Invalid => "Invalid descriptor".fmt(f),
		}
	}
}

/// Resolves a descriptor to the output script it describes.
pub fn script_from_descriptor(descriptor: &str, network: Network) -> Result<Bytes, Error> {
	// the trailing checksum is not verified here
	let descriptor = descriptor.split('#').next().unwrap_or("");
	if descriptor.contains('*') {
		return Err(Error::Ranged);
	}

	if let Some(inner) = inner_of(descriptor, "addr") {
		let address = Address::from_base58(inner, network).map_err(|_| Error::Invalid)?;
		return Ok(address.to_script().to_bytes());
	}

	if let Some(inner) = inner_of(descriptor, "raw") {
		return hex::decode(inner).map(Into::into).map_err(|_| Error::Invalid);
	}

	// pk()/pkh()/wpkh()/combo() and friends need the wallet's keys
	Err(Error::CannotDerive)
}

fn inner_of<'a>(descriptor: &'a str, function: &str) -> Option<&'a str> {
	let body = descriptor.strip_prefix(function)?;
	body.strip_prefix('(')?.strip_suffix(')')
}

#[cfg(test)]
mod tests {
	use address::{Address, Type};
	use network::Network;
	use super::{script_from_descriptor, Error};

	#[test]
	fn test_addr_descriptor() {
		let address = Address {
			kind: Type::P2PKH,
			network: Network::Regtest,
			hash: [1u8; 20].into(),
		};
		let descriptor = format!("addr({})", address);
		let script = script_from_descriptor(&descriptor, Network::Regtest).unwrap();
		assert_eq!(script, address.to_script().to_bytes());
	}

	#[test]
	fn test_raw_descriptor() {
		let script = script_from_descriptor("raw(51)", Network::Regtest).unwrap();
		assert_eq!(script, "51".into());
	}

	#[test]
	fn test_ranged_descriptor_is_rejected() {
		assert_eq!(
			script_from_descriptor("wpkh(xpub6ERApfZwUNrhL/0/*)", Network::Regtest).unwrap_err(),
			Error::Ranged
		);
	}

	#[test]
	fn test_key_descriptors_cannot_derive() {
		assert_eq!(
			script_from_descriptor("pkh(02c6047f9441ed7d6d3045406e95c07cd85c778e4b8cef3ca7abac09b95c709ee5)", Network::Regtest).unwrap_err(),
			Error::CannotDerive
		);
	}

	#[test]
	fn test_checksum_suffix_is_ignored() {
		let script = script_from_descriptor("raw(51)#8rc9d28h", Network::Regtest).unwrap();
		assert_eq!(script, "51".into());
	}
}
