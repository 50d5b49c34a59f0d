//! Base58check address of a pay-to-pubkey-hash or pay-to-script-hash
//! output.

use std::fmt;
use base58::{FromBase58, ToBase58};
use crypto::checksum;
use hash::H160;
use network::Network;
use script::{Builder, Script};

#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum Type {
	/// Pay to pubkey hash.
	P2PKH,
	/// Pay to script hash.
	P2SH,
}

#[derive(Debug, PartialEq)]
pub enum Error {
	InvalidAddress,
	InvalidChecksum,
	InvalidNetwork,
}

impl fmt::Display for Error {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		match *self {
			Error::InvalidAddress => "invalid address".fmt(f),
			Error::InvalidChecksum => "invalid checksum".fmt(f),
			Error::InvalidNetwork => "wrong network prefix".fmt(f),
		}
	}
}

#[derive(Debug, PartialEq, Clone)]
pub struct Address {
	pub kind: Type,
	pub network: Network,
	pub hash: H160,
}

impl Address {
	/// Parses a base58check address, requiring the given network's version
	/// byte.
	pub fn from_base58(address: &str, network: Network) -> Result<Address, Error> {
		let payload = address.from_base58().map_err(|_| Error::InvalidAddress)?;
		if payload.len() != 25 {
			return Err(Error::InvalidAddress);
		}
		if &checksum(&payload[0..21])[..] != &payload[21..25] {
			return Err(Error::InvalidChecksum);
		}

		let kind = if payload[0] == network.p2pkh_address_version() {
			Type::P2PKH
		} else if payload[0] == network.p2sh_address_version() {
			Type::P2SH
		} else {
			return Err(Error::InvalidNetwork);
		};

		Ok(Address {
			kind,
			network,
			hash: payload[1..21].into(),
		})
	}

	/// The standard output script paying to this address.
	pub fn to_script(&self) -> Script {
		match self.kind {
			Type::P2PKH => Builder::build_p2pkh(&self.hash),
			Type::P2SH => Builder::build_p2sh(&self.hash),
		}
	}
}

impl fmt::Display for Address {
	fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
		let version = match self.kind {
			Type::P2PKH => self.network.p2pkh_address_version(),
			Type::P2SH => self.network.p2sh_address_version(),
		};
		let mut payload = Vec::with_capacity(25);
		payload.push(version);
		payload.extend_from_slice(&*self.hash);
		let check = checksum(&payload);
		payload.extend_from_slice(&check);
		payload.to_base58().fmt(f)
	}
}
