//! Address decoding and the minimal output-descriptor surface block
//! production needs. Key management stays with the wallet.

extern crate base58;
extern crate crypto;
extern crate hex;
extern crate network;
extern crate primitives;
extern crate script;

mod address;
mod descriptor;

pub use primitives::{bytes, hash};

pub use address::{Address, Error as AddressError, Type};
pub use descriptor::{script_from_descriptor, Error as DescriptorError};
