//! Bitcoin-style wire format: little-endian integers, `CompactInteger`
//! prefixed lists, optional transaction witness payload.

extern crate byteorder;
extern crate primitives;

mod compact_integer;
mod impls;
mod reader;
mod stream;

pub use primitives::{bytes, compact, hash};

pub use compact_integer::CompactInteger;
pub use reader::{deserialize, Deserializable, Error, Reader};
pub use stream::{serialize, serialize_with_flags, serialized_list_size, Serializable, Stream,
	SERIALIZE_TRANSACTION_WITNESS};
