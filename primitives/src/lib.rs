//! Basic primitives shared by every other crate: fixed-size hashes,
//! byte vectors and the compact difficulty representation.

extern crate hex;
extern crate primitive_types;

pub mod bytes;
pub mod compact;
pub mod hash;
pub mod uint;
