//! The subset of the script machinery block production needs: building
//! coinbase scriptSigs and standard outputs, counting signature operations,
//! recognizing witness commitment outputs. Script execution is out of scope.

extern crate primitives;

mod builder;
mod opcode;
mod script;

pub use primitives::bytes;

pub use builder::Builder;
pub use opcode::*;
pub use script::Script;
