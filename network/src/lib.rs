//! Network magic and consensus parameters of the hybrid PoW/PoS chain.

extern crate chain;
extern crate primitives;

mod consensus;
mod deployments;
mod network;

pub use primitives::{compact, hash, uint};

pub use consensus::ConsensusParams;
pub use deployments::{compute_block_version, Deployment, VERSIONBITS_TOP_BITS};
pub use network::{genesis_block, Network};
