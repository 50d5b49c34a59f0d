//! JSON-RPC façade over block production: template publishing, block
//! submission, generation and the staking switches.

extern crate hex;
extern crate jsonrpc_core;
extern crate jsonrpc_derive;
extern crate jsonrpc_http_server;
#[macro_use]
extern crate log;
extern crate parking_lot;
extern crate serde;
#[macro_use]
extern crate serde_derive;
extern crate serde_json;

extern crate chain;
extern crate keys;
extern crate miner;
extern crate network;
extern crate primitives;
extern crate script;
extern crate ser;
extern crate storage;
extern crate verification;

#[cfg(test)]
extern crate test_data;

pub mod rpc_server;
pub mod v1;

pub use jsonrpc_core::IoHandler;
pub use jsonrpc_http_server::Server;
pub use rpc_server::start_http;
