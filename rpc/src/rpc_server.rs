use std::io;
use std::net::SocketAddr;
use jsonrpc_core::IoHandler;
use jsonrpc_http_server::{DomainsValidation, Server, ServerBuilder};

/// Starts the http server and returns its handle.
pub fn start_http(addr: &SocketAddr, handler: IoHandler) -> Result<Server, io::Error> {
	ServerBuilder::new(handler)
		.cors(DomainsValidation::Disabled)
		.allowed_hosts(DomainsValidation::Disabled)
		.start_http(addr)
}
